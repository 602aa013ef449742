//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Trellis diagram
//! engine. It includes:
//!
//! - **Geometry**: points, sizes, bounds and insets ([`geometry`] module)
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Identifiers**: interned document ids ([`identifier::Id`])
//! - **Styles**: immutable visual attributes ([`style`] module)
//! - **Scene graph**: items, the item tree, links and diagrams
//! - **Text metrics**: the measurement seam used by layout ([`metrics`] module)
//! - **Draw ops**: the flattened output consumed by render sinks ([`draw`] module)

/// Declares a fieldless enum whose variants carry the stable integer values
/// used in scene documents.
macro_rules! ordinal_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// The integer used for this value in documents.
            pub fn ordinal(self) -> i64 {
                self as i64
            }
        }

        impl TryFrom<i64> for $name {
            type Error = i64;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    other => Err(other),
                }
            }
        }
    };
}

pub mod color;
pub mod diagram;
pub mod draw;
pub mod geometry;
pub mod identifier;
pub mod item;
pub mod link;
pub mod metrics;
pub mod style;
pub mod tree;
