//! Grammars for the string-valued style attributes.
//!
//! - Fonts: `"<family words> [bold|italic|oblique|normal ...] <size>"`, for
//!   instance `"sans 9"` or `"DejaVu Sans bold 10"`. The size is optional.
//! - Paints: a CSS color, an empty string for "none", or a linear gradient
//!   `"linear x0 y0 x1 y1 off1 color1 off2 color2 ..."` with coordinates
//!   relative to the painted object's box.

use winnow::{
    Parser as _,
    ascii::{float, space0, space1},
    combinator::{alt, preceded, repeat},
    error::{ContextError, ErrMode},
    token::{take_till, take_while},
};

use trellis_core::{
    color::Color,
    geometry::Point,
    style::{FontDescriptor, GradientStop, LinearGradient, Paint},
};

type IResult<O> = Result<O, ErrMode<ContextError>>;

/// Words of a font description that select the face instead of naming the
/// family.
const STYLE_WORDS: &[&str] = &[
    "normal", "regular", "bold", "light", "medium", "heavy", "italic", "oblique",
];

fn word<'src>(input: &mut &'src str) -> IResult<&'src str> {
    preceded(space0, take_while(1.., |c: char| !c.is_whitespace())).parse_next(input)
}

fn words<'src>(input: &mut &'src str) -> IResult<Vec<&'src str>> {
    repeat(0.., word).parse_next(input)
}

/// Parses a font description.
pub fn parse_font(value: &str) -> Result<FontDescriptor, String> {
    let mut input = value;
    let parts = words(&mut input).map_err(|_| format!("invalid font `{value}`"))?;

    let (size, rest) = match parts.split_last() {
        Some((last, rest)) => match last.parse::<f32>() {
            Ok(size) if size > 0.0 => (Some(size), rest),
            Ok(_) => return Err(format!("font size must be positive in `{value}`")),
            Err(_) => (None, parts.as_slice()),
        },
        None => return Err("font description is empty".to_string()),
    };

    let mut family = Vec::new();
    let mut bold = false;
    let mut italic = false;
    for part in rest {
        let lower = part.to_ascii_lowercase();
        if STYLE_WORDS.contains(&lower.as_str()) {
            bold |= lower == "bold" || lower == "heavy";
            italic |= lower == "italic" || lower == "oblique";
        } else {
            family.push(*part);
        }
    }

    let default = FontDescriptor::default();
    let family = if family.is_empty() {
        default.family().to_string()
    } else {
        family.join(" ")
    };
    Ok(FontDescriptor::new(family, size.unwrap_or(default.size()))
        .with_bold(bold)
        .with_italic(italic))
}

/// A color token: either a functional notation like `rgb(1, 2, 3)` or a run
/// of non-blank characters.
fn color_token<'src>(input: &mut &'src str) -> IResult<&'src str> {
    preceded(
        space0,
        alt((
            (
                take_while(1.., |c: char| c.is_ascii_alphabetic()),
                '(',
                take_till(0.., ')'),
                ')',
            )
                .take(),
            take_while(1.., |c: char| !c.is_whitespace()),
        )),
    )
    .parse_next(input)
}

fn number(input: &mut &str) -> IResult<f32> {
    preceded(space0, float).parse_next(input)
}

fn gradient_stop<'src>(input: &mut &'src str) -> IResult<(f32, &'src str)> {
    (number, color_token).parse_next(input)
}

type RawGradient<'src> = (f32, f32, f32, f32, Vec<(f32, &'src str)>);

fn gradient<'src>(input: &mut &'src str) -> IResult<RawGradient<'src>> {
    preceded(
        (space0, "linear", space1),
        (number, number, number, number, repeat(1.., gradient_stop)),
    )
    .parse_next(input)
}

/// Parses a color, treating an empty string as "none".
pub fn parse_color(value: &str) -> Result<Option<Color>, String> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        Color::new(value).map(Some)
    }
}

/// Parses a paint: empty for none, a gradient, or a color.
pub fn parse_paint(value: &str) -> Result<Option<Paint>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !trimmed.starts_with("linear") {
        return Color::new(trimmed).map(|color| Some(Paint::Solid(color)));
    }

    let mut input = trimmed;
    let (x0, y0, x1, y1, raw_stops) =
        gradient(&mut input).map_err(|_| format!("invalid gradient `{value}`"))?;
    if !input.trim().is_empty() {
        return Err(format!("unexpected `{}` in gradient", input.trim()));
    }

    let stops = raw_stops
        .into_iter()
        .map(|(offset, color)| Color::new(color).map(|color| GradientStop::new(offset, color)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Paint::LinearGradient(LinearGradient::new(
        Point::new(x0, y0),
        Point::new(x1, y1),
        stops,
    ))))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_parse_font_simple() {
        let font = parse_font("sans 9").unwrap();
        assert_eq!(font.family(), "sans");
        assert_approx_eq!(f32, font.size(), 9.0);
        assert!(!font.is_bold());
    }

    #[test]
    fn test_parse_font_style_words() {
        let font = parse_font("DejaVu Sans Bold Italic 10.5").unwrap();
        assert_eq!(font.family(), "DejaVu Sans");
        assert_approx_eq!(f32, font.size(), 10.5);
        assert!(font.is_bold());
        assert!(font.is_italic());
    }

    #[test]
    fn test_parse_font_without_size() {
        let font = parse_font("monospace").unwrap();
        assert_eq!(font.family(), "monospace");
        assert_approx_eq!(f32, font.size(), 9.0);
    }

    #[test]
    fn test_parse_font_errors() {
        assert!(parse_font("").is_err());
        assert!(parse_font("   ").is_err());
        assert!(parse_font("sans -2").is_err());
    }

    #[test]
    fn test_parse_paint_none_and_color() {
        assert_eq!(parse_paint("").unwrap(), None);
        assert_eq!(
            parse_paint("red").unwrap(),
            Some(Paint::Solid(Color::new("red").unwrap()))
        );
        assert!(parse_paint("no-such-color").is_err());
    }

    #[test]
    fn test_parse_gradient() {
        let paint = parse_paint("linear 0 0 0 1 0 rgba(255, 0, 0, 0.5) 1 blue")
            .unwrap()
            .unwrap();
        let Paint::LinearGradient(gradient) = paint else {
            panic!("expected a gradient");
        };
        assert_eq!(gradient.end(), Point::new(0.0, 1.0));
        assert_eq!(gradient.stops().len(), 2);
        assert_approx_eq!(f32, gradient.stops()[1].offset(), 1.0);
        assert_eq!(gradient.stops()[1].color(), Color::new("blue").unwrap());
    }

    #[test]
    fn test_parse_gradient_errors() {
        assert!(parse_paint("linear 0 0 1").is_err());
        assert!(parse_paint("linear 0 0 1 1 0 nocolor").is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("  ").unwrap(), None);
        assert!(parse_color("#00ff00").unwrap().is_some());
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn family_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            "[a-z]{2,8}".prop_filter("style word", |word| !STYLE_WORDS.contains(&word.as_str())),
            1..4,
        )
    }

    /// Family words, an optional weight and a size always parse back to the
    /// same descriptor.
    fn check_font_description(
        family: Vec<String>,
        bold: bool,
        size: u8,
    ) -> Result<(), TestCaseError> {
        let weight = if bold { " bold" } else { "" };
        let description = format!("{}{weight} {size}", family.join(" "));

        let font = parse_font(&description).map_err(TestCaseError::fail)?;

        prop_assert_eq!(font.family(), family.join(" "));
        prop_assert_eq!(font.is_bold(), bold);
        prop_assert!(!font.is_italic());
        prop_assert!(approx_eq!(f32, font.size(), f32::from(size)));
        Ok(())
    }

    proptest! {
        #[test]
        fn font_description_parses(
            family in family_strategy(),
            bold in any::<bool>(),
            size in 1u8..=72,
        ) {
            check_font_description(family, bold, size)?;
        }
    }
}
