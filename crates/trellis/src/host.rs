//! Pointer events from a hosting application.
//!
//! Windowing and event loops belong to the host. The host converts its
//! pointer events into [`HostEvent`]s in diagram coordinates and hands them
//! to [`dispatch`], which hit-tests the diagram and forwards the result to a
//! [`HostHandler`].

use log::debug;

use trellis_core::{
    diagram::{Diagram, Hit},
    geometry::Point,
    tree::ItemId,
};

/// A pointer event at a position in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Click(Point),
    DoubleClick(Point),
    /// Secondary button press, usually opening a context menu.
    ContextMenu(Point),
}

impl HostEvent {
    pub fn position(&self) -> Point {
        match *self {
            Self::Click(point) | Self::DoubleClick(point) | Self::ContextMenu(point) => point,
        }
    }
}

/// Receiver of item-level pointer notifications.
///
/// Every hook receives the top-level item, the innermost item under the
/// pointer and the pointer position local to that innermost item. All hooks
/// default to doing nothing.
pub trait HostHandler {
    fn on_item_clicked(&mut self, _diagram: &Diagram, _top: ItemId, _item: ItemId, _local: Point) {
    }

    fn on_item_double_clicked(
        &mut self,
        _diagram: &Diagram,
        _top: ItemId,
        _item: ItemId,
        _local: Point,
    ) {
    }

    fn on_create_context(
        &mut self,
        _diagram: &Diagram,
        _top: ItemId,
        _item: ItemId,
        _local: Point,
    ) {
    }
}

/// Hit-tests `event` against `diagram` and notifies `handler`.
///
/// A double click is delivered as two clicks followed by the double click.
/// Events outside every item are dropped. Returns the hit, if any.
pub fn dispatch(
    diagram: &Diagram,
    event: HostEvent,
    handler: &mut dyn HostHandler,
) -> Option<Hit> {
    let hit = diagram.item_at(event.position())?;
    debug!(event:? = event, item = hit.item().index(); "Dispatching host event");

    let (top, item, local) = (hit.top(), hit.item(), hit.local());
    match event {
        HostEvent::Click(_) => handler.on_item_clicked(diagram, top, item, local),
        HostEvent::DoubleClick(_) => {
            handler.on_item_clicked(diagram, top, item, local);
            handler.on_item_clicked(diagram, top, item, local);
            handler.on_item_double_clicked(diagram, top, item, local);
        }
        HostEvent::ContextMenu(_) => handler.on_create_context(diagram, top, item, local),
    }
    Some(hit)
}
