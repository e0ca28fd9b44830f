//! Element handles
//!
//! The engine never owns UI nodes. It only needs to measure them: an
//! [`Element`] reports its current client rectangle (viewport coordinates),
//! or `None` while it is not attached or not yet laid out.

use crate::hub::{EventHub, WeakEventHub};
use kinetic_core::Rect;
use std::sync::{Arc, Mutex, PoisonError};

/// A mountable element the engine can observe
pub trait Element: Send + Sync {
    /// Current bounding rectangle in viewport coordinates
    fn client_rect(&self) -> Option<Rect>;
}

/// Shared element handle
pub type ElementHandle = Arc<dyn Element>;

/// Element laid out at a fixed document position
///
/// This is the headless host's element: its client rectangle is its document
/// rectangle shifted by the hub's current scroll offset. Hosts with a real
/// layout engine implement [`Element`] on their own node handles instead.
pub struct LayoutBox {
    document_rect: Mutex<Option<Rect>>,
    hub: WeakEventHub,
}

impl LayoutBox {
    /// Create an attached element at a document position
    pub fn new(hub: &EventHub, document_rect: Rect) -> Arc<Self> {
        Arc::new(Self {
            document_rect: Mutex::new(Some(document_rect)),
            hub: hub.downgrade(),
        })
    }

    /// Create an element that has not been laid out yet
    pub fn unattached(hub: &EventHub) -> Arc<Self> {
        Arc::new(Self {
            document_rect: Mutex::new(None),
            hub: hub.downgrade(),
        })
    }

    /// Move or resize the element (layout change)
    pub fn set_document_rect(&self, rect: Rect) {
        *self
            .document_rect
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(rect);
    }

    /// Detach the element from the document
    pub fn detach(&self) {
        *self
            .document_rect
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn document_rect(&self) -> Option<Rect> {
        *self
            .document_rect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Element for LayoutBox {
    fn client_rect(&self) -> Option<Rect> {
        let rect = self.document_rect()?;
        let state = self.hub.state()?;
        Some(Rect::new(
            rect.x() - state.scroll.x,
            rect.y() - state.scroll.y,
            rect.width(),
            rect.height(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::HostEvent;

    #[test]
    fn test_client_rect_follows_scroll() {
        let hub = EventHub::new(800.0, 600.0);
        let element = LayoutBox::new(&hub, Rect::new(0.0, 1000.0, 800.0, 200.0));
        assert_eq!(
            element.client_rect(),
            Some(Rect::new(0.0, 1000.0, 800.0, 200.0))
        );

        hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 700.0 });
        assert_eq!(
            element.client_rect(),
            Some(Rect::new(0.0, 300.0, 800.0, 200.0))
        );
    }

    #[test]
    fn test_unattached_and_detached() {
        let hub = EventHub::new(800.0, 600.0);
        let element = LayoutBox::unattached(&hub);
        assert!(element.client_rect().is_none());

        element.set_document_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(element.client_rect().is_some());

        element.detach();
        assert!(element.client_rect().is_none());
    }

    #[test]
    fn test_dropped_hub_unmeasurable() {
        let hub = EventHub::new(800.0, 600.0);
        let element = LayoutBox::new(&hub, Rect::new(0.0, 0.0, 10.0, 10.0));
        drop(hub);
        assert!(element.client_rect().is_none());
    }
}
