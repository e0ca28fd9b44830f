//! Host events consumed by the animation engine

/// Events the host forwards to the engine
///
/// Handlers never touch layout: they only record the latest value. Consumers
/// read the committed state inside their per-frame callbacks.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// Document scroll offset changed
    Scroll {
        /// Horizontal offset in device pixels
        x: f32,
        /// Vertical offset in device pixels
        y: f32,
    },
    /// Pointer moved (viewport coordinates)
    PointerMove {
        x: f32,
        y: f32,
    },
    /// Pointer left the document
    PointerLeave,
    /// Viewport was resized
    Resize {
        width: f32,
        height: f32,
    },
    /// Layout of some element changed without a resize (content reflow)
    Reflow,
    /// The user's reduced motion preference changed
    ReducedMotionChanged(bool),
}

impl HostEvent {
    /// The listener kind this event is delivered to
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Scroll { .. } => EventKind::Scroll,
            HostEvent::PointerMove { .. } => EventKind::PointerMove,
            HostEvent::PointerLeave => EventKind::PointerLeave,
            HostEvent::Resize { .. } => EventKind::Resize,
            HostEvent::Reflow => EventKind::Reflow,
            HostEvent::ReducedMotionChanged(_) => EventKind::ReducedMotion,
        }
    }
}

/// Distinct host signals a listener can subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    PointerMove,
    PointerLeave,
    Resize,
    Reflow,
    ReducedMotion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        assert_eq!(HostEvent::Scroll { x: 0.0, y: 10.0 }.kind(), EventKind::Scroll);
        assert_eq!(HostEvent::PointerLeave.kind(), EventKind::PointerLeave);
        assert_eq!(
            HostEvent::ReducedMotionChanged(true).kind(),
            EventKind::ReducedMotion
        );
    }
}
