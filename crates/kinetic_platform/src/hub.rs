//! Host event hub
//!
//! The hub is the single entry point for host events. It records the latest
//! scroll offset, pointer position and viewport size (the read-only shared
//! signals every consumer derives from) and fans events out to registered
//! listeners.
//!
//! Listeners are owned through [`ListenerGuard`]s: dropping the guard removes
//! the listener, so a consumer that unmounts can never leak one.
//!
//! ```
//! use kinetic_platform::{EventHub, EventKind, HostEvent};
//!
//! let hub = EventHub::new(800.0, 600.0);
//! let guard = hub.listen(EventKind::Scroll, |_event| {});
//! assert_eq!(hub.listener_count(EventKind::Scroll), 1);
//!
//! hub.dispatch(&HostEvent::Scroll { x: 0.0, y: 120.0 });
//! assert_eq!(hub.state().scroll.y, 120.0);
//!
//! drop(guard);
//! assert_eq!(hub.listener_count(EventKind::Scroll), 0);
//! ```

use crate::event::{EventKind, HostEvent};
use kinetic_core::{Point, Size};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

new_key_type! {
    /// Handle to a registered host listener
    pub struct ListenerId;
}

/// Listener callback type
pub type ListenerCallback = Arc<dyn Fn(&HostEvent) + Send + Sync>;

/// Last committed host state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostState {
    /// Document scroll offset
    pub scroll: Point,
    /// Pointer position in viewport coordinates, `None` when outside
    pub pointer: Option<Point>,
    /// Viewport size
    pub viewport: Size,
    /// Incremented on every resize or reflow
    pub layout_generation: u64,
}

struct HubInner {
    state: HostState,
    listeners: SlotMap<ListenerId, (EventKind, ListenerCallback)>,
    by_kind: FxHashMap<EventKind, SmallVec<[ListenerId; 4]>>,
}

fn lock(inner: &Mutex<HubInner>) -> MutexGuard<'_, HubInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host event hub (cheap to clone, clones share state)
#[derive(Clone)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    /// Create a hub for a viewport of the given size
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                state: HostState {
                    viewport: Size::new(viewport_width, viewport_height),
                    ..HostState::default()
                },
                listeners: SlotMap::with_key(),
                by_kind: FxHashMap::default(),
            })),
        }
    }

    /// Register a listener for one kind of host event
    pub fn listen<F>(&self, kind: EventKind, callback: F) -> ListenerGuard
    where
        F: Fn(&HostEvent) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        let id = inner.listeners.insert((kind, Arc::new(callback)));
        inner.by_kind.entry(kind).or_default().push(id);

        ListenerGuard {
            hub: Arc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Record a host event and deliver it to its listeners
    ///
    /// State is committed before any listener runs. Listeners are called
    /// without the hub lock held, so they may register or drop listeners.
    pub fn dispatch(&self, event: &HostEvent) {
        let callbacks: SmallVec<[ListenerCallback; 8]> = {
            let mut inner = lock(&self.inner);
            match *event {
                HostEvent::Scroll { x, y } => inner.state.scroll = Point::new(x, y),
                HostEvent::PointerMove { x, y } => inner.state.pointer = Some(Point::new(x, y)),
                HostEvent::PointerLeave => inner.state.pointer = None,
                HostEvent::Resize { width, height } => {
                    inner.state.viewport = Size::new(width, height);
                    inner.state.layout_generation += 1;
                }
                HostEvent::Reflow => inner.state.layout_generation += 1,
                HostEvent::ReducedMotionChanged(_) => {}
            }

            let kind = event.kind();
            match inner.by_kind.get(&kind) {
                Some(ids) => ids
                    .iter()
                    .filter_map(|id| inner.listeners.get(*id))
                    .map(|(_, callback)| Arc::clone(callback))
                    .collect(),
                None => SmallVec::new(),
            }
        };

        for callback in callbacks {
            callback(event);
        }
    }

    /// Snapshot of the last committed host state
    pub fn state(&self) -> HostState {
        lock(&self.inner).state
    }

    /// Number of live listeners for a kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        lock(&self.inner)
            .by_kind
            .get(&kind)
            .map_or(0, |ids| ids.len())
    }

    /// Total number of live listeners
    pub fn total_listeners(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    /// Weak reference for handles that must not keep the hub alive
    pub fn downgrade(&self) -> WeakEventHub {
        WeakEventHub {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Weak handle to an [`EventHub`]
#[derive(Clone)]
pub struct WeakEventHub {
    inner: Weak<Mutex<HubInner>>,
}

impl WeakEventHub {
    pub fn upgrade(&self) -> Option<EventHub> {
        self.inner.upgrade().map(|inner| EventHub { inner })
    }

    /// Last committed host state, if the hub is still alive
    pub fn state(&self) -> Option<HostState> {
        self.inner.upgrade().map(|inner| lock(&inner).state)
    }
}

/// Owns one registered listener; dropping it unregisters the listener
pub struct ListenerGuard {
    hub: Weak<Mutex<HubInner>>,
    id: Option<ListenerId>,
}

impl ListenerGuard {
    /// Remove the listener now
    pub fn remove(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(inner) = self.hub.upgrade() else {
            return;
        };

        let mut inner = lock(&inner);
        if let Some((kind, _)) = inner.listeners.remove(id) {
            if let Some(ids) = inner.by_kind.get_mut(&kind) {
                ids.retain(|existing| *existing != id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.hub.strong_count() > 0
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.remove();
    }
}
