//! Timelines
//!
//! A timeline orchestrates several numeric tweens ("entries") on one time
//! axis. Each entry has an offset, a duration, a from/to pair and an
//! easing. The timeline can play forward, play in reverse, loop, or be
//! positioned directly with [`Timeline::seek`] / [`Timeline::set_progress`],
//! which is how scroll scrubbing drives it.
//!
//! ```
//! use kinetic_animation::Timeline;
//!
//! let mut timeline = Timeline::new();
//! let opacity = timeline.add(0, 500, 0.0, 1.0);
//! let lift = timeline.add(250, 500, 30.0, 0.0);
//!
//! assert_eq!(timeline.duration_ms(), 750.0);
//! timeline.seek(500.0);
//! assert_eq!(timeline.value(opacity), Some(1.0));
//! assert_eq!(timeline.value(lift), Some(15.0));
//! ```

use crate::easing::Easing;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to one entry of a timeline
    pub struct TimelineEntryId;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayDirection {
    #[default]
    Forward,
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TimelineEntry {
    offset_ms: f32,
    duration_ms: f32,
    from: f32,
    to: f32,
    easing: Easing,
}

impl TimelineEntry {
    fn progress_at(&self, position_ms: f32) -> f32 {
        let local = position_ms - self.offset_ms;
        if self.duration_ms <= 0.0 {
            return if local >= 0.0 { 1.0 } else { 0.0 };
        }
        (local / self.duration_ms).clamp(0.0, 1.0)
    }

    fn value_at(&self, position_ms: f32) -> f32 {
        let progress = self.progress_at(position_ms);
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }
}

/// Multi-entry tween timeline
#[derive(Clone, Debug)]
pub struct Timeline {
    entries: SlotMap<TimelineEntryId, TimelineEntry>,
    order: Vec<TimelineEntryId>,
    position_ms: f32,
    playing: bool,
    direction: PlayDirection,
    /// -1 loops forever
    loop_count: i32,
    loops_done: i32,
    alternate: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            position_ms: 0.0,
            playing: false,
            direction: PlayDirection::Forward,
            loop_count: 0,
            loops_done: 0,
            alternate: false,
        }
    }

    /// Add a linear entry
    ///
    /// Returns an entry ID that can be used to get the current value.
    pub fn add(&mut self, offset_ms: i32, duration_ms: u32, from: f32, to: f32) -> TimelineEntryId {
        self.add_with_easing(offset_ms, duration_ms, from, to, Easing::Linear)
    }

    /// Add an entry with a specific easing function
    pub fn add_with_easing(
        &mut self,
        offset_ms: i32,
        duration_ms: u32,
        from: f32,
        to: f32,
        easing: Easing,
    ) -> TimelineEntryId {
        let id = self.entries.insert(TimelineEntry {
            offset_ms: offset_ms.max(0) as f32,
            duration_ms: duration_ms as f32,
            from,
            to,
            easing,
        });
        self.order.push(id);
        id
    }

    /// Add `count` identical entries, each starting `stagger_ms` after the previous one
    pub fn add_staggered(
        &mut self,
        count: usize,
        offset_ms: i32,
        stagger_ms: u32,
        duration_ms: u32,
        from: f32,
        to: f32,
        easing: Easing,
    ) -> Vec<TimelineEntryId> {
        let stagger = i32::try_from(stagger_ms).unwrap_or(i32::MAX);
        (0..count)
            .map(|index| {
                let index = i32::try_from(index).unwrap_or(i32::MAX);
                let offset = offset_ms.saturating_add(index.saturating_mul(stagger));
                self.add_with_easing(offset, duration_ms, from, to, easing)
            })
            .collect()
    }

    /// Set loop count (-1 for infinite)
    pub fn set_loop(&mut self, count: i32) {
        self.loop_count = count;
        self.loops_done = 0;
    }

    /// Enable/disable alternate (ping-pong) looping
    pub fn set_alternate(&mut self, alternate: bool) {
        self.alternate = alternate;
    }

    /// Total length: the end of the latest entry
    pub fn duration_ms(&self) -> f32 {
        self.entries
            .values()
            .map(|entry| entry.offset_ms + entry.duration_ms)
            .fold(0.0, f32::max)
    }

    /// Play from the beginning
    pub fn start(&mut self) {
        self.position_ms = 0.0;
        self.loops_done = 0;
        self.direction = PlayDirection::Forward;
        self.playing = true;
    }

    /// Play forward from the current position
    pub fn play(&mut self) {
        self.direction = PlayDirection::Forward;
        self.playing = true;
    }

    /// Play backward from the current position
    pub fn reverse(&mut self) {
        self.direction = PlayDirection::Reverse;
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Continue in the current direction
    pub fn resume(&mut self) {
        self.playing = true;
    }

    pub fn restart(&mut self) {
        self.start();
    }

    /// Jump to the start and stop
    pub fn reset(&mut self) {
        self.position_ms = 0.0;
        self.loops_done = 0;
        self.direction = PlayDirection::Forward;
        self.playing = false;
    }

    /// Jump to the end and stop
    pub fn complete(&mut self) {
        self.position_ms = self.duration_ms();
        self.playing = false;
    }

    /// Jump to the end of the current direction and stop
    ///
    /// Forward lands on the end, reverse on the start. Used in place of
    /// ticking when motion is not allowed.
    pub fn finish(&mut self) {
        self.position_ms = match self.direction {
            PlayDirection::Forward => self.duration_ms(),
            PlayDirection::Reverse => 0.0,
        };
        self.playing = false;
    }

    /// Jump to a position in milliseconds (clamped)
    pub fn seek(&mut self, position_ms: f32) {
        if position_ms.is_nan() {
            return;
        }
        self.position_ms = position_ms.clamp(0.0, self.duration_ms());
    }

    /// Jump to a normalized position
    pub fn set_progress(&mut self, progress: f32) {
        self.seek(progress * self.duration_ms());
    }

    pub fn position_ms(&self) -> f32 {
        self.position_ms
    }

    /// Normalized position in `[0, 1]`
    pub fn progress(&self) -> f32 {
        let duration = self.duration_ms();
        if duration <= 0.0 {
            return if self.position_ms > 0.0 { 1.0 } else { 0.0 };
        }
        (self.position_ms / duration).clamp(0.0, 1.0)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    /// Advance by delta time in milliseconds
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.playing || !(dt_ms.is_finite() && dt_ms > 0.0) {
            return;
        }

        let duration = self.duration_ms();
        if duration <= 0.0 {
            self.position_ms = 0.0;
            self.playing = false;
            return;
        }

        match self.direction {
            PlayDirection::Forward => {
                self.position_ms += dt_ms;
                if self.position_ms >= duration {
                    let overshoot = self.position_ms - duration;
                    self.wrap(PlayDirection::Forward, overshoot, duration);
                }
            }
            PlayDirection::Reverse => {
                self.position_ms -= dt_ms;
                if self.position_ms <= 0.0 {
                    let overshoot = -self.position_ms;
                    self.wrap(PlayDirection::Reverse, overshoot, duration);
                }
            }
        }
    }

    fn wrap(&mut self, reached: PlayDirection, overshoot: f32, duration: f32) {
        let boundary = match reached {
            PlayDirection::Forward => duration,
            PlayDirection::Reverse => 0.0,
        };

        let may_loop = self.loop_count < 0 || self.loops_done < self.loop_count;
        if !may_loop {
            self.position_ms = boundary;
            self.playing = false;
            return;
        }
        self.loops_done = self.loops_done.saturating_add(1);

        let overshoot = overshoot.min(duration);
        if self.alternate {
            self.direction = match reached {
                PlayDirection::Forward => PlayDirection::Reverse,
                PlayDirection::Reverse => PlayDirection::Forward,
            };
            self.position_ms = match reached {
                PlayDirection::Forward => duration - overshoot,
                PlayDirection::Reverse => overshoot,
            };
        } else {
            self.position_ms = match reached {
                PlayDirection::Forward => overshoot,
                PlayDirection::Reverse => duration - overshoot,
            };
        }
    }

    /// Current value of an entry
    pub fn value(&self, id: TimelineEntryId) -> Option<f32> {
        self.entries
            .get(id)
            .map(|entry| entry.value_at(self.position_ms))
    }

    /// Linear progress of an entry in `[0, 1]`
    pub fn entry_progress(&self, id: TimelineEntryId) -> Option<f32> {
        self.entries
            .get(id)
            .map(|entry| entry.progress_at(self.position_ms))
    }

    /// Entry IDs in insertion order
    pub fn entry_ids(&self) -> Vec<TimelineEntryId> {
        self.order.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
