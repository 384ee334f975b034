//! # Frame Driver
//!
//! The application's loop calls [`Ticker::tick`] once per frame; the
//! ticker fans the delta out to every subscriber in subscription order.
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────┐
//! │ 1. SANITIZE dt   negative / NaN -> 0          │
//! │ 2. FAN OUT       subscriber.on_tick(dt) ...   │
//! │ 3. RECORD        FrameStats, long-frame warn  │
//! └──────────────────────────────────────────────┘
//! ```

use backdrop_effects::Tickable;

/// Target frame time for 60 FPS, in seconds.
pub const TARGET_FRAME_TIME: f32 = 1.0 / 60.0;

/// Frame time above which a warning is logged, in seconds.
///
/// Browsers stall timers in background tabs, so a decorative scene sees
/// these routinely on refocus.
pub const LONG_FRAME_TIME: f32 = 0.25;

/// Handle returned by [`Ticker::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickerId(u64);

/// Timing of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Delta delivered to subscribers after sanitizing.
    pub dt: f32,
    /// Subscribers ticked.
    pub subscribers: usize,
}

/// Accumulated frame statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickerStats {
    /// Frames ticked.
    pub frames: u64,
    /// Sum of delivered deltas.
    pub total_time: f64,
    /// Shortest delta.
    pub min_dt: f32,
    /// Longest delta.
    pub max_dt: f32,
    /// Frames above [`LONG_FRAME_TIME`].
    pub long_frames: u64,
    /// Frames whose raw delta was negative or not finite.
    pub rejected_deltas: u64,
}

impl TickerStats {
    /// Creates empty statistics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames: 0,
            total_time: 0.0,
            min_dt: f32::MAX,
            max_dt: 0.0,
            long_frames: 0,
            rejected_deltas: 0,
        }
    }

    fn record(&mut self, dt: f32) {
        self.frames += 1;
        self.total_time += f64::from(dt);
        self.min_dt = self.min_dt.min(dt);
        self.max_dt = self.max_dt.max(dt);
        if dt > LONG_FRAME_TIME {
            self.long_frames += 1;
        }
    }

    /// Average delta in seconds.
    #[must_use]
    pub fn avg_dt(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        // Frame counts stay far below 2^52.
        #[allow(clippy::cast_precision_loss)]
        let frames = self.frames as f64;
        self.total_time / frames
    }

    /// Average frames per second.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg = self.avg_dt();
        if avg <= 0.0 {
            return 0.0;
        }
        1.0 / avg
    }
}

impl Default for TickerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Fans a per-frame delta out to subscribers.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use backdrop::Ticker;
/// use backdrop_effects::{StarConfig, StarEmitter};
///
/// let stars = Rc::new(RefCell::new(StarEmitter::with_seed(StarConfig::default(), 1).unwrap()));
/// stars.borrow_mut().start();
///
/// let mut ticker = Ticker::new();
/// ticker.add(Box::new(Rc::clone(&stars)));
/// ticker.tick(1.0 / 60.0);
/// assert_eq!(ticker.stats().frames, 1);
/// ```
#[derive(Default)]
pub struct Ticker {
    subscribers: Vec<(TickerId, Box<dyn Tickable>)>,
    next_id: u64,
    stats: TickerStats,
}

impl Ticker {
    /// Creates a ticker with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes. Subscribers tick in the order they were added.
    pub fn add(&mut self, subscriber: Box<dyn Tickable>) -> TickerId {
        let id = TickerId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    /// Unsubscribes, handing the subscriber back.
    pub fn remove(&mut self, id: TickerId) -> Option<Box<dyn Tickable>> {
        let index = self.subscribers.iter().position(|(sub_id, _)| *sub_id == id)?;
        Some(self.subscribers.remove(index).1)
    }

    /// Advances every subscriber by `dt` seconds.
    ///
    /// Negative or non-finite deltas are delivered as `0.0`.
    pub fn tick(&mut self, dt: f32) -> FrameStats {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "rejected frame delta");
            self.stats.rejected_deltas += 1;
            0.0
        };

        if dt > LONG_FRAME_TIME {
            tracing::warn!(
                frame = self.stats.frames,
                dt_ms = dt * 1000.0,
                target_ms = TARGET_FRAME_TIME * 1000.0,
                "long frame"
            );
        }

        for (_, subscriber) in &mut self.subscribers {
            subscriber.on_tick(dt);
        }

        let stats = FrameStats {
            frame: self.stats.frames,
            dt,
            subscribers: self.subscribers.len(),
        };
        self.stats.record(dt);
        stats
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True when nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickerStats {
        &self.stats
    }
}
