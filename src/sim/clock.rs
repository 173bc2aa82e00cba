//! Pausable simulation clock
//!
//! All timing decisions read `Clock::now`, the wall time accumulated while the
//! clock was running. Pausing freezes it, so every backswing, cooldown and
//! trajectory resumes exactly where it stopped.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Source of wall-clock readings in milliseconds
pub trait TimeSource: fmt::Debug {
    fn now_millis(&self) -> f64;
}

/// Monotonic wall time
#[derive(Debug, Clone, Copy)]
pub struct WallTime {
    origin: Instant,
}

impl WallTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallTime {
    fn now_millis(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Host-driven time; clones share the same reading
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    millis: Rc<Cell<f64>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, millis: f64) {
        self.millis.set(self.millis.get() + millis);
    }

    pub fn set(&self, millis: f64) {
        self.millis.set(millis);
    }

    pub fn get(&self) -> f64 {
        self.millis.get()
    }
}

impl TimeSource for ManualTime {
    fn now_millis(&self) -> f64 {
        self.millis.get()
    }
}

/// Elapsed-time accumulator driving every timing decision
#[derive(Debug)]
pub struct Clock {
    running: bool,
    /// Wall reading at the last start/update (None while paused)
    anchor: Option<f64>,
    accumulated_millis: f64,
    source: Box<dyn TimeSource>,
}

impl Clock {
    pub fn new(source: impl TimeSource + 'static) -> Self {
        Self {
            running: false,
            anchor: None,
            accumulated_millis: 0.0,
            source: Box::new(source),
        }
    }

    pub fn wall() -> Self {
        Self::new(WallTime::new())
    }

    /// Begin accumulating; no-op while already running
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.anchor = Some(self.source.now_millis());
    }

    /// Flush the running delta and freeze
    pub fn pause(&mut self) {
        self.running = false;
        if let Some(anchor) = self.anchor.take() {
            self.accumulated_millis += (self.source.now_millis() - anchor).max(0.0);
        }
    }

    pub fn set_state(&mut self, running: bool) {
        if running {
            self.start();
        } else {
            self.pause();
        }
    }

    /// Roll the wall delta into the accumulator; returns the new `now`
    pub fn update(&mut self) -> f64 {
        if self.running {
            let wall = self.source.now_millis();
            let delta = self.anchor.map_or(0.0, |anchor| (wall - anchor).max(0.0));
            self.accumulated_millis += delta;
            self.anchor = Some(wall);
        }
        self.accumulated_millis
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.accumulated_millis
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.anchor = None;
        self.accumulated_millis = 0.0;
    }
}
