//! Per-tick time source
//!
//! The host feeds the real frame delta; the simulation reads the scaled delta.
//! Pausing sets the scale to 0, which stops scaled time but not real time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    time_scale: f32,
    real_dt: f32,
    /// Total real seconds seen by this clock
    pub real_elapsed: f64,
    /// Total scaled seconds seen by this clock
    pub scaled_elapsed: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            real_dt: 0.0,
            real_elapsed: 0.0,
            scaled_elapsed: 0.0,
        }
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the real duration of the frame about to be simulated
    pub fn advance(&mut self, real_dt: f32) {
        self.real_dt = if real_dt.is_finite() { real_dt.max(0.0) } else { 0.0 };
        self.real_elapsed += self.real_dt as f64;
        self.scaled_elapsed += self.delta_time() as f64;
    }

    /// Scaled delta for this tick
    pub fn delta_time(&self) -> f32 {
        self.real_dt * self.time_scale
    }

    /// Unscaled delta for this tick
    pub fn real_delta_time(&self) -> f32 {
        self.real_dt
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }
}
