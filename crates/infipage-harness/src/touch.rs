//! Synthetic touch input: swipe sampling and release-velocity estimation.

use crate::scenario::Swipe;

/// Samples kept by the tracker.
const HISTORY_SIZE: usize = 20;

/// Only samples this recent contribute to the velocity.
const HORIZON_MS: f64 = 100.0;

/// A gap this long between consecutive samples means the finger stopped.
const ASSUME_STOPPED_MS: f64 = 40.0;

#[derive(Debug, Clone, Copy)]
struct Sample {
    time_ms: f64,
    position: f64,
}

/// One-axis velocity estimator using the impulse strategy: each segment
/// between samples adds the work needed to change the finger's kinetic
/// energy, and the final energy is converted back into a velocity.
#[derive(Debug, Clone)]
pub struct VelocityTracker1D {
    samples: [Option<Sample>; HISTORY_SIZE],
    index: usize,
}

impl Default for VelocityTracker1D {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker1D {
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            index: 0,
        }
    }

    pub fn add_data_point(&mut self, time_ms: f64, position: f64) {
        self.index = (self.index + 1) % HISTORY_SIZE;
        self.samples[self.index] = Some(Sample { time_ms, position });
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Velocity in units per second; zero with fewer than two usable samples.
    #[must_use]
    pub fn calculate_velocity(&self) -> f64 {
        let Some(newest) = self.samples[self.index] else {
            return 0.0;
        };

        // Newest first.
        let mut window: Vec<Sample> = Vec::with_capacity(HISTORY_SIZE);
        let mut cursor = self.index;
        let mut previous = newest;
        while let Some(sample) = self.samples[cursor] {
            if newest.time_ms - sample.time_ms > HORIZON_MS
                || previous.time_ms - sample.time_ms > ASSUME_STOPPED_MS
            {
                break;
            }
            window.push(sample);
            previous = sample;
            if window.len() == HISTORY_SIZE {
                break;
            }
            cursor = cursor.checked_sub(1).unwrap_or(HISTORY_SIZE - 1);
        }
        if window.len() < 2 {
            return 0.0;
        }

        window.reverse();
        impulse_velocity(&window) * 1000.0
    }
}

/// Units per millisecond over samples ordered oldest first.
fn impulse_velocity(samples: &[Sample]) -> f64 {
    let mut work = 0.0;
    let mut first_segment = true;
    for pair in samples.windows(2) {
        let dt = pair[1].time_ms - pair[0].time_ms;
        if dt <= 0.0 {
            continue;
        }
        let v_prev = kinetic_energy_to_velocity(work);
        let v_curr = (pair[1].position - pair[0].position) / dt;
        work += (v_curr - v_prev) * v_curr.abs();
        if first_segment {
            work *= 0.5;
            first_segment = false;
        }
    }
    kinetic_energy_to_velocity(work)
}

#[inline]
fn kinetic_energy_to_velocity(energy: f64) -> f64 {
    energy.signum() * (2.0 * energy.abs()).sqrt()
}

/// Touch position and timestamp for one move event of a swipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeSample {
    /// Milliseconds since touch-down.
    pub at_ms: f64,
    pub x: f64,
    pub y: f64,
}

impl Swipe {
    /// Evenly spaced move events from touch-down to the end of the drag;
    /// a `hold_ms` pause adds one more event at the final position.
    pub fn move_events(&self) -> impl Iterator<Item = SwipeSample> + use<> {
        let samples = self.samples.max(1);
        let duration = self.duration_ms as f64;
        let hold = self.hold_ms as f64;
        let [x0, y0] = self.from;
        let [x1, y1] = self.to;
        let drag = (1..=samples).map(move |step| {
            let t = f64::from(step) / f64::from(samples);
            SwipeSample {
                at_ms: duration * t,
                x: x0 + (x1 - x0) * t,
                y: y0 + (y1 - y0) * t,
            }
        });
        let pause = (hold > 0.0).then_some(SwipeSample {
            at_ms: duration + hold,
            x: x1,
            y: y1,
        });
        drag.chain(pause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe(from: [f64; 2], to: [f64; 2], duration_ms: u64, samples: u32) -> Swipe {
        Swipe {
            through: None,
            from,
            to,
            duration_ms,
            samples,
            hold_ms: 0,
            during: Vec::new(),
        }
    }

    #[test]
    fn empty_tracker_reports_zero() {
        assert_eq!(VelocityTracker1D::new().calculate_velocity(), 0.0);
    }

    #[test]
    fn single_sample_reports_zero() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0.0, 10.0);
        assert_eq!(tracker.calculate_velocity(), 0.0);
    }

    #[test]
    fn constant_motion_recovers_speed() {
        let mut tracker = VelocityTracker1D::new();
        for step in 0..8 {
            let t = f64::from(step) * 10.0;
            tracker.add_data_point(t, -2.0 * t);
        }
        let velocity = tracker.calculate_velocity();
        assert!((velocity + 2000.0).abs() < 1e-6, "velocity {velocity}");
    }

    #[test]
    fn pause_before_release_zeroes_velocity() {
        let mut tracker = VelocityTracker1D::new();
        for step in 0..5 {
            let t = f64::from(step) * 10.0;
            tracker.add_data_point(t, 3.0 * t);
        }
        tracker.add_data_point(40.0 + ASSUME_STOPPED_MS + 1.0, 120.0);
        assert_eq!(tracker.calculate_velocity(), 0.0);
    }

    #[test]
    fn stale_samples_fall_out_of_horizon() {
        let mut tracker = VelocityTracker1D::new();
        // Fast early motion, then slow recent motion.
        for step in 0..4 {
            let t = f64::from(step) * 10.0;
            tracker.add_data_point(t, 50.0 * t);
        }
        for step in 1..=12 {
            let t = 30.0 + f64::from(step) * 10.0;
            tracker.add_data_point(t, 1500.0 + (t - 30.0));
        }
        let velocity = tracker.calculate_velocity();
        assert!((velocity - 1000.0).abs() < 1e-6, "velocity {velocity}");
    }

    #[test]
    fn reset_clears_history() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0.0, 0.0);
        tracker.add_data_point(10.0, 10.0);
        tracker.reset();
        assert_eq!(tracker.calculate_velocity(), 0.0);
    }

    #[test]
    fn move_events_end_on_target() {
        let events: Vec<SwipeSample> = swipe([250.0, 300.0], [50.0, 300.0], 100, 4)
            .move_events()
            .collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].at_ms, 25.0);
        assert_eq!(events[0].x, 200.0);
        let last = events[3];
        assert_eq!((last.at_ms, last.x, last.y), (100.0, 50.0, 300.0));
    }

    #[test]
    fn hold_appends_resting_event() {
        let mut gesture = swipe([0.0, 0.0], [0.0, -90.0], 90, 3);
        gesture.hold_ms = 60;
        let events: Vec<SwipeSample> = gesture.move_events().collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3].at_ms, 150.0);
        assert_eq!(events[3].y, -90.0);
    }
}
