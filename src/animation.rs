//! The animation clock and the per-hexagon depth oscillator.

use std::time::{Duration, Instant};

use crate::config::TimeStep;

/// Depth of a hexagon at `time`: `amplitude · sin(time · speed + phase)`.
pub fn oscillation(time: f32, phase: f32, speed: f32, amplitude: f32) -> f32 {
    amplitude * (time * speed + phase).sin()
}

/// Monotonic animation time accumulator.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    time: f32,
    step: TimeStep,
    last_tick: Option<Instant>,
}

impl AnimationClock {
    pub fn new(step: TimeStep) -> Self {
        Self {
            time: 0.0,
            step,
            last_tick: None,
        }
    }

    /// Advances by one frame and returns the new time.
    pub fn tick(&mut self) -> f32 {
        match self.step {
            TimeStep::Fixed(_) => self.advance(Duration::ZERO),
            TimeStep::Measured { .. } => {
                let now = Instant::now();
                let elapsed = self
                    .last_tick
                    .map(|last| now.duration_since(last))
                    .unwrap_or_default();
                self.last_tick = Some(now);
                self.advance(elapsed)
            }
        }
    }

    /// Advances as if `elapsed` real time had passed since the previous frame.
    ///
    /// Fixed steps ignore `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.time += match self.step {
            TimeStep::Fixed(dt) => dt,
            TimeStep::Measured { units_per_second } => elapsed.as_secs_f32() * units_per_second,
        };
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn fixed_step_adds_constant_per_frame() {
        let mut clock = AnimationClock::new(TimeStep::Fixed(0.008));
        for _ in 0..10 {
            clock.tick();
        }
        assert!((clock.time() - 0.08).abs() < 1e-6);
    }

    #[test]
    fn fixed_step_ignores_wall_clock() {
        let mut clock = AnimationClock::new(TimeStep::Fixed(0.008));
        clock.advance(Duration::from_secs(5));
        assert!((clock.time() - 0.008).abs() < 1e-7);
    }

    #[test]
    fn measured_step_scales_elapsed_time() {
        let mut clock = AnimationClock::new(TimeStep::Measured {
            units_per_second: 0.48,
        });
        clock.advance(Duration::from_millis(500));
        assert!((clock.time() - 0.24).abs() < 1e-6);
    }

    #[test]
    fn measured_first_tick_does_not_jump() {
        let mut clock = AnimationClock::new(TimeStep::Measured {
            units_per_second: 1.0,
        });
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn oscillation_respects_phase_and_amplitude() {
        assert!((oscillation(0.0, FRAC_PI_2, 0.3, 0.25) - 0.25).abs() < 1e-6);
        assert!(oscillation(0.0, 0.0, 0.3, 0.25).abs() < 1e-6);
        for i in 0..100 {
            let z = oscillation(i as f32 * 0.37, 1.1, 0.3, 0.25);
            assert!(z.abs() <= 0.25 + 1e-6);
        }
    }
}
