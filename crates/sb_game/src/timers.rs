use sb_core::timer::TimerService;

use crate::alien::AlienId;

/// Payload of every timer a session schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTimer {
    /// Pick a new roam heading for this alien.
    RoamChange(AlienId),
    /// Put a passenger back at this bus stop.
    PassengerRespawn { stop: usize },
}

pub type SessionTimers = TimerService<SessionTimer>;

/// Turns step lengths in seconds into whole microseconds for the session
/// clock. The sub-microsecond remainder is carried into the next step, so the
/// clock tracks the summed step time instead of accumulating rounding error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepClock {
    carry_us: f64,
}

impl StepClock {
    pub fn step_us(&mut self, dt: f32) -> u64 {
        if !(dt > 0.0) {
            return 0;
        }
        let exact = f64::from(dt) * 1_000_000.0 + self.carry_us;
        let whole = exact.floor();
        self.carry_us = exact - whole;
        whole as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_steps_sum_to_elapsed_time() {
        let mut clock = StepClock::default();
        let one_second: u64 = (0..60).map(|_| clock.step_us(1.0 / 60.0)).sum();
        assert_eq!(one_second, 1_000_000);

        let mut clock = StepClock::default();
        let one_minute: u64 = (0..3_600).map(|_| clock.step_us(1.0 / 60.0)).sum();
        assert!(one_minute.abs_diff(60_000_000) <= 5, "drifted to {one_minute}");
    }

    #[test]
    fn exact_steps_have_no_carry() {
        let mut clock = StepClock::default();
        assert_eq!(clock.step_us(0.5), 500_000);
        assert_eq!(clock.step_us(0.5), 500_000);
    }

    #[test]
    fn non_positive_steps_do_not_move_clock() {
        let mut clock = StepClock::default();
        assert_eq!(clock.step_us(0.0), 0);
        assert_eq!(clock.step_us(-0.25), 0);
        assert_eq!(clock.step_us(f32::NAN), 0);
    }
}
