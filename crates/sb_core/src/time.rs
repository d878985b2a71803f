//! Fixed-timestep clock.
//!
//! The host loop feeds frame deltas in, the simulation pulls fixed-size steps
//! out. Frames that produce no steps leave their time in the accumulator for
//! the next frame, so the session always advances in whole `fixed_dt` slices.

pub struct TimeState {
    pub fixed_dt: f64,
    /// Longest host frame honored. Anything longer is cut down so a stall
    /// cannot queue an unbounded burst of steps. Never below `fixed_dt`.
    pub max_frame_dt: f64,
    accumulator: f64,
    pub sim_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub frame_dt: f64,
    pub interpolation_alpha: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt(1.0 / 60.0)
    }

    pub fn with_fixed_dt(fixed_dt: f64) -> Self {
        Self {
            fixed_dt,
            max_frame_dt: fixed_dt.max(0.25),
            accumulator: 0.0,
            sim_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            frame_dt: 0.0,
            interpolation_alpha: 0.0,
        }
    }

    pub fn begin_frame(&mut self, host_dt: f64) {
        self.frame_dt = host_dt.max(0.0);

        // Spiral-of-death cap
        if self.frame_dt > self.max_frame_dt {
            log::warn!(
                "Host frame of {:.1}ms capped to {:.1}ms",
                self.frame_dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            self.frame_dt = self.max_frame_dt;
        }

        self.accumulator += self.frame_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator < self.fixed_dt {
            return false;
        }
        self.accumulator -= self.fixed_dt;
        self.sim_time += self.fixed_dt;
        self.fixed_step_count += 1;
        self.steps_this_frame += 1;
        true
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }

    /// Host time not yet consumed by a step.
    pub fn pending(&self) -> f64 {
        self.accumulator
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps_for_frame(time: &mut TimeState, host_dt: f64) -> u32 {
        time.begin_frame(host_dt);
        while time.should_step() {}
        time.end_frame();
        time.steps_this_frame
    }

    #[test]
    fn slow_host_frames_produce_multiple_steps() {
        let mut time = TimeState::with_fixed_dt(0.125);
        time.max_frame_dt = 1.0;
        assert_eq!(steps_for_frame(&mut time, 0.4375), 3);
        assert!((time.interpolation_alpha - 0.5).abs() < 1e-6);
        assert!((time.sim_time - 0.375).abs() < 1e-9);
    }

    #[test]
    fn fast_host_frames_carry_remainder_forward() {
        let mut time = TimeState::with_fixed_dt(0.125);
        assert_eq!(steps_for_frame(&mut time, 0.0625), 0);
        assert!((time.pending() - 0.0625).abs() < 1e-9);
        assert_eq!(steps_for_frame(&mut time, 0.0625), 1);
        assert_eq!(time.fixed_step_count, 1);
        assert_eq!(time.frame_count, 2);
    }

    #[test]
    fn oversized_frame_is_capped() {
        let mut time = TimeState::with_fixed_dt(0.0625);
        let steps = steps_for_frame(&mut time, 10.0);
        assert_eq!(steps, 4);
        assert!((time.frame_dt - time.max_frame_dt).abs() < 1e-9);
    }

    #[test]
    fn long_fixed_step_still_advances_each_capped_frame() {
        let mut time = TimeState::with_fixed_dt(0.5);
        assert_eq!(steps_for_frame(&mut time, 2.0), 1);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut time = TimeState::with_fixed_dt(0.125);
        assert_eq!(steps_for_frame(&mut time, -1.0), 0);
        assert_eq!(time.frame_dt, 0.0);
    }
}
