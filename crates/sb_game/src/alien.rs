//! Alien AI: a two-state machine driven by distance to the bus.
//!
//! ```text
//!             distance < detection radius
//!   Roaming ------------------------------> Chasing
//!      ^                                       |
//!      +---------------------------------------+
//!             distance >= detection radius
//! ```
//!
//! - **Roaming** drifts at `roam_speed` along a random heading. A repeating
//!   session timer picks a fresh heading every `roam_change_dir_delay`. The
//!   alien holds the timer's handle, and the handle exists exactly while the
//!   alien is roaming.
//! - **Chasing** re-aims straight at the bus every step at the tier's
//!   `chase_speed`. No roam timer is alive while chasing.
//!
//! Entering a state is idempotent. Re-entering Roaming replaces the old timer
//! rather than stacking a second one.

use glam::Vec2;
use sb_core::rng::SimRng;
use sb_core::timer::TimerHandle;

use crate::config::AiConfig;
use crate::physics::{velocity_toward, Body, Hitbox, WorldBounds};
use crate::tier::AlienTier;
use crate::timers::{SessionTimer, SessionTimers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlienId(pub u32);

impl std::fmt::Display for AlienId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "alien#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Roaming,
    Chasing,
}

/// Tier-independent AI tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiParams {
    pub detection_radius: f32,
    pub roam_speed: f32,
    pub roam_change_dir_delay_us: u64,
}

impl From<&AiConfig> for AiParams {
    fn from(config: &AiConfig) -> Self {
        Self {
            detection_radius: config.detection_radius,
            roam_speed: config.roam_speed,
            roam_change_dir_delay_us: config.roam_change_dir_delay_us(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alien {
    id: AlienId,
    tier: AlienTier,
    pub body: Body,
    chase_speed: f32,
    state: AiState,
    roam_timer: Option<TimerHandle>,
}

impl Alien {
    /// A freshly spawned alien is Roaming but has no timer yet; call
    /// `start_roaming` to arm it.
    pub fn new(id: AlienId, tier: AlienTier, position: Vec2, hitbox: Hitbox, chase_speed: f32) -> Self {
        Self {
            id,
            tier,
            body: Body::new(position, hitbox),
            chase_speed,
            state: AiState::Roaming,
            roam_timer: None,
        }
    }

    pub fn id(&self) -> AlienId {
        self.id
    }

    pub fn tier(&self) -> AlienTier {
        self.tier
    }

    pub fn chase_speed(&self) -> f32 {
        self.chase_speed
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn roam_timer(&self) -> Option<TimerHandle> {
        self.roam_timer
    }

    /// Enter Roaming: random heading now, and a repeating timer for later
    /// headings. Any previous roam timer is canceled first.
    pub fn start_roaming(&mut self, params: &AiParams, timers: &mut SessionTimers, rng: &mut SimRng) {
        if let Some(old) = self.roam_timer.take() {
            timers.cancel(old);
        }
        self.state = AiState::Roaming;
        self.pick_roam_heading(params, rng);
        self.roam_timer = Some(timers.schedule_repeating(
            params.roam_change_dir_delay_us,
            SessionTimer::RoamChange(self.id),
        ));
    }

    /// Enter Chasing and drop the roam timer.
    pub fn start_chasing(&mut self, timers: &mut SessionTimers) {
        if let Some(handle) = self.roam_timer.take() {
            timers.cancel(handle);
        }
        self.state = AiState::Chasing;
    }

    /// Evaluate the state machine against the bus position and steer.
    /// Returns the state entered this step, if any.
    ///
    /// A missing target skips the alien's behavior for this step; velocity
    /// and state stay as they were.
    pub fn think(
        &mut self,
        target: Option<Vec2>,
        params: &AiParams,
        timers: &mut SessionTimers,
        rng: &mut SimRng,
    ) -> Option<AiState> {
        let target = target?;
        let distance = self.body.distance_to(target);

        let entered = if distance < params.detection_radius {
            let entered = (self.state != AiState::Chasing).then(|| {
                self.start_chasing(timers);
                AiState::Chasing
            });
            self.body.velocity = velocity_toward(self.body.position, target, self.chase_speed);
            entered
        } else if self.state == AiState::Chasing {
            self.start_roaming(params, timers, rng);
            Some(AiState::Roaming)
        } else {
            None
        };

        if let Some(state) = entered {
            log::debug!("{} ({}) -> {:?} at distance {:.0}", self.id, self.tier, state, distance);
        }
        assert!(
            self.state != AiState::Chasing || self.roam_timer.is_none(),
            "{} is chasing with a live roam timer",
            self.id
        );
        entered
    }

    /// Handle a fired roam timer. Ignored unless the alien is still roaming
    /// on that exact timer. Returns whether the heading changed.
    pub fn on_roam_timer(&mut self, handle: TimerHandle, params: &AiParams, rng: &mut SimRng) -> bool {
        if self.state != AiState::Roaming || self.roam_timer != Some(handle) {
            return false;
        }
        self.pick_roam_heading(params, rng);
        true
    }

    pub fn integrate(&mut self, dt: f32, bounds: &WorldBounds) {
        self.body.integrate(dt, bounds);
    }

    /// Remove the alien for good, canceling anything it still has scheduled.
    pub fn despawn(mut self, timers: &mut SessionTimers) {
        if let Some(handle) = self.roam_timer.take() {
            timers.cancel(handle);
        }
    }

    /// Chasing never owns a timer; Roaming owns one that is still live.
    pub fn timer_invariant_holds(&self, timers: &SessionTimers) -> bool {
        match self.state {
            AiState::Chasing => self.roam_timer.is_none(),
            AiState::Roaming => self.roam_timer.map_or(true, |h| timers.is_active(h)),
        }
    }

    fn pick_roam_heading(&mut self, params: &AiParams, rng: &mut SimRng) {
        self.body.velocity = Vec2::from_angle(rng.angle()) * params.roam_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 0.001;

    fn params() -> AiParams {
        AiParams::from(&AiConfig::default())
    }

    fn roaming_alien(timers: &mut SessionTimers, rng: &mut SimRng) -> Alien {
        let mut alien = Alien::new(
            AlienId(1),
            AlienTier::Green,
            Vec2::new(1000.0, 1000.0),
            Hitbox::Circle { radius: 25.0 },
            180.0,
        );
        alien.start_roaming(&params(), timers, rng);
        alien
    }

    #[test]
    fn roaming_entry_arms_one_timer_at_roam_speed() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let alien = roaming_alien(&mut timers, &mut rng);

        assert_eq!(alien.state(), AiState::Roaming);
        assert_eq!(timers.active_count(), 1);
        assert!((alien.body.velocity.length() - 70.0).abs() < EPS);
        assert!(alien.timer_invariant_holds(&timers));
    }

    #[test]
    fn roaming_entry_twice_keeps_single_timer() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        let first = alien.roam_timer().expect("timer armed");

        alien.start_roaming(&params(), &mut timers, &mut rng);
        assert_eq!(timers.active_count(), 1);
        assert!(!timers.is_active(first));
        assert!(alien.roam_timer().is_some());
    }

    #[test]
    fn close_target_switches_to_chasing_and_cancels_timer() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);

        let target = Vec2::new(1300.0, 1000.0);
        let entered = alien.think(Some(target), &params(), &mut timers, &mut rng);
        assert_eq!(entered, Some(AiState::Chasing));
        assert_eq!(alien.state(), AiState::Chasing);
        assert!(alien.roam_timer().is_none());
        assert_eq!(timers.active_count(), 0);
        assert!((alien.body.velocity.x - 180.0).abs() < EPS);
        assert!(alien.body.velocity.y.abs() < EPS);
    }

    #[test]
    fn chasing_re_aims_every_step() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        alien.think(Some(Vec2::new(1100.0, 1000.0)), &params(), &mut timers, &mut rng);

        let entered = alien.think(Some(Vec2::new(1000.0, 1200.0)), &params(), &mut timers, &mut rng);
        assert_eq!(entered, None);
        assert!(alien.body.velocity.x.abs() < EPS);
        assert!((alien.body.velocity.y - 180.0).abs() < EPS);
    }

    #[test]
    fn leaving_radius_returns_to_roaming_with_one_timer() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        alien.think(Some(Vec2::new(1100.0, 1000.0)), &params(), &mut timers, &mut rng);

        let entered = alien.think(Some(Vec2::new(1400.0, 1000.0)), &params(), &mut timers, &mut rng);
        assert_eq!(entered, Some(AiState::Roaming));
        assert_eq!(alien.state(), AiState::Roaming);
        assert_eq!(timers.active_count(), 1);
        assert!(alien.timer_invariant_holds(&timers));

        // Staying out of range does not re-enter Roaming.
        let entered = alien.think(Some(Vec2::new(2000.0, 1000.0)), &params(), &mut timers, &mut rng);
        assert_eq!(entered, None);
        assert_eq!(timers.active_count(), 1);
    }

    #[test]
    fn detection_boundary_is_exclusive() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        let entered = alien.think(Some(Vec2::new(1400.0, 1000.0)), &params(), &mut timers, &mut rng);
        assert_eq!(entered, None);
        assert_eq!(alien.state(), AiState::Roaming);
    }

    #[test]
    fn missing_target_skips_behavior() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        let velocity = alien.body.velocity;

        assert_eq!(alien.think(None, &params(), &mut timers, &mut rng), None);
        assert_eq!(alien.state(), AiState::Roaming);
        assert_eq!(alien.body.velocity, velocity);
    }

    #[test]
    fn roam_timer_rerolls_heading_only_for_current_handle() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        let handle = alien.roam_timer().expect("timer armed");

        let fired = timers.advance(params().roam_change_dir_delay_us);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].payload, SessionTimer::RoamChange(AlienId(1)));
        assert!(alien.on_roam_timer(handle, &params(), &mut rng));
        assert!((alien.body.velocity.length() - 70.0).abs() < EPS);

        // A stale handle from an earlier roam cycle is ignored.
        alien.start_roaming(&params(), &mut timers, &mut rng);
        assert!(!alien.on_roam_timer(handle, &params(), &mut rng));
    }

    #[test]
    fn roam_timer_ignored_while_chasing() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        let handle = alien.roam_timer().expect("timer armed");
        alien.start_chasing(&mut timers);
        let velocity = alien.body.velocity;

        assert!(!alien.on_roam_timer(handle, &params(), &mut rng));
        assert_eq!(alien.body.velocity, velocity);
    }

    #[test]
    #[should_panic(expected = "chasing with a live roam timer")]
    fn chasing_with_roam_timer_is_fatal() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let mut alien = roaming_alien(&mut timers, &mut rng);
        let handle = alien.roam_timer();
        alien.start_chasing(&mut timers);
        alien.roam_timer = handle;
        alien.think(Some(Vec2::new(1100.0, 1000.0)), &params(), &mut timers, &mut rng);
    }

    #[test]
    fn despawn_cancels_roam_timer() {
        let mut timers = SessionTimers::new();
        let mut rng = SimRng::default();
        let alien = roaming_alien(&mut timers, &mut rng);
        alien.despawn(&mut timers);
        assert_eq!(timers.active_count(), 0);
        assert!(timers.advance(10_000_000).is_empty());
    }
}
