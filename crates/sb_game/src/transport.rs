//! Passenger pickup, drop-off and scoring.
//!
//! Each bus stop holds at most one waiting passenger. Boarding removes the
//! passenger and schedules a one-shot respawn at the same stop; a full bus
//! leaves the passenger waiting. Dropping off at the destination empties the
//! bus for `dropped * per_passenger_score`, plus a flat bonus when the bus
//! arrived full.

use glam::Vec2;
use sb_core::timer::TimerHandle;

use crate::config::TransportConfig;
use crate::physics::{Body, Hitbox};
use crate::player::Player;
use crate::timers::{SessionTimer, SessionTimers};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRules {
    pub per_passenger_score: u32,
    pub full_bus_bonus: u32,
    pub respawn_delay_us: u64,
}

impl From<&TransportConfig> for ScoringRules {
    fn from(config: &TransportConfig) -> Self {
        Self {
            per_passenger_score: config.per_passenger_score,
            full_bus_bonus: config.full_bus_bonus,
            respawn_delay_us: config.respawn_delay_us(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Passenger {
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct BusStop {
    position: Vec2,
    hitbox: Hitbox,
    passenger: Option<Passenger>,
    respawn: Option<TimerHandle>,
}

impl BusStop {
    /// A stop starts with a passenger waiting.
    pub fn new(position: Vec2, hitbox: Hitbox) -> Self {
        let mut stop = Self {
            position,
            hitbox,
            passenger: None,
            respawn: None,
        };
        stop.respawn_passenger();
        stop
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn passenger(&self) -> Option<&Passenger> {
        self.passenger.as_ref()
    }

    pub fn has_passenger(&self) -> bool {
        self.passenger.is_some()
    }

    pub fn pending_respawn(&self) -> Option<TimerHandle> {
        self.respawn
    }

    /// Put a passenger back at the stop's original location. Returns false if
    /// one was already waiting.
    pub fn respawn_passenger(&mut self) -> bool {
        self.respawn = None;
        if self.passenger.is_some() {
            return false;
        }
        self.passenger = Some(Passenger {
            body: Body::new(self.position, self.hitbox),
        });
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub position: Vec2,
    /// Radius within which the bus counts as docked.
    pub drop_off_radius: f32,
}

impl Destination {
    pub fn in_range(&self, point: Vec2) -> bool {
        point.distance(self.position) < self.drop_off_radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupOutcome {
    Boarded { count: u32 },
    BusFull,
    NoPassenger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOff {
    pub dropped: u32,
    pub points: u32,
    /// Zero unless the bus arrived full.
    pub bonus: u32,
}

impl DropOff {
    pub fn total(&self) -> u32 {
        self.points + self.bonus
    }
}

/// Board the passenger waiting at `stop`, if there is room.
pub fn try_pickup(
    player: &mut Player,
    stop: &mut BusStop,
    stop_index: usize,
    rules: &ScoringRules,
    timers: &mut SessionTimers,
) -> PickupOutcome {
    if !stop.has_passenger() {
        return PickupOutcome::NoPassenger;
    }
    if !player.pickup() {
        return PickupOutcome::BusFull;
    }

    stop.passenger = None;
    stop.respawn = Some(timers.schedule_once(
        rules.respawn_delay_us,
        SessionTimer::PassengerRespawn { stop: stop_index },
    ));
    PickupOutcome::Boarded {
        count: player.passenger_count(),
    }
}

/// Unload everyone if the bus is carrying passengers and is docked at the
/// destination.
pub fn try_drop_off(player: &mut Player, destination: &Destination, rules: &ScoringRules) -> Option<DropOff> {
    if player.passenger_count() == 0 || !destination.in_range(player.position()) {
        return None;
    }

    let capacity = player.capacity();
    let dropped = player.drop_off_all();
    let bonus = if dropped == capacity {
        rules.full_bus_bonus
    } else {
        0
    };
    Some(DropOff {
        dropped,
        points: dropped.saturating_mul(rules.per_passenger_score),
        bonus,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    fn rules() -> ScoringRules {
        ScoringRules::from(&TransportConfig::default())
    }

    fn player_at(position: Vec2) -> Player {
        Player::new(
            position,
            Hitbox::Rect {
                half_w: 26.0,
                half_h: 12.0,
            },
            &PlayerConfig::default(),
        )
    }

    fn stop() -> BusStop {
        BusStop::new(
            Vec2::new(300.0, 400.0),
            Hitbox::Rect {
                half_w: 16.0,
                half_h: 20.0,
            },
        )
    }

    fn destination() -> Destination {
        Destination {
            position: Vec2::new(1600.0, 1200.0),
            drop_off_radius: 76.0,
        }
    }

    #[test]
    fn pickup_boards_and_schedules_respawn() {
        let mut timers = SessionTimers::new();
        let mut player = player_at(Vec2::new(300.0, 400.0));
        let mut stop = stop();

        let outcome = try_pickup(&mut player, &mut stop, 2, &rules(), &mut timers);
        assert_eq!(outcome, PickupOutcome::Boarded { count: 1 });
        assert!(!stop.has_passenger());
        assert!(stop.pending_respawn().is_some());

        assert!(timers.advance(rules().respawn_delay_us - 1).is_empty());
        let fired = timers.advance(1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].payload, SessionTimer::PassengerRespawn { stop: 2 });
    }

    #[test]
    fn full_bus_leaves_passenger_waiting() {
        let mut timers = SessionTimers::new();
        let mut player = player_at(Vec2::new(300.0, 400.0));
        while player.pickup() {}
        let mut stop = stop();

        let outcome = try_pickup(&mut player, &mut stop, 0, &rules(), &mut timers);
        assert_eq!(outcome, PickupOutcome::BusFull);
        assert!(stop.has_passenger());
        assert!(stop.pending_respawn().is_none());
        assert_eq!(timers.active_count(), 0);
        assert_eq!(player.passenger_count(), player.capacity());
    }

    #[test]
    fn empty_stop_cannot_be_picked_twice() {
        let mut timers = SessionTimers::new();
        let mut player = player_at(Vec2::new(300.0, 400.0));
        let mut stop = stop();
        try_pickup(&mut player, &mut stop, 0, &rules(), &mut timers);

        let outcome = try_pickup(&mut player, &mut stop, 0, &rules(), &mut timers);
        assert_eq!(outcome, PickupOutcome::NoPassenger);
        assert_eq!(player.passenger_count(), 1);
        assert_eq!(timers.active_count(), 1);
    }

    #[test]
    fn respawn_restores_passenger_at_original_location() {
        let mut timers = SessionTimers::new();
        let mut player = player_at(Vec2::new(300.0, 400.0));
        let mut stop = stop();
        try_pickup(&mut player, &mut stop, 0, &rules(), &mut timers);

        assert!(stop.respawn_passenger());
        let passenger = stop.passenger().expect("passenger respawned");
        assert_eq!(passenger.body.position, Vec2::new(300.0, 400.0));
        assert!(stop.pending_respawn().is_none());
        assert!(!stop.respawn_passenger());
    }

    #[test]
    fn full_bus_drop_off_earns_bonus() {
        let mut player = player_at(Vec2::new(1600.0, 1200.0));
        while player.pickup() {}

        let drop = try_drop_off(&mut player, &destination(), &rules()).expect("docked");
        assert_eq!(drop.dropped, 5);
        assert_eq!(drop.points, 50);
        assert_eq!(drop.bonus, 50);
        assert_eq!(drop.total(), 100);
        assert_eq!(player.passenger_count(), 0);
    }

    #[test]
    fn partial_drop_off_has_no_bonus() {
        let mut player = player_at(Vec2::new(1650.0, 1200.0));
        for _ in 0..3 {
            player.pickup();
        }
        let drop = try_drop_off(&mut player, &destination(), &rules()).expect("docked");
        assert_eq!(drop.dropped, 3);
        assert_eq!(drop.points, 30);
        assert_eq!(drop.bonus, 0);
    }

    #[test]
    fn no_drop_off_outside_radius_or_when_empty() {
        let mut far = player_at(Vec2::new(1700.0, 1200.0));
        far.pickup();
        assert!(try_drop_off(&mut far, &destination(), &rules()).is_none());
        assert_eq!(far.passenger_count(), 1);

        let mut empty = player_at(Vec2::new(1600.0, 1200.0));
        assert!(try_drop_off(&mut empty, &destination(), &rules()).is_none());
    }
}
