//! Game session: owns every entity and runs one fixed step at a time.
//!
//! Per-step order: input, physics integration, timer dispatch, AI, collision
//! and overlap rules, scoring, event publication. A player/alien collision
//! freezes the session in `GameOver` until the restart trigger is seen.

use sb_core::input::{InputState, Key};
use sb_core::rng::{SimRng, DEFAULT_SEED};
use sb_core::timer::{FiredTimer, TimerHandle};

use crate::alien::{AiParams, Alien, AlienId};
use crate::config::GameConfig;
use crate::events::{EventBus, EventObserver, GameEvent};
use crate::physics::{separate_elastic, WorldBounds};
use crate::player::{Player, PlayerInput};
use crate::spawn::{sample_spawn_point, SpawnRule};
use crate::timers::{SessionTimer, SessionTimers, StepClock};
use crate::transport::{try_drop_off, try_pickup, BusStop, Destination, PickupOutcome, ScoringRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Active,
    GameOver,
}

/// Everything the session samples from the host each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub player: PlayerInput,
    /// Confirm/restart trigger. Only honored in `GameOver`.
    pub restart: bool,
}

impl TickInput {
    /// Arrow keys or WASD steer; a fresh Space press is the restart trigger.
    pub fn from_keys(input: &InputState) -> Self {
        let any = |a: Key, b: Key| input.is_held(a) || input.is_held(b);
        Self {
            player: PlayerInput {
                left: any(Key::Left, Key::A),
                right: any(Key::Right, Key::D),
                up: any(Key::Up, Key::W),
                down: any(Key::Down, Key::S),
            },
            restart: input.is_just_pressed(Key::Space),
        }
    }
}

#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    bounds: WorldBounds,
    ai: AiParams,
    spawn_rule: SpawnRule,
    rules: ScoringRules,
    rng: SimRng,
    timers: SessionTimers,
    step_clock: StepClock,
    player: Player,
    aliens: Vec<Alien>,
    stops: Vec<BusStop>,
    destination: Destination,
    score: u32,
    state: SessionState,
    events: EventBus,
    next_alien_id: u32,
    steps: u64,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, DEFAULT_SEED)
    }

    /// Build a session and populate it. Initial score and manifest events are
    /// queued and reach observers on the first flush.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let mut session = Self {
            bounds: config.bounds(),
            ai: AiParams::from(&config.ai),
            spawn_rule: SpawnRule::from(&config.ai),
            rules: ScoringRules::from(&config.transport),
            rng: SimRng::from_seed_u64(seed),
            timers: SessionTimers::new(),
            step_clock: StepClock::default(),
            player: fresh_player(&config),
            aliens: Vec::new(),
            stops: Vec::new(),
            destination: destination(&config),
            score: 0,
            state: SessionState::Active,
            events: EventBus::new(),
            next_alien_id: 0,
            steps: 0,
            config,
        };
        session.populate();
        log::info!(
            "Session started (seed {}, {} aliens, {} bus stops)",
            seed,
            session.aliens.len(),
            session.stops.len()
        );
        session
    }

    pub fn subscribe(&mut self, observer: Box<dyn EventObserver>) {
        self.events.subscribe(observer);
        log::debug!("Event observers: {}", self.events.observer_count());
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn aliens(&self) -> &[Alien] {
        &self.aliens
    }

    pub fn aliens_mut(&mut self) -> &mut [Alien] {
        &mut self.aliens
    }

    pub fn bus_stops(&self) -> &[BusStop] {
        &self.stops
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Session clock in microseconds. Stops while the game is over.
    pub fn clock_us(&self) -> u64 {
        self.timers.now_us()
    }

    pub fn active_timer_count(&self) -> usize {
        self.timers.active_count()
    }

    /// Steps simulated since the session (or the last restart) began.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tick(&mut self, input: TickInput, dt: f32) {
        if self.state == SessionState::GameOver {
            if input.restart {
                self.restart();
            }
            self.events.flush();
            return;
        }

        self.player.apply_input(input.player);

        self.player.integrate(dt, &self.bounds);
        for alien in &mut self.aliens {
            alien.integrate(dt, &self.bounds);
        }

        let fired = self.timers.advance(self.step_clock.step_us(dt));
        self.dispatch_timers(fired);

        let target = Some(self.player.position());
        for alien in &mut self.aliens {
            alien.think(target, &self.ai, &mut self.timers, &mut self.rng);
        }

        self.resolve_collisions();

        if self.state == SessionState::Active {
            self.score_drop_off();
        }

        self.steps += 1;
        if !self.invariants_hold() {
            log::error!(
                "Session invariants violated at step {}: {}/{} passengers, aliens {:?}",
                self.steps,
                self.player.passenger_count(),
                self.player.capacity(),
                self.aliens
                    .iter()
                    .map(|a| (a.id(), a.state(), a.roam_timer()))
                    .collect::<Vec<_>>()
            );
            panic!("session invariants violated");
        }
        self.events.flush();
    }

    /// Tear down every entity and start over with score 0. Keeps drawing
    /// from the same RNG stream.
    pub fn restart(&mut self) {
        log::info!("Restarting session (previous score {})", self.score);
        for alien in self.aliens.drain(..) {
            alien.despawn(&mut self.timers);
        }
        self.timers.clear();
        self.events.publish(GameEvent::SessionReset);
        self.populate();
        self.events.flush();
    }

    pub fn on_player_passenger_overlap(&mut self, stop_index: usize) {
        let Some(stop) = self.stops.get_mut(stop_index) else {
            log::warn!("Pickup at unknown bus stop {}", stop_index);
            return;
        };
        match try_pickup(&mut self.player, stop, stop_index, &self.rules, &mut self.timers) {
            PickupOutcome::Boarded { count } => {
                log::info!("Passenger boarded at stop {} ({}/{})", stop_index, count, self.player.capacity());
                self.events.publish(GameEvent::PassengerCountChanged {
                    count,
                    capacity: self.player.capacity(),
                });
                if self.player.is_full() {
                    log::info!("Bus is full");
                }
            }
            PickupOutcome::BusFull => log::trace!("Bus full, passenger at stop {} keeps waiting", stop_index),
            PickupOutcome::NoPassenger => {}
        }
    }

    pub fn on_player_alien_collision(&mut self, id: AlienId) {
        if self.state == SessionState::GameOver {
            return;
        }
        log::info!("Bus hit by {}; game over with score {}", id, self.score);
        self.state = SessionState::GameOver;
        self.events.publish(GameEvent::GameOver {
            final_score: self.score,
        });
    }

    /// Bounce two overlapping aliens off each other. Purely physical.
    pub fn on_alien_alien_collision(&mut self, a: usize, b: usize) {
        if a == b || a >= self.aliens.len() || b >= self.aliens.len() {
            return;
        }
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.aliens.split_at_mut(high);
        let (first, second) = (&mut head[low].body, &mut tail[0].body);
        if separate_elastic(first, second) {
            first.clamp_to(&self.bounds);
            second.clamp_to(&self.bounds);
        }
    }

    /// Capacity bounds and the roam-timer ownership rules.
    pub fn invariants_hold(&self) -> bool {
        self.player.passenger_count() <= self.player.capacity()
            && self.aliens.iter().all(|a| a.timer_invariant_holds(&self.timers))
    }

    fn populate(&mut self) {
        self.player = fresh_player(&self.config);
        self.destination = destination(&self.config);
        let passenger_hitbox = self.config.passenger_hitbox();
        self.stops = self
            .config
            .layout
            .bus_stops
            .iter()
            .map(|p| BusStop::new(p.to_vec2(), passenger_hitbox))
            .collect();
        self.spawn_aliens();
        self.score = 0;
        self.steps = 0;
        self.state = SessionState::Active;

        self.events.publish(GameEvent::ScoreChanged { score: 0 });
        self.events.publish(GameEvent::PassengerCountChanged {
            count: 0,
            capacity: self.player.capacity(),
        });
    }

    fn spawn_aliens(&mut self) {
        let avoid = self.config.player.start.to_vec2();
        let hitbox = self.config.alien_hitbox();
        for tier in &self.config.tiers {
            for _ in 0..tier.count {
                let spawn = sample_spawn_point(&mut self.rng, &self.bounds, avoid, &self.spawn_rule);
                let id = AlienId(self.next_alien_id);
                self.next_alien_id += 1;

                let mut alien = Alien::new(id, tier.tier, spawn.position, hitbox, tier.chase_speed);
                alien.start_roaming(&self.ai, &mut self.timers, &mut self.rng);
                log::debug!(
                    "Spawned {} ({}, chase {}) at {:?} after {} attempts",
                    id,
                    alien.tier(),
                    alien.chase_speed(),
                    spawn.position,
                    spawn.attempts
                );
                self.aliens.push(alien);
            }
        }
    }

    fn dispatch_timers(&mut self, fired: Vec<FiredTimer<SessionTimer>>) {
        for FiredTimer { handle, payload, .. } in fired {
            match payload {
                SessionTimer::RoamChange(id) => self.dispatch_roam_change(id, handle),
                SessionTimer::PassengerRespawn { stop } => self.dispatch_respawn(stop, handle),
            }
        }
    }

    fn dispatch_roam_change(&mut self, id: AlienId, handle: TimerHandle) {
        match self.aliens.iter_mut().find(|a| a.id() == id) {
            Some(alien) => {
                if alien.on_roam_timer(handle, &self.ai, &mut self.rng) {
                    log::trace!("{} picked a new roam heading", id);
                }
            }
            None => log::warn!("Roam timer fired for despawned {}", id),
        }
    }

    fn dispatch_respawn(&mut self, stop_index: usize, handle: TimerHandle) {
        let Some(stop) = self.stops.get_mut(stop_index) else {
            log::warn!("Respawn timer fired for unknown bus stop {}", stop_index);
            return;
        };
        if stop.pending_respawn() != Some(handle) {
            log::warn!("Stale respawn timer for bus stop {}", stop_index);
            return;
        }
        if stop.respawn_passenger() {
            log::debug!("Passenger respawned at stop {}", stop_index);
        }
    }

    fn resolve_collisions(&mut self) {
        let hit = self
            .aliens
            .iter()
            .find(|a| a.body.overlaps(&self.player.body))
            .map(Alien::id);
        if let Some(id) = hit {
            self.on_player_alien_collision(id);
            return;
        }

        for a in 0..self.aliens.len() {
            for b in a + 1..self.aliens.len() {
                if self.aliens[a].body.overlaps(&self.aliens[b].body) {
                    self.on_alien_alien_collision(a, b);
                }
            }
        }

        for index in 0..self.stops.len() {
            let touching = self.stops[index]
                .passenger()
                .is_some_and(|p| p.body.overlaps(&self.player.body));
            if touching {
                self.on_player_passenger_overlap(index);
            }
        }
    }

    fn score_drop_off(&mut self) {
        let Some(drop) = try_drop_off(&mut self.player, &self.destination, &self.rules) else {
            return;
        };
        self.score = self.score.saturating_add(drop.total());
        log::info!(
            "Dropped off {} passengers for {} points (bonus {}); score {}",
            drop.dropped,
            drop.points,
            drop.bonus,
            self.score
        );
        self.events.publish(GameEvent::ScoreChanged { score: self.score });
        self.events.publish(GameEvent::PassengerCountChanged {
            count: self.player.passenger_count(),
            capacity: self.player.capacity(),
        });
        if drop.bonus > 0 {
            self.events.publish(GameEvent::BonusAwarded { amount: drop.bonus });
        }
    }
}

fn fresh_player(config: &GameConfig) -> Player {
    Player::new(config.player.start.to_vec2(), config.player_hitbox(), &config.player)
}

fn destination(config: &GameConfig) -> Destination {
    Destination {
        position: config.destination_position(),
        drop_off_radius: config.drop_off_radius(),
    }
}
