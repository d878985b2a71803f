use glam::Vec2;

use crate::config::PlayerConfig;
use crate::physics::{Body, Hitbox, WorldBounds};

/// Directional input sampled once per step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Whether the last input applied forward thrust. Presentation reads this to
/// pick the idle or thrusting sprite; the simulation never does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThrustState {
    #[default]
    Idle,
    Forward,
    Reverse,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    thrust: ThrustState,
    passenger_count: u32,
    capacity: u32,
    rotation_speed: f32,
    forward_thrust_speed: f32,
    reverse_acceleration: f32,
}

impl Player {
    pub fn new(position: Vec2, hitbox: Hitbox, config: &PlayerConfig) -> Self {
        let mut body = Body::new(position, hitbox);
        body.drag = config.drag;
        body.max_speed = Some(config.max_speed);
        Self {
            body,
            thrust: ThrustState::Idle,
            passenger_count: 0,
            capacity: config.capacity.max(1),
            rotation_speed: config.rotation_speed_rad(),
            forward_thrust_speed: config.forward_thrust_speed,
            reverse_acceleration: config.reverse_acceleration,
        }
    }

    /// Turn input into rotation and thrust. Only velocity, acceleration and
    /// angular velocity change here; position moves in `integrate`.
    pub fn apply_input(&mut self, input: PlayerInput) {
        // Right wins when both turn keys are held.
        self.body.angular_velocity = if input.right {
            self.rotation_speed
        } else if input.left {
            -self.rotation_speed
        } else {
            0.0
        };

        if input.up {
            // Forward thrust snaps velocity instead of accumulating it.
            self.body.velocity = self.body.facing() * self.forward_thrust_speed;
            self.body.acceleration = Vec2::ZERO;
            self.thrust = ThrustState::Forward;
        } else if input.down {
            self.body.acceleration = self.body.facing() * -self.reverse_acceleration;
            self.thrust = ThrustState::Reverse;
        } else {
            self.body.acceleration = Vec2::ZERO;
            self.thrust = ThrustState::Idle;
        }
    }

    pub fn integrate(&mut self, dt: f32, bounds: &WorldBounds) {
        self.body.integrate(dt, bounds);
    }

    /// Board one passenger. Fails without side effects when the bus is full.
    pub fn pickup(&mut self) -> bool {
        if self.passenger_count >= self.capacity {
            return false;
        }
        self.passenger_count += 1;
        true
    }

    /// Empty the bus and report how many passengers got off.
    pub fn drop_off_all(&mut self) -> u32 {
        std::mem::take(&mut self.passenger_count)
    }

    pub fn passenger_count(&self) -> u32 {
        self.passenger_count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.passenger_count >= self.capacity
    }

    pub fn thrust(&self) -> ThrustState {
        self.thrust
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }
}
