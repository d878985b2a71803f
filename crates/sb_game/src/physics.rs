//! Minimal arcade physics: kinematic bodies, axis-aligned hitboxes, and a
//! rectangular world that bodies are clamped into.
//!
//! Integration order per step mirrors a classic arcade engine:
//!  1. rotation from angular velocity
//!  2. acceleration if any, otherwise per-second damping
//!  3. speed clamp
//!  4. position
//!  5. world-bounds clamp, zeroing the velocity component that points into
//!     the wall
//!
//! Hitboxes never rotate with the body. A rotated bus still collides with its
//! unrotated rectangle.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hitbox {
    Circle { radius: f32 },
    Rect { half_w: f32, half_h: f32 },
}

impl Hitbox {
    /// Half extents of the hitbox's bounding rectangle.
    pub fn half_extents(self) -> Vec2 {
        match self {
            Self::Circle { radius } => Vec2::splat(radius),
            Self::Rect { half_w, half_h } => Vec2::new(half_w, half_h),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Radians; 0 faces +x.
    pub rotation: f32,
    /// Radians per second.
    pub angular_velocity: f32,
    /// Fraction of velocity kept after one second without acceleration.
    /// 1.0 disables damping.
    pub drag: f32,
    pub max_speed: Option<f32>,
    pub hitbox: Hitbox,
}

impl Body {
    pub fn new(position: Vec2, hitbox: Hitbox) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            drag: 1.0,
            max_speed: None,
            hitbox,
        }
    }

    /// Unit vector the body is facing.
    pub fn facing(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    pub fn integrate(&mut self, dt: f32, bounds: &WorldBounds) {
        self.rotation = wrap_angle(self.rotation + self.angular_velocity * dt);

        if self.acceleration != Vec2::ZERO {
            self.velocity += self.acceleration * dt;
        } else if self.drag < 1.0 {
            self.velocity *= self.drag.max(0.0).powf(dt);
        }

        if let Some(max_speed) = self.max_speed {
            self.velocity = self.velocity.clamp_length_max(max_speed);
        }

        self.position += self.velocity * dt;
        self.clamp_to(bounds);
    }

    /// Keep the whole hitbox inside the world. Returns true if the body was
    /// pushed back in.
    pub fn clamp_to(&mut self, bounds: &WorldBounds) -> bool {
        let half = self.hitbox.half_extents();
        let min = half;
        let max = Vec2::new(bounds.width - half.x, bounds.height - half.y).max(min);
        let mut blocked = false;

        if self.position.x < min.x {
            self.position.x = min.x;
            self.velocity.x = self.velocity.x.max(0.0);
            blocked = true;
        } else if self.position.x > max.x {
            self.position.x = max.x;
            self.velocity.x = self.velocity.x.min(0.0);
            blocked = true;
        }

        if self.position.y < min.y {
            self.position.y = min.y;
            self.velocity.y = self.velocity.y.max(0.0);
            blocked = true;
        } else if self.position.y > max.y {
            self.position.y = max.y;
            self.velocity.y = self.velocity.y.min(0.0);
            blocked = true;
        }

        blocked
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        overlaps(self.position, self.hitbox, other.position, other.hitbox)
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }
}

pub fn overlaps(a_pos: Vec2, a: Hitbox, b_pos: Vec2, b: Hitbox) -> bool {
    match (a, b) {
        (Hitbox::Circle { radius: ra }, Hitbox::Circle { radius: rb }) => {
            a_pos.distance_squared(b_pos) < (ra + rb) * (ra + rb)
        }
        (Hitbox::Rect { .. }, Hitbox::Rect { .. }) => {
            let delta = (a_pos - b_pos).abs();
            let reach = a.half_extents() + b.half_extents();
            delta.x < reach.x && delta.y < reach.y
        }
        (Hitbox::Circle { radius }, Hitbox::Rect { half_w, half_h }) => {
            circle_rect_overlap(a_pos, radius, b_pos, Vec2::new(half_w, half_h))
        }
        (Hitbox::Rect { half_w, half_h }, Hitbox::Circle { radius }) => {
            circle_rect_overlap(b_pos, radius, a_pos, Vec2::new(half_w, half_h))
        }
    }
}

fn circle_rect_overlap(center: Vec2, radius: f32, rect_center: Vec2, half: Vec2) -> bool {
    let closest = center.clamp(rect_center - half, rect_center + half);
    center.distance_squared(closest) < radius * radius
}

/// Velocity that carries `from` straight at `to` at `speed`. Zero when the
/// two points coincide.
pub fn velocity_toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Equal-mass elastic response for two overlapping circular bodies: push
/// them apart along the contact normal and swap their normal velocity
/// components. Returns false (and does nothing) if they are not overlapping
/// circles.
pub fn separate_elastic(a: &mut Body, b: &mut Body) -> bool {
    let (Hitbox::Circle { radius: ra }, Hitbox::Circle { radius: rb }) = (a.hitbox, b.hitbox)
    else {
        return false;
    };

    let delta = b.position - a.position;
    let distance = delta.length();
    let penetration = ra + rb - distance;
    if penetration <= 0.0 {
        return false;
    }

    // Coincident centers have no normal; pick +x so the pair still separates.
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec2::X
    };

    let push = normal * (penetration * 0.5);
    a.position -= push;
    b.position += push;

    let closing = (a.velocity - b.velocity).dot(normal);
    if closing > 0.0 {
        a.velocity -= normal * closing;
        b.velocity += normal * closing;
    }
    true
}

fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}
