//! Spawn placement by rejection sampling.
//!
//! Candidates are drawn uniformly over the world (inset by `margin` so a
//! hitbox never starts outside the walls) and rejected while they sit inside
//! the exclusion radius around the bus start. Sampling is capped; when the cap
//! is hit (tiny world, huge radius) the farthest candidate seen wins.

use glam::Vec2;
use sb_core::rng::SimRng;

use crate::config::AiConfig;
use crate::physics::WorldBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRule {
    pub safe_distance: f32,
    pub max_attempts: u32,
    pub margin: f32,
}

impl From<&AiConfig> for SpawnRule {
    fn from(config: &AiConfig) -> Self {
        Self {
            safe_distance: config.spawn_safe_distance,
            max_attempts: config.spawn_max_attempts,
            margin: config.hit_radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub attempts: u32,
    /// False when the retry cap was hit and the fallback was used.
    pub satisfied: bool,
}

pub fn sample_spawn_point(
    rng: &mut SimRng,
    bounds: &WorldBounds,
    avoid: Vec2,
    rule: &SpawnRule,
) -> SpawnPoint {
    let max_attempts = rule.max_attempts.max(1);
    let margin_x = rule.margin.clamp(0.0, bounds.width * 0.5);
    let margin_y = rule.margin.clamp(0.0, bounds.height * 0.5);
    let mut best = avoid;
    let mut best_distance = f32::NEG_INFINITY;

    for attempt in 1..=max_attempts {
        let candidate = Vec2::new(
            rng.range_inclusive(margin_x, bounds.width - margin_x),
            rng.range_inclusive(margin_y, bounds.height - margin_y),
        );
        let distance = candidate.distance(avoid);
        if distance >= rule.safe_distance {
            return SpawnPoint {
                position: candidate,
                attempts: attempt,
                satisfied: true,
            };
        }
        if distance > best_distance {
            best = candidate;
            best_distance = distance;
        }
    }

    log::warn!(
        "Spawn sampling gave up after {} attempts; using farthest candidate at {:.0} (< {:.0})",
        max_attempts,
        best_distance,
        rule.safe_distance
    );
    SpawnPoint {
        position: best,
        attempts: max_attempts,
        satisfied: false,
    }
}
