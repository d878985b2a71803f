//! Game tuning loaded from JSON.
//!
//! Every field has a default, so an empty object `{}` is a complete config
//! and a file only needs to list what it overrides. Validation is strict so
//! the session can assume a sane world (stops inside the map, positive
//! periods, capacity of at least one).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::physics::{Hitbox, WorldBounds};
use crate::tier::AlienTier;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub ai: AiConfig,
    pub tiers: Vec<TierConfig>,
    pub transport: TransportConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    pub start: Point,
    pub rotation_speed_deg: f32,
    pub forward_thrust_speed: f32,
    pub reverse_acceleration: f32,
    pub drag: f32,
    pub max_speed: f32,
    pub capacity: u32,
    pub half_w: f32,
    pub half_h: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    pub detection_radius: f32,
    pub roam_speed: f32,
    pub roam_change_dir_delay_ms: u64,
    pub spawn_safe_distance: f32,
    pub spawn_max_attempts: u32,
    pub hit_radius: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TierConfig {
    pub tier: AlienTier,
    pub chase_speed: f32,
    pub count: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TransportConfig {
    pub per_passenger_score: u32,
    pub full_bus_bonus: u32,
    pub passenger_respawn_delay_ms: u64,
    pub passenger_half_w: f32,
    pub passenger_half_h: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LayoutConfig {
    pub bus_stops: Vec<Point>,
    /// `None` places the destination at the world center.
    pub destination: Option<Point>,
    pub destination_radius: f32,
    /// Added to the destination radius for the drop-off check; roughly half
    /// the bus length so the nose counts, not just the center.
    pub drop_off_margin: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            ai: AiConfig::default(),
            tiers: default_tiers(),
            transport: TransportConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 3200.0,
            height: 2400.0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: Point::new(450.0, 400.0),
            rotation_speed_deg: 150.0,
            forward_thrust_speed: 300.0,
            reverse_acceleration: 150.0,
            drag: 0.95,
            max_speed: 400.0,
            capacity: 5,
            half_w: 26.0,
            half_h: 12.0,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            detection_radius: 400.0,
            roam_speed: 70.0,
            roam_change_dir_delay_ms: 3000,
            spawn_safe_distance: 400.0,
            spawn_max_attempts: 64,
            hit_radius: 25.0,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            per_passenger_score: 10,
            full_bus_bonus: 50,
            passenger_respawn_delay_ms: 10_000,
            passenger_half_w: 16.0,
            passenger_half_h: 20.0,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            bus_stops: vec![
                Point::new(300.0, 400.0),
                Point::new(2900.0, 500.0),
                Point::new(400.0, 2000.0),
                Point::new(2700.0, 1800.0),
                Point::new(1600.0, 300.0),
            ],
            destination: None,
            destination_radius: 60.0,
            drop_off_margin: 16.0,
        }
    }
}

fn default_tiers() -> Vec<TierConfig> {
    AlienTier::ALL
        .iter()
        .map(|&tier| TierConfig {
            tier,
            chase_speed: tier.default_chase_speed(),
            count: tier.default_count(),
        })
        .collect()
}

impl GameConfig {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.world.width, self.world.height)
    }

    pub fn destination_position(&self) -> Vec2 {
        self.layout
            .destination
            .map(Point::to_vec2)
            .unwrap_or_else(|| self.bounds().center())
    }

    pub fn drop_off_radius(&self) -> f32 {
        self.layout.destination_radius + self.layout.drop_off_margin
    }

    pub fn player_hitbox(&self) -> Hitbox {
        Hitbox::Rect {
            half_w: self.player.half_w,
            half_h: self.player.half_h,
        }
    }

    pub fn alien_hitbox(&self) -> Hitbox {
        Hitbox::Circle {
            radius: self.ai.hit_radius,
        }
    }

    pub fn passenger_hitbox(&self) -> Hitbox {
        Hitbox::Rect {
            half_w: self.transport.passenger_half_w,
            half_h: self.transport.passenger_half_h,
        }
    }

    pub fn total_aliens(&self) -> u32 {
        self.tiers.iter().map(|t| t.count).sum()
    }
}

/// Longest timer delay a config may ask for: one day.
pub const MAX_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

impl AiConfig {
    pub fn roam_change_dir_delay_us(&self) -> u64 {
        self.roam_change_dir_delay_ms.saturating_mul(1000)
    }
}

impl TransportConfig {
    pub fn respawn_delay_us(&self) -> u64 {
        self.passenger_respawn_delay_ms.saturating_mul(1000)
    }
}

impl PlayerConfig {
    pub fn rotation_speed_rad(&self) -> f32 {
        self.rotation_speed_deg.to_radians()
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    parse_config(&raw).map_err(|e| format!("{} ({})", e, path.display()))
}

pub fn parse_config(raw: &str) -> Result<GameConfig, String> {
    let config: GameConfig =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse config JSON: {e}"))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if !(config.world.width > 0.0 && config.world.height > 0.0) {
        return Err("Config validation failed: world width and height must be > 0".to_string());
    }
    let bounds = config.bounds();

    if config.player.capacity == 0 {
        return Err("Config validation failed: player capacity must be >= 1".to_string());
    }
    if !(config.player.drag > 0.0 && config.player.drag <= 1.0) {
        return Err("Config validation failed: player drag must be in (0, 1]".to_string());
    }
    if config.player.max_speed <= 0.0 {
        return Err("Config validation failed: player max_speed must be > 0".to_string());
    }
    if !bounds.contains(config.player.start.to_vec2()) {
        return Err(format!(
            "Config validation failed: player start ({}, {}) is outside the world",
            config.player.start.x, config.player.start.y
        ));
    }

    if !(config.player.half_w > 0.0 && config.player.half_h > 0.0) {
        return Err("Config validation failed: player half_w and half_h must be > 0".to_string());
    }

    validate_delay_ms("roam_change_dir_delay_ms", config.ai.roam_change_dir_delay_ms)?;
    if !(config.ai.hit_radius > 0.0) {
        return Err("Config validation failed: hit_radius must be > 0".to_string());
    }
    if config.ai.detection_radius < 0.0 || config.ai.spawn_safe_distance < 0.0 {
        return Err(
            "Config validation failed: detection_radius and spawn_safe_distance must be >= 0"
                .to_string(),
        );
    }
    if config.ai.spawn_max_attempts == 0 {
        return Err("Config validation failed: spawn_max_attempts must be >= 1".to_string());
    }

    let mut seen_tiers = HashSet::new();
    for tier in &config.tiers {
        if !seen_tiers.insert(tier.tier) {
            return Err(format!(
                "Config validation failed: duplicate tier '{}'",
                tier.tier
            ));
        }
        if tier.chase_speed <= 0.0 {
            return Err(format!(
                "Config validation failed: tier '{}' chase_speed must be > 0",
                tier.tier
            ));
        }
    }

    validate_delay_ms(
        "passenger_respawn_delay_ms",
        config.transport.passenger_respawn_delay_ms,
    )?;
    if !(config.transport.passenger_half_w > 0.0 && config.transport.passenger_half_h > 0.0) {
        return Err(
            "Config validation failed: passenger_half_w and passenger_half_h must be > 0"
                .to_string(),
        );
    }

    if config.layout.bus_stops.is_empty() {
        return Err("Config validation failed: bus_stops is empty".to_string());
    }
    for (index, stop) in config.layout.bus_stops.iter().enumerate() {
        if !bounds.contains(stop.to_vec2()) {
            return Err(format!(
                "Config validation failed: bus stop {} at ({}, {}) is outside the world",
                index, stop.x, stop.y
            ));
        }
    }
    if !bounds.contains(config.destination_position()) {
        return Err("Config validation failed: destination is outside the world".to_string());
    }
    if !(config.layout.destination_radius > 0.0) {
        return Err("Config validation failed: destination_radius must be > 0".to_string());
    }
    if !(config.layout.drop_off_margin >= 0.0) {
        return Err("Config validation failed: drop_off_margin must be >= 0".to_string());
    }

    Ok(())
}

fn validate_delay_ms(name: &str, delay_ms: u64) -> Result<(), String> {
    if delay_ms == 0 || delay_ms > MAX_DELAY_MS {
        return Err(format!(
            "Config validation failed: {} must be in 1..={}",
            name, MAX_DELAY_MS
        ));
    }
    Ok(())
}
