use serde::Deserialize;

/// Alien class. Tiers only change chase speed and spawn count; the AI itself
/// is identical for every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlienTier {
    /// Fastest chaser.
    Red,
    Green,
    /// Slowest chaser.
    Purple,
}

impl AlienTier {
    /// All tiers in spawn order.
    pub const ALL: &'static [AlienTier] = &[AlienTier::Red, AlienTier::Green, AlienTier::Purple];

    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Purple => "purple",
        }
    }

    /// Chase speed used when no configuration overrides it.
    pub fn default_chase_speed(self) -> f32 {
        match self {
            Self::Red => 220.0,
            Self::Green => 180.0,
            Self::Purple => 130.0,
        }
    }

    /// Spawn count used when no configuration overrides it.
    pub fn default_count(self) -> u32 {
        match self {
            Self::Red => 4,
            Self::Green => 6,
            Self::Purple => 6,
        }
    }
}

impl std::fmt::Display for AlienTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
