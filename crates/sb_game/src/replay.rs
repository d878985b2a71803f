use sb_core::input::Key;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Longest stretch of simulated time a single frame may repeat for.
pub const MAX_FRAME_SECONDS: f64 = 60.0 * 60.0;

/// Recorded key levels for a headless run.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    /// Overrides the session seed when present.
    #[serde(default)]
    pub seed: Option<u64>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ReplayFrame {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub restart: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    /// Key levels this frame holds, in the order the host feeds them to
    /// `InputState::set_key`.
    pub fn key_levels(&self) -> [(Key, bool); 5] {
        [
            (Key::Left, self.left),
            (Key::Right, self.right),
            (Key::Up, self.up),
            (Key::Down, self.down),
            (Key::Space, self.restart),
        ]
    }
}

impl ReplaySequence {
    /// One frame per fixed step, produced lazily.
    pub fn expanded_frames(&self) -> impl Iterator<Item = ReplayFrame> + '_ {
        self.frames.iter().flat_map(|frame| {
            std::iter::repeat(ReplayFrame { repeat: 1, ..*frame }).take(frame.repeat.max(1) as usize)
        })
    }

    pub fn total_steps(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat.max(1))).sum()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

pub fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 || !replay.fixed_dt.is_finite() {
        return Err("Replay validation failed: fixed_dt must be a finite value > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (index, frame) in replay.frames.iter().enumerate() {
        let seconds = f64::from(frame.repeat) * f64::from(replay.fixed_dt);
        if seconds > MAX_FRAME_SECONDS {
            return Err(format!(
                "Replay validation failed: frame {} repeats for {:.0}s (max {:.0}s)",
                index, seconds, MAX_FRAME_SECONDS
            ));
        }
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
