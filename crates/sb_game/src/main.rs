use sb_core::input::InputState;
use sb_core::rng::DEFAULT_SEED;
use sb_core::time::TimeState;
use sb_game::alien::AiState;
use sb_game::config::{load_config_from_path, GameConfig};
use sb_game::events::LogObserver;
use sb_game::replay::load_replay_from_path;
use sb_game::session::{GameSession, TickInput};
use sb_game::tier::AlienTier;
use std::path::PathBuf;

fn usage() -> String {
    "Usage: cargo run -p sb_game -- <replay.json> [config.json] [host_fps]\nExample: cargo run -p sb_game -- replays/first_run.json 144".to_string()
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        return Err(usage());
    }

    let replay_path = PathBuf::from(&args[1]);
    let replay = load_replay_from_path(&replay_path).map_err(|e| {
        log::error!("{e}");
        e
    })?;

    let config = match args.get(2) {
        Some(path) => load_config_from_path(&PathBuf::from(path)).map_err(|e| {
            log::error!("{e}");
            e
        })?,
        None => GameConfig::default(),
    };

    let host_fps = match args.get(3) {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|e| format!("Invalid host_fps '{}': {e}", raw))?,
        None => 60.0,
    };
    if !host_fps.is_finite() || host_fps <= 0.0 {
        return Err("host_fps must be > 0".to_string());
    }

    let seed = replay.seed.unwrap_or(DEFAULT_SEED);
    let mut session = GameSession::with_seed(config, seed);
    session.subscribe(Box::new(LogObserver));

    let total_steps = replay.total_steps();
    let mut frames = replay.expanded_frames().peekable();
    let mut time = TimeState::with_fixed_dt(f64::from(replay.fixed_dt));
    let mut input = InputState::new();
    let mut next = 0u64;
    let mut games_over = 0u32;

    log::info!(
        "Replaying {} steps from {} at {} host fps (fixed dt {:.4}s, seed {}, {} aliens)",
        total_steps,
        replay_path.display(),
        host_fps,
        replay.fixed_dt,
        seed,
        session.config().total_aliens()
    );

    while frames.peek().is_some() {
        time.begin_frame(1.0 / host_fps);
        while time.should_step() {
            let Some(frame) = frames.next() else {
                break;
            };
            for (key, down) in frame.key_levels() {
                input.set_key(key, down);
            }
            let was_over = session.is_game_over();
            session.tick(TickInput::from_keys(&input), time.fixed_dt as f32);
            if !was_over && session.is_game_over() {
                games_over += 1;
            }
            next += 1;
            input.end_frame();
        }
        if time.steps_this_frame == 0 {
            log::trace!("Host frame without a simulation step");
        }
        time.end_frame();
    }

    for tier in AlienTier::ALL {
        let (chasing, total) = session
            .aliens()
            .iter()
            .filter(|a| a.tier() == *tier)
            .fold((0, 0), |(chasing, total), a| {
                (chasing + usize::from(a.state() == AiState::Chasing), total + 1)
            });
        log::info!("{} aliens: {}/{} chasing", tier, chasing, total);
    }

    log::info!(
        "Replay finished: {} steps ({:.1}s simulated over {} host frames), score {}, state {:?}, {} game over(s), {} passenger(s) aboard",
        next,
        time.sim_time,
        time.frame_count,
        session.score(),
        session.state(),
        games_over,
        session.player().passenger_count()
    );
    println!(
        "score={} state={:?} steps={} games_over={}",
        session.score(),
        session.state(),
        next,
        games_over
    );
    Ok(())
}
