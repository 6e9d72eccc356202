//! Arrow Arena - headless match runner
//!
//! Usage: `arrow-arena [duel|ffa] [seed]`
//!
//! Plays an all-AI match at a fixed 60 Hz and logs the result. Set
//! `RUST_LOG=debug` for per-death detail.

use std::process::ExitCode;

use arrow_arena::host::{MatchHooks, MatchRunner, SIM_DT};
use arrow_arena::sim::{Difficulty, GameEvent, GameMode, PlayerId, World};
use arrow_arena::SimConfig;

/// Hard cap so a stalled match still terminates (simulated seconds)
const MAX_MATCH_SECONDS: f32 = 600.0;

/// Counts what happened for the end-of-match summary
#[derive(Default)]
struct Summary {
    arrows: u32,
    explosions: u32,
    deaths: u32,
}

impl MatchHooks for Summary {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ArrowFired { .. } => self.arrows += 1,
            GameEvent::Explosion { .. } => self.explosions += 1,
            _ => {}
        }
    }

    fn on_player_death(&mut self, player: PlayerId) {
        self.deaths += 1;
        log::debug!("Player {player} died");
    }

    fn on_game_end(&mut self, winner: Option<PlayerId>) {
        log::info!("Match over, winner: {winner:?}");
    }
}

fn build_world(mode: GameMode, seed: u64) -> World {
    let mut world = World::new(mode, &SimConfig::with_seed(seed));
    let roster: &[(&str, &str, Difficulty)] = match mode {
        GameMode::Duel => &[
            ("Robin", "green", Difficulty::Hard),
            ("Tell", "red", Difficulty::Expert),
        ],
        _ => &[
            ("Robin", "green", Difficulty::Easy),
            ("Tell", "red", Difficulty::Medium),
            ("Hawkeye", "purple", Difficulty::Hard),
            ("Legolas", "gold", Difficulty::Expert),
        ],
    };
    for (name, color, difficulty) in roster {
        world.add_ai_player(name, color, *difficulty);
    }
    world
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mode = match args.next().as_deref().map(GameMode::from_str) {
        None => GameMode::Duel,
        Some(Some(mode @ (GameMode::Duel | GameMode::Ffa))) => mode,
        Some(_) => {
            eprintln!("usage: arrow-arena [duel|ffa] [seed]");
            return ExitCode::FAILURE;
        }
    };
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        None => rand::random::<u64>(),
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("invalid seed: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("Arrow Arena starting: {} match, seed {seed}", mode.as_str());

    let mut runner = MatchRunner::new(build_world(mode, seed), Summary::default());
    while !runner.is_finished() && runner.world().game_time < MAX_MATCH_SECONDS {
        if let Err(e) = runner.frame(SIM_DT) {
            log::error!("Match aborted: {e}");
            return ExitCode::FAILURE;
        }
    }

    let (world, summary) = runner.into_parts();
    log::info!(
        "Finished at {:.1}s: {} arrows, {} explosions, {} deaths",
        world.game_time,
        summary.arrows,
        summary.explosions,
        summary.deaths
    );
    for player in world.players.values() {
        log::info!(
            "  {:<8} kills {:>2}  deaths {:>2}  score {:>5}  accuracy {:>5.1}%",
            player.name,
            player.kills,
            player.deaths,
            player.score,
            player.accuracy()
        );
    }
    match world.winner.and_then(|id| world.players.get(&id)) {
        Some(winner) => log::info!("Winner: {}", winner.name),
        None => log::info!("No winner"),
    }
    ExitCode::SUCCESS
}
