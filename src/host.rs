//! Match host: frame pacing, watchdog and failure policy
//!
//! The simulation is total, but the host still guards every tick: a tick
//! that panics or overruns the watchdog budget is discarded and the previous
//! world kept. Too many failures in a row stop the match.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::consts::MAX_FRAME_DT;
use crate::error::{HostError, InputError};
use crate::input::{self, RawControls};
use crate::sim::{GameEvent, PlayerId, TickInput, TickOutcome, World, tick};

/// Fixed simulation step (60 Hz)
pub const SIM_DT: f32 = 1.0 / 60.0;
/// Upper bound on catch-up steps per frame
pub const MAX_SUBSTEPS: u32 = 6;
/// Wall-clock budget for one tick
pub const WATCHDOG_BUDGET: Duration = Duration::from_millis(500);
/// Consecutive failed ticks before the host gives up
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Signature of the stepping function (swappable for tests)
pub type TickFn = fn(&mut World, &TickInput, f32) -> TickOutcome;

/// Observer for match output
pub trait MatchHooks {
    fn on_event(&mut self, _event: &GameEvent) {}
    fn on_player_death(&mut self, _player: PlayerId) {}
    fn on_game_end(&mut self, _winner: Option<PlayerId>) {}
}

/// Hooks that ignore everything
#[derive(Debug, Default)]
pub struct NoHooks;

impl MatchHooks for NoHooks {}

/// Owns a world and drives it frame by frame
pub struct MatchRunner<H: MatchHooks = NoHooks> {
    world: World,
    hooks: H,
    input: TickInput,
    accumulator: f32,
    consecutive_failures: u32,
    budget: Duration,
    tick_fn: TickFn,
}

impl<H: MatchHooks> MatchRunner<H> {
    pub fn new(world: World, hooks: H) -> Self {
        Self {
            world,
            hooks,
            input: TickInput::default(),
            accumulator: 0.0,
            consecutive_failures: 0,
            budget: WATCHDOG_BUDGET,
            tick_fn: tick,
        }
    }

    /// Override the watchdog budget
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Replace the stepping function
    pub fn with_tick_fn(mut self, tick_fn: TickFn) -> Self {
        self.tick_fn = tick_fn;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn into_parts(self) -> (World, H) {
        (self.world, self.hooks)
    }

    pub fn is_finished(&self) -> bool {
        self.world.is_game_over
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Validate and queue controls for a human player
    pub fn submit(&mut self, player: PlayerId, raw: RawControls) -> Result<(), InputError> {
        input::submit(&self.world, &mut self.input, player, raw)
    }

    /// Advance by a raw frame time; returns how many ticks ran
    pub fn frame(&mut self, raw_dt: f32) -> Result<u32, HostError> {
        let dt = if raw_dt.is_finite() && raw_dt > 0.0 {
            raw_dt.min(MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && !self.is_finished() {
            self.step(SIM_DT)?;
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        Ok(substeps)
    }

    /// Run one guarded tick
    pub fn step(&mut self, dt: f32) -> Result<(), HostError> {
        let snapshot = self.world.clone();
        let tick_fn = self.tick_fn;
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            tick_fn(&mut self.world, &self.input, dt)
        }));
        let elapsed = started.elapsed();

        let failure = match result {
            Ok(_) if elapsed > self.budget => Some(format!(
                "tick overran watchdog ({}ms > {}ms)",
                elapsed.as_millis(),
                self.budget.as_millis()
            )),
            Ok(outcome) => {
                self.consecutive_failures = 0;
                self.dispatch(&outcome);
                None
            }
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        let Some(reason) = failure else {
            return Ok(());
        };

        self.world = snapshot;
        self.consecutive_failures += 1;
        log::warn!(
            "Tick failed at {:.2}s ({}/{}): {reason}",
            self.world.game_time,
            self.consecutive_failures,
            MAX_CONSECUTIVE_FAILURES
        );

        if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            log::error!("Giving up after {} consecutive tick failures", self.consecutive_failures);
            return Err(HostError::TooManyFailures {
                failures: self.consecutive_failures,
                last: reason,
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, outcome: &TickOutcome) {
        for event in &outcome.events {
            self.hooks.on_event(event);
            match event {
                GameEvent::PlayerDied { victim, .. } => self.hooks.on_player_death(*victim),
                GameEvent::GameOver { winner } => self.hooks.on_game_end(*winner),
                _ => {}
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic".to_string()
    }
}
