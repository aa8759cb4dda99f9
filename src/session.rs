//! Session state: run lifecycle, currency and the live vessel count.
//!
//! ## States
//!
//! | State      | Description                                   |
//! |------------|-----------------------------------------------|
//! | `Playing`  | Active simulation; every gameplay system runs |
//! | `GameOver` | The player died; the world is frozen          |
//!
//! All gameplay systems are registered with
//! `.run_if(in_state(GameState::Playing))`, so the state is always registered
//! before any gameplay plugin is built.

use bevy::prelude::*;

/// Top-level run state.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Playing,
    GameOver,
}

/// Run-wide counters.  Mutated only through the methods below.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub currency: u32,
    pub alive_vessels: u32,
    game_over_reported: bool,
}

impl Session {
    pub fn credit_currency(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }

    pub fn increment_alive_count(&mut self) {
        self.alive_vessels += 1;
    }

    pub fn decrement_alive_count(&mut self) {
        self.alive_vessels = self.alive_vessels.saturating_sub(1);
    }

    /// Latch the game-over flag.  Returns `true` only for the first report.
    pub fn report_game_over(&mut self) -> bool {
        if self.game_over_reported {
            return false;
        }
        self.game_over_reported = true;
        true
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over_reported
    }
}

/// Written by the player when its HP reaches zero.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReported;

/// Latch the session and switch to [`GameState::GameOver`] on the first report.
pub fn game_over_system(
    mut reports: MessageReader<GameOverReported>,
    mut session: ResMut<Session>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for _ in reports.read() {
        if session.report_game_over() {
            info!(
                "Game over: {} currency earned, {} vessels alive",
                session.currency, session.alive_vessels
            );
            next_state.set(GameState::GameOver);
        }
    }
}

/// Registers [`GameState`], [`Session`] and the game-over handler.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<Session>()
            .add_message::<GameOverReported>()
            .add_systems(Update, game_over_system);
    }
}
