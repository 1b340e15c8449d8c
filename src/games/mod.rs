pub mod counting;
pub mod guess;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use counting::CountingChannel;
use guess::GuessGame;

/// In-memory game state, keyed by channel id. Nothing here survives a
/// restart, matching the throwaway nature of the games.
#[derive(Default)]
pub struct GameState {
    counting: Mutex<HashMap<u64, CountingChannel>>,
    guess: Mutex<HashMap<u64, GuessGame>>,
}

impl GameState {
    pub fn counting(&self) -> MutexGuard<'_, HashMap<u64, CountingChannel>> {
        self.counting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn guess(&self) -> MutexGuard<'_, HashMap<u64, GuessGame>> {
        self.guess.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
