//! Guess-the-number game, one concurrent game per channel.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

const GUESS_COOLDOWN: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Custom(u32),
}

impl Difficulty {
    pub fn range_max(self) -> u32 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Normal => 1_000,
            Difficulty::Hard => 10_000,
            Difficulty::Custom(max) => max,
        }
    }

    pub fn label(self) -> String {
        match self {
            Difficulty::Easy => "Easy".to_string(),
            Difficulty::Normal => "Normal".to_string(),
            Difficulty::Hard => "Hard".to_string(),
            Difficulty::Custom(max) => format!("Custom range of 1 - {}", max),
        }
    }
}

#[derive(Debug)]
pub struct GuessGame {
    secret: u32,
    difficulty: Difficulty,
    guesses: u32,
    cooldowns: HashMap<u64, Instant>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    Win { guesses: u32 },
    /// Secret is higher than the guess.
    Higher { temperature: &'static str },
    /// Secret is lower than the guess.
    Lower { temperature: &'static str },
    OnCooldown { remaining: Duration },
}

impl GuessGame {
    pub fn start(difficulty: Difficulty) -> Self {
        let secret = rand::thread_rng().gen_range(1..=difficulty.range_max().max(1));
        Self::with_secret(difficulty, secret)
    }

    fn with_secret(difficulty: Difficulty, secret: u32) -> Self {
        Self {
            secret,
            difficulty,
            guesses: 0,
            cooldowns: HashMap::new(),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn secret(&self) -> u32 {
        self.secret
    }

    pub fn guesses(&self) -> u32 {
        self.guesses
    }

    pub fn guess(&mut self, user: u64, number: u32, now: Instant) -> GuessOutcome {
        self.cooldowns
            .retain(|_, last| now.duration_since(*last) < GUESS_COOLDOWN);
        if let Some(last) = self.cooldowns.get(&user) {
            let since = now.duration_since(*last);
            if since < GUESS_COOLDOWN {
                return GuessOutcome::OnCooldown {
                    remaining: GUESS_COOLDOWN - since,
                };
            }
        }
        self.cooldowns.insert(user, now);

        if number == self.secret {
            return GuessOutcome::Win {
                guesses: self.guesses + 1,
            };
        }

        self.guesses += 1;
        let temperature = temperature_emoji(number.abs_diff(self.secret));
        if number < self.secret {
            GuessOutcome::Higher { temperature }
        } else {
            GuessOutcome::Lower { temperature }
        }
    }
}

/// How close the guess was, as an emoji band over the absolute distance.
pub fn temperature_emoji(diff: u32) -> &'static str {
    match diff {
        0 => "🎉",
        1 => "🔥",
        2..=3 => "🌋",
        4..=10 => "🌡️",
        11..=30 => "❄️",
        31..=100 => "🧊",
        101..=500 => "🥶",
        _ => "💀",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_stays_in_range() {
        for _ in 0..50 {
            let game = GuessGame::start(Difficulty::Easy);
            assert!((1..=100).contains(&game.secret()));
        }
        let game = GuessGame::start(Difficulty::Custom(5));
        assert!((1..=5).contains(&game.secret()));
    }

    #[test]
    fn win_reports_guess_count() {
        let mut game = GuessGame::with_secret(Difficulty::Easy, 50);
        let t = Instant::now();
        assert_eq!(
            game.guess(1, 10, t),
            GuessOutcome::Higher { temperature: "🧊" }
        );
        assert_eq!(
            game.guess(1, 50, t + Duration::from_secs(3)),
            GuessOutcome::Win { guesses: 2 }
        );
    }

    #[test]
    fn direction_hints() {
        let mut game = GuessGame::with_secret(Difficulty::Easy, 50);
        let mut t = Instant::now();
        match game.guess(1, 10, t) {
            GuessOutcome::Higher { .. } => {}
            other => panic!("expected Higher, got {:?}", other),
        }
        t += Duration::from_secs(3);
        match game.guess(1, 90, t) {
            GuessOutcome::Lower { .. } => {}
            other => panic!("expected Lower, got {:?}", other),
        }
        assert_eq!(game.guesses(), 2);
    }

    #[test]
    fn cooldown_blocks_rapid_guesses() {
        let mut game = GuessGame::with_secret(Difficulty::Easy, 50);
        let t = Instant::now();
        game.guess(1, 10, t);
        match game.guess(1, 20, t + Duration::from_millis(500)) {
            GuessOutcome::OnCooldown { remaining } => {
                assert!(remaining <= Duration::from_secs(2));
            }
            other => panic!("expected cooldown, got {:?}", other),
        }
        // A different user is not affected.
        match game.guess(2, 20, t + Duration::from_millis(500)) {
            GuessOutcome::Lower { .. } => {}
            other => panic!("expected Lower, got {:?}", other),
        }
    }

    #[test]
    fn temperature_bands() {
        assert_eq!(temperature_emoji(0), "🎉");
        assert_eq!(temperature_emoji(1), "🔥");
        assert_eq!(temperature_emoji(3), "🌋");
        assert_eq!(temperature_emoji(10), "🌡️");
        assert_eq!(temperature_emoji(30), "❄️");
        assert_eq!(temperature_emoji(100), "🧊");
        assert_eq!(temperature_emoji(500), "🥶");
        assert_eq!(temperature_emoji(501), "💀");
    }

    #[test]
    fn expired_cooldowns_are_pruned() {
        let mut game = GuessGame::with_secret(Difficulty::Easy, 50);
        let t = Instant::now();
        game.guess(1, 10, t);
        game.guess(2, 20, t);
        assert_eq!(game.cooldowns.len(), 2);
        // Only the fresh entry survives once the window has passed.
        game.guess(3, 30, t + Duration::from_secs(3));
        assert_eq!(game.cooldowns.len(), 1);
    }

    #[test]
    fn difficulty_labels() {
        assert_eq!(Difficulty::Easy.label(), "Easy");
        assert_eq!(Difficulty::Custom(7).label(), "Custom range of 1 - 7");
        assert_eq!(Difficulty::Hard.range_max(), 10_000);
    }
}
