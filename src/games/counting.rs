//! State machine for the counting channel. One count per channel; the same
//! user may not count twice in a row and each user has a short cooldown.
//! Messages are integer arithmetic, so `2*8` is a valid way to say 16.

use std::collections::HashMap;
use std::time::{Duration, Instant};

const USER_COOLDOWN: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
pub struct CountingChannel {
    count: u64,
    last_user: Option<u64>,
    cooldowns: HashMap<u64, Instant>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CountOutcome {
    /// Right number: count advanced to the contained value.
    Correct(u64),
    /// Wrong number: count reset to zero.
    Reset { expected: u64, got: i64 },
    /// Same user counted twice in a row; message should be dropped.
    RepeatUser,
    /// User posted again within the cooldown window; message should be dropped.
    OnCooldown,
    /// Not parseable as a number; message should be dropped.
    NotANumber,
}

impl CountingChannel {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn submit(&mut self, user: u64, text: &str, now: Instant) -> CountOutcome {
        self.cooldowns
            .retain(|_, last| now.duration_since(*last) < USER_COOLDOWN);
        if let Some(last) = self.cooldowns.get(&user) {
            if now.duration_since(*last) < USER_COOLDOWN {
                return CountOutcome::OnCooldown;
            }
        }

        let number = match eval_expr(text.trim()) {
            Some(n) => n,
            None => return CountOutcome::NotANumber,
        };

        self.cooldowns.insert(user, now);

        if self.last_user == Some(user) {
            return CountOutcome::RepeatUser;
        }

        let expected = self.count + 1;
        if number == expected as i64 {
            self.count = expected;
            self.last_user = Some(user);
            CountOutcome::Correct(expected)
        } else {
            self.count = 0;
            self.last_user = None;
            CountOutcome::Reset {
                expected,
                got: number,
            }
        }
    }
}

pub fn random_fail_message() -> &'static str {
    const MESSAGES: &[&str] = &[
        "I never had mathematics in school, so we have to start over at `1` :(",
        "I messed up! That's not the right number. Let's try again from `1`.",
        "Math is hard for me, isn't it? Back to `1` I go!",
        "I got the wrong number! Resetting the count to `1`.",
        "Looks like I need to start over at `1`. Better luck next time!",
        "That wasn't the expected number from me. Let's begin again at `1`.",
        "Counting is tricky for me! Let's reset to `1`.",
        "Uh oh, that's not it. Back to `1` I go!",
        "Whoops! The count starts from `1` again for me.",
        "Not quite! I'll try counting from `1` once more.",
    ];
    MESSAGES[rand::random::<usize>() % MESSAGES.len()]
}

/// Evaluates an integer expression with `+ - * /` and parentheses.
/// Division truncates; division by zero and overflow yield `None`.
pub fn eval_expr(input: &str) -> Option<i64> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos == parser.tokens.len() {
        Some(value)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(i64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '0'..='9' => {
                let mut value: i64 = 0;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    value = value.checked_mul(10)?.checked_add(d as i64)?;
                    chars.next();
                }
                tokens.push(Token::Num(value));
            }
            _ => return None,
        }
    }
    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    fn expr(&mut self) -> Option<i64> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.next();
                    value = value.checked_add(self.term()?)?;
                }
                Token::Minus => {
                    self.next();
                    value = value.checked_sub(self.term()?)?;
                }
                _ => break,
            }
        }
        Some(value)
    }

    fn term(&mut self) -> Option<i64> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.next();
                    value = value.checked_mul(self.factor()?)?;
                }
                Token::Slash => {
                    self.next();
                    let rhs = self.factor()?;
                    value = value.checked_div(rhs)?;
                }
                _ => break,
            }
        }
        Some(value)
    }

    fn factor(&mut self) -> Option<i64> {
        match self.next()? {
            Token::Num(n) => Some(n),
            Token::Minus => Some(self.factor()?.checked_neg()?),
            Token::Open => {
                let value = self.expr()?;
                match self.next()? {
                    Token::Close => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_plain_numbers() {
        assert_eq!(eval_expr("1"), Some(1));
        assert_eq!(eval_expr("  42 "), Some(42));
    }

    #[test]
    fn evaluates_arithmetic_with_precedence() {
        assert_eq!(eval_expr("2+3*4"), Some(14));
        assert_eq!(eval_expr("(2+3)*4"), Some(20));
        assert_eq!(eval_expr("10/3"), Some(3));
        assert_eq!(eval_expr("-(2+1)"), Some(-3));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(eval_expr("hello"), None);
        assert_eq!(eval_expr("1+"), None);
        assert_eq!(eval_expr("(1"), None);
        assert_eq!(eval_expr(""), None);
        assert_eq!(eval_expr("1/0"), None);
    }

    #[test]
    fn counts_up_with_alternating_users() {
        let mut ch = CountingChannel::default();
        let t = Instant::now();
        assert_eq!(ch.submit(1, "1", t), CountOutcome::Correct(1));
        assert_eq!(ch.submit(2, "2", t), CountOutcome::Correct(2));
        assert_eq!(ch.submit(1, "1+2", t + Duration::from_secs(4)), CountOutcome::Correct(3));
        assert_eq!(ch.count(), 3);
    }

    #[test]
    fn wrong_number_resets() {
        let mut ch = CountingChannel::default();
        let t = Instant::now();
        assert_eq!(ch.submit(1, "1", t), CountOutcome::Correct(1));
        assert_eq!(
            ch.submit(2, "5", t),
            CountOutcome::Reset {
                expected: 2,
                got: 5
            }
        );
        assert_eq!(ch.count(), 0);
        // Anyone, including the resetting user, may restart at 1.
        assert_eq!(
            ch.submit(2, "1", t + Duration::from_secs(4)),
            CountOutcome::Correct(1)
        );
    }

    #[test]
    fn same_user_twice_is_dropped() {
        let mut ch = CountingChannel::default();
        let t = Instant::now();
        assert_eq!(ch.submit(1, "1", t), CountOutcome::Correct(1));
        assert_eq!(
            ch.submit(1, "2", t + Duration::from_secs(4)),
            CountOutcome::RepeatUser
        );
        assert_eq!(ch.count(), 1);
    }

    #[test]
    fn cooldown_drops_fast_reposts() {
        let mut ch = CountingChannel::default();
        let t = Instant::now();
        assert_eq!(ch.submit(1, "1", t), CountOutcome::Correct(1));
        assert_eq!(
            ch.submit(1, "2", t + Duration::from_secs(1)),
            CountOutcome::OnCooldown
        );
    }

    #[test]
    fn expired_cooldowns_are_pruned() {
        let mut ch = CountingChannel::default();
        let t = Instant::now();
        assert_eq!(ch.submit(1, "1", t), CountOutcome::Correct(1));
        assert_eq!(ch.submit(2, "2", t), CountOutcome::Correct(2));
        assert_eq!(ch.cooldowns.len(), 2);
        // Only the fresh entry survives once the window has passed.
        assert_eq!(
            ch.submit(3, "3", t + Duration::from_secs(4)),
            CountOutcome::Correct(3)
        );
        assert_eq!(ch.cooldowns.len(), 1);
    }

    #[test]
    fn non_numbers_do_not_touch_state() {
        let mut ch = CountingChannel::default();
        let t = Instant::now();
        assert_eq!(ch.submit(1, "one", t), CountOutcome::NotANumber);
        assert_eq!(ch.count(), 0);
        assert_eq!(ch.submit(1, "1", t), CountOutcome::Correct(1));
    }
}
