use rand::seq::IndexedRandom;
use std::collections::BTreeSet;

use crate::metrics::HANGMAN_GAMES_TOTAL;

pub const MAX_WRONG_GUESSES: u32 = 6;

/// Vocabulary the game draws its target word from.
pub const WORDS: &[&str] = &[
    "APPLE", "BRIDGE", "CASTLE", "DOCTOR", "ELEPHANT", "FAMILY", "GARDEN", "HOLIDAY", "ISLAND",
    "JOURNEY", "KITCHEN", "LIBRARY", "MORNING", "NEIGHBOR", "ORANGE", "PENCIL", "QUESTION",
    "RAINBOW", "SCHOOL", "TEACHER", "UMBRELLA", "VILLAGE", "WINDOW", "YELLOW",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessResult {
    Hit,
    Miss,
    AlreadyGuessed,
    Invalid,
    GameOver,
}

#[derive(Debug, Clone)]
pub struct HangmanGame {
    word: String,
    guessed: BTreeSet<char>,
    wrong_guesses: u32,
    status: GameStatus,
}

impl HangmanGame {
    /// New game with a word picked at random from [`WORDS`].
    pub fn new() -> Self {
        Self::with_word(pick_word())
    }

    pub fn with_word(word: &str) -> Self {
        Self {
            word: word.trim().to_ascii_uppercase(),
            guessed: BTreeSet::new(),
            wrong_guesses: 0,
            status: GameStatus::Playing,
        }
    }

    pub fn restart(&mut self) {
        *self = Self::new();
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn wrong_guesses(&self) -> u32 {
        self.wrong_guesses
    }

    pub fn remaining_guesses(&self) -> u32 {
        MAX_WRONG_GUESSES.saturating_sub(self.wrong_guesses)
    }

    pub fn guessed_letters(&self) -> impl Iterator<Item = char> + '_ {
        self.guessed.iter().copied()
    }

    /// Target word; callers should only reveal it once the game is over.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn masked_word(&self) -> String {
        self.word
            .chars()
            .map(|c| if self.guessed.contains(&c) { c } else { '_' })
            .collect()
    }

    pub fn guess_letter(&mut self, letter: char) -> GuessResult {
        if self.status != GameStatus::Playing {
            return GuessResult::GameOver;
        }
        if !letter.is_ascii_alphabetic() {
            return GuessResult::Invalid;
        }

        let letter = letter.to_ascii_uppercase();
        if !self.guessed.insert(letter) {
            return GuessResult::AlreadyGuessed;
        }

        let result = if self.word.contains(letter) {
            GuessResult::Hit
        } else {
            self.wrong_guesses += 1;
            GuessResult::Miss
        };

        self.evaluate();
        result
    }

    /// Compares a whole-word guess against the target in one step.
    pub fn guess_word(&mut self, guess: &str) -> GuessResult {
        if self.status != GameStatus::Playing {
            return GuessResult::GameOver;
        }

        let guess = guess.trim();
        if guess.is_empty() || !guess.chars().all(|c| c.is_ascii_alphabetic()) {
            return GuessResult::Invalid;
        }

        if guess.eq_ignore_ascii_case(&self.word) {
            self.guessed.extend(self.word.chars());
            self.evaluate();
            GuessResult::Hit
        } else {
            self.wrong_guesses += 1;
            self.evaluate();
            GuessResult::Miss
        }
    }

    // Win is checked before loss.
    fn evaluate(&mut self) {
        if self.word.chars().all(|c| self.guessed.contains(&c)) {
            self.status = GameStatus::Won;
            HANGMAN_GAMES_TOTAL.with_label_values(&["won"]).inc();
        } else if self.wrong_guesses >= MAX_WRONG_GUESSES {
            self.status = GameStatus::Lost;
            HANGMAN_GAMES_TOTAL.with_label_values(&["lost"]).inc();
        }
    }
}

impl Default for HangmanGame {
    fn default() -> Self {
        Self::new()
    }
}

fn pick_word() -> &'static str {
    WORDS.choose(&mut rand::rng()).copied().unwrap_or("LANGUAGE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_list_is_uppercase_ascii() {
        for word in WORDS {
            assert!(word.chars().all(|c| c.is_ascii_uppercase()), "{word}");
        }
    }

    #[test]
    fn new_game_picks_from_word_list() {
        let game = HangmanGame::new();
        assert!(WORDS.contains(&game.word()));
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.masked_word().len(), game.word().len());
        assert!(game.masked_word().chars().all(|c| c == '_'));
    }

    #[test]
    fn restart_clears_progress() {
        let mut game = HangmanGame::with_word("CAT");
        game.guess_letter('z');
        game.guess_letter('c');

        game.restart();

        assert_eq!(game.wrong_guesses(), 0);
        assert_eq!(game.guessed_letters().count(), 0);
        assert_eq!(game.status(), GameStatus::Playing);
    }
}
