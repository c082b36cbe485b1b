use langquest_client::services::{GameStatus, GuessResult, HangmanGame, MAX_WRONG_GUESSES};

#[test]
fn test_final_letter_wins_before_wrong_guesses_are_checked() {
    let mut game = HangmanGame::with_word("CAT");

    for letter in ['X', 'Y', 'C', 'A'] {
        game.guess_letter(letter);
        assert_eq!(game.status(), GameStatus::Playing);
    }
    assert_eq!(game.guess_letter('T'), GuessResult::Hit);

    assert_eq!(game.status(), GameStatus::Won);
    assert_eq!(game.wrong_guesses(), 2);
    assert_eq!(game.masked_word(), "CAT");
}

#[test]
fn test_sixth_distinct_wrong_letter_loses() {
    assert_eq!(MAX_WRONG_GUESSES, 6);
    let mut game = HangmanGame::with_word("CAT");

    for letter in ['B', 'D', 'E', 'F', 'G'] {
        assert_eq!(game.guess_letter(letter), GuessResult::Miss);
        assert_eq!(game.status(), GameStatus::Playing);
    }
    assert_eq!(game.guess_letter('H'), GuessResult::Miss);

    assert_eq!(game.status(), GameStatus::Lost);
    assert_eq!(game.remaining_guesses(), 0);
    assert_eq!(game.guess_letter('C'), GuessResult::GameOver);
    assert_eq!(game.masked_word(), "___");
}

#[test]
fn test_repeated_and_invalid_guesses_cost_nothing() {
    let mut game = HangmanGame::with_word("cat");

    assert_eq!(game.guess_letter('z'), GuessResult::Miss);
    assert_eq!(game.guess_letter('Z'), GuessResult::AlreadyGuessed);
    assert_eq!(game.guess_letter('7'), GuessResult::Invalid);
    assert_eq!(game.guess_letter('é'), GuessResult::Invalid);
    assert_eq!(game.guess_word("c4t"), GuessResult::Invalid);
    assert_eq!(game.guess_word("  "), GuessResult::Invalid);

    assert_eq!(game.wrong_guesses(), 1);
    assert_eq!(game.guessed_letters().collect::<String>(), "Z");
}

#[test]
fn test_correct_word_guess_wins_immediately() {
    let mut game = HangmanGame::with_word("GARDEN");
    game.guess_letter('q');

    assert_eq!(game.guess_word(" garden "), GuessResult::Hit);
    assert_eq!(game.status(), GameStatus::Won);
    assert_eq!(game.masked_word(), "GARDEN");
    assert_eq!(game.wrong_guesses(), 1);
}

#[test]
fn test_wrong_word_guess_counts_once_and_can_lose() {
    let mut game = HangmanGame::with_word("CAT");
    for letter in ['B', 'D', 'E', 'F', 'G'] {
        game.guess_letter(letter);
    }

    assert_eq!(game.guess_word("COT"), GuessResult::Miss);

    assert_eq!(game.wrong_guesses(), 6);
    assert_eq!(game.status(), GameStatus::Lost);
    assert_eq!(game.guess_word("CAT"), GuessResult::GameOver);
}
