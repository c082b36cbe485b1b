use crate::services::{GameStatus, GuessResult, HangmanGame};

use super::{read_input, InputLines, QUIT_COMMAND, RESTART_COMMAND};

pub fn render_board(game: &HangmanGame) -> String {
    let guessed: String = game.guessed_letters().collect();
    format!(
        "\n{}\nGuessed: [{}]  wrong guesses left: {}",
        spaced(&game.masked_word()),
        guessed,
        game.remaining_guesses()
    )
}

/// Applies one line of input: a single character guesses a letter, anything
/// longer guesses the whole word.
pub fn apply_input(game: &mut HangmanGame, input: &str) -> GuessResult {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => game.guess_letter(letter),
        _ => game.guess_word(input),
    }
}

fn spaced(word: &str) -> String {
    word.chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn run(lines: &mut InputLines) -> anyhow::Result<()> {
    let mut game = HangmanGame::new();
    println!(
        "Guess the word! Type a letter or the whole word ({} restarts, {} quits).",
        RESTART_COMMAND, QUIT_COMMAND
    );

    loop {
        println!("{}", render_board(&game));

        let Some(input) = read_input(lines).await? else {
            return Ok(());
        };
        match input.as_str() {
            QUIT_COMMAND => return Ok(()),
            RESTART_COMMAND => {
                game.restart();
                continue;
            }
            _ => {}
        }

        match apply_input(&mut game, &input) {
            GuessResult::Hit => println!("Nice!"),
            GuessResult::Miss => println!("Nope."),
            GuessResult::AlreadyGuessed => println!("You already tried that letter."),
            GuessResult::Invalid => println!("Letters only, please."),
            GuessResult::GameOver => {}
        }

        match game.status() {
            GameStatus::Playing => {}
            GameStatus::Won => {
                println!("You won! The word was {}.", game.word());
                println!("Type {} to play again or {} to quit.", RESTART_COMMAND, QUIT_COMMAND);
            }
            GameStatus::Lost => {
                println!("Out of guesses. The word was {}.", game.word());
                println!("Type {} to play again or {} to quit.", RESTART_COMMAND, QUIT_COMMAND);
            }
        }
    }
}
