use std::fmt::Write as _;

use crate::models::{AnswerResult, Question, QuestionType, ReviewEntry, TerminalOutcome};
use crate::services::{QuizSessionMachine, SessionError, SessionPhase};

use super::{read_input, InputLines, QUIT_COMMAND};

/// Widest hearts bar drawn; larger counts are shown as a number.
const MAX_HEARTS_SHOWN: u32 = 10;

fn hearts_bar(hearts: u32) -> String {
    if hearts > MAX_HEARTS_SHOWN {
        format!("♥ x{}", hearts)
    } else {
        "♥".repeat(hearts as usize)
    }
}

pub fn render_question(question: &Question, number: u32, total: u32, hearts: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Question {}/{}  [{}]  hearts: {}",
        number,
        total,
        question.question_type,
        hearts_bar(hearts)
    );

    match question.question_type {
        QuestionType::PatternRecognition => {
            if let Some(pattern) = &question.pattern {
                let _ = writeln!(out, "Pattern: {}", pattern);
            }
        }
        QuestionType::ListeningComprehension => {
            if let Some(audio_url) = &question.audio_url {
                let _ = writeln!(out, "Listen: {}", audio_url);
            }
        }
        _ => {}
    }

    let _ = writeln!(out, "{}", question.text);
    for (index, option) in question.options.iter().enumerate() {
        let _ = writeln!(out, "  {}) {}", index + 1, option);
    }
    out
}

/// Maps a typed option number to the option text; anything else is sent as is.
pub fn resolve_answer(question: &Question, input: &str) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| question.options.get(index))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}

pub fn render_feedback(result: &AnswerResult, hearts: u32) -> String {
    let mut out = String::new();
    if result.is_correct {
        let _ = write!(out, "Correct!");
    } else {
        let _ = write!(out, "Not quite.");
        if let Some(correct) = &result.correct_answer {
            let _ = write!(out, " Correct answer: {}", correct);
        }
    }
    if !result.message.is_empty() {
        let _ = write!(out, " {}", result.message);
    }
    if let Some(explanation) = &result.explanation {
        let _ = write!(out, "\n  {}", explanation);
    }
    let _ = write!(out, "\nHearts left: {}", hearts);
    out
}

pub fn render_review(review: &[ReviewEntry]) -> String {
    let mut out = String::from("Review:\n");
    for (index, entry) in review.iter().enumerate() {
        let prompt = entry
            .question
            .as_ref()
            .map(|question| question.text.as_str())
            .unwrap_or("(question unavailable)");
        let mark = if entry.result.is_correct { "✓" } else { "✗" };
        let _ = writeln!(out, "{:>3}. {} {}", index + 1, mark, prompt);
        let _ = writeln!(out, "     your answer: {}", entry.user_answer);
        if !entry.result.is_correct {
            if let Some(correct) = &entry.result.correct_answer {
                let _ = writeln!(out, "     correct:     {}", correct);
            }
        }
    }
    out
}

/// Plays one attempt of `level_id` on the terminal until it ends or the
/// learner quits.
pub async fn run(
    machine: &QuizSessionMachine,
    level_id: &str,
    lines: &mut InputLines,
) -> anyhow::Result<()> {
    if let Err(err) = machine.start(level_id).await {
        println!("Could not start the quiz: {}", err.user_message());
        return Ok(());
    }

    loop {
        let snapshot = machine.snapshot().await;
        match &snapshot.phase {
            SessionPhase::Active => {}
            SessionPhase::Completed => {
                if let TerminalOutcome::Completed { score } = snapshot.attempt.terminal_outcome {
                    println!("\nLevel complete! Score: {}", score);
                }
                println!("{}", render_review(&snapshot.attempt.review));
                return Ok(());
            }
            SessionPhase::Failed | SessionPhase::Idle => {
                println!("\nOut of hearts. Try the level again!");
                return Ok(());
            }
            SessionPhase::Error(message) => {
                println!("Something went wrong: {}", message);
                return Ok(());
            }
            SessionPhase::Loading(_) => {
                tokio::task::yield_now().await;
                continue;
            }
        }

        let attempt = &snapshot.attempt;
        let Some(question) = attempt.current_question.as_ref() else {
            return Ok(());
        };
        print!(
            "{}",
            render_question(
                question,
                attempt.current_question_number,
                attempt.total_questions,
                attempt.hearts_remaining
            )
        );
        println!("Your answer ({} to quit):", QUIT_COMMAND);

        let Some(input) = read_input(lines).await? else {
            machine.abandon().await;
            return Ok(());
        };
        if input == QUIT_COMMAND {
            machine.abandon().await;
            println!("Quiz abandoned.");
            return Ok(());
        }

        let answer = resolve_answer(question, &input);
        match machine.submit_answer(&question.id, &answer).await {
            Ok(outcome) => {
                println!("{}", render_feedback(&outcome.result, outcome.hearts_remaining));
                if outcome.auto_abandoned {
                    println!("\nOut of hearts. Try the level again!");
                    return Ok(());
                }
            }
            Err(SessionError::Busy) => println!("Still grading the previous answer..."),
            Err(err) => tracing::debug!("Submit returned: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(question_type: QuestionType, options: &[&str]) -> Question {
        Question {
            id: "Q1".to_string(),
            question_type,
            text: "Choose the translation of 'Hund'".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            pattern: Some("-ed".to_string()),
            audio_url: Some("https://cdn.example.com/q1.mp3".to_string()),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn option_numbers_resolve_to_option_text() {
        let q = question(QuestionType::MultipleChoice, &["dog", "cat"]);
        assert_eq!(resolve_answer(&q, "2"), "cat");
        assert_eq!(resolve_answer(&q, "0"), "0");
        assert_eq!(resolve_answer(&q, "3"), "3");
        assert_eq!(resolve_answer(&q, "dog"), "dog");
    }

    #[test]
    fn listening_questions_show_audio_only() {
        let rendered = render_question(&question(QuestionType::ListeningComprehension, &[]), 1, 3, 2);
        assert!(rendered.contains("Listen: https://cdn.example.com/q1.mp3"));
        assert!(!rendered.contains("Pattern:"));
        assert!(rendered.contains("Question 1/3"));
    }

    #[test]
    fn large_heart_counts_are_not_drawn_one_by_one() {
        let q = question(QuestionType::MultipleChoice, &["dog"]);
        assert!(render_question(&q, 1, 3, 3).contains("hearts: ♥♥♥\n"));

        let rendered = render_question(&q, 1, 3, u32::MAX);
        assert!(rendered.contains(&format!("hearts: ♥ x{}", u32::MAX)));
        assert!(rendered.len() < 200);
    }

    #[test]
    fn feedback_shows_correct_answer_on_miss() {
        let result = AnswerResult {
            is_correct: false,
            message: String::new(),
            correct_answer: Some("dog".to_string()),
            explanation: None,
        };
        let rendered = render_feedback(&result, 4);
        assert!(rendered.contains("Correct answer: dog"));
        assert!(rendered.ends_with("Hearts left: 4"));
    }
}
