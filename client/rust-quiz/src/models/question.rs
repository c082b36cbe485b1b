use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Raised when the backend sends data the client cannot interpret safely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataContractError {
    #[error("unrecognized question type: {0}")]
    UnknownQuestionType(String),

    #[error("attempt reports {0} total questions")]
    InvalidQuestionCount(u32),

    #[error("response marks the quiz both completed and failed")]
    ConflictingOutcome,
}

/// Question type exactly as it arrives on the wire: sometimes a numeric code,
/// sometimes a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuestionType {
    Code(i64),
    Name(String),
    Other(serde_json::Value),
}

impl fmt::Display for RawQuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawQuestionType::Code(code) => write!(f, "{}", code),
            RawQuestionType::Name(name) => write!(f, "\"{}\"", name),
            RawQuestionType::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<QuestionType> for RawQuestionType {
    fn from(value: QuestionType) -> Self {
        RawQuestionType::Code(value.code() as i64)
    }
}

/// Canonical question types. The discriminant is the code the renderers
/// dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQuestionType", into = "RawQuestionType")]
#[repr(u8)]
pub enum QuestionType {
    FillInBlank = 0,
    VocabularyMeaning = 1,
    CorrectSentence = 2,
    PatternRecognition = 3,
    ListeningComprehension = 4,
    MultipleChoice = 5,
    TrueFalse = 6,
    Matching = 7,
    Ordering = 8,
}

impl QuestionType {
    pub const ALL: [QuestionType; 9] = [
        QuestionType::FillInBlank,
        QuestionType::VocabularyMeaning,
        QuestionType::CorrectSentence,
        QuestionType::PatternRecognition,
        QuestionType::ListeningComprehension,
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::Matching,
        QuestionType::Ordering,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            QuestionType::FillInBlank => "FillInBlank",
            QuestionType::VocabularyMeaning => "VocabularyMeaning",
            QuestionType::CorrectSentence => "CorrectSentence",
            QuestionType::PatternRecognition => "PatternRecognition",
            QuestionType::ListeningComprehension => "ListeningComprehension",
            QuestionType::MultipleChoice => "MultipleChoice",
            QuestionType::TrueFalse => "TrueFalse",
            QuestionType::Matching => "Matching",
            QuestionType::Ordering => "Ordering",
        }
    }

    /// Maps a wire value to its canonical type.
    ///
    /// Accepts integer codes, decimal strings and names compared without
    /// regard to case or `-`/`_`/space separators. Everything else is a
    /// contract violation; there is deliberately no fallback variant.
    pub fn normalize(raw: &RawQuestionType) -> Result<Self, DataContractError> {
        let unknown = || DataContractError::UnknownQuestionType(raw.to_string());

        match raw {
            RawQuestionType::Code(code) => Self::from_code(*code).ok_or_else(unknown),
            RawQuestionType::Name(name) => {
                let trimmed = name.trim();
                if let Ok(code) = trimmed.parse::<i64>() {
                    return Self::from_code(code).ok_or_else(unknown);
                }

                let folded = fold_name(trimmed);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| fold_name(candidate.wire_name()) == folded)
                    .ok_or_else(unknown)
            }
            RawQuestionType::Other(_) => Err(unknown()),
        }
    }
}

impl TryFrom<RawQuestionType> for QuestionType {
    type Error = DataContractError;

    fn try_from(raw: RawQuestionType) -> Result<Self, Self::Error> {
        QuestionType::normalize(&raw)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Question as received from the backend, type not yet normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: RawQuestionType,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Remaining type-specific payload (matching pairs, listening metadata...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Question as exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawQuestion> for Question {
    type Error = DataContractError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let question_type = QuestionType::normalize(&raw.question_type)?;
        Ok(Question {
            id: raw.id,
            question_type,
            text: raw.text,
            options: raw.options,
            pattern: raw.pattern,
            audio_url: raw.audio_url,
            extra: raw.extra,
        })
    }
}
