pub mod content;
pub mod flow;
pub mod scoring;
pub mod session;

use std::str::FromStr;

/// A single self-assessment prompt tagged with the subject and topic it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContentItem {
    pub subject: String,
    pub topic: String,
    pub text: String,
}

impl ContentItem {
    pub fn new(subject: String, topic: String, text: String) -> Self {
        Self {
            subject,
            topic,
            text,
        }
    }
}

/// How well the user says they understand a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Strong,
    Partial,
    Weak,
}

impl Response {
    pub const ALL: [Response; 3] = [Response::Strong, Response::Partial, Response::Weak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Response::Strong => "strong",
            Response::Partial => "partial",
            Response::Weak => "weak",
        }
    }
}

impl FromStr for Response {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strong" => Ok(Response::Strong),
            "partial" => Ok(Response::Partial),
            "weak" => Ok(Response::Weak),
            other => Err(QuizError::UnknownResponse(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("unknown subject/topic selection: {subject:?} / {topic:?}")]
    InvalidSelection { subject: String, topic: String },
    #[error("session is missing a required earlier step")]
    MissingPrecondition,
    #[error("no questions have been drawn for this selection yet")]
    QuestionsNotDrawn,
    #[error("this attempt has already been scored")]
    AlreadyScored,
    #[error("expected {expected} responses, got {actual}")]
    ResponseCountMismatch { expected: usize, actual: usize },
    #[error("unknown response {0:?}")]
    UnknownResponse(String),
    #[error("session state is inconsistent: {0}")]
    CorruptSession(&'static str),
}
