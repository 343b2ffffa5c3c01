use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::content::ContentStore;
use crate::quiz::scoring::{self, Remark, ScoreResult};
use crate::quiz::session::{SessionState, Stage};
use crate::quiz::{ContentItem, QuizError, Response};

pub const DEFAULT_QUESTIONS_PER_ATTEMPT: usize = 5;

/// A scored attempt, as shown on the remarks, focus and report pages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Outcome {
    pub subject: String,
    pub topic: String,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
    pub remark: Remark,
}

/// Moves a [`SessionState`] through selection, answering and scoring.
///
/// Every step checks that the earlier steps happened first and reports
/// [`QuizError::MissingPrecondition`] otherwise.
pub struct QuizFlow {
    content: Arc<ContentStore>,
    questions_per_attempt: usize,
}

impl QuizFlow {
    pub fn new(content: Arc<ContentStore>, questions_per_attempt: usize) -> Self {
        Self {
            content,
            questions_per_attempt,
        }
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// Starts a fresh attempt for a subject/topic pair that exists in the content.
    pub fn select(
        &self,
        state: &mut SessionState,
        subject: &str,
        topic: &str,
    ) -> Result<(), QuizError> {
        let (subject, topic) = (subject.trim(), topic.trim());
        if subject.is_empty() || topic.is_empty() || !self.content.contains(subject, topic) {
            return Err(QuizError::InvalidSelection {
                subject: subject.to_string(),
                topic: topic.to_string(),
            });
        }

        *state = SessionState {
            subject: Some(subject.to_string()),
            topic: Some(topic.to_string()),
            ..Default::default()
        };
        state.check()
    }

    /// The attempt's question set, drawn on first use and fixed until the next selection.
    pub fn questions<'s, R: Rng + ?Sized>(
        &self,
        state: &'s mut SessionState,
        rng: &mut R,
    ) -> Result<&'s [ContentItem], QuizError> {
        state.check()?;
        match state.stage() {
            Stage::Start => return Err(QuizError::MissingPrecondition),
            Stage::Scored => return Err(QuizError::AlreadyScored),
            Stage::Answering => {}
        }

        if state.questions.is_none() {
            let (subject, topic) = state.selection().ok_or(QuizError::MissingPrecondition)?;
            let pool = self.content.items_for(subject, topic);
            if pool.is_empty() {
                log::warn!("No content for {} / {}", subject, topic);
            }
            let drawn: Vec<ContentItem> = pool
                .choose_multiple(rng, self.questions_per_attempt.min(pool.len()))
                .cloned()
                .collect();
            log::debug!("Drew {} of {} questions", drawn.len(), pool.len());
            state.questions = Some(drawn);
            state.check()?;
        }

        Ok(state.questions.as_deref().unwrap_or(&[]))
    }

    /// Scores one response per question, in question order.
    pub fn submit(
        &self,
        state: &mut SessionState,
        responses: &[Option<Response>],
    ) -> Result<ScoreResult, QuizError> {
        state.check()?;
        if state.stage() == Stage::Scored {
            return Err(QuizError::AlreadyScored);
        }
        let expected = match (&state.questions, state.stage()) {
            (Some(questions), _) => questions.len(),
            (None, Stage::Answering) => return Err(QuizError::QuestionsNotDrawn),
            (None, _) => return Err(QuizError::MissingPrecondition),
        };
        if responses.len() != expected {
            return Err(QuizError::ResponseCountMismatch {
                expected,
                actual: responses.len(),
            });
        }

        let result = scoring::score(responses);
        state.score = Some(result.score);
        state.total = Some(result.total);
        state.remark = Some(result.remark());
        state.check()?;

        Ok(result)
    }

    pub fn outcome(&self, state: &SessionState) -> Result<Outcome, QuizError> {
        state.check()?;
        let result = state.result().ok_or(QuizError::MissingPrecondition)?;
        let (subject, topic) = state.selection().ok_or(QuizError::MissingPrecondition)?;

        Ok(Outcome {
            subject: subject.to_string(),
            topic: topic.to_string(),
            score: result.score,
            total: result.total,
            percent: result.percent(),
            remark: state.remark.unwrap_or_else(|| result.remark()),
        })
    }
}
