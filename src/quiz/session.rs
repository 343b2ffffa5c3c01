use crate::quiz::scoring::{Remark, ScoreResult, MAX_POINTS};
use crate::quiz::{ContentItem, QuizError};

/// Where an attempt currently is, derived from which fields are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Answering,
    Scored,
}

/// Everything one user has chosen and earned in the current attempt.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionState {
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub questions: Option<Vec<ContentItem>>,
    pub score: Option<u32>,
    pub total: Option<u32>,
    pub remark: Option<Remark>,
}

impl SessionState {
    pub fn stage(&self) -> Stage {
        if self.score.is_some() {
            Stage::Scored
        } else if self.subject.is_some() {
            Stage::Answering
        } else {
            Stage::Start
        }
    }

    pub fn selection(&self) -> Option<(&str, &str)> {
        Some((self.subject.as_deref()?, self.topic.as_deref()?))
    }

    pub fn result(&self) -> Option<ScoreResult> {
        Some(ScoreResult {
            score: self.score?,
            total: self.total?,
        })
    }

    /// Verifies the fields were filled in the order the quiz allows.
    pub fn check(&self) -> Result<(), QuizError> {
        if self.subject.is_some() != self.topic.is_some() {
            return Err(QuizError::CorruptSession("subject and topic must be set together"));
        }
        if self.questions.is_some() && self.subject.is_none() {
            return Err(QuizError::CorruptSession("questions drawn without a selection"));
        }

        let scored = [
            self.score.is_some(),
            self.total.is_some(),
            self.remark.is_some(),
        ];
        if scored.iter().any(|set| *set) && !scored.iter().all(|set| *set) {
            return Err(QuizError::CorruptSession("score, total and remark are set together"));
        }

        if let Some(result) = self.result() {
            let Some(questions) = &self.questions else {
                return Err(QuizError::CorruptSession("scored without a question set"));
            };
            if result.total != MAX_POINTS * questions.len() as u32 || result.score > result.total
            {
                return Err(QuizError::CorruptSession("score does not match the question set"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> ContentItem {
        ContentItem::new("Math".to_string(), "Algebra".to_string(), text.to_string())
    }

    fn scored() -> SessionState {
        SessionState {
            subject: Some("Math".to_string()),
            topic: Some("Algebra".to_string()),
            questions: Some(vec![item("a"), item("b")]),
            score: Some(3),
            total: Some(4),
            remark: Some(Remark::Good),
        }
    }

    #[test]
    fn stages_follow_filled_fields() {
        let mut state = SessionState::default();
        assert_eq!(state.stage(), Stage::Start);
        assert_eq!(state.check(), Ok(()));

        state.subject = Some("Math".to_string());
        state.topic = Some("Algebra".to_string());
        assert_eq!(state.stage(), Stage::Answering);
        assert_eq!(state.selection(), Some(("Math", "Algebra")));

        assert_eq!(scored().stage(), Stage::Scored);
        assert_eq!(scored().check(), Ok(()));
    }

    #[test]
    fn rejects_out_of_order_fields() {
        let half_selected = SessionState {
            subject: Some("Math".to_string()),
            ..Default::default()
        };
        assert!(half_selected.check().is_err());

        let mut no_questions = scored();
        no_questions.questions = None;
        assert!(no_questions.check().is_err());

        let mut partial_score = scored();
        partial_score.remark = None;
        assert!(partial_score.check().is_err());

        let mut wrong_total = scored();
        wrong_total.total = Some(6);
        assert!(wrong_total.check().is_err());

        let mut questions_only = SessionState::default();
        questions_only.questions = Some(vec![item("a")]);
        assert!(questions_only.check().is_err());
    }
}
