use crate::quiz::Response;

/// Points for a strong answer; also the per-question maximum.
pub const MAX_POINTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub total: u32,
}

impl ScoreResult {
    pub fn percent(&self) -> u32 {
        percent(self.score, self.total)
    }

    pub fn remark(&self) -> Remark {
        Remark::from_percent(self.percent())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remark {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Remark {
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 80 {
            Remark::Excellent
        } else if percent >= 50 {
            Remark::Good
        } else {
            Remark::NeedsImprovement
        }
    }
}

pub fn points(response: Option<Response>) -> u32 {
    match response {
        Some(Response::Strong) => MAX_POINTS,
        Some(Response::Partial) => 1,
        Some(Response::Weak) | None => 0,
    }
}

pub fn score(responses: &[Option<Response>]) -> ScoreResult {
    ScoreResult {
        score: responses.iter().copied().map(points).sum(),
        total: MAX_POINTS * responses.len() as u32,
    }
}

/// Whole-number percentage, rounded down. An empty attempt counts as 0%.
pub fn percent(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (u64::from(score) * 100 / u64::from(total)) as u32
}
