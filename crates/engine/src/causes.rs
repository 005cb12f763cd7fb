//! Live fundraising totals for donation causes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::{CauseId, DonationCause, EngineError, ResultEngine, policy};

/// Read-only view of a cause and how far it is from its goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CauseProgress {
    pub id: CauseId,
    pub name: String,
    pub category: String,
    pub target: i64,
    pub raised: i64,
    /// Clamped to 100 for display.
    pub percentage: f64,
    /// Credits still missing; 0 once the goal is met.
    pub remaining: i64,
    pub goal_reached: bool,
}

impl CauseProgress {
    pub(crate) fn of(cause: &DonationCause) -> Self {
        Self {
            id: cause.id,
            name: cause.name.clone(),
            category: cause.category.clone(),
            target: cause.target,
            raised: cause.raised,
            percentage: policy::donation_progress(cause.raised, cause.target),
            remaining: (cause.target - cause.raised).max(0),
            goal_reached: cause.raised >= cause.target,
        }
    }
}

/// Every cause with its progress, plus the totals across them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationSummary {
    pub total_raised: i64,
    pub causes_completed: usize,
    pub causes: Vec<CauseProgress>,
}

/// Raised amounts per cause. Each cause has its own lock; the raised amount
/// only ever grows.
#[derive(Debug)]
pub struct CauseBoard {
    causes: BTreeMap<CauseId, Mutex<DonationCause>>,
}

impl CauseBoard {
    pub(crate) fn new(causes: &[DonationCause]) -> Self {
        Self {
            causes: causes
                .iter()
                .map(|c| (c.id, Mutex::new(c.clone())))
                .collect(),
        }
    }

    pub(crate) async fn lock(&self, cause_id: CauseId) -> ResultEngine<MutexGuard<'_, DonationCause>> {
        let cause = self
            .causes
            .get(&cause_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("cause {cause_id}")))?;
        Ok(cause.lock().await)
    }

    pub async fn progress(&self, cause_id: CauseId) -> ResultEngine<CauseProgress> {
        Ok(CauseProgress::of(&*self.lock(cause_id).await?))
    }

    /// Progress of every cause, ordered by id.
    pub async fn all(&self) -> Vec<CauseProgress> {
        let mut out = Vec::with_capacity(self.causes.len());
        for cause in self.causes.values() {
            out.push(CauseProgress::of(&*cause.lock().await));
        }
        out
    }

    pub async fn summary(&self) -> DonationSummary {
        let all = self.all().await;
        DonationSummary {
            total_raised: all.iter().map(|c| c.raised).sum(),
            causes_completed: all.iter().filter(|c| c.goal_reached).count(),
            causes: all,
        }
    }
}

/// Raised amount after adding `amount`, rejecting overflow.
pub(crate) fn raise(cause: &DonationCause, amount: i64) -> ResultEngine<i64> {
    if amount <= 0 {
        return Err(EngineError::InvalidAmount(
            "donation must be > 0".to_string(),
        ));
    }
    cause
        .raised
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount(format!("cause {} total overflow", cause.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cause(id: u32, target: i64, raised: i64) -> DonationCause {
        DonationCause {
            id: CauseId(id),
            name: format!("cause {id}"),
            description: String::new(),
            category: "Environment".to_string(),
            target,
            raised,
        }
    }

    #[tokio::test]
    async fn progress_reports_remaining_and_goal() {
        let board = CauseBoard::new(&[cause(1, 50_000, 23_500), cause(2, 100, 150)]);
        let first = board.progress(CauseId(1)).await.unwrap();
        assert_eq!(first.remaining, 26_500);
        assert!(!first.goal_reached);

        let second = board.progress(CauseId(2)).await.unwrap();
        assert_eq!(second.remaining, 0);
        assert_eq!(second.percentage, 100.0);
        assert!(second.goal_reached);
    }

    #[tokio::test]
    async fn summary_counts_completed_causes() {
        let board = CauseBoard::new(&[cause(1, 50_000, 23_500), cause(2, 100, 150)]);
        let summary = board.summary().await;
        assert_eq!(summary.total_raised, 23_650);
        assert_eq!(summary.causes_completed, 1);
        let ids: Vec<CauseId> = summary.causes.iter().map(|c| c.id).collect();
        assert_eq!(ids, [CauseId(1), CauseId(2)]);
        assert_eq!(summary.causes[1].remaining, 0);
    }

    #[test]
    fn raise_rejects_overflow_and_non_positive() {
        assert!(raise(&cause(1, 10, i64::MAX), 1).is_err());
        assert!(raise(&cause(1, 10, 0), 0).is_err());
        assert_eq!(raise(&cause(1, 10, 5), 7).unwrap(), 12);
    }
}
