//! Read-only projections. Nothing in here mutates state.

use crate::{CauseId, CauseProgress, DonationSummary, ResultEngine, Transaction, User, UserId};

use super::Engine;

impl Engine {
    pub async fn balance(&self, user_id: UserId) -> ResultEngine<i64> {
        self.ledger.balance(user_id).await
    }

    /// Most-recent-first history, optionally capped to `limit` entries.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> ResultEngine<Vec<Transaction>> {
        self.ledger.history(user_id, limit).await
    }

    /// Live profile (balance, black points, attendance mark).
    pub async fn user(&self, user_id: UserId) -> ResultEngine<User> {
        self.ledger.user(user_id).await
    }

    pub async fn cause_progress(&self, cause_id: CauseId) -> ResultEngine<CauseProgress> {
        self.causes.progress(cause_id).await
    }

    pub async fn causes(&self) -> Vec<CauseProgress> {
        self.causes.all().await
    }

    pub async fn donation_summary(&self) -> DonationSummary {
        self.causes.summary().await
    }
}
