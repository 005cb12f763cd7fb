//! Loan applications and the book that stores them.
//!
//! The interest rate is priced once, at submission, and frozen on the
//! record. Status moves `pending -> approved | rejected` and is terminal
//! afterwards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    BankId, EngineError, InterestRate, LoanId, ResultEngine, SchemeId, TransactionId, UserId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Outcome of a bank review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    Approve,
    Reject,
}

impl LoanDecision {
    fn status(self) -> LoanStatus {
        match self {
            Self::Approve => LoanStatus::Approved,
            Self::Reject => LoanStatus::Rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: LoanId,
    pub user_id: UserId,
    pub bank_id: BankId,
    pub scheme_id: SchemeId,
    pub principal: i64,
    pub status: LoanStatus,
    /// Rate priced at submission time.
    pub interest_rate: InterestRate,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    /// Ledger transaction that paid out the principal, once approved.
    #[serde(default)]
    pub disbursement: Option<TransactionId>,
}

#[derive(Debug)]
pub(crate) struct LoanBookState {
    applications: BTreeMap<LoanId, LoanApplication>,
    next_id: u64,
}

impl LoanBookState {
    /// Stores a new pending application under a fresh id.
    pub(crate) fn submit(
        &mut self,
        user_id: UserId,
        bank_id: BankId,
        scheme_id: SchemeId,
        principal: i64,
        interest_rate: InterestRate,
        submitted_at: DateTime<Utc>,
    ) -> LoanApplication {
        let id = LoanId(self.next_id);
        self.next_id += 1;
        let application = LoanApplication {
            id,
            user_id,
            bank_id,
            scheme_id,
            principal,
            status: LoanStatus::Pending,
            interest_rate,
            submitted_at,
            decided_at: None,
            disbursement: None,
        };
        self.applications.insert(id, application.clone());
        application
    }

    pub(crate) fn get(&self, id: LoanId) -> ResultEngine<&LoanApplication> {
        self.applications
            .get(&id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("loan application {id}")))
    }

    /// Fails unless the application is still pending.
    pub(crate) fn ensure_pending(&self, id: LoanId) -> ResultEngine<&LoanApplication> {
        let application = self.get(id)?;
        if application.status != LoanStatus::Pending {
            return Err(EngineError::InvalidTransition(format!(
                "loan application {id} is already {}",
                application.status.as_str()
            )));
        }
        Ok(application)
    }

    /// Records a decision on a pending application.
    pub(crate) fn decide(
        &mut self,
        id: LoanId,
        decision: LoanDecision,
        decided_at: DateTime<Utc>,
        disbursement: Option<TransactionId>,
    ) -> ResultEngine<LoanApplication> {
        self.ensure_pending(id)?;
        let application = self
            .applications
            .get_mut(&id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("loan application {id}")))?;
        application.status = decision.status();
        application.decided_at = Some(decided_at);
        application.disbursement = disbursement;
        Ok(application.clone())
    }

    pub(crate) fn for_user(&self, user_id: UserId) -> Vec<LoanApplication> {
        self.applications
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct LoanBook {
    state: Mutex<LoanBookState>,
}

impl LoanBook {
    /// Seeds the book with existing applications. New ids continue after the
    /// highest seeded id.
    pub(crate) fn new(seed: &[LoanApplication]) -> Self {
        let applications: BTreeMap<LoanId, LoanApplication> =
            seed.iter().map(|a| (a.id, a.clone())).collect();
        let next_id = applications
            .keys()
            .next_back()
            .map_or(1, |id| id.get() + 1);
        Self {
            state: Mutex::new(LoanBookState {
                applications,
                next_id,
            }),
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, LoanBookState> {
        self.state.lock().await
    }
}
