use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    CauseId, CauseProgress, EngineError, LedgerEntry, ResultEngine, Transaction, TransactionKind,
    TransactionRefs, UserId, causes, policy,
};

use super::Engine;

/// What a successful donation produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DonationReceipt {
    pub transaction: Transaction,
    pub cause: CauseProgress,
    /// This donation closed the remaining gap to the target.
    pub closed_goal: bool,
}

impl Engine {
    /// Donates `amount` credits of `user_id` to a cause.
    ///
    /// The debit and the increase of the cause's raised total are one
    /// commit. The goal may be overshot.
    pub async fn donate(
        &self,
        user_id: UserId,
        cause_id: CauseId,
        amount: i64,
    ) -> ResultEngine<DonationReceipt> {
        if amount <= 0 {
            return Err(EngineError::InvalidAmount(
                "donation must be > 0".to_string(),
            ));
        }

        // user account first, then the cause
        let mut account = self.ledger.lock(user_id).await?;
        let mut cause = self.causes.lock(cause_id).await?;

        let entry = LedgerEntry::debit(
            TransactionKind::Donation,
            amount,
            format!("Donation to {}", cause.name),
            TransactionRefs::cause(cause_id),
        )?;
        account.preview([&entry])?;
        let raised = causes::raise(&cause, amount)?;
        let closed_goal = cause.raised < cause.target
            && policy::closes_goal(cause.raised, cause.target, amount);

        let transaction = self
            .ledger
            .post(&mut account, vec![entry], Utc::now())?
            .pop()
            .ok_or_else(|| EngineError::InvalidAmount("nothing to apply".to_string()))?;
        cause.raised = raised;
        let progress = CauseProgress::of(&cause);

        tracing::info!(
            user_id = %user_id,
            cause_id = %cause_id,
            amount,
            raised,
            "donation committed"
        );
        Ok(DonationReceipt {
            transaction,
            cause: progress,
            closed_goal,
        })
    }

    /// Quick donation amounts for the user's current balance.
    pub async fn suggested_donations(&self, user_id: UserId) -> ResultEngine<[i64; 3]> {
        let balance = self.ledger.balance(user_id).await?;
        Ok(policy::suggested_donations(balance))
    }
}
