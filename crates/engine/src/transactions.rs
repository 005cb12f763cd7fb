//! Transaction primitives.
//!
//! A `Transaction` is an immutable ledger record. The ledger assigns its id
//! and `resulting_balance`; callers only describe the movement with a
//! [`LedgerEntry`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CauseId, EngineError, ItemId, LoanId, ResultEngine, StallId, TransactionId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Starting balance recorded when the roster is loaded.
    Opening,
    Purchase,
    Salary,
    Reward,
    Penalty,
    Donation,
    LoanDisbursement,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Purchase => "purchase",
            Self::Salary => "salary",
            Self::Reward => "reward",
            Self::Penalty => "penalty",
            Self::Donation => "donation",
            Self::LoanDisbursement => "loan_disbursement",
        }
    }

    /// Whether entries of this kind take credits away from the user.
    pub fn is_debit(self) -> bool {
        matches!(self, Self::Purchase | Self::Penalty | Self::Donation)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "opening" => Ok(Self::Opening),
            "purchase" => Ok(Self::Purchase),
            "salary" => Ok(Self::Salary),
            "reward" => Ok(Self::Reward),
            "penalty" => Ok(Self::Penalty),
            "donation" => Ok(Self::Donation),
            "loan_disbursement" => Ok(Self::LoanDisbursement),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Optional links from a transaction to the catalog or loan book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRefs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stall_id: Option<StallId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause_id: Option<CauseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_application_id: Option<LoanId>,
}

impl TransactionRefs {
    #[must_use]
    pub fn item(stall_id: StallId, item_id: ItemId) -> Self {
        Self {
            stall_id: Some(stall_id),
            item_id: Some(item_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cause(cause_id: CauseId) -> Self {
        Self {
            cause_id: Some(cause_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn loan(loan_application_id: LoanId) -> Self {
        Self {
            loan_application_id: Some(loan_application_id),
            ..Self::default()
        }
    }
}

/// A requested balance movement, before the ledger commits it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub kind: TransactionKind,
    /// Signed amount in credits, negative for debits.
    pub amount: i64,
    pub description: String,
    pub refs: TransactionRefs,
}

impl LedgerEntry {
    /// Builds an entry, checking that the sign of `amount` matches `kind`.
    pub fn new(
        kind: TransactionKind,
        amount: i64,
        description: impl Into<String>,
        refs: TransactionRefs,
    ) -> ResultEngine<Self> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount("amount must be != 0".to_string()));
        }
        if kind.is_debit() != (amount < 0) {
            return Err(EngineError::InvalidAmount(format!(
                "{} amount must be {}",
                kind.as_str(),
                if kind.is_debit() { "negative" } else { "positive" }
            )));
        }
        Ok(Self {
            kind,
            amount,
            description: description.into(),
            refs,
        })
    }

    /// Debit entry of `credits` (> 0) for a debit kind.
    pub fn debit(
        kind: TransactionKind,
        credits: i64,
        description: impl Into<String>,
        refs: TransactionRefs,
    ) -> ResultEngine<Self> {
        if credits <= 0 {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        Self::new(kind, -credits, description, refs)
    }

    /// Credit entry of `credits` (> 0) for a credit kind.
    pub fn credit(
        kind: TransactionKind,
        credits: i64,
        description: impl Into<String>,
        refs: TransactionRefs,
    ) -> ResultEngine<Self> {
        if credits <= 0 {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        Self::new(kind, credits, description, refs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    /// Balance right after this transaction was applied.
    pub resulting_balance: i64,
    #[serde(default)]
    pub refs: TransactionRefs,
}
