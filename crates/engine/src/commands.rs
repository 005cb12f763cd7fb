//! Command structs for engine operations.
//!
//! These types group parameters for the processors that take more than a
//! couple of arguments, keeping call sites readable.

use serde::{Deserialize, Serialize};

use crate::{BankId, ItemId, SchemeId, StallId, UserId};

/// Apply for a loan on a bank scheme.
#[derive(Clone, Debug)]
pub struct LoanRequest {
    pub user_id: UserId,
    pub bank_id: BankId,
    pub scheme_id: SchemeId,
    pub amount: i64,
}

impl LoanRequest {
    #[must_use]
    pub fn new(user_id: UserId, bank_id: BankId, scheme_id: SchemeId, amount: i64) -> Self {
        Self {
            user_id,
            bank_id,
            scheme_id,
            amount,
        }
    }
}

/// Penalize an employee: debit credits and add black points in one step.
#[derive(Clone, Debug)]
pub struct PenaltyCmd {
    pub employee_id: UserId,
    pub amount: i64,
    pub points: u32,
    pub note: Option<String>,
}

impl PenaltyCmd {
    #[must_use]
    pub fn new(employee_id: UserId, amount: i64, points: u32) -> Self {
        Self {
            employee_id,
            amount,
            points,
            note: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// One cart line as sent by a client in a single-shot purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub stall_id: StallId,
    pub item_id: ItemId,
    pub quantity: u32,
}
