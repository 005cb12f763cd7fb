//! The ledger store: the only writer of user balances.
//!
//! Each user account (profile + transaction history) sits behind its own
//! async mutex, so mutations for one user are serialized while different
//! users proceed concurrently. The account map itself is fixed when the
//! roster is loaded and is never locked.
//!
//! Compound operations follow a preview-then-commit shape: with the account
//! guard held they first compute every effect (new balances, new counters)
//! with fallible, side-effect-free checks, and only then apply all of them
//! with infallible writes. A failure therefore never leaves a partial
//! effect behind.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    EngineError, LedgerEntry, ResultEngine, Transaction, TransactionId, TransactionKind,
    TransactionRefs, User, UserId,
};

/// Live state of a single user.
#[derive(Debug)]
pub(crate) struct Account {
    pub(crate) user: User,
    /// Oldest first; ids strictly increasing.
    pub(crate) history: Vec<Transaction>,
}

impl Account {
    /// Balance after applying `amounts` in order, or the reason they cannot
    /// be applied. Does not mutate the account.
    pub(crate) fn preview<'a>(
        &self,
        amounts: impl IntoIterator<Item = &'a LedgerEntry>,
    ) -> ResultEngine<i64> {
        let mut balance = self.user.balance;
        for entry in amounts {
            balance = next_balance(self.user.id, balance, entry.amount)?;
        }
        Ok(balance)
    }
}

fn next_balance(user_id: UserId, balance: i64, amount: i64) -> ResultEngine<i64> {
    let next = balance
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
    if next < 0 {
        return Err(EngineError::InsufficientBalance(format!(
            "user {user_id} has {balance} credits, {} required",
            amount.unsigned_abs()
        )));
    }
    Ok(next)
}

#[derive(Debug)]
pub struct LedgerStore {
    accounts: HashMap<UserId, Mutex<Account>>,
    next_id: AtomicU64,
}

impl LedgerStore {
    /// Opens one account per roster user. A non-zero starting balance is
    /// recorded as an `opening` transaction so that the history always sums
    /// to the balance.
    pub(crate) fn open(users: &[User], opened_at: DateTime<Utc>) -> Self {
        let mut next_id = 1;
        let mut accounts = HashMap::with_capacity(users.len());
        for user in users {
            let mut history = Vec::new();
            if user.balance > 0 {
                history.push(Transaction {
                    id: TransactionId(next_id),
                    user_id: user.id,
                    kind: TransactionKind::Opening,
                    amount: user.balance,
                    description: "Opening balance".to_string(),
                    occurred_at: opened_at,
                    resulting_balance: user.balance,
                    refs: TransactionRefs::default(),
                });
                next_id += 1;
            }
            accounts.insert(
                user.id,
                Mutex::new(Account {
                    user: user.clone(),
                    history,
                }),
            );
        }
        Self {
            accounts,
            next_id: AtomicU64::new(next_id),
        }
    }

    fn allocate_id(&self) -> TransactionId {
        TransactionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.accounts.contains_key(&user_id)
    }

    /// Acquires the exclusive guard for `user_id`. Held guards are the only
    /// way to mutate an account.
    pub(crate) async fn lock(&self, user_id: UserId) -> ResultEngine<MutexGuard<'_, Account>> {
        let account = self
            .accounts
            .get(&user_id)
            .ok_or_else(|| EngineError::UnknownUser(user_id.to_string()))?;
        Ok(account.lock().await)
    }

    /// Appends already-validated entries to a locked account.
    ///
    /// Callers must have checked the entries with [`Account::preview`] under
    /// the same guard; this only re-asserts the invariant.
    pub(crate) fn post(
        &self,
        account: &mut Account,
        entries: Vec<LedgerEntry>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Vec<Transaction>> {
        account.preview(&entries)?;

        let mut posted = Vec::with_capacity(entries.len());
        for entry in entries {
            let resulting_balance = account.user.balance + entry.amount;
            let tx = Transaction {
                id: self.allocate_id(),
                user_id: account.user.id,
                kind: entry.kind,
                amount: entry.amount,
                description: entry.description,
                occurred_at,
                resulting_balance,
                refs: entry.refs,
            };
            account.user.balance = resulting_balance;
            account.history.push(tx.clone());
            posted.push(tx);
        }
        Ok(posted)
    }

    /// Applies a single balance movement atomically.
    ///
    /// Fails with [`EngineError::UnknownUser`] for users outside the roster
    /// and with [`EngineError::InsufficientBalance`] when a debit exceeds the
    /// balance; in both cases nothing changes.
    pub async fn apply_transaction(
        &self,
        user_id: UserId,
        entry: LedgerEntry,
    ) -> ResultEngine<Transaction> {
        let mut account = self.lock(user_id).await?;
        let mut posted = self.post(&mut account, vec![entry], Utc::now())?;
        posted
            .pop()
            .ok_or_else(|| EngineError::InvalidAmount("nothing to apply".to_string()))
    }

    pub async fn balance(&self, user_id: UserId) -> ResultEngine<i64> {
        Ok(self.lock(user_id).await?.user.balance)
    }

    /// Transactions most-recent-first, at most `limit` of them.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> ResultEngine<Vec<Transaction>> {
        let account = self.lock(user_id).await?;
        let limit = limit.unwrap_or(usize::MAX);
        Ok(account.history.iter().rev().take(limit).cloned().collect())
    }

    /// Snapshot of the user's live profile.
    pub async fn user(&self, user_id: UserId) -> ResultEngine<User> {
        Ok(self.lock(user_id).await?.user.clone())
    }
}
