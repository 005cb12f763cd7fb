use std::sync::Arc;

use chrono::Utc;

use crate::{
    CheckoutSession, EngineError, LedgerEntry, PurchaseLine, ResultEngine, Transaction,
    TransactionKind, TransactionRefs, UserId,
};

use super::Engine;

impl Engine {
    /// Opens the checkout session of `user_id`. Fails with
    /// [`EngineError::CheckoutInProgress`] while another session of the same
    /// user is still alive.
    pub fn open_checkout(&self, user_id: UserId) -> ResultEngine<CheckoutSession> {
        if !self.ledger.contains(user_id) {
            return Err(EngineError::UnknownUser(user_id.to_string()));
        }
        CheckoutSession::open(
            user_id,
            Arc::clone(&self.catalog),
            Arc::clone(&self.checkouts),
        )
    }

    /// Pays for the session's cart.
    ///
    /// Every cart line becomes one `purchase` transaction; all of them are
    /// committed under a single lock acquisition, or none is. The cart is
    /// emptied only on success.
    pub async fn checkout(&self, session: &mut CheckoutSession) -> ResultEngine<Vec<Transaction>> {
        let user_id = session.user_id();
        let cart = session.cart();
        if cart.is_empty() {
            return Err(EngineError::InvalidCart("cart is empty".to_string()));
        }
        let total = cart.total()?;

        let mut entries = Vec::new();
        for line in cart.lines() {
            entries.push(LedgerEntry::debit(
                TransactionKind::Purchase,
                line.subtotal()?,
                format!("{} - {}", line.item_name, line.stall_name),
                TransactionRefs::item(line.stall_id, line.item_id),
            )?);
        }

        let mut account = self.ledger.lock(user_id).await?;
        if total > account.user.balance {
            return Err(EngineError::InsufficientBalance(format!(
                "cart total is {total} credits, balance is {}",
                account.user.balance
            )));
        }
        let posted = self.ledger.post(&mut account, entries, Utc::now())?;
        let balance = account.user.balance;
        drop(account);

        session.cart_mut().clear();
        tracing::info!(
            user_id = %user_id,
            total,
            lines = posted.len(),
            balance,
            "checkout committed"
        );
        Ok(posted)
    }

    /// One-shot purchase: opens a checkout, fills the cart with `lines` and
    /// pays for it.
    pub async fn purchase(
        &self,
        user_id: UserId,
        lines: &[PurchaseLine],
    ) -> ResultEngine<Vec<Transaction>> {
        let mut session = self.open_checkout(user_id)?;
        for line in lines {
            session.add(line.stall_id, line.item_id, line.quantity)?;
        }
        self.checkout(&mut session).await
    }
}
