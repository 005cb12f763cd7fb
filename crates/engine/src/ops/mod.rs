use std::sync::Arc;

use chrono::Utc;

use crate::{
    Catalog, CauseBoard, LedgerEntry, LedgerStore, LoanBook, ResultEngine, Transaction, UserId,
    cart::CheckoutRegistry,
};

mod donations;
mod loans;
mod purchases;
mod queries;
mod sign_in;
mod team;

pub use donations::DonationReceipt;
pub use loans::LoanQuote;
pub use sign_in::SignIn;
pub use team::{EmployerScope, TeamMember, TeamOverview};

/// The credit ledger service.
///
/// All mutating operations are `async` and take `&self`: per-user locks
/// inside the ledger serialize work on the same user, so an `Engine` can be
/// shared behind an `Arc` by any number of concurrent callers.
#[derive(Debug)]
pub struct Engine {
    catalog: Arc<Catalog>,
    ledger: LedgerStore,
    loans: LoanBook,
    causes: CauseBoard,
    checkouts: Arc<CheckoutRegistry>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Direct access to the ledger store, for callers that move credits
    /// outside the built-in processors.
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    /// Applies one balance movement; see [`LedgerStore::apply_transaction`].
    pub async fn apply_transaction(
        &self,
        user_id: UserId,
        entry: LedgerEntry,
    ) -> ResultEngine<Transaction> {
        let tx = self.ledger.apply_transaction(user_id, entry).await?;
        tracing::debug!(
            user_id = %user_id,
            tx_id = %tx.id,
            kind = tx.kind.as_str(),
            amount = tx.amount,
            "transaction applied"
        );
        Ok(tx)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    catalog: Option<Arc<Catalog>>,
}

impl EngineBuilder {
    /// Reference data to run on. Defaults to [`Catalog::demo`].
    pub fn catalog(mut self, catalog: impl Into<Arc<Catalog>>) -> EngineBuilder {
        self.catalog = Some(catalog.into());
        self
    }

    /// Construct `Engine`, opening one ledger account per roster user.
    pub fn build(self) -> ResultEngine<Engine> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Arc::new(Catalog::demo()?),
        };

        let ledger = LedgerStore::open(catalog.users(), Utc::now());
        let loans = LoanBook::new(catalog.loan_applications());
        let causes = CauseBoard::new(catalog.causes());
        tracing::info!(
            users = catalog.users().len(),
            causes = catalog.causes().len(),
            banks = catalog.banks().len(),
            "engine ready"
        );

        Ok(Engine {
            catalog,
            ledger,
            loans,
            causes,
            checkouts: Arc::new(CheckoutRegistry::default()),
        })
    }
}
