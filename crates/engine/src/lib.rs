//! Credit ledger and policy engine for the smart city portal.
//!
//! The [`Engine`] owns a single [`LedgerStore`] (the only writer of user
//! balances), the loan book and the live donation totals, and prices every
//! operation with the pure rules in [`policy`]. Reference data comes from an
//! immutable [`Catalog`].
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), engine::EngineError> {
//! use engine::{CauseId, Engine, UserId};
//!
//! let engine = Engine::builder().build()?;
//! let receipt = engine.donate(UserId(2), CauseId(1), 100).await?;
//! assert_eq!(receipt.transaction.amount, -100);
//! # Ok(())
//! # }
//! ```

pub use cart::{Cart, CartLine, CheckoutSession};
pub use catalog::{Bank, Catalog, DonationCause, LoanScheme, Stall, StallCategory, StallItem};
pub use causes::{CauseBoard, CauseProgress, DonationSummary};
pub use commands::{LoanRequest, PenaltyCmd, PurchaseLine};
pub use error::EngineError;
pub use ids::{BankId, CauseId, ItemId, LoanId, SchemeId, StallId, TransactionId, UserId};
pub use ledger::LedgerStore;
pub use loans::{LoanApplication, LoanBook, LoanDecision, LoanStatus};
pub use ops::{
    DonationReceipt, Engine, EngineBuilder, EmployerScope, LoanQuote, SignIn, TeamMember,
    TeamOverview,
};
pub use rate::InterestRate;
pub use session::{Greeter, IdentityResolver, RosterScan, TracingGreeter, greeting_for};
pub use transactions::{LedgerEntry, Transaction, TransactionKind, TransactionRefs};
pub use users::{AttendanceMark, EmployeeRecord, Role, User};

pub mod policy;

mod cart;
mod catalog;
mod causes;
mod commands;
mod error;
mod ids;
mod ledger;
mod loans;
mod ops;
mod rate;
mod session;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
