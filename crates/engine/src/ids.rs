//! Strongly typed identifiers.
//!
//! Catalog ids are small integers (they come from the reference data),
//! runtime ids (transactions, loan applications) are monotonic `u64`s.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            #[must_use]
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Roster user (employer or employee).
    UserId(u32)
);
define_id!(BankId(u32));
define_id!(SchemeId(u32));
define_id!(StallId(u32));
define_id!(ItemId(u32));
define_id!(CauseId(u32));
define_id!(
    /// Loan application id, allocated by the loan book.
    LoanId(u64)
);
define_id!(
    /// Ledger transaction id. Unique across all users and strictly
    /// increasing in commit order.
    TransactionId(u64)
);
