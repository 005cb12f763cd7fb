use serde::{Deserialize, Serialize};

pub mod session {
    use super::*;

    /// Sign-in request. Stands in for the face scan of the kiosk.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionNew {
        pub user_id: u32,
    }

    /// The session id is the user id; send it back in the `x-user-id`
    /// header.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Session {
        pub session_id: u32,
        pub name: String,
        pub employer: bool,
        pub greeting: String,
    }
}

pub mod purchase {
    use super::*;

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct PurchaseItem {
        pub stall_id: u32,
        pub item_id: u32,
        /// Defaults to 1.
        #[serde(default = "one")]
        pub quantity: u32,
    }

    fn one() -> u32 {
        1
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseNew {
        pub items: Vec<PurchaseItem>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseReceipt {
        pub total: i64,
        pub balance: i64,
        /// Ids of the committed `purchase` transactions, one per cart line.
        pub transaction_ids: Vec<u64>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum StallKind {
        Entertainment,
        Food,
        Accessories,
    }

    /// Stall filter: `?category=food&q=coffee`. Both are optional.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StallQuery {
        pub category: Option<StallKind>,
        /// Case-insensitive match on stall or item names.
        pub q: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteQuery {
        pub amount: i64,
    }
}

pub mod loan {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoanNew {
        pub bank_id: u32,
        pub scheme_id: u32,
        pub amount: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ReviewDecision {
        Approve,
        Reject,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoanReview {
        pub decision: ReviewDecision,
    }
}

pub mod team {
    use super::*;

    /// Body of reward and salary requests.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditsNew {
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PenaltyNew {
        pub amount: i64,
        #[serde(default)]
        pub points: u32,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BlackPointsNew {
        pub points: u32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Attendance {
        Present,
        Absent,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttendanceNew {
        pub status: Attendance,
    }
}

pub mod donation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationNew {
        pub cause_id: u32,
        pub amount: i64,
    }
}

pub mod me {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Balance {
        pub user_id: u32,
        pub balance: i64,
        /// 1%, 5% and 10% of the balance.
        pub suggested_donations: [i64; 3],
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryQuery {
        pub limit: Option<usize>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_quantity_defaults_to_one() {
        let body: purchase::PurchaseNew =
            serde_json::from_str(r#"{"items":[{"stall_id":3,"item_id":7}]}"#).unwrap();
        assert_eq!(body.items[0].quantity, 1);
    }

    #[test]
    fn decisions_are_snake_case() {
        let review: loan::LoanReview = serde_json::from_str(r#"{"decision":"approve"}"#).unwrap();
        assert_eq!(review.decision, loan::ReviewDecision::Approve);
        assert!(serde_json::from_str::<loan::LoanReview>(r#"{"decision":"maybe"}"#).is_err());
    }
}
