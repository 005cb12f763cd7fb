//! Reference catalogs: banks and their schemes, marketplace stalls,
//! donation causes and the user roster.
//!
//! A [`Catalog`] is loaded once (from JSON) and then shared read-only for the
//! lifetime of the engine. It also carries the *initial* state of mutable
//! things (user balances, raised amounts, existing loan applications); the
//! live state is owned by the ledger, the cause board and the loan book.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    BankId, CauseId, EngineError, InterestRate, ItemId, LoanApplication, ResultEngine, Role,
    SchemeId, StallId, User, UserId,
};

const DEMO_CATALOG: &str = include_str!("../catalog/demo.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanScheme {
    pub id: SchemeId,
    /// Filled from the owning bank when the catalog is loaded.
    #[serde(skip_deserializing)]
    pub bank_id: BankId,
    pub name: String,
    /// Product type, e.g. "Personal Loan" or "Savings".
    pub product: String,
    #[serde(rename = "interest")]
    pub base_rate: InterestRate,
    #[serde(default)]
    pub min_balance: Option<i64>,
    #[serde(default)]
    pub max_amount: Option<i64>,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub id: BankId,
    pub name: String,
    pub schemes: Vec<LoanScheme>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallCategory {
    Entertainment,
    Food,
    Accessories,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StallItem {
    pub id: ItemId,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stall {
    pub id: StallId,
    pub name: String,
    pub category: StallCategory,
    pub items: Vec<StallItem>,
}

/// A donation cause as listed in the catalog. `raised` is the opening total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationCause {
    pub id: CauseId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub target: i64,
    #[serde(default)]
    pub raised: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    banks: Vec<Bank>,
    #[serde(default)]
    stalls: Vec<Stall>,
    #[serde(default)]
    causes: Vec<DonationCause>,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    loan_applications: Vec<LoanApplication>,
}

impl Catalog {
    /// The smart city demo data set bundled with the crate.
    pub fn demo() -> ResultEngine<Self> {
        Self::from_json(DEMO_CATALOG)
    }

    pub fn from_json(json: &str) -> ResultEngine<Self> {
        let mut catalog: Catalog = serde_json::from_str(json)?;
        for bank in &mut catalog.banks {
            for scheme in &mut bank.schemes {
                scheme.bank_id = bank.id;
            }
        }
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ResultEngine<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            EngineError::Catalog(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn stalls(&self) -> &[Stall] {
        &self.stalls
    }

    pub fn causes(&self) -> &[DonationCause] {
        &self.causes
    }

    /// Roster with opening balances.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn loan_applications(&self) -> &[LoanApplication] {
        &self.loan_applications
    }

    pub fn bank(&self, bank_id: BankId) -> ResultEngine<&Bank> {
        self.banks
            .iter()
            .find(|b| b.id == bank_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("bank {bank_id}")))
    }

    /// Scheme `scheme_id` as offered by `bank_id`.
    pub fn scheme(&self, bank_id: BankId, scheme_id: SchemeId) -> ResultEngine<&LoanScheme> {
        self.bank(bank_id)?
            .schemes
            .iter()
            .find(|s| s.id == scheme_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("scheme {scheme_id} of bank {bank_id}")))
    }

    pub fn stall(&self, stall_id: StallId) -> ResultEngine<&Stall> {
        self.stalls
            .iter()
            .find(|s| s.id == stall_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("stall {stall_id}")))
    }

    /// Stalls in `category` (all when `None`) whose name, or the name of one
    /// of their items, contains `query`. Matching ignores case.
    pub fn search_stalls(&self, category: Option<StallCategory>, query: &str) -> Vec<&Stall> {
        let query = query.trim().to_lowercase();
        self.stalls
            .iter()
            .filter(|s| category.is_none_or(|c| s.category == c))
            .filter(|s| {
                query.is_empty()
                    || s.name.to_lowercase().contains(&query)
                    || s.items.iter().any(|i| i.name.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn item(&self, stall_id: StallId, item_id: ItemId) -> ResultEngine<(&Stall, &StallItem)> {
        let stall = self.stall(stall_id)?;
        let item = stall
            .items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("item {item_id} of stall {stall_id}")))?;
        Ok((stall, item))
    }

    pub fn cause(&self, cause_id: CauseId) -> ResultEngine<&DonationCause> {
        self.causes
            .iter()
            .find(|c| c.id == cause_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("cause {cause_id}")))
    }

    pub fn user(&self, user_id: UserId) -> ResultEngine<&User> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| EngineError::UnknownUser(user_id.to_string()))
    }

    fn validate(&self) -> ResultEngine<()> {
        ensure_unique("bank", self.banks.iter().map(|b| b.id))?;
        ensure_unique(
            "scheme",
            self.banks.iter().flat_map(|b| b.schemes.iter().map(|s| s.id)),
        )?;
        for scheme in self.banks.iter().flat_map(|b| &b.schemes) {
            if scheme.max_amount.is_some_and(|max| max <= 0) {
                return Err(invalid(format!("scheme {}: max_amount must be > 0", scheme.id)));
            }
            if scheme.min_balance.is_some_and(|min| min < 0) {
                return Err(invalid(format!("scheme {}: min_balance must be >= 0", scheme.id)));
            }
        }

        ensure_unique("stall", self.stalls.iter().map(|s| s.id))?;
        for stall in &self.stalls {
            ensure_unique("item", stall.items.iter().map(|i| i.id))?;
            if let Some(item) = stall.items.iter().find(|i| i.price <= 0) {
                return Err(invalid(format!("item {}: price must be > 0", item.id)));
            }
        }

        ensure_unique("cause", self.causes.iter().map(|c| c.id))?;
        for cause in &self.causes {
            if cause.target <= 0 || cause.raised < 0 {
                return Err(invalid(format!(
                    "cause {}: target must be > 0 and raised >= 0",
                    cause.id
                )));
            }
        }

        self.validate_roster()?;

        ensure_unique("loan application", self.loan_applications.iter().map(|a| a.id))?;
        for application in &self.loan_applications {
            self.user(application.user_id)?;
            self.scheme(application.bank_id, application.scheme_id)?;
            if application.principal <= 0 {
                return Err(invalid(format!(
                    "loan application {}: principal must be > 0",
                    application.id
                )));
            }
        }

        Ok(())
    }

    fn validate_roster(&self) -> ResultEngine<()> {
        ensure_unique("user", self.users.iter().map(|u| u.id))?;
        let by_id: HashMap<UserId, &User> = self.users.iter().map(|u| (u.id, u)).collect();

        for user in &self.users {
            if user.balance < 0 {
                return Err(invalid(format!("user {}: balance must be >= 0", user.id)));
            }
            match &user.role {
                Role::Employer { employees } => {
                    for employee_id in employees {
                        let managed_here = by_id
                            .get(employee_id)
                            .and_then(|e| e.employee())
                            .is_some_and(|e| e.manager_id == user.id);
                        if !managed_here {
                            return Err(invalid(format!(
                                "employer {}: user {employee_id} is not one of its employees",
                                user.id
                            )));
                        }
                    }
                }
                Role::Employee(record) => {
                    if record.attendance > 100 {
                        return Err(invalid(format!(
                            "user {}: attendance must be within 0..=100",
                            user.id
                        )));
                    }
                    let listed = by_id
                        .get(&record.manager_id)
                        .is_some_and(|m| m.roster().contains(&user.id));
                    if !listed {
                        return Err(invalid(format!(
                            "user {}: manager {} does not list this employee",
                            user.id, record.manager_id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::Catalog(message)
}

fn ensure_unique<T>(label: &str, ids: impl Iterator<Item = T>) -> ResultEngine<()>
where
    T: std::hash::Hash + Eq + std::fmt::Display,
{
    let mut seen = HashSet::new();
    for id in ids {
        let message = format!("duplicate {label} id {id}");
        if !seen.insert(id) {
            return Err(invalid(message));
        }
    }
    Ok(())
}
