//! Pricing and classification rules.
//!
//! Everything here is a pure function of its inputs: no locks, no clock, no
//! ledger access. Processors call these with state read under the relevant
//! user lock.

use serde::{Deserialize, Serialize};

use crate::{InterestRate, User};

/// Lowest rate any loan can be priced at (3.0%).
pub const MIN_LOAN_RATE: InterestRate = InterestRate::from_bps(300);

const HIGH_RISK_POINTS: u32 = 5;
const MEDIUM_RISK_POINTS: u32 = 2;
const HIGH_RISK_SURCHARGE_BPS: i64 = 150;
const MEDIUM_RISK_SURCHARGE_BPS: i64 = 50;

const WEALTHY_BALANCE: i64 = 2000;
const LOW_BALANCE: i64 = 500;
const WEALTHY_DISCOUNT_BPS: i64 = 50;
const LOW_BALANCE_SURCHARGE_BPS: i64 = 80;

/// Dynamic loan rate for `user` on a scheme with `base_rate`.
pub fn compute_loan_rate(base_rate: InterestRate, user: &User) -> InterestRate {
    loan_rate(base_rate, user.balance, user.black_points())
}

/// The black point adjustment is applied first and independently of the
/// balance adjustment; both are additive. The sum is clamped to
/// [`MIN_LOAN_RATE`] and rounded to one decimal.
pub fn loan_rate(base_rate: InterestRate, balance: i64, black_points: u32) -> InterestRate {
    let mut bps = i64::from(base_rate.bps());

    if black_points > HIGH_RISK_POINTS {
        bps += HIGH_RISK_SURCHARGE_BPS;
    } else if black_points > MEDIUM_RISK_POINTS {
        bps += MEDIUM_RISK_SURCHARGE_BPS;
    }

    if balance > WEALTHY_BALANCE {
        bps -= WEALTHY_DISCOUNT_BPS;
    } else if balance < LOW_BALANCE {
        bps += LOW_BALANCE_SURCHARGE_BPS;
    }

    let clamped = bps.max(i64::from(MIN_LOAN_RATE.bps()));
    InterestRate::from_bps(u32::try_from(clamped).unwrap_or(u32::MAX)).round_to_tenth()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Good,
    Warning,
    Poor,
}

pub fn classify_attendance(percentage: u8) -> AttendanceStatus {
    match percentage {
        95.. => AttendanceStatus::Good,
        85..=94 => AttendanceStatus::Warning,
        _ => AttendanceStatus::Poor,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Good,
    Warning,
    Critical,
}

pub fn classify_risk(black_points: u32) -> RiskLevel {
    match black_points {
        0..=3 => RiskLevel::Good,
        4..=7 => RiskLevel::Warning,
        _ => RiskLevel::Critical,
    }
}

/// Label shown next to the balance on the banking screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStanding {
    Good,
    Fair,
}

pub fn credit_standing(black_points: u32) -> CreditStanding {
    if black_points <= 3 {
        CreditStanding::Good
    } else {
        CreditStanding::Fair
    }
}

/// Display percentage of a fundraising goal, clamped to 100.
pub fn donation_progress(raised: i64, target: i64) -> f64 {
    if target <= 0 {
        return 100.0;
    }
    (raised as f64 * 100.0 / target as f64).min(100.0)
}

/// Whether donating `amount` reaches the goal. Uses the unclamped gap, so a
/// cause that already passed its target is closed by any amount.
pub fn closes_goal(raised: i64, target: i64, amount: i64) -> bool {
    amount >= target - raised
}

/// Rough monthly installment: principal plus 10%, over 12 months, rounded up.
pub fn estimate_monthly_payment(principal: i64) -> i64 {
    if principal <= 0 {
        return 0;
    }
    let total = principal.saturating_mul(11);
    // ceil(total / 120)
    total / 120 + i64::from(total % 120 != 0)
}

/// Quick donation amounts offered for a balance: 1%, 5% and 10%, floored.
pub fn suggested_donations(balance: i64) -> [i64; 3] {
    let balance = balance.max(0);
    [balance / 100, balance * 5 / 100, balance / 10]
}
