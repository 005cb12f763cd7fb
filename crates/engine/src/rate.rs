use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Annual interest rate represented as **integer basis points** (1/100 of a
/// percent).
///
/// Use this type for every rate in the engine (scheme base rates, frozen
/// application rates) so the policy adjustments stay exact.
///
/// # Examples
///
/// ```rust
/// use engine::InterestRate;
///
/// let rate = InterestRate::from_bps(890);
/// assert_eq!(rate.bps(), 890);
/// assert_eq!(rate.to_string(), "8.9%");
/// ```
///
/// Parsing catalog values (accepts `.` or `,`, an optional trailing `%`,
/// rejects more than 2 decimals):
///
/// ```rust
/// use engine::InterestRate;
///
/// assert_eq!("8.9%".parse::<InterestRate>().unwrap().bps(), 890);
/// assert_eq!("4,25".parse::<InterestRate>().unwrap().bps(), 425);
/// assert!("1.234%".parse::<InterestRate>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct InterestRate(u32);

impl InterestRate {
    /// Creates a rate from basis points.
    #[must_use]
    pub const fn from_bps(bps: u32) -> Self {
        Self(bps)
    }

    /// Returns the raw value in basis points.
    #[must_use]
    pub const fn bps(self) -> u32 {
        self.0
    }

    /// Rate as a floating point percentage, for presentation only.
    #[must_use]
    pub fn as_percent(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Rounds half away from zero to one decimal of a percent (10 bps).
    #[must_use]
    pub const fn round_to_tenth(self) -> Self {
        Self((self.0.saturating_add(5) / 10) * 10)
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{whole}.0%")
        } else if frac % 10 == 0 {
            write!(f, "{whole}.{}%", frac / 10)
        } else {
            write!(f, "{whole}.{frac:02}%")
        }
    }
}

impl From<InterestRate> for String {
    fn from(value: InterestRate) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for InterestRate {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for InterestRate {
    type Err = EngineError;

    /// Parses a decimal percentage into basis points.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - no sign (rates are never negative)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("invalid interest rate: {s:?}"));

        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let normalized = trimmed.replace(',', ".");
        let mut parts = normalized.split('.');
        let whole_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u32 = whole_str.parse().map_err(|_| invalid())?;

        let frac: u32 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<u32>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<u32>().map_err(|_| invalid())?,
                    _ => {
                        return Err(EngineError::InvalidAmount(
                            "interest rate has too many decimals".to_string(),
                        ));
                    }
                }
            }
        };

        whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }
}
