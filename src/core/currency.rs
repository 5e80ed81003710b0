use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ISO 4217-style currency code.
///
/// The code decides which partner calendar an instruction settles
/// against (see [`CalendarPolicy::for_currency`]).
///
/// [`CalendarPolicy::for_currency`]: crate::calendar::policy::CalendarPolicy::for_currency
///
/// # Examples
///
/// ```
/// use settlement_report::core::currency::CurrencyCode;
///
/// let aed: CurrencyCode = "aed".parse().unwrap();
/// assert_eq!(aed.as_str(), "AED");
/// assert!("AE".parse::<CurrencyCode>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Wrap a code without validation. Use [`str::parse`] for untrusted input.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from currency code parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("invalid currency code '{0}': expected three ASCII letters")]
    InvalidCode(String),
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCode(s.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}
