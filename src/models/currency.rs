//! ISO-4217 style currency codes
//!
//! A code is three ASCII letters stored upper-case. The small table of known
//! currencies only affects display (symbol and number of decimals); any
//! well-formed code can be used for an account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A three-letter currency code such as `USD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

/// Display information for a known currency
struct CurrencyInfo {
    code: &'static str,
    symbol: &'static str,
    decimals: u8,
}

const KNOWN_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", symbol: "$", decimals: 2 },
    CurrencyInfo { code: "EUR", symbol: "€", decimals: 2 },
    CurrencyInfo { code: "GBP", symbol: "£", decimals: 2 },
    CurrencyInfo { code: "INR", symbol: "₹", decimals: 2 },
    CurrencyInfo { code: "JPY", symbol: "¥", decimals: 0 },
    CurrencyInfo { code: "KRW", symbol: "₩", decimals: 0 },
    CurrencyInfo { code: "CNY", symbol: "CN¥", decimals: 2 },
    CurrencyInfo { code: "CHF", symbol: "CHF ", decimals: 2 },
    CurrencyInfo { code: "CAD", symbol: "CA$", decimals: 2 },
    CurrencyInfo { code: "AUD", symbol: "A$", decimals: 2 },
    CurrencyInfo { code: "BRL", symbol: "R$", decimals: 2 },
    CurrencyInfo { code: "RUB", symbol: "₽", decimals: 2 },
    CurrencyInfo { code: "TRY", symbol: "₺", decimals: 2 },
    CurrencyInfo { code: "NGN", symbol: "₦", decimals: 2 },
];

impl CurrencyCode {
    pub const USD: CurrencyCode = CurrencyCode(*b"USD");
    pub const EUR: CurrencyCode = CurrencyCode(*b"EUR");
    pub const JPY: CurrencyCode = CurrencyCode(*b"JPY");

    /// Parse a code, accepting any case (`"eur"` -> `EUR`)
    pub fn parse(s: &str) -> Result<Self, CurrencyParseError> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(CurrencyParseError(trimmed.to_string()));
        }
        let mut code = [0u8; 3];
        for (dst, src) in code.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        // Only ever constructed from ASCII letters
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    fn info(&self) -> Option<&'static CurrencyInfo> {
        KNOWN_CURRENCIES.iter().find(|c| c.code == self.as_str())
    }

    /// Whether the code is in the table of known currencies
    pub fn is_known(&self) -> bool {
        self.info().is_some()
    }

    /// Symbol used when formatting; unknown codes use `"XYZ "`
    pub fn symbol(&self) -> String {
        match self.info() {
            Some(info) => info.symbol.to_string(),
            None => format!("{} ", self.as_str()),
        }
    }

    /// Number of decimals shown when formatting
    pub fn decimals(&self) -> u8 {
        self.info().map(|i| i.decimals).unwrap_or(2)
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::USD
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

/// Error for malformed currency codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyParseError(pub String);

impl fmt::Display for CurrencyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid currency code '{}': expected three letters like USD",
            self.0
        )
    }
}

impl std::error::Error for CurrencyParseError {}
