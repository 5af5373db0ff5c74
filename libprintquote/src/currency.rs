//! Display currencies and amount formatting
//!
//! PrintQuote quotes jobs in one of five display currencies. Formatting follows
//! en-US conventions: `,` groups thousands and `.` separates the two minor-unit
//! digits. FCFA is the exception; it is quoted as a whole number with the code
//! written after the amount.
//!
//! # Examples
//!
//! ```
//! use libprintquote::currency::{self, Currency};
//!
//! assert_eq!(currency::format(1234.9, Currency::Usd), "$1,234.90");
//! assert_eq!(currency::format(1234.9, Currency::Fcfa), "1,235 FCFA");
//!
//! // Codes coming from outside the program never fail, they fall back to USD
//! assert_eq!(currency::format_code(1234.9, "ZZZ"), "$1,234.90");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A supported display currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "FCFA")]
    Fcfa,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "CAD")]
    Cad,
}

/// Static display metadata for a currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub code: Currency,
    pub symbol: &'static str,
    pub name: &'static str,
}

// Ordered like `Currency::ALL`; `info_of` indexes by position.
static CURRENCY_INFO: [CurrencyInfo; 5] = [
    CurrencyInfo {
        code: Currency::Usd,
        symbol: "$",
        name: "US Dollar",
    },
    CurrencyInfo {
        code: Currency::Fcfa,
        symbol: "FCFA",
        name: "Central African CFA Franc",
    },
    CurrencyInfo {
        code: Currency::Eur,
        symbol: "€",
        name: "Euro",
    },
    CurrencyInfo {
        code: Currency::Gbp,
        symbol: "£",
        name: "British Pound",
    },
    CurrencyInfo {
        code: Currency::Cad,
        symbol: "C$",
        name: "Canadian Dollar",
    },
];

impl Currency {
    /// Every supported currency, in display order
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Fcfa,
        Currency::Eur,
        Currency::Gbp,
        Currency::Cad,
    ];

    /// The currency code as shown to users and sent over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Fcfa => "FCFA",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        info_of(*self).symbol
    }

    pub fn name(&self) -> &'static str {
        info_of(*self).name
    }

    /// Number of fractional digits shown when formatting
    pub fn minor_digits(&self) -> usize {
        match self {
            Currency::Fcfa => 0,
            _ => 2,
        }
    }

    /// Parse a code from an untrusted source
    ///
    /// Anything that is not exactly one of the supported codes (after
    /// trimming whitespace) resolves to USD.
    pub fn parse_lenient(code: &str) -> Currency {
        code.trim().parse().unwrap_or_default()
    }

    fn index(&self) -> usize {
        match self {
            Currency::Usd => 0,
            Currency::Fcfa => 1,
            Currency::Eur => 2,
            Currency::Gbp => 3,
            Currency::Cad => 4,
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid currency: '{}'. Valid options: USD, FCFA, EUR, GBP, CAD",
                    s
                )
            })
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Look up the display metadata for a currency
pub fn info_of(currency: Currency) -> &'static CurrencyInfo {
    &CURRENCY_INFO[currency.index()]
}

/// Display symbol for a code, `"$"` when the code is not recognized
pub fn symbol_of(code: &str) -> &'static str {
    Currency::parse_lenient(code).symbol()
}

/// Human-readable name for a code, `"US Dollar"` when the code is not recognized
pub fn name_of(code: &str) -> &'static str {
    Currency::parse_lenient(code).name()
}

/// Format an amount for display in the given currency
///
/// FCFA amounts are rounded to a whole number (halves round up) and written
/// as `1,235 FCFA`. All other currencies get exactly two decimals with the
/// symbol in front and the sign before the symbol: `-€5.00`.
///
/// Two-decimal rounding is done by Rust's float formatter on the exact binary
/// value, so a literal like `2.675` (stored as 2.67499...) shows as `2.67`.
pub fn format(amount: f64, currency: Currency) -> String {
    let symbol = currency.symbol();

    match currency {
        Currency::Fcfa => {
            let (negative, digits) = render_number(round_half_up(amount), 0);
            format!("{}{} {}", sign(negative), digits, symbol)
        }
        _ => {
            let (negative, digits) = render_number(amount, currency.minor_digits());
            format!("{}{}{}", sign(negative), symbol, digits)
        }
    }
}

/// Format an amount using a currency code that came from outside the program
///
/// Unknown codes are formatted exactly like USD.
pub fn format_code(amount: f64, code: &str) -> String {
    format(amount, Currency::parse_lenient(code))
}

/// Serde helper that maps unknown currency codes to USD instead of failing
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Currency, D::Error>
where
    D: Deserializer<'de>,
{
    let code = String::deserialize(deserializer)?;
    Ok(Currency::parse_lenient(&code))
}

/// Optional variant of [`deserialize_lenient`]
pub fn deserialize_lenient_opt<'de, D>(deserializer: D) -> Result<Option<Currency>, D::Error>
where
    D: Deserializer<'de>,
{
    let code = Option::<String>::deserialize(deserializer)?;
    Ok(code.map(|c| Currency::parse_lenient(&c)))
}

fn sign(negative: bool) -> &'static str {
    if negative {
        "-"
    } else {
        ""
    }
}

// Halves round toward positive infinity: 2.5 -> 3, -2.5 -> -2.
fn round_half_up(amount: f64) -> f64 {
    let floor = amount.floor();
    if amount - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Render `|amount|` with grouped thousands and a fixed number of decimals
///
/// Returns whether a minus sign should be shown. A value that renders as zero
/// is never negative.
fn render_number(amount: f64, decimals: usize) -> (bool, String) {
    if amount.is_nan() {
        return (false, "NaN".to_string());
    }
    if amount.is_infinite() {
        return (amount < 0.0, "∞".to_string());
    }

    let fixed = format!("{:.*}", decimals, amount.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let negative = amount.is_sign_negative() && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

    let mut out = group_thousands(integer);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    (negative, out)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
