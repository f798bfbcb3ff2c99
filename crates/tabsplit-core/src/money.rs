//! Exact integer-cents money type
//!
//! Amounts are stored as a signed number of cents. There is no floating-point
//! representation anywhere in the type, so equality is exact.
//!
//! Division by a count truncates toward zero and drops the remainder. Callers
//! that split an amount (quantity expansion, shared items) inherit that
//! truncation on purpose, see DESIGN.md.
//!
//! Addition, subtraction, negation and multiplication saturate at the `i64`
//! bounds instead of overflowing.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest whole-dollar part `Money::parse` accepts
pub const MAX_WHOLE_DIGITS: usize = 12;

/// A monetary amount in integer cents
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };

    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub const fn cents(&self) -> i64 {
        self.cents
    }

    pub const fn is_zero(&self) -> bool {
        self.cents == 0
    }

    pub const fn abs(&self) -> Self {
        Self {
            cents: self.cents.abs(),
        }
    }

    /// Parse a free-form amount such as `"$1,234.5"` or `"-3.99"`
    ///
    /// Whitespace, thousands separators and one leading currency symbol are
    /// removed. One fractional digit means tenths; more than two fractional
    /// digits are truncated, not rounded. Returns `None` when no digits are
    /// left, anything other than digits and a single decimal point remains, or
    /// the whole-dollar part is longer than `MAX_WHOLE_DIGITS`.
    pub fn parse(text: &str) -> Option<Money> {
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .collect();

        let mut rest = cleaned.as_str();
        let mut negative = false;
        if let Some(r) = rest.strip_prefix('-') {
            negative = true;
            rest = r;
        }
        if let Some(r) = rest.strip_prefix(['$', '€', '£']) {
            rest = r;
        }
        if !negative {
            if let Some(r) = rest.strip_prefix('-') {
                negative = true;
                rest = r;
            }
        }

        let (whole, frac) = match rest.split_once('.') {
            Some((w, f)) => (w, f),
            None => (rest, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        if whole.trim_start_matches('0').len() > MAX_WHOLE_DIGITS {
            return None;
        }

        let mut dollars: i64 = 0;
        for d in whole.bytes() {
            dollars = dollars
                .checked_mul(10)?
                .checked_add(i64::from(d - b'0'))?;
        }

        let frac_digits = frac.as_bytes();
        let fraction = match frac_digits.len() {
            0 => 0,
            1 => i64::from(frac_digits[0] - b'0') * 10,
            _ => i64::from(frac_digits[0] - b'0') * 10 + i64::from(frac_digits[1] - b'0'),
        };

        let cents = dollars.checked_mul(100)?.checked_add(fraction)?;
        Some(Money::from_cents(if negative { -cents } else { cents }))
    }

    /// Fixed two-decimal rendering, e.g. `"12.30"` or `"-0.05"`
    pub fn format(&self) -> String {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Money::parse(s).ok_or_else(|| format!("Invalid amount: {}", s))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::from_cents(self.cents.saturating_add(rhs.cents))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::from_cents(self.cents.saturating_sub(rhs.cents))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money::from_cents(self.cents.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, count: i64) -> Money {
        Money::from_cents(self.cents.saturating_mul(count))
    }
}

/// Truncating division; a divisor below 1 is treated as 1
impl Div<i64> for Money {
    type Output = Money;

    fn div(self, count: i64) -> Money {
        Money::from_cents(self.cents / count.max(1))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

fn trailing_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:^|[^\w.,$-])(-?\$?-?\d{1,3}(?:,\d{3})+(?:\.\d+)?|-?\$?-?\d+(?:\.\d+)?)\s*$",
        )
        .expect("invalid trailing money regex")
    })
}

fn embedded_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"-?\$?\d{1,3}(?:,\d{3})+\.\d{2,}\b|-?\$?\d+\.\d{2,}\b")
            .expect("invalid embedded money regex")
    })
}

/// A money token found at the end of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingMoney {
    pub amount: Money,
    /// Byte offset where the token starts; `&line[..start]` is the label
    pub start: usize,
}

/// Find the money token that ends `line`, if it parses
pub fn trailing_money(line: &str) -> Option<TrailingMoney> {
    let caps = trailing_token_re().captures(line)?;
    let token = caps.get(1)?;
    Money::parse(token.as_str()).map(|amount| TrailingMoney {
        amount,
        start: token.start(),
    })
}

/// First money token with at least two decimals anywhere in `line`
pub fn embedded_money(line: &str) -> Option<Money> {
    embedded_token_re()
        .find_iter(line)
        .find_map(|m| Money::parse(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(Money::parse("$12.3"), Some(Money::from_cents(1230)));
        assert_eq!(Money::parse("12"), Some(Money::from_cents(1200)));
        assert_eq!(Money::parse("abc"), None);
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("$"), None);
        assert_eq!(Money::parse("."), None);
    }

    #[test]
    fn test_parse_separators_and_symbols() {
        assert_eq!(Money::parse("$1,234.56"), Some(Money::from_cents(123456)));
        assert_eq!(Money::parse(" 4 . 50 "), Some(Money::from_cents(450)));
        assert_eq!(Money::parse("-$2.00"), Some(Money::from_cents(-200)));
        assert_eq!(Money::parse("$-2.00"), Some(Money::from_cents(-200)));
        assert_eq!(Money::parse(".75"), Some(Money::from_cents(75)));
        assert_eq!(Money::parse("3."), Some(Money::from_cents(300)));
    }

    #[test]
    fn test_parse_truncates_extra_fraction_digits() {
        assert_eq!(Money::parse("1.999"), Some(Money::from_cents(199)));
        assert_eq!(Money::parse("0.005"), Some(Money::from_cents(0)));
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert_eq!(Money::parse("12.3a"), None);
        assert_eq!(Money::parse("1.2.3"), None);
        assert_eq!(Money::parse("99999999999999999999"), None);
    }

    #[test]
    fn test_parse_caps_whole_digits() {
        assert_eq!(
            Money::parse("999999999999.99"),
            Some(Money::from_cents(99_999_999_999_999))
        );
        assert_eq!(Money::parse("1000000000000"), None);
        assert_eq!(Money::parse("90000000000000000"), None);
        assert_eq!(Money::parse("000000000000012.00"), Some(Money::from_cents(1200)));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);
        let min = Money::from_cents(i64::MIN);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(min - Money::from_cents(1), min);
        assert_eq!(-min, max);
        assert_eq!(max * 2, max);

        let mut m = max;
        m += max;
        assert_eq!(m, max);

        let total: Money = [max, max, max].iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_format() {
        assert_eq!(Money::from_cents(0).format(), "0.00");
        assert_eq!(Money::from_cents(5).format(), "0.05");
        assert_eq!(Money::from_cents(1230).format(), "12.30");
        assert_eq!(Money::from_cents(-5).format(), "-0.05");
        assert_eq!(Money::from_cents(-123456).format(), "-1234.56");
        assert_eq!(Money::from_cents(123456).to_string(), "1234.56");
    }

    #[test]
    fn test_format_parse_round_trip() {
        for cents in [0, 1, 9, 10, 99, 100, 101, 1599, -1, -99, -100, -12345, 987654321] {
            let m = Money::from_cents(cents);
            assert_eq!(Money::parse(&m.format()), Some(m), "cents = {}", cents);
        }
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!(a + b, Money::from_cents(1250));
        assert_eq!(a - b, Money::from_cents(750));
        assert_eq!(b * 3, Money::from_cents(750));
        assert_eq!(-b, Money::from_cents(-250));

        let mut c = a;
        c += b;
        c -= Money::from_cents(50);
        assert_eq!(c, Money::from_cents(1200));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(Money::from_cents(1000) / 3, Money::from_cents(333));
        assert_eq!(Money::from_cents(-1000) / 3, Money::from_cents(-333));
        assert_eq!(Money::from_cents(8000) / 5, Money::from_cents(1600));
    }

    #[test]
    fn test_division_by_zero_uses_one() {
        assert_eq!(Money::from_cents(1000) / 0, Money::from_cents(1000));
        assert_eq!(Money::from_cents(1000) / -4, Money::from_cents(1000));
    }

    #[test]
    fn test_sum() {
        let items = [Money::from_cents(100), Money::from_cents(250)];
        let total: Money = items.iter().sum();
        assert_eq!(total, Money::from_cents(350));
        let empty: Vec<Money> = Vec::new();
        assert_eq!(empty.into_iter().sum::<Money>(), Money::ZERO);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("7.25".parse::<Money>().unwrap(), Money::from_cents(725));
        assert!("seven".parse::<Money>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Money::from_cents(1234)).unwrap();
        assert_eq!(json, "1234");
        let parsed: Money = serde_json::from_str("-50").unwrap();
        assert_eq!(parsed, Money::from_cents(-50));
    }

    #[test]
    fn test_trailing_money() {
        let found = trailing_money("5 Coquito 80.00").unwrap();
        assert_eq!(found.amount, Money::from_cents(8000));
        assert_eq!(&"5 Coquito 80.00"[..found.start], "5 Coquito ");

        let found = trailing_money("Burger $1,204.50").unwrap();
        assert_eq!(found.amount, Money::from_cents(120450));

        let found = trailing_money("Coupon -$2.00").unwrap();
        assert_eq!(found.amount, Money::from_cents(-200));

        assert_eq!(trailing_money("Table 12").unwrap().amount, Money::from_cents(1200));
        assert!(trailing_money("Thank you").is_none());
        assert!(trailing_money("Item12.00").is_none());
        assert!(trailing_money("Total 45.00 USD").is_none());

        // Extra decimals are left to Money::parse, which truncates them
        let found = trailing_money("Burger 12.345").unwrap();
        assert_eq!(found.amount, Money::from_cents(1234));
        assert_eq!(&"Burger 12.345"[..found.start], "Burger ");
        assert!(trailing_money("Gift card 90000000000000000").is_none());
    }

    #[test]
    fn test_embedded_money() {
        assert_eq!(
            embedded_money("Total 45.00 USD"),
            Some(Money::from_cents(4500))
        );
        assert_eq!(
            embedded_money("Tax 20% on 20.00 = 4.00"),
            Some(Money::from_cents(2000))
        );
        assert_eq!(
            embedded_money("Total 12.345 USD"),
            Some(Money::from_cents(1234))
        );
        assert_eq!(embedded_money("Tip 5"), None);
    }
}
