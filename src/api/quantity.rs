//! Resource quantities such as `500m`, `64Mi`, `4G` or `1e3`.
//!
//! A quantity keeps the text it was written with (that is what error messages
//! and serialized records show) and compares by numeric value, so `32Gi` and
//! `32768Mi` are equal in bounds checks.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";
pub const EPHEMERAL_STORAGE: &str = "ephemeral-storage";

/// Resources that get request floors and bounds checks.
pub const COMPUTE_RESOURCES: [&str; 3] = [CPU, MEMORY, EPHEMERAL_STORAGE];

const QUANTITY_RE: &str =
    r"^([+-]?)([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(Ki|Mi|Gi|Ti|Pi|Ei|[eE][+-]?[0-9]+|n|u|m|k|M|G|T|P|E)?$";

static QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(QUANTITY_RE).expect("quantity regex is valid"));

// Nano-units keep every decimal suffix down to `n` integral.
const NANO_EXP: i32 = 9;
const MAX_MANTISSA_DIGITS: usize = 30;
// Any exponent past this bound already overflows or rounds to one nano-unit.
const MAX_DECIMAL_EXP: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity {0:?} must match the regular expression '{re}'", re = QUANTITY_RE)]
    Format(String),

    #[error("quantity {0:?} is too large")]
    Overflow(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    text: String,
    nanos: i128,
}

impl Quantity {
    pub fn zero() -> Self {
        Self {
            text: "0".to_string(),
            nanos: 0,
        }
    }

    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        let text = text.trim();
        let caps = QUANTITY
            .captures(text)
            .ok_or_else(|| QuantityError::Format(text.to_string()))?;

        let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
        let number = caps.get(2).map_or("", |m| m.as_str());
        let suffix = caps.get(3).map_or("", |m| m.as_str());

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        let digits = format!("{int_part}{frac_part}");
        let digits = digits.trim_start_matches('0');
        if digits.len() > MAX_MANTISSA_DIGITS {
            return Err(QuantityError::Overflow(text.to_string()));
        }
        let mantissa: i128 = if digits.is_empty() {
            0
        } else {
            digits
                .parse()
                .map_err(|_| QuantityError::Format(text.to_string()))?
        };

        let (binary_shift, decimal_exp) = suffix_scale(suffix)
            .ok_or_else(|| QuantityError::Format(text.to_string()))?;

        let overflow = || QuantityError::Overflow(text.to_string());
        if mantissa == 0 {
            return Ok(Self {
                text: text.to_string(),
                nanos: 0,
            });
        }
        if decimal_exp > MAX_DECIMAL_EXP {
            return Err(overflow());
        }
        let decimal_exp = decimal_exp.max(-MAX_DECIMAL_EXP);

        let scaled = mantissa
            .checked_mul(1i128.checked_shl(binary_shift).ok_or_else(overflow)?)
            .ok_or_else(overflow)?;

        let pow = i64::from(NANO_EXP) + decimal_exp - frac_part.len() as i64;
        let magnitude = if pow >= 0 {
            let factor = u32::try_from(pow)
                .ok()
                .and_then(|p| 10i128.checked_pow(p))
                .ok_or_else(overflow)?;
            scaled.checked_mul(factor).ok_or_else(overflow)?
        } else {
            // Sub-nano precision rounds up, so a positive value never becomes zero.
            match u32::try_from(pow.unsigned_abs()).ok().and_then(|p| 10i128.checked_pow(p)) {
                Some(divisor) => scaled / divisor + i128::from(scaled % divisor != 0),
                None => 1,
            }
        };

        Ok(Self {
            text: text.to_string(),
            nanos: if negative { -magnitude } else { magnitude },
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_positive(&self) -> bool {
        self.nanos > 0
    }

    pub fn numeric_cmp(&self, other: &Quantity) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }

    pub fn numeric_eq(&self, other: &Quantity) -> bool {
        self.numeric_cmp(other) == Ordering::Equal
    }
}

/// Returns (power-of-two shift, power-of-ten exponent) for a suffix.
fn suffix_scale(suffix: &str) -> Option<(u32, i64)> {
    let scale = match suffix {
        "" => (0, 0),
        "n" => (0, -9),
        "u" => (0, -6),
        "m" => (0, -3),
        "k" => (0, 3),
        "M" => (0, 6),
        "G" => (0, 9),
        "T" => (0, 12),
        "P" => (0, 15),
        "E" => (0, 18),
        "Ki" => (10, 0),
        "Mi" => (20, 0),
        "Gi" => (30, 0),
        "Ti" => (40, 0),
        "Pi" => (50, 0),
        "Ei" => (60, 0),
        exp => (0, exp[1..].parse().ok()?),
    };
    Some(scale)
}

impl Default for Quantity {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Int(i) => i.to_string(),
            Raw::Float(f) => f.to_string(),
        };
        Quantity::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Resource name to quantity, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceList(BTreeMap<String, Quantity>);

impl ResourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, quantity: Quantity) -> Option<Quantity> {
        self.0.insert(name.into(), quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The CPU quantity, or zero when unset.
    pub fn cpu(&self) -> Quantity {
        self.get(CPU).cloned().unwrap_or_default()
    }

    /// The memory quantity, or zero when unset.
    pub fn memory(&self) -> Quantity {
        self.get(MEMORY).cloned().unwrap_or_default()
    }
}

impl FromIterator<(String, Quantity)> for ResourceList {
    fn from_iter<I: IntoIterator<Item = (String, Quantity)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ResourceList {
    type Item = (&'a String, &'a Quantity);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Quantity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ResourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn q(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    #[test]
    fn keeps_original_text() {
        assert_eq!(q("64Mi").to_string(), "64Mi");
        assert_eq!(q(" 500m ").as_str(), "500m");
    }

    #[test]
    fn compares_across_suffixes() {
        assert!(q("32768Mi").numeric_eq(&q("32Gi")));
        assert!(q("131072Ki").numeric_eq(&q("128Mi")));
        assert!(q("1").numeric_eq(&q("1000m")));
        assert!(q("1k").numeric_eq(&q("1e3")));
        assert!(q("0.5").numeric_eq(&q("500m")));
        assert_eq!(q("4097Mi").numeric_cmp(&q("4Gi")), Ordering::Greater);
        assert_eq!(q("9m").numeric_cmp(&q("10m")), Ordering::Less);
        assert_eq!(q("102399Ki").numeric_cmp(&q("100Mi")), Ordering::Less);
        assert_eq!(q("4G").numeric_cmp(&q("4Gi")), Ordering::Less);
    }

    #[test]
    fn sign_and_zero() {
        assert!(!q("0").is_positive());
        assert!(!q("-10").is_positive());
        assert!(!q("-64Mi").is_positive());
        assert!(q("1n").is_positive());
        assert!(Quantity::zero().numeric_eq(&q("0Gi")));
    }

    #[test]
    fn sub_nano_values_round_up() {
        assert!(q("1e-12").is_positive());
        assert!(q("0.0000000001").numeric_eq(&q("1n")));
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["", "abc", "1.2.3", "10 Mi", "Mi", "1KiB", "--1"] {
            assert!(
                matches!(Quantity::parse(bad), Err(QuantityError::Format(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn rejects_overflowing_values() {
        assert!(matches!(
            Quantity::parse("999999999999999999999999999999Ei"),
            Err(QuantityError::Overflow(_))
        ));
    }

    #[test]
    fn extreme_exponents_do_not_wrap() {
        assert!(matches!(
            Quantity::parse("1e9223372036854775807"),
            Err(QuantityError::Overflow(_))
        ));
        assert!(matches!(Quantity::parse("1e1001"), Err(QuantityError::Overflow(_))));
        assert!(q("0e9223372036854775807").numeric_eq(&Quantity::zero()));

        let tiny = q("1.0000000000e-9223372036854775808");
        assert!(tiny.is_positive());
        assert!(tiny.numeric_eq(&q("1n")));
        assert!(q("-5e-2000").numeric_eq(&q("-1n")));
    }

    #[test]
    fn deserializes_strings_and_numbers() {
        let list: ResourceList =
            serde_json::from_str(r#"{"cpu": 2, "memory": "64Mi", "ephemeral-storage": 0.5}"#).unwrap();
        assert!(list.cpu().numeric_eq(&q("2")));
        assert_eq!(list.memory().as_str(), "64Mi");
        assert!(list.get(EPHEMERAL_STORAGE).unwrap().numeric_eq(&q("500m")));
        assert_eq!(
            serde_json::to_string(&list).unwrap(),
            r#"{"cpu":"2","ephemeral-storage":"0.5","memory":"64Mi"}"#
        );
    }

    #[test]
    fn absent_cpu_and_memory_read_as_zero() {
        let list = ResourceList::new();
        assert!(list.cpu().numeric_eq(&Quantity::zero()));
        assert!(list.memory().numeric_eq(&Quantity::zero()));
    }
}
