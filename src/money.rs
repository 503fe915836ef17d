use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A user-entered monetary field.
///
/// The raw entry is stored exactly as received (forms send text, API clients
/// send numbers). Reads go through [`Amount::value`], which treats empty or
/// unparseable input as zero so totals can always be computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amount(String);

impl Amount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The parsed value, or `None` when the entry is blank or not a number.
    pub fn parsed(&self) -> Option<Decimal> {
        parse_amount(&self.0)
    }

    pub fn value(&self) -> Decimal {
        self.parsed().unwrap_or(Decimal::ZERO)
    }
}

pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, a numeric string or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
        Ok(Amount::new(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Amount, E> {
        Ok(Amount(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
        Ok(Amount(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
        Ok(Amount(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Amount, E> {
        Ok(Amount(value.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_plain_and_padded_text() {
        assert_eq!(Amount::new("25.50").value(), dec!(25.5));
        assert_eq!(Amount::new("  300 ").value(), dec!(300));
        assert_eq!(Amount::new("1e3").value(), dec!(1000));
    }

    #[test]
    fn malformed_and_blank_entries_count_as_zero() {
        assert_eq!(Amount::new("abc").value(), Decimal::ZERO);
        assert_eq!(Amount::new("").value(), Decimal::ZERO);
        assert_eq!(Amount::default().parsed(), None);
        assert!(Amount::new("   ").is_blank());
    }

    #[test]
    fn accepts_numbers_strings_and_null_from_json() {
        let parsed: Vec<Amount> = serde_json::from_str(r#"[12, 25.5, "40", null, "abc"]"#).unwrap();
        let values: Vec<Decimal> = parsed.iter().map(Amount::value).collect();
        assert_eq!(
            values,
            vec![dec!(12), dec!(25.5), dec!(40), Decimal::ZERO, Decimal::ZERO]
        );
        assert_eq!(parsed[4].raw(), "abc");
    }

    #[test]
    fn serializes_the_raw_entry() {
        let json = serde_json::to_string(&Amount::new("19.90")).unwrap();
        assert_eq!(json, r#""19.90""#);
    }

    #[test]
    fn rejects_non_numeric_json_types() {
        assert!(serde_json::from_str::<Amount>("true").is_err());
        assert!(serde_json::from_str::<Amount>("[1]").is_err());
    }
}
