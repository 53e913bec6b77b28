//! Raw stat readings and their display form.

use std::fmt;

use crate::units::scale_value;

/// Key whose value is rendered as a percentage instead of a byte size.
pub const PERCENT_KEY: &str = "percent";

/// A single numeric reading from the metrics provider.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum StatValue {
    Int(u64),
    Float(f64),
}

impl StatValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            StatValue::Int(v) => v as f64,
            StatValue::Float(v) => v,
        }
    }
}

impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        StatValue::Int(v)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<f32> for StatValue {
    fn from(v: f32) -> Self {
        StatValue::Float(v as f64)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(v) => write!(f, "{}", v),
            StatValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Named readings from one provider snapshot (memory, disk, ...).
///
/// Field order is the order the provider reported them in and is kept
/// through formatting.
///
/// # Example
///
/// ```rust
/// use statpage_core::StatReading;
///
/// let memory = StatReading::builder()
///     .field("total", 8_589_934_592u64)
///     .field("percent", 42.5)
///     .build();
///
/// assert_eq!(memory.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatReading {
    fields: Vec<(String, StatValue)>,
}

impl StatReading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> StatReadingBuilder {
        StatReadingBuilder::new()
    }

    /// Add a field, replacing the value in place if the name already exists.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<StatValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<StatValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StatValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Builder for [`StatReading`].
#[derive(Debug, Default)]
pub struct StatReadingBuilder {
    reading: StatReading,
}

impl StatReadingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.reading.push(name, value);
        self
    }

    pub fn build(self) -> StatReading {
        self.reading
    }
}

/// Display strings keyed by title-cased field name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormattedStat {
    entries: Vec<(String, String)>,
}

impl FormattedStat {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `"Key: value"` lines in field order, as shown on the page.
    pub fn lines(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect()
    }
}

/// Upper-case the first character of each whitespace-separated word and
/// lower-case the rest. Underscores do not start a new word.
///
/// ```rust
/// use statpage_core::title_case;
///
/// assert_eq!(title_case("percent"), "Percent");
/// assert_eq!(title_case("used_memory"), "Used_memory");
/// assert_eq!(title_case("swap in"), "Swap In");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Format one value for display under `key`.
pub fn format_value(key: &str, value: StatValue) -> String {
    if key == PERCENT_KEY {
        format!("{:.1}%", value.as_f64())
    } else {
        scale_value(value).to_string()
    }
}

/// Turn a provider reading into display strings.
///
/// The `percent` field becomes `"12.3%"`; every other field is treated as a
/// byte count and scaled, e.g. `"4.2 GB"`.
///
/// ```rust
/// use statpage_core::{format_stats, StatReading};
///
/// let disk = StatReading::builder()
///     .field("total", 2_147_483_648u64)
///     .field("percent", 12.34)
///     .build();
///
/// let formatted = format_stats(&disk);
/// assert_eq!(formatted.lines(), vec!["Total: 2.0 GB", "Percent: 12.3%"]);
/// ```
pub fn format_stats(stats: &StatReading) -> FormattedStat {
    let entries = stats
        .iter()
        .map(|(key, value)| (title_case(key), format_value(key, value)))
        .collect();
    FormattedStat { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_field() {
        let reading = StatReading::builder().field("percent", 12.34).build();
        let formatted = format_stats(&reading);
        assert_eq!(formatted.get("Percent"), Some("12.3%"));
    }

    #[test]
    fn test_integer_percent_still_gets_one_decimal() {
        let reading = StatReading::builder().field("percent", 50u64).build();
        assert_eq!(format_stats(&reading).get("Percent"), Some("50.0%"));
    }

    #[test]
    fn test_byte_field_is_scaled() {
        let reading = StatReading::builder().field("total", 2_147_483_648u64).build();
        assert_eq!(format_stats(&reading).get("Total"), Some("2.0 GB"));
    }

    #[test]
    fn test_small_byte_field() {
        let reading = StatReading::builder().field("free", 512u64).build();
        assert_eq!(format_stats(&reading).get("Free"), Some("512.0 B"));
    }

    #[test]
    fn test_percent_rule_uses_original_key() {
        // Only the exact lower-case key is a percentage.
        let reading = StatReading::builder().field("Percent", 2048u64).build();
        assert_eq!(format_stats(&reading).get("Percent"), Some("2.0 KB"));
    }

    #[test]
    fn test_order_is_preserved() {
        let reading = StatReading::builder()
            .field("total", 4096u64)
            .field("available", 2048u64)
            .field("percent", 50.0)
            .field("used", 2048u64)
            .field("free", 1024u64)
            .build();

        let formatted = format_stats(&reading);
        assert_eq!(
            formatted.lines(),
            vec![
                "Total: 4.0 KB",
                "Available: 2.0 KB",
                "Percent: 50.0%",
                "Used: 2.0 KB",
                "Free: 1.0 KB",
            ]
        );
    }

    #[test]
    fn test_empty_reading() {
        let formatted = format_stats(&StatReading::new());
        assert!(formatted.is_empty());
        assert!(formatted.lines().is_empty());
    }

    #[test]
    fn test_push_replaces_existing() {
        let mut reading = StatReading::new();
        reading.push("used", 1u64);
        reading.push("free", 2u64);
        reading.push("used", 3u64);
        assert_eq!(reading.len(), 2);
        assert_eq!(reading.get("used"), Some(StatValue::Int(3)));
        assert_eq!(reading.iter().next().map(|(k, _)| k), Some("used"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("total"), "Total");
        assert_eq!(title_case("used_memory"), "Used_memory");
        assert_eq!(title_case("SWAP in  use"), "Swap In  Use");
        assert_eq!(title_case(""), "");
    }
}
