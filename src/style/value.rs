use std::collections::BTreeMap;
use std::fmt;

/// Decimal places kept for numeric style values.
const NUMBER_PRECISION: f64 = 10_000.0;

/// A single style property value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Unitless number (opacity, custom properties).
    Number(f64),
    /// Pre-formatted CSS text (transforms, lengths).
    Text(String),
}

impl StyleValue {
    /// A number quantized to four decimals so sub-visible jitter does not defeat diffing.
    pub fn number(v: f64) -> Self {
        if !v.is_finite() {
            return Self::Number(0.0);
        }
        let q = (v * NUMBER_PRECISION).round() / NUMBER_PRECISION;
        // Normalize -0.0.
        Self::Number(if q == 0.0 { 0.0 } else { q })
    }

    /// A pixel length, e.g. `12.5px`.
    pub fn px(v: f64) -> Self {
        Self::Text(format!("{}px", fmt_num(v)))
    }

    /// Arbitrary CSS text.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&fmt_num(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Format a number with at most three decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_owned(),
        other => other.to_owned(),
    }
}

/// Style properties produced by one behavior for one element, keyed by property name.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StyleUpdate(BTreeMap<String, StyleValue>);

impl StyleUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: StyleValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: StyleValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.0.get(key)
    }

    /// Overlay `later` onto `self`; keys in `later` win.
    pub fn merge_from(&mut self, later: StyleUpdate) {
        self.0.extend(later.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StyleValue)> {
        self.0.iter()
    }
}

impl IntoIterator for StyleUpdate {
    type Item = (String, StyleValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, StyleValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/value.rs"]
mod tests;
