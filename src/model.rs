use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Tolerance used when checking that a value-less table is normalized.
pub const PROB_SUM_TOLERANCE: f64 = 1e-9;

/// Probability table in the v1.0 layout: parallel `values` and `probs`.
///
/// `values` is `None` for positional tables (e.g. shift weights), where the
/// index of a probability implies its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTable {
    pub values: Option<Vec<Value>>,
    pub probs: Vec<Value>,
}

impl DistributionTable {
    pub fn new(values: Option<Vec<Value>>, probs: Vec<Value>) -> Self {
        Self { values, probs }
    }

    /// Positional table from already normalized probabilities.
    pub fn positional(probs: Vec<f64>) -> Self {
        Self {
            values: None,
            probs: probs.into_iter().map(Value::from).collect(),
        }
    }

    /// Sum of all numeric probabilities.
    pub fn prob_sum(&self) -> f64 {
        self.probs.iter().filter_map(Value::as_f64).sum()
    }

    /// Pairs the table back up into `[value, prob]` entries.
    ///
    /// Returns `None` for positional tables.
    pub fn pairs(&self) -> Option<Vec<Value>> {
        let values = self.values.as_ref()?;
        Some(
            values
                .iter()
                .zip(&self.probs)
                .map(|(value, prob)| Value::Array(vec![value.clone(), prob.clone()]))
                .collect(),
        )
    }

    /// Whether the table satisfies the v1.0 layout rules: `values` and
    /// `probs` have equal length, and a non-empty positional table sums to 1.
    pub fn is_consistent(&self) -> bool {
        match &self.values {
            Some(values) => values.len() == self.probs.len(),
            None if self.probs.is_empty() => true,
            None => (self.prob_sum() - 1.0).abs() <= PROB_SUM_TOLERANCE,
        }
    }
}

/// A migrated config as an explicit ordered list of top-level entries.
///
/// Key order is part of the v1.0 contract, so it is kept here rather than
/// relying on map iteration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MigratedConfig {
    entries: Vec<(String, Value)>,
}

impl MigratedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == key)
    }

    /// Decode a v1.0 probability table stored under `key`.
    pub fn table(&self, key: &str) -> Option<DistributionTable> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Replace the value of `key` in place, or append it when absent.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Splice a new entry in at `position`, shifting later entries back.
    /// Positions past the end append. The key must not already be present.
    pub fn insert_at(&mut self, position: usize, key: impl Into<String>, value: Value) {
        let key = key.into();
        debug_assert!(self.position(&key).is_none(), "duplicate key {key}");
        let position = position.min(self.entries.len());
        self.entries.insert(position, (key, value));
    }

    /// Convert into a JSON object with the same key order.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

impl FromIterator<(String, Value)> for MigratedConfig {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            config.set(key, value);
        }
        config
    }
}

impl Serialize for MigratedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
