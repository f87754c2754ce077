// src/need.rs
// Needs and the need -> indicator weight mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Named motivational state of a consumer. Compared by name only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Need(String);

impl Need {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Need -> weight in [0, 1].
///
/// Deterministic schemes read the weight as a priority, stochastic ones as
/// the probability of emitting a need event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeedIndicatorMap {
    values: BTreeMap<Need, f64>,
}

impl NeedIndicatorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map, rejecting weights that are not finite or fall outside [0, 1].
    pub fn from_pairs<I, S>(pairs: I) -> SimResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.insert(Need::new(name), value)?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, need: Need, value: f64) -> SimResult<()> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(SimError::InvalidIndicator {
                need: need.name().to_string(),
                value,
            });
        }
        self.values.insert(need, value);
        Ok(())
    }

    pub fn get(&self, need: &Need) -> Option<f64> {
        self.values.get(need).copied()
    }

    /// Indicator value, treating needs absent from the map as 0.
    pub fn value_or_zero(&self, need: &Need) -> f64 {
        self.get(need).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Need, f64)> {
        self.values.iter().map(|(n, v)| (n, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_indicator() {
        let err = NeedIndicatorMap::from_pairs([("warmth", 1.5)]).unwrap_err();
        assert!(matches!(err, SimError::InvalidIndicator { .. }));

        let err = NeedIndicatorMap::from_pairs([("warmth", f64::NAN)]).unwrap_err();
        assert!(matches!(err, SimError::InvalidIndicator { .. }));
    }

    #[test]
    fn missing_need_reads_as_zero() {
        let map = NeedIndicatorMap::from_pairs([("warmth", 0.4)]).unwrap();
        assert_eq!(map.value_or_zero(&Need::new("warmth")), 0.4);
        assert_eq!(map.value_or_zero(&Need::new("mobility")), 0.0);
        assert_eq!(map.get(&Need::new("mobility")), None);
    }
}
