use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::Error;
use super::key::ModelKey;

/// How a probability becomes a 0/1 label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdPolicy {
    /// The table's single historical cutoff, whatever classifier is active.
    #[default]
    None,
    /// Cutoff maximizing Youden's J for the active classifier.
    J,
    /// Cutoff maximizing the F-score for the active classifier.
    F,
}

impl fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdPolicy::None => write!(f, "none"),
            ThresholdPolicy::J => write!(f, "J"),
            ThresholdPolicy::F => write!(f, "F"),
        }
    }
}

impl FromStr for ThresholdPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ThresholdPolicy::None),
            "j" => Ok(ThresholdPolicy::J),
            "f" => Ok(ThresholdPolicy::F),
            _ => Err(Error::UnsupportedPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    #[serde(rename = "J")]
    pub j: f64,
    #[serde(rename = "F")]
    pub f: f64,
}

/// Decision cutoffs keyed by `"{algorithm}_{resampling}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    #[serde(default = "default_cutoff")]
    pub default: f64,
    #[serde(default)]
    pub entries: BTreeMap<String, ThresholdEntry>,
}

fn default_cutoff() -> f64 {
    0.5
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            default: default_cutoff(),
            entries: BTreeMap::new(),
        }
    }
}

impl ThresholdTable {
    /// The cutoff `policy` selects for classifier `key`.
    pub fn cutoff(&self, policy: ThresholdPolicy, key: ModelKey) -> Result<f64, Error> {
        let value = match policy {
            ThresholdPolicy::None => self.default,
            ThresholdPolicy::J | ThresholdPolicy::F => {
                let entry = self
                    .entries
                    .get(&key.to_string())
                    .ok_or_else(|| Error::MissingThreshold {
                        key: key.to_string(),
                        policy: policy.to_string(),
                    })?;
                if policy == ThresholdPolicy::J { entry.j } else { entry.f }
            }
        };
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidThreshold(value));
        }
        Ok(value)
    }
}

/// 1 when `probability` reaches `cutoff`.
pub fn label(probability: f64, cutoff: f64) -> u8 {
    u8::from(probability >= cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::key::{Algorithm, Resampling};

    fn table() -> ThresholdTable {
        serde_json::from_str(
            r#"{"default": 0.42,
                "entries": {"xgb_classic_ADASYN": {"J": 0.31, "F": 0.55}}}"#,
        )
        .unwrap()
    }

    #[test]
    fn none_ignores_the_active_pair() {
        let table = table();
        for key in ModelKey::all() {
            assert_eq!(table.cutoff(ThresholdPolicy::None, key).unwrap(), 0.42);
        }
    }

    #[test]
    fn j_and_f_use_the_active_pair() {
        let table = table();
        let key = ModelKey::default();
        assert_eq!(table.cutoff(ThresholdPolicy::J, key).unwrap(), 0.31);
        assert_eq!(table.cutoff(ThresholdPolicy::F, key).unwrap(), 0.55);

        let other = ModelKey::new(Algorithm::Knn, Resampling::Common);
        assert!(matches!(
            table.cutoff(ThresholdPolicy::J, other),
            Err(Error::MissingThreshold { .. })
        ));
    }

    #[test]
    fn label_is_inclusive_at_cutoff() {
        assert_eq!(label(0.5, 0.5), 1);
        assert_eq!(label(0.499, 0.5), 0);
    }

    #[test]
    fn policy_names() {
        assert_eq!("j".parse::<ThresholdPolicy>().unwrap(), ThresholdPolicy::J);
        assert_eq!("None".parse::<ThresholdPolicy>().unwrap(), ThresholdPolicy::None);
        assert!("youden".parse::<ThresholdPolicy>().is_err());
    }

    #[test]
    fn out_of_range_cutoffs_are_rejected() {
        let table = ThresholdTable {
            default: 1.5,
            ..ThresholdTable::default()
        };
        assert!(table.cutoff(ThresholdPolicy::None, ModelKey::default()).is_err());
        assert_eq!(ThresholdTable::default().default, 0.5);
    }
}
