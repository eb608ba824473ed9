use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::Error;
use super::table::FeatureTable;

/// Pre-fitted per-column standardization, `(x - mean) / scale`.
///
/// Fitted offline on the training set and only ever applied here. A zero
/// scale is treated as one, matching scikit-learn's handling of constant
/// columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn from_json(text: &str, origin: &Path) -> Result<Self, Error> {
        let scaler: StandardScaler =
            serde_json::from_str(text).map_err(|source| Error::ScalerParse {
                path: origin.to_path_buf(),
                source,
            })?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ScalerRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    fn validate(&self) -> Result<(), Error> {
        let n = self.feature_names.len();
        if self.mean.len() != n || self.scale.len() != n {
            return Err(Error::ScalerShape(format!(
                "{} names, {} means, {} scales",
                n,
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(())
    }

    /// Standardizes every column of `table` in place.
    ///
    /// Fails without touching the table if any column is unknown.
    pub fn transform(&self, table: &mut FeatureTable) -> Result<(), Error> {
        let lookup: HashMap<&str, usize> = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let stats = table
            .columns
            .iter()
            .map(|column| {
                let i = *lookup
                    .get(column.as_str())
                    .ok_or_else(|| Error::UnknownColumn(column.clone()))?;
                let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
                Ok((self.mean[i], scale))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        for row in &mut table.values {
            for (value, (mean, scale)) in row.iter_mut().zip(&stats) {
                *value = (*value - mean) / scale;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> StandardScaler {
        StandardScaler {
            feature_names: vec!["a".into(), "b".into(), "c".into()],
            mean: vec![1.0, 10.0, 5.0],
            scale: vec![2.0, 5.0, 0.0],
        }
    }

    fn table() -> FeatureTable {
        let mut t = FeatureTable::new(vec!["b".into(), "a".into()]);
        t.push_row("m1", vec![20.0, 3.0]).unwrap();
        t
    }

    #[test]
    fn scales_by_column_name() {
        let mut t = table();
        scaler().transform(&mut t).unwrap();
        assert_eq!(t.values[0], vec![2.0, 1.0]);
    }

    #[test]
    fn zero_scale_only_centres() {
        let mut t = FeatureTable::new(vec!["c".into()]);
        t.push_row("m1", vec![7.0]).unwrap();
        scaler().transform(&mut t).unwrap();
        assert_eq!(t.values[0], vec![2.0]);
    }

    #[test]
    fn scaling_twice_differs_from_once() {
        let mut once = table();
        scaler().transform(&mut once).unwrap();
        let mut twice = once.clone();
        scaler().transform(&mut twice).unwrap();
        assert_ne!(once.values, twice.values);

        let mut again = table();
        scaler().transform(&mut again).unwrap();
        assert_eq!(once.values, again.values);
    }

    #[test]
    fn unknown_column_leaves_table_untouched() {
        let mut t = table();
        t.columns[0] = "zzz".into();
        let before = t.clone();
        assert!(matches!(scaler().transform(&mut t), Err(Error::UnknownColumn(c)) if c == "zzz"));
        assert_eq!(t, before);
    }

    #[test]
    fn json_shape_is_validated() {
        let bad = r#"{"feature_names": ["a"], "mean": [0.0, 1.0], "scale": [1.0]}"#;
        assert!(matches!(
            StandardScaler::from_json(bad, Path::new("s.json")),
            Err(Error::ScalerShape(_))
        ));
        let good = r#"{"feature_names": ["a"], "mean": [0.0], "scale": [1.0]}"#;
        assert!(StandardScaler::from_json(good, Path::new("s.json")).is_ok());
    }
}
