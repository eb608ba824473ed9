use super::error::Error;
use crate::io::Table;

/// Name of the identifier column in every table the pipeline reads or writes.
pub const ID_COLUMN: &str = "ID";

/// Side columns that carry molecule metadata rather than descriptors.
///
/// `compoud_name` is kept alongside `compound_name` because historical
/// feature files use that spelling.
pub const INFO_COLUMNS: [&str; 7] = [
    "compound_name",
    "compoud_name",
    "SMILES",
    "cid",
    "category",
    "inchi",
    "Energy",
];

pub fn is_info_column(name: &str) -> bool {
    INFO_COLUMNS.contains(&name)
}

/// Numeric descriptors indexed by molecule identifier.
///
/// Row order is significant and identifiers may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    pub index: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            index: Vec::new(),
            columns,
            values: Vec::new(),
        }
    }

    pub fn push_row(&mut self, id: impl Into<String>, values: Vec<f64>) -> Result<(), Error> {
        let id = id.into();
        if values.len() != self.columns.len() {
            return Err(Error::RowWidth {
                id,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.index.push(id);
        self.values.push(values);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, id: &str) -> Option<&[f64]> {
        self.index
            .iter()
            .position(|i| i == id)
            .map(|r| self.values[r].as_slice())
    }

    /// Keeps only the named columns, in the order given.
    pub fn select_columns(&self, names: &[&str]) -> FeatureTable {
        let positions: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        FeatureTable {
            index: self.index.clone(),
            columns: positions.iter().map(|&p| self.columns[p].clone()).collect(),
            values: self
                .values
                .iter()
                .map(|row| positions.iter().map(|&p| row[p]).collect())
                .collect(),
        }
    }

    /// Keeps the rows whose position satisfies `keep`.
    pub fn retain_rows<F: FnMut(usize, &str) -> bool>(&mut self, keep: F) {
        retain_indexed(&mut self.index, &mut self.values, keep);
    }

    /// Converts to a string table with the index as the leading `ID` column.
    pub fn to_table(&self) -> Table {
        let mut headers = vec![ID_COLUMN.to_string()];
        headers.extend(self.columns.iter().cloned());
        let mut table = Table::new(headers);
        for (id, row) in self.index.iter().zip(&self.values) {
            let mut cells = vec![id.clone()];
            cells.extend(row.iter().map(|v| v.to_string()));
            table.push_row(cells);
        }
        table
    }
}

/// Textual side columns sharing a [`FeatureTable`]'s row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoTable {
    pub index: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<String>>,
}

impl InfoTable {
    /// An info table with only an index, e.g. for pre-computed features
    /// without side columns.
    pub fn from_index(index: Vec<String>) -> Self {
        Self {
            values: vec![Vec::new(); index.len()],
            index,
            columns: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.values.get(row)?.get(col).map(String::as_str)
    }

    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) {
        let col = match self.columns.iter().position(|c| c == column) {
            Some(col) => col,
            None => {
                self.columns.push(column.to_string());
                for cells in &mut self.values {
                    cells.push(String::new());
                }
                self.columns.len() - 1
            }
        };
        if let Some(cells) = self.values.get_mut(row) {
            cells[col] = value.into();
        }
    }

    pub fn retain_rows<F: FnMut(usize, &str) -> bool>(&mut self, keep: F) {
        retain_indexed(&mut self.index, &mut self.values, keep);
    }
}

fn retain_indexed<T, F>(index: &mut Vec<String>, values: &mut Vec<T>, mut keep: F)
where
    F: FnMut(usize, &str) -> bool,
{
    let mut kept = Vec::with_capacity(index.len());
    for (position, (id, row)) in index.drain(..).zip(values.drain(..)).enumerate() {
        if keep(position, &id) {
            kept.push((id, row));
        }
    }
    let (ids, rows): (Vec<String>, Vec<T>) = kept.into_iter().unzip();
    *index = ids;
    *values = rows;
}

fn parse_cell(cell: &str) -> Option<f64> {
    let value = cell.trim();
    if value.is_empty() {
        return Some(f64::NAN);
    }
    match value.to_ascii_lowercase().as_str() {
        "nan" | "na" | "null" => Some(f64::NAN),
        _ => value.parse().ok(),
    }
}

/// Splits a raw table with an `ID` column into numeric features and
/// info columns.
///
/// Empty and `NaN` cells become `f64::NAN`; any other non-numeric feature
/// cell is an error.
pub fn split_info(table: &Table) -> Result<(FeatureTable, InfoTable), Error> {
    let id_col = table
        .column_index(ID_COLUMN)
        .ok_or_else(|| Error::MissingIndexColumn(ID_COLUMN.to_string()))?;

    let mut feature_cols = Vec::new();
    let mut info_cols = Vec::new();
    for (i, name) in table.headers.iter().enumerate() {
        if i == id_col {
            continue;
        }
        if is_info_column(name) {
            info_cols.push(i);
        } else {
            feature_cols.push(i);
        }
    }

    let mut features =
        FeatureTable::new(feature_cols.iter().map(|&c| table.headers[c].clone()).collect());
    let mut info = InfoTable {
        columns: info_cols.iter().map(|&c| table.headers[c].clone()).collect(),
        ..InfoTable::default()
    };

    for (r, row) in table.rows.iter().enumerate() {
        let id = row[id_col].clone();
        let values = feature_cols
            .iter()
            .map(|&c| {
                parse_cell(&row[c])
                    .ok_or_else(|| Error::non_numeric(&table.headers[c], r + 1, &id, &row[c]))
            })
            .collect::<Result<Vec<_>, _>>()?;
        features.push_row(id.clone(), values)?;
        info.index.push(id);
        info.values.push(info_cols.iter().map(|&c| row[c].clone()).collect());
    }

    Ok((features, info))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> Table {
        let mut table = Table::new(
            ["ID", "SMILES", "nAcid", "ALogP", "compoud_name"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        table.push_row(["mol1", "CCO", "0", "-0.3", "ethanol"].iter().map(|s| s.to_string()).collect());
        table.push_row(["mol2", "CCN", "", "NaN", "ethylamine"].iter().map(|s| s.to_string()).collect());
        table
    }

    #[test]
    fn split_separates_info_from_features() {
        let (features, info) = split_info(&raw()).unwrap();
        assert_eq!(features.columns, vec!["nAcid", "ALogP"]);
        assert_eq!(info.columns, vec!["SMILES", "compoud_name"]);
        assert_eq!(features.index, info.index);
        assert_eq!(features.values[0], vec![0.0, -0.3]);
        assert!(features.values[1].iter().all(|v| v.is_nan()));
        assert_eq!(info.get(1, "SMILES"), Some("CCN"));
    }

    #[test]
    fn split_requires_id_column() {
        let table = Table::new(vec!["Name".into(), "nAcid".into()]);
        assert!(matches!(split_info(&table), Err(Error::MissingIndexColumn(_))));
    }

    #[test]
    fn split_rejects_text_in_feature_columns() {
        let mut table = raw();
        table.rows[0][2] = "abc".into();
        let err = split_info(&table).unwrap_err();
        assert!(matches!(err, Error::NonNumeric { ref column, row: 1, .. } if column == "nAcid"));
    }

    #[test]
    fn retain_rows_keeps_order() {
        let (mut features, mut info) = split_info(&raw()).unwrap();
        features.retain_rows(|pos, _| pos == 1);
        info.retain_rows(|_, id| id == "mol2");
        assert_eq!(features.index, vec!["mol2"]);
        assert_eq!(info.index, vec!["mol2"]);
    }

    #[test]
    fn info_set_adds_columns() {
        let mut info = InfoTable::from_index(vec!["a".into(), "b".into()]);
        info.set(1, "SMILES", "CC");
        assert_eq!(info.get(0, "SMILES"), Some(""));
        assert_eq!(info.get(1, "SMILES"), Some("CC"));
    }

    #[test]
    fn to_table_puts_id_first() {
        let mut features = FeatureTable::new(vec!["x".into()]);
        features.push_row("m", vec![1.5]).unwrap();
        let table = features.to_table();
        assert_eq!(table.headers, vec!["ID", "x"]);
        assert_eq!(table.rows[0], vec!["m", "1.5"]);
        assert!(features.push_row("bad", vec![]).is_err());
    }
}
