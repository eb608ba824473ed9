//! Descriptor tables, the fixed descriptor selection and standardization.

mod descriptor_list;
mod error;
mod scaler;
mod table;

use std::collections::HashSet;

use tracing::{debug, warn};

pub use descriptor_list::SELECTED_DESCRIPTORS;
pub use error::Error;
pub use scaler::StandardScaler;
pub use table::{FeatureTable, ID_COLUMN, INFO_COLUMNS, InfoTable, is_info_column, split_info};

/// Result of intersecting a table with [`SELECTED_DESCRIPTORS`].
#[derive(Debug, Clone)]
pub struct Selection {
    /// The selected columns, in the input table's column order.
    pub table: FeatureTable,
    /// Selected descriptors the input did not provide.
    pub missing: Vec<&'static str>,
}

/// Keeps the columns of `table` that belong to the fixed descriptor list.
///
/// Columns outside the list are dropped. Listed descriptors absent from
/// the input are not an error; they are reported in
/// [`Selection::missing`] so callers can decide how strict to be.
pub fn select_descriptors(table: &FeatureTable) -> Selection {
    let wanted: HashSet<&str> = SELECTED_DESCRIPTORS.iter().copied().collect();
    let keep: Vec<&str> = table
        .columns
        .iter()
        .map(String::as_str)
        .filter(|c| wanted.contains(c))
        .collect();

    let present: HashSet<&str> = keep.iter().copied().collect();
    let missing: Vec<&'static str> = SELECTED_DESCRIPTORS
        .iter()
        .copied()
        .filter(|d| !present.contains(d))
        .collect();

    if !missing.is_empty() {
        warn!(
            missing = missing.len(),
            first = missing[0],
            "input lacks some selected descriptors"
        );
    }
    debug!(
        kept = keep.len(),
        dropped = table.column_count() - keep.len(),
        "selected descriptors"
    );

    Selection {
        table: table.select_columns(&keep),
        missing,
    }
}
