use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use super::{Format, error::Error};

/// A delimited text table with a header row, kept as strings.
///
/// Numeric interpretation is left to callers so that identifier and info
/// columns survive untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

fn delimiter(format: Format) -> u8 {
    match format {
        Format::Tsv => b'\t',
        _ => b',',
    }
}

/// Reads a table, choosing the delimiter from `format`.
pub fn read<R: Read>(reader: R, format: Format) -> Result<Table, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter(format))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut table = Table::new(headers);

    for (n, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() > table.headers.len() {
            return Err(Error::parse(
                format,
                n + 2,
                format!(
                    "row has {} fields but the header declares {}",
                    row.len(),
                    table.headers.len()
                ),
            ));
        }
        row.resize(table.headers.len(), String::new());
        table.push_row(row);
    }
    Ok(table)
}

pub fn write<W: Write>(writer: W, table: &Table, format: Format) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter(format))
        .from_writer(writer);
    csv_writer.write_record(&table.headers)?;
    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_path(path: &Path) -> Result<Table, Error> {
    let format = Format::table_from_path(path)?;
    read(File::open(path)?, format)
}

pub fn write_path(path: &Path, table: &Table) -> Result<(), Error> {
    let format = Format::table_from_path(path)?;
    write(File::create(path)?, table, format)
}
