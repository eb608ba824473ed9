use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::io::Format;
use crate::io::error::Error;

/// Column separator for headerless SMILES lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    /// Runs of spaces and/or tabs.
    #[default]
    Whitespace,
    Char(char),
}

impl Separator {
    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Whitespace => line.split_whitespace().collect(),
            Separator::Char(c) => line.split(*c).map(str::trim).collect(),
        }
    }
}

impl FromStr for Separator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            r"\s+" | r"\s+|\t+" | "whitespace" | "ws" => Ok(Separator::Whitespace),
            r"\t" | "tab" | "\t" => Ok(Separator::Char('\t')),
            "comma" => Ok(Separator::Char(',')),
            "space" => Ok(Separator::Char(' ')),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Separator::Char(c)),
                    _ => Err(format!(
                        "unsupported separator '{other}' (use \\s+, tab, or a single character)"
                    )),
                }
            }
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Whitespace => write!(f, r"\s+"),
            Separator::Char('\t') => write!(f, "tab"),
            Separator::Char(c) => write!(f, "{c}"),
        }
    }
}

/// How identifiers and SMILES are laid out in a text list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLayout {
    pub separator: Separator,
    /// Defaults to the first column.
    pub smiles_column: Option<usize>,
    /// Defaults to the last column.
    pub name_column: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmilesEntry {
    pub name: String,
    pub smiles: String,
    /// 1-based line number in the source.
    pub line: usize,
}

/// Reads a headerless SMILES list.
///
/// Single-column rows use the SMILES itself as the identifier. Blank lines
/// and lines starting with `#` are skipped.
pub fn read_smiles_list<R: BufRead>(reader: R, layout: &TextLayout) -> Result<Vec<SmilesEntry>, Error> {
    let mut entries = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = layout.separator.split(trimmed);
        if fields.is_empty() {
            continue;
        }

        let smiles_idx = layout.smiles_column.unwrap_or(0);
        let smiles = *fields.get(smiles_idx).ok_or(Error::ColumnOutOfRange {
            index: smiles_idx,
            available: fields.len(),
        })?;
        if smiles.is_empty() {
            return Err(Error::parse(Format::Smiles, n + 1, "empty SMILES field"));
        }

        let name = if fields.len() == 1 {
            smiles
        } else {
            let name_idx = layout.name_column.unwrap_or(fields.len() - 1);
            *fields.get(name_idx).ok_or(Error::ColumnOutOfRange {
                index: name_idx,
                available: fields.len(),
            })?
        };

        entries.push(SmilesEntry {
            name: name.to_string(),
            smiles: smiles.to_string(),
            line: n + 1,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str, layout: &TextLayout) -> Vec<SmilesEntry> {
        read_smiles_list(Cursor::new(text), layout).unwrap()
    }

    #[test]
    fn single_column_uses_smiles_as_name() {
        let entries = read("CCO\n\nc1ccccc1\n", &TextLayout::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "CCO");
        assert_eq!(entries[1].line, 3);
    }

    #[test]
    fn name_defaults_to_last_column() {
        let entries = read("CCO  ignored\tmol1\n", &TextLayout::default());
        assert_eq!(entries[0].smiles, "CCO");
        assert_eq!(entries[0].name, "mol1");
    }

    #[test]
    fn explicit_columns_and_separator() {
        let layout = TextLayout {
            separator: Separator::Char(','),
            smiles_column: Some(1),
            name_column: Some(0),
        };
        let entries = read("mol1,CCO\nmol2, CCN\n", &layout);
        assert_eq!(entries[1].name, "mol2");
        assert_eq!(entries[1].smiles, "CCN");
    }

    #[test]
    fn out_of_range_column_is_an_error() {
        let layout = TextLayout {
            smiles_column: Some(3),
            ..TextLayout::default()
        };
        let err = read_smiles_list(Cursor::new("CCO mol1\n"), &layout).unwrap_err();
        assert!(matches!(err, Error::ColumnOutOfRange { index: 3, available: 2 }));
    }

    #[test]
    fn separator_from_str() {
        assert_eq!(r"\s+".parse::<Separator>().unwrap(), Separator::Whitespace);
        assert_eq!("tab".parse::<Separator>().unwrap(), Separator::Char('\t'));
        assert_eq!(";".parse::<Separator>().unwrap(), Separator::Char(';'));
        assert!("::".parse::<Separator>().is_err());
    }
}
