mod list;
mod parser;
mod writer;

pub use list::{Separator, SmilesEntry, TextLayout, read_smiles_list};
pub use parser::parse;
pub use writer::write;
