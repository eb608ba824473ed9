pub mod reader;
pub mod writer;

pub use reader::{SdfRecord, read, read_all};
pub use writer::{write, write_all};
