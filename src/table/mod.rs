//! Table loading.

pub mod reader;

pub use reader::{load_rows, InputSource, ReadOptions};
