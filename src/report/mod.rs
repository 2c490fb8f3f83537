//! Output document generation.

pub mod generator;

pub use generator::{generate_json_report, write_report, write_stdout};
