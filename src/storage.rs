/// Loading acronym definitions from YAML and TOML files.
pub mod definitions;

pub use definitions::{Definition, Definitions, LoadError, Plural};
