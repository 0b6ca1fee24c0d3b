//! Domain models for acronym rendering.
//!
//! This module contains the core domain types: rich text, acronyms and their
//! registry, case rules, rendering styles, sorting and configuration.

/// Rich-text trees and their markdown representation.
pub mod rich_text;
pub use rich_text::{Inline, RichText, StyleKind};

/// Case transformation over rich text.
pub mod case;
pub use case::{Case, CaseTarget};

mod acronym;
pub use acronym::{Acronym, InvalidKeyError, Key};

mod anchor;
pub use anchor::Anchors;

mod registry;
pub use registry::{Registry, RegistryError};

/// Rendering styles and the render engine.
pub mod style;
pub use style::{Engine, RenderError, RenderOptions, RenderRequest, Rendered, Style};

/// Glossary sorting.
pub mod sort;
pub use sort::{SortCriterion, SortError};

mod config;
pub use config::{Config, ConfigError};

mod glossary;
pub use glossary::{GlossaryEntry, build_glossary};
