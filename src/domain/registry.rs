//! In-memory registry of acronyms for a single document conversion.
//!
//! The [`Registry`] knows nothing about files or document syntax. It owns the
//! acronyms, hands out definition order at registration time and usage order
//! the first time each acronym is rendered.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::instrument;

use crate::domain::{Acronym, Key, RichText};

/// The acronyms of one conversion, with their definition and usage order.
///
/// Storage is decomposed:
/// - Acronyms: `Vec<Acronym>`, in definition order (the index is the
///   definition order)
/// - Key lookup: `BTreeMap<String, usize>` into that vector
/// - Usage counter: the next usage order to hand out
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: Vec<Acronym>,

    /// Forward lookup map from key to position in `entries`.
    index: BTreeMap<String, usize>,

    /// Number of acronyms marked used so far.
    next_usage: usize,
}

/// Errors raised by the [`Registry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// An acronym with this key has already been registered.
    #[error("acronym '{0}' is already defined")]
    DuplicateKey(Key),
    /// No acronym is registered under this key.
    #[error("acronym '{0}' is not defined")]
    NotFound(String),
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with room for `capacity` acronyms.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: BTreeMap::new(),
            next_usage: 0,
        }
    }

    /// Registers a new acronym and assigns it the next definition order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] if `key` is already registered.
    /// The registry is unchanged in that case.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub fn register(
        &mut self,
        key: Key,
        shortname: RichText,
        longname: RichText,
        plural_shortname: Option<RichText>,
        plural_longname: Option<RichText>,
    ) -> Result<&Acronym, RegistryError> {
        if self.index.contains_key(key.as_str()) {
            return Err(RegistryError::DuplicateKey(key));
        }

        let definition_order = self.entries.len();
        self.index.insert(key.to_string(), definition_order);
        self.entries.push(Acronym {
            key,
            shortname,
            longname,
            plural_shortname,
            plural_longname,
            definition_order,
            usage_order: None,
        });

        tracing::debug!("Registered acronym with definition order {definition_order}");
        Ok(&self.entries[definition_order])
    }

    /// Finds an acronym by key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no acronym has this key.
    pub fn lookup(&self, key: &str) -> Result<&Acronym, RegistryError> {
        self.position(key).map(|i| &self.entries[i])
    }

    /// Records that the acronym has been rendered.
    ///
    /// The first call for a key assigns the next usage order and returns
    /// `true`. Later calls return `false` and change nothing, so callers must
    /// capture the flag from the call that reports first use.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no acronym has this key.
    pub fn mark_used(&mut self, key: &str) -> Result<bool, RegistryError> {
        let position = self.position(key)?;
        let acronym = &mut self.entries[position];

        if acronym.usage_order.is_some() {
            return Ok(false);
        }

        let order = self.next_usage;
        acronym.usage_order = Some(order);
        self.next_usage += 1;
        tracing::debug!("First use of acronym '{key}', usage order {order}");
        Ok(true)
    }

    /// Returns a snapshot of every registered acronym, in definition order.
    #[must_use]
    pub fn all_entries(&self) -> Vec<Acronym> {
        self.entries.clone()
    }

    /// Returns an iterator over the registered acronyms, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Acronym> + '_ {
        self.entries.iter()
    }

    /// The number of registered acronyms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every usage order so that the same definitions can be used for
    /// a fresh pass over a document.
    pub fn reset_usage(&mut self) {
        for acronym in &mut self.entries {
            acronym.usage_order = None;
        }
        self.next_usage = 0;
    }

    fn position(&self, key: &str) -> Result<usize, RegistryError> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }
}
