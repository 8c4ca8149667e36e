//! Entry-point linking.
//!
//! `EntryPoints` maps exported method names to contract bodies. Names are
//! validated on registration and each name may be bound only once.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::RuntimeError;
use crate::runtime::Contract;
use crate::validation::validate_entry_name;

/// Named contract entry points.
#[derive(Default)]
pub struct EntryPoints {
    entries: BTreeMap<String, Box<dyn Contract>>,
}

impl EntryPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a contract body.
    pub fn register<C>(&mut self, name: &str, contract: C) -> Result<(), RuntimeError>
    where
        C: Contract + 'static,
    {
        validate_entry_name(name)?;
        if self.entries.contains_key(name) {
            return Err(RuntimeError::DuplicateEntry(name.to_owned()));
        }
        self.entries.insert(name.to_owned(), Box::new(contract));
        Ok(())
    }

    /// Builder-style `register`.
    pub fn with<C>(mut self, name: &str, contract: C) -> Result<Self, RuntimeError>
    where
        C: Contract + 'static,
    {
        self.register(name, contract)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Contract> {
        self.entries.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for EntryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
