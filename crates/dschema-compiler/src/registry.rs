//! # Definition Registry
//!
//! Side table of raw definitions used during one top-level compile. Entries
//! are keyed by path (`#/definitions/<name>`) and, when the definition
//! declares one, by `$id`.
//!
//! Every entry is registered before any body is compiled, so forward and
//! self references among definitions resolve. The [`DefinitionState`] of an
//! entry tells the `$ref` compiler whether the target may be inlined or is
//! on the current compile stack.
//!
//! The registry is owned by a [`CompileContext`](crate::CompileContext);
//! it never outlives the top-level compile that created it.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use dschema_core::RegistryError;
use serde_json::{Map, Value};

/// Compile state of a registered definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionState {
    /// Registered, not yet compiled.
    Pending,
    /// On the compile stack. A reference to it is recursive.
    Compiling,
    /// Compiled.
    Finished,
}

#[derive(Debug, Clone)]
struct DefinitionEntry<'a> {
    raw: Cow<'a, Map<String, Value>>,
    id: Option<String>,
    state: DefinitionState,
}

/// Raw definitions of one compile pass.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry<'a> {
    entries: BTreeMap<String, DefinitionEntry<'a>>,
    ids: HashMap<String, String>,
}

impl<'a> DefinitionRegistry<'a> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw definition under `path` and, optionally, `id`.
    ///
    /// Fails without modifying the registry if either key is taken.
    pub fn add_raw(
        &mut self,
        path: &str,
        raw: Cow<'a, Map<String, Value>>,
        id: Option<&str>,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(path) {
            return Err(RegistryError::DuplicatePath(path.to_string()));
        }
        if let Some(id) = id {
            if self.ids.contains_key(id) || (id != path && self.entries.contains_key(id)) {
                return Err(RegistryError::DuplicateId(id.to_string()));
            }
            self.ids.insert(id.to_string(), path.to_string());
        }
        self.entries.insert(
            path.to_string(),
            DefinitionEntry {
                raw,
                id: id.map(str::to_string),
                state: DefinitionState::Pending,
            },
        );
        Ok(())
    }

    /// Resolve an `$id` or a path to the registered path.
    pub fn resolve(&self, id_or_path: &str) -> Option<&str> {
        if let Some((path, _)) = self.entries.get_key_value(id_or_path) {
            return Some(path.as_str());
        }
        self.ids.get(id_or_path).map(String::as_str)
    }

    /// Whether `id_or_path` names a registered definition.
    pub fn has(&self, id_or_path: &str) -> bool {
        self.resolve(id_or_path).is_some()
    }

    /// The raw schema registered under `path`.
    pub fn raw(&self, path: &str) -> Option<&Cow<'a, Map<String, Value>>> {
        self.entries.get(path).map(|e| &e.raw)
    }

    /// The `$id` registered with `path`.
    pub fn id(&self, path: &str) -> Option<&str> {
        self.entries.get(path).and_then(|e| e.id.as_deref())
    }

    /// Compile state of the entry at `path`.
    pub fn state(&self, path: &str) -> Option<DefinitionState> {
        self.entries.get(path).map(|e| e.state)
    }

    /// Set the compile state of the entry at `path`.
    pub fn set_state(&mut self, path: &str, state: DefinitionState) -> Result<(), RegistryError> {
        match self.entries.get_mut(path) {
            Some(entry) => {
                entry.state = state;
                Ok(())
            }
            None => Err(RegistryError::NotFound(path.to_string())),
        }
    }

    /// Mark the entry at `path` as compiled.
    pub fn finish(&mut self, path: &str) -> Result<(), RegistryError> {
        self.set_state(path, DefinitionState::Finished)
    }

    /// Whether the entry at `path` is compiled.
    pub fn finished(&self, path: &str) -> bool {
        self.state(path) == Some(DefinitionState::Finished)
    }

    /// Registered paths, in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }
}
