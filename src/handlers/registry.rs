// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::RegistryError;
use crate::handlers::{ListDirectory, MapFilter, ParseCsv, ReadFile, Stdout, WriteFile};
use crate::traits::Handler;

/// Builds a fresh handler instance
pub type HandlerConstructor = fn() -> Arc<dyn Handler>;

static GLOBAL_REGISTRY: Lazy<HandlerRegistry> = Lazy::new(HandlerRegistry::with_builtin_handlers);

/// Maps handler names to constructors so pipelines can be described by name.
///
/// The first registration of a name wins; later ones are rejected.
#[derive(Default)]
pub struct HandlerRegistry {
    constructors: RwLock<HashMap<String, HandlerConstructor>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every handler shipped with the crate
    pub fn with_builtin_handlers() -> Self {
        let builtins: [(&str, HandlerConstructor); 6] = [
            (ListDirectory::NAME, || Arc::new(ListDirectory::new())),
            (ReadFile::NAME, || Arc::new(ReadFile::new())),
            (WriteFile::NAME, || Arc::new(WriteFile::new())),
            (ParseCsv::NAME, || Arc::new(ParseCsv::new())),
            (MapFilter::NAME, || Arc::new(MapFilter::new())),
            (Stdout::NAME, || Arc::new(Stdout::new())),
        ];
        let registry = Self::new();
        registry
            .constructors
            .write()
            .extend(builtins.into_iter().map(|(name, ctor)| (name.to_string(), ctor)));
        registry
    }

    /// The process-wide registry, seeded with the built-in handlers
    pub fn global() -> &'static HandlerRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn register(&self, name: &str, constructor: HandlerConstructor) -> Result<(), RegistryError> {
        let mut constructors = self.constructors.write();
        if constructors.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        constructors.insert(name.to_string(), constructor);
        Ok(())
    }

    pub fn create(&self, name: &str) -> Result<Arc<dyn Handler>, RegistryError> {
        let constructor = self
            .constructors
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownHandler(name.to_string()))?;
        Ok(constructor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.read().keys().cloned().collect();
        names.sort();
        names
    }
}
