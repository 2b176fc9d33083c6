// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the handler registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The first registration under a name wins; later ones are rejected.
    #[error("a handler is already registered under '{0}'")]
    AlreadyRegistered(String),

    #[error("no handler is registered under '{0}'")]
    UnknownHandler(String),
}
