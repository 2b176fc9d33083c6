// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors produced by handlers, either returned from `handle` or pushed onto
//! the handler's error channel.

use std::path::PathBuf;
use thiserror::Error;

use crate::errors::{BusError, PropertyError};

#[derive(Debug, Error)]
pub enum HandlerError {
    /// A reactive handler was invoked without an input payload
    #[error("handler '{0}' requires an input payload")]
    MissingPayload(&'static str),

    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("this is not a proper csv file")]
    NotCsv,

    #[error("the header is not the same size as the records: header has {header} columns, row has {row}")]
    HeaderMismatch { header: usize, row: usize },

    #[error("handler received a {expected} payload but got something else")]
    UnexpectedBody { expected: &'static str },

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Delivery(#[from] BusError),
}

impl HandlerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HandlerError::Io {
            path: path.into(),
            source,
        }
    }
}
