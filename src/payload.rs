// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The unit of data that flows between processors.
//!
//! A [`Payload`] is immutable once built. It is reference counted, so fanning
//! one out to many subscribers clones a pointer rather than the content. A
//! handler that needs a different value builds a new payload.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Content carried by a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadBody {
    /// Raw bytes, e.g. a file path or a file's content
    Bytes(Vec<u8>),
    /// A parsed record such as a CSV row, keyed by column name
    Record(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PayloadInner {
    source: String,
    body: PayloadBody,
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    inner: Arc<PayloadInner>,
}

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>, source: impl Into<String>) -> Self {
        Self::from_body(PayloadBody::Bytes(bytes.into()), source)
    }

    pub fn record(fields: BTreeMap<String, String>, source: impl Into<String>) -> Self {
        Self::from_body(PayloadBody::Record(fields), source)
    }

    fn from_body(body: PayloadBody, source: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(PayloadInner {
                source: source.into(),
                body,
                metadata: BTreeMap::new(),
            }),
        }
    }

    /// Attach a metadata entry while the payload is still being built.
    ///
    /// Copies the content if the payload has already been shared.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner)
            .metadata
            .insert(key.into(), value.into());
        self
    }

    /// Name of the handler that produced this payload
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    pub fn body(&self) -> &PayloadBody {
        &self.inner.body
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.inner.metadata
    }

    /// The payload as bytes. Records are rendered as a JSON object.
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match &self.inner.body {
            PayloadBody::Bytes(bytes) => Cow::Borrowed(bytes.as_slice()),
            PayloadBody::Record(fields) => {
                // A BTreeMap<String, String> always serializes.
                Cow::Owned(serde_json::to_vec(fields).unwrap_or_default())
            }
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, String>> {
        match &self.inner.body {
            PayloadBody::Record(fields) => Some(fields),
            PayloadBody::Bytes(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match &self.inner.body {
            PayloadBody::Bytes(bytes) => bytes.len(),
            PayloadBody::Record(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
