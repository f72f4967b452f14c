// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::crypto::{EnvelopeCodec, KeyDerivation};
use crate::storage::{PartitionedStore, StoreResult, TagDatabase};

/// Shared, immutable handler context.
///
/// All mutable state lives behind the store handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PartitionedStore>,
    pub codec: EnvelopeCodec,
    pub key_derivation: KeyDerivation,
}

impl AppState {
    pub fn new(store: Arc<dyn PartitionedStore>) -> Self {
        Self {
            store,
            codec: EnvelopeCodec::default(),
            key_derivation: KeyDerivation::default(),
        }
    }

    /// State over a fresh in-memory database.
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self::new(Arc::new(TagDatabase::in_memory()?)))
    }

    pub fn with_codec(mut self, codec: EnvelopeCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_key_derivation(mut self, key_derivation: KeyDerivation) -> Self {
        self.key_derivation = key_derivation;
        self
    }
}
