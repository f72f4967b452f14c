// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Keyed Tags - Encrypted Tagging Service
//!
//! An HTTP service that stores tag/target associations and like counters.
//! Each caller's `Authorization` secret selects a private partition and the
//! key that seals every stored value.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential extraction from the `Authorization` header
//! - `crypto` - Key derivation and envelope sealing
//! - `storage` - Partitioned redb store

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
