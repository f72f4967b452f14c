// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Module
//!
//! Possession of a secret is the only access control this service has.
//!
//! ## Flow
//!
//! 1. Client sends `Authorization: <secret>` (the whole header value)
//! 2. [`Credential`] extracts the secret and derives:
//!    - the partition hash scoping every storage lookup
//!    - the cipher key for envelope encryption
//! 3. Handlers never see the raw secret again
//!
//! ## Security
//!
//! - The secret is never logged; only its partition hash may be
//! - A fresh high-entropy secret is available from `GET /new-key`

pub mod error;
pub mod extractor;

pub use error::CredentialError;
pub use extractor::Credential;
