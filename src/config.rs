// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the parsed [`AppConfig`].
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DB_PATH` | redb database file | unset (in-memory) |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `KEY_DERIVATION` | Secret to cipher key (`raw` or `hkdf`) | `hkdf` |
//! | `CIPHER_MODE` | Envelope cipher (`cfb` or `gcm`) | `cfb` |
//! | `ENVELOPE_NONCE` | Nonce policy (`random` or `synthetic`) | `synthetic` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{
    net::{AddrParseError, SocketAddr},
    path::PathBuf,
};

use crate::crypto::{CipherMode, EnvelopeCodec, KeyDerivation, NonceMode};

/// Path of the redb database file.
///
/// When unset the service keeps everything in an in-memory database that
/// disappears on exit.
pub const DB_PATH_ENV: &str = "DB_PATH";

pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// How the `Authorization` secret becomes a cipher key.
///
/// `raw` uses the secret bytes directly and only accepts 16, 24 or 32 byte
/// secrets. `hkdf` stretches any secret with HKDF-SHA256.
pub const KEY_DERIVATION_ENV: &str = "KEY_DERIVATION";

pub const CIPHER_MODE_ENV: &str = "CIPHER_MODE";

/// `synthetic` makes sealing deterministic per key so plaintext lookups work.
/// `random` draws a fresh nonce per seal; clients must then look up by the
/// envelopes returned from `/add-tag`.
pub const ENVELOPE_NONCE_ENV: &str = "ENVELOPE_NONCE";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has unsupported value {value:?} (expected {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid bind address: {0}")]
    BindAddress(#[from] AddrParseError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Service configuration after parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub key_derivation: KeyDerivation,
    pub codec: EnvelopeCodec,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            key_derivation: KeyDerivation::default(),
            codec: EnvelopeCodec::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: PORT_ENV,
                value: raw,
                expected: "a port number",
            })?,
            None => DEFAULT_PORT,
        };

        let key_derivation = parse_choice(
            get(KEY_DERIVATION_ENV),
            KEY_DERIVATION_ENV,
            "raw or hkdf",
            KeyDerivation::parse,
        )?;
        let cipher = parse_choice(
            get(CIPHER_MODE_ENV),
            CIPHER_MODE_ENV,
            "cfb or gcm",
            CipherMode::parse,
        )?;
        let nonce = parse_choice(
            get(ENVELOPE_NONCE_ENV),
            ENVELOPE_NONCE_ENV,
            "random or synthetic",
            NonceMode::parse,
        )?;
        let log_format = parse_choice(
            get(LOG_FORMAT_ENV),
            LOG_FORMAT_ENV,
            "json or pretty",
            LogFormat::parse,
        )?;

        Ok(Self {
            db_path: get(DB_PATH_ENV).map(PathBuf::from),
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            key_derivation,
            codec: EnvelopeCodec::new(cipher, nonce),
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn parse_choice<T: Default>(
    raw: Option<String>,
    var: &'static str,
    expected: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(T::default()),
        Some(value) => parse(value.trim()).ok_or(ConfigError::InvalidValue {
            var,
            value,
            expected,
        }),
    }
}
