//! Per-request CSP nonce generation.

use std::cell::OnceCell;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Lazily generated random token, stable for one provider's lifetime.
///
/// The first [`value`](NonceProvider::value) call draws 16 bytes (128 bits)
/// from the operating-system RNG and caches the base64 encoding; every
/// later call returns the identical cached token. A fresh provider (one per
/// compiler instance, one compiler per request) yields a fresh token, so a
/// nonce is never observable across requests.
#[derive(Debug, Default)]
pub(crate) struct NonceProvider {
    token: OnceCell<String>,
}

impl NonceProvider {
    pub(crate) fn new() -> Self {
        Self {
            token: OnceCell::new(),
        }
    }

    /// The cached token, generated on first access.
    ///
    /// Aborts the process if the OS randomness source is unavailable; nonce
    /// material is never retried or degraded.
    pub(crate) fn value(&self) -> &str {
        self.token.get_or_init(generate_token)
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
