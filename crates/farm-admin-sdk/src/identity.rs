// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Signing identities.
//!
//! [`SigningIdentity`] derives the admin's sr25519 keypair from a secret
//! URI and holds it for the lifetime of one invocation; the secret is never
//! written anywhere or passed to another process. [`EphemeralOrigin`] is a
//! throwaway account used as the caller of read-only dry runs.

use std::str::FromStr;

use subxt_signer::sr25519::Keypair;
use subxt_signer::SecretUri;

use crate::address::ChainAddress;
use crate::error::{AdminError, AdminResult};

pub struct SigningIdentity {
    keypair: Keypair,
}

impl SigningIdentity {
    /// Accepts a BIP-39 mnemonic (optionally followed by a `//hard/soft`
    /// derivation path and `///password`), a `0x` hex seed, or a dev URI
    /// such as `//Alice`.
    pub fn from_phrase(phrase: &str) -> AdminResult<Self> {
        let suri = phrase.trim();
        if suri.is_empty() {
            return Err(AdminError::InvalidSeed("empty seed phrase".into()));
        }

        let base = suri.split('/').next().unwrap_or_default().trim();
        if let Some(hex_seed) = base.strip_prefix("0x") {
            let bytes = hex::decode(hex_seed)
                .map_err(|_| AdminError::InvalidSeed("hex seed is not valid hex".into()))?;
            if bytes.len() != 32 {
                return Err(AdminError::InvalidSeed(format!(
                    "hex seed must be 32 bytes, got {}",
                    bytes.len()
                )));
            }
        } else if !base.is_empty() {
            bip39::Mnemonic::parse_normalized(base)
                .map_err(|e| AdminError::InvalidSeed(format!("not a BIP-39 mnemonic: {e}")))?;
        }

        let uri = SecretUri::from_str(suri)
            .map_err(|e| AdminError::InvalidSeed(format!("bad secret URI: {e}")))?;
        let keypair = Keypair::from_uri(&uri)
            .map_err(|e| AdminError::InvalidSeed(format!("cannot derive key: {e}")))?;
        Ok(Self { keypair })
    }

    pub fn account_id(&self) -> [u8; 32] {
        self.keypair.public_key().0
    }

    pub fn address(&self, ss58_format: u16) -> ChainAddress {
        ChainAddress::from_account_id(self.account_id(), ss58_format)
    }

    /// sr25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.keypair.sign(message).0
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningIdentity({})", hex::encode(self.account_id()))
    }
}

/// Random caller for dry runs. Needs no funds and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EphemeralOrigin([u8; 32]);

impl EphemeralOrigin {
    pub fn generate() -> Self {
        Self(rand::random())
    }

    pub fn account_id(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn address(&self, ss58_format: u16) -> ChainAddress {
        ChainAddress::from_account_id(self.0, ss58_format)
    }
}
