// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! SS58 chain addresses.
//!
//! An address is `base58(prefix ‖ account_id ‖ checksum)` where `prefix`
//! is the chain's one- or two-byte `ss58Format`, `account_id` is 32 bytes
//! and `checksum` is the first two bytes of `blake2b-512("SS58PRE" ‖
//! prefix ‖ account_id)`.
//!
//! ```rust
//! use farm_admin_sdk::address::ChainAddress;
//!
//! let alice = ChainAddress::parse("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY", 42).unwrap();
//! assert_eq!(alice.to_string(), "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY");
//! assert!(ChainAddress::parse("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQZ", 42).is_err());
//! ```

use blake2::{Blake2b512, Digest};

use crate::error::{AdminError, AdminResult};

const CHECKSUM_PREIMAGE: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;
const ACCOUNT_ID_LEN: usize = 32;

/// A validated SS58 address. Compared by its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainAddress {
    text: String,
    account_id: [u8; ACCOUNT_ID_LEN],
}

impl ChainAddress {
    /// Validate `s` as an address of the chain using `ss58_format`.
    pub fn parse(s: &str, ss58_format: u16) -> AdminResult<Self> {
        let invalid = |why: &str| AdminError::InvalidAddress(format!("`{s}` ({why})"));

        let data = bs58::decode(s)
            .into_vec()
            .map_err(|_| invalid("not base58"))?;
        if data.len() < 2 {
            return Err(invalid("too short"));
        }

        let (prefix, prefix_len) = match data[0] {
            0..=63 => (data[0] as u16, 1),
            64..=127 => {
                let lower = (data[0] << 2) | (data[1] >> 6);
                let upper = data[1] & 0b0011_1111;
                (lower as u16 | ((upper as u16) << 8), 2)
            }
            _ => return Err(invalid("reserved prefix")),
        };

        if data.len() != prefix_len + ACCOUNT_ID_LEN + CHECKSUM_LEN {
            return Err(invalid("wrong length"));
        }

        let body_end = data.len() - CHECKSUM_LEN;
        if checksum(&data[..body_end]) != data[body_end..] {
            return Err(invalid("bad checksum"));
        }

        if prefix != ss58_format {
            return Err(invalid(&format!(
                "network prefix {prefix}, chain expects {ss58_format}"
            )));
        }

        let mut account_id = [0u8; ACCOUNT_ID_LEN];
        account_id.copy_from_slice(&data[prefix_len..body_end]);
        Ok(Self {
            text: s.to_string(),
            account_id,
        })
    }

    /// Encode a raw account id for the chain using `ss58_format`.
    pub fn from_account_id(account_id: [u8; ACCOUNT_ID_LEN], ss58_format: u16) -> Self {
        let ident = ss58_format & 0b0011_1111_1111_1111;
        let mut data = match ident {
            0..=63 => vec![ident as u8],
            _ => {
                let first = ((ident & 0b0000_0000_1111_1100) as u8 >> 2) | 0b0100_0000;
                let second = ((ident >> 8) as u8) | (((ident & 0b0000_0000_0000_0011) as u8) << 6);
                vec![first, second]
            }
        };
        data.extend_from_slice(&account_id);
        let sum = checksum(&data);
        data.extend_from_slice(&sum);
        Self {
            text: bs58::encode(data).into_string(),
            account_id,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn account_id(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.account_id
    }
}

impl std::fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn checksum(body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b512::new();
    hasher.update(CHECKSUM_PREIMAGE);
    hasher.update(body);
    let digest = hasher.finalize();
    [digest[0], digest[1]]
}

/// Validate every id, failing on the first malformed one.
pub fn validate_addresses<S: AsRef<str>>(
    ss58_format: u16,
    ids: &[S],
) -> AdminResult<Vec<ChainAddress>> {
    ids.iter()
        .map(|id| ChainAddress::parse(id.as_ref(), ss58_format))
        .collect()
}
