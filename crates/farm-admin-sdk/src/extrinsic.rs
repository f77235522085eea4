// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Signed `Contracts` extrinsics, built and signed locally.
//!
//! The runtime metadata (`state_getMetadata`) says where the contracts
//! pallet sits, which indices its `call` and `instantiate` calls have, which
//! signed extensions every transaction must carry, and what each pallet
//! error is called. [`ExtrinsicFormat`] keeps just those facts; the
//! [`Gateway`](crate::gateway::Gateway) fetches it once per session and
//! submits what it produces.

use std::collections::HashMap;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use parity_scale_codec::{Compact, Decode, Encode};
use scale_info::form::PortableForm;
use scale_info::{PortableRegistry, TypeDef, Variant};
use serde_json::Value;

use crate::chain::Weight;
use crate::error::{AdminError, AdminResult, ContractCallError};
use crate::exec_result::ExecResultLayout;
use crate::identity::SigningIdentity;

/// Version 4, signed.
const EXTRINSIC_V4_SIGNED: u8 = 0b1000_0100;
/// `MultiSignature::Sr25519`
const SR25519: u8 = 1;
/// `MultiAddress::Id`
const ADDRESS_ID: u8 = 0;
/// Payloads longer than this are hashed before signing.
const MAX_UNHASHED_PAYLOAD: usize = 256;

type Blake2b256 = Blake2b<U32>;

pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b256::digest(data));
    out
}

/// `0x`-prefixed hash the node reports for an encoded extrinsic.
pub fn extrinsic_hash(extrinsic: &[u8]) -> String {
    format!("0x{}", hex::encode(blake2_256(extrinsic)))
}

// ── Signed extensions ────────────────────────────────────────────────

/// A signed extension the runtime expects, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedExtension {
    SpecVersion,
    TxVersion,
    Genesis,
    /// Always immortal.
    Mortality,
    Nonce,
    /// Zero tip.
    Tip,
    /// Zero tip, paid in the native token.
    AssetTip,
    /// Metadata hash check disabled.
    MetadataHash,
    /// Contributes no bytes to either part.
    Empty(String),
}

impl SignedExtension {
    /// `zero_sized` tells whether both the extension's type and its
    /// additional-signed type encode to nothing.
    pub fn from_identifier(identifier: &str, zero_sized: bool) -> AdminResult<Self> {
        Ok(match identifier {
            "CheckSpecVersion" => SignedExtension::SpecVersion,
            "CheckTxVersion" => SignedExtension::TxVersion,
            "CheckGenesis" => SignedExtension::Genesis,
            "CheckMortality" | "CheckEra" => SignedExtension::Mortality,
            "CheckNonce" => SignedExtension::Nonce,
            "ChargeTransactionPayment" => SignedExtension::Tip,
            "ChargeAssetTxPayment" => SignedExtension::AssetTip,
            "CheckMetadataHash" => SignedExtension::MetadataHash,
            other if zero_sized => SignedExtension::Empty(other.to_string()),
            other => {
                return Err(AdminError::UnsupportedRuntime(format!(
                    "unknown signed extension `{other}`"
                )))
            }
        })
    }

    fn encode_extra(&self, params: &SigningParams, out: &mut Vec<u8>) {
        match self {
            SignedExtension::Mortality => out.push(0),
            SignedExtension::Nonce => Compact(params.nonce).encode_to(out),
            SignedExtension::Tip => Compact(0u128).encode_to(out),
            SignedExtension::AssetTip => {
                Compact(0u128).encode_to(out);
                None::<u32>.encode_to(out);
            }
            SignedExtension::MetadataHash => out.push(0),
            _ => {}
        }
    }

    fn encode_additional(&self, params: &SigningParams, out: &mut Vec<u8>) {
        match self {
            SignedExtension::SpecVersion => params.spec_version.encode_to(out),
            SignedExtension::TxVersion => params.transaction_version.encode_to(out),
            SignedExtension::Genesis | SignedExtension::Mortality => {
                params.genesis_hash.encode_to(out)
            }
            SignedExtension::MetadataHash => None::<[u8; 32]>.encode_to(out),
            _ => {}
        }
    }
}

/// Chain state a signature commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningParams {
    pub spec_version: u32,
    pub transaction_version: u32,
    pub genesis_hash: [u8; 32],
    pub nonce: u64,
}

// ── Format ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExtrinsicFormat {
    contracts_pallet: u8,
    call_index: u8,
    instantiate_index: u8,
    /// `MultiAddress` rather than a bare account id.
    multi_address: bool,
    extensions: Vec<SignedExtension>,
    /// `(pallet index, error index)` → `(name, docs)`
    errors: HashMap<(u8, u8), (String, String)>,
}

fn unsupported(reason: impl Into<String>) -> AdminError {
    AdminError::UnsupportedRuntime(reason.into())
}

fn variants_of(types: &PortableRegistry, id: u32) -> Option<&[Variant<PortableForm>]> {
    match &types.resolve(id)?.type_def {
        TypeDef::Variant(v) => Some(&v.variants),
        _ => None,
    }
}

fn is_zero_sized(types: &PortableRegistry, id: u32, depth: u8) -> bool {
    if depth > 8 {
        return false;
    }
    match types.resolve(id).map(|t| &t.type_def) {
        Some(TypeDef::Tuple(t)) => t.fields.iter().all(|f| is_zero_sized(types, f.id, depth + 1)),
        Some(TypeDef::Composite(c)) => c
            .fields
            .iter()
            .all(|f| is_zero_sized(types, f.ty.id, depth + 1)),
        _ => false,
    }
}

impl ExtrinsicFormat {
    /// Read the format from SCALE-encoded runtime metadata (V14).
    pub fn from_metadata(bytes: &[u8]) -> AdminResult<Self> {
        let prefixed = RuntimeMetadataPrefixed::decode(&mut &bytes[..])
            .map_err(|e| unsupported(format!("cannot decode runtime metadata: {e}")))?;
        let metadata = match prefixed.1 {
            RuntimeMetadata::V14(m) => m,
            other => {
                return Err(unsupported(format!(
                    "runtime metadata version {} (expected 14)",
                    other.version()
                )))
            }
        };
        let types = &metadata.types;

        let contracts = metadata
            .pallets
            .iter()
            .find(|p| p.name == "Contracts")
            .ok_or_else(|| unsupported("runtime has no Contracts pallet"))?;
        let calls = contracts
            .calls
            .as_ref()
            .and_then(|c| variants_of(types, c.ty.id))
            .ok_or_else(|| unsupported("Contracts pallet exposes no calls"))?;
        let index_of = |name: &str| {
            calls
                .iter()
                .find(|v| v.name == name)
                .map(|v| v.index)
                .ok_or_else(|| unsupported(format!("Contracts pallet has no `{name}` call")))
        };

        let multi_address = types
            .resolve(metadata.extrinsic.ty.id)
            .and_then(|t| t.type_params.iter().find(|p| p.name == "Address"))
            .and_then(|p| p.ty.as_ref())
            .and_then(|ty| types.resolve(ty.id))
            .map(|t| t.path.segments.last().is_some_and(|s| s == "MultiAddress"))
            .unwrap_or(true);

        let extensions = metadata
            .extrinsic
            .signed_extensions
            .iter()
            .map(|e| {
                let zero_sized = is_zero_sized(types, e.ty.id, 0)
                    && is_zero_sized(types, e.additional_signed.id, 0);
                SignedExtension::from_identifier(&e.identifier, zero_sized)
            })
            .collect::<AdminResult<Vec<_>>>()?;

        let mut errors = HashMap::new();
        for pallet in &metadata.pallets {
            let Some(error) = &pallet.error else { continue };
            for v in variants_of(types, error.ty.id).unwrap_or_default() {
                errors.insert((pallet.index, v.index), (v.name.clone(), v.docs.join(" ")));
            }
        }

        let format = Self {
            contracts_pallet: contracts.index,
            call_index: index_of("call")?,
            instantiate_index: index_of("instantiate")?,
            multi_address,
            extensions,
            errors,
        };
        tracing::debug!(
            pallet = format.contracts_pallet,
            extensions = format.extensions.len(),
            "extrinsic format"
        );
        Ok(format)
    }

    /// Name and docs of a pallet error, as reported in a `DispatchError::Module`.
    pub fn module_error(&self, pallet: u8, error: [u8; 4]) -> ContractCallError {
        match self.errors.get(&(pallet, error[0])) {
            Some((name, docs)) => ContractCallError {
                name: name.clone(),
                docs: docs.clone(),
            },
            None => ContractCallError {
                name: format!("Module({pallet}, 0x{})", hex::encode(error)),
                docs: String::new(),
            },
        }
    }

    fn encode_address(&self, account: &[u8; 32], out: &mut Vec<u8>) {
        if self.multi_address {
            out.push(ADDRESS_ID);
        }
        out.extend_from_slice(account);
    }

    /// `Contracts::call` with selector-prefixed `data`.
    pub fn contracts_call(
        &self,
        layout: ExecResultLayout,
        dest: &[u8; 32],
        value: u128,
        gas_limit: Weight,
        data: &[u8],
    ) -> Vec<u8> {
        let mut out = vec![self.contracts_pallet, self.call_index];
        self.encode_address(dest, &mut out);
        Compact(value).encode_to(&mut out);
        encode_weight(layout, gas_limit, &mut out);
        None::<Compact<u128>>.encode_to(&mut out);
        data.encode_to(&mut out);
        out
    }

    /// `Contracts::instantiate` for code already uploaded under `code_hash`.
    pub fn contracts_instantiate(
        &self,
        layout: ExecResultLayout,
        value: u128,
        gas_limit: Weight,
        code_hash: &[u8; 32],
        data: &[u8],
        salt: &[u8],
    ) -> Vec<u8> {
        let mut out = vec![self.contracts_pallet, self.instantiate_index];
        Compact(value).encode_to(&mut out);
        encode_weight(layout, gas_limit, &mut out);
        None::<Compact<u128>>.encode_to(&mut out);
        code_hash.encode_to(&mut out);
        data.encode_to(&mut out);
        salt.encode_to(&mut out);
        out
    }

    /// Sign `call` and wrap it into a length-prefixed v4 extrinsic.
    pub fn sign(&self, call: &[u8], signer: &SigningIdentity, params: &SigningParams) -> Vec<u8> {
        let mut extra = Vec::new();
        let mut additional = Vec::new();
        for ext in &self.extensions {
            ext.encode_extra(params, &mut extra);
            ext.encode_additional(params, &mut additional);
        }

        let mut payload = Vec::with_capacity(call.len() + extra.len() + additional.len());
        payload.extend_from_slice(call);
        payload.extend_from_slice(&extra);
        payload.extend_from_slice(&additional);
        let signature = if payload.len() > MAX_UNHASHED_PAYLOAD {
            signer.sign(&blake2_256(&payload))
        } else {
            signer.sign(&payload)
        };

        let mut body = vec![EXTRINSIC_V4_SIGNED];
        self.encode_address(&signer.account_id(), &mut body);
        body.push(SR25519);
        body.extend_from_slice(&signature);
        body.extend_from_slice(&extra);
        body.extend_from_slice(call);

        let mut out = Vec::with_capacity(body.len() + 4);
        Compact(body.len() as u32).encode_to(&mut out);
        out.extend_from_slice(&body);
        out
    }
}

fn encode_weight(layout: ExecResultLayout, gas: Weight, out: &mut Vec<u8>) {
    Compact(gas.ref_time).encode_to(out);
    if layout == ExecResultLayout::WeightV2 {
        Compact(gas.proof_size).encode_to(out);
    }
}

// ── Transaction status ───────────────────────────────────────────────

/// One `author_extrinsicUpdate` notification, reduced to what matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    /// Included; carries the block hash.
    InBlock(String),
    Rejected(ContractCallError),
}

impl TxStatus {
    pub fn from_update(update: &Value) -> Self {
        let rejected = |name: &str, docs: &str| {
            TxStatus::Rejected(ContractCallError {
                name: name.into(),
                docs: docs.into(),
            })
        };
        match update {
            Value::String(s) if s == "invalid" => {
                rejected("Invalid", "the transaction pool rejected the extrinsic")
            }
            Value::String(s) if s == "dropped" => {
                rejected("Dropped", "the transaction pool dropped the extrinsic")
            }
            Value::Object(map) => {
                let block = map
                    .get("inBlock")
                    .or_else(|| map.get("finalized"))
                    .and_then(Value::as_str);
                if let Some(block) = block {
                    TxStatus::InBlock(block.to_string())
                } else if map.contains_key("usurped") {
                    rejected("Usurped", "another extrinsic with the same nonce replaced it")
                } else if map.contains_key("finalityTimeout") {
                    rejected("FinalityTimeout", "the including block was not finalized in time")
                } else {
                    TxStatus::Pending
                }
            }
            _ => TxStatus::Pending,
        }
    }
}

#[cfg(test)]
impl ExtrinsicFormat {
    /// The layout of an Aleph Zero runtime: contracts at pallet 7,
    /// `call` = 6, `instantiate` = 8.
    pub(crate) fn aleph_like() -> Self {
        let mut errors = HashMap::new();
        errors.insert(
            (7, 11),
            (
                "ContractTrapped".to_string(),
                "Contract trapped during execution.".to_string(),
            ),
        );
        Self {
            contracts_pallet: 7,
            call_index: 6,
            instantiate_index: 8,
            multi_address: true,
            extensions: vec![
                SignedExtension::Empty("CheckNonZeroSender".into()),
                SignedExtension::SpecVersion,
                SignedExtension::TxVersion,
                SignedExtension::Genesis,
                SignedExtension::Mortality,
                SignedExtension::Nonce,
                SignedExtension::Empty("CheckWeight".into()),
                SignedExtension::Tip,
            ],
            errors,
        }
    }
}
