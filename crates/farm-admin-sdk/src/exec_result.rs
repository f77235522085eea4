// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! `ContractsApi_call` / `ContractsApi_instantiate` input encoding and
//! result decoding.
//!
//! The layout of `ContractExecResult` depends on the runtime: API version 1
//! used a plain `u64` weight, later versions a two-dimensional weight of
//! compact integers. [`ExecResultLayout`] is registered on the gateway at
//! connect time and selects the right decoder.

use parity_scale_codec::{Compact, Decode, Encode};

use crate::chain::{DryRunOutcome, Weight};
use crate::error::{AdminError, AdminResult};

/// Runtime type override for contract execution results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecResultLayout {
    WeightV1,
    WeightV2,
}

impl ExecResultLayout {
    pub fn for_api_version(version: u32) -> Self {
        if version < 2 {
            ExecResultLayout::WeightV1
        } else {
            ExecResultLayout::WeightV2
        }
    }
}

/// Gas ceiling passed to v1 runtimes, which have no "use block maximum" option.
const V1_DRY_RUN_GAS: u64 = 250_000_000_000;

/// Build the `ContractsApi_call` argument tuple.
pub fn encode_call_input(
    layout: ExecResultLayout,
    origin: &[u8; 32],
    dest: &[u8; 32],
    value: u128,
    input: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    origin.encode_to(&mut out);
    dest.encode_to(&mut out);
    value.encode_to(&mut out);
    match layout {
        ExecResultLayout::WeightV1 => V1_DRY_RUN_GAS.encode_to(&mut out),
        ExecResultLayout::WeightV2 => None::<(Compact<u64>, Compact<u64>)>.encode_to(&mut out),
    }
    None::<u128>.encode_to(&mut out);
    input.encode_to(&mut out);
    out
}

/// Build the `ContractsApi_instantiate` argument tuple for code already on chain.
pub fn encode_instantiate_input(
    layout: ExecResultLayout,
    origin: &[u8; 32],
    value: u128,
    gas_limit: Weight,
    code_hash: &[u8; 32],
    input: &[u8],
    salt: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    origin.encode_to(&mut out);
    value.encode_to(&mut out);
    match layout {
        ExecResultLayout::WeightV1 => gas_limit.ref_time.encode_to(&mut out),
        ExecResultLayout::WeightV2 => {
            Some((Compact(gas_limit.ref_time), Compact(gas_limit.proof_size))).encode_to(&mut out)
        }
    }
    None::<u128>.encode_to(&mut out);
    out.push(CODE_EXISTING);
    code_hash.encode_to(&mut out);
    input.encode_to(&mut out);
    salt.encode_to(&mut out);
    out
}

/// `Code::Existing(hash)`; index 0 uploads a wasm blob instead.
const CODE_EXISTING: u8 = 1;

#[derive(Decode)]
#[allow(dead_code)]
enum StorageDeposit {
    Refund(u128),
    Charge(u128),
}

#[derive(Decode)]
struct ExecReturnValue {
    flags: u32,
    data: Vec<u8>,
}

#[derive(Decode)]
struct InstantiateReturnValue {
    result: ExecReturnValue,
    account_id: [u8; 32],
}

#[derive(Debug, Decode)]
struct ModuleError {
    index: u8,
    error: [u8; 4],
}

#[derive(Debug, Decode)]
#[allow(dead_code)]
enum DispatchError {
    Other,
    CannotLookup,
    BadOrigin,
    Module(ModuleError),
    ConsumerRemaining,
    NoProviders,
    TooManyConsumers,
    Token(u8),
    Arithmetic(u8),
    Transactional(u8),
    Exhausted,
    Corruption,
    Unavailable,
    RootNotAllowed,
}

/// Why the runtime refused to execute a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchFailure {
    /// Pallet error, named through the runtime metadata.
    Module { index: u8, error: [u8; 4] },
    Other(String),
}

impl From<DispatchError> for DispatchFailure {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Module(m) => DispatchFailure::Module {
                index: m.index,
                error: m.error,
            },
            other => DispatchFailure::Other(format!("{other:?}")),
        }
    }
}

impl std::fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchFailure::Module { index, error } => {
                write!(f, "Module(index: {index}, error: 0x{})", hex::encode(error))
            }
            DispatchFailure::Other(name) => f.write_str(name),
        }
    }
}

/// Reverted flag in `ExecReturnValue::flags`.
const FLAG_REVERT: u32 = 1;

fn decode_weight(
    layout: ExecResultLayout,
    input: &mut &[u8],
) -> Result<Weight, parity_scale_codec::Error> {
    match layout {
        ExecResultLayout::WeightV1 => Ok(Weight {
            ref_time: u64::decode(input)?,
            proof_size: 0,
        }),
        ExecResultLayout::WeightV2 => Ok(Weight {
            ref_time: <Compact<u64>>::decode(input)?.0,
            proof_size: <Compact<u64>>::decode(input)?.0,
        }),
    }
}

fn decode_err(e: parity_scale_codec::Error) -> AdminError {
    AdminError::QueryError(format!("cannot decode contract execution result: {e}"))
}

/// Fields shared by call and instantiate results, up to `result`.
fn decode_prefix(layout: ExecResultLayout, input: &mut &[u8]) -> AdminResult<Weight> {
    let _gas_consumed = decode_weight(layout, input).map_err(decode_err)?;
    let gas_required = decode_weight(layout, input).map_err(decode_err)?;
    let _deposit = StorageDeposit::decode(input).map_err(decode_err)?;
    let debug_message = Vec::<u8>::decode(input).map_err(decode_err)?;

    if !debug_message.is_empty() {
        tracing::debug!(message = %String::from_utf8_lossy(&debug_message), "contract debug output");
    }
    Ok(gas_required)
}

fn outcome(result: Result<ExecReturnValue, DispatchError>, gas_required: Weight) -> DryRunOutcome {
    match result {
        Ok(ret) => DryRunOutcome {
            reverted: ret.flags & FLAG_REVERT != 0,
            data: Some(ret.data),
            error: None,
            gas_required,
        },
        Err(e) => DryRunOutcome {
            data: None,
            reverted: false,
            error: Some(e.into()),
            gas_required,
        },
    }
}

/// Decode a `ContractExecResult`. Trailing fields (events) are ignored.
pub fn decode_exec_result(layout: ExecResultLayout, bytes: &[u8]) -> AdminResult<DryRunOutcome> {
    let input = &mut &bytes[..];
    let gas_required = decode_prefix(layout, input)?;
    let result = Result::<ExecReturnValue, DispatchError>::decode(input).map_err(decode_err)?;
    Ok(outcome(result, gas_required))
}

/// A dry-run instantiation: the execution outcome and, on success, the
/// address the contract would get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiateDryRun {
    pub outcome: DryRunOutcome,
    pub account_id: Option<[u8; 32]>,
}

/// Decode a `ContractInstantiateResult`.
pub fn decode_instantiate_result(
    layout: ExecResultLayout,
    bytes: &[u8],
) -> AdminResult<InstantiateDryRun> {
    let input = &mut &bytes[..];
    let gas_required = decode_prefix(layout, input)?;
    let result =
        Result::<InstantiateReturnValue, DispatchError>::decode(input).map_err(decode_err)?;
    Ok(match result {
        Ok(ret) => InstantiateDryRun {
            outcome: outcome(Ok(ret.result), gas_required),
            account_id: Some(ret.account_id),
        },
        Err(e) => InstantiateDryRun {
            outcome: outcome(Err(e), gas_required),
            account_id: None,
        },
    })
}
