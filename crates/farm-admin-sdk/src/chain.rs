// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! The seam between contract operations and the chain.
//!
//! [`Gateway`](crate::gateway::Gateway) is the production implementation;
//! tests substitute a recording fake.

use async_trait::async_trait;

use crate::address::ChainAddress;
use crate::call::Call;
use crate::error::AdminResult;
use crate::exec_result::DispatchFailure;
use crate::gateway::ChainProperties;
use crate::identity::SigningIdentity;
use crate::metadata::{ContractMetadata, EncodedCall};

/// Execution weight: reference time (picoseconds) and proof size (bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weight {
    pub ref_time: u64,
    pub proof_size: u64,
}

pub struct InstantiateRequest<'a> {
    pub identity: &'a SigningIdentity,
    pub metadata: &'a ContractMetadata,
    pub call: &'a Call,
    pub encoded: &'a EncodedCall,
    pub code_hash: [u8; 32],
    pub salt: Vec<u8>,
    pub gas_limit: Weight,
}

pub struct CallRequest<'a> {
    pub identity: &'a SigningIdentity,
    pub metadata: &'a ContractMetadata,
    pub contract: &'a ChainAddress,
    pub call: &'a Call,
    pub encoded: &'a EncodedCall,
    pub value: u128,
    /// `None` estimates gas with a dry run from the signer.
    pub gas_limit: Option<Weight>,
}

pub struct DryRunRequest<'a> {
    /// Caller account id.
    pub origin: &'a [u8; 32],
    pub contract: &'a ChainAddress,
    pub input: &'a [u8],
    pub value: u128,
}

/// What a dry run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunOutcome {
    /// Raw return bytes; `None` when execution failed before returning.
    pub data: Option<Vec<u8>>,
    pub reverted: bool,
    /// Dispatch error reported by the runtime, if any.
    pub error: Option<DispatchFailure>,
    pub gas_required: Weight,
}

/// Outcome of an accepted state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// `0x`-prefixed blake2-256 hash of the signed extrinsic.
    pub extrinsic: String,
    /// Hash of the block that included it.
    pub block: String,
    pub contract: ChainAddress,
    pub method: &'static str,
}

#[async_trait]
pub trait ContractChain: Send {
    fn properties(&self) -> &ChainProperties;

    async fn instantiate(&mut self, req: InstantiateRequest<'_>) -> AdminResult<ChainAddress>;

    async fn call(&mut self, req: CallRequest<'_>) -> AdminResult<Receipt>;

    async fn dry_run(&mut self, req: DryRunRequest<'_>) -> AdminResult<DryRunOutcome>;
}
