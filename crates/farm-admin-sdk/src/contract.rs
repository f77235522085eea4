// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Deploy, invoke and read contracts.
//!
//! These are the three ways the dispatcher touches a contract. Each takes
//! the chain as a [`ContractChain`] so the same code drives a live
//! [`Gateway`](crate::gateway::Gateway) and the test fakes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::address::ChainAddress;
use crate::call::Call;
use crate::chain::{CallRequest, ContractChain, DryRunRequest, InstantiateRequest, Receipt, Weight};
use crate::error::{AdminError, AdminResult};
use crate::identity::{EphemeralOrigin, SigningIdentity};
use crate::metadata::ContractMetadata;

/// Fixed gas budget for instantiation.
pub const DEPLOY_GAS: Weight = Weight {
    ref_time: 100_000_000_000,
    proof_size: 2_000_000,
};

/// Salt derived from the current time, so repeated deployments of the
/// same code with the same arguments land at distinct addresses.
pub fn deployment_salt() -> Vec<u8> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    nanos.to_le_bytes().to_vec()
}

/// A native-token transfer awaiting the operator's approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTransfer {
    pub raw: u128,
    pub human: String,
    pub symbol: String,
    pub contract: ChainAddress,
    pub method: &'static str,
}

impl std::fmt::Display for ValueTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} will transfer {} {} ({} raw) to {}",
            self.method, self.human, self.symbol, self.raw, self.contract
        )
    }
}

/// The person running the tool.
///
/// Asked before any call that moves native tokens, and told what is about
/// to be submitted.
pub trait Operator {
    /// `true` only on explicit approval.
    fn confirm(&mut self, transfer: &ValueTransfer) -> bool;

    fn announce(&mut self, _description: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Submitted(Receipt),
    /// The operator declined; nothing was sent.
    Cancelled,
}

/// Decoded return value of a read, or `None` if execution produced none.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult(pub Option<Value>);

pub async fn deploy<C, O>(
    chain: &mut C,
    operator: &mut O,
    identity: &SigningIdentity,
    metadata: &ContractMetadata,
    call: &Call,
) -> AdminResult<ChainAddress>
where
    C: ContractChain + ?Sized,
    O: Operator + ?Sized,
{
    let encoded = metadata.encode(call)?;
    operator.announce(&format!("Deploying {} with {}", metadata.name(), call.describe()));

    let address = chain
        .instantiate(InstantiateRequest {
            identity,
            metadata,
            call,
            encoded: &encoded,
            code_hash: metadata.source_hash_bytes(),
            salt: deployment_salt(),
            gas_limit: DEPLOY_GAS,
        })
        .await
        .map_err(|e| match e {
            AdminError::ContractCallError(c) => AdminError::DeploymentError(c.to_string()),
            other => other,
        })?;

    tracing::info!(contract = %address, code_hash = metadata.source_hash(), "deployed");
    Ok(address)
}

/// Submit a state-changing message. A non-zero `value` is only sent after
/// the operator confirms it.
pub async fn invoke<C, O>(
    chain: &mut C,
    operator: &mut O,
    identity: &SigningIdentity,
    metadata: &ContractMetadata,
    contract: &ChainAddress,
    call: &Call,
    value: u128,
) -> AdminResult<Outcome>
where
    C: ContractChain + ?Sized,
    O: Operator + ?Sized,
{
    let encoded = metadata.encode(call)?;

    if value > 0 {
        if !encoded.payable {
            tracing::warn!(method = call.label(), "sending value to a non-payable message");
        }
        let props = chain.properties();
        let transfer = ValueTransfer {
            raw: value,
            human: props.to_human(value),
            symbol: props.token_symbol.clone(),
            contract: contract.clone(),
            method: call.label(),
        };
        if !operator.confirm(&transfer) {
            tracing::info!(method = call.label(), "cancelled by operator");
            return Ok(Outcome::Cancelled);
        }
    }

    operator.announce(&format!("Calling {} on {contract}", call.describe()));
    let receipt = chain
        .call(CallRequest {
            identity,
            metadata,
            contract,
            call,
            encoded: &encoded,
            value,
            gas_limit: None,
        })
        .await?;

    tracing::info!(
        contract = %contract,
        method = receipt.method,
        extrinsic = %receipt.extrinsic,
        "submitted"
    );
    Ok(Outcome::Submitted(receipt))
}

/// Dry-run a message from a throwaway origin and decode what it returns.
pub async fn read<C>(
    chain: &mut C,
    metadata: &ContractMetadata,
    contract: &ChainAddress,
    call: &Call,
) -> AdminResult<QueryResult>
where
    C: ContractChain + ?Sized,
{
    let encoded = metadata.encode(call)?;
    let origin = EphemeralOrigin::generate();
    let ss58 = chain.properties().ss58_format;
    tracing::debug!(origin = %origin.address(ss58), method = call.label(), "dry run");

    let outcome = chain
        .dry_run(DryRunRequest {
            origin: origin.account_id(),
            contract,
            input: &encoded.data,
            value: 0,
        })
        .await?;

    if outcome.reverted {
        tracing::warn!(method = call.label(), "execution reverted");
    }
    let Some(data) = outcome.data else {
        let error = outcome
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".into());
        tracing::warn!(method = call.label(), %error, "dry run returned no data");
        return Ok(QueryResult(None));
    };

    let value = metadata.decode_return(call.label(), &data, ss58)?;
    Ok(QueryResult(Some(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::{deployed_address, RecordingChain, Seen};
    use crate::metadata::fixtures;
    use parity_scale_codec::Encode;

    struct Scripted {
        answer: bool,
        asked: Vec<ValueTransfer>,
        announced: Vec<String>,
    }

    impl Scripted {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                asked: vec![],
                announced: vec![],
            }
        }
    }

    impl Operator for Scripted {
        fn confirm(&mut self, transfer: &ValueTransfer) -> bool {
            self.asked.push(transfer.clone());
            self.answer
        }

        fn announce(&mut self, description: &str) {
            self.announced.push(description.to_string());
        }
    }

    fn meta(json: String) -> ContractMetadata {
        ContractMetadata::from_json("fixture.json", &json).unwrap()
    }

    fn addr(b: u8) -> ChainAddress {
        ChainAddress::from_account_id([b; 32], 42)
    }

    fn alice() -> SigningIdentity {
        SigningIdentity::from_phrase("//Alice").unwrap()
    }

    #[tokio::test]
    async fn deploy_announces_and_returns_address() {
        let farm = meta(fixtures::farm());
        let mut chain = RecordingChain::default();
        let mut op = Scripted::answering(true);
        let call = Call::FarmNew {
            pool_id: addr(1),
            reward_tokens: vec![addr(2)],
        };

        let address = deploy(&mut chain, &mut op, &alice(), &farm, &call).await.unwrap();
        assert_eq!(address, deployed_address());
        assert!(op.announced[0].starts_with("Deploying farm_contract with new(pool_id: "));
        match &chain.seen[0] {
            Seen::Instantiate { label, data } => {
                assert_eq!(*label, "new");
                assert_eq!(&data[..4], &[0x9b, 0xae, 0x9d, 0x5e]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn deploy_rejection_is_deployment_error() {
        let farm = meta(fixtures::farm());
        let mut chain = RecordingChain {
            reject: Some("new"),
            ..Default::default()
        };
        let call = Call::FarmNew {
            pool_id: addr(1),
            reward_tokens: vec![],
        };
        let err = deploy(&mut chain, &mut Scripted::answering(true), &alice(), &farm, &call)
            .await
            .unwrap_err();
        match err {
            AdminError::DeploymentError(reason) => assert!(reason.contains("CodeNotFound")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn value_transfer_needs_confirmation() {
        let wrapped = meta(fixtures::wrapped());
        let mut chain = RecordingChain::default();
        let mut op = Scripted::answering(false);

        let out = invoke(
            &mut chain,
            &mut op,
            &alice(),
            &wrapped,
            &addr(7),
            &Call::WrappedDeposit,
            1_500_000_000_000,
        )
        .await
        .unwrap();

        assert_eq!(out, Outcome::Cancelled);
        assert!(chain.seen.is_empty());
        assert_eq!(op.asked[0].human, "1.5");
        assert_eq!(op.asked[0].symbol, "AZERO");
        assert_eq!(op.asked[0].method, "deposit");
    }

    #[tokio::test]
    async fn confirmed_transfer_is_submitted_with_value() {
        let wrapped = meta(fixtures::wrapped());
        let mut chain = RecordingChain::default();
        let out = invoke(
            &mut chain,
            &mut Scripted::answering(true),
            &alice(),
            &wrapped,
            &addr(7),
            &Call::WrappedDeposit,
            10,
        )
        .await
        .unwrap();

        assert!(matches!(out, Outcome::Submitted(ref r) if r.method == "deposit"));
        assert_eq!(
            chain.seen,
            vec![Seen::Call {
                contract: addr(7),
                label: "deposit",
                value: 10
            }]
        );
    }

    #[tokio::test]
    async fn zero_value_skips_confirmation() {
        let farm = meta(fixtures::farm());
        let mut chain = RecordingChain::default();
        let mut op = Scripted::answering(false);
        let out = invoke(&mut chain, &mut op, &alice(), &farm, &addr(3), &Call::FarmStop, 0)
            .await
            .unwrap();
        assert!(matches!(out, Outcome::Submitted(_)));
        assert!(op.asked.is_empty());
    }

    #[tokio::test]
    async fn chain_rejection_keeps_name_and_docs() {
        let farm = meta(fixtures::farm());
        let mut chain = RecordingChain {
            reject: Some("owner_stop_farm"),
            ..Default::default()
        };
        let err = invoke(
            &mut chain,
            &mut Scripted::answering(true),
            &alice(),
            &farm,
            &addr(3),
            &Call::FarmStop,
            0,
        )
        .await
        .unwrap_err();
        match err {
            AdminError::ContractCallError(e) => {
                assert_eq!(e.name, "ContractReverted");
                assert!(e.docs.contains("revert its storage"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_decodes_return_value() {
        let farm = meta(fixtures::farm());
        let mut bytes = vec![0u8];
        [1u8; 32].encode_to(&mut bytes);
        5u64.encode_to(&mut bytes);
        9u64.encode_to(&mut bytes);
        Vec::<[u8; 32]>::new().encode_to(&mut bytes);
        Vec::<u128>::new().encode_to(&mut bytes);

        let mut chain = RecordingChain {
            dry_run_data: Some(bytes),
            ..Default::default()
        };
        let QueryResult(value) = read(&mut chain, &farm, &addr(3), &Call::FarmDetails)
            .await
            .unwrap();
        let value = value.unwrap();
        assert_eq!(value["start"], 5);
        assert_eq!(value["end"], 9);
        assert_eq!(value["pool_id"], addr(1).to_string());

        match &chain.seen[0] {
            Seen::DryRun { contract, input } => {
                assert_eq!(contract, &addr(3));
                assert_eq!(input, &vec![0x55, 0x66, 0x77, 0x88]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_without_data_is_empty() {
        let farm = meta(fixtures::farm());
        let mut chain = RecordingChain::default();
        let out = read(&mut chain, &farm, &addr(3), &Call::FarmDetails).await.unwrap();
        assert_eq!(out, QueryResult(None));
    }

    #[tokio::test]
    async fn read_transport_failure_is_query_error() {
        let farm = meta(fixtures::farm());
        let mut chain = RecordingChain {
            reject: Some("dry_run"),
            ..Default::default()
        };
        let err = read(&mut chain, &farm, &addr(3), &Call::FarmDetails).await.unwrap_err();
        assert!(matches!(err, AdminError::QueryError(_)));
    }

    #[test]
    fn salts_differ_between_deployments() {
        let a = deployment_salt();
        std::thread::sleep(std::time::Duration::from_millis(1));
        assert_ne!(a, deployment_salt());
        assert_eq!(a.len(), 16);
    }
}
