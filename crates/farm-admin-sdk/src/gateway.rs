// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Connection to a chain node.
//!
//! The [`Gateway`] owns the WebSocket JSON-RPC session for one invocation
//! and is the only thing that talks to the node. Connecting negotiates the
//! chain's address format and token decimals and registers the runtime type
//! override needed to decode contract execution results. Signed calls are
//! dry-run from the signer first, then built and signed locally
//! ([`crate::extrinsic`]) and submitted with `author_submitAndWatchExtrinsic`
//! on the same session.
//!
//! ```rust,no_run
//! use farm_admin_sdk::chain::ContractChain;
//! use farm_admin_sdk::gateway::{Endpoint, Gateway};
//!
//! # async fn example() -> farm_admin_sdk::error::AdminResult<()> {
//! let endpoint = Endpoint::resolve("testnet")?;
//! let gateway = Gateway::connect(endpoint).await?;
//! println!("{} (ss58 {})", gateway.chain_name(), gateway.properties().ss58_format);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::address::ChainAddress;
use crate::chain::{
    CallRequest, ContractChain, DryRunOutcome, DryRunRequest, InstantiateRequest, Receipt,
};
use crate::error::{AdminError, AdminResult, ContractCallError};
use crate::exec_result::{
    decode_exec_result, decode_instantiate_result, encode_call_input, encode_instantiate_input,
    DispatchFailure, ExecResultLayout,
};
use crate::extrinsic::{extrinsic_hash, ExtrinsicFormat, SigningParams, TxStatus};
use crate::identity::SigningIdentity;
use crate::metadata::ContractMetadata;
use crate::rpc::{
    parse_frame, subscription_id, subscription_update, Frame, JsonRpcError, JsonRpcRequest,
};

pub const LOCAL_URL: &str = "ws://127.0.0.1:9944";
pub const TESTNET_URL: &str = "wss://ws.test.azero.dev";
pub const MAINNET_URL: &str = "wss://ws.azero.dev";

/// `blake2_64("ContractsApi")`
const CONTRACTS_API_ID: &str = "0x68b66ba122c93fa7";

const RPC_TIMEOUT: Duration = Duration::from_secs(30);
/// How long a submitted extrinsic may take to reach a block.
const INCLUSION_TIMEOUT: Duration = Duration::from_secs(120);

// ── Endpoint ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Local,
    Testnet,
    Mainnet,
    Custom,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Local => "local",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    network: Network,
}

impl Endpoint {
    /// Expand `local`, `testnet` and `mainnet`; pass anything else through.
    pub fn resolve(alias: &str) -> AdminResult<Self> {
        let (url, network) = match alias {
            "local" => (LOCAL_URL.to_string(), Network::Local),
            "testnet" => (TESTNET_URL.to_string(), Network::Testnet),
            "mainnet" => (MAINNET_URL.to_string(), Network::Mainnet),
            other => (other.to_string(), Network::Custom),
        };
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(AdminError::InvalidEndpoint(alias.to_string()));
        }
        Ok(Self { url, network })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

// ── Chain properties ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainProperties {
    pub ss58_format: u16,
    pub token_decimals: u32,
    pub token_symbol: String,
}

impl Default for ChainProperties {
    fn default() -> Self {
        Self {
            ss58_format: 42,
            token_decimals: 12,
            token_symbol: "AZERO".into(),
        }
    }
}

impl ChainProperties {
    /// Read a `system_properties` reply. Missing fields keep their defaults;
    /// multi-token chains report arrays and the first entry is used.
    pub fn from_rpc(value: &Value) -> Self {
        fn first(v: Option<&Value>) -> Option<&Value> {
            match v {
                Some(Value::Array(items)) => items.first(),
                other => other,
            }
        }

        let mut props = Self::default();
        if let Some(f) = value
            .get("ss58Format")
            .and_then(Value::as_u64)
            .and_then(|f| u16::try_from(f).ok())
        {
            props.ss58_format = f;
        }
        if let Some(d) = first(value.get("tokenDecimals"))
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok())
        {
            props.token_decimals = d;
        }
        if let Some(s) = first(value.get("tokenSymbol")).and_then(Value::as_str) {
            props.token_symbol = s.to_string();
        }
        props
    }

    /// Raw balance in the chain's display unit, e.g. `1500000000000` → `1.5`.
    /// Decimals too large for a `u128` factor fall back to the raw amount.
    pub fn to_human(&self, raw: u128) -> String {
        let Some(factor) = 10u128.checked_pow(self.token_decimals) else {
            return raw.to_string();
        };
        let whole = raw / factor;
        let frac = raw % factor;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0width$}", frac, width = self.token_decimals as usize);
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

// ── Runtime type overrides ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeTypes {
    pub spec_version: u32,
    pub transaction_version: u32,
    pub contracts_api_version: u32,
    pub exec_result: ExecResultLayout,
}

impl RuntimeTypes {
    /// Negotiate from a `state_getRuntimeVersion` reply.
    pub fn negotiate(runtime_version: &Value) -> AdminResult<Self> {
        let version_field = |key: &str| {
            runtime_version
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| AdminError::ConnectionError(format!("runtime version lacks {key}")))
        };
        let spec_version = version_field("specVersion")?;
        let transaction_version = version_field("transactionVersion")?;

        let apis = runtime_version
            .get("apis")
            .and_then(Value::as_array)
            .ok_or_else(|| AdminError::ConnectionError("runtime version lists no APIs".into()))?;

        let version = apis
            .iter()
            .filter_map(Value::as_array)
            .find(|pair| pair.first().and_then(Value::as_str) == Some(CONTRACTS_API_ID))
            .and_then(|pair| pair.get(1))
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                AdminError::ConnectionError("runtime does not expose the ContractsApi".into())
            })?;

        Ok(Self {
            spec_version,
            transaction_version,
            contracts_api_version: version,
            exec_result: ExecResultLayout::for_api_version(version),
        })
    }
}

// ── Gateway ──────────────────────────────────────────────────────────

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct Gateway {
    endpoint: Endpoint,
    socket: Socket,
    next_id: u64,
    chain: String,
    properties: ChainProperties,
    types: RuntimeTypes,
    /// Fetched on the first signed call.
    format: Option<Arc<ExtrinsicFormat>>,
    genesis_hash: Option<[u8; 32]>,
}

impl Gateway {
    pub async fn connect(endpoint: Endpoint) -> AdminResult<Self> {
        let (socket, _) = tokio::time::timeout(
            RPC_TIMEOUT,
            tokio_tungstenite::connect_async(endpoint.url()),
        )
        .await
        .map_err(|_| AdminError::ConnectionError(format!("timed out connecting to {endpoint}")))?
        .map_err(|e| AdminError::ConnectionError(format!("{endpoint}: {e}")))?;

        let mut gateway = Self {
            endpoint,
            socket,
            next_id: 1,
            chain: String::new(),
            properties: ChainProperties::default(),
            types: RuntimeTypes {
                spec_version: 0,
                transaction_version: 0,
                contracts_api_version: 0,
                exec_result: ExecResultLayout::WeightV2,
            },
            format: None,
            genesis_hash: None,
        };

        gateway.chain = gateway
            .rpc("system_chain", serde_json::json!([]))
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let props = gateway.rpc("system_properties", serde_json::json!([])).await?;
        gateway.properties = ChainProperties::from_rpc(&props);
        let version = gateway
            .rpc("state_getRuntimeVersion", serde_json::json!([]))
            .await?;
        gateway.types = RuntimeTypes::negotiate(&version)?;

        tracing::info!(
            chain = %gateway.chain,
            endpoint = %gateway.endpoint,
            ss58 = gateway.properties.ss58_format,
            spec_version = gateway.types.spec_version,
            contracts_api = gateway.types.contracts_api_version,
            "connected"
        );
        Ok(gateway)
    }

    pub fn chain_name(&self) -> &str {
        &self.chain
    }

    /// Issue one JSON-RPC request and wait for its reply.
    pub async fn rpc(&mut self, method: &str, params: Value) -> AdminResult<Value> {
        self.request(method, params)
            .await?
            .map_err(|e| AdminError::ConnectionError(format!("{method}: {e}")))
    }

    /// Like [`Gateway::rpc`], but a JSON-RPC error object is handed back
    /// instead of becoming a connection error.
    async fn request(
        &mut self,
        method: &str,
        params: Value,
    ) -> AdminResult<Result<Value, JsonRpcError>> {
        let id = self.next_id;
        self.next_id += 1;

        let text = serde_json::to_string(&JsonRpcRequest::new(id, method, params))
            .map_err(|e| AdminError::Other(e.into()))?;
        tracing::debug!(%method, id, "rpc request");

        self.socket
            .send(Message::Text(text))
            .await
            .map_err(|e| AdminError::ConnectionError(format!("{method}: {e}")))?;

        tokio::time::timeout(RPC_TIMEOUT, self.await_reply(method, id))
            .await
            .map_err(|_| AdminError::ConnectionError(format!("{method}: no reply within {RPC_TIMEOUT:?}")))?
    }

    /// Next text frame, or `None` once the node closes the session.
    async fn next_text(&mut self, context: &str) -> AdminResult<Option<String>> {
        while let Some(msg) = self.socket.next().await {
            let msg = msg.map_err(|e| AdminError::ConnectionError(format!("{context}: {e}")))?;
            match msg {
                Message::Text(t) => return Ok(Some(t)),
                Message::Close(_) => break,
                _ => continue,
            }
        }
        Ok(None)
    }

    fn closed(&self, context: &str) -> AdminError {
        AdminError::ConnectionError(format!("{context}: connection closed by {}", self.endpoint))
    }

    async fn await_reply(
        &mut self,
        method: &str,
        id: u64,
    ) -> AdminResult<Result<Value, JsonRpcError>> {
        while let Some(text) = self.next_text(method).await? {
            match parse_frame(&text, id) {
                Ok(Frame::Reply(reply)) => return Ok(reply),
                Ok(Frame::Unrelated) => continue,
                Err(e) => tracing::debug!(error = %e, "ignoring malformed frame"),
            }
        }
        Err(self.closed(method))
    }

    /// Run a runtime API function against the best block.
    pub async fn state_call(&mut self, function: &str, data: &[u8]) -> AdminResult<Vec<u8>> {
        let params = serde_json::json!([function, format!("0x{}", hex::encode(data))]);
        let reply = self
            .rpc("state_call", params)
            .await
            .map_err(|e| AdminError::QueryError(e.to_string()))?;
        decode_hex_reply("state_call", &reply).map_err(AdminError::QueryError)
    }

    async fn extrinsic_format(&mut self) -> AdminResult<Arc<ExtrinsicFormat>> {
        if let Some(format) = &self.format {
            return Ok(format.clone());
        }
        let reply = self.rpc("state_getMetadata", serde_json::json!([])).await?;
        let bytes = decode_hex_reply("state_getMetadata", &reply).map_err(AdminError::ConnectionError)?;
        let format = Arc::new(ExtrinsicFormat::from_metadata(&bytes)?);
        self.format = Some(format.clone());
        Ok(format)
    }

    async fn genesis_hash(&mut self) -> AdminResult<[u8; 32]> {
        if let Some(hash) = self.genesis_hash {
            return Ok(hash);
        }
        let reply = self.rpc("chain_getBlockHash", serde_json::json!([0])).await?;
        let hash: [u8; 32] = decode_hex_reply("chain_getBlockHash", &reply)
            .map_err(AdminError::ConnectionError)?
            .try_into()
            .map_err(|_| AdminError::ConnectionError(format!("genesis hash {reply} is not 32 bytes")))?;
        self.genesis_hash = Some(hash);
        Ok(hash)
    }

    /// Turn a failed or reverted pre-flight dry run into the error the
    /// extrinsic would have hit on chain.
    async fn reject_failed_dry_run(
        &mut self,
        outcome: &DryRunOutcome,
        metadata: &ContractMetadata,
        label: &str,
    ) -> AdminResult<()> {
        if let Some(failure) = &outcome.error {
            let error = match failure {
                DispatchFailure::Module { index, error } => {
                    self.extrinsic_format().await?.module_error(*index, *error)
                }
                DispatchFailure::Other(name) => ContractCallError {
                    name: name.clone(),
                    docs: String::new(),
                },
            };
            return Err(error.into());
        }
        if outcome.reverted {
            let docs = match outcome.data.as_deref() {
                Some(data) => metadata
                    .decode_return(label, data, self.properties.ss58_format)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|_| format!("0x{}", hex::encode(data))),
                None => String::new(),
            };
            return Err(ContractCallError {
                name: "ContractReverted".into(),
                docs,
            }
            .into());
        }
        Ok(())
    }

    /// Sign `call`, submit it and wait until a block includes it.
    /// Returns the extrinsic hash and the block hash.
    async fn submit(
        &mut self,
        identity: &SigningIdentity,
        call: &[u8],
    ) -> AdminResult<(String, String)> {
        let format = self.extrinsic_format().await?;
        let genesis_hash = self.genesis_hash().await?;
        let signer = identity.address(self.properties.ss58_format);
        let nonce_reply = self
            .rpc("system_accountNextIndex", serde_json::json!([signer.as_str()]))
            .await?;
        let nonce = nonce_reply.as_u64().ok_or_else(|| {
            AdminError::ConnectionError(format!("system_accountNextIndex returned {nonce_reply}"))
        })?;

        let params = SigningParams {
            spec_version: self.types.spec_version,
            transaction_version: self.types.transaction_version,
            genesis_hash,
            nonce,
        };
        let extrinsic = format.sign(call, identity, &params);
        let hash = extrinsic_hash(&extrinsic);
        tracing::debug!(%hash, %signer, nonce, "submitting extrinsic");

        let hex_xt = format!("0x{}", hex::encode(&extrinsic));
        let subscription = match self
            .request("author_submitAndWatchExtrinsic", serde_json::json!([hex_xt]))
            .await?
        {
            Ok(reply) => subscription_id(&reply).ok_or_else(|| {
                AdminError::ConnectionError(format!("unexpected subscription id {reply}"))
            })?,
            Err(e) => {
                return Err(ContractCallError {
                    name: "InvalidTransaction".into(),
                    docs: e.to_string(),
                }
                .into())
            }
        };

        let block = tokio::time::timeout(INCLUSION_TIMEOUT, self.await_inclusion(&subscription))
            .await
            .map_err(|_| {
                AdminError::ConnectionError(format!(
                    "extrinsic {hash} not included within {INCLUSION_TIMEOUT:?}"
                ))
            })??;
        tracing::info!(%hash, %block, "included");
        Ok((hash, block))
    }

    async fn await_inclusion(&mut self, subscription: &str) -> AdminResult<String> {
        const CONTEXT: &str = "author_submitAndWatchExtrinsic";
        while let Some(text) = self.next_text(CONTEXT).await? {
            let Some(update) = subscription_update(&text, subscription) else {
                continue;
            };
            match TxStatus::from_update(&update) {
                TxStatus::Pending => tracing::debug!(status = %update, "extrinsic status"),
                TxStatus::InBlock(block) => return Ok(block),
                TxStatus::Rejected(e) => return Err(e.into()),
            }
        }
        Err(self.closed(CONTEXT))
    }
}

fn decode_hex_reply(method: &str, reply: &Value) -> Result<Vec<u8>, String> {
    let hex_str = reply
        .as_str()
        .ok_or_else(|| format!("{method} returned {reply}"))?;
    hex::decode(hex_str.trim_start_matches("0x"))
        .map_err(|e| format!("{method} returned bad hex: {e}"))
}

#[async_trait]
impl ContractChain for Gateway {
    fn properties(&self) -> &ChainProperties {
        &self.properties
    }

    async fn instantiate(&mut self, req: InstantiateRequest<'_>) -> AdminResult<ChainAddress> {
        let layout = self.types.exec_result;
        let signer = req.identity.account_id();
        let input = encode_instantiate_input(
            layout,
            &signer,
            0,
            req.gas_limit,
            &req.code_hash,
            &req.encoded.data,
            &req.salt,
        );
        let bytes = self.state_call("ContractsApi_instantiate", &input).await?;
        let dry_run = decode_instantiate_result(layout, &bytes)?;
        self.reject_failed_dry_run(&dry_run.outcome, req.metadata, req.call.label())
            .await?;
        let account = dry_run.account_id.ok_or_else(|| {
            AdminError::DeploymentError("dry run returned no contract address".into())
        })?;

        let format = self.extrinsic_format().await?;
        let call = format.contracts_instantiate(
            layout,
            0,
            req.gas_limit,
            &req.code_hash,
            &req.encoded.data,
            &req.salt,
        );
        let (extrinsic, block) = self.submit(req.identity, &call).await?;

        let address = ChainAddress::from_account_id(account, self.properties.ss58_format);
        tracing::info!(contract = %address, %extrinsic, %block, "instantiated");
        Ok(address)
    }

    async fn call(&mut self, req: CallRequest<'_>) -> AdminResult<Receipt> {
        let layout = self.types.exec_result;
        let gas_limit = match req.gas_limit {
            Some(gas) => gas,
            None => {
                let input = encode_call_input(
                    layout,
                    &req.identity.account_id(),
                    req.contract.account_id(),
                    req.value,
                    &req.encoded.data,
                );
                let bytes = self.state_call("ContractsApi_call", &input).await?;
                let outcome = decode_exec_result(layout, &bytes)?;
                self.reject_failed_dry_run(&outcome, req.metadata, req.call.label())
                    .await?;
                outcome.gas_required
            }
        };

        let format = self.extrinsic_format().await?;
        let call = format.contracts_call(
            layout,
            req.contract.account_id(),
            req.value,
            gas_limit,
            &req.encoded.data,
        );
        let (extrinsic, block) = self.submit(req.identity, &call).await?;
        Ok(Receipt {
            extrinsic,
            block,
            contract: req.contract.clone(),
            method: req.call.label(),
        })
    }

    async fn dry_run(&mut self, req: DryRunRequest<'_>) -> AdminResult<DryRunOutcome> {
        let layout = self.types.exec_result;
        let input = encode_call_input(
            layout,
            req.origin,
            req.contract.account_id(),
            req.value,
            req.input,
        );
        let bytes = self.state_call("ContractsApi_call", &input).await?;
        decode_exec_result(layout, &bytes)
    }
}
