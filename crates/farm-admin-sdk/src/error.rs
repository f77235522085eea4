// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed errors for every farm-admin operation.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("invalid endpoint `{0}`: expected ws:// or wss:// (or one of local, testnet, mainnet)")]
    InvalidEndpoint(String),

    #[error("connection: {0}")]
    ConnectionError(String),

    #[error("unsupported runtime: {0}")]
    UnsupportedRuntime(String),

    #[error("metadata file not found: {}", .0.display())]
    MetadataNotFound(PathBuf),

    #[error("metadata {}: {reason}", path.display())]
    MetadataParseError { path: PathBuf, reason: String },

    #[error("contract `{contract}` has no {kind} `{label}` matching the expected signature")]
    UnknownCall {
        contract: String,
        kind: &'static str,
        label: String,
    },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("reward schedule: {0}")]
    ScheduleError(String),

    #[error("no contract address given and chain `{0}` has no well-known wrapped token")]
    MissingAddress(String),

    #[error("`{0}` submits a transaction and needs a seed phrase")]
    MissingSigner(&'static str),

    #[error("invalid seed phrase: {0}")]
    InvalidSeed(String),

    #[error("deployment failed: {0}")]
    DeploymentError(String),

    #[error("{0}")]
    ContractCallError(ContractCallError),

    #[error("query failed: {0}")]
    QueryError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Chain-reported rejection of a submitted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallError {
    pub name: String,
    pub docs: String,
}

impl std::fmt::Display for ContractCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.docs.is_empty() {
            write!(f, "contract call failed: {}", self.name)
        } else {
            write!(f, "contract call failed: {} ({})", self.name, self.docs)
        }
    }
}

impl From<ContractCallError> for AdminError {
    fn from(e: ContractCallError) -> Self {
        AdminError::ContractCallError(e)
    }
}

pub type AdminResult<T> = Result<T, AdminError>;
