// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! # farm-admin-sdk
//!
//! Client library for administering **farm** ink! contracts on Aleph Zero
//! and other Substrate chains running `pallet-contracts`, together with the
//! PSP22 reward tokens they pay out and the wrapped native token (wAZERO).
//!
//! ## Crate layout
//!
//! | Module | Purpose |
//! |---|---|
//! | [`address`] | SS58 address validation against the connected chain |
//! | [`schedule`] | Reward schedule checks before a farm is started |
//! | [`metadata`] | ink! ABI loading, call encoding, return value decoding |
//! | [`call`] | Typed constructor/message calls for each contract |
//! | [`gateway`] | WebSocket JSON-RPC session, dry runs, extrinsic submission |
//! | [`extrinsic`] | Signed `Contracts` extrinsics from runtime metadata |
//! | [`identity`] | sr25519 keys from seed phrases, throwaway dry-run origins |
//! | [`contract`] | Deploy, invoke and read |
//! | [`dispatch`] | Command → contract call sequences |
//!
//! ## Typical integration flow
//!
//! ```rust,no_run
//! use farm_admin_sdk::contract::{Operator, ValueTransfer};
//! use farm_admin_sdk::dispatch::{Command, Config, Dispatcher};
//! use farm_admin_sdk::gateway::{Endpoint, Gateway};
//! use farm_admin_sdk::metadata::MetadataPaths;
//! use farm_admin_sdk::SigningIdentity;
//!
//! struct AlwaysYes;
//! impl Operator for AlwaysYes {
//!     fn confirm(&mut self, _t: &ValueTransfer) -> bool { true }
//! }
//!
//! # async fn example() -> farm_admin_sdk::AdminResult<()> {
//! let config = Config {
//!     endpoint: Endpoint::resolve("testnet")?,
//!     metadata: MetadataPaths {
//!         farm: "artifacts/farm_contract.json".into(),
//!         psp22: "artifacts/psp22.json".into(),
//!         wrapped: "artifacts/wrapped_azero.json".into(),
//!     },
//! };
//! let command = Command::WrapAzero { amount: 1_000_000_000_000, address: None };
//!
//! // 1. Validate and load metadata before touching the network
//! let mut dispatcher = Dispatcher::new(&config);
//! dispatcher.prepare(&command)?;
//!
//! // 2. Connect and run
//! let mut gateway = Gateway::connect(config.endpoint.clone()).await?;
//! let identity = SigningIdentity::from_phrase("//Alice")?;
//! let report = dispatcher
//!     .run(&mut gateway, &mut AlwaysYes, &command, Some(&identity))
//!     .await?;
//! println!("{report:?}");
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod call;
pub mod chain;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod exec_result;
pub mod extrinsic;
pub mod gateway;
pub mod identity;
pub mod metadata;
pub mod rpc;
pub mod schedule;

pub use address::ChainAddress;
pub use error::{AdminError, AdminResult, ContractCallError};
pub use identity::SigningIdentity;
