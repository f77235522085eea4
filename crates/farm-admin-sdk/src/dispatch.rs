// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Command dispatch.
//!
//! Maps one validated [`Command`] to the deploy/invoke/read calls it needs.
//! Everything that can be checked without the chain (reward schedule,
//! wrapped-token address, signer presence) is checked before the first
//! network round trip; addresses are checked against the connected chain's
//! format before the first submission.

use crate::address::{validate_addresses, ChainAddress};
use crate::call::Call;
use crate::chain::{ContractChain, Receipt};
use crate::contract::{self, Operator, Outcome, QueryResult};
use crate::error::{AdminError, AdminResult};
use crate::gateway::{Endpoint, Network};
use crate::identity::SigningIdentity;
use crate::metadata::{ContractKind, MetadataPaths, MetadataSet};
use crate::schedule::validate_reward_schedule;

/// wAZERO on Aleph Zero testnet.
pub const TESTNET_WRAPPED_AZERO: &str = "5EFDb7mKbougLtr5dnwd5KDfZ3wK55JPGPLiryKq4uRMPR46";
/// wAZERO on Aleph Zero mainnet.
pub const MAINNET_WRAPPED_AZERO: &str = "5CtuFVgEUz13SFPVY6s2cZrnLDEkxQXc19aXrNARwEBeCXgg";

/// Everything fixed for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Endpoint,
    pub metadata: MetadataPaths,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        pool: String,
        reward_tokens: Vec<String>,
    },
    Details {
        farm: String,
    },
    Start {
        farm: String,
        start: u64,
        end: u64,
        tokens: Vec<String>,
        rewards: Vec<u128>,
    },
    Stop {
        farm: String,
    },
    Withdraw {
        farm: String,
        token: String,
    },
    AddRewardToken {
        farm: String,
        token: String,
    },
    IncreaseAllowance {
        farm: String,
        token: String,
        amount: u128,
    },
    WrapAzero {
        amount: u128,
        address: Option<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Details { .. } => "details",
            Command::Start { .. } => "start",
            Command::Stop { .. } => "stop",
            Command::Withdraw { .. } => "withdraw",
            Command::AddRewardToken { .. } => "add-reward-token",
            Command::IncreaseAllowance { .. } => "increase-allowance",
            Command::WrapAzero { .. } => "wrap-azero",
        }
    }

    /// Read-only commands never ask for a seed phrase.
    pub fn needs_signer(&self) -> bool {
        !matches!(self, Command::Details { .. })
    }

    /// Metadata the command encodes against.
    pub fn contract_kinds(&self) -> &'static [ContractKind] {
        match self {
            Command::Start { .. } => &[ContractKind::Psp22, ContractKind::Farm],
            Command::IncreaseAllowance { .. } => &[ContractKind::Psp22],
            Command::WrapAzero { .. } => &[ContractKind::WrappedNative],
            _ => &[ContractKind::Farm],
        }
    }

    /// Checks that need no chain connection.
    pub fn validate_offline(&self, network: Network) -> AdminResult<()> {
        match self {
            Command::Start {
                start,
                end,
                tokens,
                rewards,
                ..
            } => validate_reward_schedule(*start, *end, tokens, rewards),
            Command::WrapAzero { address, .. } => {
                resolve_wrapped_address(network, address.as_deref()).map(|_| ())
            }
            _ => Ok(()),
        }
    }
}

/// The explicit address if given, else the well-known wAZERO deployment.
pub fn resolve_wrapped_address(network: Network, explicit: Option<&str>) -> AdminResult<String> {
    match (explicit, network) {
        (Some(addr), _) => Ok(addr.to_string()),
        (None, Network::Testnet) => Ok(TESTNET_WRAPPED_AZERO.to_string()),
        (None, Network::Mainnet) => Ok(MAINNET_WRAPPED_AZERO.to_string()),
        (None, other) => Err(AdminError::MissingAddress(other.as_str().to_string())),
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Deployed(ChainAddress),
    /// Every extrinsic submitted, in order.
    Submitted(Vec<Receipt>),
    Cancelled,
    Query(QueryResult),
}

impl From<Outcome> for Report {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Submitted(receipt) => Report::Submitted(vec![receipt]),
            Outcome::Cancelled => Report::Cancelled,
        }
    }
}

pub struct Dispatcher {
    network: Network,
    metadata: MetadataSet,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            network: config.endpoint.network(),
            metadata: MetadataSet::new(config.metadata.clone()),
        }
    }

    /// Offline validation plus loading every metadata file `command` needs,
    /// so a bad path aborts before the chain is contacted.
    pub fn prepare(&mut self, command: &Command) -> AdminResult<()> {
        command.validate_offline(self.network)?;
        self.metadata.preload(command.contract_kinds())
    }

    pub async fn run<C, O>(
        &mut self,
        chain: &mut C,
        operator: &mut O,
        command: &Command,
        identity: Option<&SigningIdentity>,
    ) -> AdminResult<Report>
    where
        C: ContractChain + ?Sized,
        O: Operator + ?Sized,
    {
        self.prepare(command)?;
        let signer = || identity.ok_or(AdminError::MissingSigner(command.name()));
        if command.needs_signer() {
            signer()?;
        }

        let ss58 = chain.properties().ss58_format;
        tracing::debug!(command = command.name(), "dispatching");

        match command {
            Command::Create {
                pool,
                reward_tokens,
            } => {
                let call = Call::FarmNew {
                    pool_id: ChainAddress::parse(pool, ss58)?,
                    reward_tokens: validate_addresses(ss58, reward_tokens)?,
                };
                let farm = self.metadata.get(ContractKind::Farm)?;
                let address = contract::deploy(chain, operator, signer()?, &farm, &call).await?;
                Ok(Report::Deployed(address))
            }

            Command::Details { farm } => {
                let farm = ChainAddress::parse(farm, ss58)?;
                let meta = self.metadata.get(ContractKind::Farm)?;
                let result = contract::read(chain, &meta, &farm, &Call::FarmDetails).await?;
                Ok(Report::Query(result))
            }

            Command::Start {
                farm,
                start,
                end,
                tokens,
                rewards,
            } => {
                let farm = ChainAddress::parse(farm, ss58)?;
                let tokens = validate_addresses(ss58, tokens)?;
                let psp22 = self.metadata.get(ContractKind::Psp22)?;
                let farm_meta = self.metadata.get(ContractKind::Farm)?;
                let identity = signer()?;

                let mut receipts = Vec::with_capacity(tokens.len() + 1);
                for (token, &amount) in tokens.iter().zip(rewards) {
                    let call = Call::IncreaseAllowance {
                        spender: farm.clone(),
                        delta_value: amount,
                    };
                    match contract::invoke(chain, operator, identity, &psp22, token, &call, 0).await? {
                        Outcome::Submitted(r) => receipts.push(r),
                        Outcome::Cancelled => return Ok(Report::Cancelled),
                    }
                }

                let call = Call::FarmStart {
                    start: *start,
                    end: *end,
                    rewards: rewards.clone(),
                };
                match contract::invoke(chain, operator, identity, &farm_meta, &farm, &call, 0).await? {
                    Outcome::Submitted(r) => receipts.push(r),
                    Outcome::Cancelled => return Ok(Report::Cancelled),
                }
                Ok(Report::Submitted(receipts))
            }

            Command::Stop { farm } => {
                let farm = ChainAddress::parse(farm, ss58)?;
                let meta = self.metadata.get(ContractKind::Farm)?;
                contract::invoke(chain, operator, signer()?, &meta, &farm, &Call::FarmStop, 0)
                    .await
                    .map(Report::from)
            }

            Command::Withdraw { farm, token } => {
                let farm = ChainAddress::parse(farm, ss58)?;
                let call = Call::FarmWithdraw {
                    token: ChainAddress::parse(token, ss58)?,
                };
                let meta = self.metadata.get(ContractKind::Farm)?;
                contract::invoke(chain, operator, signer()?, &meta, &farm, &call, 0)
                    .await
                    .map(Report::from)
            }

            Command::AddRewardToken { farm, token } => {
                let farm = ChainAddress::parse(farm, ss58)?;
                let call = Call::FarmAddRewardToken {
                    token: ChainAddress::parse(token, ss58)?,
                };
                let meta = self.metadata.get(ContractKind::Farm)?;
                contract::invoke(chain, operator, signer()?, &meta, &farm, &call, 0)
                    .await
                    .map(Report::from)
            }

            Command::IncreaseAllowance {
                farm,
                token,
                amount,
            } => {
                let call = Call::IncreaseAllowance {
                    spender: ChainAddress::parse(farm, ss58)?,
                    delta_value: *amount,
                };
                let token = ChainAddress::parse(token, ss58)?;
                let meta = self.metadata.get(ContractKind::Psp22)?;
                contract::invoke(chain, operator, signer()?, &meta, &token, &call, 0)
                    .await
                    .map(Report::from)
            }

            Command::WrapAzero { amount, address } => {
                let wrapped = resolve_wrapped_address(self.network, address.as_deref())?;
                let wrapped = ChainAddress::parse(&wrapped, ss58)?;
                let meta = self.metadata.get(ContractKind::WrappedNative)?;
                contract::invoke(
                    chain,
                    operator,
                    signer()?,
                    &meta,
                    &wrapped,
                    &Call::WrappedDeposit,
                    *amount,
                )
                .await
                .map(Report::from)
            }
        }
    }
}
