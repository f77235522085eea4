// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed constructor and message calls for the contracts this tool drives.
//!
//! Each [`Call`] variant carries exactly the arguments its ink! signature
//! takes, in declaration order. The metadata resolver checks the names
//! against the ABI before encoding.

use parity_scale_codec::Encode;

use crate::address::ChainAddress;

/// A single typed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Account(ChainAddress),
    U64(u64),
    U128(u128),
    Accounts(Vec<ChainAddress>),
    U128s(Vec<u128>),
}

/// Shape of an argument as seen by the type registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    Account,
    U64,
    U128,
    Sequence(&'static ArgShape),
}

impl Arg {
    pub fn shape(&self) -> ArgShape {
        match self {
            Arg::Account(_) => ArgShape::Account,
            Arg::U64(_) => ArgShape::U64,
            Arg::U128(_) => ArgShape::U128,
            Arg::Accounts(_) => ArgShape::Sequence(&ArgShape::Account),
            Arg::U128s(_) => ArgShape::Sequence(&ArgShape::U128),
        }
    }

    /// SCALE-encode onto `out`.
    pub fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            Arg::Account(a) => a.account_id().encode_to(out),
            Arg::U64(v) => v.encode_to(out),
            Arg::U128(v) => v.encode_to(out),
            Arg::Accounts(list) => {
                let ids: Vec<[u8; 32]> = list.iter().map(|a| *a.account_id()).collect();
                ids.encode_to(out);
            }
            Arg::U128s(list) => list.encode_to(out),
        }
    }

    /// Human-readable form used in progress messages.
    pub fn render(&self) -> String {
        match self {
            Arg::Account(a) => a.to_string(),
            Arg::U64(v) => v.to_string(),
            Arg::U128(v) => v.to_string(),
            Arg::Accounts(list) => render_list(list.iter().map(|a| a.to_string())),
            Arg::U128s(list) => render_list(list.iter().map(|v| v.to_string())),
        }
    }
}

fn render_list(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(", "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Constructor,
    Message,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Constructor => "constructor",
            CallKind::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FarmNew {
        pool_id: ChainAddress,
        reward_tokens: Vec<ChainAddress>,
    },
    FarmStart {
        start: u64,
        end: u64,
        rewards: Vec<u128>,
    },
    FarmStop,
    FarmWithdraw {
        token: ChainAddress,
    },
    FarmAddRewardToken {
        token: ChainAddress,
    },
    FarmDetails,
    IncreaseAllowance {
        spender: ChainAddress,
        delta_value: u128,
    },
    WrappedDeposit,
}

impl Call {
    /// ABI label of the constructor or message.
    pub fn label(&self) -> &'static str {
        match self {
            Call::FarmNew { .. } => "new",
            Call::FarmStart { .. } => "owner_start_new_farm",
            Call::FarmStop => "owner_stop_farm",
            Call::FarmWithdraw { .. } => "owner_withdraw_token",
            Call::FarmAddRewardToken { .. } => "owner_add_reward_token",
            Call::FarmDetails => "view_farm_details",
            Call::IncreaseAllowance { .. } => "PSP22::increase_allowance",
            Call::WrappedDeposit => "deposit",
        }
    }

    pub fn kind(&self) -> CallKind {
        match self {
            Call::FarmNew { .. } => CallKind::Constructor,
            _ => CallKind::Message,
        }
    }

    pub fn args(&self) -> Vec<(&'static str, Arg)> {
        match self {
            Call::FarmNew {
                pool_id,
                reward_tokens,
            } => vec![
                ("pool_id", Arg::Account(pool_id.clone())),
                ("reward_tokens", Arg::Accounts(reward_tokens.clone())),
            ],
            Call::FarmStart {
                start,
                end,
                rewards,
            } => vec![
                ("start", Arg::U64(*start)),
                ("end", Arg::U64(*end)),
                ("rewards", Arg::U128s(rewards.clone())),
            ],
            Call::FarmWithdraw { token } | Call::FarmAddRewardToken { token } => {
                vec![("token", Arg::Account(token.clone()))]
            }
            Call::IncreaseAllowance {
                spender,
                delta_value,
            } => vec![
                ("spender", Arg::Account(spender.clone())),
                ("delta_value", Arg::U128(*delta_value)),
            ],
            Call::FarmStop | Call::FarmDetails | Call::WrappedDeposit => vec![],
        }
    }

    /// Human-readable `label(name: value, ...)`.
    pub fn describe(&self) -> String {
        let args: Vec<String> = self
            .args()
            .iter()
            .map(|(name, arg)| format!("{name}: {}", arg.render()))
            .collect();
        format!("{}({})", self.label(), args.join(", "))
    }
}
