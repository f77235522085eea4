// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Reward schedule checks run before a farm is started.
//!
//! A farm pays `amount / (end - start)` of each reward token per
//! millisecond, so any funded token must provide at least one unit per
//! millisecond of the window.

use crate::error::{AdminError, AdminResult};

pub fn validate_reward_schedule<T: AsRef<str>>(
    start: u64,
    end: u64,
    tokens: &[T],
    amounts: &[u128],
) -> AdminResult<()> {
    if tokens.len() != amounts.len() {
        return Err(AdminError::ScheduleError(format!(
            "{} reward tokens but {} reward amounts",
            tokens.len(),
            amounts.len()
        )));
    }

    if end <= start {
        return Err(AdminError::ScheduleError(format!(
            "end ({end}) must be after start ({start})"
        )));
    }

    let duration = (end - start) as u128;
    for (token, &amount) in tokens.iter().zip(amounts) {
        if amount > 0 && amount < duration {
            return Err(AdminError::ScheduleError(format!(
                "reward {amount} for {} is below the farm duration of {duration} ms; \
                 rewards per millisecond would round to zero",
                token.as_ref()
            )));
        }
    }
    Ok(())
}
