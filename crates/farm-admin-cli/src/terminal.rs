use std::io::{self, BufRead, Write};

use colored::Colorize;
use farm_admin_sdk::contract::{Operator, ValueTransfer};

use crate::output;

/// The only answer that approves a value transfer.
pub const CONFIRM_TOKEN: &str = "y";

/// Exact match after dropping the line terminator.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim_end_matches(&['\r', '\n'][..]) == CONFIRM_TOKEN
}

/// Operator on the controlling terminal.
pub struct Terminal;

impl Operator for Terminal {
    fn confirm(&mut self, transfer: &ValueTransfer) -> bool {
        output::value_transfer(transfer);
        let question = format!(
            "Send {} {}? [{CONFIRM_TOKEN}/N]",
            transfer.human, transfer.symbol
        );
        eprint!("{} ", question.bold());
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }

    fn announce(&mut self, description: &str) {
        output::info(description);
    }
}

/// Seed phrase from the flag or environment, else a hidden prompt.
pub fn read_phrase(given: Option<String>) -> anyhow::Result<String> {
    if let Some(phrase) = given {
        return Ok(phrase);
    }
    let phrase = rpassword::prompt_password("Seed phrase: ")
        .map_err(|e| anyhow::anyhow!("failed to read seed phrase: {e}"))?;
    if phrase.trim().is_empty() {
        anyhow::bail!("no seed phrase given");
    }
    Ok(phrase)
}
