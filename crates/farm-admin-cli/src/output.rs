use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use farm_admin_sdk::chain::Receipt;
use farm_admin_sdk::contract::ValueTransfer;
use indicatif::{ProgressBar, ProgressStyle};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn success(msg: &str) {
    if !is_json() {
        eprintln!("{}", msg.green());
    }
}

pub fn warn(msg: &str) {
    if !is_json() {
        eprintln!("{}", msg.yellow());
    }
}

/// Errors are shown in JSON mode too; there is no machine-readable error channel.
pub fn error_msg(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn info(msg: &str) {
    if !is_json() {
        eprintln!("{}", msg);
    }
}

pub fn label(key: &str, val: &str) {
    if !is_json() {
        eprintln!("{} {}", format!("{}:", key).bold(), val);
    }
}

pub fn receipt(r: &Receipt) {
    success(&format!("{} submitted", r.method));
    label("  contract", r.contract.as_str());
    label("  extrinsic", &r.extrinsic);
    label("  block", &r.block);
}

/// Shown before the confirmation question.
pub fn value_transfer(t: &ValueTransfer) {
    label("method", t.method);
    label("contract", t.contract.as_str());
    label(
        "value",
        &format!("{} {} ({} raw)", t.human, t.symbol.cyan(), t.raw),
    );
}

pub fn json_output(value: serde_json::Value) {
    match serde_json::to_string_pretty(&value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}

pub fn spinner(msg: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

pub fn fail_with_hint(error: impl std::fmt::Display, hint: &str) -> anyhow::Error {
    anyhow::anyhow!("{}\n{} {}", error, "hint:".bold(), hint)
}
