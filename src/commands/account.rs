//! `uptimectl account` - plan and usage

use anyhow::{Context as AnyhowContext, Result};
use uptimekit::Backend;

use super::backend;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let backend = backend(ctx)?;
    let account = backend.get_account().context("Failed to fetch account")?;

    ui::header("Account");
    ui::kv("Id", &account.id);
    ui::kv("Email", &account.email);
    ui::kv("Plan", &account.current_plan);
    ui::kv(
        "Monitors",
        &format!("{} of {}", account.monitors_count, account.monitors_limit),
    );

    ui::section("Status");
    ui::kv("Up", &account.up_monitors.to_string());
    ui::kv("Down", &account.down_monitors.to_string());
    ui::kv("Paused", &account.paused_monitors.to_string());
    Ok(())
}
