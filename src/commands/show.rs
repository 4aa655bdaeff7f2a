//! `uptimectl show` - print tracked state

use anyhow::Result;
use colored::Colorize;
use reconcile::{ContactResource, MonitorResource, StatusPageResource};

use crate::Context;
use crate::kinds::Managed;
use crate::state::StateStore;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let store = StateStore::load(&ctx.state)?;

    ui::header("Tracked Resources");
    ui::kv("State", &ctx.state.display().to_string());
    ui::kv("Last updated", &store.last_updated.to_rfc3339());

    if store.is_empty() {
        println!();
        ui::info("Nothing is tracked");
        return Ok(());
    }

    show_kind::<ContactResource>(ctx, &store);
    show_kind::<MonitorResource>(ctx, &store);
    show_kind::<StatusPageResource>(ctx, &store);
    Ok(())
}

fn show_kind<R: Managed>(ctx: &Context, store: &StateStore) {
    let tracked = R::tracked(store);
    if tracked.is_empty() {
        return;
    }

    ui::section(&format!("{} ({})", R::KIND.plural(), tracked.len()));
    for (id, entry) in tracked {
        println!(
            "  {} {} {}",
            "•".cyan(),
            entry.name.bold(),
            format!("({id})").dimmed()
        );
        ui::dim(&format!("  {}", R::summary(&entry.state)));
        ui::dim(&format!("  created {}", ui::format_timestamp(R::created_at(&entry.state))));

        // Debug output redacts credentials
        if ctx.verbose > 0 {
            for line in format!("{:#?}", entry.state).lines() {
                ui::dim(&format!("    {line}"));
            }
        }
    }
}
