//! `uptimectl destroy` - delete every tracked resource

use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{ContactResource, ExecuteSummary, MonitorResource, StatusPageResource};
use uptimekit::Backend;

use super::apply::confirm_proceed;
use super::{backend, converge_all, print_summary, tracked_instances};
use crate::Context;
use crate::cli::DestroyArgs;
use crate::kinds::Managed;
use crate::state::StateStore;
use crate::ui;

pub fn run(ctx: &Context, args: &DestroyArgs) -> Result<()> {
    ui::header("Destroying Resources");

    let mut store = StateStore::load(&ctx.state)?;
    if store.is_empty() {
        ui::info("Nothing is tracked");
        return Ok(());
    }

    ui::section("To delete");
    list_tracked::<StatusPageResource>(&store);
    list_tracked::<MonitorResource>(&store);
    list_tracked::<ContactResource>(&store);
    println!();

    if !args.yes && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    let backend = backend(ctx)?;
    let mut summary = ExecuteSummary::default();
    summary.merge(&destroy_kind::<StatusPageResource>(ctx, &backend, &mut store, args.jobs)?);
    summary.merge(&destroy_kind::<MonitorResource>(ctx, &backend, &mut store, args.jobs)?);
    summary.merge(&destroy_kind::<ContactResource>(ctx, &backend, &mut store, args.jobs)?);

    print_summary(&summary);
    if !summary.is_success() {
        bail!("{} resources failed to delete", summary.failed);
    }
    Ok(())
}

fn list_tracked<R: Managed>(store: &StateStore) {
    for (id, entry) in R::tracked(store) {
        println!("  {} {}.{} {}", "-".red(), R::KIND, entry.name, format!("({id})").dimmed());
    }
}

fn destroy_kind<R: Managed>(
    ctx: &Context,
    backend: &dyn Backend,
    store: &mut StateStore,
    jobs: usize,
) -> Result<ExecuteSummary> {
    let batch = tracked_instances::<R>(store);
    if batch.is_empty() {
        return Ok(ExecuteSummary::default());
    }
    let summary = converge_all(ctx, backend, store, batch, jobs)?;
    store.save(&ctx.state)?;
    Ok(summary)
}
