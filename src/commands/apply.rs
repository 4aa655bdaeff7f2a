//! `uptimectl apply` - converge the service onto the manifest
//!
//! Creates and updates run contacts, then monitors, then status pages so
//! references resolve to ids created earlier in the same run. Deletions run
//! afterwards in reverse order. State is saved after every kind.

use anyhow::{Result, bail};
use colored::Colorize;
use dialoguer::Confirm;
use reconcile::{ContactResource, ExecuteSummary, MonitorResource, StatusPageResource};
use uptimekit::Backend;

use super::plan::{print_plan_summary, refresh_all, render};
use super::{Instance, backend, converge_all, instances, print_summary};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::kinds::Managed;
use crate::manifest::Manifest;
use crate::state::StateStore;
use crate::ui;

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    ui::header("Applying Configuration");

    let manifest = Manifest::load(&ctx.manifest)?;
    let mut store = StateStore::load(&ctx.state)?;
    let backend = backend(ctx)?;

    refresh_all(&backend, &mut store)?;
    let plan = render(&manifest, &store)?;
    print_plan_summary(&plan);

    if !plan.has_changes() {
        store.save(&ctx.state)?;
        return Ok(());
    }

    if !args.yes && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    println!();
    let mut summary = ExecuteSummary::default();

    summary.merge(&upsert::<ContactResource>(ctx, &backend, &mut store, &manifest, args.jobs)?);
    summary.merge(&upsert::<MonitorResource>(ctx, &backend, &mut store, &manifest, args.jobs)?);
    summary.merge(&upsert::<StatusPageResource>(ctx, &backend, &mut store, &manifest, args.jobs)?);

    summary.merge(&prune::<StatusPageResource>(ctx, &backend, &mut store, &manifest, args.jobs)?);
    summary.merge(&prune::<MonitorResource>(ctx, &backend, &mut store, &manifest, args.jobs)?);
    summary.merge(&prune::<ContactResource>(ctx, &backend, &mut store, &manifest, args.jobs)?);

    print_summary(&summary);

    if !summary.is_success() {
        bail!("{} resources failed to apply", summary.failed);
    }
    Ok(())
}

fn upsert<R: Managed>(
    ctx: &Context,
    backend: &dyn Backend,
    store: &mut StateStore,
    manifest: &Manifest,
    jobs: usize,
) -> Result<ExecuteSummary> {
    let declared: Vec<Instance<R>> = instances::<R>(manifest, store)
        .into_iter()
        .filter(|instance| instance.desired.is_some())
        .collect();
    run_and_save(ctx, backend, store, declared, jobs)
}

fn prune<R: Managed>(
    ctx: &Context,
    backend: &dyn Backend,
    store: &mut StateStore,
    manifest: &Manifest,
    jobs: usize,
) -> Result<ExecuteSummary> {
    let orphaned: Vec<Instance<R>> = instances::<R>(manifest, store)
        .into_iter()
        .filter(|instance| instance.desired.is_none())
        .collect();
    run_and_save(ctx, backend, store, orphaned, jobs)
}

fn run_and_save<R: Managed>(
    ctx: &Context,
    backend: &dyn Backend,
    store: &mut StateStore,
    batch: Vec<Instance<R>>,
    jobs: usize,
) -> Result<ExecuteSummary> {
    if batch.is_empty() {
        return Ok(ExecuteSummary::default());
    }
    let summary = converge_all(ctx, backend, store, batch, jobs)?;
    store.save(&ctx.state)?;
    Ok(summary)
}

/// Confirm with user
pub fn confirm_proceed() -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}
