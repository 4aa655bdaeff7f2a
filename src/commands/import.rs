//! `uptimectl import` - track an existing remote resource

use anyhow::{Context as AnyhowContext, Result, bail};
use reconcile::{ContactResource, MonitorResource, Reconciler, ResourceKind, StatusPageResource};
use uptimekit::Backend;

use super::backend;
use crate::Context;
use crate::kinds::{Managed, record, tracked_id};
use crate::state::StateStore;
use crate::ui;

pub fn run(ctx: &Context, kind: ResourceKind, name: &str, id: &str) -> Result<()> {
    let backend = backend(ctx)?;
    let mut store = StateStore::load(&ctx.state)?;

    match kind {
        ResourceKind::Contact => import::<ContactResource>(&backend, &mut store, name, id)?,
        ResourceKind::Monitor => import::<MonitorResource>(&backend, &mut store, name, id)?,
        ResourceKind::StatusPage => import::<StatusPageResource>(&backend, &mut store, name, id)?,
    }

    store.save(&ctx.state)?;
    ui::success(&format!("Imported {kind} {id} as {kind}.{name}"));
    ui::dim("Add a matching manifest entry, then run `uptimectl plan` to check for drift");
    Ok(())
}

fn import<R: Managed>(backend: &dyn Backend, store: &mut StateStore, name: &str, id: &str) -> Result<()> {
    if let Some(existing) = tracked_id::<R>(store, name)
        && existing != id
    {
        bail!("{}.{} already tracks {}", R::KIND, name, existing);
    }
    if let Some(entry) = R::tracked(store).get(id)
        && entry.name != name
    {
        bail!("{} {} is already tracked as {}.{}", R::KIND, id, R::KIND, entry.name);
    }

    let state = Reconciler::<R>::new(backend)
        .lookup(id)
        .with_context(|| format!("Failed to import {} {}", R::KIND, id))?;
    record::<R>(store, name, None, Some(state));
    Ok(())
}
