//! `uptimectl list` - remote resources of one kind

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use reconcile::{ContactResource, MonitorResource, Reconciler, ResourceKind, StatusPageResource};
use uptimekit::Backend;

use super::backend;
use crate::Context;
use crate::kinds::Managed;
use crate::state::StateStore;
use crate::ui;

pub fn run(ctx: &Context, kind: ResourceKind) -> Result<()> {
    let backend = backend(ctx)?;
    let store = StateStore::load(&ctx.state)?;

    match kind {
        ResourceKind::Contact => list::<ContactResource>(&backend, &store),
        ResourceKind::Monitor => list::<MonitorResource>(&backend, &store),
        ResourceKind::StatusPage => list::<StatusPageResource>(&backend, &store),
    }
}

fn list<R: Managed>(backend: &dyn Backend, store: &StateStore) -> Result<()> {
    let states = Reconciler::<R>::new(backend)
        .list()
        .with_context(|| format!("Failed to list {}", R::KIND.plural()))?;

    ui::header(&format!("Remote {} ({})", R::KIND.plural(), states.len()));
    let tracked = R::tracked(store);

    for state in &states {
        let id = R::id(state);
        let managed = tracked
            .get(id)
            .map(|entry| format!(" [{}.{}]", R::KIND, entry.name).green().to_string())
            .unwrap_or_default();
        println!(
            "  {} {}{}",
            ui::truncate(R::name(state), 40).bold(),
            format!("({id})").dimmed(),
            managed
        );
        ui::dim(&format!("  {}", R::summary(state)));
    }
    Ok(())
}
