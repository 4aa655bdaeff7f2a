//! `uptimectl refresh` - sync tracked state with the service

use anyhow::Result;
use reconcile::{ContactResource, MonitorResource, StatusPageResource};

use super::{backend, refresh_kind};
use crate::Context;
use crate::state::StateStore;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("Refreshing State");

    let mut store = StateStore::load(&ctx.state)?;
    if store.is_empty() {
        ui::info("Nothing is tracked");
        return Ok(());
    }

    let backend = backend(ctx)?;
    let mut gone = refresh_kind::<ContactResource>(&backend, &mut store)?;
    gone.extend(refresh_kind::<MonitorResource>(&backend, &mut store)?);
    gone.extend(refresh_kind::<StatusPageResource>(&backend, &mut store)?);
    store.save(&ctx.state)?;

    for name in &gone {
        ui::warn(&format!("{name} no longer exists and was dropped from state"));
    }
    ui::success(&format!("Refreshed {} resources", store.len()));
    Ok(())
}
