//! `uptimectl plan` - preview what apply would change

use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{ContactResource, MonitorResource, PlanSummary, StatusPageResource, plan};

use super::{Instance, backend, instances, refresh_kind};
use crate::Context;
use crate::kinds::Managed;
use crate::manifest::Manifest;
use crate::state::StateStore;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("Uptime Plan");

    let manifest = Manifest::load(&ctx.manifest)?;
    let mut store = StateStore::load(&ctx.state)?;
    let backend = backend(ctx)?;

    refresh_all(&backend, &mut store)?;
    let summary = render(&manifest, &store)?;
    print_plan_summary(&summary);
    Ok(())
}

/// Refresh every tracked kind in memory, reporting what disappeared
pub fn refresh_all(backend: &dyn uptimekit::Backend, store: &mut StateStore) -> Result<()> {
    let mut gone = refresh_kind::<ContactResource>(backend, store)?;
    gone.extend(refresh_kind::<MonitorResource>(backend, store)?);
    gone.extend(refresh_kind::<StatusPageResource>(backend, store)?);
    for name in gone {
        ui::warn(&format!("{name} no longer exists remotely"));
    }
    Ok(())
}

/// Print the per-instance plan for every kind. Fails if any instance cannot
/// be planned.
pub fn render(manifest: &Manifest, store: &StateStore) -> Result<PlanSummary> {
    let mut summary = PlanSummary::default();
    let mut errors = 0;

    render_kind(&instances::<ContactResource>(manifest, store), &mut summary, &mut errors);
    render_kind(&instances::<MonitorResource>(manifest, store), &mut summary, &mut errors);
    render_kind(&instances::<StatusPageResource>(manifest, store), &mut summary, &mut errors);

    if errors > 0 {
        bail!("{errors} resources have configuration errors");
    }
    Ok(summary)
}

fn render_kind<R: Managed>(instances: &[Instance<R>], summary: &mut PlanSummary, errors: &mut usize) {
    let mut printed_header = false;

    for instance in instances {
        let outcome = plan::<R>(instance.desired.as_ref(), instance.prior.as_ref());
        if matches!(&outcome, Ok(action) if !action.is_change()) {
            summary.no_change += 1;
            continue;
        }

        if !printed_header {
            ui::section(&capitalize(R::KIND.plural()));
            printed_header = true;
        }

        match outcome {
            Ok(action) => {
                println!(
                    "  {} {} {}",
                    ui::marker(action.symbol()),
                    instance.name.bold(),
                    format!("({action})").dimmed()
                );
                if !instance.unresolved.is_empty() {
                    ui::dim(&format!(
                        "    references resolved during apply: {}",
                        instance.unresolved.join(", ")
                    ));
                }
                summary.add(&action);
            }
            Err(e) => {
                *errors += 1;
                println!("  {} {} {}", "✗".red(), instance.name.bold(), e.to_string().dimmed());
                for issue in e.issues().iter().skip(1) {
                    ui::dim(&format!("    {issue}"));
                }
            }
        }
    }
}

pub fn print_plan_summary(summary: &PlanSummary) {
    println!();
    if summary.has_changes() {
        println!("  {} Plan: {}", "→".cyan(), summary);
    } else {
        println!("  {} No changes needed", "✓".green());
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
