//! `uptimectl validate` - check the manifest offline

use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{ContactResource, MonitorResource, StatusPageResource, ValidationIssue};

use crate::Context;
use crate::kinds::Managed;
use crate::manifest::Manifest;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("Validating Manifest");

    let manifest = Manifest::load(&ctx.manifest)?;
    let problems = collect_issues(&manifest);

    if problems.is_empty() {
        ui::success(&format!("{} resources are valid", manifest.len()));
        return Ok(());
    }

    for (label, issues) in &problems {
        println!("  {} {}", "✗".red(), label.bold());
        for issue in issues {
            ui::dim(&format!("  {issue}"));
        }
    }
    println!();
    bail!("{} of {} resources are invalid", problems.len(), manifest.len());
}

/// Issues per invalid manifest entry, labeled `kind.name`
pub fn collect_issues(manifest: &Manifest) -> Vec<(String, Vec<ValidationIssue>)> {
    let mut out = issues_for::<ContactResource>(manifest);
    out.extend(issues_for::<MonitorResource>(manifest));
    out.extend(issues_for::<StatusPageResource>(manifest));
    out
}

fn issues_for<R: Managed>(manifest: &Manifest) -> Vec<(String, Vec<ValidationIssue>)> {
    R::declared(manifest)
        .iter()
        .filter_map(|(name, desired)| {
            let issues = R::validate(desired);
            (!issues.is_empty()).then(|| (format!("{}.{}", R::KIND, name), issues))
        })
        .collect()
}
