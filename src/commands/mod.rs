//! Command implementations and the machinery they share.

pub mod account;
pub mod apply;
pub mod destroy;
pub mod import;
pub mod list;
pub mod plan;
pub mod refresh;
pub mod show;
pub mod validate;

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use rayon::prelude::*;
use reconcile::{ApplyResult, ExecuteSummary, ReadOutcome, Reconciler, ResourceType};
use uptimekit::{Backend, ClientConfig, HttpBackend};

use crate::Context;
use crate::kinds::{Managed, record};
use crate::manifest::Manifest;
use crate::progress;
use crate::state::StateStore;
use crate::ui;

/// Build the API client from flags and environment
pub fn backend(ctx: &Context) -> Result<HttpBackend> {
    let config = ClientConfig::resolve(ctx.api_key.as_deref(), ctx.base_url.as_deref())
        .context("Failed to configure the API client")?;
    log::debug!("Using API at {}", config.base_url());
    Ok(HttpBackend::new(&config))
}

// ============================================================================
// Instances
// ============================================================================

/// One resource instance, declared, tracked, or both
pub struct Instance<R: ResourceType> {
    /// Manifest name
    pub name: String,
    pub desired: Option<R::Desired>,
    pub prior: Option<R::State>,
    /// References that do not name a tracked resource yet
    pub unresolved: Vec<String>,
}

impl<R: ResourceType> Instance<R> {
    fn prior_id(&self) -> Option<&str> {
        self.prior.as_ref().map(R::id)
    }
}

/// Pair every declared instance with its tracked state, then add tracked
/// instances that are no longer declared.
pub fn instances<R: Managed>(manifest: &Manifest, store: &StateStore) -> Vec<Instance<R>> {
    let tracked = R::tracked(store);
    let prior_named = |name: &str| {
        tracked
            .values()
            .find(|entry| entry.name == name)
            .map(|entry| entry.state.clone())
    };

    let declared = R::declared(manifest);
    let mut out: Vec<Instance<R>> = declared
        .iter()
        .map(|(name, desired)| {
            let (desired, unresolved) = R::resolve(desired, store);
            Instance {
                name: name.clone(),
                desired: Some(desired),
                prior: prior_named(name),
                unresolved,
            }
        })
        .collect();

    out.extend(
        tracked
            .values()
            .filter(|entry| !declared.contains_key(&entry.name))
            .map(|entry| Instance {
                name: entry.name.clone(),
                desired: None,
                prior: Some(entry.state.clone()),
                unresolved: Vec::new(),
            }),
    );
    out
}

/// Every tracked instance, marked for deletion
pub fn tracked_instances<R: Managed>(store: &StateStore) -> Vec<Instance<R>> {
    R::tracked(store)
        .values()
        .map(|entry| Instance {
            name: entry.name.clone(),
            desired: None,
            prior: Some(entry.state.clone()),
            unresolved: Vec::new(),
        })
        .collect()
}

// ============================================================================
// Refresh
// ============================================================================

/// Re-read every tracked instance of one kind. Returns the names that are gone.
pub fn refresh_kind<R: Managed>(backend: &dyn Backend, store: &mut StateStore) -> Result<Vec<String>> {
    let reconciler = Reconciler::<R>::new(backend);
    let tracked: Vec<(String, R::State)> = R::tracked(store)
        .iter()
        .map(|(id, entry)| (id.clone(), entry.state.clone()))
        .collect();
    let mut gone = Vec::new();

    for (id, prior) in tracked {
        let outcome = reconciler
            .refresh(&prior)
            .with_context(|| format!("Failed to refresh {} {}", R::KIND, id))?;
        let entries = R::tracked_mut(store);
        match outcome {
            ReadOutcome::Present(state) => {
                if let Some(entry) = entries.get_mut(&id) {
                    entry.state = state;
                }
            }
            ReadOutcome::Gone => {
                if let Some(entry) = entries.remove(&id) {
                    gone.push(entry.name);
                }
            }
        }
    }
    Ok(gone)
}

// ============================================================================
// Execution
// ============================================================================

/// Converge instances of one kind in parallel and record the outcomes.
pub fn converge_all<R: Managed>(
    ctx: &Context,
    backend: &dyn Backend,
    store: &mut StateStore,
    instances: Vec<Instance<R>>,
    jobs: usize,
) -> Result<ExecuteSummary> {
    let mut summary = ExecuteSummary::default();
    if instances.is_empty() {
        return Ok(summary);
    }

    let reconciler = Reconciler::<R>::new(backend);
    let pb = progress::bar(instances.len() as u64, R::KIND.plural(), ctx.quiet);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to create apply thread pool")?;

    let outcomes: Vec<(ApplyResult, Option<R::State>)> = pool.install(|| {
        instances
            .par_iter()
            .map(|instance| {
                let outcome = converge_one(&reconciler, instance);
                let symbol = if outcome.0.is_success() { "✓" } else { "✗" };
                pb.set_message(format!("{} {}", symbol, instance.name));
                pb.inc(1);
                outcome
            })
            .collect()
    });

    pb.finish_and_clear();

    for (instance, (result, state)) in instances.iter().zip(outcomes) {
        if result.is_success() {
            record::<R>(store, &instance.name, instance.prior_id(), state);
        }
        print_outcome(R::KIND.as_str(), &instance.name, &result);
        summary.add_result(&result);
    }
    Ok(summary)
}

fn converge_one<R: ResourceType>(
    reconciler: &Reconciler<'_, R>,
    instance: &Instance<R>,
) -> (ApplyResult, Option<R::State>) {
    if !instance.unresolved.is_empty() {
        return (
            ApplyResult::Skipped {
                reason: format!("unresolved references: {}", instance.unresolved.join(", ")),
            },
            instance.prior.clone(),
        );
    }

    match reconciler.apply(instance.desired.as_ref(), instance.prior.as_ref()) {
        Ok(applied) => (applied.result, applied.state),
        Err(e) => {
            log::debug!("{} {} failed: {e:?}", R::KIND, instance.name);
            (
                ApplyResult::Failed {
                    error: e.to_string(),
                },
                instance.prior.clone(),
            )
        }
    }
}

fn print_outcome(kind: &str, name: &str, result: &ApplyResult) {
    let label = format!("{kind}.{name}");
    match result {
        ApplyResult::NoChange => {}
        ApplyResult::Created => println!("  {} {} created", "✓".green(), label),
        ApplyResult::Updated => println!("  {} {} updated", "✓".green(), label),
        ApplyResult::Replaced => println!("  {} {} replaced", "✓".green(), label),
        ApplyResult::Deleted => println!("  {} {} deleted", "✓".green(), label),
        ApplyResult::Skipped { reason } => {
            println!("  {} {} skipped: {}", "⊘".yellow(), label, reason.dimmed());
        }
        ApplyResult::Failed { error } => ui::error(&format!("{label} failed: {error}")),
    }
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Apply complete!", "✓".green().bold());
    } else {
        println!("  {} Apply finished with errors", "⚠".yellow().bold());
    }

    for (count, what) in [
        (summary.created, "created"),
        (summary.updated, "updated"),
        (summary.replaced, "replaced"),
        (summary.deleted, "deleted"),
        (summary.skipped, "skipped"),
    ] {
        if count > 0 {
            println!("    • {count} resources {what}");
        }
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::settings::{HttpsSettings, SlackSettings};
    use reconcile::{ContactConfig, ContactResource, MonitorConfig, MonitorResource};
    use uptimekit::MockBackend;

    fn test_ctx() -> Context {
        Context {
            verbose: 0,
            quiet: true,
            api_key: None,
            base_url: None,
            manifest: "uptime.toml".into(),
            state: "uptime.state.json".into(),
        }
    }

    fn manifest() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.contacts.insert(
            "ops".into(),
            ContactConfig {
                name: "Ops".into(),
                slack: Some(SlackSettings {
                    webhook_url: "https://hooks.slack.com/services/T0/B0/XYZ".into(),
                }),
                ..ContactConfig::default()
            },
        );
        manifest.monitors.insert(
            "api".into(),
            MonitorConfig {
                name: "API".into(),
                contacts: Some(vec!["contact.ops".into()]),
                https: Some(HttpsSettings::new("https://api.example.com")),
                ..MonitorConfig::default()
            },
        );
        manifest
    }

    #[test]
    fn test_instances_pair_declared_and_tracked() {
        let manifest = manifest();
        let store = StateStore::default();
        let monitors = instances::<MonitorResource>(&manifest, &store);
        assert_eq!(monitors.len(), 1);
        assert!(monitors[0].prior.is_none());
        assert_eq!(monitors[0].unresolved, vec!["contact.ops"]);
    }

    #[test]
    fn test_converge_in_dependency_order() {
        let ctx = test_ctx();
        let mock = MockBackend::new();
        let manifest = manifest();
        let mut store = StateStore::default();

        let contacts = instances::<ContactResource>(&manifest, &store);
        let summary = converge_all(&ctx, &mock, &mut store, contacts, 2).unwrap();
        assert_eq!(summary.created, 1);

        let monitors = instances::<MonitorResource>(&manifest, &store);
        assert!(monitors[0].unresolved.is_empty());
        let summary = converge_all(&ctx, &mock, &mut store, monitors, 2).unwrap();
        assert_eq!(summary.created, 1);

        let tracked = store.monitors.values().next().unwrap();
        let contact_id = store.contacts.keys().next().unwrap();
        assert_eq!(tracked.name, "api");
        assert_eq!(tracked.state.contacts.as_deref(), Some(&[contact_id.clone()][..]));

        let again = instances::<MonitorResource>(&manifest, &store);
        let summary = converge_all(&ctx, &mock, &mut store, again, 2).unwrap();
        assert_eq!(summary.no_change, 1);
    }

    #[test]
    fn test_unresolved_reference_is_skipped() {
        let ctx = test_ctx();
        let mock = MockBackend::new();
        let manifest = manifest();
        let mut store = StateStore::default();

        let monitors = instances::<MonitorResource>(&manifest, &store);
        let summary = converge_all(&ctx, &mock, &mut store, monitors, 1).unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(mock.calls().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_failure_keeps_prior_state() {
        let ctx = test_ctx();
        let mock = MockBackend::new();
        let manifest = manifest();
        let mut store = StateStore::default();

        mock.fail_next(500, "boom");
        let contacts = instances::<ContactResource>(&manifest, &store);
        let summary = converge_all(&ctx, &mock, &mut store, contacts, 1).unwrap();
        assert_eq!(summary.failed, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_refresh_drops_gone() {
        let ctx = test_ctx();
        let mock = MockBackend::new();
        let manifest = manifest();
        let mut store = StateStore::default();

        let contacts = instances::<ContactResource>(&manifest, &store);
        converge_all(&ctx, &mock, &mut store, contacts, 1).unwrap();
        let id = store.contacts.keys().next().unwrap().clone();

        mock.remove(&id);
        let gone = refresh_kind::<ContactResource>(&mock, &mut store).unwrap();
        assert_eq!(gone, vec!["ops"]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_removed_from_manifest_is_deleted() {
        let ctx = test_ctx();
        let mock = MockBackend::new();
        let mut manifest = manifest();
        let mut store = StateStore::default();

        let contacts = instances::<ContactResource>(&manifest, &store);
        converge_all(&ctx, &mock, &mut store, contacts, 1).unwrap();

        manifest.contacts.clear();
        let contacts = instances::<ContactResource>(&manifest, &store);
        assert!(contacts[0].desired.is_none());
        let summary = converge_all(&ctx, &mock, &mut store, contacts, 1).unwrap();
        assert_eq!(summary.deleted, 1);
        assert!(store.is_empty());
    }
}
