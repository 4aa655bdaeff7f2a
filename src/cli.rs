use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use reconcile::ResourceKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "uptimectl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of uptime monitors, contacts and status pages", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API key for the monitoring service
    #[arg(long, env = "UPTIME_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the monitoring API
    #[arg(long, env = "UPTIME_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Manifest describing the desired resources
    #[arg(long, default_value = "uptime.toml", global = true)]
    pub manifest: PathBuf,

    /// State file tracking managed resources
    #[arg(long, default_value = "uptime.state.json", global = true)]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check the manifest without contacting the service
    Validate,

    /// Show what apply would change
    Plan,

    /// Converge the service onto the manifest
    Apply(ApplyArgs),

    /// Re-read every tracked resource and drop the ones that are gone
    Refresh,

    /// Delete every tracked resource
    Destroy(DestroyArgs),

    /// Start tracking an existing remote resource
    Import {
        /// Resource kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Manifest name to track it under
        name: String,
        /// Server-assigned id
        id: String,
    },

    /// Show tracked state
    Show,

    /// List remote resources of one kind
    List {
        #[arg(value_enum)]
        kind: KindArg,
    },

    /// Show account information
    Account,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs per resource kind
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs per resource kind
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Monitor,
    Contact,
    StatusPage,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Monitor => Self::Monitor,
            KindArg::Contact => Self::Contact,
            KindArg::StatusPage => Self::StatusPage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from(["uptimectl", "import", "status-page", "public", "sp_1"]).unwrap();
        match cli.command {
            Command::Import { kind, name, id } => {
                assert_eq!(ResourceKind::from(kind), ResourceKind::StatusPage);
                assert_eq!(name, "public");
                assert_eq!(id, "sp_1");
            }
            _ => panic!("Expected import"),
        }
    }

    #[test]
    fn test_parse_apply_defaults() {
        let cli = Cli::try_parse_from(["uptimectl", "apply", "--yes"]).unwrap();
        assert_eq!(cli.manifest, PathBuf::from("uptime.toml"));
        match cli.command {
            Command::Apply(args) => {
                assert!(args.yes);
                assert_eq!(args.jobs, 4);
            }
            _ => panic!("Expected apply"),
        }
    }
}
