//! AXIOM Sentinel CLI - pre-commit governance gate

use anyhow::Context;
use axiom_config::{ConfigStore, DEFAULT_CONFIG_PATH};
use axiom_core::{FixedChangeSet, GitCli, Sentinel, VcsError, VcsProvider, EXIT_ERROR, EXIT_PASS};
use axiom_metrics::MetricsStore;
use axiom_model::ZoneCategory;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "axiom", version)]
#[command(about = "AXIOM Sentinel - pre-commit governance for architectural policy")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate the current changeset
    Run {
        /// Configuration file path (default: <root>/axiom.config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Report blocking violations without failing
        #[arg(long)]
        dry_run: bool,
        /// Validate these files instead of the staged set
        #[arg(long, num_args = 1..)]
        files: Vec<String>,
        /// Commit message to scan for override keywords
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Check configuration validity
    CheckConfig {
        /// Configuration file path
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Show run statistics
    Metrics {
        /// Metrics document path
        #[arg(short, long, default_value = ".axiom/metrics.json")]
        path: PathBuf,
    },
}

/// Staged files from git, with an explicit commit message.
struct WithMessage {
    git: GitCli,
    message: String,
}

impl VcsProvider for WithMessage {
    fn changed_files(&self) -> Result<Vec<String>, VcsError> {
        self.git.changed_files()
    }

    fn commit_message(&self) -> Result<Option<String>, VcsError> {
        Ok(Some(self.message.clone()))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_ERROR as u8)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(command: Commands) -> anyhow::Result<u8> {
    match command {
        Commands::Run {
            config,
            root,
            dry_run,
            files,
            message,
        } => {
            let mut sentinel = Sentinel::new(&root).with_dry_run(dry_run);
            if let Some(config) = config {
                sentinel = sentinel.with_config_path(config);
            }
            sentinel = match (files.is_empty(), message) {
                (false, message) => {
                    let mut vcs = FixedChangeSet::new(files);
                    if let Some(message) = message {
                        vcs = vcs.with_message(message);
                    }
                    sentinel.with_vcs(vcs)
                }
                (true, Some(message)) => sentinel.with_vcs(WithMessage {
                    git: GitCli::new(&root),
                    message,
                }),
                (true, None) => sentinel,
            };

            let outcome = sentinel.run().context("validation run failed")?;
            Ok(outcome.exit_code() as u8)
        }
        Commands::CheckConfig { config } => {
            let loaded = ConfigStore::global()
                .load(&config)
                .with_context(|| format!("invalid configuration {}", config.display()))?;

            println!("Configuration OK: {}", config.display());
            for category in ZoneCategory::PRECEDENCE {
                let zones = loaded.zones(category);
                let paths: Vec<String> = zones
                    .iter()
                    .map(|z| format!("{} (max {})", z.path, z.max_files))
                    .collect();
                println!("  {} zones: {}", category.label(), paths.join(", "));
            }
            let validators: Vec<&str> = loaded.enabled_validators().map(|(k, _)| k).collect();
            let reporters: Vec<&str> = loaded.enabled_reporters().map(|(k, _)| k).collect();
            println!("  validators: {}", validators.join(", "));
            println!("  reporters: {}", reporters.join(", "));
            if loaded.auto_fix.enabled {
                println!("  auto-fix: {}", loaded.auto_fix.fixers.join(", "));
            } else {
                println!("  auto-fix: disabled");
            }
            Ok(EXIT_PASS as u8)
        }
        Commands::Metrics { path } => {
            let document = MetricsStore::new(&path).load();
            let Some(stats) = document.statistics else {
                println!("No runs recorded in {}", path.display());
                return Ok(EXIT_PASS as u8);
            };

            println!("Runs:                 {}", stats.total_runs);
            println!("Avg violations/run:   {:.2}", stats.avg_violations_per_run);
            println!("Pass rate:            {:.1}%", stats.pass_rate);
            println!(
                "Top validator:        {}",
                stats.most_common_validator.as_deref().unwrap_or("-")
            );
            println!(
                "Top module:           {}",
                stats.most_problematic_module.as_deref().unwrap_or("-")
            );
            println!("Trend:                {}", stats.trend);
            Ok(EXIT_PASS as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "axiom", "run", "--dry-run", "--files", "a.rs", "b.rs", "-m", "BIGBANG_APPROVED",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                dry_run,
                files,
                message,
                ..
            } => {
                assert!(dry_run);
                assert_eq!(files, vec!["a.rs", "b.rs"]);
                assert_eq!(message.as_deref(), Some("BIGBANG_APPROVED"));
            }
            _ => panic!("expected run"),
        }
    }
}
