//! AccountStack - synthesize the declaration graph of an AWS organization
//! unit.
//!
//! Reads the environment registry and the policy documents, applies every
//! declaration rule, and writes the ordered manifest for the provisioning
//! engine. A `.env` file in the working directory is loaded first.
//!
//! # Usage
//!
//! ```text
//! SSO_INSTANCE_ARN=arn:aws:sso:::instance/ssoins-... accountstack synth --output manifest.json
//! JOB_ROLE=DevOps accountstack check
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SSO_INSTANCE_ARN` | *(required)* | SSO instance owning the permission sets |
//! | `JOB_ROLE` | *(unset)* | `DevOps` includes permission sets and the pipeline |
//! | `ENVIRONMENTS_FILE` | `environments.json` | Environment registry |
//! | `POLICY_DIR` | `policy-definitions` | Policy document directory |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//!
//! See `SynthConfig::from_env` for the networking, OIDC, and pipeline
//! variables.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use accountstack_core::{EnvironmentRegistry, SynthConfig};
use accountstack_policy::FsPolicyLoader;
use accountstack_synth::{DeclarationGraph, Synthesizer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "accountstack", version, about = "Synthesize AWS organization unit declarations")]
struct Cli {
    /// Environment registry file.
    #[arg(long, global = true, env = "ENVIRONMENTS_FILE")]
    environments: Option<PathBuf>,

    /// Directory holding the policy documents.
    #[arg(long, global = true, env = "POLICY_DIR")]
    policy_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the manifest as JSON.
    Synth {
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Synthesize and print a summary only.
    Check,
}

/// Initialize the tracing subscriber on stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Load `path` into the process environment without overriding variables
/// that are already set. Only a missing file is tolerated: a malformed line
/// would silently drop every key after it.
fn load_dotenv(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to load {}", path.display())),
    }
}

fn apply_overrides(mut config: SynthConfig, cli: &Cli) -> SynthConfig {
    if let Some(path) = &cli.environments {
        config.environments_file.clone_from(path);
    }
    if let Some(dir) = &cli.policy_dir {
        config.policy_dir.clone_from(dir);
    }
    config
}

fn synthesize(config: &SynthConfig) -> Result<DeclarationGraph> {
    let registry = EnvironmentRegistry::from_file(&config.environments_file).with_context(|| {
        format!(
            "failed to load environment registry {}",
            config.environments_file.display()
        )
    })?;
    let loader = FsPolicyLoader::new(config.policy_dir.clone());
    let graph = Synthesizer::new(&registry, config, &loader)
        .synthesize()
        .context("synthesis failed")?;
    Ok(graph)
}

fn summary(graph: &DeclarationGraph) -> String {
    let mut out = format!(
        "{} declarations in {} stacks, {} grants, {} excluded\n",
        graph.declarations.len(),
        graph.stacks.len(),
        graph.grants.len(),
        graph.excluded.len()
    );
    for stack in &graph.stacks {
        out.push_str(&format!(
            "  {} ({} / {})\n",
            stack.spec.name, stack.spec.account, stack.spec.region
        ));
    }
    for unresolved in &graph.unresolved_references {
        out.push_str(&format!(
            "  unresolved: {} -> {}\n",
            unresolved.permission_set, unresolved.policy_name
        ));
    }
    out
}

fn main() -> Result<()> {
    load_dotenv(Path::new(".env"))?;

    let cli = Cli::parse();
    let config = apply_overrides(SynthConfig::from_env(), &cli);
    init_tracing(&config.log_level)?;

    let graph = synthesize(&config)?;
    match cli.command {
        Command::Synth { output } => {
            let json = graph.to_json().context("failed to serialize manifest")?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "manifest written");
                }
                None => println!("{json}"),
            }
        }
        Command::Check => print!("{}", summary(&graph)),
    }
    Ok(())
}
