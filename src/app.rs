// ABOUTME: App orchestrator — command-line surface over the policy matcher and session cache.
// ABOUTME: Loads config, allow-list, and per-workspace session state, then runs one command.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;

use crate::config::Config;
use crate::inspection::{InspectionReport, Inspector};
use crate::policy::{AllowlistFile, CachedAllowlist, PolicyMatcher};
use crate::session::persistence;
use crate::session::{AddressScope, SessionCache};

/// Static allow-list checks and session helpers for restricted smart contracts.
#[derive(Debug, Parser)]
#[command(name = "cguard", version)]
pub struct Cli {
    /// Config file (default: ~/.contractguard/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace the session cache belongs to (default: current directory).
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Explicit session cache file, overriding the per-workspace location.
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a host-exported usage report against the allow-list.
    Check {
        report: PathBuf,
        /// Allow-list file, overriding the configured one.
        #[arg(long)]
        allowlist: Option<PathBuf>,
    },
    /// Remembered method arguments.
    #[command(subcommand)]
    Args(ArgsCommand),
    /// Remembered deploy arguments.
    #[command(subcommand)]
    DeployArgs(DeployArgsCommand),
    /// The "don't ask again" flag of the deploy prompt.
    #[command(subcommand)]
    SkipPrompt(SkipPromptCommand),
    /// Recently used contract addresses.
    #[command(subcommand)]
    Addresses(AddressesCommand),
}

#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    Get {
        method: String,
        #[arg(long = "param")]
        params: Vec<String>,
    },
    Put {
        method: String,
        #[arg(long = "param")]
        params: Vec<String>,
        #[arg(last = true)]
        values: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DeployArgsCommand {
    Get {
        #[arg(default_value = "")]
        module: String,
    },
    Set {
        module: String,
        value: String,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum SkipPromptCommand {
    Get {
        #[arg(default_value = "")]
        module: String,
    },
    Set {
        module: String,
        #[arg(action = ArgAction::Set)]
        flag: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddressesCommand {
    List {
        #[arg(long)]
        remote: bool,
    },
    Record {
        address: String,
        #[arg(long)]
        remote: bool,
    },
}

fn scope(remote: bool) -> AddressScope {
    if remote {
        AddressScope::Remote
    } else {
        AddressScope::Local
    }
}

/// Top-level application holding resolved configuration and paths.
pub struct App {
    config: Config,
    workspace_dir: PathBuf,
    state_path: PathBuf,
}

impl App {
    /// Resolve config and state locations from the parsed command line.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        let workspace_dir = match &cli.workspace {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let state_path = cli
            .state
            .clone()
            .unwrap_or_else(|| persistence::session_state_path(&workspace_dir));
        Ok(Self::new(config, workspace_dir, state_path))
    }

    pub fn new(config: Config, workspace_dir: PathBuf, state_path: PathBuf) -> Self {
        Self {
            config,
            workspace_dir,
            state_path,
        }
    }

    /// Run one command, writing results to `out`.
    ///
    /// Returns `false` when a check found violations.
    pub fn run(&self, command: Command, out: &mut impl Write) -> anyhow::Result<bool> {
        match command {
            Command::Check { report, allowlist } => {
                let allowlist = allowlist.unwrap_or_else(|| self.config.allowlist_path());
                self.check(&report, &allowlist, out)
            }
            Command::Args(cmd) => self.with_cache(out, |cache, out| match cmd {
                ArgsCommand::Get { method, params } => {
                    if let Some(values) = cache.get_args(&method, &params) {
                        writeln!(out, "{}", values.join(" "))?;
                    }
                    Ok(false)
                }
                ArgsCommand::Put {
                    method,
                    params,
                    values,
                } => {
                    cache.put_args(&method, &params, values);
                    Ok(true)
                }
            }),
            Command::DeployArgs(cmd) => self.with_cache(out, |cache, out| match cmd {
                DeployArgsCommand::Get { module } => {
                    if let Some(value) = cache.get_deploy_args(&module) {
                        writeln!(out, "{value}")?;
                    }
                    Ok(false)
                }
                DeployArgsCommand::Set { module, value } => {
                    cache.put_deploy_args(&module, &value);
                    Ok(true)
                }
                DeployArgsCommand::List => {
                    for (key, value) in cache.list_deploy_args_by_module() {
                        writeln!(out, "{key}\t{value}")?;
                    }
                    Ok(false)
                }
            }),
            Command::SkipPrompt(cmd) => self.with_cache(out, |cache, out| match cmd {
                SkipPromptCommand::Get { module } => {
                    writeln!(out, "{}", cache.should_skip_deploy_prompt(&module))?;
                    Ok(false)
                }
                SkipPromptCommand::Set { module, flag } => {
                    cache.set_skip_deploy_prompt(&module, flag);
                    Ok(true)
                }
            }),
            Command::Addresses(cmd) => self.with_cache(out, |cache, out| match cmd {
                AddressesCommand::List { remote } => {
                    for address in cache.list_addresses(scope(remote)) {
                        writeln!(out, "{address}")?;
                    }
                    Ok(false)
                }
                AddressesCommand::Record { address, remote } => {
                    cache.record_address(scope(remote), &address);
                    Ok(true)
                }
            }),
        }
    }

    fn check(&self, report: &Path, allowlist: &Path, out: &mut impl Write) -> anyhow::Result<bool> {
        let report = InspectionReport::load(report)?;
        let store = CachedAllowlist::new(AllowlistFile::load(allowlist)?);
        let matcher = PolicyMatcher::new(store)
            .with_exempt_prefixes(self.config.policy.exempt_prefixes.iter().cloned())
            .with_signature_matching(self.config.policy.signature_matching);
        let inspector = Inspector::new(&matcher);

        let mut clean = true;
        for file in &report.files {
            for violation in inspector.inspect_file(file, &report.symbols) {
                clean = false;
                writeln!(out, "{}: {violation}", file.path)?;
            }
        }
        Ok(clean)
    }

    /// Load the session cache, run `op`, and save it back if `op` reports a mutation.
    fn with_cache<W, F>(&self, out: &mut W, op: F) -> anyhow::Result<bool>
    where
        W: Write,
        F: FnOnce(&SessionCache, &mut W) -> anyhow::Result<bool>,
    {
        let state = persistence::load_state_from(&self.state_path);
        let cache = SessionCache::from_state(state, self.config.session.limits());
        if op(&cache, out)? {
            debug!(path = %self.state_path.display(), "saving session cache");
            persistence::save_state_to(&self.state_path, &self.workspace_dir, &cache.state())?;
        }
        Ok(true)
    }
}
