//! The assembled CLI: configuration, discovered functions and a remote caller.

use crate::commands::{BuildError, CommandTree, Outcome};
use crate::config::CliConfig;
use crate::errors::CliError;
use crate::output;
use clap::Command;
use convex_caller::{ApiNode, Connector, HttpConnector, RemoteCaller};
use convex_discovery::{DiscoveryContext, convert_provided};
use convex_schema::ParsedFunction;
use std::ffi::OsString;

/// A CLI generated from a backend's functions.
pub struct ConvexCli {
    config: CliConfig,
    functions: Vec<ParsedFunction>,
    caller: RemoteCaller,
}

impl ConvexCli {
    /// Build the CLI with an HTTP connection to the configured deployment.
    pub fn new(config: CliConfig) -> Result<Self, CliError> {
        let connector = HttpConnector::new().with_timeout(config.timeout_secs);
        Self::with_connector(config, connector)
    }

    /// Build the CLI with a custom connector.
    ///
    /// # Errors
    /// Discovery or manifest failures, an empty function set, and naming
    /// conflicts in the generated commands.
    pub fn with_connector(
        config: CliConfig,
        connector: impl Connector + 'static,
    ) -> Result<Self, CliError> {
        let functions = load_functions(&config)?;

        let api = match &config.api_manifest {
            Some(path) => {
                let api = ApiNode::load(path)?;
                let unresolved = functions
                    .iter()
                    .filter(|f| api.resolve(&f.path).is_none())
                    .count();
                if unresolved > 0 {
                    output::warning(&format!(
                        "{} function(s) are missing from {}; calling them by derived name",
                        unresolved,
                        path.display()
                    ));
                }
                api
            }
            None => ApiNode::from_functions(&functions),
        };

        let url = config.resolve_url(|key| std::env::var(key).ok());
        tracing::debug!("Using deployment {}", url);

        let cli = Self {
            caller: RemoteCaller::new(url, api, connector),
            config,
            functions,
        };
        cli.command_tree()?;
        Ok(cli)
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn functions(&self) -> &[ParsedFunction] {
        &self.functions
    }

    pub fn caller(&self) -> &RemoteCaller {
        &self.caller
    }

    /// The root command before function commands are attached.
    pub fn program(&self) -> Command {
        let about = self
            .config
            .description
            .clone()
            .unwrap_or_else(|| "CLI for Convex backend functions".to_string());
        let program = Command::new(self.config.name.clone()).about(about);

        match &self.config.version {
            Some(version) => program.version(version.clone()),
            None => program,
        }
    }

    pub fn command_tree(&self) -> Result<CommandTree<'_>, BuildError> {
        CommandTree::build(self.program(), &self.functions, &self.caller)
    }

    /// Parse `args` and invoke the selected function.
    pub async fn execute<I, T>(&self, args: I) -> Result<Outcome, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.command_tree()?.run(args).await
    }

    /// Execute `args` and print the outcome, returning the process exit code.
    pub async fn run<I, T>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match self.execute(args).await {
            Ok(Outcome::Completed(value)) => {
                output::result(&value);
                0
            }
            Ok(Outcome::Exit(err)) => match err.print() {
                Ok(()) => err.exit_code(),
                Err(e) => {
                    tracing::debug!("Failed to print help: {}", e);
                    1
                }
            },
            Err(err) => {
                output::error(&err.format_for_cli());
                err.exit_code()
            }
        }
    }
}

/// Functions the CLI exposes: the configured list, or discovered ones.
///
/// Exclude patterns are applied in both cases.
///
/// # Errors
/// [`CliError::NoFunctions`] when nothing remains.
pub fn load_functions(config: &CliConfig) -> Result<Vec<ParsedFunction>, CliError> {
    let mut functions = if config.functions.is_empty() {
        let mut context = DiscoveryContext::new(&config.backend_dir)?;
        if config.cache {
            context = context.with_cache(&config.cache_dir);
        }
        if config.refresh {
            context.refresh()
        } else {
            context.discover()
        }
    } else {
        tracing::debug!("Using {} configured functions", config.functions.len());
        convert_provided(&config.functions)
    };

    let before = functions.len();
    functions.retain(|f| !config.is_excluded(&f.path));
    if functions.len() < before {
        tracing::debug!("Excluded {} functions", before - functions.len());
    }

    if functions.is_empty() {
        return Err(CliError::NoFunctions {
            backend_dir: config.backend_dir.clone(),
        });
    }
    Ok(functions)
}
