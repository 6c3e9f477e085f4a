//! Convex CLI - call Convex backend functions from the command line.
//!
//! Every exported `query`, `mutation` and `action` becomes a command grouped
//! by module, with one flag per argument.
//!
//! # Usage
//!
//! ```bash
//! # List modules
//! convex-cli --help
//!
//! # Call todos.create
//! convex-cli todos create --text "Buy milk"
//!
//! # Rediscover after editing the backend
//! CONVEX_CLI_REFRESH=1 convex-cli todos get-all
//! ```

use convex_cli::{CliConfig, CliError, ConvexCli, output};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<i32, CliError> {
    let config = CliConfig::load_default()?;
    let cli = ConvexCli::new(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    Ok(runtime.block_on(cli.run(std::env::args_os())))
}

fn main() {
    init_tracing();

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            output::error(&e.format_for_cli());
            e.exit_code()
        }
    };

    std::process::exit(code);
}
