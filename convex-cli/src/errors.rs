use crate::commands::BuildError;
use crate::config::ConfigError;
use convex_caller::{CallError, ManifestError};
use convex_discovery::DiscoveryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No Convex functions found in {}", backend_dir.display())]
    NoFunctions { backend_dir: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialize discovery: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to build commands: {0}")]
    Build(#[from] BuildError),

    /// Rejected by the argument parser (unknown flag, bad value, missing flag).
    #[error("{0}")]
    Usage(clap::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),
}

impl CliError {
    /// Get a suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            CliError::NoFunctions { .. } => Some(
                "Make sure you have exported functions in your convex/ directory and run `npx convex dev` to generate types.\nSet backend_dir in convex-cli.yaml (or CONVEX_CLI_BACKEND_DIR) if the backend lives elsewhere.",
            ),
            CliError::Config(ConfigError::NotFound(_)) => Some(
                "Create convex-cli.yaml, or unset CONVEX_CLI_CONFIG to use the defaults",
            ),
            CliError::Manifest(_) => {
                Some("Check the api_manifest path in convex-cli.yaml, or remove it to use discovered references.")
            }
            CliError::Build(_) => Some(
                "Rename one of the conflicting functions or arguments, or hide one with an exclude pattern.",
            ),
            CliError::Call(_) => Some(
                "Check that the deployment is running and reachable. Set CONVEX_URL or CONVEX_DEPLOYMENT to target a different deployment.",
            ),
            _ => None,
        }
    }

    /// Format error with suggestion for CLI output
    pub fn format_for_cli(&self) -> String {
        // clap renders its own "error:" prefix and usage block
        if let CliError::Usage(err) = self {
            return err.render().to_string().trim_end().to_string();
        }

        let mut output = format!("Error: {}", self);

        if let Some(suggestion) = self.suggestion() {
            output.push_str(&format!("\n\nSuggestion: {}", suggestion));
        }

        output
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convex_caller::TransportError;
    use convex_schema::FunctionType;

    #[test]
    fn test_no_functions_error() {
        let error = CliError::NoFunctions {
            backend_dir: PathBuf::from("./convex"),
        };
        assert!(error.to_string().contains("No Convex functions found"));
        assert!(error.suggestion().unwrap().contains("npx convex dev"));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_call_error() {
        let error = CliError::from(CallError {
            path: "todos.create".to_string(),
            function_type: FunctionType::Mutation,
            source: TransportError::Function("Server Error".to_string()),
        });
        assert_eq!(
            error.to_string(),
            "Failed to call mutation \"todos.create\": Server Error"
        );
        assert!(error.suggestion().unwrap().contains("CONVEX_URL"));
    }

    #[test]
    fn test_format_for_cli() {
        let error = CliError::NoFunctions {
            backend_dir: PathBuf::from("./convex"),
        };
        let formatted = error.format_for_cli();
        assert!(formatted.starts_with("Error:"));
        assert!(formatted.contains("Suggestion:"));

        let error = CliError::InvalidInput("Unexpected argument: x".to_string());
        assert_eq!(error.format_for_cli(), "Error: Invalid input: Unexpected argument: x");
    }

    #[test]
    fn test_usage_error_is_rendered_by_clap() {
        let err = clap::Command::new("convex-cli")
            .try_get_matches_from(["convex-cli", "--bogus"])
            .unwrap_err();
        let error = CliError::Usage(err);
        assert!(error.format_for_cli().contains("--bogus"));
        assert!(!error.format_for_cli().starts_with("Error: "));
        assert_eq!(error.exit_code(), 1);
    }
}
