//! CLI module for contact resolution
//!
//! Command-line access to the resolution engine, the contact roster and the
//! message history, with machine-readable output.

pub mod commands;
pub mod output;

pub use commands::{QueryArgs, ResolveCli, ResolveCommands};
pub use output::{OutputFormat, ResolutionOutput};

use crate::config::ResolverConfig;
use crate::contracts::ResolutionOutcome;
use crate::error::{ResolutionError, Result};
use crate::telemetry::ResolutionMetricsRegistry;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Resolved to a single contact
    Success = 0,
    /// A single candidate needs confirmation
    ConfirmationRequired = 1,
    /// The caller must choose between several options
    DisambiguationRequired = 2,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Nobody matched, or nobody was given
    Unresolved = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Exit code for a resolution outcome
    pub fn from_outcome(outcome: &ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::Success(_) => ExitCode::Success,
            ResolutionOutcome::ConfirmationRequired(_) => ExitCode::ConfirmationRequired,
            ResolutionOutcome::Disambiguation { .. } => ExitCode::DisambiguationRequired,
            ResolutionOutcome::NeedsValue | ResolutionOutcome::Unsupported => ExitCode::Unresolved,
        }
    }

    /// Exit code for a failed command
    pub fn from_error(error: &ResolutionError) -> Self {
        match error {
            ResolutionError::FileError(_) => ExitCode::FileError,
            e if e.is_user_error() => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }
}

/// Environment configuration with the command-line overrides applied
pub fn config_for(cli: &ResolveCli) -> Result<ResolverConfig> {
    let mut config = ResolverConfig::from_env();
    if let Some(contacts) = &cli.contacts {
        config.contacts_path = Some(contacts.clone());
    }
    if let Some(current_user) = &cli.current_user {
        config.current_user = Some(current_user.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: ResolveCli) -> Result<ExitCode> {
    let config = config_for(&cli)?;

    let registry = if cli.metrics {
        Some(ResolutionMetricsRegistry::new()?)
    } else {
        None
    };
    let metrics = registry.as_ref().map(|r| r.resolution());

    let code = match cli.command {
        ResolveCommands::Resolve {
            query,
            no_handle_disambiguation,
            format,
        } => commands::execute_resolve(&config, metrics, query, no_handle_disambiguation, format),
        ResolveCommands::Rank { query, format } => {
            commands::execute_rank(&config, metrics, query, format)
        }
        ResolveCommands::Contacts { format } => commands::execute_contacts(&config, format),
        ResolveCommands::History { sender, format } => {
            commands::execute_history(&config, metrics, sender, format)
        }
    }?;

    if let Some(registry) = registry {
        eprint!("{}", registry.encode_text()?);
    }
    Ok(code)
}
