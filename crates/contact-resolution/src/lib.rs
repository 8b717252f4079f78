//! Contact Resolution
//!
//! Resolves loosely specified references to people ("message Jane", "read
//! my texts from John") against a roster of known contacts, and drives the
//! messaging intents built on top of that resolution.
//!
//! ## Features
//!
//! - **Fuzzy matching**: case-insensitive comparison of screen name, given
//!   name and family name, with missing fields treated as unknown
//! - **Ranking**: favorites and matching fields raise a candidate's score
//! - **Disambiguation**: unique, uncertain, ambiguous and unknown matches
//!   map to distinct outcomes, including a choice between phone numbers
//! - **Intent handlers**: send message, search for messages and set message
//!   attribute, backed by a bounded message log
//! - **Telemetry**: Prometheus metrics for outcomes and match sets
//!
//! ## Architecture
//!
//! 1. **Contracts** (`contracts/`): users, phone numbers, handles, requests
//!    and outcomes.
//!
//! 2. **Store** (`store`): immutable roster loaded from JSON, YAML or TOML.
//!
//! 3. **Engine** (`engine/`): field matcher, match evaluator, ranking and
//!    resolution policy behind [`ResolutionEngine`].
//!
//! 4. **Intents** (`intents/`): host-facing handlers and the person adapter.
//!
//! 5. **CLI** (`cli/`): the `contact-resolve` binary.
//!
//! ## Example
//!
//! ```rust
//! use contact_resolution::{ContactStore, ResolutionEngine, ResolutionOutcome, User};
//!
//! let store = ContactStore::new(vec![User::new("Evans")
//!     .with_given_name("Evans")
//!     .with_family_name("Reily")]);
//! let engine = ResolutionEngine::new(store);
//!
//! match engine.resolve_person(&User::new("evans"), true) {
//!     ResolutionOutcome::ConfirmationRequired(user) => {
//!         assert_eq!(user.formatted_name(), "Evans Reily");
//!     }
//!     other => panic!("unexpected outcome: {}", other),
//! }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod intents;
pub mod messages;
pub mod store;
pub mod telemetry;

// Contracts module - located at ../contracts relative to src/
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::{
    ContactRecord, DisambiguationKind, HandleKind, PersonHandle, PersonName, PhoneNumber,
    RankedCandidate, ResolutionOutcome, ResolutionRequest, User,
};

pub use config::{ResolverConfig, ResolverConfigBuilder};
pub use engine::{
    MatchField, MatchReport, MatchVerdict, ResolutionEngine, ResolutionPolicy,
    MAX_DISAMBIGUATION_CANDIDATES,
};
pub use error::{ResolutionError, Result};
pub use intents::{
    IntentDispatcher, IntentHandler, IntentKind, Person, PersonResolution, UserActivity,
};
pub use messages::{Message, MessageLog};
pub use store::{ContactFormat, ContactStore};
pub use telemetry::{ResolutionMetrics, ResolutionMetricsRegistry, TelemetryError};

pub use cli::{ExitCode, OutputFormat, ResolveCli, ResolveCommands};

/// Crate version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the CLI application
///
/// This is the main entry point for the CLI binary.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use contact_resolution::{run_cli, ResolveCli};
///
/// fn main() {
///     let cli = ResolveCli::parse();
///     let exit_code = run_cli(cli);
///     std::process::exit(exit_code.into());
/// }
/// ```
pub fn run_cli(cli: ResolveCli) -> ExitCode {
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
