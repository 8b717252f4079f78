//! Contact resolution CLI
//!
//! # Usage
//!
//! ```bash
//! # Resolve a person against the sample roster
//! contact-resolve resolve --name "Jane Appleseed"
//!
//! # Show every scored candidate, as JSON
//! contact-resolve rank --screen-name doe --format json
//!
//! # Messages from a sender, signed in as Evans; the history is empty
//! # without a signed-in user (--current-user or CONTACT_RESOLVER_CURRENT_USER)
//! contact-resolve --current-user Evans history --sender "John Doe"
//!
//! # Same, against a custom roster
//! contact-resolve --contacts friends.yaml --current-user Evans history --sender "John Doe"
//! ```
//!
//! # Exit Codes
//!
//! - 0: Resolved
//! - 1: Confirmation required
//! - 2: Disambiguation required
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: Nobody matched
//! - 10: Internal error

use clap::Parser;
use contact_resolution::{run_cli, ResolveCli};

fn main() {
    let cli = ResolveCli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
