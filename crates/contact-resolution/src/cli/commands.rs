//! CLI command definitions for contact resolution
//!
//! Clap-based commands for resolving, ranking, listing contacts and
//! searching the message history.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use super::output::{
    ContactListOutput, HistoryOutput, OutputFormat, RankingOutput, ResolutionOutput,
};
use super::ExitCode;
use crate::config::ResolverConfig;
use crate::contracts::{PersonHandle, PersonName, PhoneNumber, ResolutionRequest, User};
use crate::error::{ResolutionError, Result};
use crate::intents::{
    Person, PersonResolution, SearchForMessagesHandler, SearchForMessagesIntent,
};
use crate::telemetry::ResolutionMetrics;

/// Contact resolution CLI
///
/// Resolve spoken or typed references to people against a contact roster.
#[derive(Parser, Debug)]
#[command(name = "contact-resolve")]
#[command(about = "Resolve people against a contact roster", long_about = None)]
#[command(version)]
pub struct ResolveCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Contact file (json, yaml or toml); the sample roster when omitted
    #[arg(long, global = true)]
    pub contacts: Option<PathBuf>,

    /// Screen name of the signed-in user; the message history is empty without one
    #[arg(long, global = true, env = "CONTACT_RESOLVER_CURRENT_USER")]
    pub current_user: Option<String>,

    /// Print Prometheus metrics to stderr when the command finishes
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: ResolveCommands,
}

/// Fields describing the person to look up
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Screen name, matched as a case-insensitive substring
    #[arg(long)]
    pub screen_name: Option<String>,

    /// Given name
    #[arg(long)]
    pub given: Option<String>,

    /// Family name
    #[arg(long)]
    pub family: Option<String>,

    /// Full name, split into given and family name
    #[arg(long, conflicts_with_all = ["given", "family"])]
    pub name: Option<String>,

    /// Phone number handle; resolves without consulting the roster
    #[arg(long)]
    pub phone: Option<String>,
}

impl QueryArgs {
    /// Query user described by the arguments
    pub fn to_user(&self) -> Result<User> {
        let name = match &self.name {
            Some(full_name) => PersonName::parse(full_name).unwrap_or_default(),
            None => PersonName::new(self.given.as_deref(), self.family.as_deref()),
        };
        let user = User::new(self.screen_name.clone().unwrap_or_default()).with_name(name);

        if user.screen_name.is_empty() && user.name().is_empty() && self.phone.is_none() {
            return Err(ResolutionError::invalid_input(
                "Describe the person with --screen-name, --given, --family, --name or --phone",
            ));
        }
        Ok(user)
    }

    /// Resolution request described by the arguments
    pub fn to_request(&self, handle_disambiguation: bool) -> Result<ResolutionRequest> {
        let request =
            ResolutionRequest::new(self.to_user()?).handle_disambiguation(handle_disambiguation);

        match &self.phone {
            Some(number) => {
                let phone_number = PhoneNumber::new("", number.trim());
                if !phone_number.is_well_formed() {
                    return Err(ResolutionError::invalid_input(format!(
                        "Not a phone number: {}",
                        number
                    )));
                }
                Ok(request.with_handle(PersonHandle::phone(&phone_number)))
            }
            None => Ok(request),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum ResolveCommands {
    /// Resolve a person to a single contact
    ///
    /// Exits 0 when resolved, 1 when confirmation is needed, 2 when the
    /// caller must choose between options and 5 when nobody matches.
    Resolve {
        #[command(flatten)]
        query: QueryArgs,

        /// Do not offer a choice between a contact's phone numbers
        #[arg(long)]
        no_handle_disambiguation: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// Show every scored candidate for a person
    Rank {
        #[command(flatten)]
        query: QueryArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// List the loaded contacts
    Contacts {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// List messages from a sender
    History {
        /// Sender name as it would be spoken
        #[arg(long)]
        sender: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },
}

/// Execute the resolve command
pub fn execute_resolve(
    config: &ResolverConfig,
    metrics: Option<Arc<ResolutionMetrics>>,
    query: QueryArgs,
    no_handle_disambiguation: bool,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let request = query.to_request(!no_handle_disambiguation)?;
    let engine = config.build_engine(metrics)?;

    let outcome = engine.resolve(&request);

    let output = ResolutionOutput::from_outcome(&request.query, &outcome);
    output.render(format.unwrap_or_default())?;

    Ok(ExitCode::from_outcome(&outcome))
}

/// Execute the rank command
pub fn execute_rank(
    config: &ResolverConfig,
    metrics: Option<Arc<ResolutionMetrics>>,
    query: QueryArgs,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let user = query.to_user()?;
    let engine = config.build_engine(metrics)?;

    let ranked = engine.rank_users(&user);
    RankingOutput::from_ranked(&user, &ranked).render(format.unwrap_or_default())?;

    Ok(if ranked.is_empty() {
        ExitCode::Unresolved
    } else {
        ExitCode::Success
    })
}

/// Execute the contacts command
pub fn execute_contacts(config: &ResolverConfig, format: Option<OutputFormat>) -> Result<ExitCode> {
    let store = config.load_store()?;
    ContactListOutput::from_store(&store).render(format.unwrap_or_default())?;
    Ok(ExitCode::Success)
}

/// Execute the history command
///
/// The sender is resolved the way a message search resolves it; anything
/// short of a unique contact is reported instead of searched.
pub fn execute_history(
    config: &ResolverConfig,
    metrics: Option<Arc<ResolutionMetrics>>,
    sender: String,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let format = format.unwrap_or_default();
    let engine = config.build_engine(metrics)?;
    let log = config.build_message_log(engine.store())?;
    let handler = SearchForMessagesHandler::new(engine.clone(), Arc::new(log));

    let senders = vec![Person::named(sender.as_str())];
    let resolution = handler
        .resolve_senders(Some(senders.as_slice()))
        .into_iter()
        .next()
        .unwrap_or(PersonResolution::NeedsValue);

    let resolved = match resolution {
        PersonResolution::Success(person) => person,
        _ => {
            let query = senders[0].to_query_user();
            let outcome = engine.resolve_person(&query, false);
            ResolutionOutput::from_outcome(&query, &outcome).render(format)?;
            return Ok(ExitCode::from_outcome(&outcome));
        }
    };

    let intent = SearchForMessagesIntent::from_senders(vec![resolved.clone()]);
    let response = handler.handle(&intent)?;
    HistoryOutput::new(resolved.display_name, response.messages).render(format)?;

    Ok(ExitCode::Success)
}
