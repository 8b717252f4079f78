//! Output formatting for the contact resolution CLI
//!
//! Every command result renders as JSON, YAML, or a colored table.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::contracts::{DisambiguationKind, RankedCandidate, ResolutionOutcome, User};
use crate::error::{ResolutionError, Result};
use crate::intents::HostMessage;
use crate::store::ContactStore;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// A user as shown in command output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactOutput {
    pub screen_name: String,
    pub name: String,
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl ContactOutput {
    pub fn from_user(user: &User) -> Self {
        Self {
            screen_name: user.screen_name.clone(),
            name: user.formatted_name(),
            favorite: user.is_favorite,
            phone_numbers: user.phone_numbers.iter().map(|p| p.to_string()).collect(),
            score: None,
        }
    }

    pub fn from_candidate(candidate: &RankedCandidate) -> Self {
        Self {
            score: Some(candidate.score),
            ..Self::from_user(&candidate.user)
        }
    }

    fn write_row(&self, out: &mut dyn Write, marker: &str) -> io::Result<()> {
        let star = if self.favorite {
            "*".yellow().to_string()
        } else {
            " ".to_string()
        };
        let name = if self.name.is_empty() {
            "-".dimmed().to_string()
        } else {
            self.name.bold().to_string()
        };
        write!(out, "  {} {}{} (@{})", marker.blue(), star, name, self.screen_name)?;
        if let Some(score) = self.score {
            write!(out, "  {}", format!("score {}", score).cyan())?;
        }
        writeln!(out)?;
        for phone_number in &self.phone_numbers {
            writeln!(out, "      {} {}", "tel".dimmed(), phone_number)?;
        }
        Ok(())
    }
}

/// Result of the `resolve` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionOutput {
    pub query: String,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<DisambiguationKind>,
    pub candidates: Vec<ContactOutput>,
    pub summary: String,
}

impl ResolutionOutput {
    pub fn from_outcome(query: &User, outcome: &ResolutionOutcome) -> Self {
        let disambiguation = match outcome {
            ResolutionOutcome::Disambiguation { kind, .. } => Some(*kind),
            _ => None,
        };
        let candidates: Vec<_> = outcome.users().iter().map(ContactOutput::from_user).collect();

        let summary = match outcome {
            ResolutionOutcome::Success(user) => format!("Resolved to {}", user),
            ResolutionOutcome::ConfirmationRequired(user) => {
                format!("Did you mean {}?", user)
            }
            ResolutionOutcome::Disambiguation {
                kind: DisambiguationKind::Person,
                options,
            } => format!("{} people match; pick one", options.len()),
            ResolutionOutcome::Disambiguation {
                kind: DisambiguationKind::PhoneNumber,
                options,
            } => format!("{} phone numbers; pick one", options.len()),
            ResolutionOutcome::NeedsValue => "Nobody was given to resolve".to_string(),
            ResolutionOutcome::Unsupported => "No contact matches".to_string(),
        };

        Self {
            query: query.to_string(),
            outcome: outcome.label().to_string(),
            disambiguation,
            candidates,
            summary,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                self.write_table(&mut io::stdout())?;
                Ok(())
            }
            _ => print_serialized(self, format),
        }
    }

    pub fn write_table(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "Resolution".cyan().bold())?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "Query:   {}", self.query)?;

        let outcome = match self.outcome.as_str() {
            "success" => self.outcome.green().bold(),
            "confirmation_required" | "disambiguation" => self.outcome.yellow().bold(),
            _ => self.outcome.red().bold(),
        };
        writeln!(out, "Outcome: {}", outcome)?;
        writeln!(out, "{}", self.summary)?;

        if !self.candidates.is_empty() {
            writeln!(out)?;
            for (index, candidate) in self.candidates.iter().enumerate() {
                candidate.write_row(out, &format!("{}.", index + 1))?;
            }
        }
        Ok(())
    }
}

/// Result of the `rank` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingOutput {
    pub query: String,
    pub partial_match_set: bool,
    pub candidates: Vec<ContactOutput>,
}

impl RankingOutput {
    pub fn from_ranked(query: &User, ranked: &[RankedCandidate]) -> Self {
        Self {
            query: query.to_string(),
            partial_match_set: ranked.first().map_or(false, |c| c.is_partial_match_set),
            candidates: ranked.iter().map(ContactOutput::from_candidate).collect(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                self.write_table(&mut io::stdout())?;
                Ok(())
            }
            _ => print_serialized(self, format),
        }
    }

    pub fn write_table(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "Ranking".cyan().bold())?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "Query: {}", self.query)?;
        if self.partial_match_set {
            writeln!(out, "{} no exact match; showing partial matches", "!".yellow())?;
        }
        writeln!(out)?;

        if self.candidates.is_empty() {
            writeln!(out, "  {}", "No candidates".dimmed())?;
        }
        for (index, candidate) in self.candidates.iter().enumerate() {
            candidate.write_row(out, &format!("{}.", index + 1))?;
        }
        Ok(())
    }
}

/// Result of the `contacts` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactListOutput {
    pub total: usize,
    pub contacts: Vec<ContactOutput>,
}

impl ContactListOutput {
    pub fn from_store(store: &ContactStore) -> Self {
        Self {
            total: store.len(),
            contacts: store.users().iter().map(ContactOutput::from_user).collect(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                self.write_table(&mut io::stdout())?;
                Ok(())
            }
            _ => print_serialized(self, format),
        }
    }

    pub fn write_table(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{} ({})", "Contacts".cyan().bold(), self.total)?;
        writeln!(out, "{}", "=".repeat(60))?;
        for contact in &self.contacts {
            contact.write_row(out, "-")?;
        }
        Ok(())
    }
}

/// Result of the `history` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryOutput {
    pub sender: String,
    pub messages: Vec<HostMessage>,
}

impl HistoryOutput {
    pub fn new(sender: impl Into<String>, messages: Vec<HostMessage>) -> Self {
        Self {
            sender: sender.into(),
            messages,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                self.write_table(&mut io::stdout())?;
                Ok(())
            }
            _ => print_serialized(self, format),
        }
    }

    pub fn write_table(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{} {}", "Messages from".cyan().bold(), self.sender.bold())?;
        writeln!(out, "{}", "=".repeat(60))?;
        if self.messages.is_empty() {
            writeln!(out, "  {}", "No messages".dimmed())?;
        }
        for message in &self.messages {
            let date = message
                .date_sent
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let recipients: Vec<_> = message
                .recipients
                .iter()
                .map(|p| p.display_name.as_str())
                .collect();
            writeln!(
                out,
                "  [{}] {} {} {}",
                message.identifier,
                date.dimmed(),
                "->".blue(),
                recipients.join(", ")
            )?;
            writeln!(out, "      {}", message.content)?;
        }
        Ok(())
    }
}

fn print_serialized<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| ResolutionError::SerializationError(e.to_string()))?,
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| ResolutionError::SerializationError(e.to_string()))?,
        OutputFormat::Table => {
            return Err(ResolutionError::InternalError(
                "table output has no serialized form".to_string(),
            ))
        }
    };
    println!("{}", text);
    Ok(())
}
