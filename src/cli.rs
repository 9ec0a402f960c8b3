use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ClusterMode;

#[derive(Parser)]
#[command(
    name = "cardsmith",
    about = "Turn study notes into deduplicated flashcards",
    version
)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(global = true, long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract, deduplicate and create cards from a notes file (or stdin)
    Generate {
        /// Owner of the deck
        #[arg(long)]
        user: String,

        /// Target deck id
        #[arg(long)]
        deck: String,

        /// Notes file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,

        /// LLM provider override (openai, anthropic, ollama)
        #[arg(long)]
        provider: Option<String>,

        /// How similar candidates are grouped before merging
        #[arg(long, value_enum, default_value_t = ClusterMode::Seed)]
        cluster_mode: ClusterMode,

        /// Words per chunk sent to the model
        #[arg(long, default_value = "1500")]
        chunk_size: usize,

        /// Words shared between consecutive chunks
        #[arg(long, default_value = "200")]
        overlap: usize,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview how a notes file would be chunked (no network)
    Segment {
        /// Notes file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long, default_value = "1500")]
        chunk_size: usize,

        #[arg(long, default_value = "200")]
        overlap: usize,
    },

    /// Manage decks in the card store
    Decks {
        #[command(subcommand)]
        command: DecksCommand,
    },

    /// Inspect cards in the card store
    Cards {
        #[command(subcommand)]
        command: CardsCommand,
    },

    /// Manage LLM provider credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand)]
pub enum DecksCommand {
    /// List a user's decks
    List {
        #[arg(long)]
        user: String,
    },
    /// Create a deck
    Create {
        #[arg(long)]
        user: String,
        /// Deck name
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show one deck
    Show {
        #[arg(long)]
        user: String,
        deck: String,
    },
    /// Rename a deck or change its description
    Update {
        #[arg(long)]
        user: String,
        deck: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a deck
    Delete {
        #[arg(long)]
        user: String,
        deck: String,
    },
}

#[derive(Subcommand)]
pub enum CardsCommand {
    /// List cards in a deck
    List {
        #[arg(long)]
        user: String,
        #[arg(long)]
        deck: String,
    },
    /// Show one card, including its scheduling state
    Show {
        #[arg(long)]
        user: String,
        #[arg(long)]
        deck: String,
        card: String,
    },
    /// Rewrite a card's question or answer
    Edit {
        #[arg(long)]
        user: String,
        #[arg(long)]
        deck: String,
        card: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
    },
    /// Delete a card
    Delete {
        #[arg(long)]
        user: String,
        #[arg(long)]
        deck: String,
        card: String,
    },
}

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Store an API key for a provider
    Login {
        /// Provider name (openai, anthropic, ollama)
        #[arg(long)]
        provider: Option<String>,
        /// Make this the default provider
        #[arg(long)]
        set_default: bool,
    },
    /// List providers and where their credentials come from
    List,
    /// Remove stored credentials
    Logout {
        provider: String,
    },
    /// Show the provider that would be used
    Status,
}
