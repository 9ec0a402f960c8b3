mod commands;

use clap::Parser;
use cardsmith::cli::{AuthCommand, CardsCommand, Cli, Commands, DecksCommand};
use cardsmith::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::auth::{cmd_auth_list, cmd_auth_login, cmd_auth_logout, cmd_auth_status};
use commands::generate::{cmd_generate, GenerateArgs};
use commands::segment::cmd_segment;
use commands::store::{
    cmd_cards_delete, cmd_cards_edit, cmd_cards_list, cmd_cards_show, cmd_decks_create,
    cmd_decks_delete, cmd_decks_list, cmd_decks_show, cmd_decks_update,
};

fn init_logging(verbose: bool) {
    let default = if verbose { "cardsmith=debug" } else { "cardsmith=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            user,
            deck,
            file,
            provider,
            cluster_mode,
            chunk_size,
            overlap,
            json,
        } => cmd_generate(GenerateArgs {
            user: &user,
            deck: &deck,
            file: file.as_deref(),
            provider: provider.as_deref(),
            cluster_mode,
            chunk_size,
            overlap,
            json,
        }),
        Commands::Segment {
            file,
            chunk_size,
            overlap,
        } => cmd_segment(file.as_deref(), chunk_size, overlap),
        Commands::Decks { command } => match command {
            DecksCommand::List { user } => cmd_decks_list(&user),
            DecksCommand::Create {
                user,
                name,
                description,
            } => cmd_decks_create(&user, &name, description),
            DecksCommand::Show { user, deck } => cmd_decks_show(&user, &deck),
            DecksCommand::Update {
                user,
                deck,
                name,
                description,
            } => cmd_decks_update(&user, &deck, name, description),
            DecksCommand::Delete { user, deck } => cmd_decks_delete(&user, &deck),
        },
        Commands::Cards { command } => match command {
            CardsCommand::List { user, deck } => cmd_cards_list(&user, &deck),
            CardsCommand::Show { user, deck, card } => cmd_cards_show(&user, &deck, &card),
            CardsCommand::Edit {
                user,
                deck,
                card,
                front,
                back,
            } => cmd_cards_edit(&user, &deck, &card, front, back),
            CardsCommand::Delete { user, deck, card } => cmd_cards_delete(&user, &deck, &card),
        },
        Commands::Auth { command } => match command {
            AuthCommand::Login {
                provider,
                set_default,
            } => cmd_auth_login(provider, set_default),
            AuthCommand::List => cmd_auth_list(),
            AuthCommand::Logout { provider } => cmd_auth_logout(&provider),
            AuthCommand::Status => cmd_auth_status(),
        },
    }
}
