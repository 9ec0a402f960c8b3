use colored::Colorize;

use super::runtime;
use cardsmith::card::{ExistingCard, EMBEDDING_KEY};
use cardsmith::config::StoreConfig;
use cardsmith::error::{CardsmithError, Result};
use cardsmith::store::{CardStore, DeckDraft, HttpCardStore};

fn store() -> Result<HttpCardStore> {
    Ok(HttpCardStore::new(&StoreConfig::from_env()?))
}

pub fn cmd_decks_list(user: &str) -> Result<()> {
    let store = store()?;
    let decks = runtime()?.block_on(store.list_decks(user))?;

    if decks.is_empty() {
        println!("{} No decks for {}.", "Note:".yellow(), user);
        return Ok(());
    }

    println!("{}", "Decks".green().bold());
    println!("{}", "=".repeat(40));
    for deck in decks {
        println!("  {}  {}", deck.id.dimmed(), deck.name.cyan().bold());
        if let Some(description) = deck.description.filter(|d| !d.is_empty()) {
            println!("      {}", description);
        }
    }
    Ok(())
}

pub fn cmd_decks_create(user: &str, name: &str, description: Option<String>) -> Result<()> {
    let store = store()?;
    let draft = DeckDraft {
        name: Some(name.to_string()),
        description,
    };
    let deck = runtime()?.block_on(store.create_deck(user, &draft))?;
    println!(
        "{} Created deck {} ({}).",
        "Done!".green().bold(),
        deck.name.cyan(),
        deck.id
    );
    Ok(())
}

pub fn cmd_decks_show(user: &str, deck: &str) -> Result<()> {
    let store = store()?;
    let rt = runtime()?;
    let deck = rt.block_on(store.get_deck(user, deck))?;
    let cards = rt.block_on(store.list_cards(user, &deck.id))?;

    println!("{} {}", deck.name.cyan().bold(), deck.id.dimmed());
    if let Some(description) = deck.description.filter(|d| !d.is_empty()) {
        println!("  {}", description);
    }
    if let Some(created) = deck.created_at {
        println!("  Created: {}", created.format("%Y-%m-%d %H:%M"));
    }
    println!("  Cards:   {}", cards.len());
    Ok(())
}

pub fn cmd_decks_update(
    user: &str,
    deck: &str,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if name.is_none() && description.is_none() {
        return Err(CardsmithError::Config(
            "Nothing to update. Pass --name and/or --description".into(),
        ));
    }
    let store = store()?;
    let draft = DeckDraft { name, description };
    let deck = runtime()?.block_on(store.update_deck(user, deck, &draft))?;
    println!("{} Updated deck {}.", "Done!".green().bold(), deck.name.cyan());
    Ok(())
}

pub fn cmd_decks_delete(user: &str, deck: &str) -> Result<()> {
    let store = store()?;
    runtime()?.block_on(store.delete_deck(user, deck))?;
    println!("{} Deleted deck {}.", "Done!".green().bold(), deck);
    Ok(())
}

pub fn cmd_cards_list(user: &str, deck: &str) -> Result<()> {
    let store = store()?;
    let cards = runtime()?.block_on(store.list_cards(user, deck))?;

    println!("{} {} card(s)", "Deck".green().bold(), cards.len());
    for card in &cards {
        let embedded = if ExistingCard::from_card(card).embedding.is_some() {
            "embedded".green()
        } else {
            "no embedding".dimmed()
        };
        println!("  {} {}  [{}]", "•".cyan(), card.front(), embedded);
        println!("    {}", card.back().dimmed());
    }
    Ok(())
}

pub fn cmd_cards_show(user: &str, deck: &str, card: &str) -> Result<()> {
    let store = store()?;
    let card = runtime()?.block_on(store.get_card(user, deck, card))?;

    println!("{} {}", "Card".green().bold(), card.id.dimmed());
    println!("  Front: {}", card.front());
    println!("  Back:  {}", card.back());
    if let Some(ref fsrs) = card.fsrs {
        println!("  FSRS:  {}", fsrs.to_string().dimmed());
    }
    Ok(())
}

/// Replaces the card's data. A changed front invalidates the cached embedding.
pub fn cmd_cards_edit(
    user: &str,
    deck: &str,
    card_id: &str,
    front: Option<String>,
    back: Option<String>,
) -> Result<()> {
    if front.is_none() && back.is_none() {
        return Err(CardsmithError::Config(
            "Nothing to edit. Pass --front and/or --back".into(),
        ));
    }
    let store = store()?;
    let rt = runtime()?;
    let card = rt.block_on(store.get_card(user, deck, card_id))?;

    let mut data = card.data.clone();
    if let Some(front) = front.map(|f| f.trim().to_string()).filter(|f| !f.is_empty()) {
        if front != card.front() {
            data.remove(EMBEDDING_KEY);
        }
        data.insert("front".into(), front.into());
    }
    if let Some(back) = back.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()) {
        data.insert("back".into(), back.into());
    }

    let updated = rt.block_on(store.update_card(user, deck, card_id, data))?;
    println!("{} Updated card {}.", "Done!".green().bold(), updated.id);
    println!("  {} {}", "•".cyan(), updated.front());
    println!("    {}", updated.back().dimmed());
    Ok(())
}

pub fn cmd_cards_delete(user: &str, deck: &str, card: &str) -> Result<()> {
    let store = store()?;
    runtime()?.block_on(store.delete_card(user, deck, card))?;
    println!("{} Deleted card {}.", "Done!".green().bold(), card);
    Ok(())
}
