pub mod auth;
pub mod generate;
pub mod segment;
pub mod store;

use std::io::Read;
use std::path::Path;

use cardsmith::error::{CardsmithError, Result};

/// Commands drive async code from a synchronous `main`.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CardsmithError::Config(format!("tokio runtime: {}", e)))
}

/// Notes from a file, or stdin when no path is given.
fn read_notes(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
