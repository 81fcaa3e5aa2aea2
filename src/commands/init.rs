//! The `init` command: creates the data directory, configuration and an
//! empty database.

use crate::commands::Out;
use crate::model::Currency;
use crate::{Config, Result};
use std::path::Path;

/// Initializes the splitbill home directory at `home`.
///
/// # Errors
/// - Returns an error if a database already exists at the location or any
///   file operation fails.
pub async fn init(home: &Path, currency: Currency) -> Result<Out<String>> {
    let config = Config::create(home, currency).await?;
    let message = format!(
        "Initialized splitbill home at '{}' with default currency {}",
        config.root().display(),
        config.default_currency()
    );
    let root = config.root().display().to_string();
    Ok(Out::new(message, root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("splitbill");

        let out = init(&home, Currency::Eur).await.unwrap();

        assert!(out.message().contains("Initialized splitbill home"));
        assert!(out.message().contains("EUR"));
        assert!(home.join("config.json").is_file());
        assert!(home.join("splitbill.sqlite").is_file());
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("splitbill");

        init(&home, Currency::Usd).await.unwrap();
        assert!(init(&home, Currency::Usd).await.is_err());
    }
}
