use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use dk_engine::{Deck, DeckConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the JSON-RPC stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let root = match std::env::var_os("DECKARD_ROOT") {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("cannot resolve working directory")?,
    };
    let deck = Deck::open(DeckConfig::at(&root))
        .with_context(|| format!("cannot open deck at {}", root.display()))?;

    tracing::info!(root = %root.display(), "deckard serving on stdio");
    dk_mcp::serve_stdio(&deck).await?;
    Ok(())
}
