use serde::Serialize;

use dk_core::{normalize_slug, CodeLink};

use crate::deck::Deck;
use crate::error::EngineError;
use crate::gildash::{Gildash, SymbolHit};

/// A code link paired with the indexed symbol it resolved to, if any.
#[derive(Debug, Serialize)]
pub struct ResolvedCodeLink {
    pub link: CodeLink,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolHit>,
}

/// Why a code link failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkIssue {
    SymbolNotFound,
    FileNotIndexed,
}

#[derive(Debug, Serialize)]
pub struct CodeLinkIssue {
    pub link: CodeLink,
    pub issue: LinkIssue,
}

/// Resolve every code link of `key` against the gildash indexer.
/// Raises [`EngineError::GildashNotConfigured`] when none is attached.
pub async fn resolve_card_code_links(
    deck: &Deck,
    key: &str,
) -> Result<Vec<ResolvedCodeLink>, EngineError> {
    let gildash = deck.gildash().ok_or(EngineError::GildashNotConfigured)?;
    let key = normalize_slug(key)?;
    let links = deck.store().code_links().find_by_card_key(&key)?;
    Ok(resolve_links(gildash, links).await)
}

/// Check every code link of `key` against the indexer, reporting unmatched
/// symbols and unindexed files.
pub async fn validate_code_links(
    deck: &Deck,
    key: &str,
) -> Result<Vec<CodeLinkIssue>, EngineError> {
    let gildash = deck.gildash().ok_or(EngineError::GildashNotConfigured)?;
    let key = normalize_slug(key)?;

    let mut issues = Vec::new();
    for link in deck.store().code_links().find_by_card_key(&key)? {
        match gildash.find_symbols(&link.symbol, Some(&link.file)).await {
            Ok(hits) => {
                if exact_match(&hits, &link).is_none() {
                    issues.push(CodeLinkIssue {
                        link,
                        issue: LinkIssue::SymbolNotFound,
                    });
                }
            }
            Err(e) => {
                tracing::debug!(symbol = %link.symbol, file = %link.file, error = %e, "gildash lookup failed");
                issues.push(CodeLinkIssue {
                    link,
                    issue: LinkIssue::FileNotIndexed,
                });
            }
        }
    }
    Ok(issues)
}

/// Resolve links best-effort: indexer errors leave the link unresolved.
pub(crate) async fn resolve_links(
    gildash: &dyn Gildash,
    links: Vec<CodeLink>,
) -> Vec<ResolvedCodeLink> {
    let mut resolved = Vec::with_capacity(links.len());
    for link in links {
        let symbol = match gildash.find_symbols(&link.symbol, Some(&link.file)).await {
            Ok(hits) => exact_match(&hits, &link).cloned(),
            Err(e) => {
                tracing::debug!(symbol = %link.symbol, file = %link.file, error = %e, "gildash lookup failed");
                None
            }
        };
        resolved.push(ResolvedCodeLink { link, symbol });
    }
    resolved
}

/// The first hit agreeing with the link on both name and file.
fn exact_match<'a>(hits: &'a [SymbolHit], link: &CodeLink) -> Option<&'a SymbolHit> {
    hits.iter()
        .find(|hit| hit.name == link.symbol && hit.file == link.file)
}
