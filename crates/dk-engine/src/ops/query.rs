use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use dk_codec::CardFile;
use dk_core::{normalize_slug, Card};
use dk_storage::CardFilter;

use crate::deck::Deck;
use crate::error::EngineError;
use crate::fileio;

use super::links::{resolve_links, ResolvedCodeLink};

/// Read a card from its file (the source of truth). Lock-free.
pub async fn get_card(deck: &Deck, key: &str) -> Result<CardFile, EngineError> {
    let key = normalize_slug(key)?;
    let path = deck.card_path(&key);
    fileio::read_card(&path)
        .await?
        .ok_or(EngineError::CardNotFound { key })
}

/// List card rows, optionally filtered by status, ordered by key.
pub async fn list_cards(deck: &Deck, filter: CardFilter) -> Result<Vec<Card>, EngineError> {
    Ok(deck.store().cards().list(&filter)?)
}

/// Full-text search over keys, summaries, and bodies.
pub async fn search_cards(deck: &Deck, query: &str) -> Result<Vec<Card>, EngineError> {
    Ok(deck.store().cards().search(query)?)
}

/// Aggregate snapshot of a deck, for the status surface.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStatus {
    pub cards_dir: String,
    pub card_count: usize,
    /// `status → count`, only for statuses that occur.
    pub cards_by_status: Vec<StatusCount>,
    pub relation_count: usize,
    pub code_link_count: usize,
    pub keyword_count: usize,
    pub tag_count: usize,
    pub gildash_configured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: dk_core::CardStatus,
    pub count: usize,
}

/// Summarize the deck: row counts across all tables plus configuration.
pub async fn deck_status(deck: &Deck) -> Result<DeckStatus, EngineError> {
    let store = deck.store();
    let (keyword_count, tag_count) = store.classifications().count_names()?;
    Ok(DeckStatus {
        cards_dir: deck.cards_dir().to_string_lossy().into_owned(),
        card_count: store.cards().count()?,
        cards_by_status: store
            .cards()
            .count_by_status()?
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        relation_count: store.relations().count()?,
        code_link_count: store.code_links().count()?,
        keyword_count,
        tag_count,
        gildash_configured: deck.gildash().is_some(),
    })
}

/// A card with its resolved code links and direct graph neighbors.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardContext {
    pub card: Card,
    /// Empty when no gildash indexer is configured.
    pub code_links: Vec<ResolvedCodeLink>,
    /// Cards that declared an edge pointing at this card.
    pub upstream_cards: Vec<Card>,
    /// Cards this card's forward edges point at.
    pub downstream_cards: Vec<Card>,
}

/// Assemble a card's context. A missing gildash indexer degrades to empty
/// resolutions rather than an error.
pub async fn get_card_context(deck: &Deck, key: &str) -> Result<CardContext, EngineError> {
    let key = normalize_slug(key)?;
    let card = deck
        .store()
        .cards()
        .find_by_key(&key)?
        .ok_or_else(|| EngineError::CardNotFound { key: key.clone() })?;

    let code_links = match deck.gildash() {
        Some(gildash) => {
            let links = deck.store().code_links().find_by_card_key(&key)?;
            resolve_links(gildash, links).await
        }
        None => Vec::new(),
    };

    let mut upstream_cards = Vec::new();
    let mut downstream_cards = Vec::new();
    for edge in deck.store().relations().find_by_card_key(&key)? {
        if let Some(neighbor) = deck.store().cards().find_by_key(&edge.dst_card_key)? {
            if edge.is_reverse {
                upstream_cards.push(neighbor);
            } else {
                downstream_cards.push(neighbor);
            }
        }
    }

    Ok(CardContext {
        card,
        code_links,
        upstream_cards,
        downstream_cards,
    })
}

/// Which edges a traversal follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphDirection {
    Forward,
    Backward,
    #[default]
    Both,
}

/// The direction an emitted node was reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphOptions {
    /// `None` means unbounded; 0 yields an empty traversal.
    pub max_depth: Option<u32>,
    pub direction: GraphDirection,
}

/// A card reached by [`get_relation_graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub key: String,
    pub depth: u32,
    /// Type of the edge that first reached this card.
    pub relation_type: String,
    pub direction: EdgeDirection,
}

/// Breadth-first traversal over the relation edges from `key`.
///
/// Each reached card is emitted at most once, at its minimum depth; the root
/// is not emitted. A missing root yields an empty traversal. Expansion
/// follows the repository's insertion order, so repeated calls on an
/// unchanged store return identical results.
pub async fn get_relation_graph(
    deck: &Deck,
    key: &str,
    options: GraphOptions,
) -> Result<Vec<GraphNode>, EngineError> {
    let key = normalize_slug(key)?;
    if options.max_depth == Some(0) || !deck.store().cards().exists_by_key(&key)? {
        return Ok(Vec::new());
    }

    let mut visited: HashSet<String> = HashSet::from([key.clone()]);
    let mut frontier = vec![key];
    let mut results = Vec::new();
    let mut depth = 0u32;

    while !frontier.is_empty() && options.max_depth.map_or(true, |max| depth < max) {
        depth += 1;
        let mut next_frontier = Vec::new();
        for current in &frontier {
            for edge in deck.store().relations().find_by_card_key(current)? {
                let follow = match options.direction {
                    GraphDirection::Forward => !edge.is_reverse,
                    GraphDirection::Backward => edge.is_reverse,
                    GraphDirection::Both => true,
                };
                if !follow {
                    continue;
                }
                // Orphan edges (no row for the target) are skipped.
                if !deck.store().cards().exists_by_key(&edge.dst_card_key)? {
                    continue;
                }
                if visited.insert(edge.dst_card_key.clone()) {
                    results.push(GraphNode {
                        key: edge.dst_card_key.clone(),
                        depth,
                        relation_type: edge.rel_type.clone(),
                        direction: if edge.is_reverse {
                            EdgeDirection::Backward
                        } else {
                            EdgeDirection::Forward
                        },
                    });
                    next_frontier.push(edge.dst_card_key);
                }
            }
        }
        frontier = next_frontier;
    }

    Ok(results)
}

/// Cards holding a code link for `symbol`, deduplicated, in discovery order.
pub async fn find_cards_by_symbol(
    deck: &Deck,
    symbol: &str,
    file: Option<&str>,
) -> Result<Vec<Card>, EngineError> {
    let links = deck.store().code_links().find_by_symbol(symbol, file)?;
    cards_for_links(deck, links)
}

/// Cards whose code links touch any of `files`. Empty input yields empty
/// output.
pub async fn find_affected_cards(deck: &Deck, files: &[String]) -> Result<Vec<Card>, EngineError> {
    let mut links = Vec::new();
    for file in files {
        links.extend(deck.store().code_links().find_by_file(file)?);
    }
    cards_for_links(deck, links)
}

fn cards_for_links(
    deck: &Deck,
    links: Vec<dk_core::CodeLink>,
) -> Result<Vec<Card>, EngineError> {
    let mut seen = HashSet::new();
    let mut cards = Vec::new();
    for link in links {
        if !seen.insert(link.card_key.clone()) {
            continue;
        }
        // Links whose card row has vanished are skipped.
        if let Some(card) = deck.store().cards().find_by_key(&link.card_key)? {
            cards.push(card);
        }
    }
    Ok(cards)
}
