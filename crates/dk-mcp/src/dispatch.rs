//! Tool dispatch: typed inputs, named operations, JSON envelopes.
//!
//! Success responses carry the operation's result object; failures carry
//! `{"isError": true, "text": <message>}`. Unknown tool names are the one
//! protocol-level error and never produce an envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use dk_core::{CardStatus, CodeLinkSpec, RelationSpec};
use dk_engine::ops::{self, CreateCardInput, GraphDirection, GraphOptions, UpdateCardInput};
use dk_engine::{Deck, EngineError};
use dk_storage::CardFilter;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Failed(String),
}

impl From<EngineError> for ToolError {
    fn from(err: EngineError) -> Self {
        Self::Failed(err.to_string())
    }
}

/// The failure envelope of the tool surface.
pub fn error_envelope(text: &str) -> Value {
    json!({ "isError": true, "text": text })
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::Failed(format!("invalid input: {e}")))
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CardCreateArgs {
    slug: String,
    summary: String,
    #[serde(default)]
    status: Option<CardStatus>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    constraints: Option<Value>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    relations: Option<Vec<RelationSpec>>,
    #[serde(default)]
    code_links: Option<Vec<CodeLinkSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyArgs {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CardUpdateArgs {
    key: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<CardStatus>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    constraints: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    keywords: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option")]
    tags: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option")]
    relations: Option<Option<Vec<RelationSpec>>>,
    #[serde(default, deserialize_with = "double_option")]
    code_links: Option<Option<Vec<CodeLinkSpec>>>,
}

impl CardUpdateArgs {
    /// `null` list fields mean "delete", which the engine spells as an empty
    /// vec.
    fn into_input(self) -> UpdateCardInput {
        UpdateCardInput {
            summary: self.summary,
            status: self.status,
            body: self.body,
            constraints: self.constraints,
            keywords: self.keywords.map(|v| v.unwrap_or_default()),
            tags: self.tags.map(|v| v.unwrap_or_default()),
            relations: self.relations.map(|v| v.unwrap_or_default()),
            code_links: self.code_links.map(|v| v.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CardUpdateStatusArgs {
    key: String,
    status: CardStatus,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CardRenameArgs {
    key: String,
    new_slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirArgs {
    #[serde(default)]
    dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CardGraphArgs {
    key: String,
    #[serde(default)]
    max_depth: Option<u32>,
    #[serde(default)]
    direction: Option<GraphDirection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymbolArgs {
    symbol: String,
    #[serde(default)]
    file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilesArgs {
    files: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListArgs {
    #[serde(default)]
    status: Option<CardStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EmptyArgs {}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Failed(e.to_string()))
}

/// Run a named tool against a deck.
pub async fn call_tool(deck: &Deck, name: &str, args: Value) -> Result<Value, ToolError> {
    match name {
        "card_create" => {
            let args: CardCreateArgs = parse_args(args)?;
            let card = ops::create_card(
                deck,
                CreateCardInput {
                    slug: args.slug,
                    summary: args.summary,
                    status: args.status,
                    body: args.body,
                    constraints: args.constraints,
                    keywords: args.keywords,
                    tags: args.tags,
                    relations: args.relations,
                    code_links: args.code_links,
                },
            )
            .await?;
            to_value(&card)
        }
        "card_get" => {
            let args: KeyArgs = parse_args(args)?;
            let card = ops::get_card(deck, &args.key).await?;
            to_value(&card)
        }
        "card_update" => {
            let args: CardUpdateArgs = parse_args(args)?;
            let key = args.key.clone();
            let card = ops::update_card(deck, &key, args.into_input()).await?;
            to_value(&card)
        }
        "card_update_status" => {
            let args: CardUpdateStatusArgs = parse_args(args)?;
            let card = ops::update_card_status(deck, &args.key, args.status).await?;
            to_value(&card)
        }
        "card_delete" => {
            let args: KeyArgs = parse_args(args)?;
            ops::delete_card(deck, &args.key).await?;
            Ok(json!({ "key": args.key, "deleted": true }))
        }
        "card_rename" => {
            let args: CardRenameArgs = parse_args(args)?;
            let card = ops::rename_card(deck, &args.key, &args.new_slug).await?;
            to_value(&card)
        }
        "card_sync" => {
            let args: DirArgs = parse_args(args)?;
            let report = ops::bulk_sync(deck, args.dir.as_deref().map(std::path::Path::new)).await?;
            to_value(&report)
        }
        "card_validate" => {
            let args: DirArgs = parse_args(args)?;
            let report =
                ops::validate_cards(deck, args.dir.as_deref().map(std::path::Path::new)).await?;
            to_value(&report)
        }
        "card_export" => {
            let args: KeyArgs = parse_args(args)?;
            let card = ops::export_card_to_file(deck, &args.key).await?;
            to_value(&card)
        }
        "card_context" => {
            let args: KeyArgs = parse_args(args)?;
            let context = ops::get_card_context(deck, &args.key).await?;
            to_value(&context)
        }
        "card_graph" => {
            let args: CardGraphArgs = parse_args(args)?;
            let nodes = ops::get_relation_graph(
                deck,
                &args.key,
                GraphOptions {
                    max_depth: args.max_depth,
                    direction: args.direction.unwrap_or_default(),
                },
            )
            .await?;
            Ok(json!({ "nodes": nodes }))
        }
        "card_links_resolve" => {
            let args: KeyArgs = parse_args(args)?;
            let links = ops::resolve_card_code_links(deck, &args.key).await?;
            Ok(json!({ "links": links }))
        }
        "card_links_validate" => {
            let args: KeyArgs = parse_args(args)?;
            let issues = ops::validate_code_links(deck, &args.key).await?;
            Ok(json!({ "issues": issues }))
        }
        "cards_by_symbol" => {
            let args: SymbolArgs = parse_args(args)?;
            let cards = ops::find_cards_by_symbol(deck, &args.symbol, args.file.as_deref()).await?;
            Ok(json!({ "cards": cards }))
        }
        "cards_affected" => {
            let args: FilesArgs = parse_args(args)?;
            let cards = ops::find_affected_cards(deck, &args.files).await?;
            Ok(json!({ "cards": cards }))
        }
        "card_list" => {
            let args: ListArgs = parse_args(args)?;
            let cards = ops::list_cards(deck, CardFilter { status: args.status }).await?;
            Ok(json!({ "cards": cards }))
        }
        "card_search" => {
            let args: SearchArgs = parse_args(args)?;
            let cards = ops::search_cards(deck, &args.query).await?;
            Ok(json!({ "cards": cards }))
        }
        "card_prune" => {
            let _: EmptyArgs = parse_args(args)?;
            let removed = ops::prune_orphan_names(deck).await?;
            Ok(json!({ "removed": removed }))
        }
        "deck_status" => {
            let _: EmptyArgs = parse_args(args)?;
            let status = ops::deck_status(deck).await?;
            to_value(&status)
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}
