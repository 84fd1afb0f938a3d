//! Tool catalog served over `tools/list`.

use serde_json::json;

/// Definitions for every tool the surface exposes: name, description, and
/// JSON input schema.
pub fn tool_definitions() -> serde_json::Value {
    let key_only = json!({
        "type": "object",
        "properties": {
            "key": { "type": "string", "description": "Card key, e.g. 'auth/login-flow'" }
        },
        "required": ["key"]
    });
    let dir_only = json!({
        "type": "object",
        "properties": {
            "dir": { "type": "string", "description": "Directory to scan (default: the cards directory)" }
        }
    });
    let relation_items = json!({
        "type": "object",
        "properties": {
            "type": { "type": "string", "description": "Relation type from the allow-list (e.g. 'depends-on')" },
            "target": { "type": "string", "description": "Key of the target card" }
        },
        "required": ["type", "target"]
    });
    let code_link_items = json!({
        "type": "object",
        "properties": {
            "kind": { "type": "string", "description": "Symbol kind (e.g. 'fn', 'struct')" },
            "file": { "type": "string", "description": "Source file the symbol lives in" },
            "symbol": { "type": "string", "description": "Symbol name" }
        },
        "required": ["kind", "file", "symbol"]
    });
    let status_enum = json!({
        "type": "string",
        "enum": ["draft", "accepted", "implementing", "implemented", "deprecated"]
    });

    json!([
        {
            "name": "card_create",
            "description": "Create a design card: writes the card file and indexes it in one transaction. Status defaults to 'draft'.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "slug": { "type": "string", "description": "Key for the new card; may contain '/' for nesting" },
                    "summary": { "type": "string", "description": "One-line summary (max 500 chars)" },
                    "status": status_enum,
                    "body": { "type": "string", "description": "Markdown body" },
                    "constraints": { "description": "Opaque JSON constraints payload" },
                    "keywords": { "type": "array", "items": { "type": "string" } },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "relations": { "type": "array", "items": relation_items },
                    "codeLinks": { "type": "array", "items": code_link_items }
                },
                "required": ["slug", "summary"]
            }
        },
        {
            "name": "card_get",
            "description": "Read a card from its file.",
            "inputSchema": key_only
        },
        {
            "name": "card_update",
            "description": "Update card fields. Omitted fields keep their value; null (or an empty list) deletes an optional field.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "summary": { "type": "string" },
                    "status": status_enum,
                    "body": { "type": "string" },
                    "constraints": { "description": "New constraints payload, or null to delete" },
                    "keywords": { "type": ["array", "null"], "items": { "type": "string" } },
                    "tags": { "type": ["array", "null"], "items": { "type": "string" } },
                    "relations": { "type": ["array", "null"], "items": relation_items },
                    "codeLinks": { "type": ["array", "null"], "items": code_link_items }
                },
                "required": ["key"]
            }
        },
        {
            "name": "card_update_status",
            "description": "Set a card's lifecycle status.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "status": status_enum
                },
                "required": ["key", "status"]
            }
        },
        {
            "name": "card_delete",
            "description": "Delete a card: removes the index row and the file.",
            "inputSchema": key_only
        },
        {
            "name": "card_rename",
            "description": "Rename a card, carrying its relations, keywords, tags, and code links to the new key.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string", "description": "Current key" },
                    "newSlug": { "type": "string", "description": "New key" }
                },
                "required": ["key", "newSlug"]
            }
        },
        {
            "name": "card_sync",
            "description": "Sync every *.card.md under a directory into the index, collecting per-file failures.",
            "inputSchema": dir_only
        },
        {
            "name": "card_validate",
            "description": "Report inconsistencies between files and index: stale rows, orphan files, key mismatches. Read-only.",
            "inputSchema": dir_only
        },
        {
            "name": "card_export",
            "description": "Regenerate a card file from its index row.",
            "inputSchema": key_only
        },
        {
            "name": "card_context",
            "description": "A card with its resolved code links and upstream/downstream neighbor cards.",
            "inputSchema": key_only
        },
        {
            "name": "card_graph",
            "description": "Breadth-first traversal over relation edges from a card.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "maxDepth": { "type": "integer", "minimum": 0 },
                    "direction": { "type": "string", "enum": ["forward", "backward", "both"] }
                },
                "required": ["key"]
            }
        },
        {
            "name": "card_links_resolve",
            "description": "Resolve a card's code links against the gildash symbol indexer.",
            "inputSchema": key_only
        },
        {
            "name": "card_links_validate",
            "description": "Check a card's code links against the indexer; reports 'symbol-not-found' and 'file-not-indexed'.",
            "inputSchema": key_only
        },
        {
            "name": "cards_by_symbol",
            "description": "Cards holding a code link for a symbol, optionally narrowed to one file.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "symbol": { "type": "string" },
                    "file": { "type": "string" }
                },
                "required": ["symbol"]
            }
        },
        {
            "name": "cards_affected",
            "description": "Cards whose code links touch any of the given files.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "files": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["files"]
            }
        },
        {
            "name": "card_list",
            "description": "List cards, optionally filtered by status.",
            "inputSchema": {
                "type": "object",
                "properties": { "status": status_enum }
            }
        },
        {
            "name": "card_search",
            "description": "Full-text search over card keys, summaries, and bodies.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string" }
                },
                "required": ["query"]
            }
        },
        {
            "name": "card_prune",
            "description": "Remove interned keyword and tag names no card references anymore.",
            "inputSchema": { "type": "object", "properties": {} }
        },
        {
            "name": "deck_status",
            "description": "Deck summary: card counts (total and by status), relation/code-link/classification counts, indexer availability.",
            "inputSchema": { "type": "object", "properties": {} }
        }
    ])
}
