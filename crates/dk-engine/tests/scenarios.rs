//! End-to-end scenarios over a real deck: tempdir cards, on-disk SQLite.

use std::path::PathBuf;

use tempfile::TempDir;

use dk_core::{CardStatus, CodeLinkSpec, RelationSpec};
use dk_engine::ops::{
    self, CreateCardInput, GraphDirection, GraphOptions, UpdateCardInput,
};
use dk_engine::{Deck, DeckConfig, EngineError};

struct Fixture {
    _tmp: TempDir,
    deck: Deck,
}

fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let deck = Deck::open(DeckConfig::at(tmp.path())).unwrap();
    Fixture { _tmp: tmp, deck }
}

fn input(slug: &str, summary: &str) -> CreateCardInput {
    CreateCardInput {
        slug: slug.to_string(),
        summary: summary.to_string(),
        ..Default::default()
    }
}

fn relation(rel_type: &str, target: &str) -> RelationSpec {
    RelationSpec {
        rel_type: rel_type.to_string(),
        target: target.to_string(),
    }
}

fn code_link(kind: &str, file: &str, symbol: &str) -> CodeLinkSpec {
    CodeLinkSpec {
        kind: kind.to_string(),
        file: file.to_string(),
        symbol: symbol.to_string(),
    }
}

// -- S1: create + get -------------------------------------------------------

#[tokio::test]
async fn create_then_get_round_trips() {
    let fx = fixture();
    let created = ops::create_card(&fx.deck, input("hello", "Hi")).await.unwrap();
    assert_eq!(created.frontmatter.key, "hello");
    assert_eq!(created.frontmatter.status, CardStatus::Draft);

    let path: PathBuf = fx.deck.card_path("hello");
    assert!(path.exists());

    let fetched = ops::get_card(&fx.deck, "hello").await.unwrap();
    assert_eq!(fetched.frontmatter.key, "hello");
    assert_eq!(fetched.frontmatter.summary, "Hi");
    assert_eq!(fetched.frontmatter.status, CardStatus::Draft);

    // The row landed too.
    let row = fx.deck.store().cards().find_by_key("hello").unwrap().unwrap();
    assert_eq!(row.summary, "Hi");
    assert_eq!(row.file_path, path.to_string_lossy());
}

// -- S2: duplicate rejection ------------------------------------------------

#[tokio::test]
async fn second_create_with_same_slug_is_rejected() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("dup", "first")).await.unwrap();
    let err = ops::create_card(&fx.deck, input("dup", "second"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CardAlreadyExists { key } if key == "dup"));
}

// -- S3: rename preserves links ---------------------------------------------

#[tokio::test]
async fn rename_preserves_code_links_and_retires_old_key() {
    let fx = fixture();
    let mut create = input("a", "card a");
    create.code_links = Some(vec![code_link("fn", "x.ts", "F")]);
    ops::create_card(&fx.deck, create).await.unwrap();

    let renamed = ops::rename_card(&fx.deck, "a", "b").await.unwrap();
    assert_eq!(renamed.frontmatter.key, "b");

    let links = fx.deck.store().code_links().find_by_card_key("b").unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].symbol, "F");

    let err = ops::get_card(&fx.deck, "a").await.unwrap_err();
    assert!(matches!(err, EngineError::CardNotFound { .. }));
    assert!(fx.deck.store().cards().find_by_key("a").unwrap().is_none());
    assert!(fx.deck.card_path("b").exists());
    assert!(!fx.deck.card_path("a").exists());
}

#[tokio::test]
async fn rename_to_same_path_is_rejected() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("same", "card")).await.unwrap();
    let err = ops::rename_card(&fx.deck, "same", "same").await.unwrap_err();
    assert!(matches!(err, EngineError::RenameSamePath { .. }));
}

// -- S4: self-reference rejected --------------------------------------------

#[tokio::test]
async fn self_referencing_relation_is_rejected() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("s", "selfish")).await.unwrap();

    let err = ops::update_card(
        &fx.deck,
        "s",
        UpdateCardInput {
            relations: Some(vec![relation("depends-on", "s")]),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Storage(_)));

    // The failed store action never touched the file, and no edges exist.
    let file = ops::get_card(&fx.deck, "s").await.unwrap();
    assert!(file.frontmatter.relations.is_none());
    assert!(fx.deck.store().relations().find_by_card_key("s").unwrap().is_empty());
}

// -- S5: delete cascades ----------------------------------------------------

#[tokio::test]
async fn delete_cascades_edges_but_keeps_interned_names() {
    let fx = fixture();
    let mut x = input("x", "target");
    x.keywords = Some(vec!["k".to_string()]);
    ops::create_card(&fx.deck, x).await.unwrap();

    let mut y = input("y", "source");
    y.relations = Some(vec![relation("depends-on", "x")]);
    ops::create_card(&fx.deck, y).await.unwrap();

    assert_eq!(fx.deck.store().relations().find_by_card_key("y").unwrap().len(), 1);

    ops::delete_card(&fx.deck, "x").await.unwrap();

    assert!(fx.deck.store().relations().find_by_card_key("y").unwrap().is_empty());
    // The keyword name row survives until pruned.
    assert_eq!(fx.deck.store().classifications().prune_orphans().unwrap(), 1);
}

// -- S6: concurrent create/create on one slug --------------------------------

#[tokio::test]
async fn concurrent_creates_one_wins() {
    let fx = fixture();
    let (first, second) = tokio::join!(
        ops::create_card(&fx.deck, input("dup", "first")),
        ops::create_card(&fx.deck, input("dup", "second")),
    );
    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);

    let loser = if outcomes[0] { second } else { first };
    assert!(matches!(
        loser.unwrap_err(),
        EngineError::CardAlreadyExists { .. }
    ));
}

// -- S7: concurrent delete vs update ----------------------------------------

#[tokio::test]
async fn racing_delete_beats_queued_update() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("g", "goner")).await.unwrap();

    let (deleted, updated) = tokio::join!(
        ops::delete_card(&fx.deck, "g"),
        ops::update_card(
            &fx.deck,
            "g",
            UpdateCardInput {
                summary: Some("late".to_string()),
                ..Default::default()
            }
        ),
    );
    deleted.unwrap();
    assert!(matches!(
        updated.unwrap_err(),
        EngineError::CardNotFound { .. }
    ));
    assert!(!fx.deck.card_path("g").exists());
    assert!(fx.deck.store().cards().find_by_key("g").unwrap().is_none());
}

// -- S8: graph traversal over a diamond -------------------------------------

#[tokio::test]
async fn diamond_traversal_emits_each_card_once() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("d", "sink")).await.unwrap();
    let mut b = input("b", "left");
    b.relations = Some(vec![relation("depends-on", "d")]);
    ops::create_card(&fx.deck, b).await.unwrap();
    let mut c = input("c", "right");
    c.relations = Some(vec![relation("depends-on", "d")]);
    ops::create_card(&fx.deck, c).await.unwrap();
    let mut a = input("a", "root");
    a.relations = Some(vec![relation("depends-on", "b"), relation("depends-on", "c")]);
    ops::create_card(&fx.deck, a).await.unwrap();

    let nodes = ops::get_relation_graph(
        &fx.deck,
        "a",
        GraphOptions {
            direction: GraphDirection::Forward,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let d_nodes: Vec<_> = nodes.iter().filter(|n| n.key == "d").collect();
    assert_eq!(d_nodes.len(), 1);
    assert_eq!(d_nodes[0].depth, 2);
    assert!(nodes.iter().all(|n| n.depth <= 2));
    assert!(nodes.iter().all(|n| n.key != "a"));
    assert_eq!(nodes.len(), 3);
}

#[tokio::test]
async fn graph_traversal_is_deterministic_and_depth_bounded() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("b", "mid")).await.unwrap();
    let mut a = input("a", "root");
    a.relations = Some(vec![relation("depends-on", "b")]);
    ops::create_card(&fx.deck, a).await.unwrap();
    let mut c = input("c", "leaf-owner");
    c.relations = Some(vec![relation("relates-to", "b")]);
    ops::create_card(&fx.deck, c).await.unwrap();

    let opts = GraphOptions::default();
    let run1 = ops::get_relation_graph(&fx.deck, "a", opts).await.unwrap();
    let run2 = ops::get_relation_graph(&fx.deck, "a", opts).await.unwrap();
    assert_eq!(run1, run2);

    // Backward reach from b finds both declarers.
    let from_b = ops::get_relation_graph(
        &fx.deck,
        "b",
        GraphOptions {
            direction: GraphDirection::Backward,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let keys: Vec<&str> = from_b.iter().map(|n| n.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "c"]);

    let capped = ops::get_relation_graph(
        &fx.deck,
        "a",
        GraphOptions {
            max_depth: Some(0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(capped.is_empty());

    let missing_root = ops::get_relation_graph(&fx.deck, "ghost", GraphOptions::default())
        .await
        .unwrap();
    assert!(missing_root.is_empty());
}

// -- update semantics -------------------------------------------------------

#[tokio::test]
async fn update_merges_and_deletes_fields() {
    let fx = fixture();
    let mut create = input("card", "original");
    create.keywords = Some(vec!["keep-or-kill".to_string()]);
    create.constraints = Some(serde_json::json!({"latencyMs": 100}));
    ops::create_card(&fx.deck, create).await.unwrap();

    // Unspecified fields keep their value.
    let updated = ops::update_card(
        &fx.deck,
        "card",
        UpdateCardInput {
            summary: Some("revised".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.frontmatter.summary, "revised");
    assert_eq!(
        updated.frontmatter.keywords,
        Some(vec!["keep-or-kill".to_string()])
    );
    assert!(updated.frontmatter.constraints.is_some());

    // Empty list and explicit null delete.
    let cleared = ops::update_card(
        &fx.deck,
        "card",
        UpdateCardInput {
            keywords: Some(Vec::new()),
            constraints: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(cleared.frontmatter.keywords.is_none());
    assert!(cleared.frontmatter.constraints.is_none());
    assert!(fx
        .deck
        .store()
        .classifications()
        .find_keywords_by_card("card")
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn update_status_touches_only_status() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("s", "stays")).await.unwrap();
    let updated = ops::update_card_status(&fx.deck, "s", CardStatus::Implementing)
        .await
        .unwrap();
    assert_eq!(updated.frontmatter.status, CardStatus::Implementing);
    assert_eq!(updated.frontmatter.summary, "stays");

    let row = fx.deck.store().cards().find_by_key("s").unwrap().unwrap();
    assert_eq!(row.status, CardStatus::Implementing);
}

#[tokio::test]
async fn update_rejects_foreign_front_matter_key() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("real", "real card")).await.unwrap();
    // Hand-edit the file so its front matter claims another key.
    let path = fx.deck.card_path("real");
    std::fs::write(
        &path,
        "---\nkey: impostor\nsummary: real card\nstatus: draft\n---\n",
    )
    .unwrap();

    let err = ops::update_card(
        &fx.deck,
        "real",
        UpdateCardInput {
            summary: Some("x".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::CardNotFound { .. }));
}

#[tokio::test]
async fn disallowed_relation_type_is_rejected() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("a", "a")).await.unwrap();
    let mut b = input("b", "b");
    b.relations = Some(vec![relation("invented-type", "a")]);
    let err = ops::create_card(&fx.deck, b).await.unwrap_err();
    assert!(matches!(err, EngineError::RelationType { rel_type } if rel_type == "invented-type"));
}

#[tokio::test]
async fn relation_to_missing_card_is_skipped_not_fatal() {
    let fx = fixture();
    let mut a = input("a", "a");
    a.relations = Some(vec![relation("depends-on", "nonexistent")]);
    ops::create_card(&fx.deck, a).await.unwrap();
    assert!(fx.deck.store().relations().find_by_card_key("a").unwrap().is_empty());
}

// -- sync / validate / export ----------------------------------------------

#[tokio::test]
async fn sync_from_file_is_idempotent() {
    let fx = fixture();
    let dir = fx.deck.cards_dir().to_path_buf();
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("synced.card.md");
    std::fs::write(
        &path,
        "---\nkey: synced\nsummary: from disk\nstatus: accepted\nkeywords:\n- disk\n---\nbody\n",
    )
    .unwrap();

    let key = ops::sync_card_from_file(&fx.deck, &path).await.unwrap();
    assert_eq!(key, "synced");
    let first = fx.deck.store().cards().find_by_key("synced").unwrap().unwrap();

    ops::sync_card_from_file(&fx.deck, &path).await.unwrap();
    let second = fx.deck.store().cards().find_by_key("synced").unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        fx.deck
            .store()
            .classifications()
            .find_keywords_by_card("synced")
            .unwrap(),
        vec!["disk".to_string()]
    );
}

#[tokio::test]
async fn remove_card_by_file_drops_the_row() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("gone", "soon")).await.unwrap();
    let path = fx.deck.card_path("gone");

    assert!(ops::remove_card_by_file(&fx.deck, &path).await.unwrap());
    assert!(fx.deck.store().cards().find_by_key("gone").unwrap().is_none());
    // Second call finds nothing to do.
    assert!(!ops::remove_card_by_file(&fx.deck, &path).await.unwrap());
}

#[tokio::test]
async fn bulk_sync_collects_failures_without_aborting() {
    let fx = fixture();
    let dir = fx.deck.cards_dir().to_path_buf();
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    std::fs::write(
        dir.join("one.card.md"),
        "---\nkey: one\nsummary: first\nstatus: draft\n---\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("nested/two.card.md"),
        "---\nkey: nested/two\nsummary: second\nstatus: draft\n---\n",
    )
    .unwrap();
    std::fs::write(dir.join("broken.card.md"), "not a card at all").unwrap();
    std::fs::write(dir.join("ignored.md"), "not a card file").unwrap();

    let report = ops::bulk_sync(&fx.deck, None).await.unwrap();
    assert_eq!(report.synced, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].file_path.ends_with("broken.card.md"));
    assert_eq!(fx.deck.store().cards().count().unwrap(), 2);
}

#[tokio::test]
async fn bulk_sync_missing_directory_propagates() {
    let fx = fixture();
    let missing = fx.deck.cards_dir().join("nowhere");
    let err = ops::bulk_sync(&fx.deck, Some(&missing)).await.unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

#[tokio::test]
async fn validate_reports_stale_orphan_and_mismatch() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("stale", "file will vanish")).await.unwrap();
    ops::create_card(&fx.deck, input("fine", "all good")).await.unwrap();

    // Stale: row kept, file removed out-of-band.
    std::fs::remove_file(fx.deck.card_path("stale")).unwrap();

    // Orphan: file on disk, no row.
    let dir = fx.deck.cards_dir().to_path_buf();
    std::fs::write(
        dir.join("orphan.card.md"),
        "---\nkey: orphan\nsummary: nobody indexed me\nstatus: draft\n---\n",
    )
    .unwrap();

    // Mismatch: synced file whose front-matter key differs from its name.
    let odd = dir.join("odd-name.card.md");
    std::fs::write(
        &odd,
        "---\nkey: proper-name\nsummary: misfiled\nstatus: draft\n---\n",
    )
    .unwrap();
    ops::sync_card_from_file(&fx.deck, &odd).await.unwrap();

    let report = ops::validate_cards(&fx.deck, None).await.unwrap();
    assert_eq!(report.stale_db_rows.len(), 1);
    assert_eq!(report.stale_db_rows[0].key, "stale");
    assert_eq!(report.orphan_files.len(), 1);
    assert!(report.orphan_files[0].ends_with("orphan.card.md"));
    assert_eq!(report.key_mismatches.len(), 1);
    assert_eq!(report.key_mismatches[0].key, "proper-name");
    assert_eq!(report.key_mismatches[0].file_key, "odd-name");

    // Read-only: a second run sees the same world.
    let again = ops::validate_cards(&fx.deck, None).await.unwrap();
    assert_eq!(again.stale_db_rows.len(), 1);
    assert_eq!(again.orphan_files.len(), 1);
}

#[tokio::test]
async fn export_regenerates_file_with_forward_relations_only() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("dst", "pointed at")).await.unwrap();
    let mut src = input("src", "points");
    src.relations = Some(vec![relation("depends-on", "dst")]);
    src.tags = Some(vec!["exported".to_string()]);
    ops::create_card(&fx.deck, src).await.unwrap();

    // dst owns only the mirror edge; its exported front matter has none.
    std::fs::remove_file(fx.deck.card_path("dst")).unwrap();
    let exported = ops::export_card_to_file(&fx.deck, "dst").await.unwrap();
    assert!(exported.frontmatter.relations.is_none());
    assert!(fx.deck.card_path("dst").exists());

    let exported_src = ops::export_card_to_file(&fx.deck, "src").await.unwrap();
    assert_eq!(
        exported_src.frontmatter.relations,
        Some(vec![relation("depends-on", "dst")])
    );
    assert_eq!(exported_src.frontmatter.tags, Some(vec!["exported".to_string()]));

    let err = ops::export_card_to_file(&fx.deck, "ghost").await.unwrap_err();
    assert!(matches!(err, EngineError::CardNotFound { .. }));
}

// -- context and symbol queries ---------------------------------------------

#[tokio::test]
async fn card_context_splits_upstream_and_downstream() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("base", "foundation")).await.unwrap();
    let mut top = input("top", "built on base");
    top.relations = Some(vec![relation("depends-on", "base")]);
    ops::create_card(&fx.deck, top).await.unwrap();

    let top_ctx = ops::get_card_context(&fx.deck, "top").await.unwrap();
    assert_eq!(top_ctx.card.key, "top");
    assert!(top_ctx.upstream_cards.is_empty());
    assert_eq!(top_ctx.downstream_cards.len(), 1);
    assert_eq!(top_ctx.downstream_cards[0].key, "base");
    // No indexer attached: resolutions degrade to empty.
    assert!(top_ctx.code_links.is_empty());

    let base_ctx = ops::get_card_context(&fx.deck, "base").await.unwrap();
    assert_eq!(base_ctx.upstream_cards.len(), 1);
    assert_eq!(base_ctx.upstream_cards[0].key, "top");
    assert!(base_ctx.downstream_cards.is_empty());
}

#[tokio::test]
async fn symbol_and_file_queries_dedupe_by_card() {
    let fx = fixture();
    let mut a = input("a", "a");
    a.code_links = Some(vec![
        code_link("fn", "src/auth.rs", "login"),
        code_link("struct", "src/auth.rs", "Session"),
    ]);
    ops::create_card(&fx.deck, a).await.unwrap();
    let mut b = input("b", "b");
    b.code_links = Some(vec![code_link("fn", "src/auth.rs", "login")]);
    ops::create_card(&fx.deck, b).await.unwrap();

    let by_symbol = ops::find_cards_by_symbol(&fx.deck, "login", None).await.unwrap();
    let keys: Vec<&str> = by_symbol.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);

    let affected = ops::find_affected_cards(&fx.deck, &["src/auth.rs".to_string()])
        .await
        .unwrap();
    assert_eq!(affected.len(), 2);

    let none = ops::find_affected_cards(&fx.deck, &[]).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn create_compensates_when_file_write_fails() {
    let fx = fixture();
    // Occupy the would-be parent directory with a file so the card file
    // cannot be created.
    std::fs::create_dir_all(fx.deck.cards_dir()).unwrap();
    std::fs::write(fx.deck.cards_dir().join("blocked"), "in the way").unwrap();

    let err = ops::create_card(&fx.deck, input("blocked/card", "never lands"))
        .await
        .unwrap_err();
    // The file error surfaced (not a compensation failure), and the row the
    // store transaction inserted was rolled back.
    assert!(matches!(err, EngineError::Io(_)));
    assert!(fx
        .deck
        .store()
        .cards()
        .find_by_key("blocked/card")
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn nested_keys_map_to_nested_files() {
    let fx = fixture();
    ops::create_card(&fx.deck, input("auth/login", "nested card")).await.unwrap();
    assert!(fx.deck.cards_dir().join("auth").join("login.card.md").exists());

    // Normalization applies on the read path too.
    let fetched = ops::get_card(&fx.deck, "\\auth\\login\\").await.unwrap();
    assert_eq!(fetched.frontmatter.key, "auth/login");

    let renamed = ops::rename_card(&fx.deck, "auth/login", "auth/v2/login")
        .await
        .unwrap();
    assert_eq!(renamed.frontmatter.key, "auth/v2/login");
    assert!(fx
        .deck
        .cards_dir()
        .join("auth/v2/login.card.md")
        .exists());
}

#[tokio::test]
async fn deck_status_and_prune() {
    let fx = fixture();
    let mut a = input("a", "first");
    a.keywords = Some(vec!["shared".to_string()]);
    a.status = Some(CardStatus::Accepted);
    ops::create_card(&fx.deck, a).await.unwrap();
    let mut b = input("b", "second");
    b.relations = Some(vec![relation("depends-on", "a")]);
    b.code_links = Some(vec![code_link("fn", "x.rs", "f")]);
    ops::create_card(&fx.deck, b).await.unwrap();

    let status = ops::deck_status(&fx.deck).await.unwrap();
    assert_eq!(status.card_count, 2);
    assert_eq!(status.relation_count, 2); // forward + mirror
    assert_eq!(status.code_link_count, 1);
    assert_eq!(status.keyword_count, 1);
    assert_eq!(status.tag_count, 0);
    assert!(!status.gildash_configured);
    let accepted = status
        .cards_by_status
        .iter()
        .find(|s| s.status == CardStatus::Accepted)
        .unwrap();
    assert_eq!(accepted.count, 1);

    // Nothing orphaned yet; delete the keyword owner and prune.
    assert_eq!(ops::prune_orphan_names(&fx.deck).await.unwrap(), 0);
    ops::delete_card(&fx.deck, "a").await.unwrap();
    assert_eq!(ops::prune_orphan_names(&fx.deck).await.unwrap(), 1);
}

#[tokio::test]
async fn list_and_search_passthroughs() {
    let fx = fixture();
    let mut done = input("done", "implemented card about caching");
    done.status = Some(CardStatus::Implemented);
    ops::create_card(&fx.deck, done).await.unwrap();
    ops::create_card(&fx.deck, input("open", "draft card")).await.unwrap();

    let all = ops::list_cards(&fx.deck, Default::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let implemented = ops::list_cards(
        &fx.deck,
        dk_storage::CardFilter {
            status: Some(CardStatus::Implemented),
        },
    )
    .await
    .unwrap();
    assert_eq!(implemented.len(), 1);
    assert_eq!(implemented[0].key, "done");

    let hits = ops::search_cards(&fx.deck, "caching").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].key, "done");
    assert!(ops::search_cards(&fx.deck, "").await.unwrap().is_empty());
}
