// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL store tests on in-memory SQLite.
//!
//! No external services needed. MySQL and Postgres share the statement
//! builders exercised here; only the match operator differs per dialect.
//!
//! Run with: `cargo test --test sql_store`

mod common;

use common::{ids, sample_users, seed, sparse_user, SONIA_ID, STACY_ID, WENDY_ID};
use rep_index::search::Dialect;
use rep_index::{
    CompositionMode, InMemoryStore, IndexCoordinator, IndexError, MatchMode, NewUser, RecordStore,
    RepIndexConfig, SearchRequest, SqlStore, StorageError, UpsertMode, UserColumn, UserPatch,
};

async fn memory_store() -> SqlStore {
    SqlStore::new("sqlite::memory:").await.expect("sqlite in-memory store")
}

async fn seeded() -> IndexCoordinator<SqlStore> {
    let index = IndexCoordinator::new(memory_store().await);
    seed(&index).await;
    index
}

// =============================================================================
// Store basics
// =============================================================================

#[tokio::test]
async fn connects_and_creates_schema() {
    let store = memory_store().await;
    assert_eq!(store.dialect(), Dialect::Sqlite);
    assert_eq!(store.count_all().await.unwrap(), 0);
    assert!(store.get("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn custom_table_name() {
    let config = RepIndexConfig {
        sql_url: Some("sqlite::memory:".into()),
        table: "people".into(),
        ..Default::default()
    };
    let store = SqlStore::with_config(&config).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people")
        .fetch_one(&store.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn missing_url_is_rejected() {
    let err = SqlStore::with_config(&RepIndexConfig::default()).await.err().unwrap();
    assert!(matches!(err, StorageError::Backend(_)));

    let err = SqlStore::new("redis://localhost").await.err().unwrap();
    assert!(err.to_string().contains("unsupported"));
}

#[tokio::test]
async fn insert_applies_schema_defaults() {
    let store = memory_store().await;
    store.insert(&sparse_user(), "#provisional#").await.unwrap();

    let row = store.get("628558706b92ac31676d779b").await.unwrap().unwrap();
    assert_eq!(row.record.first_name, "Mandy");
    assert_eq!(row.record.last_name, "NA");
    assert_eq!(row.record.email, "no-reply@none.com");
    assert_eq!(row.record.phone, "000-000-0000");
    assert!(!row.record.active);
    assert_eq!(row.record.balance, "0");
    assert_eq!(row.string_rep, "#provisional#");
}

#[tokio::test]
async fn duplicate_insert_is_conflict() {
    let store = memory_store().await;
    store.insert(&NewUser::new("dup"), "#").await.unwrap();
    let err = store.insert(&NewUser::new("dup"), "#").await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(id) if id == "dup"));
}

#[tokio::test]
async fn update_write_back_and_delete_report_missing_rows() {
    let store = memory_store().await;
    let patch = UserPatch { phone: Some("1".into()), ..Default::default() };
    assert!(!store.update("ghost", &patch).await.unwrap());
    assert!(!store.write_string_rep("ghost", "#x#").await.unwrap());
    assert!(!store.delete("ghost").await.unwrap());

    store.insert(&NewUser::new("real"), "#").await.unwrap();
    assert!(store.update("real", &patch).await.unwrap());
    // Same value again: no change, still a match
    assert!(store.update("real", &patch).await.unwrap());
    assert!(store.update("real", &UserPatch::default()).await.unwrap());
    assert!(store.delete("real").await.unwrap());
}

#[tokio::test]
async fn list_pages_in_id_order() {
    let index = seeded().await;
    let all = index.store().list(0, 100).await.unwrap();
    assert_eq!(all.len(), sample_users().len());

    let page = index.store().list(5, 3).await.unwrap();
    assert_eq!(ids(&page), ids(&all[5..8]));
}

// =============================================================================
// Coordinator over SQL
// =============================================================================

#[tokio::test]
async fn created_rows_are_consistent() {
    let index = seeded().await;
    for row in index.store().list(0, 100).await.unwrap() {
        assert!(row.is_consistent(), "stale representation for {}", row.record.user_id);
    }

    let mandy = index.create(&sparse_user()).await.unwrap();
    assert_eq!(
        mandy.string_rep,
        "#628558706b92ac31676d779b#Mandy#NA#no-reply@none.com#000-000-0000#false#0#"
    );
}

#[tokio::test]
async fn exact_search_respects_field_boundaries() {
    let index = seeded().await;
    let request = SearchRequest::exact(
        ["Marisol", "Davidson", "466-3255", STACY_ID, "62855577fc3", "DONAcampos@hinway.COM"],
        CompositionMode::Or,
    )
    .unwrap();
    let hits = index.search(&request).await.unwrap();
    assert_eq!(
        ids(&hits),
        [
            "628555771bdb1ab40ffe5d9f",
            "6285557774bcfb65bb51c001",
            "62855577bba9fd23f6878e63",
            STACY_ID,
        ]
    );

    let hits = index
        .search_terms(["wendy", "LAWSON"], CompositionMode::And, MatchMode::Exact)
        .await
        .unwrap();
    assert_eq!(ids(&hits), [WENDY_ID]);
}

#[tokio::test]
async fn pattern_search_is_substring() {
    let index = seeded().await;
    let hits = index
        .search_terms(["62855", "570-2414"], CompositionMode::And, MatchMode::Pattern)
        .await
        .unwrap();
    assert_eq!(ids(&hits), [SONIA_ID]);

    let hits = index
        .search_terms(["Marisol", "Davidson"], CompositionMode::Or, MatchMode::Pattern)
        .await
        .unwrap();
    assert_eq!(ids(&hits), ["628555771bdb1ab40ffe5d9f", "6285557774bcfb65bb51c001"]);

    let hits = index
        .search_terms(["Marisol", "Davidson"], CompositionMode::And, MatchMode::Pattern)
        .await
        .unwrap();
    assert!(hits.is_empty());

    let hits = index
        .search_terms(["WENDY#lawson000"], CompositionMode::Single, MatchMode::Pattern)
        .await
        .unwrap();
    assert_eq!(
        ids(&hits),
        ["628555772a8b7b9926ffb918", "628555772a8b7b9926ffb919"]
    );
}

#[tokio::test]
async fn quotes_in_terms_are_bound_not_spliced() {
    let index = seeded().await;
    let hits = index
        .search_terms(
            ["x' OR '1'='1", "'; DROP TABLE user_records; --"],
            CompositionMode::Or,
            MatchMode::Pattern,
        )
        .await
        .unwrap();
    assert!(hits.is_empty());
    assert_eq!(index.store().count_all().await.unwrap(), sample_users().len() as u64);
}

#[tokio::test]
async fn upsert_modes_then_search() {
    let index = seeded().await;

    let full = NewUser::new(WENDY_ID)
        .first_name("Wendy-1")
        .last_name("Lawson-1")
        .email("wendylawson@hinway.com")
        .phone("+1 (907) 523-2723")
        .active(false)
        .balance("$200,000.00");
    index.upsert(&full, &UpsertMode::All).await.unwrap();

    let names = NewUser::new(WENDY_ID).first_name("Wendy--2").last_name("Lawson--2").balance("$5");
    let mode = UpsertMode::Columns(vec![UserColumn::FirstName, UserColumn::LastName]);
    let after = index.upsert(&names, &mode).await.unwrap();
    assert_eq!(
        after.string_rep,
        "#628555772a8b7b9926ffb917#Wendy--2#Lawson--2#wendylawson@hinway.com#+1 (907) 523-2723#false#$200,000.00#"
    );

    let hits = index
        .search_terms(["wendy--2", "wendylawson@hinway.com"], CompositionMode::And, MatchMode::Exact)
        .await
        .unwrap();
    assert_eq!(ids(&hits), [WENDY_ID]);
}

// =============================================================================
// Metacharacters: SQLite matches literally, the regex stores do not
// =============================================================================

#[tokio::test]
async fn metacharacters_literal_on_sqlite_regex_in_memory() {
    let user = NewUser::new(WENDY_ID)
        .first_name("Wendy")
        .last_name("Lawson")
        .email("wendylawson@hinway.com")
        .phone("+1 (907) 523-2723")
        .active(false)
        .balance("$200,000.00");

    let sql = IndexCoordinator::new(memory_store().await);
    let mem = IndexCoordinator::new(InMemoryStore::new());
    sql.create(&user).await.unwrap();
    mem.create(&user).await.unwrap();

    // `$` is an end anchor as a regex and a plain dollar sign for instr()
    let dollar = ["$200,000.00"];
    let sql_hits = sql
        .search_terms(dollar, CompositionMode::Single, MatchMode::Exact)
        .await
        .unwrap();
    let mem_hits = mem
        .search_terms(dollar, CompositionMode::Single, MatchMode::Exact)
        .await
        .unwrap();
    assert_eq!(ids(&sql_hits), [WENDY_ID]);
    assert!(mem_hits.is_empty());

    // Parentheses: literal on SQLite, a capture group in memory
    let phone = ["(907) 523-2723"];
    let sql_hits = sql
        .search_terms(phone, CompositionMode::Single, MatchMode::Pattern)
        .await
        .unwrap();
    let mem_hits = mem
        .search_terms(phone, CompositionMode::Single, MatchMode::Pattern)
        .await
        .unwrap();
    assert_eq!(ids(&sql_hits), [WENDY_ID]);
    assert!(mem_hits.is_empty());

    // Metacharacter-free terms agree everywhere
    let plain = ["wendy", "lawson"];
    let sql_hits = sql
        .search_terms(plain, CompositionMode::And, MatchMode::Exact)
        .await
        .unwrap();
    let mem_hits = mem
        .search_terms(plain, CompositionMode::And, MatchMode::Exact)
        .await
        .unwrap();
    assert_eq!(ids(&sql_hits), ids(&mem_hits));
}

#[tokio::test]
async fn update_resyncs_and_missing_is_not_found() {
    let index = seeded().await;
    let patch = UserPatch { active: Some(true), ..Default::default() };
    let updated = index.update(SONIA_ID, &patch).await.unwrap();
    assert!(updated.record.active);
    assert!(updated.string_rep.contains("#true#"));

    let stored = index.get(SONIA_ID).await.unwrap().unwrap();
    assert_eq!(stored.string_rep, updated.string_rep);

    let err = index.update("missing", &patch).await.unwrap_err();
    assert!(matches!(err, IndexError::NotFound(_)));
    assert!(matches!(index.resync("missing").await, Err(IndexError::NotFound(_))));
}

#[tokio::test]
async fn repair_all_rewrites_stale_rows() {
    let index = seeded().await;
    index.store().write_string_rep(STACY_ID, "#stale#").await.unwrap();
    index.store().write_string_rep(SONIA_ID, "").await.unwrap();

    assert_eq!(index.repair_all().await.unwrap(), 2);
    let stacy = index.get(STACY_ID).await.unwrap().unwrap();
    assert!(stacy.is_consistent());
}
