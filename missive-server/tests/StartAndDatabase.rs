use anyhow::Result;
use missive_server::store::sqlite::{build_sqlite_url, connect_pool, run_migrations, sqlite_url_for_path};
use missive_server::store::{MessageKey, MessageStore, NewMessage, SqliteMessageStore};
use missive_server::health_with_store;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

mod test_utils;
use test_utils::sqlite_store;

// Funzione di utilità per costruire l'URL SQLite da un percorso di file
fn sqlite_url_for(p: &PathBuf) -> String {
    sqlite_url_for_path(p.as_path()).expect("build sqlite url")
}

fn new_message(sender: &str, receiver: &str, message_id: Option<&str>, content: &str) -> NewMessage {
    NewMessage {
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        message_id: message_id.map(str::to_string),
        content: content.to_string(),
    }
}

fn key(sender: &str, receiver: &str, message_id: &str) -> MessageKey {
    MessageKey {
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        message_id: message_id.to_string(),
    }
}

// Test che verifica che le migrazioni creino la tabella dei messaggi, anche se eseguite due volte
#[tokio::test]
async fn run_migrations_creates_messages_table() -> Result<()> {
    let td = TempDir::new()?;
    let db_path = td.path().join("missive.db");

    // assicurati che la directory genitrice esista e crea il file
    if let Some(parent) = db_path.parent() { fs::create_dir_all(parent)?; }
    fs::File::create(&db_path)?;

    let url = sqlite_url_for(&db_path);
    let pool = connect_pool(&url).await?;
    run_migrations(&pool).await?;
    run_migrations(&pool).await?;

    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name = 'messages'"
    ).fetch_all(&pool).await?;
    assert_eq!(names, vec!["messages".to_string()]);
    Ok(())
}

// Test che verifica che il controllo di salute funzioni dopo le migrazioni
#[tokio::test]
async fn health_works_after_migrations() -> Result<()> {
    let ts = sqlite_store().await?;
    let status = health_with_store(ts.store.as_ref()).await;
    assert!(status.is_success(), "health should return 200 OK");
    Ok(())
}

// Test che verifica che la creazione del file DB e delle directory genitrici sia idempotente
#[tokio::test]
async fn creating_db_file_and_parent_dirs_is_idempotent() -> Result<()> {
    let td = TempDir::new()?;
    let nested = td.path().join("a").join("b").join("missive.db");
    let parent = nested.parent().unwrap().to_path_buf();
    assert!(!parent.exists());

    // la funzione di libreria crea le directory genitrici e il file
    let url = sqlite_url_for_path(nested.as_path())?;
    let pool = connect_pool(&url).await?;
    run_migrations(&pool).await?;

    assert!(parent.exists(), "parent dir should have been created");
    assert!(nested.exists(), "db file should have been created");

    // una seconda volta non deve fallire né perdere dati
    let store = SqliteMessageStore::new(pool);
    store.insert(new_message("u1", "u2", Some("m1"), "hi")).await?;
    let again = SqliteMessageStore::connect(&nested.to_string_lossy()).await?;
    assert_eq!(again.list_all().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn sqlite_urls_are_normalised() -> Result<()> {
    assert_eq!(build_sqlite_url("sqlite::memory:")?, "sqlite::memory:");

    let td = TempDir::new()?;
    let path = td.path().join("x.db");
    let from_path = build_sqlite_url(&path.to_string_lossy())?;
    let from_url = build_sqlite_url(&format!("sqlite://{}", path.to_string_lossy()))?;
    assert_eq!(from_path, from_url);
    assert!(from_path.starts_with("sqlite://"));
    assert!(path.exists());
    Ok(())
}

#[tokio::test]
async fn in_memory_store_keeps_data_across_calls() -> Result<()> {
    let store = SqliteMessageStore::connect("sqlite::memory:").await?;
    store.insert(new_message("u1", "u2", None, "hi")).await?;
    assert_eq!(store.list_all().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn insert_assigns_id_and_timestamps() -> Result<()> {
    let ts = sqlite_store().await?;
    let saved = ts.store.insert(new_message("u1", "u2", Some("m1"), "hi")).await?;

    assert_eq!(saved.id.len(), 32);
    assert_eq!(saved.sender_id, "u1");
    assert_eq!(saved.receiver_id, "u2");
    assert_eq!(saved.message_id.as_deref(), Some("m1"));
    assert_eq!(saved.content, "hi");
    assert_eq!(saved.created_at, saved.updated_at);

    let other = ts.store.insert(new_message("u1", "u2", Some("m1"), "hi")).await?;
    assert_ne!(saved.id, other.id, "storage ids are unique even for duplicate messageIDs");
    Ok(())
}

#[tokio::test]
async fn list_all_keeps_insertion_order() -> Result<()> {
    let ts = sqlite_store().await?;
    assert!(ts.store.list_all().await?.is_empty());

    for content in ["one", "two", "three"] {
        ts.store.insert(new_message("u1", "u2", None, content)).await?;
    }
    let contents: Vec<String> = ts.store.list_all().await?.into_iter().map(|m| m.content).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
    Ok(())
}

#[tokio::test]
async fn lookup_by_sender_and_message_id_returns_first_match() -> Result<()> {
    let ts = sqlite_store().await?;
    let first = ts.store.insert(new_message("u1", "u2", Some("m1"), "first")).await?;
    ts.store.insert(new_message("u1", "u3", Some("m1"), "second")).await?;

    let found = ts.store.find_by_sender_and_message_id("u1", "m1").await?;
    assert_eq!(found, Some(first));
    assert_eq!(ts.store.find_by_sender_and_message_id("u2", "m1").await?, None);
    Ok(())
}

#[tokio::test]
async fn messages_without_message_id_are_not_matched_by_key() -> Result<()> {
    let ts = sqlite_store().await?;
    ts.store.insert(new_message("u1", "u2", None, "no id")).await?;

    assert_eq!(ts.store.find_by_sender_and_message_id("u1", "").await?, None);
    assert_eq!(ts.store.delete(&key("u1", "u2", "")).await?, None);
    Ok(())
}

#[tokio::test]
async fn update_replaces_only_content_of_first_match() -> Result<()> {
    let ts = sqlite_store().await?;
    let first = ts.store.insert(new_message("u1", "u2", Some("m1"), "hi")).await?;
    let second = ts.store.insert(new_message("u1", "u2", Some("m1"), "hello")).await?;

    let updated = ts
        .store
        .update_content(&key("u1", "u2", "m1"), "hi there")
        .await?
        .expect("message should exist");
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.content, "hi there");
    assert_eq!(updated.sender_id, first.sender_id);
    assert_eq!(updated.receiver_id, first.receiver_id);
    assert_eq!(updated.message_id, first.message_id);
    assert_eq!(updated.created_at, first.created_at);

    let all = ts.store.list_all().await?;
    assert_eq!(all[1], second, "only the first match changes");

    assert_eq!(ts.store.update_content(&key("u2", "u1", "m1"), "x").await?, None);
    Ok(())
}

#[tokio::test]
async fn delete_removes_first_match_once() -> Result<()> {
    let ts = sqlite_store().await?;
    let saved = ts.store.insert(new_message("u1", "u2", Some("m1"), "hi")).await?;

    let k = key("u1", "u2", "m1");
    assert_eq!(ts.store.delete(&k).await?, Some(saved));
    assert_eq!(ts.store.delete(&k).await?, None);
    assert_eq!(ts.store.find_by_key(&k).await?, None);
    assert!(ts.store.list_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn conversation_lookup_is_symmetric() -> Result<()> {
    let ts = sqlite_store().await?;
    ts.store.insert(new_message("a", "b", None, "a to b")).await?;
    ts.store.insert(new_message("b", "a", None, "b to a")).await?;
    ts.store.insert(new_message("a", "c", None, "a to c")).await?;

    let ab = ts.store.find_conversation("a", "b").await?;
    let ba = ts.store.find_conversation("b", "a").await?;
    assert_eq!(ab.len(), 2);
    assert_eq!(ab, ba);
    assert!(ts.store.find_conversation("b", "c").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn self_messages_are_allowed() -> Result<()> {
    let ts = sqlite_store().await?;
    ts.store.insert(new_message("me", "me", None, "note to self")).await?;
    assert_eq!(ts.store.find_conversation("me", "me").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn receiver_lookup_filters_by_receiver() -> Result<()> {
    let ts = sqlite_store().await?;
    ts.store.insert(new_message("a", "b", None, "1")).await?;
    ts.store.insert(new_message("c", "b", None, "2")).await?;
    ts.store.insert(new_message("b", "a", None, "3")).await?;

    let for_b = ts.store.find_by_receiver("b").await?;
    assert_eq!(for_b.len(), 2);
    assert!(for_b.iter().all(|m| m.receiver_id == "b"));
    assert!(ts.store.find_by_receiver("z").await?.is_empty());
    Ok(())
}
