// Test contro un MongoDB reale. Girano solo se MISSIVE_TEST_MONGO_URL è impostata,
// es. MISSIVE_TEST_MONGO_URL=mongodb://localhost:27017 cargo test --test mongo_store

use anyhow::Result;
use missive_server::store::{MessageKey, MessageStore, MongoMessageStore, NewMessage};
use std::time::{SystemTime, UNIX_EPOCH};

async fn mongo_store() -> Result<Option<MongoMessageStore>> {
    let Ok(uri) = std::env::var("MISSIVE_TEST_MONGO_URL") else {
        eprintln!("MISSIVE_TEST_MONGO_URL not set, skipping");
        return Ok(None);
    };
    // una collection per test, così i test possono girare in parallelo
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let collection = format!("messages_test_{}", nanos);
    let store = MongoMessageStore::connect(&uri, "missive_test", &collection).await?;
    Ok(Some(store))
}

fn new_message(sender: &str, receiver: &str, message_id: Option<&str>, content: &str) -> NewMessage {
    NewMessage {
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        message_id: message_id.map(str::to_string),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn mongo_crud_lifecycle() -> Result<()> {
    let Some(store) = mongo_store().await? else { return Ok(()) };
    store.ping().await?;

    let saved = store.insert(new_message("u1", "u2", Some("m1"), "hi")).await?;
    assert_eq!(saved.id.len(), 24, "ObjectId in hex");
    assert_eq!(store.list_all().await?, vec![saved.clone()]);

    assert_eq!(store.find_by_sender_and_message_id("u1", "m1").await?, Some(saved.clone()));

    let key = MessageKey {
        sender_id: "u1".to_string(),
        receiver_id: "u2".to_string(),
        message_id: "m1".to_string(),
    };
    let updated = store.update_content(&key, "hi there").await?.expect("updated");
    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.content, "hi there");
    assert_eq!(store.find_by_key(&key).await?, Some(updated.clone()));

    assert_eq!(store.delete(&key).await?.map(|m| m.id), Some(saved.id));
    assert_eq!(store.delete(&key).await?, None);

    store.drop_collection().await?;
    Ok(())
}

#[tokio::test]
async fn mongo_conversation_and_receiver_queries() -> Result<()> {
    let Some(store) = mongo_store().await? else { return Ok(()) };

    store.insert(new_message("a", "b", None, "a->b")).await?;
    store.insert(new_message("b", "a", None, "b->a")).await?;
    store.insert(new_message("a", "c", None, "a->c")).await?;

    let ab = store.find_conversation("a", "b").await?;
    assert_eq!(ab.len(), 2);
    assert_eq!(ab, store.find_conversation("b", "a").await?);
    assert_eq!(store.find_by_receiver("a").await?.len(), 1);
    assert!(store.find_by_receiver("z").await?.is_empty());

    store.drop_collection().await?;
    Ok(())
}
