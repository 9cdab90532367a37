use anyhow::Context;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use missive_core::{now_timestamp, Message};
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{
    ClientOptions, FindOneAndDeleteOptions, FindOneAndUpdateOptions, FindOneOptions, FindOptions,
    IndexOptions, ReturnDocument,
};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use super::{MessageKey, MessageStore, NewMessage, StoreError, StoreResult};

/// Documento così come sta nella collection. `_id` è un ObjectId assegnato
/// dal server; verso i client viaggia come stringa esadecimale.
#[derive(Debug, Serialize, Deserialize)]
struct MessageDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(rename = "senderID")]
    sender_id: String,
    #[serde(rename = "receiverID")]
    receiver_id: String,
    #[serde(rename = "messageID", default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    content: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl MessageDocument {
    fn into_message(self) -> Message {
        Message {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            message_id: self.message_id,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub struct MongoMessageStore {
    client: Client,
    collection: Collection<MessageDocument>,
}

impl MongoMessageStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> anyhow::Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .context("parse mongodb connection string")?;
        options.app_name = Some("missive-server".to_string());
        let client = Client::with_options(options).context("build mongodb client")?;
        let collection = client
            .database(database)
            .collection::<MessageDocument>(collection);

        ensure_indexes(&collection)
            .await
            .context("create message indexes")?;
        tracing::info!(database, collection = %collection.name(), "using mongodb message store");

        Ok(Self { client, collection })
    }

    /// Elimina l'intera collection.
    pub async fn drop_collection(&self) -> StoreResult<()> {
        self.collection
            .drop(None::<mongodb::options::DropCollectionOptions>)
            .await?;
        Ok(())
    }
}

async fn ensure_indexes(collection: &Collection<MessageDocument>) -> StoreResult<()> {
    let indexes = [
        ("idx_sender_message", doc! {"senderID": 1, "messageID": 1}),
        ("idx_receiver", doc! {"receiverID": 1}),
        ("idx_sender_receiver", doc! {"senderID": 1, "receiverID": 1}),
    ];
    for (name, keys) in indexes {
        let model = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(Some(name.to_string())).build())
            .build();
        collection
            .create_index(model, None::<mongodb::options::CreateIndexOptions>)
            .await?;
    }
    Ok(())
}

// ordine di inserimento: gli ObjectId crescono col tempo
fn insertion_order() -> Document {
    doc! {"_id": 1}
}

fn key_filter(key: &MessageKey) -> Document {
    doc! {
        "senderID": key.sender_id.as_str(),
        "receiverID": key.receiver_id.as_str(),
        "messageID": key.message_id.as_str(),
    }
}

impl MongoMessageStore {
    async fn find_many(&self, filter: Document) -> StoreResult<Vec<Message>> {
        let options = FindOptions::builder().sort(insertion_order()).build();
        let cursor = self.collection.find(filter, options).await?;
        let docs: Vec<MessageDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(MessageDocument::into_message).collect())
    }

    async fn find_first(&self, filter: Document) -> StoreResult<Option<Message>> {
        let options = FindOneOptions::builder().sort(insertion_order()).build();
        let found = self.collection.find_one(filter, options).await?;
        Ok(found.map(MessageDocument::into_message))
    }
}

#[async_trait]
impl MessageStore for MongoMessageStore {
    async fn list_all(&self) -> StoreResult<Vec<Message>> {
        self.find_many(doc! {}).await
    }

    async fn insert(&self, message: NewMessage) -> StoreResult<Message> {
        let now = now_timestamp();
        let mut document = MessageDocument {
            id: None,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            message_id: message.message_id,
            content: message.content,
            created_at: now.clone(),
            updated_at: now,
        };
        let result = self.collection.insert_one(&document, None).await?;
        let oid = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::InsertedId(result.inserted_id.to_string()))?;
        document.id = Some(oid);
        Ok(document.into_message())
    }

    async fn find_by_sender_and_message_id(
        &self,
        sender_id: &str,
        message_id: &str,
    ) -> StoreResult<Option<Message>> {
        self.find_first(doc! {"senderID": sender_id, "messageID": message_id})
            .await
    }

    async fn find_by_key(&self, key: &MessageKey) -> StoreResult<Option<Message>> {
        self.find_first(key_filter(key)).await
    }

    async fn update_content(
        &self,
        key: &MessageKey,
        content: &str,
    ) -> StoreResult<Option<Message>> {
        let update = doc! {"$set": {"content": content, "updatedAt": now_timestamp()}};
        let options = FindOneAndUpdateOptions::builder()
            .sort(insertion_order())
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(key_filter(key), update, options)
            .await?;
        Ok(updated.map(MessageDocument::into_message))
    }

    async fn delete(&self, key: &MessageKey) -> StoreResult<Option<Message>> {
        let options = FindOneAndDeleteOptions::builder()
            .sort(insertion_order())
            .build();
        let deleted = self
            .collection
            .find_one_and_delete(key_filter(key), options)
            .await?;
        Ok(deleted.map(MessageDocument::into_message))
    }

    async fn find_conversation(&self, a: &str, b: &str) -> StoreResult<Vec<Message>> {
        self.find_many(doc! {
            "$or": [
                {"senderID": a, "receiverID": b},
                {"senderID": b, "receiverID": a},
            ]
        })
        .await
    }

    async fn find_by_receiver(&self, receiver_id: &str) -> StoreResult<Vec<Message>> {
        self.find_many(doc! {"receiverID": receiver_id}).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;
        Ok(())
    }
}
