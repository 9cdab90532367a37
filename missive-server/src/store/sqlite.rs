use anyhow::Context;
use async_trait::async_trait;
use missive_core::{new_document_id, now_timestamp, Message};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};

use super::{MessageKey, MessageStore, NewMessage, StoreResult};

const COLUMNS: &str = "id, sender_id, receiver_id, message_id, content, created_at, updated_at";

/// Una riga per documento. `rowid` dà l'ordine di inserimento, usato per
/// "il primo che corrisponde" in update e delete.
pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connette al DB indicato (path o URL sqlite) e prepara la tabella.
    pub async fn connect(raw: &str) -> anyhow::Result<Self> {
        let db_url = build_sqlite_url(raw).context("build sqlite url")?;
        tracing::info!(url = %db_url, "using sqlite message store");
        let pool = connect_pool(&db_url).await?;
        run_migrations(&pool).await.context("run migrations")?;
        Ok(Self::new(pool))
    }
}

// Dato un percorso di file, restituisce un URL SQLite valido. Crea le directory genitrici se non esistono.
pub fn sqlite_url_for_path(p: &Path) -> anyhow::Result<String> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent dirs for {:?}", parent))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&abs)
        .with_context(|| format!("create/open sqlite file {:?}", abs))?;
    let s = abs.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite:///{}", s.trim_start_matches('/')))
}

/// Normalizza DATABASE_URL in un URL SQLite. Accetta "sqlite::memory:",
/// un URL "sqlite://..." oppure un semplice percorso di file.
pub fn build_sqlite_url(raw: &str) -> anyhow::Result<String> {
    if raw == "sqlite::memory:" {
        return Ok(raw.to_string());
    }
    // Rimuovi il prefisso "sqlite://" se presente, per ottenere il percorso del file.
    let path_part = if raw.starts_with("sqlite:") {
        let rest = raw
            .trim_start_matches("sqlite:///")
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        // "sqlite:///abs/path" perde lo slash iniziale col trim
        if raw.starts_with("sqlite:///") {
            format!("/{}", rest)
        } else {
            rest.to_string()
        }
    } else {
        raw.to_string()
    };
    sqlite_url_for_path(&PathBuf::from(path_part))
}

// Connect to the database and return a connection pool.
pub async fn connect_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
    // un DB in memoria esiste per connessione: il pool deve averne una sola
    let options = if db_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };
    let pool = options
        .connect(db_url)
        .await
        .with_context(|| format!("connect to sqlite via {}", db_url))?;
    Ok(pool)
}

// Crea la tabella dei messaggi e gli indici se non esistono.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let stmts = [
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            sender_id   TEXT NOT NULL,
            receiver_id TEXT NOT NULL,
            message_id  TEXT,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );"#,
        "CREATE INDEX IF NOT EXISTS idx_messages_sender_message ON messages (sender_id, message_id);",
        "CREATE INDEX IF NOT EXISTS idx_messages_receiver ON messages (receiver_id);",
        "CREATE INDEX IF NOT EXISTS idx_messages_pair ON messages (sender_id, receiver_id);",
    ];
    // applica ogni statement di migrazione
    for s in &stmts {
        sqlx::query(s)
            .execute(pool)
            .await
            .with_context(|| format!("apply migration: {}", &s[..s.len().min(40)].replace('\n', " ")))?;
    }
    Ok(())
}

fn message_from_row(row: &SqliteRow) -> Result<Message, sqlx::Error> {
    Ok(Message {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        receiver_id: row.try_get("receiver_id")?,
        message_id: row.try_get("message_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn messages_from_rows(rows: Vec<SqliteRow>) -> Result<Vec<Message>, sqlx::Error> {
    rows.iter().map(message_from_row).collect()
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn list_all(&self) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM messages ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;
        Ok(messages_from_rows(rows)?)
    }

    async fn insert(&self, message: NewMessage) -> StoreResult<Message> {
        let now = now_timestamp();
        let saved = Message {
            id: new_document_id(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            message_id: message.message_id,
            content: message.content,
            created_at: now.clone(),
            updated_at: now,
        };
        sqlx::query(&format!("INSERT INTO messages ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"))
            .bind(&saved.id)
            .bind(&saved.sender_id)
            .bind(&saved.receiver_id)
            .bind(&saved.message_id)
            .bind(&saved.content)
            .bind(&saved.created_at)
            .bind(&saved.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn find_by_sender_and_message_id(
        &self,
        sender_id: &str,
        message_id: &str,
    ) -> StoreResult<Option<Message>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM messages WHERE sender_id = ? AND message_id = ? ORDER BY rowid LIMIT 1"
        ))
        .bind(sender_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(message_from_row).transpose()?)
    }

    async fn find_by_key(&self, key: &MessageKey) -> StoreResult<Option<Message>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE sender_id = ? AND receiver_id = ? AND message_id = ? ORDER BY rowid LIMIT 1"
        ))
        .bind(&key.sender_id)
        .bind(&key.receiver_id)
        .bind(&key.message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(message_from_row).transpose()?)
    }

    async fn update_content(
        &self,
        key: &MessageKey,
        content: &str,
    ) -> StoreResult<Option<Message>> {
        // RETURNING restituisce la riga dopo l'aggiornamento
        let row = sqlx::query(&format!(
            "UPDATE messages SET content = ?, updated_at = ? \
             WHERE rowid = (SELECT rowid FROM messages \
                 WHERE sender_id = ? AND receiver_id = ? AND message_id = ? ORDER BY rowid LIMIT 1) \
             RETURNING {COLUMNS}"
        ))
        .bind(content)
        .bind(now_timestamp())
        .bind(&key.sender_id)
        .bind(&key.receiver_id)
        .bind(&key.message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(message_from_row).transpose()?)
    }

    async fn delete(&self, key: &MessageKey) -> StoreResult<Option<Message>> {
        let row = sqlx::query(&format!(
            "DELETE FROM messages \
             WHERE rowid = (SELECT rowid FROM messages \
                 WHERE sender_id = ? AND receiver_id = ? AND message_id = ? ORDER BY rowid LIMIT 1) \
             RETURNING {COLUMNS}"
        ))
        .bind(&key.sender_id)
        .bind(&key.receiver_id)
        .bind(&key.message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(message_from_row).transpose()?)
    }

    async fn find_conversation(&self, a: &str, b: &str) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?) \
             ORDER BY rowid"
        ))
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages_from_rows(rows)?)
    }

    async fn find_by_receiver(&self, receiver_id: &str) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM messages WHERE receiver_id = ? ORDER BY rowid"
        ))
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages_from_rows(rows)?)
    }

    async fn ping(&self) -> StoreResult<()> {
        // come health_with_pool: basta acquisire una connessione
        self.pool.acquire().await?;
        Ok(())
    }
}
