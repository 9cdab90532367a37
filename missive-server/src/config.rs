use anyhow::Context;

pub const DEFAULT_PORT: u16 = 5025;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATABASE_URL: &str = "missive.db";
pub const DEFAULT_MONGO_DATABASE: &str = "missive";
pub const DEFAULT_MONGO_COLLECTION: &str = "messages";
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=debug";

/// Backend scelto in base allo schema di DATABASE_URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo {
        uri: String,
        database: String,
        collection: String,
    },
    /// Percorso di file, URL "sqlite://..." oppure "sqlite::memory:".
    Sqlite { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Come [`Config::from_env`], ma legge le variabili da `lookup`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // variabili vuote contano come assenti
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("parse PORT {:?}", raw))?,
            None => DEFAULT_PORT,
        };
        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let backend = if is_mongo_url(&database_url) {
            StoreBackend::Mongo {
                uri: database_url,
                database: var("MONGO_DATABASE")
                    .unwrap_or_else(|| DEFAULT_MONGO_DATABASE.to_string()),
                collection: var("MONGO_COLLECTION")
                    .unwrap_or_else(|| DEFAULT_MONGO_COLLECTION.to_string()),
            }
        } else {
            StoreBackend::Sqlite { url: database_url }
        };

        Ok(Self {
            host,
            port,
            backend,
            rust_log: var("RUST_LOG").unwrap_or_else(|| DEFAULT_RUST_LOG.to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_mongo_url(url: &str) -> bool {
    url.starts_with("mongodb://") || url.starts_with("mongodb+srv://")
}
