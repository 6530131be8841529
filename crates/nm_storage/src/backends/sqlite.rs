use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nm_core::{ArticleStore, Error, Location, NewArticle, NormalizedArticle, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        url TEXT NOT NULL UNIQUE,
        image_url TEXT,
        location TEXT NOT NULL,
        importance INTEGER NOT NULL,
        min_zoom INTEGER,
        max_zoom INTEGER,
        published_at TEXT NOT NULL,
        source TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

#[derive(Debug)]
pub struct SqliteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
    last_created: Mutex<DateTime<Utc>>,
}

impl SqliteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Internal(format!("failed to open database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Internal(format!("failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
            last_created: Mutex::new(DateTime::<Utc>::MIN_UTC),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("failed to parse stored timestamp: {}", e)))
}

fn row_to_article(row: &SqliteRow) -> Result<NormalizedArticle> {
    let location: Location = serde_json::from_str(&row.get::<String, _>("location"))?;

    Ok(NormalizedArticle {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        url: row.get("url"),
        image_url: row.get("image_url"),
        location,
        importance: nm_core::Importance::new(row.get::<i64, _>("importance").clamp(1, 100) as u8),
        min_zoom: row.get::<Option<i64>, _>("min_zoom").map(|z| z as u8),
        max_zoom: row.get::<Option<i64>, _>("max_zoom").map(|z| z as u8),
        published_at: parse_timestamp(row.get("published_at"))?,
        source: row.get("source"),
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

#[async_trait]
impl ArticleStore for SqliteStorage {
    async fn find_by_url(&self, url: &str) -> Result<Option<NormalizedArticle>> {
        let row = sqlx::query("SELECT * FROM articles WHERE url = ? LIMIT 1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("failed to look up article: {}", e)))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn insert(&self, article: NewArticle) -> Result<NormalizedArticle> {
        let location = serde_json::to_string(&article.location)?;
        let created_at = crate::next_created_at(&self.last_created);
        let record = article.into_record(Uuid::new_v4().to_string(), created_at);

        sqlx::query(
            r#"
            INSERT INTO articles
            (id, title, description, url, image_url, location, importance,
             min_zoom, max_zoom, published_at, source, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(record.description.as_deref())
        .bind(&record.url)
        .bind(record.image_url.as_deref())
        .bind(&location)
        .bind(record.importance.get() as i64)
        .bind(record.min_zoom.map(|z| z as i64))
        .bind(record.max_zoom.map(|z| z as i64))
        .bind(record.published_at.to_rfc3339())
        .bind(&record.source)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::DuplicateUrl(record.url.clone())
            }
            _ => Error::StoreWriteFailed(format!("failed to insert article: {}", e)),
        })?;

        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<NormalizedArticle>> {
        let rows = sqlx::query("SELECT * FROM articles ORDER BY published_at DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("failed to list articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }
}
