use chrono::{DateTime, Utc};
use nm_core::{ArticleStore, Error, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub mod backends;

pub use backends::memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use backends::sqlite::SqliteStorage;

/// Builds the configured storage backend.
pub async fn create_store(kind: &str, db_path: Option<&Path>) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = db_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| std::path::PathBuf::from("newsmap.db"));
            Ok(Arc::new(SqliteStorage::new_with_path(&path).await?))
        }
        other => Err(Error::InvalidArgument(format!(
            "unknown storage backend: {}",
            other
        ))),
    }
}

/// Creation timestamps must never step backwards within one store, even if
/// the wall clock does.
pub(crate) fn next_created_at(last: &Mutex<DateTime<Utc>>) -> DateTime<Utc> {
    let mut last = match last.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let now = Utc::now();
    if now > *last {
        *last = now;
    }
    *last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_store_rejects_unknown_backend() {
        let err = create_store("postgres", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_next_created_at_is_monotonic() {
        let future = Utc::now() + chrono::Duration::seconds(60);
        let clock = Mutex::new(future);
        // The wall clock is behind the last assigned timestamp; the ratchet
        // must hold the line rather than go backwards.
        assert_eq!(next_created_at(&clock), future);
    }
}
