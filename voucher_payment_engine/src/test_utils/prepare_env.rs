use log::*;

pub fn init_logging() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// Each pooled connection to `sqlite::memory:` is its own database, so memory-backed test stores
/// must cap the pool at a single connection.
#[cfg(feature = "sqlite")]
pub async fn memory_db() -> crate::SqliteDatabase {
    crate::SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating in-memory database")
}
