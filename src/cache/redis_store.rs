//! Redis Store Module
//!
//! Production [`KvStore`] talking to a Redis server through a shared,
//! auto-reconnecting connection.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::{KvStore, SetMode};
use crate::error::Result;

// == Redis Store ==
/// Redis-backed store.
///
/// The connection is opened on first use rather than at construction, so a
/// store that is down at startup only degrades requests until it comes back.
pub struct RedisStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisStore {
    // == Constructor ==
    /// Creates a store for `url` (`redis://[:password@]host:port[/db]`).
    ///
    /// Only the URL is validated here; no connection is made.
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    /// Returns a handle to the shared connection, connecting if needed.
    ///
    /// A failed connect leaves the cell empty so the next call tries again.
    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                debug!("connecting to redis");
                let manager = ConnectionManager::new(self.client.clone()).await?;
                info!("redis connection established");
                Ok::<_, redis::RedisError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl KvStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<u64>, mode: SetMode) -> Result<bool> {
        let mut conn = self.connection().await?;
        let reply: Option<String> = set_command(key, &value, ttl, mode)
            .query_async(&mut conn)
            .await?;
        // SET answers OK when written and nil when NX refused the write
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Builds `SET key value [EX ttl] [NX]`.
fn set_command(key: &str, value: &str, ttl: Option<u64>, mode: SetMode) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);
    if let Some(ttl) = ttl {
        cmd.arg("EX").arg(ttl);
    }
    if mode == SetMode::IfAbsent {
        cmd.arg("NX");
    }
    cmd
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    fn packed(cmd: &redis::Cmd) -> String {
        String::from_utf8(cmd.get_packed_command()).unwrap()
    }

    #[test]
    fn test_set_command_if_absent_with_ttl() {
        let cmd = set_command("help", "abcd", Some(86400), SetMode::IfAbsent);
        assert_eq!(
            packed(&cmd),
            "*6\r\n$3\r\nSET\r\n$4\r\nhelp\r\n$4\r\nabcd\r\n$2\r\nEX\r\n$5\r\n86400\r\n$2\r\nNX\r\n"
        );
    }

    #[test]
    fn test_set_command_overwrite_without_ttl() {
        let cmd = set_command("help", "abcd", None, SetMode::Overwrite);
        assert_eq!(
            packed(&cmd),
            "*3\r\n$3\r\nSET\r\n$4\r\nhelp\r\n$4\r\nabcd\r\n"
        );
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(RedisStore::open("not a url").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Grab a free port and release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let store = RedisStore::open(&format!("redis://127.0.0.1:{}", port)).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(30), store.get("help"))
            .await
            .expect("connect attempt should not hang");

        assert!(matches!(result, Err(CacheError::StoreUnavailable(_))));
    }

    // == Live Server ==
    // Need a running Redis: REDIS_TEST_URL, default redis://127.0.0.1:6379.
    // Run with `cargo test -- --ignored`.

    async fn live_store(key: &str) -> RedisStore {
        let url = std::env::var("REDIS_TEST_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let store = RedisStore::open(&url).unwrap();
        store.delete(key).await.unwrap();
        store
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_if_absent_refused_on_existing_key() {
        let key = "mirror_proxy:test:nx";
        let store = live_store(key).await;

        assert!(store.set(key, "first".to_string(), Some(60), SetMode::IfAbsent).await.unwrap());
        assert!(!store.set(key, "second".to_string(), Some(60), SetMode::IfAbsent).await.unwrap());
        assert_eq!(store.get(key).await.unwrap().as_deref(), Some("first"));

        assert!(store.set(key, "second".to_string(), None, SetMode::Overwrite).await.unwrap());
        assert_eq!(store.get(key).await.unwrap().as_deref(), Some("second"));

        store.delete(key).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_delete_reports_removal() {
        let key = "mirror_proxy:test:del";
        let store = live_store(key).await;

        assert!(!store.delete(key).await.unwrap());
        assert!(store.get(key).await.unwrap().is_none());

        store.set(key, "blob".to_string(), None, SetMode::IfAbsent).await.unwrap();
        assert!(store.delete(key).await.unwrap());
        assert!(!store.delete(key).await.unwrap());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_ttl_expires_entry() {
        let key = "mirror_proxy:test:ex";
        let store = live_store(key).await;

        store.set(key, "blob".to_string(), Some(1), SetMode::IfAbsent).await.unwrap();
        assert!(store.get(key).await.unwrap().is_some());

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(store.get(key).await.unwrap().is_none());
        store.ping().await.unwrap();
    }
}
