//! Runtime settings for [`Db`](crate::Db).

use std::time::Duration;

use tracing::Level;

/// Logging and caching behavior of a [`Db`](crate::Db) handle.
///
/// Every statement is logged as a `tracing` event under the `sqlcraft.sql`
/// target. Statements slower than `slow_query_threshold` additionally emit a
/// `WARN` event.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Tracing event level for per-statement events.
    pub level: Level,
    /// Slow statement threshold. `None` disables slow-statement warnings.
    pub slow_query_threshold: Option<Duration>,
    /// Truncate logged SQL (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Whether SELECT results go through the cache.
    pub cache_enabled: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            slow_query_threshold: None,
            max_sql_length: Some(200),
            cache_enabled: true,
        }
    }
}

impl DbConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the slow statement threshold.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Bypass the cache; every SELECT reaches the executor.
    pub fn disable_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// SQL as it should appear in logs.
    pub(crate) fn display_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DbConfig::new();
        assert_eq!(cfg.level, Level::DEBUG);
        assert_eq!(cfg.max_sql_length, Some(200));
        assert!(cfg.cache_enabled);
        assert!(cfg.slow_query_threshold.is_none());
    }

    #[test]
    fn builder_methods() {
        let cfg = DbConfig::new()
            .with_slow_query_threshold(Duration::from_millis(50))
            .no_truncate()
            .disable_cache();
        assert_eq!(cfg.slow_query_threshold, Some(Duration::from_millis(50)));
        assert_eq!(cfg.max_sql_length, None);
        assert!(!cfg.cache_enabled);
    }

    #[test]
    fn display_sql_truncates_on_char_boundary() {
        let cfg = DbConfig::new().max_sql_length(3);
        assert_eq!(cfg.display_sql("select"), "sel...");
        assert_eq!(cfg.display_sql("ab"), "ab");
        // 'é' spans bytes 1..3
        let cfg = DbConfig::new().max_sql_length(2);
        assert_eq!(cfg.display_sql("aéb"), "a...");
    }
}
