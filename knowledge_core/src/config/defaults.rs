//! Default configuration values.

// Store

pub const DEFAULT_STORE_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_STORE_USER: &str = "neo4j";
pub const DEFAULT_STORE_PASSWORD: &str = "password";

// Query

/// Results returned when a caller gives no limit.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on any requested limit.
pub const MAX_PAGE_SIZE: usize = 100;

/// Hop bound for learning paths when the caller gives none.
pub const DEFAULT_LEARNING_PATH_DEPTH: usize = 5;

pub const DEFAULT_LANGUAGE: &str = "cpp";

pub const SUPPORTED_LANGUAGES: &[&str] = &["cpp", "python", "java", "javascript"];

// Logging

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Level names accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
