use std::path::PathBuf;

/// host application configuration loaded from environment variables.
/// the listener port is deliberately not here; the form page and the
/// companion app assume the fixed port.
#[derive(Debug, Clone)]
pub struct Config {
    /// directory uploaded books are saved into
    pub books_dir: PathBuf,
    /// number of tokio worker threads
    pub worker_threads: usize,
}

impl Config {
    /// load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            books_dir: std::env::var("BOOKS_DIR")
                .unwrap_or_else(|_| "./books".to_string())
                .into(),
            worker_threads: std::env::var("WORKER_THREADS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(4),
        }
    }
}
