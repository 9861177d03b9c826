use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::state::ReceivedFile;
use crate::utils::sanitize_filename;

/// one entry in the sidecar index
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BookEntry {
    pub name: String,
    pub size: u64,
    pub added: String,
}

/// The book shelf on disk: uploaded files plus an `index.json` sidecar.
/// Invoked from the file-received callback after a successful upload.
pub struct BookLibrary {
    books_dir: PathBuf,
}

impl BookLibrary {
    pub fn new(books_dir: impl Into<PathBuf>) -> Self {
        Self {
            books_dir: books_dir.into(),
        }
    }

    pub fn books_dir(&self) -> &Path {
        &self.books_dir
    }

    // persist a received upload and record it in the index
    pub async fn save(&self, file: &ReceivedFile) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.books_dir).await?;

        let name = sanitize_filename(&file.file_name);
        let path = self.books_dir.join(&name);
        tracing::debug!("writing book to {:?}", path);

        let mut out = fs::File::create(&path).await?;
        out.write_all(file.content.as_bytes()).await?;
        out.sync_all().await?;

        self.record(&name, file.content.len() as u64).await?;
        tracing::info!("✅ saved book: {} ({} bytes)", name, file.content.len());
        Ok(path)
    }

    /// entries currently in the sidecar, empty if there is none yet
    pub async fn entries(&self) -> Vec<BookEntry> {
        match fs::read(self.index_path()).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn index_path(&self) -> PathBuf {
        self.books_dir.join("index.json")
    }

    // re-uploading a book replaces its entry rather than duplicating it
    async fn record(&self, name: &str, size: u64) -> std::io::Result<()> {
        let mut entries = self.entries().await;
        entries.retain(|e| e.name != name);
        entries.push(BookEntry {
            name: name.to_string(),
            size,
            added: chrono::Utc::now().to_rfc3339(),
        });

        let json = serde_json::to_vec_pretty(&entries)?;
        fs::write(self.index_path(), json).await?;
        Ok(())
    }
}
