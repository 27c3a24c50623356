use std::path::PathBuf;

use serde::{Serialize, de::DeserializeOwned};

/// File-backed key/value store under the local data directory.
///
/// Each key maps to one JSON file. Reads never fail: a missing file, an
/// unreadable file, or malformed JSON all come back as `None`.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: PathBuf) -> Self {
        Storage { dir }
    }

    pub fn open_default() -> Self {
        let mut dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.push("quillcli/session");
        Storage { dir }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = async_fs::read_to_string(self.path_for(key)).await.ok()?;
        serde_json::from_str(&content).ok()
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), String> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Removes the value stored under `key`. Removing an absent key is fine.
    pub async fn remove(&self, key: &str) {
        let _ = async_fs::remove_file(self.path_for(key)).await;
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}
