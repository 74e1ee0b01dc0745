use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::Identity;
use crate::theme::ThemePreference;

mod cache;
mod document;

pub use cache::{FileCache, MemoryCache};
pub use document::{FileDocumentStore, MemoryDocumentStore};

/// Key the device-local preference lives under.
pub const THEME_PREFERENCE_KEY: &str = "@app_theme_preference_v3";
/// Collection holding one preference document per identity.
pub const PREFERENCE_COLLECTION: &str = "userPreferences";
/// Document field carrying the preference.
pub const THEME_PREFERENCE_FIELD: &str = "themePreference";

pub type Document = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse stored data")]
    Parse(#[from] serde_json::Error),
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// On-device string store that survives restarts.
pub trait LocalPreferenceCache: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Remote document store keyed by collection and identity.
pub trait RemotePreferenceStore: Send + Sync {
    fn get(&self, collection: &str, identity: &Identity) -> StorageResult<Option<Document>>;
    /// Merge `fields` into the document, creating it if needed. Fields not
    /// named in `fields` are left untouched.
    fn set_merge(&self, collection: &str, identity: &Identity, fields: Document)
        -> StorageResult<()>;
}

/// The persisted shape of a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(rename = "themePreference")]
    pub theme_preference: ThemePreference,
}

impl PreferenceRecord {
    pub const fn new(theme_preference: ThemePreference) -> Self {
        Self { theme_preference }
    }

    /// Pull a record out of a remote document. A missing field, `null`, or an
    /// unknown value all count as absent.
    pub fn from_document(document: &Document) -> Option<Self> {
        document
            .get(THEME_PREFERENCE_FIELD)
            .and_then(serde_json::Value::as_str)
            .and_then(|value| value.parse().ok())
            .map(Self::new)
    }

    pub fn to_document(self) -> Document {
        let mut document = Document::new();
        document.insert(
            THEME_PREFERENCE_FIELD.to_string(),
            serde_json::Value::String(self.theme_preference.as_str().to_string()),
        );
        document
    }

    pub fn from_cached(value: &str) -> Option<Self> {
        value.parse().ok().map(Self::new)
    }
}

fn read_optional(path: &Path) -> StorageResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_document(path: &Path, document: &Document) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let serialized = serde_json::to_string_pretty(document)?;
    fs::write(path, serialized).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_document(path: &Path) -> StorageResult<Option<Document>> {
    match read_optional(path)? {
        Some(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_FIXTURE: AtomicUsize = AtomicUsize::new(0);

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        let seq = NEXT_FIXTURE.fetch_add(1, Ordering::Relaxed);
        path.push(format!("campus-companion-{pid}-{nanos}-{seq}"));
        path
    }

    pub(crate) fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let root = fixture_root();
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }
}
