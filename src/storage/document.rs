use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{
    read_document, write_document, Document, RemotePreferenceStore, StorageError, StorageResult,
};
use crate::source::Identity;

/// Document store laid out as `<root>/<collection>/<identity>.json`.
#[derive(Debug)]
pub struct FileDocumentStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            lock: Mutex::new(()),
        }
    }

    fn document_path(&self, collection: &str, identity: &Identity) -> StorageResult<PathBuf> {
        validate_segment(collection)?;
        validate_segment(identity.as_str())?;
        let mut path = self.root.clone();
        path.push(collection);
        path.push(format!("{}.json", identity.as_str()));
        Ok(path)
    }
}

fn validate_segment(segment: &str) -> StorageResult<()> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\']);
    if invalid {
        return Err(StorageError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

impl RemotePreferenceStore for FileDocumentStore {
    fn get(&self, collection: &str, identity: &Identity) -> StorageResult<Option<Document>> {
        let path = self.document_path(collection, identity)?;
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        read_document(&path)
    }

    fn set_merge(
        &self,
        collection: &str,
        identity: &Identity,
        fields: Document,
    ) -> StorageResult<()> {
        let path = self.document_path(collection, identity)?;
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut document = read_document(&path)?.unwrap_or_default();
        document.extend(fields);
        write_document(&path, &document)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<(String, Identity), Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(collection: &str, identity: &Identity, document: Document) -> Self {
        let store = Self::new();
        if let Ok(mut documents) = store.documents.lock() {
            documents.insert((collection.to_string(), identity.clone()), document);
        }
        store
    }
}

impl RemotePreferenceStore for MemoryDocumentStore {
    fn get(&self, collection: &str, identity: &Identity) -> StorageResult<Option<Document>> {
        let documents = self.documents.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(documents
            .get(&(collection.to_string(), identity.clone()))
            .cloned())
    }

    fn set_merge(
        &self,
        collection: &str,
        identity: &Identity,
        fields: Document,
    ) -> StorageResult<()> {
        let mut documents = self.documents.lock().map_err(|_| StorageError::Poisoned)?;
        documents
            .entry((collection.to_string(), identity.clone()))
            .or_default()
            .extend(fields);
        Ok(())
    }
}
