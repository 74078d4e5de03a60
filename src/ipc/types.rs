use std::path::PathBuf;

use serde::Deserialize;

use crate::blob::{BlobStore, MemoryBlobStore};
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    pub blobs: Box<dyn BlobStore>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            workspace: None,
            store: None,
            blobs: Box::new(MemoryBlobStore::new()),
        }
    }
}
