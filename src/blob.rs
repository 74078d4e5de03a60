use std::collections::HashMap;

use uuid::Uuid;

/// Boundary for certificate file storage. The system being replaced never
/// stored real bytes; it fabricated a synthetic URL after a cosmetic delay.
/// Keeping the seam abstract lets a real backend slot in later.
pub trait BlobStore {
    fn put(&mut self, owner_id: &str, file_name: &str) -> String;
    fn contains(&self, url: &str) -> bool;
}

/// In-memory stand-in: records what was "uploaded" and hands back a
/// synthetic blob URL.
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, owner_id: &str, file_name: &str) -> String {
        let url = format!("blob://certificates/{}/{}/{}", owner_id, Uuid::new_v4(), file_name);
        self.entries.insert(url.clone(), file_name.to_string());
        url
    }

    fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }
}
