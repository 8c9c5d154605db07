use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use super::store::ChunkStore;
use super::types::{FileType, Permission, Timestamp};

/// One namespace node: a file or directory with its metadata.
///
/// Ownership and permission bits are fixed at creation; timestamps and
/// attributes are mutable and lock-guarded so an update on one thread is
/// immediately visible to readers on any other. Only files own a
/// `ChunkStore`.
pub struct Entry {
    pub kind: FileType,
    pub owner: String,
    pub permission: Permission,
    times: RwLock<Times>,
    attributes: RwLock<HashMap<String, Bytes>>,
    content: Option<Arc<ChunkStore>>,
}

#[derive(Clone, Copy)]
struct Times {
    modification: Timestamp,
    access: Timestamp,
}

impl Entry {
    pub fn new_file(owner: impl Into<String>, permission: Permission, chunk_size: usize) -> Self {
        Self::new(
            FileType::Regular,
            owner,
            permission,
            Some(Arc::new(ChunkStore::new(chunk_size))),
        )
    }

    pub fn new_directory(owner: impl Into<String>, permission: Permission) -> Self {
        Self::new(FileType::Directory, owner, permission, None)
    }

    fn new(
        kind: FileType,
        owner: impl Into<String>,
        permission: Permission,
        content: Option<Arc<ChunkStore>>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            kind,
            owner: owner.into(),
            permission,
            times: RwLock::new(Times {
                modification: now,
                access: now,
            }),
            attributes: RwLock::new(HashMap::new()),
            content,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, FileType::Directory)
    }

    /// The file's chunk store; `None` for directories.
    pub fn chunks(&self) -> Option<&Arc<ChunkStore>> {
        self.content.as_ref()
    }

    /// Logical content size; 0 for directories.
    pub fn size(&self) -> u64 {
        self.content.as_ref().map(|c| c.size()).unwrap_or(0)
    }

    pub fn times(&self) -> (Timestamp, Timestamp) {
        let times = self.times.read();
        (times.modification, times.access)
    }

    pub fn touch_access(&self) {
        self.times.write().access = Timestamp::now();
    }

    pub fn touch_modified(&self) {
        let now = Timestamp::now();
        let mut times = self.times.write();
        times.modification = now;
        times.access = now;
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: Bytes) {
        self.attributes.write().insert(name.into(), value);
    }

    pub fn attribute(&self, name: &str) -> Option<Bytes> {
        self.attributes.read().get(name).cloned()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attributes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_never_own_content() {
        let dir = Entry::new_directory("alice", Permission::default());
        assert!(dir.is_directory());
        assert!(dir.chunks().is_none());
        assert_eq!(dir.size(), 0);
    }

    #[test]
    fn file_size_follows_content() {
        let file = Entry::new_file("alice", Permission::default(), 8);
        assert_eq!(file.size(), 0);
        file.chunks().unwrap().write(0, b"hello");
        assert_eq!(file.size(), 5);
    }

    #[test]
    fn touch_updates_are_visible() {
        let file = Entry::new_file("alice", Permission::default(), 8);
        let (before_mtime, _) = file.times();
        std::thread::sleep(std::time::Duration::from_millis(2));
        file.touch_modified();
        let (after_mtime, after_atime) = file.times();
        assert!(after_mtime > before_mtime);
        assert!(after_atime >= after_mtime);
    }

    #[test]
    fn attributes_round_trip() {
        let file = Entry::new_file("alice", Permission::default(), 8);
        file.set_attribute("user.tag", Bytes::from_static(b"blue"));
        assert_eq!(file.attribute("user.tag"), Some(Bytes::from_static(b"blue")));
        assert_eq!(file.attribute("user.other"), None);
        assert_eq!(file.attribute_names(), vec!["user.tag".to_string()]);
    }
}
