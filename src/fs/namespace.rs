use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use parking_lot::RwLock;

use super::entry::Entry;
use super::errors::FsError;
use super::path;

/// Concurrent mapping from normalized absolute path to [`Entry`].
///
/// There are no parent/child pointers: directory membership is derived at
/// query time by comparing a candidate's immediate parent path to the
/// directory's path. A namespace-wide structural lock serializes rename and
/// recursive delete against the prefix scans, so a concurrent listing
/// observes either the pre-mutation or post-mutation state, never neither.
/// Plain lookups stay lock-free.
pub struct Namespace {
    entries: DashMap<String, Arc<Entry>>,
    structural: RwLock<()>,
}

impl Namespace {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            structural: RwLock::new(()),
        }
    }

    pub fn get(&self, path: &str) -> Option<Arc<Entry>> {
        self.entries.get(path).map(|e| Arc::clone(e.value()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert an entry, failing when the key is taken and `overwrite` does
    /// not permit replacing it. Only a file may overwrite a file:
    /// overwriting a directory fails with NotADirectory, and replacing a
    /// file with a directory fails with NotAFile.
    pub fn insert(
        &self,
        path: String,
        entry: Arc<Entry>,
        overwrite: bool,
    ) -> Result<(), FsError> {
        let _guard = self.structural.read();
        match self.entries.entry(path) {
            MapEntry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
            MapEntry::Occupied(mut slot) => {
                let existing = slot.get();
                if existing.is_directory() {
                    return Err(FsError::NotADirectory);
                }
                if entry.is_directory() {
                    return Err(FsError::NotAFile);
                }
                if !overwrite {
                    return Err(FsError::AlreadyExists);
                }
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Remove a single key. The caller has already established the entry's
    /// kind and emptiness; content is released with the entry.
    pub fn remove(&self, path: &str) -> Option<Arc<Entry>> {
        let _guard = self.structural.read();
        self.entries.remove(path).map(|(_, entry)| entry)
    }

    /// Remove `path` and every descendant under the exclusive structural
    /// lock, so no scan interleaves with a half-removed subtree.
    pub fn remove_recursive(&self, path: &str) {
        let _guard = self.structural.write();
        let doomed: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.key().clone())
            .filter(|key| key == path || path::is_descendant(path, key))
            .collect();
        for key in doomed {
            self.entries.remove(&key);
        }
    }

    /// Relocate `src` to `dst` as one critical section. When `src` is a
    /// directory, every descendant key is rewritten in the same section so
    /// children stay reachable under the new path.
    pub fn rename(&self, src: &str, dst: &str) -> Result<(), FsError> {
        let _guard = self.structural.write();

        if !self.entries.contains_key(src) {
            return Err(FsError::NotFound);
        }
        if self.entries.contains_key(dst) {
            return Err(FsError::AlreadyExists);
        }

        let descendants: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.key().clone())
            .filter(|key| path::is_descendant(src, key))
            .collect();

        if let Some((_, entry)) = self.entries.remove(src) {
            self.entries.insert(dst.to_string(), entry);
        }
        for key in descendants {
            let relocated = format!("{}{}", dst, &key[src.len()..]);
            if let Some((_, entry)) = self.entries.remove(&key) {
                self.entries.insert(relocated, entry);
            }
        }

        Ok(())
    }

    /// Immediate children of `dir`, sorted lexicographically by path for
    /// deterministic listings.
    pub fn children(&self, dir: &str) -> Vec<(String, Arc<Entry>)> {
        let _guard = self.structural.read();
        let mut children: Vec<(String, Arc<Entry>)> = self
            .entries
            .iter()
            .filter(|e| path::parent(e.key()) == Some(dir))
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));
        children
    }

    /// Whether `dir` has any descendant at any depth.
    pub fn has_descendants(&self, dir: &str) -> bool {
        let _guard = self.structural.read();
        self.entries
            .iter()
            .any(|e| path::is_descendant(dir, e.key()))
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}
