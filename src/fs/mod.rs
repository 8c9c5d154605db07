//! The storage and namespace engine: a chunked byte store per file, a
//! concurrent path-keyed namespace, and owner/other permission enforcement
//! over the whole operation surface.

pub mod entry;
pub mod errors;
pub mod handle;
pub mod namespace;
pub mod path;
pub mod permissions;
pub mod store;
pub mod types;

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use self::entry::Entry;
use self::errors::{FsError, FsResult};
use self::handle::{ReadHandle, WriteHandle};
use self::namespace::Namespace;
use self::permissions::check_access;
use self::types::{Access, FileStatus, Permission};

pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Construction-time configuration. There is no ambient process state: the
/// enforcement toggle is fixed here and the active principal is an explicit
/// argument on every call.
#[derive(Debug, Clone)]
pub struct FsConfig {
    pub security_enabled: bool,
    pub default_chunk_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            security_enabled: false,
            default_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// In-memory hierarchical file store.
///
/// Every public operation resolves the path against the working directory,
/// consults the permission check, performs the namespace or chunk-store
/// mutation, and updates entry timestamps. All operations are synchronous
/// and may block on a lock; none carry a timeout.
pub struct MemoryFs {
    namespace: Namespace,
    config: FsConfig,
    working_dir: RwLock<String>,
}

impl MemoryFs {
    pub fn new(config: FsConfig) -> Self {
        Self {
            namespace: Namespace::new(),
            config,
            working_dir: RwLock::new("/".to_string()),
        }
    }

    /// Create a new file and return a write handle positioned at 0.
    ///
    /// Requires a principal and `Write` on the parent. An existing file is
    /// replaced only when `overwrite` is set; an existing directory is
    /// never replaced. The chunk size is fixed for the file's lifetime:
    /// `chunk_size_hint` or the configured default.
    pub fn create(
        &self,
        path: &str,
        permission: Permission,
        overwrite: bool,
        chunk_size_hint: Option<usize>,
        principal: &str,
    ) -> FsResult<WriteHandle> {
        let path = self.resolve(path);
        debug!("create {} (overwrite={})", path, overwrite);

        if principal.is_empty() {
            return Err(FsError::NoPrincipal);
        }
        if let Some(parent) = path::parent(&path) {
            self.check(parent, Access::Write, principal)?;
        }

        let chunk_size = chunk_size_hint.unwrap_or(self.config.default_chunk_size);
        if chunk_size == 0 {
            return Err(FsError::InvalidArgument);
        }

        let entry = Arc::new(Entry::new_file(principal, permission, chunk_size));
        let store = entry.chunks().cloned().ok_or(FsError::NotAFile)?;
        self.namespace.insert(path, entry, overwrite)?;

        Ok(WriteHandle::new(store, 0))
    }

    /// Open an existing file for appending; the handle starts at the
    /// current logical size. Modification and access time are updated at
    /// handle issuance, not per write call.
    pub fn append(&self, path: &str, principal: &str) -> FsResult<WriteHandle> {
        let path = self.resolve(path);
        self.check(&path, Access::Write, principal)?;

        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;
        let store = entry.chunks().cloned().ok_or(FsError::NotAFile)?;
        entry.touch_modified();

        let position = store.size();
        Ok(WriteHandle::new(store, position))
    }

    /// Open an existing file for reading; access time is updated before
    /// the handle is returned.
    pub fn open(&self, path: &str, principal: &str) -> FsResult<ReadHandle> {
        let path = self.resolve(path);
        self.check(&path, Access::Read, principal)?;

        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;
        let store = entry.chunks().cloned().ok_or(FsError::NotAFile)?;
        entry.touch_access();

        Ok(ReadHandle::new(store))
    }

    /// Atomically relocate `src` to `dst`. Renaming a directory carries
    /// all of its descendants along in the same critical section.
    ///
    /// Permission checks happen before the structural lock is taken; the
    /// namespace re-validates existence and the free destination under it.
    pub fn rename(&self, src: &str, dst: &str, principal: &str) -> FsResult<bool> {
        let src = self.resolve(src);
        let dst = self.resolve(dst);
        debug!("rename {} -> {}", src, dst);

        if !self.namespace.contains(&src) {
            return Err(FsError::NotFound);
        }
        self.check(&src, Access::ReadWrite, principal)?;
        if let Some(parent) = path::parent(&dst) {
            self.check(parent, Access::Write, principal)?;
        }

        self.namespace.rename(&src, &dst)?;
        Ok(true)
    }

    /// Remove an entry. Deleting an absent path is not an error and
    /// returns `Ok(false)`. A directory with descendants requires
    /// `recursive`; an empty directory is deletable without it.
    pub fn delete(&self, path: &str, recursive: bool, principal: &str) -> FsResult<bool> {
        let path = self.resolve(path);
        debug!("delete {} (recursive={})", path, recursive);

        self.check(&path, Access::Write, principal)?;

        let Some(entry) = self.namespace.get(&path) else {
            return Ok(false);
        };

        if entry.is_directory() && self.namespace.has_descendants(&path) {
            if !recursive {
                return Err(FsError::DirectoryNotEmpty);
            }
            self.namespace.remove_recursive(&path);
        } else {
            self.namespace.remove(&path);
        }
        Ok(true)
    }

    /// Create a directory entry. Idempotent: an existing directory at
    /// `path` is success without change; a file there fails. The namespace
    /// is a flat map, so no intermediate ancestor entries are created.
    pub fn mkdirs(&self, path: &str, permission: Permission, principal: &str) -> FsResult<bool> {
        let path = self.resolve(path);
        debug!("mkdirs {}", path);

        if principal.is_empty() {
            return Err(FsError::NoPrincipal);
        }
        if let Some(parent) = path::parent(&path) {
            self.check(parent, Access::Write, principal)?;
        }

        let entry = Arc::new(Entry::new_directory(principal, permission));
        match self.namespace.insert(path, entry, false) {
            Ok(()) => Ok(true),
            // A directory already occupies the key: idempotent success.
            Err(FsError::NotADirectory) => Ok(true),
            // A file occupies the key.
            Err(FsError::NotAFile) => Err(FsError::NotADirectory),
            Err(e) => Err(e),
        }
    }

    /// Shrink a file's content to `size` bytes; a size at or past the
    /// current logical size leaves the file unchanged.
    pub fn truncate(&self, path: &str, size: u64, principal: &str) -> FsResult<()> {
        let path = self.resolve(path);
        self.check(&path, Access::Write, principal)?;

        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;
        let store = entry.chunks().ok_or(FsError::NotAFile)?;
        store.truncate(size);
        entry.touch_modified();
        Ok(())
    }

    /// Status of a directory's immediate children, or of the file itself
    /// as a single-element result.
    pub fn list_status(&self, path: &str) -> FsResult<Vec<FileStatus>> {
        let path = self.resolve(path);
        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;

        if entry.is_directory() {
            Ok(self
                .namespace
                .children(&path)
                .into_iter()
                .map(|(child_path, child)| self.status_of(child_path, &child))
                .collect())
        } else {
            Ok(vec![self.status_of(path, &entry)])
        }
    }

    pub fn get_status(&self, path: &str) -> FsResult<FileStatus> {
        let path = self.resolve(path);
        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;
        Ok(self.status_of(path, &entry))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.namespace.contains(&self.resolve(path))
    }

    pub fn set_working_directory(&self, path: &str) {
        let resolved = self.resolve(path);
        *self.working_dir.write() = resolved;
    }

    pub fn working_directory(&self) -> String {
        self.working_dir.read().clone()
    }

    /// Attach a named attribute to an entry (simple key/value storage).
    pub fn set_attribute(
        &self,
        path: &str,
        name: &str,
        value: Bytes,
        principal: &str,
    ) -> FsResult<()> {
        let path = self.resolve(path);
        self.check(&path, Access::Write, principal)?;
        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;
        entry.set_attribute(name, value);
        Ok(())
    }

    pub fn get_attribute(&self, path: &str, name: &str, principal: &str) -> FsResult<Option<Bytes>> {
        let path = self.resolve(path);
        self.check(&path, Access::Read, principal)?;
        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;
        Ok(entry.attribute(name))
    }

    pub fn list_attributes(&self, path: &str, principal: &str) -> FsResult<Vec<String>> {
        let path = self.resolve(path);
        self.check(&path, Access::Read, principal)?;
        let entry = self.namespace.get(&path).ok_or(FsError::NotFound)?;
        Ok(entry.attribute_names())
    }

    fn resolve(&self, path: &str) -> String {
        path::resolve(&self.working_dir.read(), path)
    }

    fn check(&self, path: &str, access: Access, principal: &str) -> FsResult<()> {
        check_access(
            &self.namespace,
            path,
            access,
            principal,
            self.config.security_enabled,
        )
    }

    fn status_of(&self, path: String, entry: &Entry) -> FileStatus {
        let (modification_time, access_time) = entry.times();
        FileStatus {
            path,
            size: entry.size(),
            is_directory: entry.is_directory(),
            owner: entry.owner.clone(),
            permission: entry.permission,
            modification_time,
            access_time,
            block_size: entry
                .chunks()
                .map(|c| c.chunk_size() as u64)
                .unwrap_or(self.config.default_chunk_size as u64),
        }
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new(FsConfig::default())
    }
}
