use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
}

/// Access class granted to a principal tier, or requested by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    None,
    Read,
    Write,
    ReadWrite,
}

impl Access {
    /// Whether these bits satisfy the requested access.
    pub fn implies(self, requested: Access) -> bool {
        match self {
            Access::ReadWrite => true,
            Access::Read => matches!(requested, Access::None | Access::Read),
            Access::Write => matches!(requested, Access::None | Access::Write),
            Access::None => matches!(requested, Access::None),
        }
    }
}

/// Owner/other permission pair. There is no group tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub owner: Access,
    pub other: Access,
}

impl Permission {
    pub fn new(owner: Access, other: Access) -> Self {
        Self { owner, other }
    }

    /// Owner read-write, other read (the 644 of this model).
    pub fn default_file() -> Self {
        Self::new(Access::ReadWrite, Access::Read)
    }

    /// Owner read-write, other read-write.
    pub fn open_wide() -> Self {
        Self::new(Access::ReadWrite, Access::ReadWrite)
    }

    /// Owner read-write, other none.
    pub fn owner_only() -> Self {
        Self::new(Access::ReadWrite, Access::None)
    }
}

impl Default for Permission {
    fn default() -> Self {
        Self::default_file()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: u64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d,
            Err(e) => {
                warn!("System time is before UNIX epoch: {:?}", e);
                std::time::Duration::ZERO
            }
        };
        Self {
            seconds: now.as_secs(),
            nanoseconds: now.subsec_nanos(),
        }
    }
}

/// Point-in-time snapshot of one entry, as returned by status and listing
/// operations.
#[derive(Debug, Clone)]
pub struct FileStatus {
    pub path: String,
    pub size: u64,
    pub is_directory: bool,
    pub owner: String,
    pub permission: Permission,
    pub modification_time: Timestamp,
    pub access_time: Timestamp,
    pub block_size: u64,
}
