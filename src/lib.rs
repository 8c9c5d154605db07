pub mod fs;


pub use fs::errors::{FsError, FsResult};
pub use fs::handle::{ReadHandle, WriteHandle};
pub use fs::types::{Access, FileStatus, FileType, Permission, Timestamp};
pub use fs::{FsConfig, MemoryFs};
