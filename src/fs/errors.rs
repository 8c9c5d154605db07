use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("no principal set for this operation")]
    NoPrincipal,

    #[error("permission denied")]
    PermissionDenied,

    #[error("no such file or directory")]
    NotFound,

    #[error("file already exists")]
    AlreadyExists,

    #[error("not a directory")]
    NotADirectory,

    #[error("not a file")]
    NotAFile,

    #[error("directory not empty")]
    DirectoryNotEmpty,

    #[error("invalid argument")]
    InvalidArgument,
}

pub type FsResult<T> = Result<T, FsError>;

impl From<FsError> for std::io::Error {
    fn from(e: FsError) -> Self {
        use std::io::ErrorKind;

        let kind = match e {
            FsError::NoPrincipal | FsError::PermissionDenied => ErrorKind::PermissionDenied,
            FsError::NotFound => ErrorKind::NotFound,
            FsError::AlreadyExists => ErrorKind::AlreadyExists,
            FsError::NotADirectory => ErrorKind::NotADirectory,
            FsError::NotAFile => ErrorKind::IsADirectory,
            FsError::DirectoryNotEmpty => ErrorKind::DirectoryNotEmpty,
            FsError::InvalidArgument => ErrorKind::InvalidInput,
        };
        std::io::Error::new(kind, e)
    }
}
