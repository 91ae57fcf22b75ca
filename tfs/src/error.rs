use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid path")]
    InvalidPath,
    #[error("no such file")]
    NotFound,
    #[error("no free slot left")]
    Exhausted,
    #[error("name already exists")]
    DuplicateName,
    #[error("file handle is not open")]
    InvalidHandle,
    #[error("operation not permitted")]
    Disallowed,
    #[error("invalid file system parameters")]
    InvalidParams,
    #[error("external source: {0}")]
    External(#[from] SourceError),
}

/// 外部字节源读取失败的种类
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    #[error("not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("interrupted")]
    Interrupted,
    #[error("i/o error")]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_converts() {
        let err: Error = SourceError::PermissionDenied.into();
        assert_eq!(err, Error::External(SourceError::PermissionDenied));
        assert_eq!(err.to_string(), "external source: permission denied");
    }
}
