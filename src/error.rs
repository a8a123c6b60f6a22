use crate::platform::{OperatingSystem, ProcessorArch};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- generic errors --------------------------------------------
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    // --------------------------------- capability errors -----------------------------------------
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} not supported")]
    NotSupported(&'static str),

    // --------------------------------- backend errors --------------------------------------------
    #[error("debugger backend: {0}")]
    Backend(anyhow::Error),

    // --------------------------------- classification errors -------------------------------------
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        os: OperatingSystem,
        arch: ProcessorArch,
    },
}

impl Error {
    /// Wrap an error reported by the underlying debugger engine.
    /// Backend errors are propagated verbatim, never swallowed or rewritten.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Error::Backend(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "extension", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "extension", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::debug, $res, $msg)
    };
}
