//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::common::binary::BinaryError;
use crate::ole::OleError;
use crate::ole::vsd::VsdError;

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        Error::ParseError(err.to_string())
    }
}

impl From<OleError> for Error {
    fn from(err: OleError) -> Self {
        match err {
            OleError::Io(e) => Error::Io(e),
            OleError::InvalidFormat(s) => Error::InvalidFormat(s),
            OleError::InvalidData(e) => Error::from(e),
            OleError::NotOleFile => Error::NotVisioFile,
            OleError::CorruptedFile(s) => Error::CorruptedFile(s),
            OleError::StreamNotFound => Error::ComponentNotFound("Stream not found".to_string()),
        }
    }
}

impl From<VsdError> for Error {
    fn from(err: VsdError) -> Self {
        match err {
            VsdError::Ole(e) => Error::from(e),
            VsdError::Truncated(e) => Error::from(e),
            VsdError::NotVisioDocument(_) => Error::NotVisioFile,
            VsdError::UnsupportedVersion(v) => Error::Unsupported(format!("Visio file version {}", v)),
            VsdError::UnsupportedPointer(t) => {
                Error::Unsupported(format!("top-level pointer type 0x{:x}", t))
            },
            e @ (VsdError::ExtentOverflow { .. } | VsdError::RecursionLimit(_)) => {
                Error::CorruptedFile(e.to_string())
            },
        }
    }
}
