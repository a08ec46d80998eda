use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;

use crate::node::NodeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptySource,
    NotImplemented,
    IncompatibleType,
    NotFound,
    Internal,
    NoHelper,
    Parse,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("can't parse empty source")]
    EmptySource,

    #[error("parser not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("incompatible type: expected {expected}, found {found}")]
    IncompatibleType { expected: NodeType, found: NodeType },

    #[error("node not found")]
    NotFound,

    #[error("internal vector error: {0}")]
    Internal(&'static str),

    #[error("helper not installed")]
    NoHelper,

    #[error(transparent)]
    ParseInt(#[from] ParseIntError),

    #[error(transparent)]
    ParseFloat(#[from] ParseFloatError),

    #[error(transparent)]
    ParseBool(#[from] ParseBoolError),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_implemented(context: &'static str) -> Self {
        Error::NotImplemented(context)
    }

    pub fn internal(context: &'static str) -> Self {
        Error::Internal(context)
    }

    pub fn incompatible(expected: NodeType, found: NodeType) -> Self {
        Error::IncompatibleType { expected, found }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptySource => ErrorKind::EmptySource,
            Error::NotImplemented(_) => ErrorKind::NotImplemented,
            Error::IncompatibleType { .. } => ErrorKind::IncompatibleType,
            Error::NotFound => ErrorKind::NotFound,
            Error::Internal(_) => ErrorKind::Internal,
            Error::NoHelper => ErrorKind::NoHelper,
            Error::ParseInt(_) | Error::ParseFloat(_) | Error::ParseBool(_) => ErrorKind::Parse,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_kind_maps_parse_errors() {
        let err: Error = "x".parse::<i64>().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let err: Error = "x".parse::<bool>().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[rstest::rstest]
    fn test_incompatible_message_names_types() {
        let err = Error::incompatible(NodeType::Bool, NodeType::String);
        assert_eq!(err.to_string(), "incompatible type: expected bool, found string");
        assert_eq!(err.kind(), ErrorKind::IncompatibleType);
    }
}
