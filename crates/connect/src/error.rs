use thiserror::Error;

use crate::port::ScopeId;

pub type Result<T> = std::result::Result<T, ConnectError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("a connection gesture is already in progress")]
    SessionActive,

    #[error("event scope {0:?} is not known to the host")]
    UnknownScope(ScopeId),
}
