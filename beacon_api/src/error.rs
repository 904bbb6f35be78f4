use reqwest::StatusCode;
use thiserror::Error;
use types::primitives::{Epoch, PublicKeyBytes};

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Error {
    #[error("bad request to beacon node ({status}): {message}")]
    BadRequest { status: StatusCode, message: String },
    #[error("{field} has {actual} bytes instead of {expected}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("beacon node response is missing {field}")]
    MissingField { field: &'static str },
    #[error("beacon node internal error ({status}): {message}")]
    NodeInternalError { status: StatusCode, message: String },
    #[error("beacon node returned page token {token:?} twice in a row")]
    PageTokenRepeated { token: String },
    #[error("validator {public_key:?} has duties in epoch {epoch} but no balance")]
    UnknownPublicKey {
        public_key: PublicKeyBytes,
        epoch: Epoch,
    },
}
