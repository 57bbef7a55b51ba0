//! Error type shared by the small handful of `mpyc-util` operations that
//! can fail outright (as opposed to reporting through a [`crate::Handler`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UtilError {
    #[error("symbol index {0} out of bounds")]
    SymbolOutOfBounds(u32),
}

pub type UtilResult<T> = std::result::Result<T, UtilError>;
