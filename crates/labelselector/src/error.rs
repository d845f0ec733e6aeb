use peg::str::LineCol;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid label key {0:?}: {1}")]
    InvalidKey(String, &'static str),
    #[error("invalid label value {0:?} for key {1:?}: {2}")]
    InvalidValue(String, String, &'static str),
    #[error("operator {0} expects {1}, got {2} values")]
    ValueCount(crate::Operator, &'static str, usize),
    #[error("failed to parse selector: {0}")]
    Parse(#[from] peg::error::ParseError<LineCol>),
}
pub type Result<T> = std::result::Result<T, Error>;
