use flex_syntax::SyntaxError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// The source could not be turned into a syntax tree
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl GraphError {
    /// True when the caller's source was malformed, as opposed to an
    /// analyzer-side failure
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, GraphError::Syntax(err) if err.is_invalid_source())
    }
}
