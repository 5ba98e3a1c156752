use thiserror::Error;

/// Error for code generator configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeGeneratorError {
    #[error("Code length must be between 1 and {max}, got {actual}")]
    InvalidLength { max: usize, actual: usize },

    #[error("Code alphabet needs at least {min} distinct characters, got {actual}")]
    AlphabetTooSmall { min: usize, actual: usize },

    #[error("Code alphabet contains {0:?} more than once")]
    DuplicateCharacter(char),

    #[error("Code alphabet contains whitespace or control characters")]
    InvalidCharacter,
}

/// Error for inbound code strings that cannot be a code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeFormatError {
    #[error("Code is empty")]
    Empty,

    #[error("Code too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Code contains whitespace or control characters")]
    InvalidCharacters,
}
