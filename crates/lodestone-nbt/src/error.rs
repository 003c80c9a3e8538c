use thiserror::Error;

/// Errors raised while decoding or encoding tag trees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NbtError {
    #[error("unexpected end of input: needed {needed} byte(s), {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("unknown tag type {0}")]
    UnknownTagType(u8),

    #[error("expected root tag of type {expected}, found {found}")]
    UnexpectedRoot {
        expected: &'static str,
        found: &'static str,
    },

    #[error("negative length {0}")]
    NegativeLength(i64),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("string of {0} bytes does not fit a length prefix")]
    StringTooLong(usize),

    #[error("collection of {0} elements does not fit a length prefix")]
    CollectionTooLong(usize),

    #[error("varint exceeds {0} bytes")]
    VarIntTooLong(usize),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("list declares element type {declared} but holds {found}")]
    MixedList {
        declared: &'static str,
        found: &'static str,
    },

    #[error("{0} trailing byte(s) after root tag")]
    TrailingBytes(usize),
}

pub type Result<T> = std::result::Result<T, NbtError>;
