use crate::global_variables::*;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum FlowError {
    InvalidDimension { nx: usize, ny: usize },

    InvalidParameter { name: &'static str, value: Float },

    OutOfRange {
        i: usize,
        j: usize,
        nx: usize,
        ny: usize,
    },

    Config { key: String, message: String },

    Io(io::Error),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::InvalidDimension { nx, ny } => write!(
                f,
                "invalid grid dimensions {nx} x {ny}: at least {MIN_GRID_POINTS} points per axis are required"
            ),
            FlowError::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {name} = {value}: must be finite and positive")
            }
            FlowError::OutOfRange { i, j, nx, ny } => {
                write!(f, "index ({i}, {j}) is outside the {nx} x {ny} grid")
            }
            FlowError::Config { key, message } => write!(f, "case file entry {key}: {message}"),
            FlowError::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FlowError {
    fn from(e: io::Error) -> Self {
        FlowError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_values() {
        let e = FlowError::InvalidDimension { nx: 2, ny: 5 };
        assert_eq!(
            e.to_string(),
            "invalid grid dimensions 2 x 5: at least 3 points per axis are required"
        );
        let e = FlowError::OutOfRange {
            i: 7,
            j: 1,
            nx: 5,
            ny: 5,
        };
        assert_eq!(e.to_string(), "index (7, 1) is outside the 5 x 5 grid");
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let e: FlowError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(e.source().is_some());
    }
}
