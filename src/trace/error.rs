use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("Line {line}: '{command}' expects {expected} arguments, got {found}")]
    WrongArity {
        line: usize,
        command: String,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: invalid {what} '{token}'")]
    InvalidNumber {
        line: usize,
        what: &'static str,
        token: String,
    },
}
