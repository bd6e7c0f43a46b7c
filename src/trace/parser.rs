use std::str::FromStr;

use crate::common::types::{PageNumber, ProcessId};
use crate::trace::error::TraceError;
use crate::trace::TraceEvent;

/// Parse one trace line. Returns `Ok(None)` for blank and comment-only lines.
///
/// `line_no` is 1-based and only used for error reporting.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<TraceEvent>, TraceError> {
    let content = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let tokens: Vec<&str> = content.split_whitespace().collect();
    let Some((&command, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let event = match command.to_ascii_lowercase().as_str() {
        "start" | "s" => {
            expect_args(command, args, 2, line_no)?;
            TraceEvent::Start {
                pid: parse_number(args[0], "process id", line_no)?,
                pages: parse_number(args[1], "page count", line_no)?,
            }
        }
        "ref" | "r" | "reference" => {
            expect_args(command, args, 2, line_no)?;
            TraceEvent::Reference {
                pid: parse_number(args[0], "process id", line_no)?,
                page: parse_number::<PageNumber>(args[1], "page number", line_no)?,
            }
        }
        "terminate" | "term" | "t" | "end" => {
            expect_args(command, args, 1, line_no)?;
            TraceEvent::Terminate {
                pid: parse_number::<ProcessId>(args[0], "process id", line_no)?,
            }
        }
        _ => {
            return Err(TraceError::UnknownCommand {
                line: line_no,
                command: command.to_string(),
            });
        }
    };

    Ok(Some(event))
}

fn expect_args(command: &str, args: &[&str], expected: usize, line_no: usize) -> Result<(), TraceError> {
    if args.len() != expected {
        return Err(TraceError::WrongArity {
            line: line_no,
            command: command.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn parse_number<T: FromStr>(token: &str, what: &'static str, line_no: usize) -> Result<T, TraceError> {
    token.parse().map_err(|_| TraceError::InvalidNumber {
        line: line_no,
        what,
        token: token.to_string(),
    })
}
