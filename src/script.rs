//! Line-oriented operation scripts that drive a [`RingBuffer`] of strings.
//!
//! ```text
//! write 1      # fails when full
//! force 2      # evicts the oldest element when full
//! push 3       # write or force, per the active overflow policy
//! read         # fails when empty
//! len
//! clear
//! ```

use crate::util::ring_buffer::{OverflowPolicy, RingBuffer};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write(String),
    Force(String),
    Push(String),
    Read,
    Len,
    Clear,
}

/// Where a script op came from: a line of a script file or a positional
/// command line argument (both 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Line(usize),
    Arg(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(n) => write!(f, "line {}", n),
            Location::Arg(n)  => write!(f, "argument {}", n),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("{at}: unknown command '{command}'")]
    UnknownCommand { at: Location, command: String },

    #[error("{at}: '{command}' needs a value")]
    MissingArgument { at: Location, command: String },

    #[error("{at}: '{command}' takes no arguments")]
    UnexpectedArgument { at: Location, command: String },
}

impl Op {
    /// Parses one script line. Blank lines and `#` comments yield `None`.
    pub fn parse(at: Location, line: &str) -> Result<Option<Op>, ScriptError> {
        let line = match line.split_once('#') {
            Some((code, _)) => code,
            None            => line,
        }.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None         => (line, ""),
        };
        let command = command.to_ascii_lowercase();

        let value = || -> Result<String, ScriptError> {
            if rest.is_empty() {
                Err(ScriptError::MissingArgument { at, command: command.clone() })
            } else {
                Ok(rest.to_string())
            }
        };
        let bare = |op: Op| -> Result<Option<Op>, ScriptError> {
            if rest.is_empty() {
                Ok(Some(op))
            } else {
                Err(ScriptError::UnexpectedArgument { at, command: command.clone() })
            }
        };

        match command.as_str() {
            "write"                 => Ok(Some(Op::Write(value()?))),
            "force" | "force_write" => Ok(Some(Op::Force(value()?))),
            "push"                  => Ok(Some(Op::Push(value()?))),
            "read"                  => bare(Op::Read),
            "len" | "length"        => bare(Op::Len),
            "clear"                 => bare(Op::Clear),
            _ => Err(ScriptError::UnknownCommand { at, command: command.clone() }),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Write(v) => write!(f, "write {}", v),
            Op::Force(v) => write!(f, "force {}", v),
            Op::Push(v)  => write!(f, "push {}", v),
            Op::Read     => f.write_str("read"),
            Op::Len      => f.write_str("len"),
            Op::Clear    => f.write_str("clear"),
        }
    }
}

/// Parses a whole script, stopping at the first bad line.
pub fn parse_script(text: &str) -> Result<Vec<Op>, ScriptError> {
    let mut ops = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(op) = Op::parse(Location::Line(idx + 1), line)? {
            ops.push(op);
        }
    }
    Ok(ops)
}

/// Script file ops first, then one op per positional argument. Errors in
/// arguments are reported by argument index, not by script line.
pub fn collect_ops(script: Option<&str>, args: &[String]) -> Result<Vec<Op>, ScriptError> {
    let mut ops = match script {
        Some(text) => parse_script(text)?,
        None       => Vec::new(),
    };
    for (idx, arg) in args.iter().enumerate() {
        if let Some(op) = Op::parse(Location::Arg(idx + 1), arg)? {
            ops.push(op);
        }
    }
    Ok(ops)
}

/// Result of one replayed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Status {
    Ok,
    Value { value: String },
    Evicted { value: String },
    Length { value: usize },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub op: String,
    #[serde(flatten)]
    pub status: Status,
    /// Buffer length after the operation.
    pub len: usize,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = match &self.status {
            Status::Ok                   => "ok".to_string(),
            Status::Value { value }      => format!("-> {}", value),
            Status::Evicted { value }    => format!("ok (evicted {})", value),
            Status::Length { value }     => format!("= {}", value),
            Status::Error { message }    => format!("error: {}", message),
        };
        write!(f, "{:<16} {:<28} [len {}]", self.op, detail, self.len)
    }
}

/// Drives a buffer through a sequence of operations.
///
/// Buffer errors are recorded in the outcome and the run carries on.
pub struct Replay {
    pub buffer: RingBuffer<String>,
    pub policy: OverflowPolicy,
}

impl Replay {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self { buffer: RingBuffer::new(capacity), policy }
    }

    pub fn apply(&mut self, op: &Op) -> Outcome {
        let status = match op {
            Op::Write(v) => match self.buffer.write(v.clone()) {
                Ok(())   => Status::Ok,
                Err(e)   => Status::Error { message: e.to_string() },
            },
            Op::Force(v) => evicted(self.buffer.force_write(v.clone())),
            Op::Push(v)  => match self.buffer.push(v.clone(), self.policy) {
                Ok(old)  => evicted(old),
                Err(e)   => Status::Error { message: e.to_string() },
            },
            Op::Read     => match self.buffer.read() {
                Ok(value) => Status::Value { value },
                Err(e)    => Status::Error { message: e.to_string() },
            },
            Op::Len      => Status::Length { value: self.buffer.len() },
            Op::Clear    => {
                self.buffer.clear();
                Status::Ok
            }
        };
        let outcome = Outcome { op: op.to_string(), status, len: self.buffer.len() };
        debug!(op = %outcome.op, len = outcome.len, status = ?outcome.status, "applied");
        outcome
    }

    pub fn run(&mut self, ops: &[Op]) -> Vec<Outcome> {
        ops.iter().map(|op| self.apply(op)).collect()
    }
}

fn evicted(old: Option<String>) -> Status {
    match old {
        Some(value) => Status::Evicted { value },
        None        => Status::Ok,
    }
}
