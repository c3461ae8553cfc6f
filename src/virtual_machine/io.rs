//! Host I/O seam for the `IN` and `OUT` instructions.
//!
//! The [`Io`] trait is threaded through execution so the engine never touches
//! process streams directly. [`StdIo`] reads whitespace-separated numbers from
//! any buffered reader and prints one value per line; [`BufferIo`] keeps
//! everything in memory for tests and embedding.

use crate::virtual_machine::errors::VMError;
use std::collections::VecDeque;
use std::io::{BufRead, StdinLock, Stdout, Write};

/// Numeric input/output interface for VM execution.
pub trait Io {
    /// Reads the next number from the host.
    fn read_value(&mut self) -> Result<f64, VMError>;
    /// Writes a number to the host.
    fn write_value(&mut self, value: f64) -> Result<(), VMError>;
}

/// Reader/writer pair exchanging decimal text.
pub struct StdIo<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> StdIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: VecDeque::new(),
        }
    }

    /// Returns the next whitespace-separated token, reading more lines as needed.
    fn next_token(&mut self) -> Result<String, VMError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| VMError::Io {
                    reason: e.to_string(),
                })?;
            if read == 0 {
                return Err(VMError::Io {
                    reason: "unexpected end of input".to_string(),
                });
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
    }

    /// Consumes the adapter and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl StdIo<StdinLock<'static>, Stdout> {
    /// Binds to the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Io for StdIo<R, W> {
    fn read_value(&mut self) -> Result<f64, VMError> {
        let token = self.next_token()?;
        token
            .parse::<f64>()
            .map_err(|_| VMError::InvalidInput { input: token })
    }

    fn write_value(&mut self, value: f64) -> Result<(), VMError> {
        writeln!(self.writer, "{value}")
            .and_then(|_| self.writer.flush())
            .map_err(|e| VMError::Io {
                reason: e.to_string(),
            })
    }
}

/// In-memory I/O: queued input values and a log of written values.
#[derive(Debug, Default)]
pub struct BufferIo {
    pub input: VecDeque<f64>,
    pub output: Vec<f64>,
}

impl BufferIo {
    /// Creates a buffer that will feed `input` to successive reads.
    pub fn with_input(input: impl IntoIterator<Item = f64>) -> Self {
        Self {
            input: input.into_iter().collect(),
            output: Vec::new(),
        }
    }
}

impl Io for BufferIo {
    fn read_value(&mut self) -> Result<f64, VMError> {
        self.input.pop_front().ok_or(VMError::Io {
            reason: "input exhausted".to_string(),
        })
    }

    fn write_value(&mut self, value: f64) -> Result<(), VMError> {
        self.output.push(value);
        Ok(())
    }
}
