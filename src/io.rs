//! Line-oriented readers for stdin style input.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Read, StdinLock};
use std::str::FromStr;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),
    #[error("cannot parse {token:?} as {expected}")]
    Parse {
        token: String,
        expected: &'static str,
    },
    #[error("matrix row {row} has {actual} entries, expected {expected}")]
    Dimension {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Reads integers, arrays, matrices and word sets one line at a time.
#[derive(Debug)]
pub struct StdinReader<R> {
    reader: R,
}

impl StdinReader<StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> StdinReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn line(&mut self) -> Result<String, IoError> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line)
    }

    /// A line holding exactly one integer.
    pub fn integer(&mut self) -> Result<i64, IoError> {
        let line = self.line()?;
        parse_token(line.trim())
    }

    /// A line of whitespace separated values, all of type `T`.
    pub fn array<T: FromStr>(&mut self) -> Result<Vec<T>, IoError> {
        let line = self.line()?;
        line.split_whitespace().map(parse_token::<T>).collect()
    }

    /// `n` lines of `n` integers each.
    pub fn matrix(&mut self, n: usize) -> Result<Vec<Vec<i64>>, IoError> {
        let mut rows = Vec::with_capacity(n);
        for row in 0..n {
            let values: Vec<i64> = self.array()?;
            if values.len() != n {
                error!(row, expected = n, actual = values.len(), "matrix row has wrong length");
                return Err(IoError::Dimension {
                    row,
                    expected: n,
                    actual: values.len(),
                });
            }
            rows.push(values);
        }
        Ok(rows)
    }

    /// A line of whitespace separated words, deduplicated.
    pub fn words(&mut self) -> Result<BTreeSet<String>, IoError> {
        let line = self.line()?;
        Ok(line.split_whitespace().map(str::to_string).collect())
    }

    /// Every remaining word up to end of input, across lines, deduplicated.
    pub fn all_words(&mut self) -> Result<BTreeSet<String>, IoError> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text)?;
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

fn parse_token<T: FromStr>(token: &str) -> Result<T, IoError> {
    token.parse().map_err(|_| {
        let expected = std::any::type_name::<T>();
        error!(token, expected, "failed to parse input");
        IoError::Parse {
            token: token.to_string(),
            expected,
        }
    })
}
