//! Substitution-matrix file loading.
//!
//! Two layouts are accepted, distinguished by the first byte of the header
//! line. A whitespace first byte means whitespace-separated columns:
//!
//! ```text
//!    A  C  G  T
//! A  2 -2 -2 -2
//! C -2  2 -2 -2
//! ...
//! ```
//!
//! Any other (non-digit, non-dash) first byte is taken as the separator for
//! the single-character layout, e.g. `,A,C,G,T` followed by `A,2,-2,-2,-2`.
//! `#` comments and blank lines are ignored in both.

use std::io::BufRead;
use std::path::Path;

use crate::error::{SwError, SwResult};
use crate::io::open_reader;
use crate::scoring::Scoring;

pub fn load_matrix_from_path(path: impl AsRef<Path>, scoring: &mut Scoring) -> SwResult<()> {
    let reader = open_reader(path)?;
    load_matrix(reader, scoring)
}

pub fn load_matrix<R: BufRead>(reader: R, scoring: &mut Scoring) -> SwResult<()> {
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    // Column headings are the first line that is not blank or a comment.
    let header = loop {
        let Some(line) = lines.next() else {
            return Err(SwError::MatrixParse {
                msg: "empty file",
                line: line_no,
            });
        };
        let line = line?;
        line_no += 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        if line.trim_end().len() < 2 {
            return Err(SwError::MatrixParse {
                msg: "too few column headings",
                line: line_no,
            });
        }
        break line;
    };

    let sep = header.as_bytes()[0];
    if sep.is_ascii_digit() || sep == b'-' {
        return Err(SwError::MatrixParse {
            msg: "numbers and dashes do not make good separators",
            line: line_no,
        });
    }

    if sep.is_ascii_whitespace() {
        let labels = whitespace_labels(&header, scoring.case_sensitive);
        for line in lines {
            let line = line?;
            line_no += 1;
            parse_whitespace_row(&line, &labels, line_no, scoring)?;
        }
    } else {
        let labels = separator_labels(&header, sep, line_no, scoring.case_sensitive)?;
        for line in lines {
            let line = line?;
            line_no += 1;
            parse_separator_row(&line, sep, &labels, line_no, scoring)?;
        }
    }

    Ok(())
}

fn fold(c: u8, case_sensitive: bool) -> u8 {
    if case_sensitive {
        c
    } else {
        c.to_ascii_lowercase()
    }
}

fn whitespace_labels(header: &str, case_sensitive: bool) -> Vec<u8> {
    header
        .split_whitespace()
        .flat_map(|token| token.bytes())
        .map(|c| fold(c, case_sensitive))
        .collect()
}

fn separator_labels(
    header: &str,
    sep: u8,
    line_no: usize,
    case_sensitive: bool,
) -> SwResult<Vec<u8>> {
    let bytes = header.trim_end().as_bytes();
    let mut labels = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != sep {
            return Err(SwError::MatrixParse {
                msg: "separator missing from line",
                line: line_no,
            });
        }
        if i + 1 >= bytes.len() {
            return Err(SwError::MatrixParse {
                msg: "too few column headings",
                line: line_no,
            });
        }
        labels.push(fold(bytes[i + 1], case_sensitive));
        i += 2;
    }
    Ok(labels)
}

fn parse_whitespace_row(
    line: &str,
    labels: &[u8],
    line_no: usize,
    scoring: &mut Scoring,
) -> SwResult<()> {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(());
    };
    if first.starts_with('#') {
        return Ok(());
    }
    if first.len() != 1 {
        return Err(SwError::MatrixParse {
            msg: "expected whitespace between elements",
            line: line_no,
        });
    }
    let from = fold(first.as_bytes()[0], scoring.case_sensitive);

    for &to in labels {
        let Some(token) = tokens.next() else {
            return Err(SwError::MatrixParse {
                msg: "missing number value on line",
                line: line_no,
            });
        };
        let score: i32 = token.parse().map_err(|_| SwError::MatrixParse {
            msg: "missing number value on line",
            line: line_no,
        })?;
        scoring.add_mutation(from, to, score)?;
    }
    if tokens.next().is_some() {
        return Err(SwError::MatrixParse {
            msg: "too many columns on row",
            line: line_no,
        });
    }
    Ok(())
}

fn parse_separator_row(
    line: &str,
    sep: u8,
    labels: &[u8],
    line_no: usize,
    scoring: &mut Scoring,
) -> SwResult<()> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }
    let bytes = line.as_bytes();
    let from = fold(bytes[0], scoring.case_sensitive);

    let mut pos = 1;
    let mut col = 0;
    while pos < bytes.len() {
        if bytes[pos] != sep {
            return Err(SwError::MatrixParse {
                msg: "separator missing from line",
                line: line_no,
            });
        }
        pos += 1;
        let start = pos;
        while pos < bytes.len() && bytes[pos] != sep {
            pos += 1;
        }
        let score: i32 = std::str::from_utf8(&bytes[start..pos])
            .ok()
            .and_then(|token| token.parse().ok())
            .ok_or(SwError::MatrixParse {
                msg: "missing number value on line",
                line: line_no,
            })?;
        if col >= labels.len() {
            return Err(SwError::MatrixParse {
                msg: "too many columns on row",
                line: line_no,
            });
        }
        scoring.add_mutation(from, labels[col], score)?;
        col += 1;
    }
    if col < labels.len() {
        return Err(SwError::MatrixParse {
            msg: "missing number value on line",
            line: line_no,
        });
    }
    Ok(())
}
