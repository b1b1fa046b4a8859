use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwError {
    #[error("illegal character '{ch}' at position {pos}")]
    IllegalCharacter { ch: char, pos: usize },

    #[error("substitution score {score} for '{a}'/'{b}' out of range [-127, 127]")]
    ScoreOutOfRange { a: char, b: char, score: i32 },

    #[error("substitution matrix error at line {line}: {msg}")]
    MatrixParse { msg: &'static str, line: usize },

    #[error("empty sequence: {id}")]
    EmptySequence { id: Box<str> },

    #[error("no sequences in {path}")]
    FileEmpty { path: PathBuf },

    #[error("unrecognised sequence format (expected '>' or '@' record start)")]
    UnknownFormat,

    #[error("fasta format error at line {line}: {msg}")]
    FastaFormat { msg: &'static str, line: usize },

    #[error("fastq format error at line {line}: {msg}")]
    FastqFormat { msg: &'static str, line: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type SwResult<T> = Result<T, SwError>;
