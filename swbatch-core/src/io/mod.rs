pub mod detect;
pub mod fasta;
pub mod fastq;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::{SwError, SwResult};
use crate::seq::SeqRecord;
use detect::{detect_format, is_gzip, SeqFormat};
use fasta::FastaRecords;
use fastq::FastqRecords;

/// Streaming records in whichever format the input turned out to be.
pub enum SeqRecords<R: BufRead> {
    Fasta(FastaRecords<R>),
    Fastq(FastqRecords<R>),
}

impl<R: BufRead> Iterator for SeqRecords<R> {
    type Item = SwResult<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SeqRecords::Fasta(records) => records.next(),
            SeqRecords::Fastq(records) => records.next(),
        }
    }
}

/// Wrap `reader` in a record iterator, sniffing the format from the first
/// significant byte. Empty input yields an empty iterator.
pub fn seq_records<R: BufRead>(mut reader: R) -> SwResult<SeqRecords<R>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(SeqRecords::Fasta(FastaRecords::new(reader)));
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                return match detect_format(buf[pos]) {
                    Some(SeqFormat::Fasta) => Ok(SeqRecords::Fasta(FastaRecords::new(reader))),
                    Some(SeqFormat::Fastq) => Ok(SeqRecords::Fastq(FastqRecords::new(reader))),
                    None => Err(SwError::UnknownFormat),
                };
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Open a path as a buffered reader, decompressing transparently when the
/// gzip magic is present. `-` reads standard input (no gzip there).
pub fn open_reader(path: impl AsRef<Path>) -> SwResult<Box<dyn BufRead>> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        return Ok(stdin_reader());
    }
    let mut reader = BufReader::new(File::open(path)?);
    if is_gzip(reader.fill_buf()?) {
        Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

pub fn stdin_reader() -> Box<dyn BufRead> {
    Box::new(BufReader::new(io::stdin()))
}

/// Open a path as a streaming record iterator (format- and gzip-sniffed).
pub fn open_records(path: impl AsRef<Path>) -> SwResult<SeqRecords<Box<dyn BufRead>>> {
    seq_records(open_reader(path)?)
}

/// Collect every record of a reader; mainly a test convenience.
pub fn read_records<R: BufRead>(reader: R) -> SwResult<Vec<SeqRecord>> {
    seq_records(reader)?.collect()
}
