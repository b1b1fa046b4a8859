use std::io::BufRead;

use crate::error::{SwError, SwResult};
use crate::seq::SeqRecord;

/// Streaming FASTQ reader: four-line records, quality data validated for
/// length and then discarded since only the sequence feeds the aligner.
pub struct FastqRecords<R> {
    reader: R,
    line_no: usize,
    buf_line: String,
}

impl<R: BufRead> FastqRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf_line: String::new(),
        }
    }

    fn next_nonempty_line(&mut self) -> Option<SwResult<(String, usize)>> {
        loop {
            let (line, line_no) = match self.next_line() {
                Some(Ok(value)) => value,
                Some(Err(err)) => return Some(Err(err)),
                None => return None,
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(Ok((line, line_no)));
        }
    }

    fn next_line(&mut self) -> Option<SwResult<(String, usize)>> {
        self.buf_line.clear();
        match self.reader.read_line(&mut self.buf_line) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let line_no = self.line_no;
                Some(Ok((std::mem::take(&mut self.buf_line), line_no)))
            }
            Err(err) => Some(Err(SwError::Io(err))),
        }
    }

    fn read_required_line(&mut self, msg: &'static str, line: usize) -> SwResult<(String, usize)> {
        match self.next_line() {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(err),
            None => Err(SwError::FastqFormat { msg, line }),
        }
    }
}

impl<R: BufRead> Iterator for FastqRecords<R> {
    type Item = SwResult<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let (header_line, header_line_no) = match self.next_nonempty_line()? {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        };

        if !header_line.starts_with('@') {
            return Some(Err(SwError::FastqFormat {
                msg: "expected header line starting with '@'",
                line: header_line_no,
            }));
        }

        let (id, desc) = match parse_header(&header_line, header_line_no) {
            Ok(parsed) => parsed,
            Err(err) => return Some(Err(err)),
        };

        let (seq_line, seq_line_no) = match self
            .read_required_line("missing sequence line", header_line_no.saturating_add(1))
        {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        };

        let (plus_line, plus_line_no) = match self
            .read_required_line("missing '+' separator line", seq_line_no.saturating_add(1))
        {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        };

        if !plus_line.starts_with('+') {
            return Some(Err(SwError::FastqFormat {
                msg: "expected '+' separator line",
                line: plus_line_no,
            }));
        }

        let (qual_line, qual_line_no) =
            match self.read_required_line("missing quality line", plus_line_no.saturating_add(1)) {
                Ok(value) => value,
                Err(err) => return Some(Err(err)),
            };

        let seq_bytes = trim_eol(&seq_line).as_bytes().to_vec();
        if seq_bytes.len() != trim_eol(&qual_line).len() {
            return Some(Err(SwError::FastqFormat {
                msg: "sequence and quality lengths differ",
                line: qual_line_no,
            }));
        }

        let record = match desc {
            Some(desc) => SeqRecord::new(id, seq_bytes).with_desc(desc),
            None => SeqRecord::new(id, seq_bytes),
        };
        Some(Ok(record))
    }
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(&['\n', '\r'][..])
}

fn parse_header(header_line: &str, line_no: usize) -> SwResult<(Box<str>, Option<Box<str>>)> {
    let header = header_line.strip_prefix('@').ok_or(SwError::FastqFormat {
        msg: "expected header line starting with '@'",
        line: line_no,
    })?;

    let header = trim_eol(header).trim_start();
    if header.is_empty() {
        return Err(SwError::FastqFormat {
            msg: "empty header",
            line: line_no,
        });
    }

    let (id, desc) = match header.find(|c: char| c.is_whitespace()) {
        Some(idx) => {
            let id = &header[..idx];
            let desc = header[idx..].trim();
            let desc = if desc.is_empty() { None } else { Some(desc) };
            (id, desc)
        }
        None => (header, None),
    };

    Ok((id.into(), desc.map(|s| s.into())))
}
