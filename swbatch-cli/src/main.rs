use std::io::{BufRead, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::Parser;

use swbatch_core::align::BatchAligner;
use swbatch_core::error::{SwError, SwResult};
use swbatch_core::io::{open_records, seq_records, stdin_reader, SeqRecords};
use swbatch_core::schedule::{align_stream, ResultSink};
use swbatch_core::scoring::{load_matrix_from_path, Scoring};
use swbatch_core::seq::SeqRecord;

/// Smith-Waterman optimal local alignment (maximises score) of one query
/// sequence against every entry of a database, batched across SIMD lanes and
/// worker threads.
#[derive(Parser, Debug)]
#[command(name = "sw", version, about)]
struct Cli {
    /// Query file and database file (FASTA/FASTQ, optionally gzipped)
    #[arg(long, num_args = 2, value_names = ["QUERY", "DB"])]
    files: Option<Vec<PathBuf>>,

    /// Single file: the first record is the query, the rest the database
    #[arg(long, conflicts_with = "files")]
    file: Option<PathBuf>,

    /// Read from standard input (same as --file -)
    #[arg(long, conflicts_with_all = ["files", "file"])]
    stdin: bool,

    /// Case sensitive character comparison
    #[arg(long = "case_sensitive")]
    case_sensitive: bool,

    /// Score for a matching character pair [default: 2]
    #[arg(long = "match", value_name = "SCORE", allow_hyphen_values = true)]
    match_score: Option<i16>,

    /// Penalty for a mismatching character pair [default: -2]
    #[arg(long, value_name = "SCORE", allow_hyphen_values = true)]
    mismatch: Option<i16>,

    /// Penalty for opening a gap [default: -2]
    #[arg(long = "gapopen", value_name = "SCORE", allow_hyphen_values = true)]
    gap_open: Option<i16>,

    /// Penalty for extending a gap [default: -1]
    #[arg(long = "gapextend", value_name = "SCORE", allow_hyphen_values = true)]
    gap_extend: Option<i16>,

    /// Substitution matrix file, whitespace or single-character separated
    #[arg(long = "substitution_matrix", value_name = "FILE")]
    substitution_matrix: Option<PathBuf>,

    /// Suppress entries scoring below this value
    #[arg(long, value_name = "SCORE", allow_hyphen_values = true)]
    minscore: Option<i32>,

    /// Print database sequences alongside their scores
    #[arg(long)]
    printseq: bool,

    /// Print fasta header lines alongside scores
    #[arg(long)]
    printfasta: bool,

    /// Print dynamic programming matrices (no effect: the row-strip engine
    /// retains no matrices)
    #[arg(long)]
    printmatrices: bool,

    /// Print with a descriptor line (no effect without traceback output)
    #[arg(long)]
    pretty: bool,

    /// Print with colour (no effect without traceback output)
    #[arg(long)]
    colour: bool,
}

/// Streams batch results to stdout: per entry an optional id line, an
/// optional sequence line and `score: <n>`, with `==` between batches.
struct PrintSink {
    out: BufWriter<Stdout>,
    print_seq: bool,
    print_fasta: bool,
    min_score: Option<i32>,
}

impl ResultSink for PrintSink {
    fn on_batch(&mut self, aligner: &BatchAligner, _base_index: usize) -> SwResult<()> {
        let Some(batch) = aligner.batch() else {
            return Ok(());
        };
        for (lane, &score) in aligner.lane_scores().iter().enumerate() {
            if self.min_score.is_some_and(|min| score < min) {
                continue;
            }
            if self.print_fasta {
                writeln!(self.out, "{}", batch.name(lane))?;
            }
            if self.print_seq {
                self.out.write_all(batch.seq(lane))?;
                writeln!(self.out)?;
            }
            writeln!(self.out, "score: {score}")?;
        }
        writeln!(self.out, "==")?;
        Ok(())
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut scoring = Scoring::default();
    scoring.case_sensitive = cli.case_sensitive;
    if let Some(score) = cli.match_score {
        scoring.match_score = score;
    }
    if let Some(score) = cli.mismatch {
        scoring.mismatch_score = score;
    }
    if let Some(score) = cli.gap_open {
        scoring.gap_open = score;
    }
    if let Some(score) = cli.gap_extend {
        scoring.gap_extend = score;
    }

    if let Some(path) = &cli.substitution_matrix {
        load_matrix_from_path(path, &mut scoring)
            .with_context(|| format!("loading substitution matrix {}", path.display()))?;
        // A matrix without an explicit --match overrides the defaults entirely
        if cli.match_score.is_none() {
            scoring.use_match_mismatch = false;
        }
    }
    if scoring.use_match_mismatch && scoring.match_score < scoring.mismatch_score {
        bail!("match score should not be less than the mismatch penalty");
    }

    if cli.pretty || cli.colour {
        log::warn!("--pretty/--colour have no effect: aligned strings are not reconstructed");
    }
    if cli.printmatrices {
        log::warn!("--printmatrices has no effect: the row-strip engine retains no matrices");
    }

    let (query, db) = open_inputs(&cli)?;
    log::debug!("query '{}' ({} residues)", query.id(), query.len());

    let mut sink = PrintSink {
        out: BufWriter::new(std::io::stdout()),
        print_seq: cli.printseq,
        print_fasta: cli.printfasta,
        min_score: cli.minscore,
    };

    let total = align_stream(query, db, &mut scoring, &mut sink, None)?;
    sink.out.flush()?;
    log::info!("aligned {total} database entries");
    Ok(())
}

type DbRecords = SeqRecords<Box<dyn BufRead>>;

fn open_inputs(cli: &Cli) -> anyhow::Result<(SeqRecord, DbRecords)> {
    if let Some(paths) = &cli.files {
        let mut query_records = open_records(&paths[0])
            .with_context(|| format!("opening query file {}", paths[0].display()))?;
        let query = first_record(&mut query_records, &paths[0])?;
        let db = open_records(&paths[1])
            .with_context(|| format!("opening database file {}", paths[1].display()))?;
        return Ok((query, db));
    }
    if let Some(path) = &cli.file {
        let mut records =
            open_records(path).with_context(|| format!("opening {}", path.display()))?;
        let query = first_record(&mut records, path)?;
        return Ok((query, records));
    }
    if cli.stdin {
        let mut records = seq_records(stdin_reader()).context("reading standard input")?;
        let query = first_record(&mut records, Path::new("-"))?;
        return Ok((query, records));
    }
    bail!("no input specified (use --files, --file or --stdin)");
}

fn first_record(records: &mut DbRecords, path: &Path) -> anyhow::Result<SeqRecord> {
    match records.next() {
        Some(record) => Ok(record?),
        None => Err(SwError::FileEmpty {
            path: path.to_path_buf(),
        }
        .into()),
    }
}
