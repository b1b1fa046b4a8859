//! Streams database records into lane batches and dispatches batch groups
//! across worker threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::align::encode::encode_query;
use crate::align::state::{BatchAligner, LaneBatch};
use crate::align::LANES;
use crate::error::{SwError, SwResult};
use crate::par::current_threads;
use crate::scoring::Scoring;
use crate::seq::SeqRecord;

/// Batches buffered per dispatch group, per worker thread. Trades memory for
/// scheduling amortization.
pub const BATCH_FACTOR: usize = 64;

/// Receives each completed batch, in submission order.
///
/// The sink may read lane scores, names and sequences for the duration of the
/// call; batch data is released afterwards and must not be retained.
pub trait ResultSink {
    fn on_batch(&mut self, aligner: &BatchAligner, base_index: usize) -> SwResult<()>;
}

/// Align `query` against every record of `db`, delivering per-batch results
/// to `sink` in stream order. Returns the number of database entries aligned.
///
/// Database entries stream into batches of [`LANES`]; up to
/// `threads * BATCH_FACTOR` batches are buffered, filled in parallel, then
/// reported in order. Zero-length entries are skipped with a warning. When
/// `shutdown` flips true the stream drains gracefully: buffered work is
/// finished and reported, nothing further is read.
pub fn align_stream<I, S>(
    query: SeqRecord,
    db: I,
    scoring: &mut Scoring,
    sink: &mut S,
    shutdown: Option<&AtomicBool>,
) -> SwResult<usize>
where
    I: IntoIterator<Item = SwResult<SeqRecord>>,
    S: ResultSink,
{
    if query.is_empty() {
        return Err(SwError::EmptySequence { id: query.id });
    }

    scoring.fill_unset();
    let scoring: &Scoring = scoring;

    let query_idx: Arc<[u8]> = encode_query(&query.seq, scoring).into();
    let query_name: Arc<str> = Arc::from(query.id);
    let query_seq: Arc<[u8]> = query.seq.into();

    let group_cap = current_threads() * BATCH_FACTOR;
    let mut states: Vec<BatchAligner> = Vec::new();
    let mut loaded = 0usize;
    let mut pending: Vec<SeqRecord> = Vec::with_capacity(LANES);
    let mut total = 0usize;

    let mut load_batch = |states: &mut Vec<BatchAligner>, loaded: &mut usize, batch: LaneBatch| {
        if states.len() == *loaded {
            states.push(BatchAligner::new(
                Arc::clone(&query_name),
                Arc::clone(&query_seq),
                Arc::clone(&query_idx),
            ));
        }
        states[*loaded].load(batch);
        *loaded += 1;
    };

    for record in db {
        if shutdown.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            log::debug!("shutdown requested, draining {loaded} buffered batches");
            break;
        }

        let record = record?;
        if record.is_empty() {
            log::warn!("skipping empty database entry '{}'", record.id());
            continue;
        }
        pending.push(record);
        total += 1;

        if pending.len() == LANES {
            let records = std::mem::replace(&mut pending, Vec::with_capacity(LANES));
            let base_index = total - LANES;
            load_batch(&mut states, &mut loaded, LaneBatch::from_records(records, base_index));

            if loaded == group_cap {
                run_group(&mut states[..loaded], scoring, sink)?;
                loaded = 0;
            }
        }
    }

    if !pending.is_empty() {
        let base_index = total - pending.len();
        let records = std::mem::take(&mut pending);
        load_batch(&mut states, &mut loaded, LaneBatch::from_records(records, base_index));
    }
    run_group(&mut states[..loaded], scoring, sink)?;

    Ok(total)
}

/// Fill every loaded state in parallel, then report them in order and release
/// their batch data. Workers own their state exclusively during a fill; the
/// scoring table is shared read-only.
fn run_group<S: ResultSink>(
    states: &mut [BatchAligner],
    scoring: &Scoring,
    sink: &mut S,
) -> SwResult<()> {
    if states.is_empty() {
        return Ok(());
    }
    log::debug!("dispatching group of {} batches", states.len());

    par_for_each_mut!(states, |state| state.fill(scoring));

    for state in states.iter_mut() {
        let base_index = state.batch().map_or(0, LaneBatch::base_index);
        sink.on_batch(state, base_index)?;
        state.release_batch();
    }
    Ok(())
}
