/// Parallel mutable for-each: apply `$f` to each element of `$slice` in place.
macro_rules! par_for_each_mut {
    ($slice:expr, $f:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
            $slice.par_iter_mut().for_each($f);
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter_mut().for_each($f);
        }
    }};
}

/// Worker count the scheduler sizes its dispatch groups for.
pub(crate) fn current_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}
