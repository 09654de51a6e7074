//! Worker-count policy
//!
//! A fixed threshold heuristic: parallel worker startup carries fixed
//! overhead (process spawn, duplicated fixture setup), so small suites run
//! on a single worker and only suites larger than twice the worker pool
//! amortize the cost of going parallel.

/// Decide the worker count for a suite of `test_count` tests.
///
/// Pure total function. Returns `max_workers` only when the suite is
/// strictly larger than `threshold`; everything else, including an empty
/// suite, runs on one worker. An unknown count never reaches this function:
/// collection failure aborts the invocation first.
pub fn select_workers(test_count: usize, max_workers: usize, threshold: usize) -> usize {
    if test_count > threshold {
        max_workers
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_WORKERS: usize = 12;
    const THRESHOLD: usize = 24;

    #[test]
    fn test_small_suite_runs_sequentially() {
        assert_eq!(select_workers(5, MAX_WORKERS, THRESHOLD), 1);
    }

    #[test]
    fn test_large_suite_runs_parallel() {
        assert_eq!(select_workers(30, MAX_WORKERS, THRESHOLD), 12);
    }

    #[test]
    fn test_empty_suite_gets_one_worker() {
        assert_eq!(select_workers(0, MAX_WORKERS, THRESHOLD), 1);
    }

    #[test]
    fn test_boundary_is_strict_greater_than() {
        assert_eq!(select_workers(THRESHOLD, MAX_WORKERS, THRESHOLD), 1);
        assert_eq!(select_workers(THRESHOLD + 1, MAX_WORKERS, THRESHOLD), MAX_WORKERS);
    }

    #[test]
    fn test_idempotent() {
        for count in [0, 1, 24, 25, 1000] {
            let first = select_workers(count, MAX_WORKERS, THRESHOLD);
            let second = select_workers(count, MAX_WORKERS, THRESHOLD);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_respects_custom_limits() {
        assert_eq!(select_workers(9, 4, 8), 4);
        assert_eq!(select_workers(8, 4, 8), 1);
    }
}
