//! Delete-call batching.
//!
//! A batch is an ordered, size-bounded group of identifiers assembled purely
//! to rate-limit delete calls; it has no identity beyond the call it is used
//! in.

/// Batch size used when a job's configured size is zero.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Split `items` into delete batches of at most `size` elements each,
/// preserving the input order. A zero size falls back to
/// [`DEFAULT_BATCH_SIZE`].
pub fn split<T>(items: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    let size = if size == 0 { DEFAULT_BATCH_SIZE } else { size };
    items.chunks(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("ins-{i}")).collect()
    }

    #[test]
    fn produces_ceil_m_over_b_batches() {
        let items = ids(250);
        let batches: Vec<_> = split(&items, 100).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 100);
        assert_eq!(batches[1].len(), 100);
        assert_eq!(batches[2].len(), 50);
    }

    #[test]
    fn exact_multiple_has_no_trailing_batch() {
        let items = ids(200);
        assert_eq!(split(&items, 100).count(), 2);
    }

    #[test]
    fn preserves_input_order() {
        let items = ids(7);
        let flattened: Vec<_> = split(&items, 3).flatten().cloned().collect();
        assert_eq!(flattened, items);
    }

    #[test]
    fn zero_size_falls_back_to_default() {
        let items = ids(150);
        let batches: Vec<_> = split(&items, 0).collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        let items: Vec<String> = vec![];
        assert_eq!(split(&items, 100).count(), 0);
    }
}
