//! Indexing lifecycle notifications

/// Listener for indexing lifecycle events.
///
/// Observers are registered on the index and invoked synchronously at the
/// points below. They are the only channel through which per-item progress
/// and per-item failures are surfaced; the writer does not return errors for
/// individual items inside bulk operations.
pub trait IndexingObserver: Send + Sync {
    /// An item was added (or re-added) to the index
    fn item_indexed(&self, _id: i64, _category: &str) {}

    /// An item was deleted from the index
    fn item_deleted(&self, _id: i64) {}

    /// An item was excluded by the category inclusion rules. Not an error.
    fn item_ignored(&self, _id: i64, _category: &str) {}

    /// Indexing failed for one item, or for a whole operation when `id` is
    /// `None`
    fn indexing_error(&self, _id: Option<i64>, _message: &str) {}

    /// A bulk operation is about to start
    fn batch_started(&self, _expected: usize) {}

    /// A bulk operation finished; `indexed` counts the items actually added
    fn batch_completed(&self, _indexed: usize) {}
}

/// Observer that collects event counts, mainly for tests and smoke checks
#[derive(Debug, Default)]
pub struct CountingObserver {
    pub indexed: std::sync::atomic::AtomicUsize,
    pub deleted: std::sync::atomic::AtomicUsize,
    pub ignored: std::sync::atomic::AtomicUsize,
    pub errors: std::sync::atomic::AtomicUsize,
}

impl IndexingObserver for CountingObserver {
    fn item_indexed(&self, _id: i64, _category: &str) {
        self.indexed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn item_deleted(&self, _id: i64) {
        self.deleted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn item_ignored(&self, _id: i64, _category: &str) {
        self.ignored.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn indexing_error(&self, _id: Option<i64>, _message: &str) {
        self.errors.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_counting_observer() {
        let observer = CountingObserver::default();
        observer.item_indexed(1, "content");
        observer.item_indexed(2, "content");
        observer.item_ignored(3, "media");
        observer.indexing_error(Some(4), "boom");

        assert_eq!(observer.indexed.load(Ordering::SeqCst), 2);
        assert_eq!(observer.ignored.load(Ordering::SeqCst), 1);
        assert_eq!(observer.errors.load(Ordering::SeqCst), 1);
        assert_eq!(observer.deleted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_impls_are_noops() {
        struct Silent;
        impl IndexingObserver for Silent {}

        let s = Silent;
        s.item_indexed(1, "content");
        s.batch_started(10);
        s.batch_completed(10);
    }
}
