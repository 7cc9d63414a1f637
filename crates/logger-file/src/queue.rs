//! Pending line queue shared between log callers and the drain loop

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// FIFO of formatted lines waiting to be persisted.
///
/// Producers call [`LineQueue::enqueue`] from any thread; the drain loop is
/// the only consumer. The lock is held for push/pop bookkeeping only, so an
/// enqueue arriving mid-drain is never lost or reordered.
#[derive(Clone, Debug, Default)]
pub struct LineQueue {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LineQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the tail
    pub fn enqueue(&self, line: impl Into<String>) {
        self.lines.lock().push_back(line.into());
    }

    /// Remove up to `max` lines from the head, oldest first
    #[must_use]
    pub fn drain_batch(&self, max: usize) -> Vec<String> {
        let mut lines = self.lines.lock();
        let count = max.min(lines.len());
        lines.drain(..count).collect()
    }

    /// Put unwritten lines back at the head, keeping their order
    pub fn requeue_front(&self, unwritten: Vec<String>) {
        if unwritten.is_empty() {
            return;
        }

        let mut lines = self.lines.lock();
        for line in unwritten.into_iter().rev() {
            lines.push_front(line);
        }
    }

    /// Number of pending lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_batch_respects_cap_and_order() {
        let queue = LineQueue::new();
        for i in 0..5 {
            queue.enqueue(format!("line {i}"));
        }

        let batch = queue.drain_batch(3);
        assert_eq!(batch, vec!["line 0", "line 1", "line 2"]);
        assert_eq!(queue.len(), 2);

        let rest = queue.drain_batch(3);
        assert_eq!(rest, vec!["line 3", "line 4"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_empty_queue() {
        let queue = LineQueue::new();
        assert!(queue.drain_batch(50).is_empty());
    }

    #[test]
    fn test_requeue_front_restores_head() {
        let queue = LineQueue::new();
        queue.enqueue("a");
        queue.enqueue("b");
        queue.enqueue("c");

        let batch = queue.drain_batch(2);
        queue.enqueue("d");
        queue.requeue_front(batch);

        assert_eq!(queue.drain_batch(10), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_concurrent_enqueue_during_drain() {
        let queue = LineQueue::new();
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        queue.enqueue(format!("{p}-{i}"));
                    }
                })
            })
            .collect();

        let mut drained = Vec::new();
        while drained.len() < 1000 {
            drained.extend(queue.drain_batch(50));
            std::thread::yield_now();
        }

        for producer in producers {
            producer.join().unwrap();
        }

        assert_eq!(drained.len(), 1000);
        assert!(queue.is_empty());

        // Per-producer order is preserved
        for p in 0..4 {
            let prefix = format!("{p}-");
            let seen: Vec<usize> = drained
                .iter()
                .filter_map(|l| l.strip_prefix(&prefix))
                .map(|i| i.parse().unwrap())
                .collect();
            assert_eq!(seen, (0..250).collect::<Vec<_>>());
        }
    }
}
