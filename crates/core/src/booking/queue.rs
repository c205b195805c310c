//! Shared work queue of booking preferences.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::types::Preference;

/// Concurrency-safe FIFO hand-out of preferences.
///
/// Seeded once, in priority order, before any worker starts. Each
/// preference is handed to at most one caller, and there is deliberately no
/// way to put one back: a preference that failed is abandoned for the rest
/// of the run.
#[derive(Debug)]
pub struct WorkQueue {
    inner: Mutex<VecDeque<Preference>>,
}

impl WorkQueue {
    /// Seed the queue with preferences in attempt order.
    pub fn seed(preferences: Vec<Preference>) -> Self {
        Self {
            inner: Mutex::new(preferences.into()),
        }
    }

    /// Take the next preference, or `None` when the queue is drained.
    ///
    /// Never blocks beyond the internal lock; the lock is held only for the
    /// pop itself.
    pub fn try_take(&self) -> Option<Preference> {
        self.inner.lock().expect("work queue lock poisoned").pop_front()
    }

    /// Preferences not yet handed out.
    pub fn remaining(&self) -> usize {
        self.inner.lock().expect("work queue lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::booking::types::Transport;

    fn prefs(n: u32) -> Vec<Preference> {
        (1..=n)
            .map(|priority| Preference {
                priority,
                time: format!("8:{:02}", priority),
                hole: 1,
                holes_to_play: 18,
                transport: Transport::Cart,
            })
            .collect()
    }

    #[test]
    fn test_hand_out_preserves_seed_order() {
        let queue = WorkQueue::seed(prefs(3));
        assert_eq!(queue.remaining(), 3);
        assert_eq!(queue.try_take().unwrap().priority, 1);
        assert_eq!(queue.try_take().unwrap().priority, 2);
        assert_eq!(queue.try_take().unwrap().priority, 3);
        assert!(queue.try_take().is_none());
    }

    #[test]
    fn test_empty_queue_returns_none_immediately() {
        let queue = WorkQueue::seed(Vec::new());
        assert!(queue.try_take().is_none());
        assert_eq!(queue.remaining(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_takers_get_each_preference_exactly_once() {
        let seeded = 100u32;
        let queue = Arc::new(WorkQueue::seed(prefs(seeded)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                let mut taken = Vec::new();
                while let Some(pref) = queue.try_take() {
                    taken.push(pref.priority);
                    tokio::task::yield_now().await;
                }
                taken
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }

        let unique: HashSet<u32> = all.iter().copied().collect();
        assert_eq!(all.len(), seeded as usize, "no preference lost");
        assert_eq!(unique.len(), seeded as usize, "no preference duplicated");
    }
}
