//! Keyed async tasks
//!
//! Every network call of the client runs as a task registered under a key:
//!
//! - spawning under a key that is already running aborts the old task, so a
//!   superseded request never reports back
//! - `debounce` delays the work; re-debouncing the same key restarts the
//!   delay, so only the last of a burst of calls runs
//! - `cancel` aborts a key without replacement
//!
//! ```ignore
//! tasks.debounce("city_search", Duration::from_millis(300), async move {
//!     match client.search_cities(&query).await {
//!         Ok(results) => Action::LookupDidLoad { query, results },
//!         Err(e) => Action::LookupDidError { query, error: e.to_string() },
//!     }
//! });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::Action;

/// Identifies a task for cancellation and replacement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Manages async task lifecycle with automatic cancellation.
///
/// Finished tasks keep their entry until the key is reused or cancelled;
/// [`is_running`](Self::is_running) checks the handle, not the map.
pub struct TaskManager<A> {
    tasks: HashMap<TaskKey, AbortHandle>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> TaskManager<A>
where
    A: Action,
{
    /// Results of finished tasks are sent on `action_tx`.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            tasks: HashMap::new(),
            action_tx,
        }
    }

    /// Spawn a task, aborting any existing task with the same key.
    ///
    /// The action produced by `future` is sent to the action channel. An
    /// aborted task sends nothing.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        self.spawn_after(key.into(), None, future)
    }

    /// Spawn a task that starts after `duration` of quiescence.
    ///
    /// Calling again with the same key before the delay has elapsed aborts
    /// the pending task and restarts the delay. Once the delay elapsed the
    /// task is an ordinary keyed task: a later call still aborts it.
    pub fn debounce<F>(
        &mut self,
        key: impl Into<TaskKey>,
        duration: Duration,
        future: F,
    ) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        self.spawn_after(key.into(), Some(duration), future)
    }

    fn spawn_after<F>(&mut self, key: TaskKey, delay: Option<Duration>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        self.cancel(&key);

        let tx = self.action_tx.clone();
        let handle = tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let action = future.await;
            let _ = tx.send(action);
        });

        tracing::trace!(task = key.name(), debounced = delay.is_some(), "Task spawned");
        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Cancel a task by key. Unknown keys are a no-op.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            if !handle.is_finished() {
                tracing::trace!(task = key.name(), "Task aborted");
            }
            handle.abort();
        }
    }

    /// Cancel all running tasks.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Whether a task under `key` exists and has not finished yet.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks
            .get(key)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<A> Drop for TaskManager<A> {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Searched(String),
        Done(usize),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Searched(_) => "Searched",
                TestAction::Done(_) => "Done",
            }
        }
    }

    fn search(
        requests: &Arc<AtomicUsize>,
        query: &str,
    ) -> impl Future<Output = TestAction> + Send + 'static {
        let requests = requests.clone();
        let query = query.to_string();
        async move {
            requests.fetch_add(1, Ordering::SeqCst);
            TestAction::Searched(query)
        }
    }

    #[test]
    fn test_task_key() {
        let k1 = TaskKey::new("weather");
        let k2: TaskKey = "weather".into();
        let k3 = TaskKey::from(String::from("weather"));

        assert_eq!(k1, k2);
        assert_eq!(k2, k3);
        assert_eq!(k1.name(), "weather");
    }

    #[tokio::test]
    async fn test_spawn_sends_action() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.spawn("weather", async { TestAction::Done(42) });

        let action = tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");

        assert_eq!(action, TestAction::Done(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_aborts_superseded_request() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.spawn("weather", async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            TestAction::Done(1)
        });
        tasks.spawn("weather", async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            TestAction::Done(2)
        });

        assert_eq!(rx.recv().await, Some(TestAction::Done(2)));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err(), "stale result must not arrive");
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_waits_for_quiescence() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);
        let requests = Arc::new(AtomicUsize::new(0));

        tasks.debounce("search", Duration::from_millis(300), search(&requests, "be"));

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(requests.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(TestAction::Searched("be".into())));
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_sends_only_final_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);
        let requests = Arc::new(AtomicUsize::new(0));

        for query in ["be", "ber", "berl", "berli", "berlin"] {
            tasks.debounce("search", Duration::from_millis(300), search(&requests, query));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        let action = rx.recv().await;
        assert_eq!(action, Some(TestAction::Searched("berlin".into())));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_debounce() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);
        let requests = Arc::new(AtomicUsize::new(0));

        tasks.debounce("search", Duration::from_millis(300), search(&requests, "be"));
        assert!(tasks.is_running(&TaskKey::new("search")));

        tasks.cancel(&TaskKey::new("search"));
        assert!(!tasks.is_running(&TaskKey::new("search")));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        for key in ["card:moscow", "card:paris", "card:rome"] {
            tasks.spawn(key, async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                TestAction::Done(0)
            });
        }
        assert_eq!(tasks.len(), 3);

        tasks.cancel_all();
        assert!(tasks.is_empty());
    }
}
