//! Keyed interval subscriptions
//!
//! Subscriptions are long-lived sources of actions: the spinner tick, the
//! weather panel's polling timer, the card strip's refresh timer. Each is
//! registered under a key; registering the same key again replaces the old
//! timer, which is how a polling period is restarted after the selected city
//! changes.
//!
//! ```ignore
//! subs.interval("strip_refresh", Duration::from_secs(300), || Action::StripFetchAll);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::Action;

/// Identifies a subscription for cancellation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubKey(String);

impl SubKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for SubKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SubKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Manages subscriptions that emit actions on a fixed period.
pub struct Subscriptions<A> {
    handles: HashMap<SubKey, JoinHandle<()>>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> Subscriptions<A>
where
    A: Action,
{
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            handles: HashMap::new(),
            action_tx,
        }
    }

    /// Emit `action_fn()` every `period`, first emission one period from now.
    ///
    /// An existing subscription with the same key is cancelled first, so
    /// calling this again restarts the period. A period too long for the
    /// clock to represent registers nothing.
    pub fn interval<F>(&mut self, key: impl Into<SubKey>, period: Duration, action_fn: F) -> &mut Self
    where
        F: Fn() -> A + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let now = tokio::time::Instant::now();
        let Some(start) = now
            .checked_add(period)
            .filter(|start| start.checked_add(period).is_some())
        else {
            tracing::warn!(
                subscription = %key.name(),
                ?period,
                "Interval out of range, not scheduled"
            );
            return self;
        };

        let tx = self.action_tx.clone();
        let name = key.name().to_string();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            // Missed ticks collapse into one.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if tx.send(action_fn()).is_err() {
                    tracing::debug!(subscription = %name, "Action channel closed");
                    break;
                }
            }
        });

        self.handles.insert(key, handle);
        self
    }

    /// Cancel a subscription by key. Unknown keys are a no-op.
    pub fn cancel(&mut self, key: &SubKey) {
        if let Some(handle) = self.handles.remove(key) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }

    pub fn is_active(&self, key: &SubKey) -> bool {
        self.handles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<A> Drop for Subscriptions<A> {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Refresh(u8),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            "Refresh"
        }
    }

    #[test]
    fn test_sub_key() {
        let k1 = SubKey::new("weather_refresh");
        let k2: SubKey = "weather_refresh".into();

        assert_eq!(k1, k2);
        assert_eq!(k1.name(), "weather_refresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_skips_immediate_tick() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut subs = Subscriptions::new(tx);

        subs.interval("weather_refresh", Duration::from_secs(120), || {
            TestAction::Refresh(1)
        });

        tokio::time::sleep(Duration::from_secs(119)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.try_recv(), Ok(TestAction::Refresh(1)));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(rx.try_recv(), Ok(TestAction::Refresh(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_rearm_restarts_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut subs = Subscriptions::new(tx);

        subs.interval("weather_refresh", Duration::from_secs(120), || {
            TestAction::Refresh(1)
        });
        tokio::time::sleep(Duration::from_secs(100)).await;

        subs.interval("weather_refresh", Duration::from_secs(120), || {
            TestAction::Refresh(2)
        });
        assert_eq!(subs.len(), 1);

        // The first deadline (t=120) passes silently.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(rx.try_recv(), Ok(TestAction::Refresh(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_period_is_not_scheduled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut subs = Subscriptions::new(tx);

        subs.interval("weather_refresh", Duration::from_secs(120), || {
            TestAction::Refresh(1)
        });
        subs.interval("weather_refresh", Duration::from_secs(u64::MAX), || {
            TestAction::Refresh(2)
        });

        // The old subscription is gone and the new one never started.
        assert!(subs.is_empty());
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_subscription() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut subs = Subscriptions::new(tx);

        subs.interval("strip_refresh", Duration::from_secs(300), || {
            TestAction::Refresh(0)
        });
        assert!(subs.is_active(&SubKey::new("strip_refresh")));

        subs.cancel(&SubKey::new("strip_refresh"));
        assert!(!subs.is_active(&SubKey::new("strip_refresh")));

        tokio::time::sleep(Duration::from_secs(900)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut subs = Subscriptions::new(tx);

        subs.interval("a", Duration::from_secs(10), || TestAction::Refresh(0));
        subs.interval("b", Duration::from_secs(10), || TestAction::Refresh(0));
        assert_eq!(subs.len(), 2);

        subs.cancel_all();
        assert!(subs.is_empty());
    }
}
