//! Last-known-state fan-out.
//!
//! The broadcaster owns the one shared payload. A refresh is persisted
//! first and only then fanned out to every subscriber, including the
//! sender. New subscribers are synced from the store.
//!
//! Concurrent refreshes from different clients are last-write-wins. Persist
//! and fan-out happen under one commit lock, so the order subscribers see
//! updates in is the order the store committed them and everyone converges
//! on the stored value. There is no causal ordering across clients.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::BoardResult;
use crate::event::ServerEvent;
use crate::store::PayloadStore;

/// Capacity of the fan-out channel. Subscribers that fall further behind
/// are resynced from the store.
pub const CHANNEL_CAPACITY: usize = 100;

/// Floating area visibility at startup.
pub const DEFAULT_FLOATING_AREA_VISIBLE: bool = false;

/// A live subscription handed to a newly connected client.
pub struct Subscription {
    /// Events for this subscriber only, to be delivered before anything
    /// from `receiver`.
    pub initial: Vec<ServerEvent>,
    pub receiver: broadcast::Receiver<ServerEvent>,
}

pub struct Broadcaster {
    store: Arc<dyn PayloadStore>,
    tx: broadcast::Sender<ServerEvent>,
    /// `None` when the floating area is not part of this display.
    floating_area: Option<AtomicBool>,
    commit: Mutex<()>,
}

impl Broadcaster {
    /// Create a broadcaster. When `floating_area` is true the floating
    /// area toggle is enabled and starts hidden.
    pub fn new(store: Arc<dyn PayloadStore>, floating_area: bool) -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            store,
            tx,
            floating_area: floating_area.then(|| AtomicBool::new(DEFAULT_FLOATING_AREA_VISIBLE)),
            commit: Mutex::new(()),
        }
    }

    /// Register a new subscriber.
    ///
    /// Subscribing and reading the store happen under the commit lock, so
    /// every update is either in the initial sync or in the receiver, never
    /// both.
    pub async fn connect(&self) -> Subscription {
        let _guard = self.commit.lock().await;
        let receiver = self.tx.subscribe();
        let initial = self.snapshot().await;
        debug!(subscribers = self.subscriber_count(), "Subscriber registered");
        Subscription { initial, receiver }
    }

    /// Bring a lagging subscriber back to the current state.
    ///
    /// The buffered backlog is dropped by swapping in a fresh receiver, and
    /// the returned events replace it.
    pub async fn resync(&self, receiver: &mut broadcast::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let _guard = self.commit.lock().await;
        *receiver = self.tx.subscribe();
        self.snapshot().await
    }

    /// Current state as a list of events. Callers hold the commit lock.
    async fn snapshot(&self) -> Vec<ServerEvent> {
        let latest = match self.store.find_latest().await {
            Ok(latest) => latest,
            Err(e) => {
                error!(error = %e, "Failed to read latest payload, sending no data");
                None
            }
        };
        let mut events = vec![ServerEvent::DataUpdate(latest)];
        if let Some(visible) = self.floating_area() {
            events.push(ServerEvent::FloatingAreaStatus(visible));
        }
        events
    }

    /// Persist `payload` and fan it out to every subscriber.
    ///
    /// If persistence fails nothing is broadcast and the error is returned
    /// to the caller.
    pub async fn refresh(&self, payload: Value) -> BoardResult<()> {
        let _guard = self.commit.lock().await;
        if let Err(e) = self.store.upsert_latest(&payload).await {
            error!(error = %e, "Failed to persist payload, broadcast skipped");
            return Err(e);
        }
        let delivered = self.send(ServerEvent::DataUpdate(Some(payload)));
        info!(delivered, "Payload refreshed");
        Ok(())
    }

    /// Set floating area visibility and fan it out. Returns `None` when the
    /// floating area is disabled.
    pub async fn toggle_floating_area(&self, visible: bool) -> Option<bool> {
        let Some(flag) = &self.floating_area else {
            warn!(visible, "Floating area toggle ignored, feature disabled");
            return None;
        };
        let _guard = self.commit.lock().await;
        flag.store(visible, Ordering::SeqCst);
        let delivered = self.send(ServerEvent::FloatingAreaStatus(visible));
        info!(visible, delivered, "Floating area toggled");
        Some(visible)
    }

    /// Current floating area visibility, if the feature is enabled.
    pub fn floating_area(&self) -> Option<bool> {
        self.floating_area
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
    }

    /// The persisted payload.
    pub async fn latest(&self) -> BoardResult<Option<Value>> {
        self.store.find_latest().await
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, event: ServerEvent) -> usize {
        // Err only means nobody is subscribed.
        self.tx.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};
    use tokio::sync::{Notify, Semaphore};

    /// Store whose reads park until the test opens the gate.
    struct GatedStore {
        inner: MemoryStore,
        entered: Notify,
        gate: Semaphore,
    }

    #[async_trait]
    impl PayloadStore for GatedStore {
        async fn find_latest(&self) -> BoardResult<Option<Value>> {
            self.entered.notify_one();
            let _permit = self.gate.acquire().await.unwrap();
            self.inner.find_latest().await
        }

        async fn upsert_latest(&self, payload: &Value) -> BoardResult<()> {
            self.inner.upsert_latest(payload).await
        }
    }

    fn broadcaster(floating_area: bool) -> (Arc<MemoryStore>, Broadcaster) {
        let store = Arc::new(MemoryStore::new());
        let b = Broadcaster::new(store.clone(), floating_area);
        (store, b)
    }

    #[tokio::test]
    async fn test_connect_before_any_refresh_gets_no_data() {
        let (_store, b) = broadcaster(false);
        let sub = b.connect().await;
        assert_eq!(sub.initial, vec![ServerEvent::DataUpdate(None)]);
    }

    #[tokio::test]
    async fn test_connect_includes_floating_area_default() {
        let (_store, b) = broadcaster(true);
        let sub = b.connect().await;
        assert_eq!(
            sub.initial,
            vec![
                ServerEvent::DataUpdate(None),
                ServerEvent::FloatingAreaStatus(DEFAULT_FLOATING_AREA_VISIBLE),
            ]
        );
    }

    #[tokio::test]
    async fn test_refresh_persists_and_reaches_every_subscriber() {
        let (store, b) = broadcaster(false);
        let mut sender = b.connect().await;
        let mut other = b.connect().await;

        b.refresh(json!({"alert": "cold chain"})).await.unwrap();

        let expected = ServerEvent::DataUpdate(Some(json!({"alert": "cold chain"})));
        assert_eq!(sender.receiver.recv().await.unwrap(), expected);
        assert_eq!(other.receiver.recv().await.unwrap(), expected);
        assert_eq!(
            store.find_latest().await.unwrap(),
            Some(json!({"alert": "cold chain"}))
        );
    }

    #[tokio::test]
    async fn test_refresh_sequence_is_delivered_in_order() {
        let (store, b) = broadcaster(false);
        let mut sub = b.connect().await;

        for n in 1..=5 {
            b.refresh(json!({ "n": n })).await.unwrap();
        }

        for n in 1..=5 {
            assert_eq!(
                sub.receiver.recv().await.unwrap(),
                ServerEvent::DataUpdate(Some(json!({ "n": n })))
            );
        }
        assert_eq!(store.find_latest().await.unwrap(), Some(json!({"n": 5})));
    }

    #[tokio::test]
    async fn test_late_joiner_gets_latest_exactly_once() {
        let (_store, b) = broadcaster(false);
        b.refresh(json!("p1")).await.unwrap();
        b.refresh(json!("p2")).await.unwrap();

        let mut late = b.connect().await;
        assert_eq!(late.initial, vec![ServerEvent::DataUpdate(Some(json!("p2")))]);
        assert!(matches!(late.receiver.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_repeated_refresh_broadcasts_twice_and_keeps_value() {
        let (store, b) = broadcaster(false);
        let mut sub = b.connect().await;

        b.refresh(json!([1, 2])).await.unwrap();
        b.refresh(json!([1, 2])).await.unwrap();

        assert_eq!(sub.receiver.recv().await.unwrap(), ServerEvent::DataUpdate(Some(json!([1, 2]))));
        assert_eq!(sub.receiver.recv().await.unwrap(), ServerEvent::DataUpdate(Some(json!([1, 2]))));
        assert_eq!(store.find_latest().await.unwrap(), Some(json!([1, 2])));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_persist_does_not_broadcast() {
        let (store, b) = broadcaster(false);
        b.refresh(json!("committed")).await.unwrap();
        let mut sub = b.connect().await;

        store.set_fail_writes(true);
        assert!(b.refresh(json!("lost")).await.is_err());

        assert!(matches!(sub.receiver.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(b.latest().await.unwrap(), Some(json!("committed")));
    }

    #[tokio::test]
    async fn test_toggle_broadcasts_and_syncs_new_subscribers() {
        let (_store, b) = broadcaster(true);
        let mut sub = b.connect().await;

        assert_eq!(b.toggle_floating_area(true).await, Some(true));
        assert_eq!(sub.receiver.recv().await.unwrap(), ServerEvent::FloatingAreaStatus(true));

        let late = b.connect().await;
        assert!(late.initial.contains(&ServerEvent::FloatingAreaStatus(true)));
    }

    #[tokio::test]
    async fn test_toggle_is_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let first = Broadcaster::new(store.clone(), true);
        first.toggle_floating_area(true).await;

        let restarted = Broadcaster::new(store.clone(), true);
        assert_eq!(restarted.floating_area(), Some(DEFAULT_FLOATING_AREA_VISIBLE));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_ignored_when_disabled() {
        let (_store, b) = broadcaster(false);
        let mut sub = b.connect().await;
        assert_eq!(b.toggle_floating_area(true).await, None);
        assert!(matches!(sub.receiver.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(b.floating_area(), None);
    }

    #[tokio::test]
    async fn test_dropped_subscription_leaves_fan_out() {
        let (_store, b) = broadcaster(false);
        let sub = b.connect().await;
        let _keep = b.connect().await;
        assert_eq!(b.subscriber_count(), 2);
        drop(sub);
        assert_eq!(b.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_converge_on_stored_value() {
        let (store, b) = broadcaster(false);
        let b = Arc::new(b);
        let mut sub = b.connect().await;

        let left = {
            let b = b.clone();
            tokio::spawn(async move { b.refresh(json!({"from": "left"})).await })
        };
        let right = {
            let b = b.clone();
            tokio::spawn(async move { b.refresh(json!({"from": "right"})).await })
        };
        left.await.unwrap().unwrap();
        right.await.unwrap().unwrap();

        let mut last = None;
        while let Ok(ServerEvent::DataUpdate(value)) = sub.receiver.try_recv() {
            last = value;
        }
        let stored = store.find_latest().await.unwrap();
        assert!(stored == Some(json!({"from": "left"})) || stored == Some(json!({"from": "right"})));
        assert_eq!(last, stored);
    }

    #[tokio::test]
    async fn test_refresh_during_connect_is_not_replayed_stale() {
        let store = Arc::new(GatedStore {
            inner: MemoryStore::new(),
            entered: Notify::new(),
            gate: Semaphore::new(0),
        });
        let b = Arc::new(Broadcaster::new(store.clone(), false));

        let connecting = {
            let b = b.clone();
            tokio::spawn(async move { b.connect().await })
        };
        store.entered.notified().await;

        let refreshing = {
            let b = b.clone();
            tokio::spawn(async move {
                b.refresh(json!("p1")).await.unwrap();
                b.refresh(json!("p2")).await.unwrap();
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.gate.add_permits(1);

        let mut sub = connecting.await.unwrap();
        refreshing.await.unwrap();

        let mut seen = sub.initial.clone();
        while let Ok(event) = sub.receiver.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                ServerEvent::DataUpdate(None),
                ServerEvent::DataUpdate(Some(json!("p1"))),
                ServerEvent::DataUpdate(Some(json!("p2"))),
            ]
        );
    }

    #[tokio::test]
    async fn test_resync_drops_backlog_of_lagging_subscriber() {
        let (_store, b) = broadcaster(false);
        let mut sub = b.connect().await;

        for n in 0..150 {
            b.refresh(json!(n)).await.unwrap();
        }
        assert!(matches!(sub.receiver.recv().await, Err(RecvError::Lagged(_))));

        let events = b.resync(&mut sub.receiver).await;
        assert_eq!(events, vec![ServerEvent::DataUpdate(Some(json!(149)))]);
        assert!(matches!(sub.receiver.try_recv(), Err(TryRecvError::Empty)));

        b.refresh(json!(150)).await.unwrap();
        assert_eq!(sub.receiver.recv().await.unwrap(), ServerEvent::DataUpdate(Some(json!(150))));
    }
}
