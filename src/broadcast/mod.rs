//! Broadcast fan-out: deliver one event to every registered connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::time::timeout;

use crate::registry::{ConnectionHandle, ConnectionRegistry};
use crate::websocket::ServerEvent;

/// Default bound on a single member's delivery time
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 5000;

/// Counters for fan-out activity
#[derive(Debug, Default)]
pub struct BroadcastStats {
    /// Events handed to the fan-out
    pub events_broadcast: AtomicU64,
    /// Successful per-member deliveries
    pub total_delivered: AtomicU64,
    /// Failed or timed-out per-member deliveries
    pub total_failed: AtomicU64,
}

impl BroadcastStats {
    pub fn snapshot(&self) -> BroadcastStatsSnapshot {
        BroadcastStatsSnapshot {
            events_broadcast: self.events_broadcast.load(Ordering::Relaxed),
            total_delivered: self.total_delivered.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of fan-out counters
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastStatsSnapshot {
    pub events_broadcast: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
}

/// Fans events out to every currently registered connection.
///
/// Delivery is best-effort: a member whose channel is closed, or that stays
/// stalled past the send timeout, is deregistered and close-notified. The
/// caller never sees a delivery failure.
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    send_timeout: Duration,
    stats: BroadcastStats,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self::with_send_timeout(registry, Duration::from_millis(DEFAULT_SEND_TIMEOUT_MS))
    }

    pub fn with_send_timeout(registry: Arc<ConnectionRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
            stats: BroadcastStats::default(),
        }
    }

    pub fn stats(&self) -> BroadcastStatsSnapshot {
        self.stats.snapshot()
    }

    /// Deliver `event` to every registered connection.
    ///
    /// Takes a snapshot of the membership, attempts every delivery
    /// concurrently, and prunes members whose delivery failed. Completes only
    /// after all attempts have resolved, so two broadcasts awaited
    /// back-to-back by one producer reach a live member in order.
    #[tracing::instrument(name = "broadcast", skip(self, event), fields(event_type = event.kind()))]
    pub async fn broadcast(&self, event: ServerEvent) {
        let connections = self.registry.snapshot();
        self.stats.events_broadcast.fetch_add(1, Ordering::Relaxed);

        if connections.is_empty() {
            return;
        }

        let mut futures = FuturesUnordered::new();
        for conn in connections {
            let event = event.clone();
            let send_timeout = self.send_timeout;
            futures.push(async move {
                let outcome = timeout(send_timeout, conn.send(event)).await;
                (conn, matches!(outcome, Ok(Ok(()))))
            });
        }

        let mut delivered: usize = 0;
        let mut failed: Vec<Arc<ConnectionHandle>> = Vec::new();

        while let Some((conn, ok)) = futures.next().await {
            if ok {
                delivered += 1;
            } else {
                failed.push(conn);
            }
        }

        for conn in &failed {
            // Exactly one deregistration per failed member; the session guard
            // makes a concurrent sweep or teardown racing us harmless.
            self.registry.deregister(conn);
            conn.close();
            tracing::debug!(
                user_id = %conn.user_id,
                session = %conn.session,
                "Pruned dead connection during fan-out"
            );
        }

        self.stats.total_delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        self.stats.total_failed.fetch_add(failed.len() as u64, Ordering::Relaxed);

        tracing::debug!(
            delivered = delivered,
            failed = failed.len(),
            "Broadcast completed"
        );
    }
}
