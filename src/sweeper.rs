//! Periodic eviction of participants that stopped sending heartbeats.

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    clock,
    models::Message,
    store::{ChatStore, SharedStore},
};

pub struct Sweeper {
    store: SharedStore,
    interval: Duration,
    stale_after: Duration,
}

impl Sweeper {
    pub fn new(store: SharedStore, interval: Duration, stale_after: Duration) -> Self {
        Self { store, interval, stale_after }
    }

    /// Runs a sweep every `interval`, the first one a full interval after spawning.
    /// A failed sweep is logged and left for the next tick.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(err) = sweep(self.store.as_ref(), clock::now_millis(), self.stale_after).await {
                    tracing::warn!(error = %err, "presence sweep failed");
                }
            }
        })
    }
}

/// One pass: evict everyone whose last heartbeat is older than `stale_after` at `now`
/// and announce each departure. Returns the evicted names.
pub async fn sweep(store: &dyn ChatStore, now: i64, stale_after: Duration) -> anyhow::Result<Vec<String>> {
    let window = i64::try_from(stale_after.as_millis()).unwrap_or(i64::MAX);
    let cutoff = now.saturating_sub(window);

    let stale = store.stale_participants(cutoff).await?;
    if stale.is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<String> = stale.into_iter().map(|participant| participant.name).collect();
    let removed = store.remove_participants(&names, cutoff).await?;
    if removed.is_empty() {
        return Ok(removed);
    }

    let farewells: Vec<Message> = removed.iter().map(|name| Message::left(name)).collect();
    store.insert_messages(&farewells).await?;

    tracing::info!(count = removed.len(), names = ?removed, "evicted stale participants");
    Ok(removed)
}
