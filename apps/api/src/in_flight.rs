//! Supersession of in-flight requests.
//!
//! Each `(caller, task)` pair owns a slot holding a generation counter. A new
//! request bumps the counter; an older request still running for the same slot
//! sees the bump, drops its generation future and resolves to `Superseded`, so
//! a stale result can never reach the caller after a newer one was asked for.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::info;

use crate::errors::AppError;
use crate::models::task::TaskKind;

type SlotKey = (String, TaskKind);

#[derive(Default)]
pub struct InFlightRegistry {
    slots: Mutex<HashMap<SlotKey, watch::Sender<u64>>>,
}

/// Handle for one request's claim on its slot.
pub struct Ticket {
    generation: u64,
    updates: watch::Receiver<u64>,
    key: SlotKey,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<SlotKey, watch::Sender<u64>>> {
        // The map stays consistent even if a holder panicked.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claims the slot for `(user_id, kind)`, superseding any earlier claim.
    pub fn begin(&self, user_id: &str, kind: TaskKind) -> Ticket {
        let key = (user_id.to_string(), kind);
        let mut slots = self.slots();
        slots.retain(|_, sender| sender.receiver_count() > 0);

        let sender = slots
            .entry(key.clone())
            .or_insert_with(|| watch::channel(0).0);
        sender.send_modify(|current| *current += 1);
        let generation = *sender.borrow();
        let updates = sender.subscribe();

        Ticket {
            generation,
            updates,
            key,
        }
    }

    /// Number of slots with a live request.
    #[cfg(test)]
    pub fn active(&self) -> usize {
        self.slots()
            .values()
            .filter(|sender| sender.receiver_count() > 0)
            .count()
    }
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub fn is_current(&self) -> bool {
        *self.updates.borrow() == self.generation
    }

    /// Drives `work` unless a newer request for the same slot arrives first.
    /// A result that completes after supersession is discarded.
    pub async fn run<F: Future>(self, work: F) -> Result<F::Output, AppError> {
        let Ticket {
            generation,
            mut updates,
            key: (_, kind),
        } = self;
        let superseded = async {
            let closed = updates.wait_for(|current| *current != generation).await.is_err();
            // A closed channel means the registry is gone; keep running.
            if closed {
                std::future::pending::<()>().await;
            }
        };

        let output = tokio::select! {
            biased;
            _ = superseded => None,
            output = work => Some(output),
        };

        match output {
            Some(output) if *updates.borrow() == generation => Ok(output),
            Some(_) => {
                info!("Discarding stale result #{generation} for {kind:?}");
                Err(AppError::Superseded)
            }
            None => {
                info!("Request #{generation} for {kind:?} superseded; dropping it");
                Err(AppError::Superseded)
            }
        }
    }
}
