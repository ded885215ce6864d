//! Relay actuator: writes the power state of the relay accessory.
//!
//! Writes are fire-and-forget: failures are logged when their completion
//! arrives and never retried.

use std::sync::Arc;

use localhome_domain::accessory::{Capability, CharacteristicRef, CharacteristicValue};
use localhome_domain::error::{HomeError, NotFoundError};
use localhome_domain::generation::Generation;
use localhome_domain::role::{AccessoryRole, Classification};

use crate::completion::{Completion, CompletionSender, WriteCompletion};
use crate::ports::AccessoryRegistry;

/// Holds the relay's power characteristic for the current generation.
pub struct RelayActuator<R> {
    registry: Arc<R>,
    completions: CompletionSender,
    generation: Generation,
    handle: Option<CharacteristicRef>,
    reachable: bool,
    last_write: Option<Generation>,
}

impl<R: AccessoryRegistry + 'static> RelayActuator<R> {
    pub fn new(registry: Arc<R>, completions: CompletionSender) -> Self {
        Self {
            registry,
            completions,
            generation: Generation::default(),
            handle: None,
            reachable: false,
            last_write: None,
        }
    }

    /// Forget the handle until the next [`resolve`](Self::resolve).
    pub fn invalidate(&mut self, generation: Generation) {
        self.generation = generation;
        self.handle = None;
        self.reachable = false;
    }

    /// Memoize the power characteristic of the relay accessory, if any.
    pub fn resolve(&mut self, generation: Generation, classification: &Classification) {
        self.invalidate(generation);
        if let Some(relay) = classification.get(AccessoryRole::Relay) {
            self.handle = relay.handle(&Capability::PowerState);
            self.reachable = relay.reachable;
        }
    }

    /// Hub-reported reachability of the resolved relay.
    ///
    /// This says nothing about whether the last write landed.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.handle.is_some() && self.reachable
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether a write was already issued under the current generation.
    #[must_use]
    pub fn written_this_generation(&self) -> bool {
        self.last_write == Some(self.generation)
    }

    /// Issue a power write.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when no relay is resolved and
    /// [`HomeError::Unreachable`] when the hub reports it offline. The write
    /// itself is never awaited.
    pub fn write(&mut self, on: bool) -> Result<(), HomeError> {
        let handle = self.handle.ok_or_else(|| NotFoundError {
            entity: "Relay",
            id: AccessoryRole::Relay.to_string(),
        })?;
        if !self.reachable {
            return Err(HomeError::Unreachable(handle.accessory));
        }

        let registry = Arc::clone(&self.registry);
        let completions = self.completions.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = registry
                .write(handle, CharacteristicValue::power(on))
                .await;
            let _ = completions.send(Completion::Write(WriteCompletion {
                generation,
                on,
                result,
            }));
        });

        self.last_write = Some(generation);
        tracing::debug!(on, %generation, "relay write issued");
        Ok(())
    }

    /// Log the outcome of a write. Returns `true` when it succeeded.
    pub fn apply(&self, completion: &WriteCompletion) -> bool {
        match &completion.result {
            Ok(()) => {
                tracing::debug!(on = completion.on, generation = %completion.generation, "relay write acknowledged");
                true
            }
            Err(err) => {
                tracing::warn!(on = completion.on, generation = %completion.generation, %err, "relay write failed");
                false
            }
        }
    }
}
