//! Decode targets for response bodies.
//!
//! A `Target<T>` is a shared slot. The test keeps one handle and passes a
//! clone to `Client::set_result`; every execution afterwards overwrites the
//! slot with the freshly decoded response body.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;

/// Shared location a response body is decoded into.
#[derive(Debug)]
pub struct Target<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Target<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a value has been decoded into this target.
    pub fn is_filled(&self) -> bool {
        self.lock().is_some()
    }

    /// Remove and return the decoded value.
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    /// Run `f` against the decoded value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.lock().as_ref())
    }
}

impl<T: Clone> Target<T> {
    /// Clone of the decoded value.
    pub fn get(&self) -> Option<T> {
        self.lock().clone()
    }
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Target<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased decoder held by the client.
pub(crate) trait Decode: Send {
    fn decode(&self, body: &[u8]) -> Result<(), serde_json::Error>;
}

impl<T: DeserializeOwned + Send> Decode for Target<T> {
    fn decode(&self, body: &[u8]) -> Result<(), serde_json::Error> {
        let value = serde_json::from_slice(body)?;
        *self.lock() = Some(value);
        Ok(())
    }
}
