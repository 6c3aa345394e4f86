//! Collaborators the controllers talk to: persistence, announcements and
//! the animation engine. Browser implementations live in the wasm module.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::StoreError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, used on the host and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Fire-and-forget sink read by assistive technology.
pub trait Announcer {
    fn announce(&self, text: &str);
}

/// One end of an opacity/transform animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    pub opacity: f64,
    pub transform: &'a str,
}

impl<'a> Frame<'a> {
    pub const fn new(opacity: f64, transform: &'a str) -> Self {
        Self { opacity, transform }
    }
}

/// Animation engine. `on_complete` runs exactly once, asynchronously, unless
/// the returned handle is dropped first.
pub trait Animator {
    type Target;
    type Handle;

    fn animate(
        &self,
        target: &Self::Target,
        from: Frame<'_>,
        to: Frame<'_>,
        duration: Duration,
        easing: &str,
        on_complete: Box<dyn FnOnce()>,
    ) -> Self::Handle;
}
