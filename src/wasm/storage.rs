use web_sys::Storage;

use crate::error::StoreError;
use crate::ports::KeyValueStore;

use super::dom::js_err;

/// `window.localStorage`; behaves as an empty, read-only store when the
/// browser denies access.
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| match w.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                log::warn!("localStorage unavailable: {}", js_err(err));
                None
            }
        });
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|err| StoreError::Write {
                key: key.to_string(),
                message: js_err(err).to_string(),
            })
    }
}
