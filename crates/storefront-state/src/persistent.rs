use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_core::{MutableState, State, Storage, Subscription};

/// Decodes the JSON value stored under `key`. Missing and undecodable values
/// both read as `None`.
pub fn read_persisted<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("discarding corrupt persisted value for {key:?}: {err}");
            None
        }
    }
}

/// Encodes `value` as JSON under `key`. Failures are logged and swallowed.
pub fn write_persisted<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            log::warn!("cannot encode persisted value for {key:?}: {err}");
            return;
        }
    };
    if let Err(err) = storage.set_item(key, &encoded) {
        log::warn!("cannot persist {key:?}: {err}");
    }
}

/// A [`MutableState`] mirrored into durable storage under one key.
///
/// The stored value is read once, at construction, falling back to the
/// default when it is absent or corrupt. After that every change is written
/// back synchronously, before any later subscriber runs.
pub struct PersistentKeyedState<T: Clone + 'static> {
    key: String,
    state: MutableState<T>,
    _writer: Subscription,
}

impl<T> PersistentKeyedState<T>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    pub fn new(storage: Rc<dyn Storage>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let initial = read_persisted(&*storage, &key).unwrap_or(default);
        write_persisted(&*storage, &key, &initial);
        let state = MutableState::new(initial);
        let writer = {
            let key = key.clone();
            state.subscribe(move |value: &T| write_persisted(&*storage, &key, value))
        };
        Self {
            key,
            state,
            _writer: writer,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &MutableState<T> {
        &self.state
    }

    pub fn as_state(&self) -> State<T> {
        self.state.as_state()
    }

    pub fn get(&self) -> T {
        self.state.value()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.state.with(f)
    }

    pub fn set(&self, value: T) {
        self.state.set(value);
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.state.update(f)
    }

    /// Applies `f`; nothing is written unless it reports a change.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.state.update_if(f)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use storefront_core::MemoryStorage;

    use super::*;

    fn storage() -> (MemoryStorage, Rc<dyn Storage>) {
        let memory = MemoryStorage::new();
        let shared: Rc<dyn Storage> = Rc::new(memory.clone());
        (memory, shared)
    }

    #[test]
    fn empty_storage_yields_default() {
        let (_, storage) = storage();
        let state = PersistentKeyedState::new(storage, "key", String::from("default"));
        assert_eq!(state.get(), "default");
    }

    #[test]
    fn stored_value_wins_over_default() {
        let (memory, storage) = storage();
        memory.set_item("key", "\"stored\"").unwrap();

        let state = PersistentKeyedState::new(storage, "key", String::from("default"));

        assert_eq!(state.get(), "stored");
    }

    #[test]
    fn every_change_is_written_back() {
        let (memory, storage) = storage();
        let state = PersistentKeyedState::new(storage, "key", String::from("default"));

        state.set(String::from("newValue"));
        assert_eq!(memory.get_item("key").as_deref(), Some("\"newValue\""));

        state.update(|value| value.push('!'));
        assert_eq!(memory.get_item("key").as_deref(), Some("\"newValue!\""));
    }

    #[test]
    fn corrupt_value_falls_back_silently() {
        let (memory, storage) = storage();
        memory.set_item("cart", "{\"1\": \"lots\"").unwrap();

        let state: PersistentKeyedState<BTreeMap<u64, u32>> =
            PersistentKeyedState::new(storage, "cart", BTreeMap::new());

        assert!(state.get().is_empty());
        assert_eq!(memory.get_item("cart").as_deref(), Some("{}"));
    }

    #[test]
    fn rejected_update_is_not_written() {
        let (memory, storage) = storage();
        let state = PersistentKeyedState::new(storage, "n", 1u32);
        memory.set_item("n", "\"sentinel\"").unwrap();

        assert!(!state.update_if(|_| false));

        assert_eq!(memory.get_item("n").as_deref(), Some("\"sentinel\""));
    }
}
