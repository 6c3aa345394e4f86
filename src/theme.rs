//! Light/dark preference with persistence and change broadcast.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

use crate::ports::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown theme {0:?}")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// Where the current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    Stored,
    System,
    User,
}

pub type ThemeListener = Rc<dyn Fn(Theme)>;

pub struct ThemePreference<S> {
    store: S,
    key: String,
    value: Theme,
    source: ThemeSource,
    listeners: Vec<ThemeListener>,
}

impl<S: KeyValueStore> ThemePreference<S> {
    /// Stored value wins; otherwise follow the system. The system value is not
    /// written back, so later system changes still apply until a user toggle.
    pub fn resolve_initial(store: S, key: impl Into<String>, system_dark: bool) -> Self {
        let key = key.into();
        let stored = store.get(&key).and_then(|raw| match raw.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(err) => {
                log::warn!("ignoring stored theme: {err}");
                None
            }
        });
        let (value, source) = match stored {
            Some(theme) => (theme, ThemeSource::Stored),
            None => (Theme::from_dark(system_dark), ThemeSource::System),
        };
        log::debug!("initial theme {value} from {source:?}");
        Self {
            store,
            key,
            value,
            source,
            listeners: Vec::new(),
        }
    }

    pub fn value(&self) -> Theme {
        self.value
    }

    pub fn source(&self) -> ThemeSource {
        self.source
    }

    pub fn is_dark(&self) -> bool {
        self.value.is_dark()
    }

    pub fn subscribe(&mut self, listener: impl Fn(Theme) + 'static) {
        self.listeners.push(Rc::new(listener));
    }

    /// Flip, persist and broadcast. A failed write is logged; the page still
    /// switches for this session.
    pub fn toggle(&mut self) -> Theme {
        self.value = self.value.toggled();
        self.source = ThemeSource::User;
        if let Err(err) = self.store.set(&self.key, self.value.as_str()) {
            log::warn!("could not persist theme: {err}");
        }
        self.broadcast();
        self.value
    }

    /// Follow an OS-level change unless a stored or user choice exists.
    pub fn system_changed(&mut self, dark: bool) -> bool {
        if self.source != ThemeSource::System {
            return false;
        }
        let theme = Theme::from_dark(dark);
        if theme == self.value {
            return false;
        }
        self.value = theme;
        self.broadcast();
        true
    }

    fn broadcast(&self) {
        for listener in self.listeners.clone() {
            listener(self.value);
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> fmt::Debug for ThemePreference<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemePreference")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("source", &self.source)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::StoreError;
    use crate::ports::MemoryStore;

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    #[test]
    fn stored_value_beats_system() {
        let mut store = MemoryStore::default();
        store.set("theme", "light").unwrap();
        let pref = ThemePreference::resolve_initial(store, "theme", true);
        assert_eq!(pref.value(), Theme::Light);
        assert_eq!(pref.source(), ThemeSource::Stored);
    }

    #[test]
    fn garbage_in_store_falls_back_to_system() {
        let mut store = MemoryStore::default();
        store.set("theme", "sepia").unwrap();
        let pref = ThemePreference::resolve_initial(store, "theme", true);
        assert_eq!(pref.value(), Theme::Dark);
        assert_eq!(pref.source(), ThemeSource::System);
    }

    #[test]
    fn system_resolution_is_not_persisted() {
        let pref = ThemePreference::resolve_initial(MemoryStore::default(), "theme", true);
        assert_eq!(pref.into_store().get("theme"), None);
    }

    #[test]
    fn system_changes_apply_until_user_toggles() {
        let mut pref = ThemePreference::resolve_initial(MemoryStore::default(), "theme", false);
        assert!(pref.system_changed(true));
        assert_eq!(pref.value(), Theme::Dark);
        assert!(!pref.system_changed(true));

        pref.toggle();
        assert_eq!(pref.source(), ThemeSource::User);
        assert!(!pref.system_changed(true));
        assert_eq!(pref.value(), Theme::Light);
    }

    #[test]
    fn listeners_hear_every_change() {
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut pref = ThemePreference::resolve_initial(MemoryStore::default(), "theme", false);
        let sink = Rc::clone(&heard);
        pref.subscribe(move |theme| sink.borrow_mut().push(theme));

        pref.system_changed(true);
        pref.toggle();
        assert_eq!(*heard.borrow(), vec![Theme::Dark, Theme::Light]);
    }

    #[test]
    fn failed_write_still_toggles() {
        let mut pref = ThemePreference::resolve_initial(ReadOnlyStore, "theme", false);
        assert_eq!(pref.toggle(), Theme::Dark);
        assert_eq!(pref.source(), ThemeSource::User);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("Dark".parse::<Theme>().is_err());
    }
}
