use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::interpolate::{Interpolator, Payload};
use crate::locale::Locale;

/// Language code -> resource
pub type Locales = HashMap<String, Locale>;

/// Called with the new language and the override resource passed to
/// [`I18n::set_lang`], if any
pub type Listener = dyn Fn(&str, Option<&Locale>);

/// Snapshot of a store's data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct I18nContext {
    pub lang: Option<String>,
    pub locales: Locales,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Rc<Listener>)>,
}

/// Observable translation store.
///
/// Cloning copies the language and resources; the clone shares the
/// subscriber list and the interpolator with the original.
#[derive(Clone)]
pub struct I18n {
    state: RefCell<I18nContext>,
    listeners: Rc<RefCell<Listeners>>,
    interpolator: Rc<Interpolator>,
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("state", &self.state.borrow())
            .field("listeners", &self.listeners.borrow().entries.len())
            .finish()
    }
}

impl Default for I18n {
    fn default() -> Self {
        I18nBuilder::default().build()
    }
}

impl I18n {
    pub fn new(lang: Option<&str>, locales: Locales) -> Self {
        let mut builder = Self::builder().locales(locales);
        if let Some(lang) = lang {
            builder = builder.lang(lang);
        }
        builder.build()
    }

    pub fn builder() -> I18nBuilder {
        I18nBuilder::default()
    }

    pub fn lang(&self) -> Option<String> {
        self.state.borrow().lang.clone()
    }

    /// Resource for `lang`, if one is loaded
    pub fn locale(&self, lang: &str) -> Option<Locale> {
        self.state.borrow().locales.get(lang).cloned()
    }

    pub fn context(&self) -> I18nContext {
        self.state.borrow().clone()
    }

    /// Switch the active language.
    ///
    /// `locale` is merged over the stored resource for `lang` (its values
    /// win), then every current subscriber is called synchronously.
    pub fn set_lang(&self, lang: &str, locale: Option<Locale>) {
        {
            let mut state = self.state.borrow_mut();
            let entry = state.locales.entry(lang.to_string()).or_default();
            if let Some(overrides) = &locale {
                for (key, value) in overrides {
                    entry.insert(key.clone(), value.clone());
                }
            }
            state.lang = Some(lang.to_string());
        }

        // Listeners may call back into the store, so nothing stays borrowed
        let listeners: Vec<Rc<Listener>> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(lang, locale.as_ref());
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str, Option<&Locale>) + 'static,
    {
        let listener: Rc<Listener> = Rc::new(listener);
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Translate `key` in the active language, falling back to the key
    /// itself, then interpolate `payload`.
    pub fn t(&self, key: &str, payload: Option<&Payload>) -> String {
        let state = self.state.borrow();
        let translated = state
            .lang
            .as_ref()
            .and_then(|lang| state.locales.get(lang))
            .and_then(|locale| locale.get(key));

        let message = match translated {
            Some(Value::String(text)) if !text.is_empty() => text.as_str(),
            _ => key,
        };
        self.interpolator.interpolate(message, payload)
    }
}

/// Handle returned by [`I18n::subscribe`]
#[must_use = "dropping a Subscription keeps the listener registered"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Subscription {
    /// Remove the listener. A no-op once the store is gone.
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[derive(Default)]
pub struct I18nBuilder {
    lang: Option<String>,
    locales: Locales,
    interpolator: Option<Interpolator>,
}

impl I18nBuilder {
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn locales(mut self, locales: Locales) -> Self {
        self.locales = locales;
        self
    }

    pub fn locale(mut self, lang: impl Into<String>, locale: Locale) -> Self {
        self.locales.insert(lang.into(), locale);
        self
    }

    pub fn interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = Some(interpolator);
        self
    }

    pub fn build(self) -> I18n {
        I18n {
            state: RefCell::new(I18nContext {
                lang: self.lang,
                locales: self.locales,
            }),
            listeners: Rc::new(RefCell::new(Listeners::default())),
            interpolator: Rc::new(self.interpolator.unwrap_or_default()),
        }
    }
}
