//! Runtime side: message lookup, `%name%` interpolation and an observable
//! store for the active language.
//!
//! The store is single-threaded (`Rc`/`RefCell`); listeners run
//! synchronously inside [`I18n::set_lang`].

mod interpolate;
mod provider;
mod store;
mod trans;

pub use interpolate::{interpolate, Interpolator, Payload, DEFAULT_PATTERN};
pub use provider::{provide, use_translation, ProviderGuard};
pub use store::{I18n, I18nBuilder, I18nContext, Listener, Locales, Subscription};
pub use trans::{Trans, TransOutput};

/// Errors raised by the runtime. Both indicate a wiring bug in the caller
/// and are never turned into degraded output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("could not find an active i18n store, please ensure the call happens inside `provide`")]
    MissingProvider,
    #[error("message or children must be a string in Trans")]
    InvalidTransChildren,
}
