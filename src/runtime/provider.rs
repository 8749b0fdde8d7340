use std::cell::RefCell;
use std::rc::Rc;

use super::store::I18n;
use super::RuntimeError;

thread_local! {
    static ACTIVE: RefCell<Option<Rc<I18n>>> = const { RefCell::new(None) };
}

/// Keeps a store active for the current thread until dropped, then restores
/// whichever store was active before.
#[must_use = "the store is only active while the guard is alive"]
pub struct ProviderGuard {
    previous: Option<Rc<I18n>>,
}

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
    }
}

/// Make `i18n` the store returned by [`use_translation`] on this thread.
/// Providers nest.
pub fn provide(i18n: Rc<I18n>) -> ProviderGuard {
    let previous = ACTIVE.with(|active| active.borrow_mut().replace(i18n));
    ProviderGuard { previous }
}

/// The innermost provided store.
///
/// Fails with [`RuntimeError::MissingProvider`] outside of any provider
/// rather than translating with nothing.
pub fn use_translation() -> Result<Rc<I18n>, RuntimeError> {
    ACTIVE.with(|active| active.borrow().clone().ok_or(RuntimeError::MissingProvider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_provider_fails_fast() {
        assert_eq!(use_translation().unwrap_err(), RuntimeError::MissingProvider);
    }

    #[test]
    fn test_nested_providers_restore_outer() {
        let outer = Rc::new(I18n::builder().lang("en").build());
        let inner = Rc::new(I18n::builder().lang("ja").build());

        let _outer_guard = provide(Rc::clone(&outer));
        {
            let _inner_guard = provide(Rc::clone(&inner));
            assert_eq!(use_translation().unwrap().lang().as_deref(), Some("ja"));
        }
        assert_eq!(use_translation().unwrap().lang().as_deref(), Some("en"));
    }

    #[test]
    fn test_guard_drop_clears_provider() {
        let guard = provide(Rc::new(I18n::default()));
        assert!(use_translation().is_ok());
        drop(guard);
        assert!(use_translation().is_err());
    }
}
