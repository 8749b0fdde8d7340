//! Extracts translatable messages from JavaScript/TypeScript sources and keeps
//! per-language JSON resources in sync with them.
//!
//! Messages are the literal first argument of `t('...')` (bound through the
//! translation hook) and `i18n.t('...')`, and the literal content of
//! `<Trans>...</Trans>`. New messages are appended to every language file;
//! nothing is ever removed or overwritten.
//!
//! ```
//! use i18n_extractor::config::Config;
//! use i18n_extractor::extractor::extract_from_source;
//!
//! let source = r#"
//!     import { useTranslation } from '@scope/i18n';
//!     const { t } = useTranslation();
//!     t('Hello');
//! "#;
//! assert_eq!(extract_from_source(source, "app.tsx", &Config::default()), vec!["Hello"]);
//! ```
//!
//! The [`runtime`] module holds the lookup and interpolation side.

pub mod commands;
pub mod config;
pub mod extractor;
pub mod fs;
pub mod lint;
pub mod locale;
pub mod logging;
pub mod resolve;
pub mod runtime;
pub mod scope;
pub mod watcher;
