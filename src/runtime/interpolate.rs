use anyhow::{Context, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Values substituted into `%name%` placeholders
pub type Payload = Map<String, Value>;

/// Default placeholder: a percent-delimited run of non-whitespace.
/// Captures: Group 1 = the placeholder name
pub const DEFAULT_PATTERN: &str = r"%(\S+?)%";

static DEFAULT_REGEX: OnceLock<Regex> = OnceLock::new();

fn default_regex() -> &'static Regex {
    DEFAULT_REGEX.get_or_init(|| {
        Regex::new(DEFAULT_PATTERN).expect("DEFAULT_REGEX pattern is invalid - this is a bug")
    })
}

/// A template split at its placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Var { name: String, token: String },
}

/// Substitutes payload values into message templates.
///
/// Templates are split once and the parts cached by template string; every
/// placeholder occurrence is substituted from its own match position.
#[derive(Debug)]
pub struct Interpolator {
    pattern: Regex,
    cache: Mutex<HashMap<String, Arc<Vec<Part>>>>,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::from_regex(default_regex().clone())
    }
}

impl Interpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom placeholder pattern. Capture group 1, when present, is
    /// the payload key; otherwise the whole match is.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid interpolation pattern: {}", pattern))?;
        Ok(Self::from_regex(regex))
    }

    fn from_regex(pattern: Regex) -> Self {
        Self {
            pattern,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn interpolate(&self, message: &str, payload: Option<&Payload>) -> String {
        let payload = match payload {
            Some(payload) if !payload.is_empty() => payload,
            _ => return message.to_string(),
        };

        let parts = self.parts(message);
        let mut out = String::with_capacity(message.len());
        for part in parts.iter() {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Var { name, token } => match payload.get(name) {
                    Some(Value::Null) | None => out.push_str(token),
                    Some(Value::String(s)) => out.push_str(s),
                    Some(other) => out.push_str(&other.to_string()),
                },
            }
        }
        out
    }

    /// Number of templates parsed so far
    pub fn cached_templates(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn parts(&self, message: &str) -> Arc<Vec<Part>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parts) = cache.get(message) {
            return Arc::clone(parts);
        }
        let parts = Arc::new(split_parts(&self.pattern, message));
        cache.insert(message.to_string(), Arc::clone(&parts));
        parts
    }
}

fn split_parts(pattern: &Regex, message: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in pattern.captures_iter(message) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            parts.push(Part::Text(message[last..whole.start()].to_string()));
        }
        let name = caps.get(1).unwrap_or(whole).as_str().to_string();
        parts.push(Part::Var {
            name,
            token: whole.as_str().to_string(),
        });
        last = whole.end();
    }

    if last < message.len() {
        parts.push(Part::Text(message[last..].to_string()));
    }
    parts
}

/// Interpolate with the shared default pattern
pub fn interpolate(message: &str, payload: Option<&Payload>) -> String {
    static DEFAULT: OnceLock<Interpolator> = OnceLock::new();
    DEFAULT
        .get_or_init(Interpolator::default)
        .interpolate(message, payload)
}
