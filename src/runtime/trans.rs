use serde_json::Value;

use super::interpolate::Payload;
use super::provider::use_translation;
use super::store::I18n;
use super::RuntimeError;

/// Runtime counterpart of the `<Trans>` marker component.
///
/// `children` takes precedence over `message`; whichever is used must be a
/// string. The remaining props are the interpolation payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Trans {
    pub tag: String,
    pub message: Option<Value>,
    pub children: Option<Value>,
    pub payload: Payload,
}

/// Rendered element: the wrapping tag and its translated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransOutput {
    pub tag: String,
    pub text: String,
}

impl Default for Trans {
    fn default() -> Self {
        Self {
            tag: "span".to_string(),
            message: None,
            children: None,
            payload: Payload::new(),
        }
    }
}

impl Trans {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(Value::String(message.into())),
            ..Self::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn children(mut self, children: impl Into<Value>) -> Self {
        self.children = Some(children.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }

    /// Render with the store active on this thread
    pub fn render(&self) -> Result<TransOutput, RuntimeError> {
        let i18n = use_translation()?;
        self.render_with(&i18n)
    }

    pub fn render_with(&self, i18n: &I18n) -> Result<TransOutput, RuntimeError> {
        let content = match self.children.as_ref().or(self.message.as_ref()) {
            Some(Value::String(content)) => content,
            _ => return Err(RuntimeError::InvalidTransChildren),
        };

        Ok(TransOutput {
            tag: self.tag.clone(),
            text: i18n.t(content, Some(&self.payload)),
        })
    }
}
