use crate::types::Method;

/// One scripted step: what to send, how, and where it lives in the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// 1-based slide number in the rendered deck.
    pub slide: u32,
    /// Position of the snippet within its slide.
    pub snippet: usize,
    pub method: Method,
    pub payload: String,
    /// Raw snippet text as written in the deck, method line included.
    pub source: String,
}

impl Action {
    pub fn new(slide: u32, method: impl Into<Method>, payload: impl Into<String>) -> Self {
        let method = method.into();
        let payload = payload.into();
        Self {
            slide,
            snippet: 0,
            source: format!("{method} {payload}"),
            method,
            payload,
        }
    }

    /// Payload as it reaches the shell: surrounding whitespace trimmed and
    /// highlight backticks removed.
    pub fn shell_payload(&self) -> String {
        let data = self.payload.trim();
        if data.contains('`') {
            tracing::info!(slide = self.slide, "stripping ` from snippet");
            data.replace('`', "")
        } else {
            data.to_string()
        }
    }
}
