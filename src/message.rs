//! Chat message representation.
//!
//! A message is one line of UTF-8 text; its wire form is exactly its bytes.
//! There is no length prefix, terminator, or checksum: the message boundary
//! is a single socket read, capped at [`MAX_MESSAGE_SIZE`] bytes.

/// Maximum payload accepted by a single receive call.
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// The in-band end-of-session token, matched case-insensitively.
pub const SENTINEL: &str = "bye";

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
}

impl Message {
    /// Build a message from a received payload.
    ///
    /// The payload must be valid UTF-8; anything else is a fatal decode
    /// error for the session.
    pub fn from_payload(payload: &[u8]) -> Result<Self, MessageError> {
        let text = std::str::from_utf8(payload).map_err(MessageError::Utf8)?;
        Ok(Message {
            text: text.to_string(),
        })
    }

    /// Build a message from a locally entered line (terminator already
    /// stripped by the console).
    pub fn from_line(line: String) -> Self {
        Message { text: line }
    }

    /// Whether this message is the sentinel token.
    ///
    /// Exact match after ASCII case folding; whitespace variants such as
    /// `" bye"` are ordinary messages.
    pub fn is_sentinel(&self) -> bool {
        self.text.eq_ignore_ascii_case(SENTINEL)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Wire form: the raw bytes of the text.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// Message decode errors.
#[derive(Debug)]
pub enum MessageError {
    Utf8(std::str::Utf8Error),
}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageError::Utf8(e) => write!(f, "payload is not valid UTF-8: {e}"),
        }
    }
}

impl std::error::Error for MessageError {}
