use chrono::{DateTime, Utc};

/// A single recorded verification attempt.
///
/// Attempts are immutable once recorded; they only feed windowed counts and
/// are dropped once they fall outside the retention horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    occurred_at: DateTime<Utc>,
    succeeded: bool,
    token_ref: Option<String>,
    tag: Option<String>,
}

impl Attempt {
    /// Creates an attempt with no token reference or tag.
    #[must_use]
    pub fn new(occurred_at: DateTime<Utc>, succeeded: bool) -> Self {
        Self {
            occurred_at,
            succeeded,
            token_ref: None,
            tag: None,
        }
    }

    /// Attaches an opaque token reference.
    #[must_use]
    pub fn with_token_ref(mut self, token_ref: Option<String>) -> Self {
        self.token_ref = token_ref;
        self
    }

    /// Attaches a free-form tag such as the originating page.
    #[must_use]
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Returns when the attempt happened.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns whether verification succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Returns the opaque token reference, if any.
    #[must_use]
    pub fn token_ref(&self) -> Option<&str> {
        self.token_ref.as_deref()
    }

    /// Returns the attempt tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}
