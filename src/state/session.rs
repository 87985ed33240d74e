use std::fmt;

/// Opaque cursor issued by the origin server for a stateful listing session
///
/// The server may issue a fresh value with every response; only the most
/// recently observed value is valid for the next request.
#[derive(Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens can be long serialized blobs; keep logs readable.
impl fmt::Debug for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.0.chars().take(16).collect();
        if preview.len() < self.0.len() {
            write!(f, "ContinuationToken({}…)", preview)
        } else {
            write!(f, "ContinuationToken({})", preview)
        }
    }
}

/// Holds the single live continuation token of a listing session
#[derive(Debug, Clone)]
pub struct SessionState {
    token: ContinuationToken,
    rotations: u32,
}

impl SessionState {
    /// Creates a session from the token embedded in the first listing response
    pub fn new(initial: ContinuationToken) -> Self {
        Self {
            token: initial,
            rotations: 0,
        }
    }

    /// The token to send with the next page request
    pub fn current(&self) -> &ContinuationToken {
        &self.token
    }

    /// Replaces the held token; last write wins
    pub fn update(&mut self, token: ContinuationToken) {
        if token != self.token {
            self.rotations += 1;
        }
        self.token = token;
    }

    /// Applies the token found in a response, if any
    ///
    /// An absent token means the server did not rotate this round and the
    /// previous token is kept. Returns true if a token was applied.
    pub fn observe(&mut self, token: Option<ContinuationToken>) -> bool {
        match token {
            Some(token) => {
                self.update(token);
                true
            }
            None => false,
        }
    }

    /// Number of times the server issued a different token
    pub fn rotations(&self) -> u32 {
        self.rotations
    }
}
