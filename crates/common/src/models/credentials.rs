use std::fmt;

use crate::config::mask;

/// Key pair used to sign requests for one exchange account.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
    /// Where the pair came from, for logs only (`"static"`, `"store#3"`).
    pub source: String,
}

impl ApiCredentials {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            source: source.into(),
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &"***")
            .field("source", &self.source)
            .finish()
    }
}
