use std::fmt;
use zeroize::Zeroizing;

/// Exchange API credentials. The secret is wiped on drop and never printed.
#[derive(Clone)]
pub struct Credentials {
    key_id: String,
    secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }

    /// Key id with everything but the last four characters hidden
    pub fn masked_key_id(&self) -> String {
        let chars: Vec<char> = self.key_id.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.masked_key_id())
            .field("secret", &"<REDACTED>")
            .finish()
    }
}
