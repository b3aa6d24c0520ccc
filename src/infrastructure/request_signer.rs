//! ES256 request tokens for the Coinbase Advanced Trade API
//!
//! Every REST call carries a fresh JWT bound to the request method, host and
//! path. Tokens expire two minutes after issue and carry a random nonce in
//! the header, so no two requests share a token.
//!
//! The API secret is a PEM-encoded P-256 private key, either PKCS#8
//! ("BEGIN PRIVATE KEY") or SEC1 ("BEGIN EC PRIVATE KEY").

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use p256::SecretKey;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::domain::entities::credentials::Credentials;
use crate::domain::errors::{TradingError, TradingResult};

/// Token lifetime in seconds
pub const TOKEN_TTL_SECS: i64 = 120;
const ISSUER: &str = "cdp";

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub iss: String,
    pub nbf: i64,
    pub exp: i64,
    pub uri: String,
}

pub struct RequestSigner {
    key_id: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .field("encoding_key", &"<REDACTED>")
            .finish()
    }
}

impl RequestSigner {
    pub fn from_credentials(credentials: &Credentials) -> TradingResult<Self> {
        if credentials.key_id().trim().is_empty() {
            return Err(TradingError::Auth("API key name is empty".to_string()));
        }

        let unusable = || {
            TradingError::Auth(format!(
                "API secret for key {} is not a PEM-encoded P-256 private key",
                credentials.masked_key_id()
            ))
        };

        // keys pasted into env files often carry literal "\n"
        let pem = credentials.secret().replace("\\n", "\n");
        let secret_key = SecretKey::from_pkcs8_pem(pem.trim())
            .or_else(|_| SecretKey::from_sec1_pem(pem.trim()))
            .map_err(|_| unusable())?;

        // SEC1 keys are normalised to PKCS#8 before handing them to the encoder
        let der = secret_key.to_pkcs8_der().map_err(|_| unusable())?;

        Ok(Self {
            key_id: credentials.key_id().to_string(),
            encoding_key: EncodingKey::from_ec_der(der.as_bytes()),
        })
    }

    /// Token for `METHOD host/path`, valid from now for [`TOKEN_TTL_SECS`]
    pub fn sign(&self, method: &str, host: &str, path: &str) -> TradingResult<String> {
        self.sign_at(method, host, path, Utc::now().timestamp())
    }

    fn sign_at(&self, method: &str, host: &str, path: &str, now: i64) -> TradingResult<String> {
        let mut nonce = [0u8; 16];
        OsRng.fill_bytes(&mut nonce);

        let header = Header {
            kid: Some(self.key_id.clone()),
            nonce: Some(hex::encode(nonce)),
            ..Header::new(Algorithm::ES256)
        };
        let claims = JwtClaims {
            sub: self.key_id.clone(),
            iss: ISSUER.to_string(),
            nbf: now,
            exp: now + TOKEN_TTL_SECS,
            uri: format!("{} {}{}", method.to_uppercase(), host, path),
        };

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TradingError::Auth(format!("Failed to encode JWT: {}", e)))
    }
}
