use crate::domain::entities::credentials::Credentials;

/// Source of exchange credentials. Absence means the gateway runs on mock data.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<Credentials>;
}
