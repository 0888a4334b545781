use kirana_shared::MaskedPhone;

/// Placeholder identity used when no phone has been stored yet.
pub const DEFAULT_IDENTITY: &str = "9999999999";

/// Read-only access to the previously stored phone-style identity.
///
/// The store is write-once/read-many from this subsystem's perspective;
/// nothing here ever writes it.
pub trait IdentityStore: Send + Sync {
    fn stored_identity(&self) -> Option<String>;

    /// Stored identity, or the documented placeholder when absent.
    fn identity_or_default(&self) -> String {
        self.stored_identity()
            .unwrap_or_else(|| DEFAULT_IDENTITY.to_string())
    }
}

/// Identity seeded once from configuration at startup.
pub struct StaticIdentityStore {
    identity: Option<String>,
}

impl StaticIdentityStore {
    pub fn new(identity: Option<String>) -> Self {
        match &identity {
            Some(phone) => tracing::debug!("identity store seeded for {}", MaskedPhone(phone)),
            None => tracing::debug!("no stored identity, placeholder in effect"),
        }
        Self { identity }
    }
}

impl IdentityStore for StaticIdentityStore {
    fn stored_identity(&self) -> Option<String> {
        self.identity.clone()
    }
}
