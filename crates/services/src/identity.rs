use async_trait::async_trait;
use tokio::sync::watch;
use workout_core::model::UserId;

use crate::error::IdentityError;

/// The signed-in user that owns persisted progress and weight records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
}

/// Source of the current identity and its changes.
///
/// Subscribers observe `None` while nobody is signed in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Identity>;

    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    /// # Errors
    ///
    /// Returns `IdentityError` when the credentials are malformed.
    async fn sign_in(&self, email: &str) -> Result<Identity, IdentityError>;

    /// # Errors
    ///
    /// Returns `IdentityError` when the e-mail or display name is malformed.
    async fn sign_up(&self, email: &str, name: Option<String>)
    -> Result<Identity, IdentityError>;

    async fn sign_out(&self);

    fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}

/// Offline identity provider.
///
/// User ids are derived from the normalized e-mail, so signing in with the
/// same address on a later run reaches the same stored progress.
pub struct LocalIdentityProvider {
    current: watch::Sender<Option<Identity>>,
}

impl LocalIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    fn publish(&self, identity: Identity) -> Identity {
        tracing::info!(user = %identity.user_id, "signed in");
        self.current.send_replace(Some(identity.clone()));
        identity
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str) -> Result<Identity, IdentityError> {
        let email = normalize_email(email)?;
        let identity = Identity {
            user_id: UserId::for_email(&email),
            email,
            name: None,
        };
        Ok(self.publish(identity))
    }

    async fn sign_up(
        &self,
        email: &str,
        name: Option<String>,
    ) -> Result<Identity, IdentityError> {
        let email = normalize_email(email)?;
        let name = match name {
            Some(name) if name.trim().is_empty() => return Err(IdentityError::BlankName),
            Some(name) => Some(name.trim().to_owned()),
            None => None,
        };
        let identity = Identity {
            user_id: UserId::for_email(&email),
            email,
            name,
        };
        Ok(self.publish(identity))
    }

    async fn sign_out(&self) {
        if self.current.send_replace(None).is_some() {
            tracing::info!("signed out");
        }
    }
}

fn normalize_email(raw: &str) -> Result<String, IdentityError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(IdentityError::InvalidEmail(raw.to_owned()))
    }
}
