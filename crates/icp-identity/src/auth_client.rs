//! Login against an identity provider.
//!
//! `AuthClient` owns the current session: it creates a session key, asks the
//! provider for a delegation to it and keeps the resulting
//! `DelegationIdentity` until logout or expiry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::delegation::{DelegationChain, DelegationIdentity, now_nanos};
use crate::error::{IdentityError, IdentityResult};
use crate::identity::Ed25519KeyIdentity;

/// Default lifetime requested for a delegation (8 hours).
pub const DEFAULT_MAX_TIME_TO_LIVE: Duration = Duration::from_secs(8 * 60 * 60);

/// What the client asks the provider to sign.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    /// Identity provider URL.
    pub identity_provider: String,
    /// DER public key of the fresh session key.
    pub session_public_key: Vec<u8>,
    /// Requested delegation lifetime in nanoseconds.
    pub max_time_to_live: u64,
}

/// What the provider hands back.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub chain: DelegationChain,
    /// A stored session key that replaces the requested one, when the
    /// provider restores an earlier session instead of signing a new one.
    pub session_key: Option<Ed25519KeyIdentity>,
}

impl From<DelegationChain> for Authorization {
    fn from(chain: DelegationChain) -> Self {
        Authorization {
            chain,
            session_key: None,
        }
    }
}

/// An identity provider that can delegate to a session key.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authorize(&self, request: AuthorizeRequest) -> IdentityResult<Authorization>;
}

/// Holds at most one authenticated session.
pub struct AuthClient<P> {
    provider: P,
    identity_provider: String,
    max_time_to_live: Duration,
    session: Option<DelegationIdentity>,
}

impl<P: IdentityProvider> AuthClient<P> {
    pub fn new(provider: P, identity_provider: impl Into<String>, max_time_to_live: Duration) -> Self {
        AuthClient {
            provider,
            identity_provider: identity_provider.into(),
            max_time_to_live,
            session: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Run a login round trip and keep the new session.
    ///
    /// Any existing session is replaced, even when the new login fails.
    pub async fn login(&mut self) -> IdentityResult<&DelegationIdentity> {
        self.session = None;

        let session_key = Ed25519KeyIdentity::random();
        let request = AuthorizeRequest {
            identity_provider: self.identity_provider.clone(),
            session_public_key: session_key.der_public_key(),
            max_time_to_live: u64::try_from(self.max_time_to_live.as_nanos()).unwrap_or(u64::MAX),
        };
        debug!(provider = %request.identity_provider, "requesting delegation");

        let authorization = self.provider.authorize(request).await?;
        let session_key = authorization.session_key.unwrap_or(session_key);
        let identity = DelegationIdentity::new(session_key, authorization.chain, now_nanos())?;
        info!(principal = %identity.principal(), "logged in");

        Ok(self.session.insert(identity))
    }

    /// Drop the session. Returns whether there was one.
    pub fn logout(&mut self) -> bool {
        let had_session = self.session.take().is_some();
        if had_session {
            info!("logged out");
        }
        had_session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.is_expired(now_nanos()))
    }

    /// The current session, dropping it if it has expired.
    pub fn identity(&mut self) -> IdentityResult<Option<&DelegationIdentity>> {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.is_expired(now_nanos()))
        {
            self.session = None;
            return Err(IdentityError::DelegationExpired);
        }
        Ok(self.session.as_ref())
    }
}

/// Stored browser session: the session key pair and its delegation chain.
#[derive(Debug, Deserialize)]
struct StoredSession {
    /// `[der_public_key_hex, secret_key_hex]`
    identity: (String, String),
    delegation: DelegationChain,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DelegationFile {
    Session(StoredSession),
    Chain(DelegationChain),
}

/// Reads a delegation obtained out of band (for example from a browser
/// login) from a JSON file.
///
/// The file holds either an object with `identity` (the session key pair)
/// and `delegation` fields, or a bare delegation chain. A bare chain has to
/// end at a key this provider handed out: the first login without a
/// matching chain generates a pending session key and fails with
/// `AuthorizationPending`; once a chain delegating to that key is written to
/// the file, the next login succeeds with it. The pending key lives in memory
/// only.
pub struct DelegationFileProvider {
    path: PathBuf,
    pending: Mutex<Option<Ed25519KeyIdentity>>,
}

impl DelegationFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DelegationFileProvider {
            path: path.into(),
            pending: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point the next login at another file.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// DER public key a bare chain must delegate to, once one was requested.
    pub fn pending_session_key(&self) -> Option<Vec<u8>> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Ed25519KeyIdentity::der_public_key)
    }

    /// Accept a bare chain that ends at the pending key (or the requested
    /// one); otherwise hand out a pending key for the user to delegate to.
    fn accept_chain(
        &self,
        chain: Option<DelegationChain>,
        request: &AuthorizeRequest,
    ) -> IdentityResult<Authorization> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(chain) = chain
            && let Some(target) = chain.delegations.last().map(|d| d.delegation.pubkey.clone())
        {
            if pending
                .as_ref()
                .is_some_and(|key| key.der_public_key() == target)
            {
                let session_key = pending.take();
                return Ok(Authorization { chain, session_key });
            }
            if target == request.session_public_key {
                return Ok(chain.into());
            }
        }

        let key = pending.get_or_insert_with(Ed25519KeyIdentity::random);
        let session_key = hex::encode(key.der_public_key());
        let url = format!("{}#authorize", request.identity_provider);
        info!(%url, %session_key, path = %self.path.display(), "waiting for a delegation");
        Err(IdentityError::AuthorizationPending {
            session_key,
            url,
            path: self.path.display().to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for DelegationFileProvider {
    async fn authorize(&self, request: AuthorizeRequest) -> IdentityResult<Authorization> {
        info!(
            url = %format!("{}#authorize", request.identity_provider),
            path = %self.path.display(),
            "reading delegation"
        );

        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return self.accept_chain(None, &request);
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<DelegationFile>(&json)? {
            DelegationFile::Chain(chain) => self.accept_chain(Some(chain), &request),
            DelegationFile::Session(stored) => {
                let (public_hex, secret_hex) = stored.identity;
                let secret = hex::decode(secret_hex.trim())
                    .map_err(|e| IdentityError::Provider(format!("session secret: {}", e)))?;
                let session_key = Ed25519KeyIdentity::from_secret_bytes(&secret)?;
                if hex::encode(session_key.der_public_key()) != public_hex.trim().to_lowercase() {
                    return Err(IdentityError::Provider(
                        "session public key does not match its secret".to_string(),
                    ));
                }
                Ok(Authorization {
                    chain: stored.delegation,
                    session_key: Some(session_key),
                })
            }
        }
    }
}
