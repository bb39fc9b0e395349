//! Delegation chains.
//!
//! An identity provider signs a delegation from the user's root key to a
//! short-lived session key. The JSON layout matches what browser auth
//! clients store: hex blobs, expiration as hex nanoseconds.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{IdentityError, IdentityResult};
use crate::identity::{Ed25519KeyIdentity, der_decode_ed25519};
use crate::principal::Principal;

/// Domain separator prepended to a delegation's hash before signing.
const DELEGATION_DOMAIN: &[u8] = b"\x1Aic-request-auth-delegation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    #[serde(with = "hex")]
    pub pubkey: Vec<u8>,
    /// Nanoseconds since the unix epoch.
    #[serde(with = "hex_u64")]
    pub expiration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex_targets")]
    pub targets: Option<Vec<Principal>>,
}

impl Delegation {
    /// Bytes the delegating key signs.
    pub fn signable(&self) -> Vec<u8> {
        let mut fields = vec![
            field_hash("pubkey", &blob_hash(&self.pubkey)),
            field_hash("expiration", &blob_hash(&leb128(self.expiration))),
        ];
        if let Some(targets) = &self.targets {
            let mut concat = Vec::new();
            for target in targets {
                concat.extend_from_slice(&blob_hash(target.as_slice()));
            }
            fields.push(field_hash("targets", &blob_hash(&concat)));
        }
        fields.sort();

        let mut message = DELEGATION_DOMAIN.to_vec();
        message.extend_from_slice(&blob_hash(&fields.concat()));
        message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegation {
    pub delegation: Delegation,
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationChain {
    pub delegations: Vec<SignedDelegation>,
    /// DER public key of the root (user) identity.
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
}

impl DelegationChain {
    pub fn from_json(json: &str) -> IdentityResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> IdentityResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Principal of the root key, i.e. the user's identity.
    pub fn principal(&self) -> Principal {
        Principal::self_authenticating(&self.public_key)
    }

    /// Earliest expiration in the chain (nanoseconds).
    pub fn expiration(&self) -> Option<u64> {
        self.delegations
            .iter()
            .map(|d| d.delegation.expiration)
            .min()
    }

    pub fn is_expired(&self, now_ns: u64) -> bool {
        self.expiration().is_none_or(|exp| exp <= now_ns)
    }

    /// Check that the chain is non-empty, unexpired and ends at `session_der`,
    /// then verify every link whose signer is an Ed25519 key.
    ///
    /// Links signed by other key types (canister signatures) are left to
    /// the replica, which checks them on every call.
    pub fn validate(&self, session_der: &[u8], now_ns: u64) -> IdentityResult<()> {
        let last = self
            .delegations
            .last()
            .ok_or(IdentityError::EmptyDelegationChain)?;
        if last.delegation.pubkey != session_der {
            return Err(IdentityError::SessionKeyMismatch);
        }
        if self.is_expired(now_ns) {
            return Err(IdentityError::DelegationExpired);
        }

        let mut signer = self.public_key.as_slice();
        for (index, signed) in self.delegations.iter().enumerate() {
            match der_decode_ed25519(signer) {
                Ok(raw) => {
                    let signature: [u8; 64] = signed
                        .signature
                        .as_slice()
                        .try_into()
                        .map_err(|_| IdentityError::InvalidDelegationSignature(index))?;
                    ton_crypto::verify_signature(&raw, &signed.delegation.signable(), &signature)
                        .map_err(|_| IdentityError::InvalidDelegationSignature(index))?;
                }
                Err(_) => debug!(index, "skipping non-Ed25519 delegation signer"),
            }
            signer = signed.delegation.pubkey.as_slice();
        }
        Ok(())
    }

    /// Sign a delegation from `from` to `to`, valid until `expiration`.
    pub fn delegate(
        from: &Ed25519KeyIdentity,
        to: &Ed25519KeyIdentity,
        expiration: u64,
        targets: Option<Vec<Principal>>,
    ) -> Self {
        let delegation = Delegation {
            pubkey: to.der_public_key(),
            expiration,
            targets,
        };
        let signature = from.sign(&delegation.signable()).to_vec();
        DelegationChain {
            delegations: vec![SignedDelegation {
                delegation,
                signature,
            }],
            public_key: from.der_public_key(),
        }
    }
}

/// A session key acting on behalf of the chain's root identity.
#[derive(Debug, Clone)]
pub struct DelegationIdentity {
    session: Ed25519KeyIdentity,
    chain: DelegationChain,
}

impl DelegationIdentity {
    /// Pair a session key with its chain, validating it against `now_ns`.
    pub fn new(
        session: Ed25519KeyIdentity,
        chain: DelegationChain,
        now_ns: u64,
    ) -> IdentityResult<Self> {
        chain.validate(&session.der_public_key(), now_ns)?;
        Ok(DelegationIdentity { session, chain })
    }

    pub fn session(&self) -> &Ed25519KeyIdentity {
        &self.session
    }

    pub fn chain(&self) -> &DelegationChain {
        &self.chain
    }

    pub fn principal(&self) -> Principal {
        self.chain.principal()
    }

    pub fn is_expired(&self, now_ns: u64) -> bool {
        self.chain.is_expired(now_ns)
    }
}

/// Current time in nanoseconds since the unix epoch.
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn blob_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

fn field_hash(key: &str, value_hash: &[u8; 32]) -> Vec<u8> {
    let mut out = blob_hash(key.as_bytes()).to_vec();
    out.extend_from_slice(value_hash);
    out
}

fn leb128(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

mod hex_u64 {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        u64::from_str_radix(&text, 16).map_err(de::Error::custom)
    }
}

mod hex_targets {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use crate::principal::Principal;

    pub fn serialize<S: Serializer>(
        targets: &Option<Vec<Principal>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let encoded: Option<Vec<String>> = targets
            .as_ref()
            .map(|t| t.iter().map(|p| hex::encode(p.as_slice())).collect());
        serde::Serialize::serialize(&encoded, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Principal>>, D::Error> {
        let Some(encoded) = Option::<Vec<String>>::deserialize(deserializer)? else {
            return Ok(None);
        };
        encoded
            .iter()
            .map(|text| {
                let bytes = hex::decode(text).map_err(de::Error::custom)?;
                Principal::from_slice(&bytes).map_err(de::Error::custom)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
