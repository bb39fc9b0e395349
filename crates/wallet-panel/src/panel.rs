//! The wallet panel.
//!
//! Four display fields (identity, balance, send, transactions) are driven
//! by user actions. Every action stores either its result or
//! `Error in <action>: <error>` in its field; nothing is returned as an
//! error to the caller.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use icp_identity::{
    AuthClient, Ed25519KeyIdentity, IdentityProvider, Principal, der_encode_ed25519,
};
use serde::Serialize;
use tracing::{info, warn};
use ton_cell::{BagOfCells, MsgAddress};
use ton_crypto::{Ed25519Keypair, random_bytes_32};
use ton_http::ChainClient;
use ton_wallet::{
    Mnemonic, Transfer, Wallet, WalletV4R2, default_subwallet_id, default_valid_until,
};

use crate::backend::Backend;
use crate::config::PanelConfig;
use crate::error::{PanelError, PanelResult};
use crate::format::{balance_from_response, format_nanotons};

/// Initial content of every display field.
pub const PLACEHOLDER: &str = "...";
pub const LOADING: &str = "Loading...";
pub const LOGGING_IN: &str = "Logging in...";
pub const CHECKING: &str = "Checking session...";
pub const NO_SESSION: &str = "No session found.";
pub const SESSION_DROPPED: &str = "Previous session found. Logging out... Done";

/// Where the current wallet key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    Generated,
    Mnemonic,
    SecretKey,
    WatchOnly,
    IdentityProvider,
}

/// The wallet the panel currently acts for. Lives in memory only.
#[derive(Clone)]
pub struct WalletIdentity {
    pub chain_address: MsgAddress,
    /// User-friendly form of `chain_address`, as displayed and queried.
    pub address_text: String,
    pub icp_principal: Principal,
    pub public_key: [u8; 32],
    pub secret_key_material: Option<Ed25519Keypair>,
    pub source: IdentitySource,
}

impl WalletIdentity {
    /// Identity for a key the panel can sign with.
    pub fn from_keypair(
        keypair: Ed25519Keypair,
        principal: Principal,
        source: IdentitySource,
        config: &PanelConfig,
    ) -> PanelResult<Self> {
        let mut identity = Self::watch_only(keypair.public_key, principal, config)?;
        identity.secret_key_material = Some(keypair);
        identity.source = source;
        Ok(identity)
    }

    /// Identity for a public key alone.
    pub fn watch_only(
        public_key: [u8; 32],
        principal: Principal,
        config: &PanelConfig,
    ) -> PanelResult<Self> {
        let chain_address = WalletV4R2::calculate_address(
            &public_key,
            config.workchain,
            default_subwallet_id(config.workchain),
        )?;
        let address_text = chain_address
            .to_user_friendly(config.address_flags())
            .unwrap_or_else(|| chain_address.to_raw_string());
        Ok(WalletIdentity {
            chain_address,
            address_text,
            icp_principal: principal,
            public_key,
            secret_key_material: None,
            source: IdentitySource::WatchOnly,
        })
    }

    /// Principal derived from the wallet key itself.
    pub fn key_principal(public_key: &[u8; 32]) -> Principal {
        Principal::self_authenticating(&der_encode_ed25519(public_key))
    }

    /// The four-line summary shown in the identity field.
    pub fn summary(&self) -> String {
        let secret = match &self.secret_key_material {
            Some(keypair) => hex::encode(keypair.seed()),
            None => "(watch-only)".to_string(),
        };
        format!(
            "TON Address: {}\nPrincipal: {}\nPublic Key: {}\nSecret Key: {}",
            self.address_text,
            self.icp_principal,
            hex::encode(self.public_key),
            secret
        )
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("chain_address", &self.address_text)
            .field("icp_principal", &self.icp_principal)
            .field("public_key", &hex::encode(self.public_key))
            .field(
                "secret_key_material",
                &self.secret_key_material.as_ref().map(|_| "[REDACTED]"),
            )
            .field("source", &self.source)
            .finish()
    }
}

/// Display state of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub identity: String,
    pub balance: String,
    pub send: String,
    pub transactions: String,
    /// Destination input of the send form.
    pub destination: String,
}

impl PanelView {
    pub fn new(destination: &str) -> Self {
        PanelView {
            identity: PLACEHOLDER.to_string(),
            balance: PLACEHOLDER.to_string(),
            send: PLACEHOLDER.to_string(),
            transactions: PLACEHOLDER.to_string(),
            destination: destination.to_string(),
        }
    }
}

/// Wallet panel over a backend proxy, a chain client and an identity provider.
pub struct WalletPanel<B, C, P> {
    config: PanelConfig,
    backend: B,
    chain: C,
    auth: AuthClient<P>,
    identity: Option<WalletIdentity>,
    view: PanelView,
}

impl<B, C, P> WalletPanel<B, C, P>
where
    B: Backend,
    C: ChainClient,
    P: IdentityProvider,
{
    pub fn new(config: PanelConfig, backend: B, chain: C, provider: P) -> Self {
        let auth = AuthClient::new(
            provider,
            config.identity_provider_url.clone(),
            Duration::from_secs(config.max_time_to_live_secs),
        );
        let view = PanelView::new(&config.default_destination);
        WalletPanel {
            config,
            backend,
            chain,
            auth,
            identity: None,
            view,
        }
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    pub fn identity(&self) -> Option<&WalletIdentity> {
        self.identity.as_ref()
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn provider_mut(&mut self) -> &mut P {
        self.auth.provider_mut()
    }

    /// Generate a fresh key and make it the current wallet.
    pub fn create_wallet(&mut self) -> &str {
        self.view.identity = LOADING.to_string();
        let key = Ed25519KeyIdentity::generate(random_bytes_32());
        let result = WalletIdentity::from_keypair(
            key.keypair().clone(),
            key.principal(),
            IdentitySource::Generated,
            &self.config,
        );
        self.load_identity("create_wallet", result)
    }

    /// Import a 24-word TON mnemonic. `strict` also requires the phrase to
    /// pass the TON seed check.
    pub fn import_mnemonic(&mut self, phrase: &str, strict: bool) -> &str {
        self.view.identity = LOADING.to_string();
        let result = self.identity_from_mnemonic(phrase, strict);
        self.load_identity("import_mnemonic", result)
    }

    fn identity_from_mnemonic(&self, phrase: &str, strict: bool) -> PanelResult<WalletIdentity> {
        let mnemonic = if strict {
            Mnemonic::from_phrase_validated(phrase)?
        } else {
            Mnemonic::from_phrase(phrase)?
        };
        let keypair = mnemonic.to_keypair();
        let principal = WalletIdentity::key_principal(&keypair.public_key);
        WalletIdentity::from_keypair(keypair, principal, IdentitySource::Mnemonic, &self.config)
    }

    /// Import a hex secret key (32-byte seed or 64-byte `seed || public`).
    pub fn import_secret_key(&mut self, secret_hex: &str) -> &str {
        self.view.identity = LOADING.to_string();
        let result = decode_hex(secret_hex).and_then(|bytes| {
            let key = Ed25519KeyIdentity::from_secret_bytes(&bytes)?;
            WalletIdentity::from_keypair(
                key.keypair().clone(),
                key.principal(),
                IdentitySource::SecretKey,
                &self.config,
            )
        });
        self.load_identity("import_secret_key", result)
    }

    /// Track the wallet of a public key without being able to send.
    pub fn watch_address(&mut self, public_key_hex: &str) -> &str {
        self.view.identity = LOADING.to_string();
        let result = decode_hex(public_key_hex).and_then(|bytes| {
            let public_key: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| PanelError::InvalidHex(format!("expected 32 bytes, got {}", bytes.len())))?;
            let principal = WalletIdentity::key_principal(&public_key);
            WalletIdentity::watch_only(public_key, principal, &self.config)
        });
        self.load_identity("watch_address", result)
    }

    /// Log in through the identity provider. A successful login replaces
    /// whatever wallet was loaded before.
    pub async fn login(&mut self) -> &str {
        self.view.identity = LOGGING_IN.to_string();
        if self.auth.logout() {
            self.drop_session_identity();
            self.view.identity = SESSION_DROPPED.to_string();
        }

        let result = match self.auth.login().await {
            Ok(delegation) => WalletIdentity::from_keypair(
                delegation.session().keypair().clone(),
                delegation.principal(),
                IdentitySource::IdentityProvider,
                &self.config,
            ),
            Err(e) => Err(e.into()),
        };
        self.load_identity("login", result)
    }

    /// Drop the provider session, if any. Never an error.
    pub fn logout(&mut self) -> &str {
        self.view.identity = if self.auth.logout() {
            self.drop_session_identity();
            SESSION_DROPPED.to_string()
        } else {
            NO_SESSION.to_string()
        };
        &self.view.identity
    }

    /// Re-derive the wallet from the current provider session.
    pub fn check_identity(&mut self) -> &str {
        self.view.identity = CHECKING.to_string();
        let session = self.auth.identity().map(|current| {
            current.map(|d| (d.session().keypair().clone(), d.principal()))
        });

        let result = match session {
            Ok(None) => {
                self.view.identity = NO_SESSION.to_string();
                return &self.view.identity;
            }
            Ok(Some((keypair, principal))) => WalletIdentity::from_keypair(
                keypair,
                principal,
                IdentitySource::IdentityProvider,
                &self.config,
            ),
            Err(e) => {
                self.drop_session_identity();
                Err(e.into())
            }
        };

        self.view.identity = match result {
            Ok(identity) => {
                let summary = format!("Current session:\n{}", identity.summary());
                self.identity = Some(identity);
                summary
            }
            Err(e) => format!("Error in check_identity: {}", e),
        };
        &self.view.identity
    }

    /// Query the backend for the current wallet's balance.
    pub async fn get_balance(&mut self) -> &str {
        self.view.balance = LOADING.to_string();
        self.view.balance = match self.try_get_balance().await {
            Ok(nanotons) => format!("{} TON", format_nanotons(nanotons)),
            Err(e) => {
                warn!(error = %e, "balance query failed");
                format!("Error in get_balance: {}", e)
            }
        };
        &self.view.balance
    }

    async fn try_get_balance(&self) -> PanelResult<u128> {
        let address = self.current_address()?;
        let body = self.backend.token_balance(address).await?;
        balance_from_response(&body)
    }

    /// Query the backend for transactions; the body is shown verbatim.
    pub async fn get_transactions(&mut self) -> &str {
        self.view.transactions = LOADING.to_string();
        self.view.transactions = match self.try_get_transactions().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "transaction query failed");
                format!("Error in get_transactions: {}", e)
            }
        };
        &self.view.transactions
    }

    async fn try_get_transactions(&self) -> PanelResult<String> {
        let address = self.current_address()?;
        self.backend.token_transactions(address).await
    }

    pub fn set_destination(&mut self, destination: &str) {
        self.view.destination = destination.to_string();
    }

    /// Send the configured amount to the destination input.
    ///
    /// An unparseable destination stops here, before the chain is contacted.
    pub async fn send_ton(&mut self) -> &str {
        self.view.send = LOADING.to_string();
        let destination = self.view.destination.trim().to_string();

        let (to, flags) = match MsgAddress::parse(&destination) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.view.send = format!("Error in send_ton: {} is not valid. ({})", destination, e);
                return &self.view.send;
            }
        };

        self.view.send = match self.try_send(to, flags.bounceable).await {
            Ok(hash) => format!(
                "Done. Message hash: {}. Explorer: {}{}",
                hash, self.config.explorer_url, destination
            ),
            Err(e) => {
                warn!(error = %e, "send failed");
                format!("Error in send_ton: {}", e)
            }
        };
        &self.view.send
    }

    async fn try_send(&self, to: MsgAddress, bounce: bool) -> PanelResult<String> {
        let identity = self.identity.as_ref().ok_or(PanelError::NoWallet)?;
        let keypair = identity
            .secret_key_material
            .clone()
            .ok_or(PanelError::NoSecretKey)?;
        let wallet = WalletV4R2::new(keypair, self.config.workchain)?;
        let address = wallet.address().to_raw_string();

        let state = self.chain.account_state(&address).await?;
        let deployed = state.is_active();
        let seqno = if deployed {
            self.chain.get_seqno(&address).await?
        } else {
            0
        };

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let comment = format!("{}@{}", self.config.transfer_comment, now.as_millis());
        let transfer = Transfer::new(to, u128::from(self.config.transfer_amount))
            .with_bounce(bounce)
            .with_mode(self.config.send_mode)
            .with_comment(&comment)?;

        let valid_until = default_valid_until(seqno, now.as_secs());
        let message = wallet.create_signed_transfer(seqno, &[transfer], valid_until, !deployed)?;
        let boc = BagOfCells::from_root(message.clone()).serialize_to_base64()?;
        self.chain.send_boc(&boc).await?;

        let hash = hex::encode(message.hash());
        info!(seqno, deployed, %hash, "transfer submitted");
        Ok(hash)
    }

    fn current_address(&self) -> PanelResult<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.address_text.as_str())
            .ok_or(PanelError::NoWallet)
    }

    fn load_identity(&mut self, action: &str, result: PanelResult<WalletIdentity>) -> &str {
        self.view.identity = match result {
            Ok(identity) => {
                info!(address = %identity.address_text, source = ?identity.source, "wallet loaded");
                let summary = identity.summary();
                self.identity = Some(identity);
                summary
            }
            Err(e) => {
                warn!(action, error = %e, "wallet load failed");
                format!("Error in {}: {}", action, e)
            }
        };
        &self.view.identity
    }

    /// Forget a wallet whose key came from the provider session.
    fn drop_session_identity(&mut self) {
        if self
            .identity
            .as_ref()
            .is_some_and(|i| i.source == IdentitySource::IdentityProvider)
        {
            self.identity = None;
        }
    }
}

fn decode_hex(text: &str) -> PanelResult<Vec<u8>> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(text).map_err(|e| PanelError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex(" 0x0aff ").unwrap(), vec![0x0a, 0xff]);
        assert!(matches!(decode_hex("abc"), Err(PanelError::InvalidHex(_))));
    }

    #[test]
    fn test_watch_only_summary() {
        let config = PanelConfig::default();
        let public_key = [7u8; 32];
        let identity = WalletIdentity::watch_only(
            public_key,
            WalletIdentity::key_principal(&public_key),
            &config,
        )
        .unwrap();
        let summary = identity.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("TON Address: UQ"));
        assert_eq!(lines[2], format!("Public Key: {}", hex::encode(public_key)));
        assert_eq!(lines[3], "Secret Key: (watch-only)");
    }
}
