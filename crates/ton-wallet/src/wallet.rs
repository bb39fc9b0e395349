//! Wallet trait definition

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, MsgAddress};

use crate::error::WalletResult;
use crate::transfer::Transfer;

/// Seconds a signed transfer stays valid once the wallet is deployed.
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

/// `valid_until` for a transfer signed at `now` (unix seconds).
///
/// The first transfer of an undeployed wallet (seqno 0) never expires.
pub fn default_valid_until(seqno: u32, now: u64) -> u32 {
    if seqno == 0 {
        u32::MAX
    } else {
        (now as u32).saturating_add(DEFAULT_TIMEOUT_SECS)
    }
}

/// Common wallet interface
pub trait Wallet: Send + Sync {
    /// Get wallet version name
    fn version(&self) -> &'static str;

    /// Get wallet address
    fn address(&self) -> &MsgAddress;

    /// Get public key
    fn public_key(&self) -> &[u8; 32];

    /// Get workchain
    fn workchain(&self) -> i32;

    /// Get state init cell for deployment
    fn state_init(&self) -> WalletResult<Cell>;

    /// Create unsigned transfer message body
    fn create_transfer_body(
        &self,
        seqno: u32,
        transfers: &[Transfer],
        valid_until: u32,
    ) -> WalletResult<Cell>;

    /// Sign a message body
    fn sign(&self, body: &Cell) -> WalletResult<Cell>;

    /// Wrap a signed body into an inbound external message.
    ///
    /// `with_state_init` must be set while the account is not yet active so
    /// the first message deploys the contract.
    fn create_external_message(&self, signed_body: &Cell, with_state_init: bool) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();

        // ext_in_msg_info$10 src:addr_none$00
        builder.store_uint(0b10, 2)?;
        builder.store_uint(0b00, 2)?;
        builder.store_address(self.address())?;
        // import_fee
        builder.store_coins(0)?;

        // init:(Maybe (Either StateInit ^StateInit))
        if with_state_init {
            builder.store_bit(true)?;
            builder.store_bit(true)?;
            builder.store_ref(Arc::new(self.state_init()?))?;
        } else {
            builder.store_bit(false)?;
        }

        // body:(Either X ^X)
        builder.store_bit(true)?;
        builder.store_ref(Arc::new(signed_body.clone()))?;

        builder.build().map_err(Into::into)
    }

    /// Body, signature and external envelope in one step.
    fn create_signed_transfer(
        &self,
        seqno: u32,
        transfers: &[Transfer],
        valid_until: u32,
        with_state_init: bool,
    ) -> WalletResult<Cell> {
        let body = self.create_transfer_body(seqno, transfers, valid_until)?;
        let signed = self.sign(&body)?;
        self.create_external_message(&signed, with_state_init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_until() {
        assert_eq!(default_valid_until(0, 1_700_000_000), u32::MAX);
        assert_eq!(default_valid_until(3, 1_700_000_000), 1_700_000_060);
    }
}
