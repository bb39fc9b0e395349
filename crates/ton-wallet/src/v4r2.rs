//! Wallet V4R2

use std::sync::Arc;

use tracing::debug;
use ton_cell::{Cell, CellBuilder, MsgAddress};
use ton_crypto::Ed25519Keypair;

use crate::codes::wallet_v4r2_code;
use crate::error::{WalletError, WalletResult};
use crate::transfer::Transfer;
use crate::wallet::Wallet;

/// Base subwallet ID; the workchain is added to it.
pub const DEFAULT_SUBWALLET_ID: u32 = 698_983_191;

/// Messages a single V4 transfer may carry.
pub const MAX_TRANSFERS: usize = 4;

/// Wallet V4 revision 2
pub struct WalletV4R2 {
    keypair: Ed25519Keypair,
    workchain: i32,
    subwallet_id: u32,
    address: MsgAddress,
}

impl WalletV4R2 {
    /// Create new wallet
    pub fn new(keypair: Ed25519Keypair, workchain: i32) -> WalletResult<Self> {
        Self::with_subwallet(keypair, workchain, default_subwallet_id(workchain))
    }

    /// Create wallet with custom subwallet ID
    pub fn with_subwallet(
        keypair: Ed25519Keypair,
        workchain: i32,
        subwallet_id: u32,
    ) -> WalletResult<Self> {
        let address = Self::calculate_address(&keypair.public_key, workchain, subwallet_id)?;
        Ok(Self {
            keypair,
            workchain,
            subwallet_id,
            address,
        })
    }

    /// Address of the wallet owned by `pubkey`; needs no secret key.
    pub fn calculate_address(
        pubkey: &[u8; 32],
        workchain: i32,
        subwallet_id: u32,
    ) -> WalletResult<MsgAddress> {
        let state_init = Self::create_state_init_static(pubkey, subwallet_id)?;
        Ok(MsgAddress::Internal {
            workchain,
            address: state_init.hash(),
        })
    }

    fn create_state_init_static(pubkey: &[u8; 32], subwallet_id: u32) -> WalletResult<Cell> {
        let code = wallet_v4r2_code()?;

        // seqno:32 subwallet_id:32 public_key:256 plugins:(HashmapE 256 ..)
        let mut data_builder = CellBuilder::new();
        data_builder.store_u32(0)?;
        data_builder.store_u32(subwallet_id)?;
        data_builder.store_bytes(pubkey)?;
        data_builder.store_bit(false)?;
        let data = data_builder.build()?;

        // split_depth:0 special:0 code:1 data:1 library:0
        let mut si_builder = CellBuilder::new();
        si_builder.store_bit(false)?;
        si_builder.store_bit(false)?;
        si_builder.store_bit(true)?;
        si_builder.store_ref(code)?;
        si_builder.store_bit(true)?;
        si_builder.store_ref(Arc::new(data))?;
        si_builder.store_bit(false)?;
        si_builder.build().map_err(Into::into)
    }

    /// Get subwallet ID
    pub fn subwallet_id(&self) -> u32 {
        self.subwallet_id
    }

    pub fn keypair(&self) -> &Ed25519Keypair {
        &self.keypair
    }

    fn build_internal_message(&self, transfer: &Transfer) -> WalletResult<Cell> {
        if !matches!(transfer.to, MsgAddress::Internal { .. }) {
            return Err(WalletError::InvalidDestination);
        }

        let mut builder = CellBuilder::new();

        // int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
        builder.store_bit(false)?;
        builder.store_bit(true)?;
        builder.store_bit(transfer.bounce)?;
        builder.store_bit(false)?;

        // src: addr_none (filled in by the contract)
        builder.store_uint(0b00, 2)?;
        builder.store_address(&transfer.to)?;
        builder.store_coins(transfer.amount)?;
        // no extra currencies
        builder.store_bit(false)?;

        // ihr_fee fwd_fee created_lt created_at
        builder.store_coins(0)?;
        builder.store_coins(0)?;
        builder.store_u64(0)?;
        builder.store_u32(0)?;

        // no init
        builder.store_bit(false)?;

        if let Some(ref payload) = transfer.payload {
            builder.store_bit(true)?;
            builder.store_ref(payload.clone())?;
        } else {
            builder.store_bit(false)?;
        }

        builder.build().map_err(Into::into)
    }
}

/// `698983191 + workchain`, wrapping like the contract's 32-bit field.
pub fn default_subwallet_id(workchain: i32) -> u32 {
    DEFAULT_SUBWALLET_ID.wrapping_add(workchain as u32)
}

impl Wallet for WalletV4R2 {
    fn version(&self) -> &'static str {
        "v4r2"
    }

    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn public_key(&self) -> &[u8; 32] {
        &self.keypair.public_key
    }

    fn workchain(&self) -> i32 {
        self.workchain
    }

    fn state_init(&self) -> WalletResult<Cell> {
        Self::create_state_init_static(&self.keypair.public_key, self.subwallet_id)
    }

    fn create_transfer_body(
        &self,
        seqno: u32,
        transfers: &[Transfer],
        valid_until: u32,
    ) -> WalletResult<Cell> {
        if transfers.len() > MAX_TRANSFERS {
            return Err(WalletError::TooManyTransfers {
                max: MAX_TRANSFERS,
                got: transfers.len(),
            });
        }

        let mut builder = CellBuilder::new();

        // subwallet_id:32 valid_until:32 seqno:32 op:8 [mode:8 message:^Cell]*
        builder.store_u32(self.subwallet_id)?;
        builder.store_u32(valid_until)?;
        builder.store_u32(seqno)?;
        builder.store_u8(0)?;

        for transfer in transfers {
            builder.store_u8(transfer.mode)?;
            let msg = self.build_internal_message(transfer)?;
            builder.store_ref(Arc::new(msg))?;
        }

        debug!(seqno, valid_until, messages = transfers.len(), "built v4r2 transfer body");
        builder.build().map_err(Into::into)
    }

    fn sign(&self, body: &Cell) -> WalletResult<Cell> {
        let signature = self.keypair.sign(&body.hash());

        let mut builder = CellBuilder::new();
        builder.store_bytes(&signature)?;
        builder.store_cell_contents(body)?;
        builder.build().map_err(Into::into)
    }
}
