//! TON wallet support for the panel
//!
//! - `Mnemonic`: TON 24-word phrases and key derivation
//! - `WalletV4R2`: state init, address, transfer body, signing
//! - `Transfer`: one outgoing internal message

pub mod codes;
pub mod error;
pub mod mnemonic;
pub mod transfer;
pub mod v4r2;
pub mod wallet;

// Re-exports
pub use error::{WalletError, WalletResult};
pub use mnemonic::Mnemonic;
pub use transfer::{Transfer, build_comment};
pub use v4r2::{WalletV4R2, default_subwallet_id};
pub use wallet::{Wallet, default_valid_until};

#[cfg(test)]
mod tests {
    use super::*;
    use ton_cell::{BagOfCells, MsgAddress};

    #[test]
    fn test_full_flow() {
        let mnemonic = Mnemonic::generate();
        let keypair = mnemonic.to_keypair();
        let wallet = WalletV4R2::new(keypair, 0).unwrap();
        let to = MsgAddress::Internal {
            workchain: 0,
            address: [7u8; 32],
        };
        let transfer = Transfer::new(to, 1_000_000)
            .with_comment("Test@1700000000000")
            .unwrap();
        let ext_msg = wallet
            .create_signed_transfer(0, &[transfer], default_valid_until(0, 0), true)
            .unwrap();
        let boc = BagOfCells::from_root(ext_msg.clone()).serialize_to_base64().unwrap();
        let parsed = BagOfCells::deserialize_from_base64(&boc).unwrap();
        assert_eq!(parsed.single_root().unwrap().hash(), ext_msg.hash());
    }

    #[test]
    fn test_mnemonic_roundtrip() {
        let mnemonic = Mnemonic::generate();
        let restored = Mnemonic::from_phrase(&mnemonic.to_phrase()).unwrap();
        assert_eq!(mnemonic.words(), restored.words());
        assert_eq!(
            mnemonic.to_keypair().public_key,
            restored.to_keypair().public_key
        );
    }
}
