//! TON cells, Bag of Cells and message addresses.
//!
//! The wallet only ever deals with ordinary cells: the V4R2 state init, the
//! signed transfer body, internal messages and the external message that is
//! pushed to the network as a BoC. Exotic cells (pruned branches, Merkle
//! proofs) are rejected on deserialization.
//!
//! # Example
//!
//! ```
//! use ton_cell::{BagOfCells, CellBuilder};
//!
//! let mut builder = CellBuilder::new();
//! builder.store_u32(0x12345678).unwrap();
//! builder.store_bytes(&[1, 2, 3, 4]).unwrap();
//! let cell = builder.build().unwrap();
//!
//! let bytes = BagOfCells::from_root(cell.clone()).serialize().unwrap();
//! let root = BagOfCells::deserialize(&bytes).unwrap();
//! assert_eq!(root.single_root().unwrap().hash(), cell.hash());
//! ```

use thiserror::Error;

mod address;
mod boc;
mod builder;
mod cell;
mod slice;

pub use address::{AddressFlags, MsgAddress};
pub use boc::BagOfCells;
pub use builder::CellBuilder;
pub use cell::Cell;
pub use slice::CellSlice;

/// Errors that can occur during Cell/BoC/address operations.
#[derive(Debug, Error)]
pub enum CellError {
    /// The cell data exceeds the maximum of 1023 bits.
    #[error("Cell data too long: {0} bits (max 1023)")]
    DataTooLong(usize),

    /// The cell has too many references (max 4).
    #[error("Too many cell references: {0} (max 4)")]
    TooManyRefs(usize),

    /// Invalid BoC format.
    #[error("Invalid BoC format: {0}")]
    InvalidBoc(String),

    /// Cell not found in BoC.
    #[error("Cell not found: index {0}")]
    CellNotFound(usize),

    /// CRC32-C checksum mismatch.
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// Unexpected end of data.
    #[error("Unexpected end of data")]
    UnexpectedEof,

    /// Not enough bits available.
    #[error("Not enough bits: need {need}, have {have}")]
    NotEnoughBits { need: usize, have: usize },

    /// Not enough references available.
    #[error("Not enough refs: need {need}, have {have}")]
    NotEnoughRefs { need: usize, have: usize },

    /// Invalid address format.
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Invalid base64 encoding.
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    /// Expected single root but found multiple or none.
    #[error("Expected single root, found {0}")]
    NotSingleRoot(usize),

    /// Invalid bit length for an integer store/load.
    #[error("Invalid bit length: {0}")]
    InvalidBitLength(usize),
}

/// Result type for Cell/BoC operations.
pub type CellResult<T> = Result<T, CellError>;

/// Maximum number of bits in a cell's data.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references a cell can have.
pub const MAX_CELL_REFS: usize = 4;

/// BoC magic for the generic `serialized_boc` format.
pub const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// CRC32-C (Castagnoli), as used by BoC trailers.
fn crc32c(data: &[u8]) -> u32 {
    const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
    CRC32C.checksum(data)
}
