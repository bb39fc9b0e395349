//! CellBuilder for constructing TON cells.

use std::sync::Arc;

use crate::{Cell, CellError, CellResult, MsgAddress, MAX_CELL_BITS, MAX_CELL_REFS};

/// Builder for ordinary cells.
///
/// ```
/// use ton_cell::CellBuilder;
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0).unwrap().store_coins(1_000_000).unwrap();
/// let cell = builder.build().unwrap();
/// assert_eq!(cell.bit_len(), 32 + 4 + 24);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    references: Vec<Arc<Cell>>,
}

impl CellBuilder {
    pub fn new() -> Self {
        CellBuilder {
            data: Vec::with_capacity(128),
            bit_len: 0,
            references: Vec::new(),
        }
    }

    fn ensure_bits(&self, extra: usize) -> CellResult<()> {
        if self.bit_len + extra > MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + extra));
        }
        Ok(())
    }

    /// Store a single bit.
    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        self.ensure_bits(1)?;
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            self.data[self.bit_len / 8] |= 1 << (7 - self.bit_len % 8);
        }
        self.bit_len += 1;
        Ok(self)
    }

    /// Store `bits` low-order bits of `value`, most significant first.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.ensure_bits(bits)?;
        for i in (0..bits).rev() {
            self.store_bit((value >> i) & 1 == 1)?;
        }
        Ok(self)
    }

    /// Store a two's complement signed integer of `bits` width.
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        self.store_uint(value as u64, bits)
    }

    pub fn store_u8(&mut self, value: u8) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 8)
    }

    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 32)
    }

    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.store_uint(value, 64)
    }

    pub fn store_i8(&mut self, value: i8) -> CellResult<&mut Self> {
        self.store_int(value as i64, 8)
    }

    /// Store raw bytes.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        self.ensure_bits(bytes.len() * 8)?;
        if self.bit_len % 8 == 0 {
            self.data.extend_from_slice(bytes);
            self.bit_len += bytes.len() * 8;
            return Ok(self);
        }
        for &byte in bytes {
            self.store_uint(byte as u64, 8)?;
        }
        Ok(self)
    }

    /// Store an amount as `VarUInteger 16`: a 4-bit byte length followed by
    /// the big-endian value.
    pub fn store_coins(&mut self, nanotons: u128) -> CellResult<&mut Self> {
        let len = (128 - nanotons.leading_zeros() as usize).div_ceil(8);
        if len > 15 {
            return Err(CellError::DataTooLong(len * 8 + 4));
        }
        self.store_uint(len as u64, 4)?;
        let bytes = nanotons.to_be_bytes();
        self.store_bytes(&bytes[16 - len..])
    }

    /// Store a `MsgAddress` (`addr_none$00` or `addr_std$10` without anycast).
    pub fn store_address(&mut self, addr: &MsgAddress) -> CellResult<&mut Self> {
        match addr {
            MsgAddress::Null => self.store_uint(0b00, 2),
            MsgAddress::Internal { workchain, address } => {
                self.store_uint(0b10, 2)?;
                self.store_bit(false)?;
                self.store_int(*workchain as i64, 8)?;
                self.store_bytes(address)
            }
        }
    }

    /// Store a reference to another cell.
    pub fn store_ref(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        if self.references.len() >= MAX_CELL_REFS {
            return Err(CellError::TooManyRefs(self.references.len() + 1));
        }
        self.references.push(cell);
        Ok(self)
    }

    /// Append all bits and references of `cell`.
    pub fn store_cell_contents(&mut self, cell: &Cell) -> CellResult<&mut Self> {
        self.ensure_bits(cell.bit_len())?;
        for i in 0..cell.bit_len() {
            self.store_bit(cell.bit_at(i))?;
        }
        for reference in cell.references() {
            self.store_ref(reference.clone())?;
        }
        Ok(self)
    }

    pub fn bits_left(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Finish the cell.
    pub fn build(self) -> CellResult<Cell> {
        Ok(Cell::new(self.data, self.bit_len, self.references))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellSlice;

    #[test]
    fn test_store_bits_layout() {
        let mut builder = CellBuilder::new();
        builder.store_bit(true).unwrap();
        builder.store_bit(false).unwrap();
        builder.store_bit(true).unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(cell.data(), &[0b1010_0000]);
        assert_eq!(cell.bit_len(), 3);
    }

    #[test]
    fn test_unaligned_bytes() {
        let mut builder = CellBuilder::new();
        builder.store_bit(true).unwrap();
        builder.store_bytes(&[0xFF, 0x00]).unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(cell.data(), &[0xFF, 0x80, 0x00]);
        assert_eq!(cell.bit_len(), 17);
    }

    #[test]
    fn test_coins_encoding() {
        let mut zero = CellBuilder::new();
        zero.store_coins(0).unwrap();
        assert_eq!(zero.bit_len(), 4);

        // 0.001 TON = 1_000_000 nanotons = 0x0F4240, three bytes.
        let mut milli = CellBuilder::new();
        milli.store_coins(1_000_000).unwrap();
        let cell = milli.build().unwrap();
        assert_eq!(cell.bit_len(), 4 + 24);
        assert_eq!(CellSlice::new(&cell).load_coins().unwrap(), 1_000_000);
    }

    #[test]
    fn test_overflow_rejected() {
        let mut builder = CellBuilder::new();
        builder.store_bytes(&[0u8; 127]).unwrap();
        builder.store_uint(0, 7).unwrap();
        assert!(matches!(builder.store_bit(true), Err(CellError::DataTooLong(1024))));
    }

    #[test]
    fn test_too_many_refs() {
        let mut builder = CellBuilder::new();
        for _ in 0..4 {
            builder.store_ref(Arc::new(Cell::empty())).unwrap();
        }
        assert!(matches!(
            builder.store_ref(Arc::new(Cell::empty())),
            Err(CellError::TooManyRefs(5))
        ));
    }

    #[test]
    fn test_store_address_std() {
        let mut builder = CellBuilder::new();
        builder
            .store_address(&MsgAddress::Internal {
                workchain: -1,
                address: [0xAB; 32],
            })
            .unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(cell.bit_len(), 267);

        let mut slice = CellSlice::new(&cell);
        assert_eq!(
            slice.load_address().unwrap(),
            MsgAddress::Internal {
                workchain: -1,
                address: [0xAB; 32]
            }
        );
    }

    #[test]
    fn test_store_cell_contents() {
        let mut inner = CellBuilder::new();
        inner.store_uint(0b101, 3).unwrap();
        inner.store_ref(Arc::new(Cell::empty())).unwrap();
        let inner = inner.build().unwrap();

        let mut outer = CellBuilder::new();
        outer.store_u8(0xAA).unwrap();
        outer.store_cell_contents(&inner).unwrap();
        let outer = outer.build().unwrap();
        assert_eq!(outer.bit_len(), 11);
        assert_eq!(outer.data(), &[0xAA, 0b1010_0000]);
        assert_eq!(outer.reference_count(), 1);
    }
}
