//! Sequential reader over a cell.

use crate::{Cell, CellError, CellResult, MsgAddress};

/// A read cursor into a [`Cell`].
///
/// ```
/// use ton_cell::{CellBuilder, CellSlice};
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// let cell = builder.build().unwrap();
///
/// let mut slice = CellSlice::new(&cell);
/// assert_eq!(slice.load_u32().unwrap(), 0x12345678);
/// ```
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bit_offset: usize,
    ref_offset: usize,
}

impl<'a> CellSlice<'a> {
    pub fn new(cell: &'a Cell) -> Self {
        CellSlice {
            cell,
            bit_offset: 0,
            ref_offset: 0,
        }
    }

    pub fn bits_left(&self) -> usize {
        self.cell.bit_len() - self.bit_offset
    }

    pub fn refs_left(&self) -> usize {
        self.cell.reference_count() - self.ref_offset
    }

    pub fn load_bit(&mut self) -> CellResult<bool> {
        if self.bits_left() == 0 {
            return Err(CellError::NotEnoughBits { need: 1, have: 0 });
        }
        let bit = self.cell.bit_at(self.bit_offset);
        self.bit_offset += 1;
        Ok(bit)
    }

    /// Load an unsigned integer of up to 64 bits.
    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        if bits > self.bits_left() {
            return Err(CellError::NotEnoughBits {
                need: bits,
                have: self.bits_left(),
            });
        }
        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | self.load_bit()? as u64;
        }
        Ok(value)
    }

    pub fn load_u32(&mut self) -> CellResult<u32> {
        self.load_uint(32).map(|v| v as u32)
    }

    pub fn load_bytes(&mut self, len: usize) -> CellResult<Vec<u8>> {
        if len * 8 > self.bits_left() {
            return Err(CellError::NotEnoughBits {
                need: len * 8,
                have: self.bits_left(),
            });
        }
        (0..len).map(|_| self.load_uint(8).map(|b| b as u8)).collect()
    }

    /// Load a `VarUInteger 16` amount.
    pub fn load_coins(&mut self) -> CellResult<u128> {
        let len = self.load_uint(4)? as usize;
        let mut value = 0u128;
        for byte in self.load_bytes(len)? {
            value = (value << 8) | byte as u128;
        }
        Ok(value)
    }

    /// Load an `addr_none` or anycast-free `addr_std`.
    pub fn load_address(&mut self) -> CellResult<MsgAddress> {
        match self.load_uint(2)? {
            0b00 => Ok(MsgAddress::Null),
            0b10 => {
                if self.load_bit()? {
                    return Err(CellError::InvalidAddress("anycast is not supported".to_string()));
                }
                let workchain = self.load_uint(8)? as u8 as i8 as i32;
                let mut address = [0u8; 32];
                address.copy_from_slice(&self.load_bytes(32)?);
                Ok(MsgAddress::Internal { workchain, address })
            }
            tag => Err(CellError::InvalidAddress(format!(
                "unsupported address tag {:02b}",
                tag
            ))),
        }
    }

    pub fn load_ref(&mut self) -> CellResult<&'a Cell> {
        let cell: &'a Cell = self.cell;
        let reference = cell.reference(self.ref_offset).ok_or(CellError::NotEnoughRefs {
            need: 1,
            have: 0,
        })?;
        self.ref_offset += 1;
        Ok(reference.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellBuilder;

    #[test]
    fn test_not_enough_bits() {
        let mut builder = CellBuilder::new();
        builder.store_u8(1).unwrap();
        let cell = builder.build().unwrap();
        let mut slice = CellSlice::new(&cell);
        assert!(matches!(
            slice.load_u32(),
            Err(CellError::NotEnoughBits { need: 32, have: 8 })
        ));
    }

    #[test]
    fn test_missing_ref() {
        let cell = Cell::empty();
        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.refs_left(), 0);
        assert!(slice.load_ref().is_err());
    }

    #[test]
    fn test_null_address() {
        let mut builder = CellBuilder::new();
        builder.store_address(&MsgAddress::Null).unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(CellSlice::new(&cell).load_address().unwrap(), MsgAddress::Null);
    }
}
