//! Ordinary TON cells.
//!
//! A cell holds up to 1023 data bits and up to four references. Its
//! representation hash is `sha256(d1 d2 data* depth(ref)* hash(ref)*)`,
//! where `data*` carries the completion tag for non byte-aligned data.
//! Hash and depth are computed once when the cell is built.

use std::sync::Arc;

use ton_crypto::sha256;

use crate::{MAX_CELL_BITS, MAX_CELL_REFS};

/// An immutable ordinary cell.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Data bytes; bits past `bit_len` are zero.
    data: Vec<u8>,
    bit_len: usize,
    references: Vec<Arc<Cell>>,
    hash: [u8; 32],
    depth: u16,
}

impl Cell {
    pub(crate) fn new(data: Vec<u8>, bit_len: usize, references: Vec<Arc<Cell>>) -> Self {
        debug_assert!(bit_len <= MAX_CELL_BITS);
        debug_assert!(references.len() <= MAX_CELL_REFS);

        let depth = references
            .iter()
            .map(|r| r.depth + 1)
            .max()
            .unwrap_or(0);

        let mut cell = Cell {
            data,
            bit_len,
            references,
            hash: [0u8; 32],
            depth,
        };
        cell.hash = sha256(&cell.representation());
        cell
    }

    /// An empty cell (no bits, no refs).
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, Vec::new())
    }

    /// Representation hash.
    pub fn hash(&self) -> [u8; 32] {
        self.hash
    }

    /// Depth of the subtree rooted here (0 for a leaf).
    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn references(&self) -> &[Arc<Cell>] {
        &self.references
    }

    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.references.get(index)
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Read a single data bit. Out-of-range positions read as zero.
    pub fn bit_at(&self, index: usize) -> bool {
        if index >= self.bit_len {
            return false;
        }
        (self.data[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// Descriptor bytes `(d1, d2)`: refs count, and
    /// `floor(bits / 8) + ceil(bits / 8)`.
    pub fn descriptors(&self) -> (u8, u8) {
        let d1 = self.references.len() as u8;
        let d2 = (self.bit_len / 8 + self.bit_len.div_ceil(8)) as u8;
        (d1, d2)
    }

    /// Data bytes with the completion tag appended when `bit_len` is not a
    /// multiple of eight.
    pub fn data_with_completion_tag(&self) -> Vec<u8> {
        let byte_len = self.bit_len.div_ceil(8);
        let mut out = self.data[..byte_len].to_vec();
        let remainder = self.bit_len % 8;
        if remainder != 0
            && let Some(last) = out.last_mut()
        {
            *last |= 1 << (7 - remainder);
        }
        out
    }

    fn representation(&self) -> Vec<u8> {
        let (d1, d2) = self.descriptors();
        let mut repr = Vec::with_capacity(2 + 128 + self.references.len() * 34);
        repr.push(d1);
        repr.push(d2);
        repr.extend_from_slice(&self.data_with_completion_tag());
        for reference in &self.references {
            repr.extend_from_slice(&reference.depth.to_be_bytes());
        }
        for reference in &self.references {
            repr.extend_from_slice(&reference.hash);
        }
        repr
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Cell {}
