//! Bag of Cells (BoC) serialization.
//!
//! Cells are written in the `serialized_boc` (generic) layout with roots
//! first and every reference pointing at a higher index, which is the order
//! validators require. A CRC32-C trailer is appended by default.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{BOC_GENERIC_MAGIC, Cell, CellError, CellResult, crc32c};

/// A serialized collection of cells with one or more roots.
#[derive(Debug, Clone)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
}

impl BagOfCells {
    pub fn new(roots: Vec<Arc<Cell>>) -> Self {
        BagOfCells { roots }
    }

    /// A BoC with a single root cell.
    pub fn from_root(root: Cell) -> Self {
        BagOfCells {
            roots: vec![Arc::new(root)],
        }
    }

    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    /// The single root (errors if there is not exactly one).
    pub fn single_root(&self) -> CellResult<&Arc<Cell>> {
        match self.roots.as_slice() {
            [root] => Ok(root),
            roots => Err(CellError::NotSingleRoot(roots.len())),
        }
    }

    /// Serialize with a CRC32-C trailer and no index.
    pub fn serialize(&self) -> CellResult<Vec<u8>> {
        self.serialize_with_crc(true)
    }

    pub fn serialize_with_crc(&self, with_crc: bool) -> CellResult<Vec<u8>> {
        if self.roots.is_empty() {
            return Err(CellError::InvalidBoc("No root cells".to_string()));
        }

        let cells = self.ordered_cells();
        let index: HashMap<[u8; 32], usize> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.hash(), i))
            .collect();

        let ref_size = bytes_needed(cells.len());
        let mut body = Vec::new();
        for cell in &cells {
            let (d1, d2) = cell.descriptors();
            body.push(d1);
            body.push(d2);
            body.extend_from_slice(&cell.data_with_completion_tag());
            for reference in cell.references() {
                let idx = index
                    .get(&reference.hash())
                    .ok_or_else(|| CellError::InvalidBoc("Reference not found".to_string()))?;
                write_uint(&mut body, *idx as u64, ref_size);
            }
        }

        let off_bytes = bytes_needed(body.len());
        let mut out = Vec::with_capacity(body.len() + 32);
        out.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());
        // has_idx = 0, has_crc32c, has_cache_bits = 0, flags = 0, size
        out.push(if with_crc { 0x40 } else { 0 } | ref_size as u8);
        out.push(off_bytes as u8);
        write_uint(&mut out, cells.len() as u64, ref_size);
        write_uint(&mut out, self.roots.len() as u64, ref_size);
        write_uint(&mut out, 0, ref_size);
        write_uint(&mut out, body.len() as u64, off_bytes);
        for root in &self.roots {
            write_uint(&mut out, index[&root.hash()] as u64, ref_size);
        }
        out.extend_from_slice(&body);

        if with_crc {
            let crc = crc32c(&out);
            out.extend_from_slice(&crc.to_le_bytes());
        }
        Ok(out)
    }

    /// Serialize and encode with standard base64 (as `sendBoc` expects).
    pub fn serialize_to_base64(&self) -> CellResult<String> {
        Ok(STANDARD.encode(self.serialize()?))
    }

    /// Parse a generic-format BoC.
    pub fn deserialize(data: &[u8]) -> CellResult<Self> {
        let mut reader = Reader { data, offset: 0 };

        let magic = reader.uint(4)? as u32;
        if magic != BOC_GENERIC_MAGIC {
            return Err(CellError::InvalidBoc(format!(
                "Invalid magic: {:08x}, expected {:08x}",
                magic, BOC_GENERIC_MAGIC
            )));
        }

        let flags = reader.uint(1)? as u8;
        let has_idx = flags & 0x80 != 0;
        let has_crc = flags & 0x40 != 0;
        let size = (flags & 0x07) as usize;
        let off_bytes = reader.uint(1)? as usize;
        if size == 0 || size > 4 || off_bytes == 0 || off_bytes > 8 {
            return Err(CellError::InvalidBoc(format!(
                "Invalid size fields: size={}, off_bytes={}",
                size, off_bytes
            )));
        }

        if has_crc {
            if data.len() < 4 {
                return Err(CellError::UnexpectedEof);
            }
            let split = data.len() - 4;
            let expected = u32::from_le_bytes([
                data[split],
                data[split + 1],
                data[split + 2],
                data[split + 3],
            ]);
            let actual = crc32c(&data[..split]);
            if expected != actual {
                return Err(CellError::CrcMismatch { expected, actual });
            }
        }

        let cell_count = reader.uint(size)? as usize;
        let root_count = reader.uint(size)? as usize;
        let absent = reader.uint(size)?;
        if absent != 0 {
            return Err(CellError::InvalidBoc("Absent cells are not supported".to_string()));
        }
        let _total_size = reader.uint(off_bytes)?;

        let root_indices = (0..root_count)
            .map(|_| reader.uint(size).map(|v| v as usize))
            .collect::<CellResult<Vec<_>>>()?;
        if has_idx {
            reader.skip(cell_count * off_bytes)?;
        }

        let mut raw = Vec::with_capacity(cell_count);
        for i in 0..cell_count {
            let d1 = reader.uint(1)? as u8;
            let d2 = reader.uint(1)? as u8;
            if d1 & 0x08 != 0 || d1 >> 5 != 0 {
                return Err(CellError::InvalidBoc(format!("Cell {} is exotic", i)));
            }
            let ref_count = (d1 & 0x07) as usize;
            if ref_count > crate::MAX_CELL_REFS {
                return Err(CellError::TooManyRefs(ref_count));
            }
            let bytes = reader.take((d2 as usize).div_ceil(2))?;
            let bit_len = if d2 % 2 == 0 {
                bytes.len() * 8
            } else {
                bit_len_from_tag(bytes)?
            };
            let mut refs = Vec::with_capacity(ref_count);
            for _ in 0..ref_count {
                let r = reader.uint(size)? as usize;
                if r <= i || r >= cell_count {
                    return Err(CellError::InvalidBoc(format!(
                        "Cell {} references cell {} out of order",
                        i, r
                    )));
                }
                refs.push(r);
            }
            raw.push((strip_tag(bytes, bit_len), bit_len, refs));
        }

        // References always point forward, so build from the back.
        let mut built: Vec<Option<Arc<Cell>>> = vec![None; cell_count];
        for (i, (bytes, bit_len, refs)) in raw.into_iter().enumerate().rev() {
            let references = refs
                .iter()
                .map(|&r| built[r].clone().ok_or(CellError::CellNotFound(r)))
                .collect::<CellResult<Vec<_>>>()?;
            built[i] = Some(Arc::new(Cell::new(bytes, bit_len, references)));
        }

        let roots = root_indices
            .iter()
            .map(|&idx| {
                built
                    .get(idx)
                    .cloned()
                    .flatten()
                    .ok_or(CellError::CellNotFound(idx))
            })
            .collect::<CellResult<Vec<_>>>()?;

        Ok(BagOfCells { roots })
    }

    /// Parse a standard base64 BoC.
    pub fn deserialize_from_base64(encoded: &str) -> CellResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    /// Roots first, each cell before everything it references.
    fn ordered_cells(&self) -> Vec<Arc<Cell>> {
        let mut post_order = Vec::new();
        let mut seen = HashSet::new();
        for root in &self.roots {
            collect_post_order(root, &mut post_order, &mut seen);
        }
        post_order.reverse();
        post_order
    }
}

fn collect_post_order(
    cell: &Arc<Cell>,
    out: &mut Vec<Arc<Cell>>,
    seen: &mut HashSet<[u8; 32]>,
) {
    if seen.contains(&cell.hash()) {
        return;
    }
    for reference in cell.references() {
        collect_post_order(reference, out, seen);
    }
    seen.insert(cell.hash());
    out.push(cell.clone());
}

fn bit_len_from_tag(bytes: &[u8]) -> CellResult<usize> {
    let last = *bytes
        .last()
        .ok_or_else(|| CellError::InvalidBoc("Missing completion tag".to_string()))?;
    if last == 0 {
        return Err(CellError::InvalidBoc("Missing completion tag".to_string()));
    }
    Ok(bytes.len() * 8 - last.trailing_zeros() as usize - 1)
}

fn strip_tag(bytes: &[u8], bit_len: usize) -> Vec<u8> {
    let mut out = bytes[..bit_len.div_ceil(8)].to_vec();
    let remainder = bit_len % 8;
    if remainder != 0
        && let Some(last) = out.last_mut()
    {
        *last &= !(0xFFu8 >> remainder);
    }
    out
}

fn bytes_needed(n: usize) -> usize {
    let bits = usize::BITS - n.leading_zeros();
    (bits as usize).div_ceil(8).max(1)
}

fn write_uint(buf: &mut Vec<u8>, value: u64, bytes: usize) {
    for i in (0..bytes).rev() {
        buf.push((value >> (i * 8)) as u8);
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> CellResult<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or(CellError::UnexpectedEof)?;
        let slice = self.data.get(self.offset..end).ok_or(CellError::UnexpectedEof)?;
        self.offset = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> CellResult<()> {
        self.take(len).map(|_| ())
    }

    fn uint(&mut self, bytes: usize) -> CellResult<u64> {
        Ok(self
            .take(bytes)?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellBuilder;

    #[test]
    fn test_empty_cell_boc_bytes() {
        let bytes = BagOfCells::from_root(Cell::empty())
            .serialize_with_crc(false)
            .unwrap();
        assert_eq!(
            bytes,
            vec![0xb5, 0xee, 0x9c, 0x72, 0x01, 0x01, 0x01, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_root_comes_first() {
        let mut child = CellBuilder::new();
        child.store_u32(0x11111111).unwrap();
        let child = Arc::new(child.build().unwrap());
        let mut parent = CellBuilder::new();
        parent.store_ref(child).unwrap();
        let parent = parent.build().unwrap();

        let bytes = BagOfCells::from_root(parent.clone()).serialize().unwrap();
        // cells=2, roots=1, absent=0, size, root index 0
        assert_eq!(bytes[10], 0);
        // first cell descriptor: one reference
        assert_eq!(bytes[11], 1);

        let boc = BagOfCells::deserialize(&bytes).unwrap();
        assert_eq!(boc.single_root().unwrap().hash(), parent.hash());
    }

    #[test]
    fn test_shared_child_stored_once() {
        let child = Arc::new(Cell::empty());
        let mut parent = CellBuilder::new();
        parent.store_ref(child.clone()).unwrap();
        parent.store_ref(child).unwrap();
        let bytes = BagOfCells::from_root(parent.build().unwrap())
            .serialize_with_crc(false)
            .unwrap();
        // cell count
        assert_eq!(bytes[6], 2);
    }

    #[test]
    fn test_unaligned_roundtrip_hash() {
        let mut builder = CellBuilder::new();
        builder.store_uint(0b10110, 5).unwrap();
        let cell = builder.build().unwrap();
        let encoded = BagOfCells::from_root(cell.clone()).serialize_to_base64().unwrap();
        let decoded = BagOfCells::deserialize_from_base64(&encoded).unwrap();
        let root = decoded.single_root().unwrap();
        assert_eq!(root.bit_len(), 5);
        assert_eq!(root.hash(), cell.hash());
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let mut bytes = BagOfCells::from_root(Cell::empty()).serialize().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            BagOfCells::deserialize(&bytes),
            Err(CellError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_magic() {
        assert!(matches!(
            BagOfCells::deserialize(&[0, 1, 2, 3, 4, 5, 6, 7]),
            Err(CellError::InvalidBoc(_))
        ));
    }

    #[test]
    fn test_truncated() {
        assert!(matches!(
            BagOfCells::deserialize(&[0xb5, 0xee, 0x9c]),
            Err(CellError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_bytes_needed() {
        assert_eq!(bytes_needed(0), 1);
        assert_eq!(bytes_needed(255), 1);
        assert_eq!(bytes_needed(256), 2);
        assert_eq!(bytes_needed(65536), 3);
    }
}
