// Little-endian field decoding for on-disk records
// Both supported formats store every multi-byte field little-endian

use byteorder::{ByteOrder, LittleEndian};

/// Fixed-offset field access over a raw record buffer.
///
/// Fields that lie past the end of the buffer decode as zero, so a truncated
/// record yields defaults rather than garbage. Callers that must not accept a
/// truncated record read it through `Volume::read_exact_at` first.
pub trait LeFields {
    fn le_u8(&self, offset: usize) -> u8;
    fn le_u16(&self, offset: usize) -> u16;
    fn le_u32(&self, offset: usize) -> u32;
    fn bytes_at<const N: usize>(&self, offset: usize) -> [u8; N];
}

impl LeFields for [u8] {
    fn le_u8(&self, offset: usize) -> u8 {
        self.get(offset).copied().unwrap_or(0)
    }

    fn le_u16(&self, offset: usize) -> u16 {
        self.get(offset..offset + 2).map(LittleEndian::read_u16).unwrap_or(0)
    }

    fn le_u32(&self, offset: usize) -> u32 {
        self.get(offset..offset + 4).map(LittleEndian::read_u32).unwrap_or(0)
    }

    fn bytes_at<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        if let Some(src) = self.get(offset..) {
            let n = src.len().min(N);
            out[..n].copy_from_slice(&src[..n]);
        }
        out
    }
}

pub fn u16_bytes(value: u16) -> [u8; 2] {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value);
    buf
}
