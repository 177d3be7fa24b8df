// Byte-addressable volume
// Every on-disk structure is reached through absolute offsets on one of these

use crate::{VolprobeError, VolumeOffset};
use log::trace;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// A seekable, readable and writable byte store holding a disk image.
///
/// All reads of on-disk records go through [`Volume::read_exact_at`], which
/// refuses to hand back a partially filled buffer.
pub trait Volume {
    /// Read as many bytes as are available at `offset`, up to `buf.len()`.
    /// Returns the number of bytes read; fewer than requested means the image ended.
    fn read_up_to_at(&mut self, offset: VolumeOffset, buf: &mut [u8]) -> Result<usize, VolprobeError>;

    /// Write all of `data` at `offset`.
    fn write_all_at(&mut self, offset: VolumeOffset, data: &[u8]) -> Result<(), VolprobeError>;

    /// Push buffered writes to the backing store.
    fn flush_volume(&mut self) -> Result<(), VolprobeError>;

    /// Fill `buf` completely from `offset` or fail with [`VolprobeError::ShortRead`].
    fn read_exact_at(&mut self, offset: VolumeOffset, buf: &mut [u8]) -> Result<(), VolprobeError> {
        let actual = self.read_up_to_at(offset, buf)?;
        if actual < buf.len() {
            return Err(VolprobeError::ShortRead {
                offset: offset.get(),
                expected: buf.len(),
                actual,
            });
        }
        Ok(())
    }

    fn read_vec_at(&mut self, offset: VolumeOffset, len: usize) -> Result<Vec<u8>, VolprobeError> {
        let mut buf = vec![0u8; len];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Like [`Volume::read_vec_at`] but returns whatever prefix exists.
    fn read_available_at(&mut self, offset: VolumeOffset, len: usize) -> Result<Vec<u8>, VolprobeError> {
        let mut buf = vec![0u8; len];
        let actual = self.read_up_to_at(offset, &mut buf)?;
        buf.truncate(actual);
        Ok(buf)
    }
}

impl<T: Read + Write + Seek> Volume for T {
    fn read_up_to_at(&mut self, offset: VolumeOffset, buf: &mut [u8]) -> Result<usize, VolprobeError> {
        trace!("read {} bytes at {}", buf.len(), offset);
        self.seek(SeekFrom::Start(offset.get()))?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn write_all_at(&mut self, offset: VolumeOffset, data: &[u8]) -> Result<(), VolprobeError> {
        trace!("write {} bytes at {}", data.len(), offset);
        self.seek(SeekFrom::Start(offset.get()))?;
        self.write_all(data)?;
        Ok(())
    }

    fn flush_volume(&mut self) -> Result<(), VolprobeError> {
        self.flush()?;
        Ok(())
    }
}
