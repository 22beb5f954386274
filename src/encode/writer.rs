use crate::{Error, Result};

/// Destination of a serializer pass.
pub(crate) trait Sink {
    fn put(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Sizing pass: counts bytes without storing them.
#[derive(Debug, Default)]
pub(crate) struct Counter {
    pub(crate) total: usize,
}

impl Sink for Counter {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.total += bytes.len();
        Ok(())
    }
}

/// Emitting pass into a caller buffer.
pub(crate) struct SliceWriter<'b> {
    buffer: &'b mut [u8],
    written: usize,
}

impl<'b> SliceWriter<'b> {
    pub(crate) fn new(buffer: &'b mut [u8]) -> Self {
        Self { buffer, written: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl Sink for SliceWriter<'_> {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.written + bytes.len();
        let dst = self
            .buffer
            .get_mut(self.written..end)
            .ok_or(Error::OutOfMemory)?;
        dst.copy_from_slice(bytes);
        self.written = end;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl Sink for Vec<u8> {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}
