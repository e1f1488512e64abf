//! Scoped access to a tag's opaque payload bytes.

use std::io::{self, Read, Take};

/// The unread remainder of a tag payload.
///
/// A `Payload` mutably borrows the decoder's reader, limited to the bytes the
/// tag header declared. Whatever is left unread when it is dropped is read
/// and discarded, so the stream stays positioned on the next tag header on
/// every exit path. A failure while discarding in `drop` is recorded on the
/// decoder and reported by its next call; use [`Payload::discard`] to see the
/// error directly.
pub struct Payload<'a, R: Read> {
    inner: Take<&'a mut R>,
    drain_failure: &'a mut Option<io::ErrorKind>,
}

impl<'a, R: Read> Payload<'a, R> {
    pub(crate) fn new(
        reader: &'a mut R,
        len: u32,
        drain_failure: &'a mut Option<io::ErrorKind>,
    ) -> Self {
        Self {
            inner: reader.take(u64::from(len)),
            drain_failure,
        }
    }

    /// Bytes of the declared payload not yet consumed.
    pub fn remaining(&self) -> u64 {
        self.inner.limit()
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.inner.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Read the rest of the payload into memory.
    ///
    /// Fails with `UnexpectedEof` if the stream ends before the declared length.
    pub fn read_to_vec(mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.remaining() as usize);
        self.inner.read_to_end(&mut data)?;
        if self.remaining() > 0 {
            return Err(truncated(self.remaining()));
        }
        Ok(data)
    }

    /// Discard the rest of the payload, returning how many bytes were skipped.
    pub fn discard(mut self) -> io::Result<u64> {
        self.drain()
    }

    fn drain(&mut self) -> io::Result<u64> {
        let skipped = io::copy(&mut self.inner, &mut io::sink())?;
        if self.remaining() > 0 {
            return Err(truncated(self.remaining()));
        }
        Ok(skipped)
    }
}

impl<R: Read> Read for Payload<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Drop for Payload<'_, R> {
    fn drop(&mut self) {
        if self.remaining() == 0 {
            return;
        }
        if let Err(e) = self.drain() {
            *self.drain_failure = Some(e.kind());
        }
    }
}

impl<R: Read> std::fmt::Debug for Payload<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("remaining", &self.remaining())
            .finish()
    }
}

fn truncated(missing: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("stream ended {} bytes before the end of the tag payload", missing),
    )
}
