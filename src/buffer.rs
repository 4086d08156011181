//! Cursor Buffer
//!
//! Fixed-capacity byte region with a single read/write cursor. Values are laid
//! out in host byte order with no padding:
//!
//! ```text
//! u8      [b0]
//! u32     [b0 b1 b2 b3]
//! string  [len: u32][len raw bytes]
//! ```
//!
//! A buffer is either filled from empty (write mode) or walked over bytes
//! received from elsewhere (read mode). Every operation is a single bounds
//! check followed by a copy; a failed operation leaves both the cursor and
//! the storage untouched.

use std::alloc::{self, Layout};

use crate::diagnostics::LogChannel;
use crate::error::{BufferError, BufferResult};

/// Width of the length prefix in front of every string.
pub const LENGTH_PREFIX: usize = std::mem::size_of::<u32>();

/// Fixed-capacity buffer with a forward-only cursor
#[derive(Debug)]
pub struct Buffer {
    /// Storage, always exactly `capacity` bytes long
    storage: Vec<u8>,
    /// Current read/write position
    cursor: usize,
    /// Where failures are reported
    log: LogChannel,
}

impl Buffer {
    /// Create an empty buffer of `capacity` zeroed bytes on the default channel.
    pub fn create(capacity: u32) -> BufferResult<Self> {
        Self::create_with(capacity, LogChannel::default())
    }

    /// Create an empty buffer of `capacity` zeroed bytes reporting to `log`.
    pub fn create_with(capacity: u32, log: LogChannel) -> BufferResult<Self> {
        let capacity = capacity as usize;
        let storage = match allocate_zeroed(capacity) {
            Some(storage) => storage,
            None => {
                log.error(&format!(
                    "failed to allocate {} bytes for buffer storage",
                    capacity
                ));
                return Err(BufferError::AllocationFailure {
                    requested: capacity,
                });
            }
        };

        if capacity == 0 {
            log.warning("created a zero-capacity buffer; every write will overflow");
        }

        Ok(Self {
            storage,
            cursor: 0,
            log,
        })
    }

    /// Wrap received bytes for reading. Capacity is the byte length.
    pub fn from_bytes(bytes: Vec<u8>, log: LogChannel) -> BufferResult<Self> {
        if u32::try_from(bytes.len()).is_err() {
            log.error(&format!(
                "cannot wrap {} bytes: exceeds the 32-bit capacity range",
                bytes.len()
            ));
            return Err(BufferError::TooLarge { len: bytes.len() });
        }
        Ok(Self {
            storage: bytes,
            cursor: 0,
            log,
        })
    }

    /// Wrap a copy of received bytes for reading.
    pub fn from_slice(bytes: &[u8], log: LogChannel) -> BufferResult<Self> {
        Self::from_bytes(bytes.to_vec(), log)
    }

    /// Total size of the storage region
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Current read/write position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes between the cursor and the end of storage
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.cursor
    }

    /// Check if the cursor has reached the end of storage
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes before the cursor: the message encoded so far.
    pub fn written(&self) -> &[u8] {
        &self.storage[..self.cursor]
    }

    /// The whole storage region, regardless of the cursor.
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage
    }

    /// Consume the buffer and return its storage
    pub fn into_bytes(self) -> Vec<u8> {
        self.storage
    }

    /// Channel this buffer reports to.
    pub fn log_channel(&self) -> &LogChannel {
        &self.log
    }

    /// Release the buffer and its storage.
    ///
    /// Takes the buffer by value, so it cannot be used or released again.
    pub fn destroy(self) {
        drop(self);
    }

    /// Append a `u32` in host byte order.
    pub fn write_u32(&mut self, value: u32) -> BufferResult<()> {
        self.write_array(value.to_ne_bytes(), "u32")
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, value: u8) -> BufferResult<()> {
        self.write_array([value], "u8")
    }

    /// Append a length-prefixed byte string.
    ///
    /// The prefix and payload are written together or not at all.
    pub fn write_string(&mut self, data: &[u8]) -> BufferResult<()> {
        let len = match u32::try_from(data.len()) {
            Ok(len) => len,
            Err(_) => {
                self.log.error(&format!(
                    "cannot add a string of {} bytes: length does not fit in u32",
                    data.len()
                ));
                return Err(BufferError::TooLarge { len: data.len() });
            }
        };

        let needed = LENGTH_PREFIX + data.len();
        self.check_write(needed, "string")?;

        let start = self.cursor;
        let payload = start + LENGTH_PREFIX;
        self.storage[start..payload].copy_from_slice(&len.to_ne_bytes());
        self.storage[payload..payload + data.len()].copy_from_slice(data);
        self.cursor += needed;
        Ok(())
    }

    /// Read a `u32` in host byte order.
    pub fn read_u32(&mut self) -> BufferResult<u32> {
        self.read_array().map(u32::from_ne_bytes)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> BufferResult<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Read a length-prefixed byte string into a new owned allocation.
    ///
    /// Prefix and payload are validated before the cursor moves; on any
    /// failure the cursor stays where it was.
    pub fn read_string(&mut self) -> BufferResult<Vec<u8>> {
        self.check_read(LENGTH_PREFIX)?;

        let start = self.cursor;
        let mut prefix = [0u8; LENGTH_PREFIX];
        prefix.copy_from_slice(&self.storage[start..start + LENGTH_PREFIX]);
        let len = u32::from_ne_bytes(prefix) as usize;

        let payload = start + LENGTH_PREFIX;
        let available = self.storage.len() - payload;
        if len > available {
            self.log.error(&format!(
                "string of {} bytes exceeds buffer length ({} bytes remaining)",
                len, available
            ));
            return Err(BufferError::OutOfBounds {
                needed: len,
                remaining: available,
            });
        }

        let mut data = Vec::new();
        if data.try_reserve_exact(len).is_err() {
            self.log.error(&format!(
                "failed to allocate {} bytes to unpack a string",
                len
            ));
            return Err(BufferError::AllocationFailure { requested: len });
        }
        data.extend_from_slice(&self.storage[payload..payload + len]);

        self.cursor = payload + len;
        Ok(data)
    }

    fn write_array<const N: usize>(&mut self, bytes: [u8; N], what: &str) -> BufferResult<()> {
        self.check_write(N, what)?;
        self.storage[self.cursor..self.cursor + N].copy_from_slice(&bytes);
        self.cursor += N;
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> BufferResult<[u8; N]> {
        self.check_read(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.storage[self.cursor..self.cursor + N]);
        self.cursor += N;
        Ok(bytes)
    }

    fn check_write(&self, needed: usize, what: &str) -> BufferResult<()> {
        let remaining = self.remaining();
        if needed > remaining {
            self.log.error(&format!(
                "cannot add {} of {} bytes to buffer ({} bytes remaining)",
                what, needed, remaining
            ));
            return Err(BufferError::Overflow { needed, remaining });
        }
        Ok(())
    }

    fn check_read(&self, needed: usize) -> BufferResult<()> {
        let remaining = self.remaining();
        if needed > remaining {
            self.log.error(&format!(
                "read of {} bytes past end of buffer ({} bytes remaining)",
                needed, remaining
            ));
            return Err(BufferError::OutOfBounds { needed, remaining });
        }
        Ok(())
    }
}

/// Fallible zeroed allocation. Zeroed pages from the allocator are not
/// written again, so a large buffer is not touched up front.
fn allocate_zeroed(len: usize) -> Option<Vec<u8>> {
    if len == 0 {
        return Some(Vec::new());
    }
    let layout = Layout::array::<u8>(len).ok()?;
    let ptr = unsafe { alloc::alloc_zeroed(layout) };
    if ptr.is_null() {
        return None;
    }
    // Safety: `ptr` comes from the global allocator with the layout of a
    // `[u8; len]`, and all `len` bytes are initialised to zero.
    Some(unsafe { Vec::from_raw_parts(ptr, len, len) })
}

impl TryFrom<Vec<u8>> for Buffer {
    type Error = BufferError;

    fn try_from(bytes: Vec<u8>) -> BufferResult<Self> {
        Self::from_bytes(bytes, LogChannel::default())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.written()
    }
}
