//! Flash storage abstractions
//!
//! Persistent key-value storage implemented by chip-specific HALs on top
//! of their flash memory. Every key has a fixed maximum item size so
//! implementations can use stack buffers.

/// Largest serialized calibration record
pub const MAX_CALIBRATION_SIZE: usize = 64;

/// Storage keys
///
/// Values are part of the on-flash format; never renumber them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Scale and colour sensor calibration (postcard)
    Calibration = 0,
}

impl StorageKey {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Calibration),
            _ => None,
        }
    }

    /// Largest item that may be stored under this key
    pub const fn max_len(self) -> usize {
        match self {
            StorageKey::Calibration => MAX_CALIBRATION_SIZE,
        }
    }

    /// Check an item of `len` bytes may be stored under this key
    pub fn fits(self, len: usize) -> bool {
        len <= self.max_len()
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage layer failed
    Storage,
    /// Key not found
    NotFound,
    /// Item larger than the buffer or the key allows
    BufferTooSmall,
    /// Stored data failed validation
    Corrupted,
}

/// Wear-levelled key-value storage
pub trait FlashStorage {
    /// Read a value into `buffer`, returning the number of bytes read
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write (replace) a value
    ///
    /// Fails with [`FlashError::BufferTooSmall`] if `data` exceeds the
    /// key's [`max_len`](StorageKey::max_len).
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl<E> From<sequential_storage::Error<E>> for FlashError {
    fn from(err: sequential_storage::Error<E>) -> Self {
        use sequential_storage::Error;

        match err {
            Error::Storage { .. } => FlashError::Flash,
            Error::Corrupted { .. } => FlashError::Corrupted,
            Error::BufferTooSmall(_) | Error::BufferTooBig | Error::ItemTooBig => {
                FlashError::BufferTooSmall
            }
            _ => FlashError::Storage,
        }
    }
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
