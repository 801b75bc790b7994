//! Calibration store in RP2040 flash
//!
//! A sequential-storage map in the last few erase pages of the 2 MiB
//! QSPI flash. The only item is the postcard-encoded calibration record,
//! so the partition spans four pages (the map needs two; the rest spread
//! wear) and item buffers are sized for that record.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use crumb_hal::flash::{FlashError, StorageKey, MAX_CALIBRATION_SIZE};

/// QSPI flash size on the board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Erase pages reserved for the calibration map
pub const PARTITION_PAGES: usize = 4;
pub const PARTITION_SIZE: usize = PARTITION_PAGES * ERASE_SIZE;
pub const PARTITION_START: usize = FLASH_SIZE - PARTITION_SIZE;

/// Key byte and alignment padding around the stored value
const ITEM_OVERHEAD: usize = 16;
const ITEM_BUFFER_SIZE: usize = MAX_CALIBRATION_SIZE + ITEM_OVERHEAD;

fn partition() -> Range<u32> {
    PARTITION_START as u32..FLASH_SIZE as u32
}

pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> crumb_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut item = [0u8; ITEM_BUFFER_SIZE];

        let data = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            partition(),
            &mut NoCache::new(),
            &mut item,
            &key,
        )
        .await?
        .ok_or(FlashError::NotFound)?;

        // Longer than any record this firmware writes
        if !key.fits(data.len()) {
            return Err(FlashError::Corrupted);
        }

        let out = buffer
            .get_mut(..data.len())
            .ok_or(FlashError::BufferTooSmall)?;
        out.copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if !key.fits(data.len()) {
            return Err(FlashError::BufferTooSmall);
        }

        let mut item = [0u8; ITEM_BUFFER_SIZE];
        map::store_item(
            &mut self.flash,
            partition(),
            &mut NoCache::new(),
            &mut item,
            &key,
            &data,
        )
        .await?;
        Ok(())
    }
}
