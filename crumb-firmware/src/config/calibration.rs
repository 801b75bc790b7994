//! Calibration data persistence
//!
//! Loads and saves load-cell and colour calibration to flash.

use defmt::*;

use crumb_core::config::CalibrationData;
use crumb_hal_rp2040::flash::{
    FlashError, Rp2040FlashStorage, StorageKey, MAX_CALIBRATION_SIZE,
};
use crumb_hal_rp2040::FlashStorageTrait;

/// Calibration persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    Flash(FlashError),
    Deserialize,
    Serialize,
    CrcMismatch,
    /// Wrong signature or version
    InvalidFormat,
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

/// Load calibration from flash, falling back to defaults
pub async fn load_calibration(storage: &mut Rp2040FlashStorage<'_>) -> CalibrationData {
    match load_calibration_inner(storage).await {
        Ok(data) => {
            info!(
                "Loaded calibration: {} counts/g, white refs {}",
                data.counts_per_gram, data.white_reference
            );
            data
        }
        Err(PersistError::Flash(FlashError::NotFound)) => {
            info!("No calibration in flash, using defaults");
            CalibrationData::new()
        }
        Err(e) => {
            warn!("Failed to load calibration: {:?}, using defaults", e);
            CalibrationData::new()
        }
    }
}

async fn load_calibration_inner(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<CalibrationData, PersistError> {
    let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
    let len = storage.read(StorageKey::Calibration, &mut buffer).await?;

    debug!("Read {} bytes of calibration from flash", len);

    let data: CalibrationData =
        postcard::from_bytes(&buffer[..len]).map_err(|_| PersistError::Deserialize)?;

    if !data.is_valid() {
        return Err(PersistError::InvalidFormat);
    }
    if !data.verify_crc() {
        return Err(PersistError::CrcMismatch);
    }

    Ok(data)
}

/// Save calibration to flash, refreshing its CRC first
pub async fn save_calibration(
    storage: &mut Rp2040FlashStorage<'_>,
    data: &mut CalibrationData,
) -> Result<(), PersistError> {
    data.update_crc();

    let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
    let bytes = postcard::to_slice(data, &mut buffer).map_err(|_| PersistError::Serialize)?;

    debug!("Saving {} bytes of calibration to flash", bytes.len());

    storage.write(StorageKey::Calibration, bytes).await?;

    info!("Saved calibration: {} counts/g", data.counts_per_gram);
    Ok(())
}
