//! Startup gate on host capabilities

use crate::error::{Capability, StartupError};
use crate::platform::{Capabilities, Platform};

/// Query what the host exposes; never fails
pub fn probe<P: Platform>(platform: &P) -> Capabilities {
    let capabilities = platform.capabilities();
    log::debug!("Host capabilities: {:?}", capabilities);
    capabilities
}

/// Reject hosts missing a capability the session needs
///
/// The detector is checked before media access so no camera is ever
/// requested on a host that could not decode anything.
pub fn ensure_supported(capabilities: &Capabilities) -> Result<(), StartupError> {
    if !capabilities.barcode_detector {
        return Err(StartupError::UnsupportedCapability(
            Capability::BarcodeDetector,
        ));
    }
    if !capabilities.media_devices {
        return Err(StartupError::UnsupportedCapability(Capability::UserMedia));
    }
    Ok(())
}
