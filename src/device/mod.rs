//! Device collaborators: geolocation and camera.
//!
//! Both devices are modeled as single-shot asynchronous operations rather
//! than callback streams. Acquisition is scoped to the call: an
//! implementation must release the underlying device on every exit path,
//! including errors and cancellation. The geolocation fix is additionally
//! time-bounded by the capture session, so a hung device surfaces as
//! [`DeviceError::Timeout`] instead of blocking the session forever.

use std::time::Duration;

use async_trait::async_trait;

use crate::api::Coordinate;

/// Errors from camera or geolocation access.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeviceError {
    /// The device does not exist on this platform or is currently unusable.
    #[error("device unavailable: {0}")]
    Unavailable(String),
    /// The user or platform denied access.
    #[error("device access denied: {0}")]
    PermissionDenied(String),
    /// The bounded wait elapsed before the device produced a result.
    #[error("device timed out after {0:?}")]
    Timeout(Duration),
}

/// Options for a single geolocation fix.
#[derive(Debug, Clone, PartialEq)]
pub struct FixOptions {
    /// Request the most accurate fix the device can produce.
    pub high_accuracy: bool,
    /// Upper bound on the wait for a fix. The fix must fail, not hang,
    /// once this elapses.
    pub timeout: Duration,
    /// Maximum acceptable age of a cached fix. Zero forbids cached fixes.
    pub max_age: Duration,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::ZERO,
        }
    }
}

/// One-shot "get current coordinate" collaborator.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Acquire a single coordinate fix.
    ///
    /// Implementations should honor `options.timeout` themselves where the
    /// platform supports it; the capture session additionally enforces the
    /// bound externally.
    async fn current_position(&self, options: &FixOptions) -> Result<Coordinate, DeviceError>;
}

/// A still image captured by the camera device, already encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    /// Declared encoding, e.g. "image/jpeg"
    pub mime_type: String,
    /// Encoded payload as produced by the device (e.g. a data URL)
    pub data: String,
}

impl CapturedImage {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }
}

/// One-shot "capture one still image" collaborator.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Acquire the camera, capture a single frame, release the camera.
    async fn capture_still(&self) -> Result<CapturedImage, DeviceError>;
}
