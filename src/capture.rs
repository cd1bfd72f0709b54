//! Capture session orchestration.
//!
//! A [`CaptureSession`] walks one user through acquiring a geolocation fix
//! and a still image, then submits both (plus optional notes) through the
//! classify-then-persist pipeline as a single atomic operation.
//!
//! State machine:
//!
//! ```text
//! Idle ──refresh──▶ LocationPending ──ok──▶ LocationReady ──capture──▶ ImageReady
//!  ▲                      │fail                                            │submit
//!  └──────────────────────┘                             Failed ◀──err── Submitting ──ok──▶ Complete
//!                                                         │retry submit      ▲
//!                                                         └──────────────────┘
//! ```
//!
//! A location refresh never discards an already-captured image, and a failed
//! submission keeps the captured inputs so the user can retry without
//! re-capturing. Success clears the image and notes but keeps the cached
//! coordinate for the next capture.

use std::sync::Arc;

use log::{info, warn};
use tokio::time::timeout;

use crate::api::{AnalysisRecord, Coordinate};
use crate::auth::SessionContext;
use crate::db::repository::AnalysisRepository;
use crate::db::services::{self, SubmitError, Submission};
use crate::device::{CameraDevice, CapturedImage, DeviceError, FixOptions, LocationSource};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No location fix yet (or the last fix attempt failed).
    Idle,
    /// A location fix is in flight.
    LocationPending,
    /// A coordinate is held, no image yet.
    LocationReady,
    /// Coordinate and image are both held; ready to submit.
    ImageReady,
    /// A submission is in flight.
    Submitting,
    /// The last submission succeeded; coordinate remains cached.
    Complete,
    /// The last submission failed; inputs are retained for retry.
    Failed,
}

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A required input is missing for the requested transition.
    #[error("precondition not met: {0}")]
    Precondition(&'static str),
    /// Camera or geolocation failure; the caller may retry.
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// Classification/persistence failure; submission may be retried.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Orchestrates one user's capture-classify-persist flow.
///
/// Single logical thread of control: every operation takes `&mut self`, so
/// the borrow checker guarantees at most one suspending operation is
/// outstanding per session and the same action cannot be re-triggered while
/// one is in flight. Browsing history is an independent read path and
/// proceeds concurrently.
pub struct CaptureSession {
    context: SessionContext,
    location: Arc<dyn LocationSource>,
    camera: Arc<dyn CameraDevice>,
    repository: Arc<dyn AnalysisRepository>,
    fix_options: FixOptions,
    state: CaptureState,
    coordinate: Option<Coordinate>,
    image: Option<CapturedImage>,
    notes: Option<String>,
}

impl CaptureSession {
    pub fn new(
        context: SessionContext,
        location: Arc<dyn LocationSource>,
        camera: Arc<dyn CameraDevice>,
        repository: Arc<dyn AnalysisRepository>,
    ) -> Self {
        Self {
            context,
            location,
            camera,
            repository,
            fix_options: FixOptions::default(),
            state: CaptureState::Idle,
            coordinate: None,
            image: None,
            notes: None,
        }
    }

    /// Override the geolocation fix options (timeout, accuracy).
    pub fn with_fix_options(mut self, options: FixOptions) -> Self {
        self.fix_options = options;
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.coordinate.as_ref()
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    /// Attach free-text notes to the next submission.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    /// Acquire a fresh coordinate fix.
    ///
    /// Bounded by the configured fix timeout; a hung device fails with
    /// [`DeviceError::Timeout`] rather than blocking the session. Cached
    /// fixes older than `FixOptions::max_age` are never accepted, so a
    /// refresh always reflects the device's current position. An
    /// already-captured image survives both success and failure.
    pub async fn refresh_location(&mut self) -> Result<&Coordinate, SessionError> {
        self.state = CaptureState::LocationPending;

        let options = self.fix_options.clone();
        let fix = match timeout(options.timeout, self.location.current_position(&options)).await {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Timeout(options.timeout)),
        };

        match fix {
            Ok(coordinate) => {
                self.state = if self.image.is_some() {
                    CaptureState::ImageReady
                } else {
                    CaptureState::LocationReady
                };
                Ok(self.coordinate.insert(coordinate))
            }
            Err(err) => {
                warn!("location fix failed: {}", err);
                // A failed fix may be stale-adjacent; drop it and report.
                // The image, if any, is deliberately retained.
                self.coordinate = None;
                self.state = CaptureState::Idle;
                Err(SessionError::Device(err))
            }
        }
    }

    /// Capture one still image.
    ///
    /// Requires a ready coordinate. Capturing again replaces the previous
    /// image (retake). A device failure leaves the session state unchanged
    /// so the caller can retry.
    pub async fn capture_image(&mut self) -> Result<&CapturedImage, SessionError> {
        if self.coordinate.is_none() {
            return Err(SessionError::Precondition(
                "a location fix is required before capturing an image",
            ));
        }

        let image = self.camera.capture_still().await?;
        self.state = CaptureState::ImageReady;
        Ok(self.image.insert(image))
    }

    /// Submit the captured coordinate and image for classification and storage.
    ///
    /// Rejected with a precondition error before any store call unless both
    /// a coordinate and an image are held. On success the new record is
    /// returned and the image and notes are cleared; the coordinate stays
    /// cached for the next capture. On failure the inputs are retained and
    /// the session moves to [`CaptureState::Failed`] for a user-initiated
    /// retry.
    pub async fn submit(&mut self) -> Result<AnalysisRecord, SessionError> {
        let coordinate = self
            .coordinate
            .clone()
            .ok_or(SessionError::Precondition("no location fix captured"))?;
        let image = self
            .image
            .clone()
            .ok_or(SessionError::Precondition("no image captured"))?;

        self.state = CaptureState::Submitting;
        let submission = Submission {
            coordinate,
            image_data: image.data,
            notes: self.notes.clone(),
        };

        match services::submit_analysis(
            self.repository.as_ref(),
            self.context.owner_id(),
            submission,
        )
        .await
        {
            Ok(record) => {
                info!("submission complete: {}", record.id);
                self.image = None;
                self.notes = None;
                self.state = CaptureState::Complete;
                Ok(record)
            }
            Err(err) => {
                warn!("submission failed: {}", err);
                // Inputs survive so the user can retry without re-capturing.
                self.state = CaptureState::Failed;
                Err(SessionError::Submit(err))
            }
        }
    }

    /// Close the session, discarding the in-memory coordinate, image and
    /// notes. Device acquisition is scoped per call, so nothing else is held.
    pub fn close(&mut self) {
        self.coordinate = None;
        self.image = None;
        self.notes = None;
        self.state = CaptureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::api::OwnerId;
    use crate::auth::Identity;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{RepositoryError, RepositoryResult};

    struct FixedLocation {
        coordinate: Coordinate,
    }

    #[async_trait]
    impl LocationSource for FixedLocation {
        async fn current_position(&self, _options: &FixOptions) -> Result<Coordinate, DeviceError> {
            Ok(self.coordinate.clone())
        }
    }

    struct DeniedLocation;

    #[async_trait]
    impl LocationSource for DeniedLocation {
        async fn current_position(&self, _options: &FixOptions) -> Result<Coordinate, DeviceError> {
            Err(DeviceError::PermissionDenied("user denied geolocation".into()))
        }
    }

    struct HangingLocation;

    #[async_trait]
    impl LocationSource for HangingLocation {
        async fn current_position(&self, _options: &FixOptions) -> Result<Coordinate, DeviceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    struct StubCamera {
        captures: AtomicUsize,
    }

    impl StubCamera {
        fn new() -> Self {
            Self {
                captures: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CameraDevice for StubCamera {
        async fn capture_still(&self) -> Result<CapturedImage, DeviceError> {
            let n = self.captures.fetch_add(1, Ordering::SeqCst);
            Ok(CapturedImage::jpeg(format!(
                "data:image/jpeg;base64,frame{}",
                n
            )))
        }
    }

    struct BrokenCamera;

    #[async_trait]
    impl CameraDevice for BrokenCamera {
        async fn capture_still(&self) -> Result<CapturedImage, DeviceError> {
            Err(DeviceError::Unavailable("no camera on this device".into()))
        }
    }

    /// Repository that fails the first `failures` inserts, then delegates.
    struct FlakyRepository {
        inner: LocalRepository,
        remaining_failures: AtomicUsize,
    }

    #[async_trait]
    impl AnalysisRepository for FlakyRepository {
        async fn insert_analysis(
            &self,
            new: crate::api::NewAnalysis,
        ) -> RepositoryResult<AnalysisRecord> {
            if self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(RepositoryError::connection("transient outage"));
            }
            self.inner.insert_analysis(new).await
        }

        async fn list_by_owner(
            &self,
            owner: &OwnerId,
        ) -> RepositoryResult<Vec<AnalysisRecord>> {
            self.inner.list_by_owner(owner).await
        }

        async fn delete_by_id(
            &self,
            owner: &OwnerId,
            id: &crate::api::RecordId,
        ) -> RepositoryResult<()> {
            self.inner.delete_by_id(owner, id).await
        }

        async fn health_check(&self) -> RepositoryResult<bool> {
            Ok(true)
        }
    }

    fn context() -> SessionContext {
        SessionContext::init(Identity {
            id: OwnerId::new("u1"),
            email: "farmer@example.com".to_string(),
        })
    }

    fn session_with(
        location: Arc<dyn LocationSource>,
        camera: Arc<dyn CameraDevice>,
        repository: Arc<dyn AnalysisRepository>,
    ) -> CaptureSession {
        CaptureSession::new(context(), location, camera, repository)
    }

    fn tropical_session(repository: Arc<dyn AnalysisRepository>) -> CaptureSession {
        session_with(
            Arc::new(FixedLocation {
                coordinate: Coordinate::new(10.0, 20.0),
            }),
            Arc::new(StubCamera::new()),
            repository,
        )
    }

    #[tokio::test]
    async fn test_happy_path_capture_and_submit() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = tropical_session(repo.clone());
        assert_eq!(session.state(), CaptureState::Idle);

        session.refresh_location().await.unwrap();
        assert_eq!(session.state(), CaptureState::LocationReady);

        session.capture_image().await.unwrap();
        assert_eq!(session.state(), CaptureState::ImageReady);

        session.set_notes("north field");
        let record = session.submit().await.unwrap();
        assert_eq!(session.state(), CaptureState::Complete);
        assert_eq!(record.report.terrain, "Tropical");
        assert_eq!(record.notes.as_deref(), Some("north field"));

        // Image and notes reset, coordinate cached for the next capture.
        assert!(session.image().is_none());
        assert!(session.coordinate().is_some());

        let listed = repo.list_by_owner(&OwnerId::new("u1")).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_location_failure_returns_to_idle() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = session_with(
            Arc::new(DeniedLocation),
            Arc::new(StubCamera::new()),
            repo,
        );

        let err = session.refresh_location().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Device(DeviceError::PermissionDenied(_))
        ));
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_fix_is_time_bounded() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = session_with(
            Arc::new(HangingLocation),
            Arc::new(StubCamera::new()),
            repo,
        )
        .with_fix_options(FixOptions {
            timeout: Duration::from_secs(10),
            ..FixOptions::default()
        });

        let err = session.refresh_location().await.unwrap_err();
        assert!(matches!(err, SessionError::Device(DeviceError::Timeout(_))));
        assert_eq!(session.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn test_capture_requires_location() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = tropical_session(repo);

        let err = session.capture_image().await.unwrap_err();
        assert!(matches!(err, SessionError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_camera_failure_is_recoverable() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = session_with(
            Arc::new(FixedLocation {
                coordinate: Coordinate::new(10.0, 20.0),
            }),
            Arc::new(BrokenCamera),
            repo,
        );

        session.refresh_location().await.unwrap();
        let err = session.capture_image().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Device(DeviceError::Unavailable(_))
        ));
        // Still holding the fix; a retry path exists.
        assert_eq!(session.state(), CaptureState::LocationReady);
    }

    #[tokio::test]
    async fn test_location_refresh_keeps_captured_image() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = tropical_session(repo);

        session.refresh_location().await.unwrap();
        session.capture_image().await.unwrap();
        let image_before = session.image().cloned();

        session.refresh_location().await.unwrap();
        assert_eq!(session.state(), CaptureState::ImageReady);
        assert_eq!(session.image().cloned(), image_before);
    }

    #[tokio::test]
    async fn test_retake_replaces_image_before_submit() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = tropical_session(repo.clone());

        session.refresh_location().await.unwrap();
        let first = session.capture_image().await.unwrap().clone();
        assert_eq!(session.state(), CaptureState::ImageReady);

        // Retake while still in ImageReady: only the new frame survives.
        let second = session.capture_image().await.unwrap().clone();
        assert_ne!(second, first);
        assert_eq!(session.image(), Some(&second));

        let record = session.submit().await.unwrap();
        assert_eq!(record.image_data, second.data);

        let listed = repo.list_by_owner(&OwnerId::new("u1")).await.unwrap();
        assert_eq!(listed.len(), 1, "one record despite two captures");
    }

    #[tokio::test]
    async fn test_submit_without_image_is_rejected() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = tropical_session(repo.clone());

        session.refresh_location().await.unwrap();
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SessionError::Precondition(_)));

        let listed = repo.list_by_owner(&OwnerId::new("u1")).await.unwrap();
        assert!(listed.is_empty(), "rejected before any store call");
    }

    #[tokio::test]
    async fn test_failed_submit_allows_retry_without_recapture() {
        let repo = Arc::new(FlakyRepository {
            inner: LocalRepository::new(),
            remaining_failures: AtomicUsize::new(1),
        });
        let mut session = tropical_session(repo.clone());

        session.refresh_location().await.unwrap();
        session.capture_image().await.unwrap();

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SessionError::Submit(SubmitError::Persistence(_))));
        assert_eq!(session.state(), CaptureState::Failed);
        assert!(session.image().is_some(), "inputs retained for retry");

        // Retry succeeds with the same captured inputs.
        let record = session.submit().await.unwrap();
        assert_eq!(record.report.terrain, "Tropical");
        assert_eq!(session.state(), CaptureState::Complete);
    }

    #[tokio::test]
    async fn test_second_capture_after_complete_uses_cached_location() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = tropical_session(repo.clone());

        session.refresh_location().await.unwrap();
        session.capture_image().await.unwrap();
        session.submit().await.unwrap();

        // No new fix needed; capture again directly.
        session.capture_image().await.unwrap();
        let record = session.submit().await.unwrap();
        assert_eq!(record.report.terrain, "Tropical");

        let listed = repo.list_by_owner(&OwnerId::new("u1")).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_close_discards_capture_state() {
        let repo = Arc::new(LocalRepository::new());
        let mut session = tropical_session(repo);

        session.refresh_location().await.unwrap();
        session.capture_image().await.unwrap();
        session.set_notes("scrap this");

        session.close();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.coordinate().is_none());
        assert!(session.image().is_none());
    }
}
