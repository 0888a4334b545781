use async_trait::async_trait;
use kirana_shared::GeoPoint;

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    Denied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Resolves the device position. Attempted once per session; callers fall
/// back to `GeoPoint::DEFAULT` on failure rather than retrying.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self) -> Result<GeoPoint, LocationError>;
}

/// Resolver pinned to a fixed coordinate, for tests and headless
/// deployments with no position source.
pub struct FixedLocationResolver {
    point: GeoPoint,
}

impl FixedLocationResolver {
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

#[async_trait]
impl LocationResolver for FixedLocationResolver {
    async fn resolve(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.point)
    }
}

/// Resolve once; any failure falls back to the default origin.
pub async fn resolve_or_default(resolver: &dyn LocationResolver) -> GeoPoint {
    match resolver.resolve().await {
        Ok(point) => point,
        Err(e) => {
            tracing::warn!("position resolution failed, using default origin: {}", e);
            GeoPoint::DEFAULT
        }
    }
}
