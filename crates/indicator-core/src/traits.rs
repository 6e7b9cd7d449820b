use async_trait::async_trait;
use crate::{FetchError, HeadlineIndicator, HeadlineReading, Series, SeriesId};

/// Supplier of chronological, date-deduplicated observation series
#[async_trait]
pub trait ObservationSource: Send + Sync {
    async fn fetch_series(&self, series_id: &SeriesId) -> Result<Series, FetchError>;
}

/// Supplier of the latest value of each headline indicator
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn latest(&self, indicator: HeadlineIndicator) -> Result<HeadlineReading, FetchError>;
}
