//! The data source a search runs against.

use std::future::Future;

use crate::api::{FareApiError, FareClient, MockFareClient};
use crate::domain::{City, CityId, LineRecord, LookupArguments};

/// Trait for providing line data.
///
/// This abstraction allows the controller and session to be tested with
/// scripted data, and to run against the live API, the cached client or the
/// file-backed mock interchangeably.
pub trait LineSource: Send + Sync {
    /// Fetch the lines matching `args`.
    ///
    /// Absent optional filters in `args` must apply no constraint, and at
    /// most `args.limit` rows are returned.
    fn fetch_lines(
        &self,
        args: &LookupArguments,
    ) -> impl Future<Output = Result<Vec<LineRecord>, FareApiError>> + Send;

    /// Fetch a city's name and place in the country.
    fn fetch_city(
        &self,
        city_id: &CityId,
    ) -> impl Future<Output = Result<Option<City>, FareApiError>> + Send;
}

impl LineSource for FareClient {
    async fn fetch_lines(&self, args: &LookupArguments) -> Result<Vec<LineRecord>, FareApiError> {
        self.get_lines(args).await
    }

    async fn fetch_city(&self, city_id: &CityId) -> Result<Option<City>, FareApiError> {
        self.get_city(city_id).await
    }
}

impl LineSource for MockFareClient {
    async fn fetch_lines(&self, args: &LookupArguments) -> Result<Vec<LineRecord>, FareApiError> {
        self.get_lines(args).await
    }

    async fn fetch_city(&self, city_id: &CityId) -> Result<Option<City>, FareApiError> {
        self.get_city(city_id).await
    }
}
