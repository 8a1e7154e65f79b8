//! Analytics API client methods

use super::{ApiClient, ClientError, request::ApiRequest};
use crate::types::{AnalyticsOverview, MonthlyCounts, RoleDistribution, UserStats};

/// Months covered by [`ApiClient::monthly`] when the caller has no preference
pub const DEFAULT_MONTHS: u32 = 6;

impl ApiClient {
    /// User and prediction totals
    pub async fn overview(&self) -> Result<AnalyticsOverview, ClientError> {
        self.execute(ApiRequest::get("/analytics/overview/")).await
    }

    /// Prediction count per role, most predicted first
    pub async fn roles(&self) -> Result<RoleDistribution, ClientError> {
        self.execute(ApiRequest::get("/analytics/roles/")).await
    }

    /// Prediction count per month over the last `months` months
    pub async fn monthly(&self, months: u32) -> Result<MonthlyCounts, ClientError> {
        let req = ApiRequest::get("/analytics/monthly/").query("months", months);
        self.execute(req).await
    }

    /// Users with the most predictions
    pub async fn users(&self) -> Result<UserStats, ClientError> {
        self.execute(ApiRequest::get("/analytics/users/")).await
    }
}
