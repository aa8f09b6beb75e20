//! Monthly summary, dashboard and health

use super::{check_month, ClientError, InvoiceClient};
use crate::client::middleware::ApiRequest;
use gstpro_core::{DashboardData, HealthReport, MonthlySummary};

impl InvoiceClient {
    /// Tax totals for a month, across all profiles unless one is given
    pub async fn monthly_summary(
        &self,
        year: i32,
        month: u32,
        business_profile_id: Option<i64>,
    ) -> Result<MonthlySummary, ClientError> {
        check_month(month)?;
        let request = ApiRequest::get("/summary/monthly")
            .query("year", year)
            .query("month", month)
            .query_opt("business_profile_id", business_profile_id);
        self.execute(request).await
    }

    pub async fn dashboard(
        &self,
        year: i32,
        month: u32,
        business_id: Option<i64>,
    ) -> Result<DashboardData, ClientError> {
        check_month(month)?;
        let request = ApiRequest::get("/dashboard/")
            .query("year", year)
            .query("month", month)
            .query_opt("business_id", business_id);
        self.execute(request).await
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        self.execute(ApiRequest::get("/health/")).await
    }

    pub async fn readiness(&self) -> Result<HealthReport, ClientError> {
        self.execute(ApiRequest::get("/health/readiness")).await
    }
}
