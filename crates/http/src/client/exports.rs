//! NIC e-invoice JSON and monthly spreadsheet exports

use super::{check_month, ClientError, InvoiceClient};
use crate::client::middleware::ApiRequest;
use bytes::Bytes;
use gstpro_core::{Invoice, NicJsonExport, NicJsonImport};
use serde_json::Value as JsonValue;

/// Month of invoices for one business profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPeriod {
    pub year: i32,
    pub month: u32,
    pub business_profile_id: i64,
}

impl ExportPeriod {
    fn request(self, path: &str) -> Result<ApiRequest, ClientError> {
        check_month(self.month)?;
        Ok(ApiRequest::get(path)
            .query("year", self.year)
            .query("month", self.month)
            .query("business_profile_id", self.business_profile_id))
    }
}

impl InvoiceClient {
    pub async fn export_nic_json(&self, invoice_id: i64) -> Result<NicJsonExport, ClientError> {
        let request = ApiRequest::get(format!("/exports/invoice/{invoice_id}/json"));
        self.execute(request).await
    }

    /// Create an invoice from a NIC e-invoice document
    pub async fn import_nic_json(&self, document: JsonValue) -> Result<Invoice, ClientError> {
        let request = ApiRequest::post("/exports/invoice/import-json")
            .json(&NicJsonImport { json_data: document })?;
        self.execute(request).await
    }

    pub async fn export_csv(&self, period: ExportPeriod) -> Result<Bytes, ClientError> {
        let request = period.request("/exports/invoices/export-csv")?;
        self.execute_bytes(request).await
    }

    pub async fn export_excel(&self, period: ExportPeriod) -> Result<Bytes, ClientError> {
        let request = period.request("/exports/invoices/export-excel")?;
        self.execute_bytes(request).await
    }
}
