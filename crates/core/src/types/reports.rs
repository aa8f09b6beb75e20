//! Read-only aggregates: monthly tax summary, dashboard, NIC JSON documents

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Monthly tax summary, optionally filtered to one business profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub business_profile_id: Option<i64>,
    pub total_invoices: u64,
    pub total_taxable_amount: f64,
    pub total_cgst: f64,
    pub total_sgst: f64,
    pub total_igst: f64,
    /// CGST + SGST + IGST
    pub total_tax: f64,
    /// Taxable amount + tax
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: i64,
    pub name: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    pub invoice_date: String,
    pub grand_total: f64,
    pub payment_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTaxData {
    pub month: String,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
}

/// Dashboard metrics; the server uses camelCase keys here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_invoices: u64,
    pub taxable_amount: f64,
    pub cgst_amount: f64,
    pub sgst_amount: f64,
    pub igst_amount: f64,
    pub pending_payments: f64,
    pub top_customers: Vec<CustomerSummary>,
    pub recent_invoices: Vec<InvoiceSummary>,
    pub monthly_data: Vec<MonthlyTaxData>,
}

/// Invoice rendered in the NIC e-invoice JSON schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicJsonExport {
    pub invoice_data: JsonValue,
}

/// NIC e-invoice JSON to be imported as a new invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicJsonImport {
    pub json_data: JsonValue,
}

/// Service status from the health endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `ok`, `error` or `ready`
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Database and host details, passed through as reported
    #[serde(flatten)]
    pub details: serde_json::Map<String, JsonValue>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "ready")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dashboard_camel_case() {
        let body = json!({
            "totalInvoices": 4,
            "taxableAmount": 1000.0,
            "cgstAmount": 90.0,
            "sgstAmount": 90.0,
            "igstAmount": 0.0,
            "pendingPayments": 1180.0,
            "topCustomers": [{"id": 2, "name": "Bharat Stores", "totalAmount": 1180.0}],
            "recentInvoices": [{
                "id": 9,
                "invoice_number": "INV-0009",
                "customer_name": "Bharat Stores",
                "invoice_date": "2024-04-01",
                "grand_total": 1180.0,
                "payment_status": "Unpaid"
            }],
            "monthlyData": [{"month": "Apr", "cgst": 90.0, "sgst": 90.0, "igst": 0.0}]
        });
        let data: DashboardData = serde_json::from_value(body).unwrap();
        assert_eq!(data.total_invoices, 4);
        assert_eq!(data.top_customers[0].total_amount, 1180.0);
        assert_eq!(data.recent_invoices[0].invoice_number, "INV-0009");
    }

    #[test]
    fn test_health_keeps_details() {
        let report: HealthReport = serde_json::from_value(json!({
            "status": "error",
            "version": "1.0.0",
            "database": {"status": "unhealthy", "error": "connection refused"}
        }))
        .unwrap();
        assert!(!report.is_healthy());
        assert_eq!(report.details["database"]["status"], "unhealthy");

        let ready: HealthReport = serde_json::from_value(json!({"status": "ready"})).unwrap();
        assert!(ready.is_healthy());
    }
}
