//! Invoice client methods

use super::{id_path, ClientError, InvoiceClient, Page};
use crate::client::middleware::ApiRequest;
use bytes::Bytes;
use gstpro_core::{Invoice, InvoiceCreate, InvoiceUpdate, Validate};
use serde_json::Value as JsonValue;

const COLLECTION: &str = "invoices";

impl InvoiceClient {
    pub async fn list_invoices(&self, page: Page) -> Result<Vec<Invoice>, ClientError> {
        let request = page.apply(ApiRequest::get(format!("/{COLLECTION}/")));
        self.execute(request).await
    }

    pub async fn get_invoice(&self, id: i64) -> Result<Invoice, ClientError> {
        self.execute(ApiRequest::get(id_path(COLLECTION, id))).await
    }

    /// Create an invoice; totals and tax split are computed by the server
    pub async fn create_invoice(&self, invoice: &InvoiceCreate) -> Result<Invoice, ClientError> {
        invoice.validate()?;
        let request = ApiRequest::post(format!("/{COLLECTION}/")).json(invoice)?;
        self.execute(request).await
    }

    pub async fn update_invoice(&self, id: i64, update: &InvoiceUpdate) -> Result<Invoice, ClientError> {
        update.validate()?;
        let request = ApiRequest::put(id_path(COLLECTION, id)).json(update)?;
        self.execute(request).await
    }

    pub async fn delete_invoice(&self, id: i64) -> Result<Invoice, ClientError> {
        self.execute(ApiRequest::delete(id_path(COLLECTION, id))).await
    }

    /// Rendered PDF
    pub async fn invoice_pdf(&self, id: i64) -> Result<Bytes, ClientError> {
        let request = ApiRequest::get(format!("{}/pdf", id_path(COLLECTION, id)));
        self.execute_bytes(request).await
    }

    /// Invoice in the GST IRP upload schema
    pub async fn invoice_gst_json(&self, id: i64) -> Result<JsonValue, ClientError> {
        let request = ApiRequest::get(format!("{}/gst-json", id_path(COLLECTION, id)));
        self.execute(request).await
    }
}
