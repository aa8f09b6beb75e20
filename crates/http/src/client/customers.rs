//! Customer client methods

use super::{id_path, ClientError, InvoiceClient, Page};
use crate::client::middleware::ApiRequest;
use gstpro_core::{Customer, CustomerData, CustomerUpdate, Validate};

const COLLECTION: &str = "customers";

impl InvoiceClient {
    pub async fn list_customers(&self, page: Page) -> Result<Vec<Customer>, ClientError> {
        let request = page.apply(ApiRequest::get(format!("/{COLLECTION}/")));
        self.execute(request).await
    }

    pub async fn get_customer(&self, id: i64) -> Result<Customer, ClientError> {
        self.execute(ApiRequest::get(id_path(COLLECTION, id))).await
    }

    /// Create a customer; the payload is normalized before it is checked
    pub async fn create_customer(&self, customer: &CustomerData) -> Result<Customer, ClientError> {
        let customer = customer.normalized();
        customer.validate()?;
        let request = ApiRequest::post(format!("/{COLLECTION}/")).json(&customer)?;
        self.execute(request).await
    }

    pub async fn update_customer(&self, id: i64, update: &CustomerUpdate) -> Result<Customer, ClientError> {
        update.validate()?;
        let request = ApiRequest::put(id_path(COLLECTION, id)).json(update)?;
        self.execute(request).await
    }

    pub async fn delete_customer(&self, id: i64) -> Result<Customer, ClientError> {
        self.execute(ApiRequest::delete(id_path(COLLECTION, id))).await
    }
}
