//! Product client methods

use super::{id_path, ClientError, InvoiceClient, Page};
use crate::client::middleware::ApiRequest;
use gstpro_core::{Product, ProductData, ProductUpdate, Validate};

const COLLECTION: &str = "products";

impl InvoiceClient {
    pub async fn list_products(&self, page: Page) -> Result<Vec<Product>, ClientError> {
        let request = page.apply(ApiRequest::get(format!("/{COLLECTION}/")));
        self.execute(request).await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, ClientError> {
        self.execute(ApiRequest::get(id_path(COLLECTION, id))).await
    }

    pub async fn create_product(&self, product: &ProductData) -> Result<Product, ClientError> {
        product.validate()?;
        let request = ApiRequest::post(format!("/{COLLECTION}/")).json(product)?;
        self.execute(request).await
    }

    pub async fn update_product(&self, id: i64, update: &ProductUpdate) -> Result<Product, ClientError> {
        update.validate()?;
        let request = ApiRequest::put(id_path(COLLECTION, id)).json(update)?;
        self.execute(request).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<Product, ClientError> {
        self.execute(ApiRequest::delete(id_path(COLLECTION, id))).await
    }
}
