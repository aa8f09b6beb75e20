//! Business profile client methods

use super::{id_path, ClientError, InvoiceClient, Page};
use crate::client::middleware::ApiRequest;
use gstpro_core::{BusinessProfile, BusinessProfileData, BusinessProfileUpdate, Validate};

const COLLECTION: &str = "business-profiles";

impl InvoiceClient {
    pub async fn list_business_profiles(&self, page: Page) -> Result<Vec<BusinessProfile>, ClientError> {
        let request = page.apply(ApiRequest::get(format!("/{COLLECTION}/")));
        self.execute(request).await
    }

    pub async fn get_business_profile(&self, id: i64) -> Result<BusinessProfile, ClientError> {
        self.execute(ApiRequest::get(id_path(COLLECTION, id))).await
    }

    pub async fn create_business_profile(
        &self,
        profile: &BusinessProfileData,
    ) -> Result<BusinessProfile, ClientError> {
        profile.validate()?;
        let request = ApiRequest::post(format!("/{COLLECTION}/")).json(profile)?;
        self.execute(request).await
    }

    pub async fn update_business_profile(
        &self,
        id: i64,
        update: &BusinessProfileUpdate,
    ) -> Result<BusinessProfile, ClientError> {
        update.validate()?;
        let request = ApiRequest::put(id_path(COLLECTION, id)).json(update)?;
        self.execute(request).await
    }

    /// Delete a profile, returning the removed record
    pub async fn delete_business_profile(&self, id: i64) -> Result<BusinessProfile, ClientError> {
        self.execute(ApiRequest::delete(id_path(COLLECTION, id))).await
    }

    /// Make this profile the default; the server unsets the previous one
    pub async fn set_default_business_profile(&self, id: i64) -> Result<BusinessProfile, ClientError> {
        let request = ApiRequest::put(format!("{}/default", id_path(COLLECTION, id)));
        self.execute(request).await
    }
}
