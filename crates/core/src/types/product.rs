//! Products and services that can be billed

use crate::error::ValidationErrors;
use crate::serde_utils::{option_timestamp, timestamp};
use crate::validation::{validators::*, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product fields supplied by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// HSN code for goods, SAC code for services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn_sac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// GST rate in percent
    pub tax_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
}

/// Product as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "option_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub product: ProductData,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn_sac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_service: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
}

impl Product {
    /// Whether tracked stock has fallen to the warning threshold
    pub fn is_low_stock(&self) -> bool {
        match (self.product.stock_quantity, self.product.low_stock_threshold) {
            (Some(quantity), Some(threshold)) => quantity <= threshold,
            _ => false,
        }
    }
}

impl Validate for ProductData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_not_empty(&self.name, "name"));
        if let Some(code) = self.hsn_sac.as_deref().filter(|c| !c.is_empty()) {
            errors.check(validate_hsn_sac(code, self.is_service, "hsn_sac"));
        }
        if let Some(price) = self.price {
            errors.check(validate_non_negative(price, "price"));
        }
        errors.check(validate_non_negative(self.tax_rate, "tax_rate"));
        if let Some(quantity) = self.stock_quantity {
            errors.check(validate_non_negative(quantity, "stock_quantity"));
        }
        if let Some(threshold) = self.low_stock_threshold {
            errors.check(validate_non_negative(threshold, "low_stock_threshold"));
        }
        errors.into_result()
    }
}

impl Validate for ProductUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validate_not_empty(name, "name"));
        }
        if let Some(code) = self.hsn_sac.as_deref().filter(|c| !c.is_empty()) {
            let is_service = self.is_service.unwrap_or(false);
            errors.check(validate_hsn_sac(code, is_service, "hsn_sac"));
        }
        if let Some(price) = self.price {
            errors.check(validate_non_negative(price, "price"));
        }
        if let Some(tax_rate) = self.tax_rate {
            errors.check(validate_non_negative(tax_rate, "tax_rate"));
        }
        if let Some(quantity) = self.stock_quantity {
            errors.check(validate_non_negative(quantity, "stock_quantity"));
        }
        if let Some(threshold) = self.low_stock_threshold {
            errors.check(validate_non_negative(threshold, "low_stock_threshold"));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ProductData {
        ProductData {
            name: "Consulting".into(),
            description: None,
            hsn_sac: Some("998311".into()),
            sku: None,
            is_service: true,
            price: Some(2500.0),
            tax_rate: 18.0,
            unit: Some("hour".into()),
            stock_quantity: None,
            low_stock_threshold: None,
        }
    }

    #[test]
    fn test_service_requires_sac() {
        assert!(service().validate().is_ok());

        let goods_code = ProductData {
            hsn_sac: Some("8471".into()),
            ..service()
        };
        assert!(goods_code.validate().unwrap_err().has_field("hsn_sac"));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let product = ProductData {
            price: Some(-1.0),
            tax_rate: -5.0,
            stock_quantity: Some(-2),
            ..service()
        };
        let errors = product.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_low_stock() {
        let product = Product {
            id: 1,
            user_id: 1,
            created_at: Utc::now(),
            updated_at: None,
            product: ProductData {
                is_service: false,
                hsn_sac: Some("8471".into()),
                stock_quantity: Some(3),
                low_stock_threshold: Some(5),
                ..service()
            },
        };
        assert!(product.is_low_stock());
    }
}
