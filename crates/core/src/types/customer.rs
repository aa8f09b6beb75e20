//! Customers: the buyer side of an invoice

use crate::error::{ValidationError, ValidationErrors};
use crate::serde_utils::{option_timestamp, timestamp};
use crate::validation::{
    is_india, state_from_gstin, validators::*, Validate, DEFAULT_COUNTRY, UNREGISTERED_GSTIN,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// Customer fields supplied by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerData {
    pub name: String,
    /// GSTIN for Indian customers, `URP` for foreign ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
    /// Postal or ZIP code
    pub pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Customer as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "option_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub customer: CustomerData,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *value = None;
    }
}

/// Canonical spelling for the countries the server compares against
fn standard_country(country: &str) -> Option<&'static str> {
    match country.trim().to_ascii_lowercase().as_str() {
        "india" => Some("India"),
        "australia" => Some("Australia"),
        "united states" => Some("United States"),
        "united kingdom" => Some("United Kingdom"),
        _ => None,
    }
}

impl CustomerData {
    /// Apply the server's normalization rules before validating or sending
    ///
    /// Blank optional fields become `None`, well-known countries get their
    /// canonical spelling, foreign customers without a GSTIN get `URP`, and an
    /// Indian customer with a GSTIN but no state gets the state it encodes.
    pub fn normalized(&self) -> Self {
        let mut customer = self.clone();
        blank_to_none(&mut customer.gstin);
        blank_to_none(&mut customer.email);
        blank_to_none(&mut customer.phone);
        blank_to_none(&mut customer.notes);

        if let Some(country) = standard_country(&customer.country) {
            customer.country = country.to_string();
        }

        if let Some(gstin) = &mut customer.gstin {
            *gstin = gstin.trim().to_ascii_uppercase();
        }

        if customer.is_foreign() && customer.gstin.is_none() {
            customer.gstin = Some(UNREGISTERED_GSTIN.to_string());
        }

        if is_india(&customer.country) && customer.state.trim().is_empty() {
            if let Some(state) = customer.gstin.as_deref().and_then(state_from_gstin) {
                customer.state = state.to_string();
            }
        }

        customer
    }

    pub fn is_foreign(&self) -> bool {
        !is_india(&self.country)
    }
}

fn validate_customer_gstin(gstin: &str, country: &str) -> Result<(), ValidationError> {
    let is_urp = gstin.trim().eq_ignore_ascii_case(UNREGISTERED_GSTIN);
    if !is_india(country) && !is_urp {
        return Err(ValidationError::new(
            "gstin",
            "GSTIN for foreign customers must be 'URP'",
        ));
    }
    validate_gstin(gstin, country, "gstin")
}

impl Validate for CustomerData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_not_empty(&self.name, "name"));
        errors.check(validate_not_empty(&self.address, "address"));
        errors.check(validate_not_empty(&self.city, "city"));
        errors.check(validate_not_empty(&self.state, "state"));
        errors.check(validate_not_empty(&self.country, "country"));
        errors.check(validate_postal_code(&self.pincode, &self.country, "pincode"));
        if let Some(gstin) = self.gstin.as_deref().filter(|g| !g.trim().is_empty()) {
            errors.check(validate_customer_gstin(gstin, &self.country));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            errors.check(validate_email(email, "email"));
        }
        errors.into_result()
    }
}

impl Validate for CustomerUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validate_not_empty(name, "name"));
        }
        if let Some(address) = &self.address {
            errors.check(validate_not_empty(address, "address"));
        }
        if let Some(city) = &self.city {
            errors.check(validate_not_empty(city, "city"));
        }
        if let Some(country) = &self.country {
            errors.check(validate_not_empty(country, "country"));
        }
        if let Some(pincode) = &self.pincode {
            let country = self.country.as_deref().unwrap_or(DEFAULT_COUNTRY);
            errors.check(validate_postal_code(pincode, country, "pincode"));
        }
        if let Some(gstin) = self.gstin.as_deref().filter(|g| !g.trim().is_empty()) {
            match self.country.as_deref() {
                Some(country) => errors.check(validate_customer_gstin(gstin, country)),
                // Without a country only the Indian format can be checked
                None if !gstin.trim().eq_ignore_ascii_case(UNREGISTERED_GSTIN) => {
                    errors.check(validate_gstin(gstin, DEFAULT_COUNTRY, "gstin"));
                }
                None => {}
            }
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            errors.check(validate_email(email, "email"));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indian() -> CustomerData {
        CustomerData {
            name: "Bharat Stores".into(),
            gstin: Some("29AABCU9603R1ZM".into()),
            address: "4 Residency Road".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            country: "India".into(),
            pincode: "560025".into(),
            email: Some("owner@bharat.in".into()),
            phone: None,
            notes: None,
        }
    }

    #[test]
    fn test_indian_customer_is_valid() {
        assert!(indian().validate().is_ok());
    }

    #[test]
    fn test_foreign_customer_gets_urp() {
        let customer = CustomerData {
            gstin: Some(String::new()),
            country: "australia".into(),
            pincode: "NSW 2000".into(),
            ..indian()
        }
        .normalized();

        assert_eq!(customer.country, "Australia");
        assert_eq!(customer.gstin.as_deref(), Some("URP"));
        assert!(customer.validate().is_ok());
    }

    #[test]
    fn test_foreign_customer_with_real_gstin_is_rejected() {
        let customer = CustomerData {
            country: "United States".into(),
            pincode: "94105".into(),
            ..indian()
        };
        let errors = customer.validate().unwrap_err();
        assert!(errors.has_field("gstin"));
    }

    #[test]
    fn test_state_derived_from_gstin() {
        let customer = CustomerData {
            state: String::new(),
            ..indian()
        }
        .normalized();
        assert_eq!(customer.state, "Karnataka");
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let customer = CustomerData {
            email: Some("  ".into()),
            notes: Some(String::new()),
            ..indian()
        }
        .normalized();
        assert_eq!(customer.email, None);
        assert_eq!(customer.notes, None);
    }

    #[test]
    fn test_indian_pincode_must_be_numeric() {
        let customer = CustomerData {
            pincode: "56OO25".into(),
            ..indian()
        };
        assert!(customer.validate().unwrap_err().has_field("pincode"));
    }

    #[test]
    fn test_update_without_country_allows_urp() {
        let update = CustomerUpdate {
            gstin: Some("URP".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let update = CustomerUpdate {
            gstin: Some("URP".into()),
            country: Some("India".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
