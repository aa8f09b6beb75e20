//! Business profiles: the seller identity printed on every invoice

use crate::error::ValidationErrors;
use crate::serde_utils::{option_timestamp, timestamp};
use crate::validation::{validators::*, Validate, DEFAULT_COUNTRY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business profile fields supplied by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfileData {
    pub name: String,
    /// 15 character GSTIN
    pub gstin: String,
    pub address: String,
    pub city: String,
    /// State where the business is registered
    pub state: String,
    /// Two digit state code
    pub state_code: String,
    /// Six digit PIN code
    pub pin: String,
    /// Ten digit phone number
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Business profile as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: i64,
    pub user_id: i64,
    pub current_invoice_number: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "option_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub profile: BusinessProfileData,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfileUpdate {
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
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl Validate for BusinessProfileData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_not_empty(&self.name, "name"));
        errors.check(validate_gstin(&self.gstin, DEFAULT_COUNTRY, "gstin"));
        errors.check(validate_not_empty(&self.address, "address"));
        errors.check(validate_not_empty(&self.city, "city"));
        errors.check(validate_not_empty(&self.state, "state"));
        errors.check(validate_digits(&self.state_code, 2, "state_code"));
        errors.check(validate_digits(&self.pin, 6, "pin"));
        errors.check(validate_digits(&self.phone, 10, "phone"));
        errors.check(validate_email(&self.email, "email"));
        errors.into_result()
    }
}

impl Validate for BusinessProfileUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validate_not_empty(name, "name"));
        }
        if let Some(gstin) = &self.gstin {
            errors.check(validate_gstin(gstin, DEFAULT_COUNTRY, "gstin"));
        }
        if let Some(address) = &self.address {
            errors.check(validate_not_empty(address, "address"));
        }
        if let Some(city) = &self.city {
            errors.check(validate_not_empty(city, "city"));
        }
        if let Some(state) = &self.state {
            errors.check(validate_not_empty(state, "state"));
        }
        if let Some(state_code) = &self.state_code {
            errors.check(validate_digits(state_code, 2, "state_code"));
        }
        if let Some(pin) = &self.pin {
            errors.check(validate_digits(pin, 6, "pin"));
        }
        if let Some(phone) = &self.phone {
            errors.check(validate_digits(phone, 10, "phone"));
        }
        if let Some(email) = &self.email {
            errors.check(validate_email(email, "email"));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> BusinessProfileData {
        BusinessProfileData {
            name: "Acme Traders".into(),
            gstin: "27AAPFU0939F1ZV".into(),
            address: "12 MG Road".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            state_code: "27".into(),
            pin: "411001".into(),
            phone: "9876543210".into(),
            email: "accounts@acme.in".into(),
            logo_url: None,
            is_default: false,
        }
    }

    #[test]
    fn test_valid_profile() {
        assert!(profile().validate().is_ok());
    }

    #[test]
    fn test_collects_every_failing_field() {
        let mut p = profile();
        p.pin = "4110".into();
        p.phone = "98765".into();
        p.state_code = "MH".into();

        let errors = p.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("pin"));
        assert!(errors.has_field("phone"));
        assert!(errors.has_field("state_code"));
    }

    #[test]
    fn test_rejects_legacy_pincode_field_name() {
        let body = json!({
            "name": "Acme Traders",
            "gstin": "27AAPFU0939F1ZV",
            "address": "12 MG Road",
            "city": "Pune",
            "state": "Maharashtra",
            "state_code": "27",
            "pincode": "411001",
            "phone": "9876543210",
            "email": "accounts@acme.in"
        });
        assert!(serde_json::from_value::<BusinessProfileData>(body).is_err());
    }

    #[test]
    fn test_record_flattens_profile() {
        let body = json!({
            "id": 3,
            "user_id": 1,
            "current_invoice_number": 14,
            "created_at": "2024-04-01T10:30:00",
            "updated_at": null,
            "name": "Acme Traders",
            "gstin": "27AAPFU0939F1ZV",
            "address": "12 MG Road",
            "city": "Pune",
            "state": "Maharashtra",
            "state_code": "27",
            "pin": "411001",
            "phone": "9876543210",
            "email": "accounts@acme.in",
            "logo_url": null,
            "is_default": false
        });
        let record: BusinessProfile = serde_json::from_value(body).unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.profile, profile());
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = BusinessProfileUpdate {
            phone: Some("9123456780".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"phone": "9123456780"}));
        assert!(update.validate().is_ok());
    }
}
