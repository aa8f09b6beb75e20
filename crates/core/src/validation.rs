//! Canonical validation rules for invoicing payloads
//!
//! Each resource payload implements [`Validate`] exactly once. Field names in
//! error reports match the wire names so they line up with server-side 422
//! details.

use crate::error::{ValidationError, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;

/// GSTIN placeholder for unregistered (foreign) customers
pub const UNREGISTERED_GSTIN: &str = "URP";

/// Country assumed when a customer payload doesn't name one
pub const DEFAULT_COUNTRY: &str = "India";

static GSTIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][0-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
});
static HSN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}(\d{2}(\d{2})?)?$").expect("valid HSN regex"));
static SAC_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid SAC regex"));
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Trait for validating a payload before it is sent
pub trait Validate {
    /// Validate every field, collecting all failures
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Whether a country name refers to India, ignoring case and surrounding space
pub fn is_india(country: &str) -> bool {
    country.trim().eq_ignore_ascii_case(DEFAULT_COUNTRY)
}

/// Map a two digit GSTIN state code to its state name
pub fn state_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "01" => "Jammu and Kashmir",
        "02" => "Himachal Pradesh",
        "03" => "Punjab",
        "04" => "Chandigarh",
        "05" => "Uttarakhand",
        "06" => "Haryana",
        "07" => "Delhi",
        "08" => "Rajasthan",
        "09" => "Uttar Pradesh",
        "10" => "Bihar",
        "11" => "Sikkim",
        "12" => "Arunachal Pradesh",
        "13" => "Nagaland",
        "14" => "Manipur",
        "15" => "Mizoram",
        "16" => "Tripura",
        "17" => "Meghalaya",
        "18" => "Assam",
        "19" => "West Bengal",
        "20" => "Jharkhand",
        "21" => "Odisha",
        "22" => "Chhattisgarh",
        "23" => "Madhya Pradesh",
        "24" => "Gujarat",
        "25" => "Daman and Diu",
        "26" => "Dadra and Nagar Haveli",
        "27" => "Maharashtra",
        "28" => "Andhra Pradesh (before split)",
        "29" => "Karnataka",
        "30" => "Goa",
        "31" => "Lakshadweep",
        "32" => "Kerala",
        "33" => "Tamil Nadu",
        "34" => "Puducherry",
        "35" => "Andaman and Nicobar Islands",
        "36" => "Telangana",
        "37" => "Andhra Pradesh (after split)",
        "38" => "Ladakh",
        _ => return None,
    };
    Some(name)
}

/// Extract the state name encoded in the first two characters of a GSTIN
pub fn state_from_gstin(gstin: &str) -> Option<&'static str> {
    gstin.get(0..2).and_then(state_name)
}

/// Common validation helpers
pub mod validators {
    use super::*;

    /// Validate that a string is not blank
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "cannot be empty"));
        }
        Ok(())
    }

    /// Validate that a string is exactly `len` ASCII digits
    pub fn validate_digits(value: &str, len: usize, field: &str) -> Result<(), ValidationError> {
        if value.len() != len || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new(
                field,
                format!("must be exactly {len} digits"),
            ));
        }
        Ok(())
    }

    /// Validate a GSTIN's length, positional format and state code
    ///
    /// `URP` is only accepted when `country` is not India.
    pub fn validate_gstin(gstin: &str, country: &str, field: &str) -> Result<(), ValidationError> {
        let gstin = gstin.trim().to_ascii_uppercase();

        if gstin.is_empty() {
            return Err(ValidationError::new(field, "GSTIN is required"));
        }

        if gstin == UNREGISTERED_GSTIN {
            if is_india(country) {
                return Err(ValidationError::new(
                    field,
                    "URP GSTIN is only valid for foreign customers",
                ));
            }
            return Ok(());
        }

        if gstin.len() != 15 {
            return Err(ValidationError::new(
                field,
                "GSTIN must be exactly 15 characters",
            ));
        }

        if !GSTIN_PATTERN.is_match(&gstin) {
            return Err(ValidationError::new(field, "GSTIN format is invalid"));
        }

        // Pattern guarantees two leading digits
        let state_code: u8 = gstin[0..2].parse().unwrap_or(0);
        if !(1..=38).contains(&state_code) {
            return Err(ValidationError::new(
                field,
                format!("Invalid state code in GSTIN: {state_code}"),
            ));
        }

        Ok(())
    }

    /// Validate an HSN (goods) or SAC (services) code
    pub fn validate_hsn_sac(code: &str, is_service: bool, field: &str) -> Result<(), ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::new(field, "HSN/SAC code is required"));
        }

        if is_service {
            if !SAC_PATTERN.is_match(code) {
                return Err(ValidationError::new(
                    field,
                    "SAC code must be exactly 6 digits",
                ));
            }
        } else if !HSN_PATTERN.is_match(code) {
            return Err(ValidationError::new(
                field,
                "HSN code must be 4, 6, or 8 digits",
            ));
        }

        Ok(())
    }

    /// Validate a postal code; Indian codes must be 4-10 digits
    pub fn validate_postal_code(code: &str, country: &str, field: &str) -> Result<(), ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::new(field, "Pincode/Postal code is required"));
        }
        let digits_ok = (4..=10).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit());
        if is_india(country) && !digits_ok {
            return Err(ValidationError::new(
                field,
                "Pincode must be 4-10 digits for Indian addresses",
            ));
        }
        Ok(())
    }

    /// Validate email format (basic check)
    pub fn validate_email(email: &str, field: &str) -> Result<(), ValidationError> {
        if !EMAIL_PATTERN.is_match(email.trim()) {
            return Err(ValidationError::new(field, "invalid email format"));
        }
        Ok(())
    }

    /// Validate that a number is not negative
    pub fn validate_non_negative<T: PartialOrd + Default>(
        value: T,
        field: &str,
    ) -> Result<(), ValidationError> {
        if value < T::default() {
            return Err(ValidationError::new(field, "must be greater than or equal to 0"));
        }
        Ok(())
    }

    /// Validate that a number is strictly positive
    pub fn validate_positive<T: PartialOrd + Default>(
        value: T,
        field: &str,
    ) -> Result<(), ValidationError> {
        if value <= T::default() {
            return Err(ValidationError::new(field, "must be greater than 0"));
        }
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<(), ValidationError> {
        if value < min || value > max {
            return Err(ValidationError::new(
                field,
                format!("must be between {min} and {max}"),
            ));
        }
        Ok(())
    }

    /// Validate a calendar month number
    pub fn validate_month(month: u32) -> Result<(), ValidationError> {
        validate_range(month, 1, 12, "month")
    }
}

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;

    #[test]
    fn test_gstin_accepts_valid_format() {
        assert!(validate_gstin("27AAPFU0939F1ZV", "India", "gstin").is_ok());
        assert!(validate_gstin(" 29aabcu9603r1zm ", "India", "gstin").is_ok());
    }

    #[test]
    fn test_gstin_rejects_bad_shapes() {
        let err = validate_gstin("27AAPFU0939F1Z", "India", "gstin").unwrap_err();
        assert_eq!(err.message, "GSTIN must be exactly 15 characters");

        let err = validate_gstin("27AAPFU0939F1XV", "India", "gstin").unwrap_err();
        assert_eq!(err.message, "GSTIN format is invalid");

        let err = validate_gstin("", "India", "gstin").unwrap_err();
        assert_eq!(err.message, "GSTIN is required");
    }

    #[test]
    fn test_gstin_rejects_out_of_range_state_codes() {
        for code in ["00", "39", "99"] {
            let gstin = format!("{code}AAPFU0939F1ZV");
            let err = validate_gstin(&gstin, "India", "gstin").unwrap_err();
            assert!(err.message.starts_with("Invalid state code"), "{gstin}");
        }
    }

    #[test]
    fn test_urp_only_for_foreign_customers() {
        assert!(validate_gstin("URP", "India", "gstin").is_err());
        assert!(validate_gstin("URP", "india", "gstin").is_err());
        assert!(validate_gstin("URP", "Australia", "gstin").is_ok());
    }

    #[test]
    fn test_hsn_and_sac_lengths() {
        for ok in ["1234", "123456", "12345678"] {
            assert!(validate_hsn_sac(ok, false, "hsn_sac").is_ok(), "{ok}");
        }
        for bad in ["123", "12345", "1234567", "123456789", "12a4"] {
            assert!(validate_hsn_sac(bad, false, "hsn_sac").is_err(), "{bad}");
        }
        assert!(validate_hsn_sac("998314", true, "hsn_sac").is_ok());
        assert!(validate_hsn_sac("9983", true, "hsn_sac").is_err());
    }

    #[test]
    fn test_postal_code_rules_depend_on_country() {
        assert!(validate_postal_code("560001", "India", "pincode").is_ok());
        assert!(validate_postal_code("56A001", "India", "pincode").is_err());
        assert!(validate_postal_code("SW1A 1AA", "United Kingdom", "pincode").is_ok());
        assert!(validate_postal_code("", "United Kingdom", "pincode").is_err());
    }

    #[test]
    fn test_state_lookup() {
        assert_eq!(state_from_gstin("27AAPFU0939F1ZV"), Some("Maharashtra"));
        assert_eq!(state_from_gstin("99AAPFU0939F1ZV"), None);
        assert_eq!(state_from_gstin("2"), None);
    }

    #[test]
    fn test_numeric_helpers() {
        assert!(validate_non_negative(0.0, "price").is_ok());
        assert!(validate_non_negative(-0.5, "price").is_err());
        assert!(validate_positive(1.0, "quantity").is_ok());
        assert!(validate_positive(0.0, "quantity").is_err());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(13).is_err());
        assert!(validate_month(0).is_err());
    }

    #[test]
    fn test_email_and_digits() {
        assert!(validate_email("billing@example.in", "email").is_ok());
        assert!(validate_email("billing@example", "email").is_err());
        assert!(validate_digits("9876543210", 10, "phone").is_ok());
        assert!(validate_digits("98765 43210", 10, "phone").is_err());
    }
}
