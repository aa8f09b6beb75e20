//! Invoices, credit notes and debit notes with their line items

use crate::error::{ValidationError, ValidationErrors};
use crate::serde_utils::{option_timestamp, timestamp};
use crate::validation::{validators::*, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[default]
    #[serde(rename = "Invoice")]
    Invoice,
    #[serde(rename = "Credit Note")]
    CreditNote,
    #[serde(rename = "Debit Note")]
    DebitNote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplyType {
    #[default]
    #[serde(rename = "B2B")]
    B2b,
    #[serde(rename = "B2C")]
    B2c,
    #[serde(rename = "Export with Tax")]
    ExportWithTax,
    #[serde(rename = "Export without Tax")]
    ExportWithoutTax,
    #[serde(rename = "SEZ with Tax")]
    SezWithTax,
    #[serde(rename = "SEZ without Tax")]
    SezWithoutTax,
}

impl SupplyType {
    /// Exports and SEZ supplies are always inter-state
    pub fn is_export(self) -> bool {
        !matches!(self, Self::B2b | Self::B2c)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Finalized,
    Sent,
    #[serde(rename = "E-Invoice")]
    EInvoice,
    #[serde(rename = "GST-Filed")]
    GstFiled,
    Archived,
    /// Imported with an IRN already assigned
    Approved,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

/// How GST is split for a supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    /// Inter-state supply
    #[serde(rename = "IGST")]
    Igst,
    /// Intra-state supply
    #[serde(rename = "CGST_SGST")]
    CgstSgst,
}

/// Fields shared by invoice payloads and stored invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    #[serde(with = "timestamp")]
    pub invoice_date: DateTime<Utc>,
    #[serde(
        default,
        with = "option_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    pub business_profile_id: i64,
    pub customer_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub supply_type: SupplyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_supply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_to: Option<String>,

    // Export details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_of_export: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_off: Option<f64>,

    // E-invoice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_invoice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,

    // E-way bill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ewb_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ewb_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ewb_valid_till: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_imported: Option<bool>,
}

impl InvoiceHeader {
    /// Header with the required fields set and everything else defaulted
    pub fn new(invoice_date: DateTime<Utc>, business_profile_id: i64, customer_id: i64) -> Self {
        Self {
            invoice_date,
            due_date: None,
            business_profile_id,
            customer_id,
            notes: None,
            document_type: DocumentType::default(),
            supply_type: SupplyType::default(),
            reference_number: None,
            place_of_supply: None,
            dispatch_from: None,
            ship_to: None,
            currency: None,
            port_of_export: None,
            discount_amount: None,
            round_off: None,
            irn: None,
            ack_no: None,
            ack_date: None,
            signed_invoice: None,
            qr_code: None,
            ewb_no: None,
            ewb_date: None,
            ewb_valid_till: None,
            is_imported: None,
        }
    }
}

/// One billed line as supplied by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product_id: i64,
    pub quantity: f64,
    pub rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn_sac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
}

impl InvoiceLine {
    pub fn new(product_id: i64, quantity: f64, rate: f64) -> Self {
        Self {
            product_id,
            quantity,
            rate,
            hsn_sac: None,
            description: None,
            discount_percent: None,
            discount_amount: None,
        }
    }

    fn check(&self, index: usize, errors: &mut ValidationErrors) {
        let field = |name: &str| format!("items.{index}.{name}");
        if self.product_id <= 0 {
            errors.push(ValidationError::new(field("product_id"), "must reference a product"));
        }
        errors.check(validate_positive(self.quantity, &field("quantity")));
        errors.check(validate_non_negative(self.rate, &field("rate")));
        if let Some(percent) = self.discount_percent {
            errors.check(validate_range(percent, 0.0, 100.0, &field("discount_percent")));
        }
        if let Some(amount) = self.discount_amount {
            errors.check(validate_non_negative(amount, &field("discount_amount")));
        }
    }
}

/// Partial line update used when editing an invoice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn_sac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
}

/// Payload for creating an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCreate {
    #[serde(flatten)]
    pub header: InvoiceHeader,
    pub items: Vec<InvoiceLine>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// Partial invoice update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    #[serde(
        default,
        with = "option_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "option_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_profile_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_type: Option<SupplyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_supply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_of_export: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_off: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_invoice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ewb_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ewb_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ewb_valid_till: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_imported: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<InvoiceLineUpdate>>,
}

/// Stored line item with server-computed tax amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub subtotal: f64,
    pub total: f64,
    #[serde(default)]
    pub cgst: Option<f64>,
    #[serde(default)]
    pub sgst: Option<f64>,
    #[serde(default)]
    pub igst: Option<f64>,
    pub tax_type: TaxType,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "option_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub line: InvoiceLine,
}

/// Invoice as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub tax_type: TaxType,
    #[serde(default)]
    pub cgst_total: Option<f64>,
    #[serde(default)]
    pub sgst_total: Option<f64>,
    #[serde(default)]
    pub igst_total: Option<f64>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "option_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub header: InvoiceHeader,
    pub items: Vec<InvoiceItem>,
    /// Customer snapshot embedded by detail endpoints
    #[serde(default)]
    pub customer: Option<JsonValue>,
    /// Business profile snapshot embedded by detail endpoints
    #[serde(default)]
    pub business_profile: Option<JsonValue>,
}

impl Invoice {
    /// The line payloads this invoice was created from
    pub fn lines(&self) -> Vec<InvoiceLine> {
        self.items.iter().map(|item| item.line.clone()).collect()
    }
}

fn check_dates(
    invoice_date: Option<&DateTime<Utc>>,
    due_date: Option<&DateTime<Utc>>,
    errors: &mut ValidationErrors,
) {
    if let (Some(issued), Some(due)) = (invoice_date, due_date) {
        if due < issued {
            errors.push(ValidationError::new(
                "due_date",
                "cannot be earlier than the invoice date",
            ));
        }
    }
}

impl Validate for InvoiceCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.header.business_profile_id <= 0 {
            errors.push(ValidationError::new(
                "business_profile_id",
                "a business profile is required",
            ));
        }
        if self.header.customer_id <= 0 {
            errors.push(ValidationError::new("customer_id", "a customer is required"));
        }
        check_dates(
            Some(&self.header.invoice_date),
            self.header.due_date.as_ref(),
            &mut errors,
        );
        if let Some(discount) = self.header.discount_amount {
            errors.check(validate_non_negative(discount, "discount_amount"));
        }
        if self.items.is_empty() {
            errors.push(ValidationError::new("items", "at least one item is required"));
        }
        for (index, line) in self.items.iter().enumerate() {
            line.check(index, &mut errors);
        }
        errors.into_result()
    }
}

impl Validate for InvoiceUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_dates(self.invoice_date.as_ref(), self.due_date.as_ref(), &mut errors);
        if let Some(discount) = self.discount_amount {
            errors.check(validate_non_negative(discount, "discount_amount"));
        }
        if let Some(items) = &self.items {
            if items.is_empty() {
                errors.push(ValidationError::new("items", "at least one item is required"));
            }
            for (index, line) in items.iter().enumerate() {
                if let Some(quantity) = line.quantity {
                    errors.check(validate_positive(quantity, &format!("items.{index}.quantity")));
                }
                if let Some(rate) = line.rate {
                    errors.check(validate_non_negative(rate, &format!("items.{index}.rate")));
                }
            }
        }
        errors.into_result()
    }
}
