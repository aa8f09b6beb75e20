//! Resource entities exchanged with the invoicing API
//!
//! Each resource has a payload type (what the user supplies) and a record type
//! (payload plus server-assigned fields, flattened on the wire).

pub mod business_profile;
pub mod customer;
pub mod invoice;
pub mod product;
pub mod reports;
pub mod user;

pub use business_profile::{BusinessProfile, BusinessProfileData, BusinessProfileUpdate};
pub use customer::{Customer, CustomerData, CustomerUpdate};
pub use invoice::{
    DocumentType, Invoice, InvoiceCreate, InvoiceHeader, InvoiceItem, InvoiceLine,
    InvoiceLineUpdate, InvoiceStatus, InvoiceUpdate, PaymentStatus, SupplyType, TaxType,
};
pub use product::{Product, ProductData, ProductUpdate};
pub use reports::{
    CustomerSummary, DashboardData, HealthReport, InvoiceSummary, MonthlySummary, MonthlyTaxData,
    NicJsonExport, NicJsonImport,
};
pub use user::{TokenResponse, User};
