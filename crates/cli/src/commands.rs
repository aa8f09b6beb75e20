//! CLI commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gstpro_core::{
    BusinessProfileData, BusinessProfileUpdate, CustomerData, CustomerUpdate, InvoiceCreate,
    InvoiceUpdate, ProductData, ProductUpdate,
};
use gstpro_http::client::exports::ExportPeriod;
use gstpro_http::client::session::SessionState;
use gstpro_http::{InvoiceClient, Page};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config;
use crate::session_store::FileSessionStore;
use crate::terminal::{TerminalNavigator, TerminalNotifier};

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email
        #[arg(long, env = "GSTPRO_EMAIL")]
        email: String,

        /// Password; read from stdin when omitted
        #[arg(long, env = "GSTPRO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session and its expiry
    Whoami,

    /// Business profiles
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Customers
    Customers {
        #[command(subcommand)]
        command: CrudCommands,
    },

    /// Products and services
    Products {
        #[command(subcommand)]
        command: CrudCommands,
    },

    /// Invoices, credit notes and debit notes
    Invoices {
        #[command(subcommand)]
        command: InvoiceCommands,
    },

    /// NIC e-invoice JSON and monthly spreadsheets
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },

    /// Monthly tax summary
    Summary {
        #[command(flatten)]
        month: MonthArgs,

        /// Limit to one business profile
        #[arg(long)]
        business_profile_id: Option<i64>,
    },

    /// Dashboard metrics
    Dashboard {
        #[command(flatten)]
        month: MonthArgs,

        /// Limit to one business profile
        #[arg(long)]
        business_id: Option<i64>,
    },

    /// Server health
    Health {
        /// Query the readiness probe instead
        #[arg(long)]
        ready: bool,
    },
}

#[derive(Subcommand)]
pub enum CrudCommands {
    /// List records
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one record
    Get { id: i64 },

    /// Create a record from a JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Update a record from a JSON file holding the changed fields
    Update {
        id: i64,

        #[arg(short, long)]
        file: PathBuf,
    },

    /// Delete a record
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(flatten)]
    Crud(CrudCommands),

    /// Make a profile the default
    SetDefault { id: i64 },
}

#[derive(Subcommand)]
pub enum InvoiceCommands {
    #[command(flatten)]
    Crud(CrudCommands),

    /// Download the rendered PDF
    Pdf {
        id: i64,

        /// Output file (defaults to invoice-<id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the GST IRP JSON document
    GstJson { id: i64 },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Print an invoice as NIC e-invoice JSON
    NicJson { invoice_id: i64 },

    /// Create an invoice from a NIC e-invoice JSON file
    ImportJson {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Download a month of invoices as CSV
    Csv {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Download a month of invoices as an Excel workbook
    Excel {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
pub struct PageArgs {
    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    skip: u32,

    /// Maximum rows to return
    #[arg(long, default_value_t = 100)]
    limit: u32,
}

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Self::new(args.skip, args.limit)
    }
}

#[derive(Args)]
pub struct MonthArgs {
    #[arg(long)]
    year: i32,

    /// Month number, 1-12
    #[arg(long)]
    month: u32,
}

#[derive(Args)]
pub struct PeriodArgs {
    #[command(flatten)]
    month: MonthArgs,

    #[arg(long)]
    business_profile_id: i64,
}

impl From<PeriodArgs> for ExportPeriod {
    fn from(args: PeriodArgs) -> Self {
        Self {
            year: args.month.year,
            month: args.month.month,
            business_profile_id: args.business_profile_id,
        }
    }
}

/// Global options shared by every command
pub struct Options {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Options {
    fn client(&self, on_auth_page: bool) -> Result<InvoiceClient> {
        let data_dir = config::data_dir(self.data_dir.clone());
        let client_config = config::load_client_config(self.config.as_deref(), &data_dir)?;
        debug!(api = %client_config.api_url(), data_dir = %data_dir.display(), "Resolved client settings");

        let mut builder = InvoiceClient::builder()
            .config(&client_config)
            .session_store(Arc::new(FileSessionStore::in_dir(&data_dir)))
            .navigator(Arc::new(TerminalNavigator::new(on_auth_page)))
            .notifier(Arc::new(TerminalNotifier));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

impl Commands {
    pub async fn execute(self, options: Options) -> Result<()> {
        let client = options.client(matches!(self, Self::Login { .. }))?;

        match self {
            Self::Login { email, password } => {
                let password = match password {
                    Some(password) => password,
                    None => read_password()?,
                };
                let user = client.login(&email, &password).await?;
                info!("Signed in as {}", user.email);
                print_json(&user)
            }
            Self::Logout => {
                client.logout();
                Ok(())
            }
            Self::Whoami => whoami(&client),
            Self::Profiles { command } => command.execute(&client).await,
            Self::Customers { command } => {
                command
                    .execute::<CustomerResource>(&client)
                    .await
            }
            Self::Products { command } => command.execute::<ProductResource>(&client).await,
            Self::Invoices { command } => command.execute(&client).await,
            Self::Export { command } => command.execute(&client).await,
            Self::Summary {
                month,
                business_profile_id,
            } => print_json(
                &client
                    .monthly_summary(month.year, month.month, business_profile_id)
                    .await?,
            ),
            Self::Dashboard { month, business_id } => print_json(
                &client
                    .dashboard(month.year, month.month, business_id)
                    .await?,
            ),
            Self::Health { ready } => {
                let report = if ready {
                    client.readiness().await?
                } else {
                    client.health().await?
                };
                print_json(&report)?;
                anyhow::ensure!(report.is_healthy(), "server reported status {}", report.status);
                Ok(())
            }
        }
    }
}

fn whoami(client: &InvoiceClient) -> Result<()> {
    match client.session().state() {
        SessionState::Absent => println!("Not signed in"),
        SessionState::Expired(_) => println!("Session expired; run `gstpro login`"),
        SessionState::Fresh(status) => {
            let email = client
                .session()
                .user()
                .map_or_else(|| "unknown user".to_string(), |user| user.email);
            let expires = status
                .claims()
                .and_then(|claims| chrono::DateTime::from_timestamp(claims.exp, 0))
                .map_or_else(|| "unknown".to_string(), |at| at.to_rfc3339());
            println!("Signed in as {email} (session expires {expires})");
        }
    }
    Ok(())
}

/// Typed operations shared by the plain CRUD resources
trait Resource {
    type Create: DeserializeOwned;
    type Update: DeserializeOwned;
    type Record: Serialize;

    async fn list(client: &InvoiceClient, page: Page) -> gstpro_http::Result<Vec<Self::Record>>;
    async fn get(client: &InvoiceClient, id: i64) -> gstpro_http::Result<Self::Record>;
    async fn create(client: &InvoiceClient, payload: &Self::Create) -> gstpro_http::Result<Self::Record>;
    async fn update(client: &InvoiceClient, id: i64, payload: &Self::Update) -> gstpro_http::Result<Self::Record>;
    async fn delete(client: &InvoiceClient, id: i64) -> gstpro_http::Result<Self::Record>;
}

struct ProfileResource;
struct CustomerResource;
struct ProductResource;
struct InvoiceResource;

macro_rules! resource {
    ($resource:ty, $create:ty, $update:ty, $record:ty, $list:ident, $get:ident, $new:ident, $edit:ident, $remove:ident) => {
        impl Resource for $resource {
            type Create = $create;
            type Update = $update;
            type Record = $record;

            async fn list(client: &InvoiceClient, page: Page) -> gstpro_http::Result<Vec<Self::Record>> {
                client.$list(page).await
            }

            async fn get(client: &InvoiceClient, id: i64) -> gstpro_http::Result<Self::Record> {
                client.$get(id).await
            }

            async fn create(client: &InvoiceClient, payload: &Self::Create) -> gstpro_http::Result<Self::Record> {
                client.$new(payload).await
            }

            async fn update(
                client: &InvoiceClient,
                id: i64,
                payload: &Self::Update,
            ) -> gstpro_http::Result<Self::Record> {
                client.$edit(id, payload).await
            }

            async fn delete(client: &InvoiceClient, id: i64) -> gstpro_http::Result<Self::Record> {
                client.$remove(id).await
            }
        }
    };
}

resource!(
    ProfileResource,
    BusinessProfileData,
    BusinessProfileUpdate,
    gstpro_core::BusinessProfile,
    list_business_profiles,
    get_business_profile,
    create_business_profile,
    update_business_profile,
    delete_business_profile
);
resource!(
    CustomerResource,
    CustomerData,
    CustomerUpdate,
    gstpro_core::Customer,
    list_customers,
    get_customer,
    create_customer,
    update_customer,
    delete_customer
);
resource!(
    ProductResource,
    ProductData,
    ProductUpdate,
    gstpro_core::Product,
    list_products,
    get_product,
    create_product,
    update_product,
    delete_product
);
resource!(
    InvoiceResource,
    InvoiceCreate,
    InvoiceUpdate,
    gstpro_core::Invoice,
    list_invoices,
    get_invoice,
    create_invoice,
    update_invoice,
    delete_invoice
);

impl CrudCommands {
    async fn execute<R: Resource>(self, client: &InvoiceClient) -> Result<()> {
        match self {
            Self::List { page } => print_json(&R::list(client, page.into()).await?),
            Self::Get { id } => print_json(&R::get(client, id).await?),
            Self::Create { file } => {
                let payload: R::Create = read_payload(&file)?;
                print_json(&R::create(client, &payload).await?)
            }
            Self::Update { id, file } => {
                let payload: R::Update = read_payload(&file)?;
                print_json(&R::update(client, id, &payload).await?)
            }
            Self::Delete { id } => {
                let removed = R::delete(client, id).await?;
                info!(id, "Deleted");
                print_json(&removed)
            }
        }
    }
}

impl ProfileCommands {
    async fn execute(self, client: &InvoiceClient) -> Result<()> {
        match self {
            Self::Crud(command) => command.execute::<ProfileResource>(client).await,
            Self::SetDefault { id } => print_json(&client.set_default_business_profile(id).await?),
        }
    }
}

impl InvoiceCommands {
    async fn execute(self, client: &InvoiceClient) -> Result<()> {
        match self {
            Self::Crud(command) => command.execute::<InvoiceResource>(client).await,
            Self::Pdf { id, output } => {
                let output = output.unwrap_or_else(|| PathBuf::from(format!("invoice-{id}.pdf")));
                let pdf = client.invoice_pdf(id).await?;
                write_output(&output, &pdf)
            }
            Self::GstJson { id } => print_json(&client.invoice_gst_json(id).await?),
        }
    }
}

impl ExportCommands {
    async fn execute(self, client: &InvoiceClient) -> Result<()> {
        match self {
            Self::NicJson { invoice_id } => print_json(&client.export_nic_json(invoice_id).await?),
            Self::ImportJson { file } => {
                let document: serde_json::Value = read_payload(&file)?;
                print_json(&client.import_nic_json(document).await?)
            }
            Self::Csv { period, output } => {
                let csv = client.export_csv(period.into()).await?;
                write_output(&output, &csv)
            }
            Self::Excel { period, output } => {
                let workbook = client.export_excel(period.into()).await?;
                write_output(&output, &workbook)
            }
        }
    }
}

fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON payload in {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    anyhow::ensure!(!password.is_empty(), "a password is required");
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_profile_set_default_parses() {
        let cli = TestCli::try_parse_from(["gstpro", "profiles", "set-default", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Profiles {
                command: ProfileCommands::SetDefault { id: 4 }
            }
        ));
    }

    #[test]
    fn test_flattened_crud_parses() {
        let cli = TestCli::try_parse_from(["gstpro", "invoices", "list", "--limit", "10"]).unwrap();
        match cli.command {
            Commands::Invoices {
                command: InvoiceCommands::Crud(CrudCommands::List { page }),
            } => assert_eq!(Page::from(page), Page::new(0, 10)),
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_export_period_parses() {
        let cli = TestCli::try_parse_from([
            "gstpro",
            "export",
            "csv",
            "--year",
            "2024",
            "--month",
            "4",
            "--business-profile-id",
            "7",
            "--output",
            "april.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                command: ExportCommands::Csv { period, .. },
            } => {
                let period = ExportPeriod::from(period);
                assert_eq!((period.year, period.month, period.business_profile_id), (2024, 4, 7));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_read_payload_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("customer.json");
        std::fs::write(&file, "{").unwrap();
        let err = read_payload::<CustomerData>(&file).unwrap_err();
        assert!(err.to_string().contains("customer.json"));
    }
}
