use clap::Parser;
use openfolio::application::integrations::{IntegrationCommand, IntegrationOutcome};
use openfolio::cli::commands::{Cli, Commands};
use openfolio::config::AppConfig;
use openfolio::domain::entities::integration::Integration;
use openfolio::domain::error::{AggregationError, LookupError};
use openfolio::domain::values::credential::AccessCredential;
use openfolio::domain::values::ids::{IntegrationId, PrincipalId};
use openfolio::domain::values::product::{Product, ProductSet};
use openfolio::OpenFolio;
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;
const EXIT_UNAVAILABLE: i32 = 3;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("openfolio=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let of = match OpenFolio::new(&config) {
        Ok(of) => of,
        Err(e) => {
            eprintln!("Error initializing OpenFolio: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    if let Err(e) = run_command(of, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(exit_code(e.as_ref()));
    }
}

fn exit_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    match err.downcast_ref::<AggregationError>() {
        Some(AggregationError::Lookup(LookupError::NotFound(_))) => EXIT_NOT_FOUND,
        Some(AggregationError::Lookup(LookupError::Unavailable(_))) => EXIT_UNAVAILABLE,
        _ => EXIT_FAILURE,
    }
}

/// Integration as printed by the CLI, with the access token masked.
#[derive(Serialize)]
struct IntegrationView<'a> {
    id: &'a IntegrationId,
    principal_id: &'a PrincipalId,
    access_token: String,
    products: &'a ProductSet,
    institution_name: Option<&'a str>,
    created_at: String,
    updated_at: String,
}

impl<'a> From<&'a Integration> for IntegrationView<'a> {
    fn from(i: &'a Integration) -> Self {
        Self {
            id: &i.id,
            principal_id: &i.principal_id,
            access_token: i.access_credential.masked(),
            products: &i.enabled_products,
            institution_name: i.institution_name.as_deref(),
            created_at: i.created_at.to_rfc3339(),
            updated_at: i.updated_at.to_rfc3339(),
        }
    }
}

async fn run_command(of: OpenFolio, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Accounts { principal, report } => {
            read_view(&of, &principal, single(Product::Transactions), report).await?;
        }
        Commands::InvestmentAccounts { principal, report } => {
            read_view(&of, &principal, single(Product::Investments), report).await?;
        }
        Commands::Liabilities { principal, report } => {
            read_view(&of, &principal, single(Product::Liabilities), report).await?;
        }
        Commands::Portfolio {
            principal,
            report,
            deadline_secs,
        } => {
            let principal = PrincipalId::new(principal);
            match deadline_secs {
                Some(secs) => {
                    let r = of
                        .aggregate_within(&principal, &Product::all(), Duration::from_secs(secs))
                        .await?;
                    if report {
                        print_json(&r)?;
                    } else {
                        print_json(&r.accounts)?;
                    }
                }
                None if report => print_json(&of.report(&principal, &Product::all()).await?)?,
                None => print_json(&of.portfolio(&principal).await?)?,
            }
        }
        Commands::Link {
            principal,
            access_token,
            products,
            institution,
        } => {
            let outcome = of.execute(IntegrationCommand::Link {
                principal: PrincipalId::new(principal),
                credential: AccessCredential::new(access_token),
                products: parse_products(&products)?,
                institution_name: institution,
            })?;
            print_outcome(&outcome)?;
        }
        Commands::Unlink { integration_id } => {
            let outcome = of.execute(IntegrationCommand::Unlink {
                id: IntegrationId::new(integration_id),
            })?;
            print_outcome(&outcome)?;
        }
        Commands::SetProducts {
            integration_id,
            products,
        } => {
            let outcome = of.execute(IntegrationCommand::UpdateProducts {
                id: IntegrationId::new(integration_id),
                products: parse_products(&products)?,
            })?;
            print_outcome(&outcome)?;
        }
        Commands::Integrations { principal } => {
            let integrations = of.integrations(&PrincipalId::new(principal))?;
            let views: Vec<IntegrationView> = integrations.iter().map(IntegrationView::from).collect();
            print_json(&views)?;
        }
    }
    Ok(())
}

async fn read_view(
    of: &OpenFolio,
    principal: &str,
    products: ProductSet,
    report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let r = of.report(&PrincipalId::new(principal), &products).await?;
    if report {
        print_json(&r)
    } else {
        print_json(&r.accounts)
    }
}

fn print_outcome(outcome: &IntegrationOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        IntegrationOutcome::Linked(i) | IntegrationOutcome::Updated(i) => {
            print_json(&IntegrationView::from(i))
        }
        IntegrationOutcome::Unlinked(id) => {
            println!("Integration {id} unlinked");
            Ok(())
        }
    }
}

/// Strict parse: an unknown product name on the command line is a typo.
fn parse_products(names: &[String]) -> Result<ProductSet, String> {
    names
        .iter()
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.parse::<Product>())
        .collect()
}

fn single(product: Product) -> ProductSet {
    [product].into_iter().collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
