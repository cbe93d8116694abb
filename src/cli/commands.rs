use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "openfolio", about = "Aggregate linked financial accounts into one portfolio view")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Accounts with their transactions
    Accounts {
        principal: String,
        /// Print the full aggregation report instead of the account list
        #[arg(long)]
        report: bool,
    },
    /// Investment accounts with holdings and investment transactions
    InvestmentAccounts {
        principal: String,
        #[arg(long)]
        report: bool,
    },
    /// Accounts with credit, loan and mortgage liabilities
    Liabilities {
        principal: String,
        #[arg(long)]
        report: bool,
    },
    /// Every product merged per account
    Portfolio {
        principal: String,
        #[arg(long)]
        report: bool,
        /// Give up after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
    /// Link a provider access token to a principal
    Link {
        principal: String,
        access_token: String,
        /// Comma-separated products (transactions, investments, liabilities)
        #[arg(long, value_delimiter = ',', default_value = "transactions,investments,liabilities")]
        products: Vec<String>,
        #[arg(long)]
        institution: Option<String>,
    },
    /// Remove a linked integration
    Unlink { integration_id: String },
    /// Replace the products enabled on an integration
    SetProducts {
        integration_id: String,
        #[arg(value_delimiter = ',', required = true)]
        products: Vec<String>,
    },
    /// List a principal's integrations
    Integrations { principal: String },
}
