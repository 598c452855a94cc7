mod collect;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "attire")]
#[command(about = "Fashion catalog collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Gender {
    Male,
    Female,
}

impl Gender {
    fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect the browser-rendered marketplace catalog
    Marketplace {
        #[arg(long, value_enum)]
        gender: Gender,

        /// Treat category listings as infinite-scroll feeds instead of
        /// numbered pages
        #[arg(long)]
        infinite_scroll: bool,
    },
    /// Collect the retail chain's catalog through its storefront API
    Retail {
        #[arg(long, value_enum)]
        gender: Gender,

        /// Continue from the last progress checkpoint
        #[arg(long)]
        resume: bool,

        /// Only process the first few categories
        #[arg(long)]
        test: bool,

        /// Skip child/anniversary categories
        #[arg(long)]
        adults_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = attire_core::load_app_config()?;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(env = %config.env, "starting");

    let catalog = attire_core::load_catalog(&config.catalog_path)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Marketplace {
            gender,
            infinite_scroll,
        } => {
            collect::marketplace::run(&config, &catalog, gender.as_str(), infinite_scroll).await
        }
        Commands::Retail {
            gender,
            resume,
            test,
            adults_only,
        } => {
            collect::retail::run(
                &config,
                &catalog,
                gender.as_str(),
                collect::retail::RunMode {
                    resume,
                    test,
                    adults_only,
                },
            )
            .await
        }
    }
}
