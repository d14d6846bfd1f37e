use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use cyberhot_e2e::suite::scenario::Scenario;
use cyberhot_e2e::{report, suite, utils};

#[derive(Parser)]
#[command(name = "cyberhot-e2e")]
#[command(version = "0.1.0")]
#[command(about = "Browser-driven E2E suite for the Cyberhot Security contact form", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the contact form scenario suite
    Run {
        /// Path to a YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Browser engine (chromium, firefox, webkit). Auto-detected if not provided.
        #[arg(short, long)]
        browser: Option<String>,

        /// Run with a visible browser window
        #[arg(long, default_value = "false")]
        headed: bool,

        /// Output directory for reports and evidence screenshots
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generate reports (JSON, JUnit)
        #[arg(long, default_value = "false")]
        report: bool,

        /// Run only one scenario by name
        #[arg(short, long)]
        scenario: Option<String>,
    },

    /// Generate report from test results
    Report {
        /// Path to test results JSON
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            browser,
            headed,
            output,
            report,
            scenario,
        } => {
            let mut suite_config = utils::config::SuiteConfig::load(config.as_deref())?;
            if let Some(browser) = browser {
                suite_config.browser = Some(browser);
            }
            if headed {
                suite_config.headless = false;
            }
            if let Some(output) = output {
                suite_config.output_dir = output;
            }

            let filter = match scenario {
                Some(ref name) => match Scenario::from_name(name) {
                    Some(s) => Some(s),
                    None => anyhow::bail!(
                        "Unknown scenario '{}'. Available scenarios: {}",
                        name,
                        Scenario::ALL
                            .iter()
                            .map(|s| s.name())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                },
                None => None,
            };

            println!(
                "{} Running contact form suite against: {}",
                "▶".green().bold(),
                suite_config.contact_url.cyan()
            );
            if let Some(ref b) = suite_config.browser {
                println!("  Browser: {}", b.cyan());
            }
            if !suite_config.headless {
                println!("  Headed: {}", "Enabled".yellow());
            }
            println!(
                "  Output: {}",
                suite_config.output_dir.display().to_string().cyan()
            );
            if report {
                println!("  Reports: {}", "Enabled".green());
            }
            if let Some(s) = filter {
                println!("  Scenario: {}", s.name().cyan());
            }

            let summary = suite::run_suite(suite_config, filter, report).await?;
            if summary.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}
