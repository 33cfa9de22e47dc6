//! govgraph CLI: federal contracts analytics dashboard.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use govgraph::api::{ApiClient, Period};
use govgraph::config::AppConfig;
use govgraph::format::{dash_opt, format_amount, format_percent};
use govgraph::paths::GovPaths;
use govgraph::session::{Credential, FileSession, SessionProvider};
use govgraph::tui::GovTui;

#[derive(Parser)]
#[command(name = "govgraph", version, about = "Federal contracts analytics dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (the default).
    Tui,

    /// Store an already-issued bearer token.
    Login {
        /// Bearer token issued by the identity provider.
        #[arg(long)]
        token: String,

        /// Token expiry as unix seconds (0 = no recorded expiry).
        #[arg(long, default_value = "0")]
        expires_at: u64,
    },

    /// Remove the stored session credential.
    Logout,

    /// List vendors.
    Vendors {
        /// Name filter.
        #[arg(long)]
        query: Option<String>,

        /// 1-indexed page.
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// List agencies.
    Agencies {
        /// Name filter.
        #[arg(long)]
        query: Option<String>,

        /// 1-indexed page.
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Print the risk indicators as JSON.
    Risk {
        /// Z-score threshold for award-spike detection.
        #[arg(long, default_value = "3.0")]
        z_threshold: f64,

        /// Look-back window for new entrants, in days.
        #[arg(long, default_value = "90")]
        days: u32,
    },

    /// Fetch a relationship graph as JSON.
    Graph {
        #[command(subcommand)]
        target: GraphTarget,
    },

    /// Print an agency's spending over time.
    Spending {
        /// Agency id.
        agency_id: String,

        /// Aggregation period: month, quarter, or year.
        #[arg(long, default_value = "month")]
        period: String,
    },
}

#[derive(Subcommand)]
enum GraphTarget {
    /// A vendor's relationship graph.
    Vendor {
        /// Vendor id.
        id: String,
    },
    /// An agency's relationship graph.
    Agency {
        /// Agency id.
        id: String,
    },
    /// The shortest path between two entities.
    Path {
        /// Start entity id.
        from: String,
        /// End entity id.
        to: String,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let paths = GovPaths::resolve()?;
    let config = AppConfig::load(&paths)?;
    let session: Arc<dyn SessionProvider> = Arc::new(FileSession::new(&paths));

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let mut tui = GovTui::new(config, session);
            tui.run()?;
        }

        Commands::Login { token, expires_at } => {
            paths.ensure_state_dir()?;
            let store = FileSession::new(&paths);
            store.store(&Credential {
                access_token: token,
                expires_at,
            })?;
            println!("Signed in. Credential stored.");
        }

        Commands::Logout => {
            session.sign_out()?;
            println!("Signed out.");
        }

        Commands::Vendors { query, page } => {
            let client = ApiClient::new(&config, session);
            let data = client.vendors_list(query.as_deref(), page, config.page_size)?;
            println!(
                "{:<40} {:<14} {:<12} {:<4}",
                "Name", "UEI", "Confidence", "LLM"
            );
            for v in &data.items {
                println!(
                    "{:<40} {:<14} {:<12} {:<4}",
                    v.canonical_name,
                    dash_opt(v.uei.as_deref()),
                    format_percent(v.resolution_confidence),
                    if v.resolved_by_llm { "yes" } else { "" }
                );
            }
            println!("page {} of {} total", data.page, data.total);
        }

        Commands::Agencies { query, page } => {
            let client = ApiClient::new(&config, session);
            let data = client.agencies_list(query.as_deref(), page, config.page_size)?;
            println!("{:<50} {:<12}", "Name", "Code");
            for a in &data.items {
                println!(
                    "{:<50} {:<12}",
                    a.agency_name,
                    dash_opt(a.agency_code.as_deref())
                );
            }
            println!("page {} of {} total", data.page, data.total);
        }

        Commands::Risk { z_threshold, days } => {
            let client = ApiClient::new(&config, session);
            let spikes = client.award_spikes(z_threshold)?;
            let entrants = client.new_entrants(days)?;
            let sole = client.sole_source()?;
            let report = serde_json::json!({
                "award_spikes": spikes,
                "new_entrants": entrants,
                "sole_source": sole,
            });
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }

        Commands::Graph { target } => {
            let client = ApiClient::new(&config, session);
            let graph = match target {
                GraphTarget::Vendor { id } => client.graph_vendor(&id)?,
                GraphTarget::Agency { id } => client.graph_agency(&id)?,
                GraphTarget::Path { from, to } => client.graph_path(&from, &to)?,
            };
            println!("{}", serde_json::to_string_pretty(&graph).into_diagnostic()?);
        }

        Commands::Spending { agency_id, period } => {
            let period = match period.as_str() {
                "month" => Period::Month,
                "quarter" => Period::Quarter,
                "year" => Period::Year,
                other => {
                    return Err(miette::miette!(
                        "unknown period {other:?}; expected month, quarter, or year"
                    ));
                }
            };
            let client = ApiClient::new(&config, session);
            let points = client.spending_over_time(&agency_id, period)?;
            println!("{:<12} {:>10} {:>14}", "Period", "Contracts", "Obligated");
            for p in &points {
                println!(
                    "{:<12} {:>10} {:>14}",
                    p.period,
                    p.contract_count,
                    format_amount(p.total_obligated)
                );
            }
        }
    }

    Ok(())
}
