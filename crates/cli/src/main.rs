use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use shopdash_api::{defer_summary, Config, DashboardApi, InProcApi, RequestContext};
use shopdash_core::{Credential, DashboardSummary, Locale};
use shopdash_render::PageMeta;
use shopdash_source::FixtureSource;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "shopdashctl", version, about = "Shopdash account dashboard CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Customer access token; omit to act as an anonymous visitor
    #[arg(long = "token", env = "SHOPDASH_CUSTOMER_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Display locale, e.g. "en-US" or "de-DE" (overrides SHOPDASH_LOCALE)
    #[arg(long = "locale", global = true)]
    locale: Option<Locale>,

    /// Read the backend response from a JSON file instead of SHOPDASH_ENDPOINT
    #[arg(long = "fixture", global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the dashboard summary and print it
    Summary,
    /// Stream the progressive account page to stdout
    Render {
        /// Path of the page being rendered (marks the active sidebar link)
        #[arg(long = "path", default_value = "/account")]
        path: String,
        /// Page title
        #[arg(long = "title", default_value = "My account")]
        title: String,
    },
    /// Print the GraphQL summary query
    Query,
}

fn init_tracing() {
    let env = std::env::var("SHOPDASH_LOG").unwrap_or_else(|_| "info".to_string());
    let filter =
        tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // stdout carries the command's output
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics(cfg: &Config) {
    if let Some(addr) = cfg.metrics_addr.as_deref() {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            warn!(addr = %addr, "invalid SHOPDASH_METRICS_ADDR; expected host:port");
        }
    }
}

fn build_api(cfg: &Config, fixture: Option<&PathBuf>) -> Result<InProcApi> {
    match fixture {
        Some(path) => {
            let source = FixtureSource::from_path(path)?;
            Ok(InProcApi::new(Arc::new(source), cfg.cache_ttl))
        }
        None => InProcApi::from_config(cfg).context("building GraphQL source"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut cfg = Config::from_env().context("reading SHOPDASH_* environment")?;
    if let Some(locale) = cli.locale {
        cfg.locale = locale;
    }
    init_metrics(&cfg);

    match cli.command {
        Commands::Query => {
            println!("{}", shopdash_source::summary_query());
        }
        Commands::Summary => {
            let api = build_api(&cfg, cli.fixture.as_ref())?;
            let credential = cli.token.and_then(Credential::new);
            let cx = RequestContext::new(credential, cfg.locale);
            info!(request = %cx.request_id, authenticated = cx.is_authenticated(), "summary invoked");
            let summary = api.dashboard_summary(&cx).await?;
            match cli.output {
                Output::Human => print_human(&summary),
                Output::Json => println!("{}", serde_json::to_string_pretty(summary.as_ref())?),
            }
        }
        Commands::Render { path, title } => {
            let api: Arc<dyn DashboardApi> = Arc::new(build_api(&cfg, cli.fixture.as_ref())?);
            let credential = cli.token.and_then(Credential::new);
            let cx = Arc::new(RequestContext::new(credential, cfg.locale));
            info!(request = %cx.request_id, path = %path, "render invoked");
            let deferred = defer_summary(api, cx);
            let meta = PageMeta { title, current_path: path, locale: cfg.locale };
            let mut page = shopdash_render::page_stream(meta, &deferred);
            let mut out = std::io::stdout().lock();
            loop {
                tokio::select! {
                    chunk = page.next() => match chunk {
                        Some(chunk) => {
                            out.write_all(chunk?.as_bytes())?;
                            out.flush()?;
                        }
                        None => break,
                    },
                    _ = signal::ctrl_c() => {
                        info!("Ctrl-C received; abandoning render");
                        break;
                    }
                }
            }
            deferred.cancel();
        }
    }

    Ok(())
}

fn print_human(s: &DashboardSummary) {
    match &s.customer_info {
        Some(c) => println!("Customer:   {} {} <{}>", c.first_name, c.last_name, c.email),
        None => println!("Customer:   (profile incomplete)"),
    }
    let orders = &s.orders_summary;
    println!("Orders:     {}", orders.total_count);
    for o in &orders.recent {
        println!("  #{:<8} {:<12} {:>14}  {} [{}]", o.order_number, o.date, o.total, o.status, o.status_type);
    }
    let addrs = &s.addresses_summary;
    match &addrs.primary {
        Some(a) => println!("Addresses:  {} (primary: {}, {}, {} {})", addrs.total_count, a.address_line1, a.city, a.state, a.zip_code),
        None => println!("Addresses:  {}", addrs.total_count),
    }
    let wl = &s.wishlists_summary;
    println!("Wishlists:  {} ({} items in preview)", wl.total_count, wl.total_items);
    for w in &wl.recent {
        let vis = if w.is_public { "public" } else { "private" };
        println!("  {:<24} {:>4} items  {}", w.name, w.item_count, vis);
    }
    let st = &s.account_status;
    println!(
        "Profile:    {}% complete (profile {}, addresses {}, orders {})",
        st.completion_percentage,
        tick(st.has_completed_profile),
        tick(st.has_addresses),
        tick(st.has_orders)
    );
}

fn tick(done: bool) -> &'static str {
    if done {
        "done"
    } else {
        "todo"
    }
}
