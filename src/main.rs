use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use inboxmetrics::config::Config;
use inboxmetrics::dashboard::{Aggregator, HttpDataSourceClient, OutcomeStatus};
use inboxmetrics::report;

/// Exit code when no dashboard source could be reached
const EXIT_TOTAL_FAILURE: i32 = 2;

#[derive(Parser)]
#[command(name = "inboxmetrics")]
#[command(about = "Aggregate email dashboard statistics from the backend API")]
#[command(version = "0.1.0")]
struct Args {
    /// Print the raw snapshot as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Daemon mode: aggregate at the times configured in SCHEDULER_TIMES
    #[arg(long)]
    daemon: bool,

    /// Override DASHBOARD_API_URL
    #[arg(short = 'u', long)]
    api_url: Option<String>,

    /// Check the configuration without contacting the backend
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    env_logger::init();

    let mut config = Config::new()?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
        config.validate()?;
    }

    if args.check_config {
        println!("✅ Configuration valid!");
        println!("🌐 API: {}", config.api.base_url);
        println!("⏱️  Fetch timeout: {}s", config.api.timeout_secs);
        println!("📬 Recent emails limit: {}", config.api.recent_limit);
        println!("📅 Scheduler: {} {:?}",
                 if config.scheduler.enabled { "enabled" } else { "disabled" },
                 config.scheduler.schedule_times);
        return Ok(());
    }

    let client = HttpDataSourceClient::new(&config.api)
        .context("Unable to create dashboard API client")?;
    let aggregator = Arc::new(Aggregator::new(client, config.api.timeout()));

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Ctrl+C received, stopping");
            ctrl_c_token.cancel();
        }
    });

    if args.daemon {
        info!("🔄 Starting in daemon mode");
        return run_daemon_mode(config, aggregator, cancel).await;
    }

    info!("🚀 Aggregating dashboard from {}", config.api.base_url);

    let Some(result) = aggregator.aggregate_until(&cancel).await else {
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).context("Unable to serialize snapshot")?);
    } else {
        print!("{}", report::render(&result, chrono::Utc::now()));
    }

    if result.overall_status() == OutcomeStatus::TotalFailure {
        error!("❌ No dashboard source available");
        std::process::exit(EXIT_TOTAL_FAILURE);
    }

    Ok(())
}

async fn run_daemon_mode(
    config: Config,
    aggregator: Arc<Aggregator<HttpDataSourceClient>>,
    cancel: CancellationToken,
) -> Result<()> {
    use tokio_cron_scheduler::{Job, JobScheduler};

    if !config.scheduler.enabled {
        error!("❌ Daemon mode requires SCHEDULER_ENABLED=true");
        anyhow::bail!("Scheduler not enabled in configuration");
    }

    if config.scheduler.schedule_times.is_empty() {
        error!("❌ No schedule defined (SCHEDULER_TIMES)");
        anyhow::bail!("No schedule defined");
    }

    info!("📅 Configured aggregation times: {:?}", config.scheduler.schedule_times);

    let mut scheduler = JobScheduler::new().await?;

    for schedule_time in &config.scheduler.schedule_times {
        let Some((hour, minute)) = schedule_time.split_once(':') else {
            error!("❌ Invalid schedule format: {}. Use HH:MM", schedule_time);
            continue;
        };

        // Cron format: "sec minute hour * * *" (every day)
        let cron_expr = format!("0 {} {} * * *", minute, hour);
        info!("📆 Adding scheduled job: {} (cron: {})", schedule_time, cron_expr);

        let aggregator = Arc::clone(&aggregator);
        let cancel = cancel.clone();
        let schedule_time = schedule_time.clone();

        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _l| {
            let aggregator = Arc::clone(&aggregator);
            let cancel = cancel.clone();
            let schedule_time = schedule_time.clone();

            Box::pin(async move {
                info!("⏰ Scheduled run at {} - aggregating dashboard...", schedule_time);

                match aggregator.aggregate_until(&cancel).await {
                    Some(result) => {
                        info!("📊 Scheduled run at {} finished: {:?} ({} source(s) failed)",
                              schedule_time, result.overall_status(), result.failed_sources().len());
                    }
                    None => info!("Scheduled run at {} cancelled", schedule_time),
                }
            })
        })?;

        scheduler.add(job).await?;
    }

    scheduler.start().await?;

    info!("✅ Daemon started. Waiting for scheduled runs...");
    info!("⏸️  Press Ctrl+C to stop the daemon");

    cancel.cancelled().await;

    scheduler.shutdown().await?;
    info!("👋 Daemon stopped");

    Ok(())
}
