mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use client::backend::HttpBackend;
use client::format::{format_file_size, format_month_year, MatchQuality, ScoreBand};
use client::listing::{Criteria, ScoreBucket, SortKey};
use client::notifications::{JsonFileStore, NotificationSettings};
use client::{Config, NotificationCenter, Store};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("CV analyzer client v{}", env!("CARGO_PKG_VERSION"));

    let settings = NotificationSettings {
        max_notifications: config.max_notifications,
        ..NotificationSettings::default()
    };
    let center = NotificationCenter::load(
        settings,
        Arc::new(JsonFileStore::new(&config.notification_store_path)),
    );
    let backend = HttpBackend::new(&config.backend_url, config.request_timeout)?;
    info!("Backend: {}", config.backend_url);

    let newest_before = center.notifications().first().map(|n| n.id);
    let mut store = Store::new(config, Arc::new(backend), center);

    let outcome = run(&mut store, cli.command).await;

    // Echo what the session raised, oldest first.
    for n in store.center().raised_since(newest_before) {
        eprintln!("[{}] {}: {}", n.severity.as_str(), n.title, n.message);
    }

    outcome
}

async fn run(store: &mut Store, command: Commands) -> Result<()> {
    match command {
        Commands::Upload { file } => {
            if let Err(e) = store.refresh_public_config().await {
                warn!("Using local upload limits: {e}");
            }
            store.select_file(&file)?;
            let cv = store.upload_cv().await?;
            println!(
                "{}  id={}  {}",
                cv.display_name,
                cv.id.as_deref().unwrap_or("-"),
                cv.file_size_bytes.map(format_file_size).unwrap_or_default()
            );
            for role in array_at(&cv.parsed_data, "experiences") {
                println!(
                    "  {} at {}  {} - {}",
                    str_at(role, "position"),
                    str_at(role, "company"),
                    format_month_year(str_at(role, "start_date")),
                    format_month_year(str_at(role, "end_date"))
                );
            }
        }

        Commands::Jobs {
            query,
            sort,
            level,
            samples,
        } => {
            if samples {
                store.refresh_sample_jobs().await?;
                for (i, sample) in store.view().sample_jobs.iter().enumerate() {
                    println!("{i:>3}  {}  ({})", sample.job.title, sample.name);
                }
                return Ok(());
            }

            store.refresh_jobs().await?;
            let mut criteria = Criteria::default()
                .with_query(query.unwrap_or_default())
                .sorted_by(sort.parse::<SortKey>()?);
            if let Some(level) = level {
                criteria = criteria.with_facet("experience_level", level);
            }
            store.filter_jobs(criteria);

            for job in store.view().jobs.view() {
                println!(
                    "{:>6}  {}  {}  {}",
                    job.id.as_deref().unwrap_or("-"),
                    job.title,
                    job.company.as_deref().unwrap_or(""),
                    job.experience_level.as_deref().unwrap_or("")
                );
            }
        }

        Commands::Analyze {
            cv,
            job,
            job_file,
            sample,
        } => {
            store.load_cv(&cv).await?;

            match (job, job_file, sample) {
                (Some(id), None, None) => {
                    store.select_job(&id).await?;
                }
                (None, Some(path), None) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("Cannot read {}", path.display()))?;
                    store.set_job_json(text);
                    store.validate_job_json().await?;
                }
                (None, None, Some(index)) => {
                    store.refresh_sample_jobs().await?;
                    store.select_sample_job(index)?;
                }
                _ => bail!("Pass exactly one of --job, --job-file or --sample"),
            }

            let result = store.analyze().await?;
            println!(
                "Suitability {:>3}  ({})",
                result.suitability_score,
                ScoreBand::for_score(result.suitability_score).as_str()
            );
            println!("Technical   {:>3}", result.technical_score);
            println!("Experience  {:>3}", result.experience_score);
            println!("Education   {:>3}", result.education_score);
            if !result.matching_skills.is_empty() {
                println!("Matching: {}", result.matching_skills.join(", "));
            }
            if !result.missing_skills.is_empty() {
                println!("Missing:  {}", result.missing_skills.join(", "));
            }
            for rec in &result.recommendations {
                println!("  - {rec}");
            }
            if let Some(detailed) = &result.detailed_analysis {
                for requirement in array_at(detailed, "experience_matches") {
                    let quality = MatchQuality::parse(str_at(requirement, "match_quality"));
                    println!(
                        "  [{:<7}] {}",
                        quality.as_str(),
                        str_at(requirement, "requirement")
                    );
                }
            }
        }

        Commands::History {
            bucket,
            sort,
            query,
        } => {
            store.refresh_history().await?;
            let mut criteria = Criteria::default()
                .with_query(query.unwrap_or_default())
                .sorted_by(sort.parse::<SortKey>()?);
            if let Some(bucket) = bucket {
                criteria = criteria.with_bucket(bucket.parse::<ScoreBucket>()?);
            }
            store.filter_history(criteria);

            for item in store.view().recent_analyses.view() {
                println!(
                    "{}  {:>3}  {}  {}",
                    item.date.format("%Y-%m-%d"),
                    item.score,
                    item.job_title,
                    item.cv_name
                );
            }

            let stats = store.statistics();
            println!(
                "\n{} analyses, average {:.2} (excellent {}, good {}, fair {}, poor {})",
                stats.total,
                stats.average_score,
                stats.distribution.excellent,
                stats.distribution.good,
                stats.distribution.fair,
                stats.distribution.poor
            );
        }

        Commands::Notifications { mark_read, clear } => {
            let center = store.center();
            for n in center.notifications() {
                println!(
                    "{} {} [{}] {}: {}",
                    if n.read { " " } else { "*" },
                    n.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    n.severity.as_str(),
                    n.title,
                    n.message
                );
            }
            println!("{} unread", center.unread_count());

            if mark_read {
                center.mark_all_read();
            } else if clear {
                center.clear();
            }
        }

        Commands::Export { analysis, out } => {
            store.load_analysis(&analysis).await?;
            let dir = out.unwrap_or_else(|| PathBuf::from("."));
            let path = store.export_results(&dir)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn array_at<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn str_at<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}
