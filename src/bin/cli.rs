//! MealMood CLI
//!
//! Command-line interface for MealMood:
//! - Log meals and moods
//! - Browse the timeline
//! - Show insights
//! - Import observations from CSV, or analyze a CSV offline

use anyhow::{bail, Context};
use chrono::{Duration, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use mealmood::api::routes::events::MAX_BATCH_SIZE;
use mealmood::insights::{InsightConfig, InsightEngine};
use mealmood::producers::CsvImporter;
use mealmood::timeline::{EventFactory, MoodState, TimelineStore};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mealmood")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Meal & mood timeline")]
#[command(long_about = "MealMood merges meals, moods and health samples into one timeline.\nLog what you eat and how you feel, and see which meals affect your mood and sleep.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8086", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a meal
    Meal {
        /// Food type, e.g. "Pizza"
        food: String,
        /// Free-text description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Timestamp (default: now). Supports: "now", "yesterday", RFC 3339, Unix milliseconds
        #[arg(short, long)]
        time: Option<String>,
    },

    /// Log a mood
    Mood {
        /// Happy, Sad, Angry, Surprised, Neutral, Anxious, Tired
        mood: String,
        /// Intensity percentage (0-100)
        #[arg(short, long, default_value = "50")]
        intensity: u8,
        /// Timestamp (default: now)
        #[arg(short, long)]
        time: Option<String>,
    },

    /// Show the timeline, newest first
    Timeline {
        /// Only one kind (meal, mood, sleep, heart_metric)
        #[arg(short, long)]
        kind: Option<String>,
        /// Maximum number of events
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show insights
    Insights {
        /// Only the single best insight
        #[arg(long)]
        best: bool,
        /// Write insights onto their meal events
        #[arg(long, conflicts_with = "best")]
        annotate: bool,
    },

    /// Show server status
    Status,

    /// Import observations from CSV into the server
    Import {
        /// CSV with columns kind,timestamp,end,value,label,detail
        path: PathBuf,
        /// UTC offset for timestamps without a zone
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        utc_offset_minutes: i32,
        /// Parse only, don't send anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print insights for a CSV without a server
    Analyze {
        /// CSV with columns kind,timestamp,end,value,label,detail
        path: PathBuf,
        /// UTC offset for timestamps without a zone and for local-hour rules
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        utc_offset_minutes: i32,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Meal {
            food,
            description,
            time,
        } => {
            let timestamp = parse_time(time.as_deref())?;
            let body = json!({
                "kind": "meal",
                "foodType": food,
                "description": description,
                "timestamp": timestamp,
            });

            let response = post_json(&client, &format!("{}/api/v1/events", cli.api_url), &body).await?;
            println!(
                "Logged meal {} at {}",
                response["event"]["title"].as_str().unwrap_or("-"),
                format_timestamp(timestamp)
            );
        }

        Commands::Mood {
            mood,
            intensity,
            time,
        } => {
            let state = MoodState::from_label(&mood)
                .with_context(|| format!("Unknown mood: {}", mood))?;
            let timestamp = parse_time(time.as_deref())?;
            let body = json!({
                "kind": "mood",
                "mood": state,
                "intensity": intensity,
                "timestamp": timestamp,
            });

            let response = post_json(&client, &format!("{}/api/v1/events", cli.api_url), &body).await?;
            println!(
                "Logged mood {} at {}",
                response["event"]["subtitle"].as_str().unwrap_or("-"),
                format_timestamp(timestamp)
            );
        }

        Commands::Timeline { kind, limit } => {
            let mut url = format!("{}/api/v1/timeline?limit={}", cli.api_url, limit);
            if let Some(kind) = &kind {
                url.push_str(&format!("&kind={}", kind));
            }

            let data = get_json(&client, &url).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_timeline(&data);
            }
        }

        Commands::Insights { best, annotate } => {
            let data = if annotate {
                post_json(
                    &client,
                    &format!("{}/api/v1/insights/annotate", cli.api_url),
                    &json!({}),
                )
                .await?
            } else if best {
                get_json(&client, &format!("{}/api/v1/insights/best", cli.api_url)).await?
            } else {
                get_json(&client, &format!("{}/api/v1/insights", cli.api_url)).await?
            };

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if annotate {
                println!("Annotated {} meals", data["annotated"].as_u64().unwrap_or(0));
            } else if best {
                match data["insight"]["text"].as_str() {
                    Some(text) => println!("{}", text),
                    None => println!("No insight yet."),
                }
            } else {
                print_insights(&data);
            }
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;

                    println!("MealMood v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!("Events: {}", health["events"].as_u64().unwrap_or(0));

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to MealMood API at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the MealMood API server is running:");
                    eprintln!("  cargo run --bin mealmood");
                    return Err(e.into());
                }
            }
        }

        Commands::Import {
            path,
            utc_offset_minutes,
            dry_run,
        } => {
            let importer = CsvImporter::new().with_offset(offset(utc_offset_minutes)?);
            let result = importer
                .import(&path)
                .with_context(|| format!("importing {:?}", path))?;

            println!("Import results:");
            println!("  Rows processed: {}", result.rows_processed);
            println!("  Rows failed: {}", result.rows_failed);
            print_errors(&result.errors);

            if dry_run {
                println!();
                println!("(Dry run - no data was imported)");
            } else if !result.observations.is_empty() {
                println!();
                println!("Importing data...");

                let url = format!("{}/api/v1/events/batch", cli.api_url);
                let mut accepted = 0;
                let mut duplicates = 0;
                let mut rejected = 0;

                for chunk in result.observations.chunks(MAX_BATCH_SIZE) {
                    let response = client
                        .post(&url)
                        .json(&json!({ "observations": chunk }))
                        .send()
                        .await?;
                    let summary: Value = response.json().await?;

                    accepted += summary["accepted"].as_u64().unwrap_or(0);
                    duplicates += summary["duplicates"].as_u64().unwrap_or(0);
                    rejected += summary["rejected"].as_u64().unwrap_or(0);
                }

                println!("  Imported: {}", accepted);
                println!("  Duplicates: {}", duplicates);
                if rejected > 0 {
                    println!("  Rejected: {}", rejected);
                }
            }
        }

        Commands::Analyze {
            path,
            utc_offset_minutes,
        } => {
            let offset = offset(utc_offset_minutes)?;
            let result = CsvImporter::new()
                .with_offset(offset)
                .import(&path)
                .with_context(|| format!("importing {:?}", path))?;
            print_errors(&result.errors);

            let factory = EventFactory::new(offset);
            let mut store = TimelineStore::new();
            let mut rejected = 0;
            for observation in &result.observations {
                match factory.observation(observation) {
                    Ok(event) => {
                        store.insert(event);
                    }
                    Err(e) => {
                        eprintln!("  Skipped: {}", e);
                        rejected += 1;
                    }
                }
            }

            let engine = InsightEngine::new(InsightConfig::default());
            let insights = engine.generate(store.all());

            println!(
                "{} events ({} rejected), {} insights",
                store.len(),
                rejected,
                insights.len()
            );

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&insights)?);
            } else if !engine.has_enough_data(store.all()) {
                println!("Not enough data yet. Log a few meals and moods first.");
            } else {
                for insight in &insights {
                    println!("  • {}", insight.text);
                }
            }
        }

        Commands::Config { output } => {
            let config = mealmood::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn get_json(client: &reqwest::Client, url: &str) -> anyhow::Result<Value> {
    let response = client.get(url).send().await?;
    read_response(response).await
}

async fn post_json(client: &reqwest::Client, url: &str, body: &Value) -> anyhow::Result<Value> {
    let response = client.post(url).json(body).send().await?;
    read_response(response).await
}

async fn read_response(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("Request failed ({}): {}", status, text);
    }
    Ok(response.json().await?)
}

fn offset(minutes: i32) -> anyhow::Result<FixedOffset> {
    Ok(EventFactory::with_offset_minutes(minutes)?.offset())
}

fn parse_time(time: Option<&str>) -> anyhow::Result<i64> {
    match time {
        None | Some("now") => Ok(Utc::now().timestamp_millis()),
        Some("yesterday") => Ok((Utc::now() - Duration::days(1)).timestamp_millis()),
        Some(s) => {
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                Ok(dt.timestamp_millis())
            } else if let Ok(ts) = s.parse::<i64>() {
                Ok(ts)
            } else {
                bail!("Invalid timestamp format: {}", s)
            }
        }
    }
}

fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!();
    println!("Errors (first 10):");
    for error in errors.iter().take(10) {
        println!("  {}", error);
    }
}

fn print_timeline(data: &Value) {
    let events = match data["events"].as_array() {
        Some(e) if !e.is_empty() => e,
        _ => {
            println!("Timeline is empty");
            return;
        }
    };

    println!("{:<22} {:<13} {:<16} {}", "Time", "Kind", "Title", "Details");
    println!("{}", "-".repeat(72));

    for event in events {
        println!(
            "{:<22} {:<13} {:<16} {}",
            format_timestamp(event["timestamp"].as_i64().unwrap_or(0)),
            event["kind"].as_str().unwrap_or("-"),
            event["title"].as_str().unwrap_or("-"),
            event["subtitle"].as_str().unwrap_or("")
        );
        if let Some(insight) = event["insight"].as_str() {
            println!("{:<22} {}", "", insight);
        }
    }

    println!();
    println!(
        "{} of {} events (version {})",
        events.len(),
        data["total"].as_u64().unwrap_or(0),
        data["version"].as_u64().unwrap_or(0)
    );
}

fn print_insights(data: &Value) {
    if data["status"] == "insufficient_data" {
        println!("Not enough data yet. Log a few meals and moods first.");
        return;
    }

    match data["insights"].as_array() {
        Some(insights) if !insights.is_empty() => {
            for insight in insights {
                println!("  • {}", insight["text"].as_str().unwrap_or("-"));
            }
        }
        _ => println!("No patterns found yet."),
    }
}
