use clap::{Parser, Subcommand};

use journalwise::date_util::parse_timestamp;
use journalwise::metrics::constants::DEFAULT_FORECAST_DAYS;
use journalwise::{Forecast, JournalWise, MetricsSnapshot, NewEntry, Period};

#[derive(Parser)]
#[command(name = "journalwise", about = "Wellness analytics for a sentiment-scored journal")]
struct Cli {
    /// Database path (default: ~/.journalwise/journalwise.db)
    #[arg(long)]
    db: Option<String>,

    /// User id (default: config key user_id, else "me")
    #[arg(long)]
    user: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write journal entries and scores
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Compute and store a metrics snapshot
    Metrics {
        /// Period: daily, weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: String,
        /// Reference time (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Today's wellness dashboard
    Dashboard {
        /// Reference time (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two periods
    Compare {
        #[arg(long, default_value = "weekly")]
        period: String,
        /// Reference time of the current period (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Period kind of the baseline (default: same as --period)
        #[arg(long)]
        previous_period: Option<String>,
        /// Reference time of the baseline (default: one window before --at)
        #[arg(long)]
        previous_at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Wellness history for a period kind
    History {
        #[arg(long, default_value = "weekly")]
        period: String,
        /// Number of points
        #[arg(long, default_value = "10")]
        limit: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Best days, times and triggers over recent entries
    Patterns {
        /// Days to look back
        #[arg(long, default_value = "30")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Project the wellness score forward
    Forecast {
        /// Days ahead
        #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS)]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sentiment statistics
    Stats {
        #[command(subcommand)]
        target: StatsTarget,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show warehouse status
    Status,
}

#[derive(Subcommand)]
enum EntryAction {
    /// Add one entry
    Add {
        /// Entry text
        text: String,
        /// Sentiment score from the scoring service
        #[arg(long, allow_hyphen_values = true)]
        score: Option<f64>,
        /// Creation time (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Import entries from a JSON array of {created_at, text, score}
    Import {
        /// Path to the JSON file
        path: String,
    },
    /// Set the sentiment score of an existing entry
    Score {
        entry_id: i64,
        #[arg(allow_hyphen_values = true)]
        score: f64,
    },
}

#[derive(Subcommand)]
enum StatsTarget {
    /// Average score and label counts per day
    Daily {
        #[arg(long)]
        json: bool,
    },
    /// Label counts between two dates
    Labels {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
}

fn resolve_time(value: Option<&str>) -> anyhow::Result<chrono::NaiveDateTime> {
    match value {
        Some(s) => parse_timestamp(s).ok_or_else(|| anyhow::anyhow!("Unrecognised time: {s}")),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

fn parse_date(s: &str) -> anyhow::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, journalwise::date_util::DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid date {s}: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => journalwise::Database::open_at(path).await?,
        None => journalwise::Database::open().await?,
    };
    let jw = JournalWise::new(db);

    let user = match cli.user {
        Some(u) => u,
        None => jw.default_user().await?,
    };

    match cli.command {
        Commands::Entry { action } => handle_entry(&jw, &user, action).await?,
        Commands::Metrics { period, at, json } => {
            let p = Period::parse(&period)?;
            let snapshot = jw.generate_metrics(&user, p, resolve_time(at.as_deref())?).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
        Commands::Dashboard { at, json } => {
            let d = jw.dashboard(&user, resolve_time(at.as_deref())?).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&d)?);
            } else {
                println!("Dashboard: {} ({})", d.user_id, d.date);
                println!("  Wellness:  {:.1} ({})", d.wellness_score, d.status.as_str());
                println!("  Streak:    {} days", d.quick_stats.streak_days);
                println!("  Today:     {} entries", d.quick_stats.entries_today);
                println!("  Positive:  {}", d.quick_stats.positivity_ratio);
                println!("  Balance:   {:.1}", d.quick_stats.emotional_balance);
                println!(
                    "  Trend:     {} ({:+.1}%)",
                    d.trends.direction.as_str(),
                    d.trends.change_percentage
                );
                print_goals(&d.goals);
            }
        }
        Commands::Compare {
            period,
            at,
            previous_period,
            previous_at,
            json,
        } => {
            let p = Period::parse(&period)?;
            let at = resolve_time(at.as_deref())?;
            let prev_p = match previous_period {
                Some(s) => Period::parse(&s)?,
                None => p,
            };
            let prev_at = match previous_at {
                Some(s) => resolve_time(Some(s.as_str()))?,
                None => at - chrono::Duration::days(p.window_days() as i64),
            };
            let c = jw.compare(&user, (p, at), (prev_p, prev_at)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&c)?);
            } else {
                println!(
                    "Comparison: {} {} vs {} {}",
                    c.current_period, c.current_date, c.previous_period, c.previous_date
                );
                println!(
                    "  Wellness:    {:.1} -> {:.1} ({:+.1}, {:+.1}%)",
                    c.wellness_score.previous,
                    c.wellness_score.current,
                    c.wellness_score.change,
                    c.wellness_score.change_percentage
                );
                for (name, m) in [
                    ("Balance:    ", &c.emotional_balance),
                    ("Consistency:", &c.writing_consistency),
                    ("Positivity: ", &c.positivity_ratio),
                ] {
                    println!("  {name} {:.1} -> {:.1} ({:+.1})", m.previous, m.current, m.change);
                }
            }
        }
        Commands::History { period, limit, json } => {
            let p = Period::parse(&period)?;
            let now = chrono::Local::now().naive_local();
            let points = jw.historical_trends(&user, p, limit, now).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                println!("{:<12} {:>8} {:>8} {:>8} {:>8}", "Date", "Wellness", "Balance", "Consist", "Ratio");
                for pt in points {
                    println!(
                        "{:<12} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
                        pt.date.to_string(),
                        pt.wellness_score,
                        pt.emotional_balance,
                        pt.writing_consistency,
                        pt.positivity_ratio
                    );
                }
            }
        }
        Commands::Patterns { days, json } => {
            let now = chrono::Local::now().naive_local();
            let a = jw.pattern_analysis(&user, days, now).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&a)?);
            } else {
                println!("Patterns over the last {} days", a.days);
                println!("  Best days:  {}", a.patterns.best_days.join(", "));
                println!("  Best times: {}", a.patterns.best_times.join(", "));
                println!("  Lifts:      {}", a.patterns.triggers.positive.join(", "));
                println!("  Drags:      {}", a.patterns.triggers.negative.join(", "));
                println!("  Volatility: {:.1} ({:?})", a.volatility.score, a.volatility.level);
                println!(
                    "  Recovery:   {:.1} days ({})",
                    a.recovery.average_time_days,
                    a.recovery.description.as_str()
                );
                for insight in &a.insights {
                    println!("  * {}", insight.message);
                }
            }
        }
        Commands::Forecast { days, json } => {
            let today = chrono::Local::now().date_naive();
            let f = jw.forecast(&user, days, today).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&f)?);
            } else {
                match f {
                    Forecast::InsufficientData { message, .. } => println!("{message}"),
                    Forecast::Projected {
                        next_days,
                        current_score,
                        predicted_score,
                        trend,
                        confidence,
                        recommendation,
                    } => {
                        println!("Forecast ({next_days} days)");
                        println!("  Current:    {current_score:.1}");
                        println!("  Predicted:  {predicted_score:.1} ({})", trend.as_str());
                        println!("  Confidence: {confidence}%");
                        println!("  {recommendation}");
                    }
                }
            }
        }
        Commands::Stats { target } => match target {
            StatsTarget::Daily { json } => {
                let days = jw.daily_stats(&user).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&days)?);
                } else if days.is_empty() {
                    println!("No scored entries.");
                } else {
                    for d in days {
                        println!(
                            "{}  avg {:+.2}  +{} ={} -{}",
                            d.date, d.average_score, d.positive, d.neutral, d.negative
                        );
                    }
                }
            }
            StatsTarget::Labels { start, end, json } => {
                let b = jw.label_stats(&user, parse_date(&start)?, parse_date(&end)?).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&b)?);
                } else {
                    println!("Labels {} .. {}", b.start, b.end);
                    for l in &b.labels {
                        println!("  {:<9} {}", l.label.as_str(), l.count);
                    }
                    match b.most_frequent {
                        Some(l) => println!("  Most frequent: {}", l.label.as_str()),
                        None => println!("  No scored entries in range."),
                    }
                }
            }
        },
        Commands::Config { action } => handle_config(&jw, action).await?,
        Commands::Status => print_status(&jw).await?,
    }

    Ok(())
}

async fn handle_entry(jw: &JournalWise, user: &str, action: EntryAction) -> anyhow::Result<()> {
    match action {
        EntryAction::Add { text, score, at } => {
            let entry = NewEntry {
                created_at: resolve_time(at.as_deref())?,
                text,
                score,
            };
            let id = jw.add_entry(user, entry).await?;
            println!("Added entry {id}.");
        }
        EntryAction::Import { path } => {
            let raw = std::fs::read_to_string(&path)?;
            let entries: Vec<NewEntry> = serde_json::from_str(&raw)?;
            let count = jw.import_entries(user, entries).await?;
            println!("Imported {count} entries.");
        }
        EntryAction::Score { entry_id, score } => {
            jw.score_entry(entry_id, score).await?;
            println!("Entry {entry_id} scored.");
        }
    }
    Ok(())
}

async fn handle_config(jw: &JournalWise, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => match jw.config_get(&key).await? {
            Some(v) => println!("{key} = {v}"),
            None => println!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            jw.config_set(&key, &value).await?;
            println!("Config updated.");
        }
        ConfigAction::List => {
            let items = jw.config_list().await?;
            if items.is_empty() {
                println!("No configuration set.");
            } else {
                for (k, v) in items {
                    println!("{k} = {v}");
                }
            }
        }
    }
    Ok(())
}

async fn print_status(jw: &JournalWise) -> anyhow::Result<()> {
    let c = jw.status().await?;
    println!("Warehouse Status");
    println!("  Entries:    {}", c.entries);
    println!("  Scored:     {}", c.scored_entries);
    println!("  Authors:    {}", c.authors);
    println!("  Snapshots:  {}", c.snapshots);
    println!(
        "  Last entry: {}",
        c.last_entry_at.unwrap_or_else(|| "never".to_string())
    );
    Ok(())
}

fn print_snapshot(s: &MetricsSnapshot) {
    let m = &s.metrics;
    println!("Wellness Metrics: {} ({} {})", s.user_id, s.period, s.date);
    println!("  Wellness:     {:.1}", m.wellness_score);
    println!("  Balance:      {:.1}", m.emotional_balance);
    println!("  Consistency:  {:.1}", m.writing_consistency);
    println!("  Positivity:   {:.1}", m.positivity_ratio);
    println!("  Reflection:   {:.1}", m.self_reflection_depth);
    let h = &s.emotional_health;
    println!("  Emotional Health:");
    println!(
        "    Entries:    +{} ={} -{}",
        h.balance.positive, h.balance.neutral, h.balance.negative
    );
    println!("    Volatility: {:.1} ({:?})", h.volatility.score, h.volatility.level);
    println!(
        "    Recovery:   {:.1} days ({})",
        h.recovery.average_time_days,
        h.recovery.description.as_str()
    );
    println!("  Trend: {} ({:+.1}%)", s.trends.direction.as_str(), s.trends.change_percentage);
    println!(
        "  Streaks: writing {} (best {}), positive {} (best {})",
        s.streaks.current_writing,
        s.streaks.record_writing,
        s.streaks.current_positive,
        s.streaks.record_positive
    );
    print_goals(&s.goals);
}

fn print_goals(g: &journalwise::metrics::Goals) {
    println!("  Goals:");
    for (name, goal) in [("Weekly: ", &g.weekly), ("Monthly:", &g.monthly)] {
        let status = match goal.status {
            journalwise::metrics::GoalStatus::Achieved => "achieved",
            journalwise::metrics::GoalStatus::InProgress => "in progress",
        };
        println!("    {name} {}/{} entries ({status})", goal.achieved, goal.target);
    }
}
