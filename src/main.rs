use std::{env, path::PathBuf, process, time::Duration};

use clap::{Parser, ValueEnum};
use imagezebra_rs::{AnalysisSummary, Credentials, IzClient, PollParams, UserData};
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the image file to analyze
    #[clap(default_value = "images/low_res_GT_A.jpg")]
    image: PathBuf,
    /// Analyze against a specific target from the library
    #[clap(short = 't', long)]
    target_id: Option<String>,
    /// Override the application key from the environment variable
    #[clap(short = 'k', long)]
    application_key: Option<String>,
    /// Override the username from the environment variable
    #[clap(short, long)]
    username: Option<String>,
    /// Override the password from the environment variable
    #[clap(short, long)]
    password: Option<String>,
    /// API URL for the ImageZebra API
    #[clap(short, long, default_value = imagezebra_rs::BASE_URL)]
    api_url: String,
    /// Seconds to wait between result polls
    #[clap(short = 'i', long, default_value = "5")]
    poll_interval: u64,
    /// Give up after this many result polls
    #[clap(short = 'm', long)]
    max_attempts: Option<u32>,
    /// Set the log level
    #[arg(value_enum)]
    #[clap(short = 'L', long, default_value = "info")]
    log_level: LogLevel,
    /// Display timestamps with log messages
    #[clap(short = 'T', long)]
    timestamp: bool,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Quiet,
}

#[tokio::main]
pub async fn main() {
    let args = Args::parse();

    tracing_subscriber_handler(&args);

    let credentials = credentials_from_args(&args);

    let client = match IzClient::connect_with_url(&args.api_url, &credentials).await {
        Ok(client) => client,
        Err(e) => {
            error!("Error while authenticating: {}", e);
            process::exit(1);
        }
    };

    match client.user_data().await {
        Ok(user) => print_balance(&user),
        Err(e) => {
            error!("Error while fetching user data: {}", e);
            process::exit(1);
        }
    }

    let upload_id =
        match imagezebra_rs::upload_and_analyze(&client, &args.image, args.target_id.as_deref())
            .await
        {
            Ok(upload_id) => upload_id,
            Err(e) => {
                error!("Error while uploading {}: {}", args.image.display(), e);
                process::exit(1);
            }
        };

    let params = PollParams {
        interval: Duration::from_secs(args.poll_interval),
        max_attempts: args.max_attempts,
    };
    let summary = match imagezebra_rs::wait_for_summary_with(&client, &upload_id, &params).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Error while waiting for analysis results: {}", e);
            process::exit(1);
        }
    };

    print_summary(&summary);
}

/// Resolve each credential from its flag, falling back to the environment.
fn credentials_from_args(args: &Args) -> Credentials {
    Credentials {
        application_key: credential(&args.application_key, "IMAGEZEBRA_APPLICATION_KEY"),
        username: credential(&args.username, "IMAGEZEBRA_USERNAME"),
        password: credential(&args.password, "IMAGEZEBRA_PASSWORD"),
    }
}

fn credential(override_value: &Option<String>, env_var: &str) -> String {
    match override_value {
        Some(value) => value.clone(),
        None => match env::var(env_var) {
            Ok(value) => value,
            Err(_) => {
                error!("No value for {} provided, exiting.", env_var);
                process::exit(1);
            }
        },
    }
}

fn print_balance(user: &UserData) {
    if let Some(tier) = &user.tier_name {
        println!("User is on the {} tier of service", tier);
    }
    let platinum = user
        .tier_name
        .as_deref()
        .map(|tier| tier.eq_ignore_ascii_case("platinum"))
        .unwrap_or(false);
    if platinum {
        println!("User has no restrictions on uploads as a platinum tier subscriber (API rate limits apply)");
    } else {
        println!(
            "User has {} remaining uploads this billing period",
            user.analysis_balance
        );
    }
}

fn print_summary(summary: &AnalysisSummary) {
    println!("\nAnalysis for {}", summary.file_path);
    println!("{}", "*".repeat(80));
    println!("Passing quality thresholds: {}", summary.passing);
    println!("Reference values used: {}", summary.reference_values_used);
    println!("Specification used: {}", summary.spec);
    println!("Target type: {}", summary.target_type);

    for group in &summary.metric_groups {
        println!("\n{}\n{}", group.name, "-".repeat(80));
        for metric in &group.metrics {
            println!(
                "{:<40}{} stars, passing: {}",
                metric.name, metric.stars, metric.is_passing
            );
        }
    }
}

fn tracing_subscriber_handler(args: &Args) {
    let env_filter = match args.log_level {
        LogLevel::Debug => "imagezebra_rs=debug",
        LogLevel::Info => "imagezebra_rs=info",
        LogLevel::Warn => "imagezebra_rs=warn",
        LogLevel::Error => "imagezebra_rs=error",
        LogLevel::Quiet => "imagezebra_rs=off",
    };

    // "if" because the subscriber doesn't yield the same type with or without time wich prevents
    // using a match statement.
    if args.timestamp {
        let sub = tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .finish();
        tracing::subscriber::set_global_default(sub)
            .expect("Error while setting subscriber for tracing.");
    } else {
        let sub = tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .without_time()
            .finish();
        tracing::subscriber::set_global_default(sub)
            .expect("Error while setting subscriber for tracing.");
    };
}
