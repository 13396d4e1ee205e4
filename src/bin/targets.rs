//! Demonstrates target library management and target-based analysis: reuse or
//! create a named target, analyze an image against it, display the results,
//! and clean up any target this run created.

use std::{env, path::PathBuf, process};

use clap::{Parser, ValueEnum};
use imagezebra_rs::{AnalysisSummary, Credentials, IzClient, TargetType};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the image file to analyze
    #[clap(default_value = "images/low_res_GT_A.jpg")]
    image: PathBuf,
    /// Name for the target library entry
    #[clap(short, long, default_value = "Example Golden Thread")]
    name: String,
    /// Type of the target
    #[arg(value_enum)]
    #[clap(short = 'y', long, default_value = "golden-thread-device-level")]
    target_type: TargetType,
    /// Source of the reference values for the target
    #[clap(short, long, default_value = "target_type_defaults")]
    reference_data_source: String,
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
async fn main() {
    let args = Args::parse();

    tracing_subscriber_handler(&args);

    let credentials = Credentials {
        application_key: credential(&args.application_key, "IMAGEZEBRA_APPLICATION_KEY"),
        username: credential(&args.username, "IMAGEZEBRA_USERNAME"),
        password: credential(&args.password, "IMAGEZEBRA_PASSWORD"),
    };

    let client = match IzClient::connect_with_url(&args.api_url, &credentials).await {
        Ok(client) => client,
        Err(e) => {
            error!("Error while authenticating: {}", e);
            process::exit(1);
        }
    };

    // The API does not enforce name uniqueness, so scan the library first and
    // only create (and later delete) a target when the name is free.
    let targets = match imagezebra_rs::list_targets(&client).await {
        Ok(targets) => targets,
        Err(e) => {
            error!("Error while listing targets: {}", e);
            process::exit(1);
        }
    };

    let (target_id, created) = match imagezebra_rs::find_by_name(&targets, &args.name) {
        Some(existing) => {
            info!(
                "Target {} already exists (id: {}), reusing it.",
                existing.name, existing.id
            );
            (existing.id.clone(), false)
        }
        None => {
            let target = match imagezebra_rs::create_target(
                &client,
                &args.name,
                args.target_type,
                &args.reference_data_source,
            )
            .await
            {
                Ok(target) => target,
                Err(e) => {
                    error!("Error while creating target {}: {}", args.name, e);
                    process::exit(1);
                }
            };
            println!("Created target: {} (id: {})", target.name, target.id);
            (target.id, true)
        }
    };

    let upload_id =
        match imagezebra_rs::upload_and_analyze(&client, &args.image, Some(&target_id)).await {
            Ok(upload_id) => upload_id,
            Err(e) => {
                error!("Error while uploading {}: {}", args.image.display(), e);
                process::exit(1);
            }
        };

    let summary = match imagezebra_rs::wait_for_summary(&client, &upload_id).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Error while waiting for analysis results: {}", e);
            process::exit(1);
        }
    };

    print_summary(&summary);

    if created {
        match imagezebra_rs::delete_target(&client, &target_id).await {
            Ok(_) => println!("\nDeleted target {}", target_id),
            Err(e) => {
                error!("Error while deleting target {}: {}", target_id, e);
                process::exit(1);
            }
        }
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
