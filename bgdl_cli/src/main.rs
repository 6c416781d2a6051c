use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use bgdl_core::service::DownloadService;
use bgdl_core::types::types::{DownloadConfig, DownloadStatus};

#[derive(Parser)]
#[command(name = "bgdl", about = "Background download demo")]
struct Args {
    /// URL to download
    #[arg(short, long)]
    url: String,

    /// Destination file path, relative to the download directory
    #[arg(short, long, default_value = "downloaded_file")]
    output: PathBuf,

    /// Directory downloads are stored under
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let dest = args.dir.join(&args.output);
    if dest.exists() {
        println!("File already downloaded: {}", dest.display());
        return;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(format!("Downloading {}", args.output.display()));

    let service = DownloadService::new(&args.dir);
    let broadcast_spinner = spinner.clone();
    service.set_completion_callback(Arc::new(move || {
        broadcast_spinner.println("Download-complete broadcast received");
    }));

    let config = DownloadConfig::new(args.url.clone(), args.output.clone());
    let handle = match service.start(config).await {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to start download: {}", e);
            return;
        }
    };

    println!("Starting download: {}", args.url);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let start = Instant::now();

    match handle.finished().await {
        DownloadStatus::Done => {
            let elapsed = start.elapsed();
            spinner.finish_with_message(format!(
                "Download completed in {:.2}s",
                elapsed.as_secs_f64()
            ));
        }
        _ => {
            spinner.abandon_with_message(format!(
                "Download failed: {}",
                handle.error().unwrap_or_else(|| "unknown error".to_string())
            ));
        }
    }
}
