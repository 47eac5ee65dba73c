use clap::{Parser, Subcommand};
use direct_upload::utils::format::format_duration;
use direct_upload::utils::hash::hash_file;
use direct_upload::{UploadOptions, Uploader};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a file through the signing endpoint, skipping the transfer if it is already stored
    Upload {
        /// File to upload
        file: PathBuf,

        /// Signing endpoint URL (overrides UPLOAD_SERVER_URL)
        #[arg(long)]
        server_url: Option<String>,

        /// Allowed extensions, e.g. "jpg,png" (overrides UPLOAD_SUFFIXS)
        #[arg(long)]
        suffixs: Option<String>,

        /// Maximum file size, e.g. "100MB" (overrides UPLOAD_MAX_FILE_SIZE)
        #[arg(long)]
        max_file_size: Option<String>,
    },

    /// Print the chunked MD5 digest of a file
    Md5 {
        /// File to hash
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "direct_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Command::Upload {
            file,
            server_url,
            suffixs,
            max_file_size,
        } => {
            let mut options = UploadOptions::from_env();
            if let Some(server_url) = server_url {
                options = options.with_server_url(server_url);
            }
            if let Some(suffixs) = suffixs {
                options = options.with_suffixs(suffixs);
            }
            if let Some(max_file_size) = max_file_size {
                options = options.with_max_file_size(max_file_size);
            }

            info!(
                "🚀 Uploading {} via {} (max {}, types {})",
                file.display(),
                options.server_url,
                options.max_file_size,
                options.suffixs
            );

            let started = Instant::now();
            let uploader = Uploader::from_options(options)?;
            let result = uploader.start_upload(&file).await?;
            info!(
                "🏁 Finished in {}",
                format_duration(started.elapsed().as_millis() as i64)
            );

            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Md5 { file } => {
            let digest = hash_file(&file).await?;
            info!("🔑 {} chunk(s), {} bytes", digest.chunks, digest.size);
            println!("{}  {}", digest.hex, file.display());
        }
    }

    Ok(())
}
