//! Folio CLI - Database migrations and tenant management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run site database migrations
//! folio-cli migrate
//!
//! # Create a profile and point a domain at it
//! folio-cli profile create --user 6f1c... --name "Ada Lovelace"
//! folio-cli domain claim --profile 6f1c... --domain www.ada.dev
//!
//! # Check which profile a host resolves to
//! folio-cli domain resolve ada.dev:443
//!
//! # Derive storage keys and URLs
//! folio-cli storage key profile-images 6f1c.../1718000000000.jpg
//! folio-cli storage url favicons 6f1c.../1718000000000.png
//!
//! # Downsize and re-encode an image before upload
//! folio-cli media prepare photo.png --purpose avatar --owner 6f1c...
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_core::{Bucket, ImagePurpose, UserId};

mod commands;

#[derive(Parser)]
#[command(name = "folio-cli")]
#[command(author, version, about = "Folio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage custom domains
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },
    /// Derive object storage keys and URLs
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
    /// Prepare media for upload
    Media {
        #[command(subcommand)]
        action: MediaAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create an empty profile for a user
    Create {
        /// Owning user ID
        #[arg(short, long)]
        user: UserId,

        /// Display name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum DomainAction {
    /// Claim a domain for a profile
    Claim {
        /// Profile ID
        #[arg(short, long)]
        profile: UserId,

        /// Domain or host (normalized before storing)
        #[arg(short, long)]
        domain: String,
    },
    /// Release a profile's domain
    Release {
        /// Profile ID
        #[arg(short, long)]
        profile: UserId,
    },
    /// Show which profile a host resolves to
    Resolve {
        /// Host as sent in the Host header
        host: String,
    },
}

#[derive(Subcommand)]
enum StorageAction {
    /// Print the storage key for a path in a bucket
    Key {
        /// Logical bucket name (e.g. profile-images)
        bucket: Bucket,

        /// Path inside the bucket
        path: String,
    },
    /// Print the public URL for a path in a bucket
    Url {
        /// Logical bucket name (e.g. profile-images)
        bucket: Bucket,

        /// Path inside the bucket
        path: String,
    },
}

#[derive(Subcommand)]
enum MediaAction {
    /// Downsize and re-encode an image for storage
    Prepare {
        /// Source image file
        file: PathBuf,

        /// What the image is for (`avatar`, `background`, `project`, `favicon`)
        #[arg(short, long)]
        purpose: ImagePurpose,

        /// Owning user ID
        #[arg(short, long)]
        owner: UserId,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Profile { action } => match action {
            ProfileAction::Create { user, name } => {
                commands::profile::create(user, &name).await?;
            }
        },
        Commands::Domain { action } => match action {
            DomainAction::Claim { profile, domain } => {
                commands::domain::claim(profile, &domain).await?;
            }
            DomainAction::Release { profile } => commands::domain::release(profile).await?,
            DomainAction::Resolve { host } => commands::domain::resolve(&host).await?,
        },
        Commands::Storage { action } => match action {
            StorageAction::Key { bucket, path } => commands::storage::key(&bucket, &path),
            StorageAction::Url { bucket, path } => commands::storage::url(&bucket, &path)?,
        },
        Commands::Media { action } => match action {
            MediaAction::Prepare {
                file,
                purpose,
                owner,
                out,
            } => commands::media::prepare(&file, purpose, owner, &out).await?,
        },
    }
    Ok(())
}
