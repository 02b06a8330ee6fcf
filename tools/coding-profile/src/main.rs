use anyhow::{Context,
             Result};
use async_trait::async_trait;
use clap::{Parser,
           Subcommand};
use coding_strategy::{CodingStrategy,
                      Profile,
                      StrategyOptions};
use oauth_client::types::{OAuth2Tokens,
                          Verify};
use std::path::PathBuf;

/// CLI tool to inspect Coding.net logins
#[derive(Parser, Debug)]
#[command(name = "coding-profile",
          about = "Look up Coding.net profiles through the coding OAuth2 strategy")]
struct Args {
    /// Path to the strategy options file
    #[arg(short, long, help = "TOML file with client_id, client_secret and optional overrides")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print the URL a user visits to grant access
    AuthorizeUrl {
        #[arg(short, long)]
        state: Option<String>,
    },
    /// Fetch the normalized profile for an access token
    Profile {
        #[arg(short, long)]
        access_token: String,
    },
}

/// The tool has no user records of its own; every profile is accepted as is.
struct AcceptAll;

#[async_trait]
impl Verify<Profile> for AcceptAll {
    type User = Profile;

    async fn verify(&self,
                    _tokens: &OAuth2Tokens,
                    profile: Profile)
                    -> oauth_client::error::Result<Profile> {
        Ok(profile)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env().filter_level(log::LevelFilter::Debug)
                                               .init();
    } else {
        env_logger::Builder::from_default_env().filter_level(log::LevelFilter::Info)
                                               .init();
    }

    if !args.config.exists() {
        anyhow::bail!("Config path does not exist: {}", args.config.display());
    }

    let options = StrategyOptions::from_file(&args.config).with_context(|| {
                      format!("Failed to load strategy options from {}",
                              args.config.display())
                  })?;
    let strategy = CodingStrategy::new(&options, AcceptAll).context("Failed to configure strategy")?;
    log::debug!("Using strategy {} with scope {:?}",
                strategy.name(),
                strategy.scope());

    match args.command {
        Command::AuthorizeUrl { state } => {
            let url = strategy.authorization_url(state.as_deref())
                              .context("Failed to build authorization url")?;
            println!("{}", url);
        }
        Command::Profile { access_token } => {
            log::info!("Fetching profile from {}", strategy.user_profile_url());
            let profile = strategy.fetch_profile(&access_token)
                                  .await
                                  .context("Failed to fetch profile")?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }

    Ok(())
}
