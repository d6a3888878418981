//! CLI command definitions

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sealjwt", version)]
#[command(about = "Issue and verify signed-then-encrypted JSON Web Tokens")]
pub struct Cli {
    /// JSON token configuration (algorithms, leeway, drift window, default lifetime)
    #[arg(long, global = true, env = "SEALJWT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Sign claims for <SUBJECT> and encrypt the result for the relying party
    ///
    /// Prints the five-segment compact JWE on stdout.
    ///
    /// Example usage:
    ///   sealjwt issue media.viewer@acme.com --sign signing.private.pem --encrypt rev.public.pem
    ///   sealjwt issue john.doe@acme.com --exp 1662996000 --nbf 1662995100 --video 8e5a...
    Issue(IssueArgs),

    /// Decrypt and verify a token, printing its claims as JSON
    ///
    /// Example usage:
    ///   sealjwt verify "$TOKEN" --decrypt rev.private.pem --verify signing.public.pem
    Verify(VerifyArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct IssueArgs {
    /// `sub` claim: username or email of the user being granted access
    pub subject: String,

    /// `iss` claim
    #[arg(long, default_value = "sealjwt")]
    pub issuer: String,

    /// `aud` claim
    #[arg(long, default_value = "rev")]
    pub audience: String,

    /// `res` claim: the resource the token grants access to
    #[arg(long, visible_aliases = ["video", "webcast"], default_value = "*")]
    pub resource: String,

    /// Extra claim as NAME=VALUE; VALUE is parsed as JSON, falling back to a string
    #[arg(long = "claim", value_name = "NAME=VALUE", value_parser = parse_claim)]
    pub claims: Vec<(String, Value)>,

    /// Expiration in epoch seconds (default: derived from --minutes)
    #[arg(long)]
    pub exp: Option<i64>,

    /// Not Before in epoch seconds
    #[arg(long)]
    pub nbf: Option<i64>,

    /// Expiration in minutes from now (default: from configuration, 60)
    #[arg(long, conflicts_with = "exp")]
    pub minutes: Option<u32>,

    /// Key id placed in the signed token header
    #[arg(long)]
    pub kid: Option<String>,

    /// PEM private key used to sign the claims
    #[arg(long = "sign", value_name = "PEM", env = "SEALJWT_SIGNING_KEY")]
    pub signing_key: PathBuf,

    /// PEM public key of the relying party used to encrypt the token
    #[arg(long = "encrypt", value_name = "PEM", env = "SEALJWT_ENCRYPTION_KEY")]
    pub encryption_key: PathBuf,

    /// Also print the inner signed token (on stderr)
    #[arg(long)]
    pub show_signed: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct VerifyArgs {
    /// Compact JWE to verify
    pub token: String,

    /// PEM private key that unwraps the content key
    #[arg(long = "decrypt", value_name = "PEM", env = "SEALJWT_DECRYPTION_KEY")]
    pub decryption_key: PathBuf,

    /// PEM public key of the signer
    #[arg(long = "verify", value_name = "PEM", env = "SEALJWT_VERIFICATION_KEY")]
    pub verification_key: PathBuf,
}

/// Parse `NAME=VALUE`, reading VALUE as JSON when it is valid JSON.
///
/// # Errors
/// A message for clap when there is no `=` or NAME is empty.
pub fn parse_claim(input: &str) -> Result<(String, Value), String> {
    let (name, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{input}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("claim name must not be empty".to_string());
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}
