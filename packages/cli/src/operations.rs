//! Issue and verify handlers behind the CLI commands

use crate::commands::{Commands, IssueArgs, VerifyArgs};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use sealjwt::claims::LifetimeAdvisory;
use sealjwt::keys::load_key_async;
use sealjwt::{ClaimSet, Issuer, KeyMaterial, TokenConfig, Verifier};
use std::path::Path;
use std::sync::Arc;

/// Output of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A freshly issued token, with its inner signed token when requested
    Issued {
        /// Compact JWE
        token: String,
        /// Compact JWS inside it
        signed: Option<String>,
    },
    /// Claims recovered from a verified token, as pretty JSON
    Verified(String),
}

/// Load configuration, defaulting when no file is given.
///
/// # Errors
/// If the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> Result<TokenConfig> {
    match path {
        Some(path) => TokenConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(TokenConfig::default()),
    }
}

/// Run one command against `now`.
///
/// # Errors
/// Any key loading, claim, issuance or verification failure.
pub async fn run(command: Commands, config: TokenConfig, now: DateTime<Utc>) -> Result<Outcome> {
    match command {
        Commands::Issue(args) => handle_issue(&args, config, now).await,
        Commands::Verify(args) => handle_verify(args, config, now).await,
    }
}

/// Assemble the claim set for `issue` from its arguments.
///
/// `--claim` values are applied last and override the named options.
///
/// # Errors
/// If `--exp` is not in the future.
pub fn build_claims(args: &IssueArgs, config: &TokenConfig, now: DateTime<Utc>) -> Result<ClaimSet> {
    let minutes = args.minutes.unwrap_or(config.default_lifetime_minutes);
    let exp = args
        .exp
        .unwrap_or_else(|| (now + Duration::minutes(i64::from(minutes))).timestamp());

    let mut claims = ClaimSet::new()
        .with_issuer(args.issuer.as_str())
        .with_audience(args.audience.as_str())
        .with_subject(args.subject.as_str())
        .with_claim("res", args.resource.as_str())
        .with_claim(sealjwt::claims::EXP, exp);
    if let Some(nbf) = args.nbf {
        claims.insert(sealjwt::claims::NBF, nbf);
    }
    for (name, value) in &args.claims {
        if claims.insert(name.as_str(), value.clone()).is_some() {
            log::info!("--claim {name} overrides the default value");
        }
    }

    check_time_range(&claims, now, config)?;
    Ok(claims)
}

/// Refuse a token that is expired on issue. Drift and future-nbf
/// cases are only warned about, by the issuer itself.
fn check_time_range(claims: &ClaimSet, now: DateTime<Utc>, config: &TokenConfig) -> Result<()> {
    let drift = i64::from(config.drift_window_seconds);
    let expired = claims
        .lifetime_advisories(now.timestamp(), drift)
        .into_iter()
        .find(|advisory| matches!(advisory, LifetimeAdvisory::AlreadyExpired { .. }));
    if let Some(advisory) = expired {
        bail!("refusing to issue: {advisory}");
    }
    Ok(())
}

async fn load(path: &Path, role: &str) -> Result<sealjwt::RsaKey> {
    load_key_async(path)
        .await
        .with_context(|| format!("loading {role} key {}", path.display()))
}

async fn handle_issue(args: &IssueArgs, config: TokenConfig, now: DateTime<Utc>) -> Result<Outcome> {
    let claims = build_claims(args, &config, now)?;

    let mut signing_key = load(&args.signing_key, "signing").await?;
    if let Some(kid) = &args.kid {
        signing_key = signing_key.with_key_id(kid.as_str());
    }
    let encryption_key = load(&args.encryption_key, "encryption").await?;

    // The inner signed token is needed for --show-signed, so both steps run
    // here on the blocking pool rather than through `Issuer::issue_async`.
    let issuer = Issuer::new(config);
    let (signed, token) = tokio::task::spawn_blocking(move || -> Result<_> {
        let signed = issuer.sign(&signing_key, &claims, now).context("signing claims")?;
        let token = issuer
            .encrypt(&encryption_key, &signed)
            .context("encrypting signed token")?;
        Ok((signed, token))
    })
    .await
    .context("issue task failed")??;

    log::info!("Issued token");
    Ok(Outcome::Issued {
        token: token.into_string(),
        signed: args.show_signed.then_some(signed),
    })
}

async fn handle_verify(args: VerifyArgs, config: TokenConfig, now: DateTime<Utc>) -> Result<Outcome> {
    let decryption_key: Arc<dyn KeyMaterial> =
        Arc::new(load(&args.decryption_key, "decryption").await?);
    let verification_key: Arc<dyn KeyMaterial> =
        Arc::new(load(&args.verification_key, "verification").await?);

    let claims = Verifier::new(config)
        .verify_async(decryption_key, verification_key, args.token, now)
        .await
        .context("verifying token")?;

    let json = serde_json::to_string_pretty(&claims).context("rendering claims")?;
    Ok(Outcome::Verified(json))
}
