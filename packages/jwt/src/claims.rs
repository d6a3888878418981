//! Claim set: an ordered map of claim names to JSON values.
//!
//! Only the registered temporal and identity claims (`iss`, `sub`, `aud`,
//! `exp`, `nbf`, and the typed-when-present `iat`/`jti`) carry meaning here.
//! Everything else is opaque caller data.

use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Issuer claim name
pub const ISS: &str = "iss";
/// Subject claim name
pub const SUB: &str = "sub";
/// Audience claim name
pub const AUD: &str = "aud";
/// Expiration claim name
pub const EXP: &str = "exp";
/// Not-before claim name
pub const NBF: &str = "nbf";
/// Issued-at claim name
pub const IAT: &str = "iat";
/// JWT ID claim name
pub const JTI: &str = "jti";

/// Claims carried by a token.
///
/// Keys are kept sorted, so iteration order and the canonical encoding do
/// not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeMap<String, Value>);

impl ClaimSet {
    /// Empty claim set
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set the issuer (`iss`) claim.
    #[must_use]
    pub fn with_issuer(self, iss: impl Into<String>) -> Self {
        self.with_claim(ISS, iss.into())
    }

    /// Set the subject (`sub`) claim.
    #[must_use]
    pub fn with_subject(self, sub: impl Into<String>) -> Self {
        self.with_claim(SUB, sub.into())
    }

    /// Set a single audience (`aud`) claim.
    #[must_use]
    pub fn with_audience(self, aud: impl Into<String>) -> Self {
        self.with_claim(AUD, aud.into())
    }

    /// Set a multi-valued audience (`aud`) claim.
    #[must_use]
    pub fn with_audiences<I, S>(self, aud: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<Value> = aud.into_iter().map(|a| Value::String(a.into())).collect();
        self.with_claim(AUD, values)
    }

    /// Set the expiration (`exp`) claim, truncated to whole seconds.
    #[must_use]
    pub fn with_expiration(self, exp: DateTime<Utc>) -> Self {
        self.with_claim(EXP, exp.timestamp())
    }

    /// Set the not-before (`nbf`) claim, truncated to whole seconds.
    #[must_use]
    pub fn with_not_before(self, nbf: DateTime<Utc>) -> Self {
        self.with_claim(NBF, nbf.timestamp())
    }

    /// Set the issued-at (`iat`) claim, truncated to whole seconds.
    #[must_use]
    pub fn with_issued_at(self, iat: DateTime<Utc>) -> Self {
        self.with_claim(IAT, iat.timestamp())
    }

    /// Set an arbitrary claim.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert a claim, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove a claim.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Look up a claim.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether a claim is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Claims in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Issuer (`iss`), when it is a string.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.get(ISS).and_then(Value::as_str)
    }

    /// Subject (`sub`), when it is a string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.get(SUB).and_then(Value::as_str)
    }

    /// Audience values; a single string audience yields one element.
    #[must_use]
    pub fn audience(&self) -> Vec<&str> {
        match self.get(AUD) {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Expiration in seconds since the Unix epoch.
    #[must_use]
    pub fn expiration(&self) -> Option<i64> {
        self.get(EXP).and_then(Value::as_i64)
    }

    /// Not-before in seconds since the Unix epoch.
    #[must_use]
    pub fn not_before(&self) -> Option<i64> {
        self.get(NBF).and_then(Value::as_i64)
    }

    /// Check the structural invariants of the registered claims.
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidClaims`] naming the offending claim when:
    /// - `iss`, `sub` or `jti` is present but not a non-empty string
    /// - `aud` is present but neither a non-empty string nor a non-empty
    ///   array of non-empty strings
    /// - `exp`, `nbf` or `iat` is present but not an integer
    /// - both `exp` and `nbf` are present and `exp <= nbf`
    pub fn validate(&self) -> JwtResult<()> {
        for name in [ISS, SUB, JTI] {
            if let Some(value) = self.get(name)
                && !is_non_empty_string(value)
            {
                return Err(JwtError::InvalidClaims(format!(
                    "`{name}` must be a non-empty string"
                )));
            }
        }

        if let Some(aud) = self.get(AUD) {
            let valid = match aud {
                Value::Array(items) => !items.is_empty() && items.iter().all(is_non_empty_string),
                other => is_non_empty_string(other),
            };
            if !valid {
                return Err(JwtError::invalid_claims(
                    "`aud` must be a non-empty string or array of non-empty strings",
                ));
            }
        }

        let exp = self.timestamp(EXP)?;
        let nbf = self.timestamp(NBF)?;
        self.timestamp(IAT)?;

        if let (Some(exp), Some(nbf)) = (exp, nbf)
            && exp <= nbf
        {
            return Err(JwtError::invalid_claims("`exp` must be later than `nbf`"));
        }

        Ok(())
    }

    fn timestamp(&self, name: &str) -> JwtResult<Option<i64>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                JwtError::InvalidClaims(format!("`{name}` must be an integer number of seconds"))
            }),
        }
    }

    /// Deterministic JSON encoding: object keys sorted at every depth, no
    /// insignificant whitespace.
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidClaims`] if a value cannot be serialized.
    pub fn canonical_bytes(&self) -> JwtResult<Vec<u8>> {
        let sorted: BTreeMap<&str, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.as_str(), canonicalize(value)))
            .collect();
        serde_json::to_vec(&sorted)
            .map_err(|_| JwtError::invalid_claims("claims are not serializable"))
    }

    /// Check `now` against `nbf` and `exp`, both inclusive, widened by `leeway` seconds.
    ///
    /// # Errors
    /// [`JwtError::InvalidClaims`] when `exp` or `nbf` is present but not an
    /// integer, [`JwtError::TokenExpired`] when `now > exp + leeway`,
    /// [`JwtError::TokenNotYetValid`] when `now < nbf - leeway`.
    pub fn check_time(&self, now: i64, leeway: i64) -> JwtResult<()> {
        let nbf = self.timestamp(NBF)?;
        let exp = self.timestamp(EXP)?;
        if let Some(nbf) = nbf
            && now < nbf.saturating_sub(leeway)
        {
            return Err(JwtError::TokenNotYetValid);
        }
        if let Some(exp) = exp
            && now > exp.saturating_add(leeway)
        {
            return Err(JwtError::TokenExpired);
        }
        Ok(())
    }

    /// Advisory notes about a lifetime that is valid but likely to surprise
    /// a relying party whose clock drifts by up to `drift_window` seconds.
    #[must_use]
    pub fn lifetime_advisories(&self, now: i64, drift_window: i64) -> Vec<LifetimeAdvisory> {
        let mut notes = Vec::new();

        if let Some(exp) = self.expiration() {
            if exp <= now {
                notes.push(LifetimeAdvisory::AlreadyExpired { exp, now });
            } else if exp < now.saturating_add(drift_window) {
                notes.push(LifetimeAdvisory::ExpiresWithinDrift { exp, now });
            }
        }

        if let Some(nbf) = self.not_before() {
            if nbf > now {
                notes.push(LifetimeAdvisory::NotBeforeInFuture { nbf });
            } else if nbf > now.saturating_sub(drift_window) {
                notes.push(LifetimeAdvisory::NotBeforeWithinDrift { nbf, now });
            }
        }

        notes
    }
}

fn is_non_empty_string(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.is_empty())
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

impl FromIterator<(String, Value)> for ClaimSet {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for ClaimSet {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl IntoIterator for ClaimSet {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A valid but questionable token lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeAdvisory {
    /// `exp` is not after the issuance time
    AlreadyExpired {
        /// Expiration, epoch seconds
        exp: i64,
        /// Evaluation time, epoch seconds
        now: i64,
    },
    /// `exp` is inside the clock drift window
    ExpiresWithinDrift {
        /// Expiration, epoch seconds
        exp: i64,
        /// Evaluation time, epoch seconds
        now: i64,
    },
    /// Token will not be usable until `nbf`
    NotBeforeInFuture {
        /// Not-before, epoch seconds
        nbf: i64,
    },
    /// `nbf` is only slightly in the past
    NotBeforeWithinDrift {
        /// Not-before, epoch seconds
        nbf: i64,
        /// Evaluation time, epoch seconds
        now: i64,
    },
}

impl LifetimeAdvisory {
    /// Short name for the advisory, free of claim values
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            LifetimeAdvisory::AlreadyExpired { .. } => "already_expired",
            LifetimeAdvisory::ExpiresWithinDrift { .. } => "expires_within_drift",
            LifetimeAdvisory::NotBeforeInFuture { .. } => "not_before_in_future",
            LifetimeAdvisory::NotBeforeWithinDrift { .. } => "not_before_within_drift",
        }
    }
}

impl fmt::Display for LifetimeAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LifetimeAdvisory::AlreadyExpired { exp, now } => {
                write!(f, "expiration {exp} is not after now ({now})")
            }
            LifetimeAdvisory::ExpiresWithinDrift { exp, now } => write!(
                f,
                "expiration is only {}s away; consider accounting for clock drift",
                exp - now
            ),
            LifetimeAdvisory::NotBeforeInFuture { nbf } => {
                let when = DateTime::<Utc>::from_timestamp(nbf, 0)
                    .map_or_else(|| nbf.to_string(), |t| t.to_rfc3339());
                write!(f, "not-before is in the future; token will not be valid until {when}")
            }
            LifetimeAdvisory::NotBeforeWithinDrift { nbf, now } => write!(
                f,
                "not-before is only {}s in the past; consider accounting for clock drift",
                now - nbf
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> ClaimSet {
        ClaimSet::new()
            .with_issuer("MyApp")
            .with_audience("rev")
            .with_subject("john.doe@acme.com")
            .with_claim(EXP, 2_000)
            .with_claim(NBF, 1_000)
    }

    #[test]
    fn well_formed_claims_validate() {
        assert_eq!(base().validate(), Ok(()));
        assert_eq!(ClaimSet::new().validate(), Ok(()));
    }

    #[test]
    fn empty_identity_claims_are_rejected() {
        for name in [ISS, SUB, AUD] {
            let claims = base().with_claim(name, "");
            assert!(matches!(claims.validate(), Err(JwtError::InvalidClaims(msg)) if msg.contains(name)));
        }
        let claims = base().with_claim(SUB, 42);
        assert!(matches!(claims.validate(), Err(JwtError::InvalidClaims(_))));
    }

    #[test]
    fn audience_array() {
        let claims = base().with_audiences(["rev", "api"]);
        assert_eq!(claims.validate(), Ok(()));
        assert_eq!(claims.audience(), vec!["rev", "api"]);

        let empty = base().with_claim(AUD, json!([]));
        assert!(empty.validate().is_err());
        let blank = base().with_claim(AUD, json!(["rev", ""]));
        assert!(blank.validate().is_err());
    }

    #[test]
    fn expiration_must_follow_not_before() {
        let equal = base().with_claim(EXP, 1_000);
        assert!(matches!(equal.validate(), Err(JwtError::InvalidClaims(_))));
        let before = base().with_claim(EXP, 999);
        assert!(matches!(before.validate(), Err(JwtError::InvalidClaims(_))));
    }

    #[test]
    fn timestamps_must_be_integers() {
        assert!(base().with_claim(EXP, 2_000.5).validate().is_err());
        assert!(base().with_claim(NBF, "1000").validate().is_err());
        assert!(base().with_claim(IAT, json!(null)).validate().is_err());
    }

    #[test]
    fn canonical_bytes_sort_nested_keys() {
        let claims = ClaimSet::new()
            .with_claim("z", json!({"b": 1, "a": [ {"y": true, "x": false} ]}))
            .with_claim("a", "first");
        let bytes = claims.canonical_bytes().unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"a":"first","z":{"a":[{"x":false,"y":true}],"b":1}}"#
        );
    }

    #[test]
    fn time_window_is_inclusive() {
        let claims = base();
        assert_eq!(claims.check_time(1_000, 0), Ok(()));
        assert_eq!(claims.check_time(2_000, 0), Ok(()));
        assert_eq!(claims.check_time(999, 0), Err(JwtError::TokenNotYetValid));
        assert_eq!(claims.check_time(2_001, 0), Err(JwtError::TokenExpired));
        assert_eq!(claims.check_time(2_030, 30), Ok(()));
    }

    #[test]
    fn non_integer_bounds_fail_closed() {
        let fractional = base().with_claim(EXP, 1_000.5);
        assert!(matches!(fractional.check_time(1_700_000_000, 0), Err(JwtError::InvalidClaims(msg)) if msg.contains(EXP)));
        let text = base().with_claim(NBF, "1000");
        assert!(matches!(text.check_time(1_500, 0), Err(JwtError::InvalidClaims(msg)) if msg.contains(NBF)));
    }

    #[test]
    fn advisories() {
        let claims = ClaimSet::new().with_claim(EXP, 1_100).with_claim(NBF, 1_050);
        let notes = claims.lifetime_advisories(1_000, 300);
        assert_eq!(
            notes,
            vec![
                LifetimeAdvisory::ExpiresWithinDrift { exp: 1_100, now: 1_000 },
                LifetimeAdvisory::NotBeforeInFuture { nbf: 1_050 },
            ]
        );

        assert_eq!(notes[0].label(), "expires_within_drift");
        assert!(notes.iter().all(|n| !n.label().chars().any(|c| c.is_ascii_digit())));

        let comfortable = ClaimSet::new().with_claim(EXP, 10_000).with_claim(NBF, 0);
        assert!(comfortable.lifetime_advisories(1_000, 300).is_empty());
    }
}
