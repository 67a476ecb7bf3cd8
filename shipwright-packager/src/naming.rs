//! Transient repository names
//!
//! Names have the shape `{prefix}-{unix_millis}-{sequence}-{random}`. The
//! process-wide sequence guarantees uniqueness inside one process; the
//! timestamp and random suffix keep separate processes apart.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Maximum repository name length accepted by the host
pub const MAX_NAME_LEN: usize = 100;

/// Room reserved after the prefix: three dashes, 13 timestamp digits,
/// up to 20 sequence digits and 8 random hex digits
const SUFFIX_RESERVE: usize = 3 + 13 + 20 + 8;

const RANDOM_LEN: usize = 8;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Allocates a fresh repository name for one pipeline run
pub fn allocate(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();

    format!("{}-{}-{}-{}", prefix, millis, sequence, &random[..RANDOM_LEN])
}

/// Checks that names allocated from `prefix` are valid repository names
pub fn validate_prefix(prefix: &str) -> anyhow::Result<()> {
    if prefix.is_empty() {
        anyhow::bail!("repository prefix cannot be empty");
    }

    if prefix.starts_with('.') {
        anyhow::bail!("repository prefix cannot start with '.'");
    }

    if let Some(c) = prefix
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        anyhow::bail!("repository prefix contains invalid character {:?}", c);
    }

    if prefix.len() + SUFFIX_RESERVE > MAX_NAME_LEN {
        anyhow::bail!(
            "repository prefix is too long ({} > {} characters)",
            prefix.len(),
            MAX_NAME_LEN - SUFFIX_RESERVE
        );
    }

    Ok(())
}

/// Checks whether `name` was produced by [`allocate`] with this prefix
///
/// Used when sweeping leftovers, so unrelated repositories that merely share
/// the prefix are never touched.
pub fn is_transient_name(prefix: &str, name: &str) -> bool {
    let Some(rest) = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    let parts: Vec<&str> = rest.split('-').collect();
    match parts.as_slice() {
        [millis, sequence, random] => {
            is_digits(millis)
                && is_digits(sequence)
                && random.len() == RANDOM_LEN
                && random.chars().all(|c| c.is_ascii_hexdigit())
        }
        _ => false,
    }
}

/// Returns when a transient name was allocated
///
/// `None` when `name` was not produced by [`allocate`] with this prefix.
pub fn allocated_at(prefix: &str, name: &str) -> Option<DateTime<Utc>> {
    if !is_transient_name(prefix, name) {
        return None;
    }

    let rest = &name[prefix.len() + 1..];
    let millis = rest.split('-').next()?.parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
