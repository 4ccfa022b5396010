//! Naming — image reference normalisation and container name derivation.

use crate::error::DentError;

/// Hex digits of a digest kept in a derived container name.
const DIGEST_CHARS: usize = 12;

/// Split `reference` into the part after the last `/` and everything before it.
fn split_path(reference: &str) -> (&str, &str) {
    match reference.rfind('/') {
        Some(idx) => (&reference[..idx], &reference[idx + 1..]),
        None => ("", reference),
    }
}

/// Append `:latest` when the reference names neither a tag nor a digest.
///
/// A `:` inside the registry host (`localhost:5000/tool`) is not a tag.
pub fn normalize_image(reference: &str) -> String {
    let (_, last) = split_path(reference);
    if last.contains('@') || last.contains(':') {
        reference.to_string()
    } else {
        format!("{}:latest", reference)
    }
}

/// Split a reference into `(repository, tag)` for a registry pull.
///
/// Digest references are pulled whole with no tag; untagged ones get `latest`.
pub fn split_tag(reference: &str) -> (&str, Option<&str>) {
    let (_, last) = split_path(reference);
    if last.contains('@') {
        return (reference, None);
    }
    match last.rfind(':') {
        Some(idx) => {
            let cut = reference.len() - last.len() + idx;
            (&reference[..cut], Some(&reference[cut + 1..]))
        }
        None => (reference, Some("latest")),
    }
}

/// Derive the container name dent uses for `reference`.
///
/// `ubuntu` → `dent-ubuntu`, `ghcr.io/org/tool:1.2` → `dent-tool-1.2`,
/// `alpine@sha256:0123456789abcdef…` → `dent-alpine-0123456789ab`.
pub fn container_name_for_image(prefix: &str, reference: &str) -> String {
    let (_, last) = split_path(reference);

    let base = if let Some((repo, digest)) = last.split_once('@') {
        let hex = digest.split_once(':').map(|(_, h)| h).unwrap_or(digest);
        let short: String = hex.chars().take(DIGEST_CHARS).collect();
        format!("{}-{}", repo, short)
    } else if let Some((repo, tag)) = last.split_once(':') {
        if tag == "latest" {
            repo.to_string()
        } else {
            format!("{}-{}", repo, tag)
        }
    } else {
        last.to_string()
    };

    let mut cleaned = String::with_capacity(base.len());
    for c in base.to_lowercase().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' { c } else { '-' };
        if c == '-' && cleaned.ends_with('-') {
            continue;
        }
        cleaned.push(c);
    }
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.');

    format!("{}{}", prefix, cleaned)
}

/// Docker's container name rule: `[a-zA-Z0-9][a-zA-Z0-9_.-]*`.
pub fn validate_container_name(name: &str) -> Result<(), DentError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphanumeric()
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DentError::InvalidName(name.to_string()))
    }
}
