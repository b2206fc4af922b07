// ABOUTME: Shared utility functions for the sprint bulletin
// ABOUTME: Percent clamping, link deduplication, and access-code minting

use std::collections::HashSet;

/// Round and clamp a score into the 0..=100 percent range
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Drop blank entries and duplicates, keeping first-seen order
pub fn unique_links<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(Into::into)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Lowercase and trim an email so lookups are case-insensitive
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Mint a fresh access code in the `MAI-XXXXXX` format
pub fn generate_access_code() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::thread_rng();
    let token: String = (0..6)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    format!("MAI-{}", token)
}
