//! Domain input normalization.
//!
//! Every raw input goes through the same rule before probing.

/// Map a raw user string to a canonical hostname.
///
/// Steps, in order:
/// 1. lowercase the whole string
/// 2. strip a leading `http://` or `https://`
/// 3. strip a leading `www.`
/// 4. drop everything from the first `/`
///
/// The function is total and does not validate the result; malformed input
/// still produces a best-effort hostname.
///
/// # Example
///
/// ```rust
/// use domain_pulse_lib::normalize;
///
/// assert_eq!(normalize("HTTPS://WWW.Example.COM/path?x=1"), "example.com");
/// ```
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();

    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);

    match without_www.find('/') {
        Some(slash) => without_www[..slash].to_string(),
        None => without_www.to_string(),
    }
}

/// Turn raw input lines into the batch that gets probed.
///
/// Blank and whitespace-only lines are dropped; the rest are trimmed and
/// normalized. Order and duplicates are preserved.
pub fn prepare_batch<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .map(normalize)
        .collect()
}
