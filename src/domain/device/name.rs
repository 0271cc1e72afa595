//! Device name normalization

/// Fallback used when a hostname is empty or too long
pub const UNKNOWN_DEVICE: &str = "Unknown_Device";

/// Longest name accepted before falling back to [`UNKNOWN_DEVICE`]
pub const MAX_DEVICE_NAME_LEN: usize = 50;

/// Replace anything outside `[A-Za-z0-9_.-]` with `_`.
///
/// Empty names and names longer than [`MAX_DEVICE_NAME_LEN`] become
/// [`UNKNOWN_DEVICE`].
pub fn sanitize_device_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().count() > MAX_DEVICE_NAME_LEN {
        UNKNOWN_DEVICE.to_string()
    } else {
        cleaned
    }
}
