/// Escaped colon as it arrives in object-created notifications
pub const ESCAPED_COLON: &str = "%3A";

/// Undo the colon escaping S3 applies to keys in event notifications.
/// Table records and both buckets are keyed by the normalized form.
pub fn normalize_key(key: &str) -> String {
    key.replace(ESCAPED_COLON, ":")
}
