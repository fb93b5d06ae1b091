use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes S3 escapes in an object path: everything except unreserved characters and `/`.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Storage key for an upload: `<ISO-8601 UTC millis>-<original filename>`.
///
/// The prefix makes collisions unlikely but does not rule them out; two uploads
/// of the same name within one millisecond share a key.
pub fn object_key(now: DateTime<Utc>, filename: &str) -> String {
    format!(
        "{}-{}",
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
        filename
    )
}

/// Key used by the standalone uploader: the timestamp goes between the file
/// stem and its extension, e.g. `test-image-2024-05-01T10:20:30.123Z.jpeg`.
pub fn stamped_file_key(now: DateTime<Utc>, filename: &str) -> String {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, stamp, ext),
        _ => format!("{}-{}", filename, stamp),
    }
}

pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}

/// Public link for `key` under `base`.
pub fn source_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), encode_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_object_key_format() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(
            object_key(now, "cat.png"),
            "2024-05-01T10:20:30.123Z-cat.png"
        );
    }

    #[test]
    fn test_object_key_keeps_zero_millis() {
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            object_key(now, "a.jpeg"),
            "2023-12-31T23:59:59.000Z-a.jpeg"
        );
    }

    #[test]
    fn test_stamped_file_key() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        assert_eq!(
            stamped_file_key(now, "test-image.jpeg"),
            "test-image-2024-05-01T10:20:30.000Z.jpeg"
        );
        assert_eq!(
            stamped_file_key(now, "README"),
            "README-2024-05-01T10:20:30.000Z"
        );
        assert_eq!(
            stamped_file_key(now, ".env"),
            ".env-2024-05-01T10:20:30.000Z"
        );
    }

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(
            encode_key("2024-05-01T10:20:30.123Z-my photo.jpg"),
            "2024-05-01T10%3A20%3A30.123Z-my%20photo.jpg"
        );
        assert_eq!(encode_key("a+b&c=d?.png"), "a%2Bb%26c%3Dd%3F.png");
    }

    #[test]
    fn test_encode_keeps_path_and_unreserved() {
        assert_eq!(encode_key("dir/sub/file_name-1.~x"), "dir/sub/file_name-1.~x");
    }

    #[test]
    fn test_encode_non_ascii() {
        assert_eq!(encode_key("café.png"), "caf%C3%A9.png");
    }

    #[test]
    fn test_source_url_joins_once() {
        assert_eq!(
            source_url("http://localhost:4566/uploads/", "x y.png"),
            "http://localhost:4566/uploads/x%20y.png"
        );
        assert_eq!(
            source_url("http://localhost:4566/uploads", "x.png"),
            "http://localhost:4566/uploads/x.png"
        );
    }
}
