//! Pure predicates for timestamp syntax and file-extension classification.
//!
//! These functions never touch the filesystem: extensions are matched by
//! name only, and timestamps are checked for syntax, not value ranges
//! (`99:99:99` is syntactically accepted).

use std::path::Path;

/// Recognized video file extensions (lowercase, without the dot).
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "flv", "wmv", "m4v"];

/// Recognized image file extensions (lowercase, without the dot).
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Validate timestamp format: `HH:MM:SS`, `MM:SS`, `SS`, or with decimals.
///
/// Accepted forms: `30`, `30.5`, `01:30`, `1:02:30`, `01:02:30.250`.
pub fn is_valid_timestamp(time: &str) -> bool {
    let parts: Vec<&str> = time.split(':').collect();
    match parts.as_slice() {
        // Seconds only, with optional decimals: "30" or "30.5"
        [secs] => match secs.split_once('.') {
            None => is_digits(secs),
            Some((whole, frac)) => is_digits(whole) && is_digits(frac),
        },
        // MM:SS
        [minutes, seconds] => is_digits_short(minutes) && is_digits_len(seconds, 2),
        // HH:MM:SS with optional fractional seconds
        [hours, minutes, seconds] => {
            let seconds_ok = match seconds.split_once('.') {
                None => is_digits_len(seconds, 2),
                Some((whole, frac)) => is_digits_len(whole, 2) && is_digits(frac),
            };
            is_digits_short(hours) && is_digits_len(minutes, 2) && seconds_ok
        }
        _ => false,
    }
}

/// Check if a file path has a recognized video extension.
pub fn is_video_file(path: impl AsRef<Path>) -> bool {
    has_extension(path.as_ref(), VIDEO_EXTENSIONS)
}

/// Check if a file path has a recognized image extension.
pub fn is_image_file(path: impl AsRef<Path>) -> bool {
    has_extension(path.as_ref(), IMAGE_EXTENSIONS)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| allowed.contains(&e.as_str()))
}

/// Non-empty, ASCII digits only.
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// One or two ASCII digits.
fn is_digits_short(s: &str) -> bool {
    (1..=2).contains(&s.len()) && is_digits(s)
}

/// Exactly `len` ASCII digits.
fn is_digits_len(s: &str, len: usize) -> bool {
    s.len() == len && is_digits(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_seconds() {
        assert!(is_valid_timestamp("30"));
        assert!(is_valid_timestamp("0"));
        assert!(is_valid_timestamp("12345"));
    }

    #[test]
    fn test_timestamp_decimal_seconds() {
        assert!(is_valid_timestamp("30.5"));
        assert!(is_valid_timestamp("0.001"));
        assert!(!is_valid_timestamp("30."));
        assert!(!is_valid_timestamp(".5"));
    }

    #[test]
    fn test_timestamp_minutes_seconds() {
        assert!(is_valid_timestamp("1:30"));
        assert!(is_valid_timestamp("01:30"));
        assert!(!is_valid_timestamp("1:3"));
        assert!(!is_valid_timestamp("123:30"));
        // No decimals in the MM:SS form
        assert!(!is_valid_timestamp("1:30.5"));
    }

    #[test]
    fn test_timestamp_hours_minutes_seconds() {
        assert!(is_valid_timestamp("1:02:30"));
        assert!(is_valid_timestamp("01:02:30"));
        assert!(is_valid_timestamp("01:02:30.250"));
        // Syntax only; value ranges are not checked
        assert!(is_valid_timestamp("99:99:99"));
        assert!(!is_valid_timestamp("01:2:30"));
        assert!(!is_valid_timestamp("01:02:3"));
        assert!(!is_valid_timestamp("01:02:30."));
    }

    #[test]
    fn test_timestamp_rejects_malformed() {
        assert!(!is_valid_timestamp(""));
        assert!(!is_valid_timestamp("abc"));
        assert!(!is_valid_timestamp("1:2:3:4"));
        assert!(!is_valid_timestamp("-30"));
        assert!(!is_valid_timestamp("30s"));
        assert!(!is_valid_timestamp("1: 30"));
    }

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file("clip.mp4"));
        assert!(is_video_file("/videos/clip.mkv"));
        assert!(is_video_file("clip.webm"));
        assert!(is_video_file("clip.m4v"));
        // Case-insensitive
        assert!(is_video_file("X.MP4"));
        assert!(is_video_file("clip.MoV"));
        assert!(!is_video_file("clip.gif"));
        assert!(!is_video_file("clip.jpg"));
        assert!(!is_video_file("clip"));
        assert!(!is_video_file("mp4"));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("frame.jpg"));
        assert!(is_image_file("frame.jpeg"));
        assert!(is_image_file("frame.PNG"));
        assert!(is_image_file("frame.webp"));
        assert!(is_image_file("frame.bmp"));
        assert!(!is_image_file("frame.gif"));
        assert!(!is_image_file("frame.mp4"));
        assert!(!is_image_file("frame"));
    }
}
