//! Chunk file naming.
//!
//! A chunk staging file is named `<filename>-<index>`, where `index` is the
//! chunk's 0-based position within the target file. The index after the last
//! `-` is what the merger parses back out to place the chunk at its absolute
//! offset.

use crate::error::AppError;
use crate::result::AppResult;

/// Delimiter separating the name component from the numeric chunk index.
pub const CHUNK_DELIMITER: char = '-';

/// Build the staging file name for chunk `index` of `filename`.
pub fn chunk_file_name(filename: &str, index: u64) -> String {
    format!("{filename}{CHUNK_DELIMITER}{index}")
}

/// Parse the chunk index back out of a staging file name.
///
/// The index is everything after the last delimiter, so the name component
/// itself may contain dashes.
pub fn parse_chunk_index(chunk_file_name: &str) -> AppResult<u64> {
    chunk_file_name
        .rsplit(CHUNK_DELIMITER)
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| {
            AppError::validation(format!(
                "Chunk file name '{chunk_file_name}' carries no numeric index"
            ))
        })
}

/// Reject names that could escape the storage directories.
///
/// Both `filename` and `chunkFileName` arrive as request parameters and are
/// joined onto storage roots, so they must be single path components.
pub fn validate_path_component(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(AppError::validation(format!(
            "Name '{name}' is not a valid path component"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_index() {
        let name = chunk_file_name("abc123.mp4", 7);
        assert_eq!(name, "abc123.mp4-7");
        assert_eq!(parse_chunk_index(&name).unwrap(), 7);
    }

    #[test]
    fn test_index_after_last_delimiter() {
        // Name component containing dashes still parses.
        assert_eq!(parse_chunk_index("my-file.bin-12").unwrap(), 12);
    }

    #[test]
    fn test_non_numeric_index_rejected() {
        assert!(parse_chunk_index("nofile.bin-abc").is_err());
        assert!(parse_chunk_index("plainname").is_err());
    }

    #[test]
    fn test_path_component_validation() {
        assert!(validate_path_component("abc.mp4").is_ok());
        assert!(validate_path_component("").is_err());
        assert!(validate_path_component("..").is_err());
        assert!(validate_path_component("a/b").is_err());
        assert!(validate_path_component("a\\b").is_err());
    }
}
