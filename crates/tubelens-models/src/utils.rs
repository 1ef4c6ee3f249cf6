//! Playlist identifier parsing.
//!
//! Callers may submit either a bare playlist ID or any YouTube URL that
//! carries a `list=` query parameter.

use thiserror::Error;
use url::Url;

/// Errors that can occur during playlist ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaylistIdError {
    /// Input was empty after trimming
    #[error("Playlist ID is empty")]
    Empty,
    /// URL is not a YouTube URL
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,
    /// URL has no `list` parameter
    #[error("Playlist ID not found in URL")]
    PlaylistIdNotFound,
    /// ID contains characters YouTube never assigns
    #[error("Playlist ID has invalid format")]
    InvalidPlaylistId,
}

/// Result type for playlist ID extraction.
pub type PlaylistIdResult<T> = Result<T, PlaylistIdError>;

/// Extract a playlist ID from a bare ID or a playlist URL.
///
/// Supports:
/// - PLxxxxxxxxxxxxxxxx (bare ID)
/// - https://www.youtube.com/playlist?list=PL...
/// - https://youtube.com/watch?v=VIDEO&list=PL...
/// - https://youtu.be/VIDEO?list=PL...
pub fn extract_playlist_id(input: &str) -> PlaylistIdResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PlaylistIdError::Empty);
    }

    if !input.contains("://") {
        return validate_playlist_id(input);
    }

    let url = Url::parse(input).map_err(|_| PlaylistIdError::InvalidYoutubeUrl)?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if !(host.ends_with("youtube.com") || host == "youtu.be") {
        return Err(PlaylistIdError::InvalidYoutubeUrl);
    }

    let list = url
        .query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned())
        .ok_or(PlaylistIdError::PlaylistIdNotFound)?;

    validate_playlist_id(&list)
}

/// Playlist IDs use the URL-safe base64 alphabet.
fn validate_playlist_id(id: &str) -> PlaylistIdResult<String> {
    let valid = id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid && !id.is_empty() {
        Ok(id.to_string())
    } else {
        Err(PlaylistIdError::InvalidPlaylistId)
    }
}
