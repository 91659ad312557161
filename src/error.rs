use crate::VideoId;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a user-supplied link and a rendered transcript
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("that doesn't look like a video link: {0}")]
    InvalidInput(String),

    #[error("this video has no transcript ({0})")]
    Unavailable(VideoId),

    #[error("network failure, try again later: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("YouTube Data API error: {0}")]
    Api(String),

    #[error("channel not found")]
    ChannelNotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Only transport failures are worth re-running the whole pipeline for
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_and_unavailable_messages_differ() {
        let invalid = Error::InvalidInput("https://example.com".to_string());
        let absent = Error::Unavailable(VideoId::resolve("dQw4w9WgXcQ").unwrap());

        assert!(invalid.to_string().starts_with("that doesn't look like a video link"));
        assert!(absent.to_string().starts_with("this video has no transcript"));
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(!Error::InvalidInput("x".to_string()).is_retryable());
        assert!(!Error::ChannelNotFound.is_retryable());
        assert!(!Error::Api("403".to_string()).is_retryable());
    }
}
