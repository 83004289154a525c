use thiserror::Error;

/// Construction-time failures. Per-sample processing is infallible; anything
/// wrong with the collaborators surfaces once, here.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("band-pass filter construction failed: {0}")]
    Filter(#[from] beatdet::FilterError),
}
