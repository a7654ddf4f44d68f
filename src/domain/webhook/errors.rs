#[derive(thiserror::Error, Debug)]
pub enum WebhookError {
    #[error("Handler for {event} failed: {source}")]
    HandlerFailed {
        event: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Handler for {event} panicked: {message}")]
    HandlerPanicked { event: String, message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum RawRequestStoreError {
    #[error("Failed to serialize the request record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to write the request record: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
