use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request was intentionally not sent because the pass is a dry run.
    ///
    /// Not a failure. Callers that receive it must stop looking for a
    /// response body and carry on as if the call succeeded.
    #[error("dry-run")]
    DryRun,

    #[error("failed to parse query parameters: {0}")]
    InvalidQuery(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("HTTP transport error: {0}")]
    Http(String),
}

impl TransportError {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Walk the full error chain and join all causes into one string.
///
/// HTTP client errors often have terse `Display` impls (e.g. "error sending
/// request") but useful detail in the source chain.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
