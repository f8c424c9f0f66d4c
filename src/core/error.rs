use thiserror::Error;

/// Errors that can occur while preparing or submitting a delivery guide.
///
/// The transport variants mirror the SUNAT GRE response taxonomy: the
/// orchestrator inspects them to decide which local state survives a failed
/// attempt (see [`DespatchError::clears_ticket`] and
/// [`DespatchError::clears_number`]).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DespatchError {
    /// One or more pre-flight checks failed; nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Company is missing SUNAT credentials or other required configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network failure, TLS error, or timeout while talking to SUNAT.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not valid JSON.
    #[error("could not parse the SUNAT response: {0}")]
    Parse(String),

    /// SUNAT returned an error code in the response body.
    #[error("SUNAT returned an error code ({code}): {message}")]
    ResponseCode { code: String, message: String },

    /// Response code 98: the document has not finished processing.
    #[error("the document is still being processed by SUNAT, retry later")]
    Processing,

    /// Error 1033: SUNAT already received a document with this number.
    #[error("SUNAT already has a document with this number: {message}")]
    Duplicate { message: String },

    /// Hard rejection: the CDR will never be issued for this submission.
    #[error("SUNAT rejected the document ({code}): {message}")]
    Rejected { code: String, message: String },

    /// HTTP 401: the bearer token was rejected.
    #[error("the SUNAT access token was rejected")]
    Unauthorized,

    /// The response matched neither the success shape nor a known error.
    #[error("unknown response from SUNAT: {0}")]
    UnknownResponse(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP packaging or extraction error.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// The signing collaborator failed.
    #[error("signing error: {0}")]
    Signer(String),

    /// The record store failed.
    #[error("store error: {0}")]
    Store(String),
}

impl DespatchError {
    /// Whether the ticket must be discarded after this failure.
    ///
    /// Only a duplicate-number response or a hard rejection invalidates the
    /// ticket; every other failure keeps it so a retry resumes at the poll
    /// step instead of re-sending.
    pub fn clears_ticket(&self) -> bool {
        matches!(self, Self::Duplicate { .. } | Self::Rejected { .. })
    }

    /// Whether the allocated document number must be discarded.
    ///
    /// True only for the duplicate-number response: the number is burned on
    /// the SUNAT side and the next attempt must allocate a fresh one.
    pub fn clears_number(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the offending field (e.g. "receiver.address.district").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
