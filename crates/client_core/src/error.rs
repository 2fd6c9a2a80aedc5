use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("API url '{base_url}' cannot take a path")]
    Endpoint { base_url: String },
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        api_error: Option<ApiError>,
    },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Endpoint { .. } => None,
        }
    }
}

/// HTTP status carried by an error chain, if the failure came from a response.
pub fn http_status(err: &anyhow::Error) -> Option<u16> {
    err.chain().find_map(|cause| {
        if let Some(transport) = cause.downcast_ref::<TransportError>() {
            return transport.status();
        }
        cause
            .downcast_ref::<reqwest::Error>()
            .and_then(reqwest::Error::status)
            .map(|status| status.as_u16())
    })
}
