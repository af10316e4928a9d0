use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server rejected request with status {status}")]
    Rejected {
        status: u16,
        body: Option<serde_json::Value>,
    },
    #[error("server response carried no JSON body")]
    MissingBody,
    #[error("failed to decode server response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            GatewayError::Rejected { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}
