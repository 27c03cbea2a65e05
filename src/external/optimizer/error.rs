use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::external::retry::Retryable;
use crate::validation::ValidationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizerErrorCode {
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[serde(rename = "HTTP_4XX")]
    Http4xx,
    #[serde(rename = "HTTP_5XX")]
    Http5xx,
    #[serde(rename = "NETWORK")]
    Network,
    #[serde(rename = "DECODE")]
    Decode,
}

impl OptimizerErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Http4xx => "HTTP_4XX",
            Self::Http5xx => "HTTP_5XX",
            Self::Network => "NETWORK",
            Self::Decode => "DECODE",
        }
    }
}

impl fmt::Display for OptimizerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure talking to the optimization engine.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct OptimizerClientError {
    pub code: OptimizerErrorCode,
    pub message: String,
    pub status: Option<u16>,
    pub attempt: Option<u32>,
    pub details: Option<ValidationError>,
}

impl OptimizerClientError {
    pub fn new(code: OptimizerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            attempt: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_details(mut self, details: ValidationError) -> Self {
        self.details = Some(details);
        self
    }

    pub fn from_status(status: u16, attempt: u32) -> Self {
        let code = if status >= 500 {
            OptimizerErrorCode::Http5xx
        } else {
            OptimizerErrorCode::Http4xx
        };

        Self::new(code, format!("optimizer service returned HTTP {}", status))
            .with_status(status)
            .with_attempt(attempt)
    }

    pub fn network(err: reqwest::Error, attempt: u32) -> Self {
        if err.is_timeout() {
            return Self::timed_out(attempt, Duration::ZERO);
        }

        Self::new(
            OptimizerErrorCode::Network,
            format!("optimizer network request failed: {}", err),
        )
        .with_attempt(attempt)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(OptimizerErrorCode::Decode, message)
    }
}

impl Retryable for OptimizerClientError {
    fn is_retryable(&self) -> bool {
        match self.code {
            OptimizerErrorCode::Timeout
            | OptimizerErrorCode::Network
            | OptimizerErrorCode::Http5xx => true,
            OptimizerErrorCode::Http4xx => self.status == Some(429),
            OptimizerErrorCode::Decode => false,
        }
    }

    fn timed_out(attempt: u32, timeout: Duration) -> Self {
        Self::new(
            OptimizerErrorCode::Timeout,
            format!("optimizer request timed out after {}ms", timeout.as_millis()),
        )
        .with_attempt(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let server = OptimizerClientError::from_status(503, 1);
        let client = OptimizerClientError::from_status(400, 1);
        let throttled = OptimizerClientError::from_status(429, 2);

        assert_eq!(server.code, OptimizerErrorCode::Http5xx);
        assert!(server.is_retryable());
        assert_eq!(client.code, OptimizerErrorCode::Http4xx);
        assert!(!client.is_retryable());
        assert!(throttled.is_retryable());
        assert_eq!(throttled.attempt, Some(2));
    }

    #[test]
    fn decode_is_never_retried() {
        assert!(!OptimizerClientError::decode("bad payload").is_retryable());
    }

    #[test]
    fn codes_serialize_in_wire_form() {
        assert_eq!(
            serde_json::to_string(&OptimizerErrorCode::Http5xx).unwrap(),
            r#""HTTP_5XX""#
        );
        assert_eq!(OptimizerErrorCode::Timeout.to_string(), "TIMEOUT");
    }
}
