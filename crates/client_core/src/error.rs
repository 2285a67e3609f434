use thiserror::Error;

/// The provider could not produce a user list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new("user fetch cancelled")
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let detail = describe_chain(&err);
        let message = if err.is_timeout() {
            format!("user service request timed out: {detail}")
        } else if err.is_decode() {
            format!("malformed user list: {detail}")
        } else if let Some(status) = err.status() {
            format!("user service responded with {status}")
        } else {
            format!("user service transport failure: {detail}")
        };
        Self::new(message)
    }
}

fn describe_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
