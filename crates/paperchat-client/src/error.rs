use thiserror::Error;

/// Every failure the client surface can produce, normalized to something a
/// screen can show as a notice.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("No response from server")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Malformed server response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    /// One line for a dismissible notice.
    pub fn notice(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_notice_is_the_backend_message() {
        let err = ClientError::Server {
            status: 403,
            message: "Plan mutations require admin".to_string(),
        };
        assert_eq!(err.notice(), "Plan mutations require admin");
    }

    #[test]
    fn network_notice_hides_transport_detail() {
        let err = ClientError::Network("tcp connect refused".to_string());
        assert_eq!(err.notice(), "No response from server");
        assert!(err.is_network());
    }
}
