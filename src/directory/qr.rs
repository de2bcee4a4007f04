/// QR image collaborator
///
/// Builds the image reference stored as `qr_image_url`, keyed by the
/// final public URL for a username. The image itself is produced by an
/// external service; we only construct the reference once at creation.
const QR_SERVICE_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
const QR_SIZE: &str = "300x300";

#[derive(Debug, Clone)]
pub struct QrImageGenerator {
    public_base_url: String,
}

impl QrImageGenerator {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The public card page URL for a username
    pub fn public_profile_url(&self, username: &str) -> String {
        format!("{}/{}", self.public_base_url, username)
    }

    /// The QR image URL encoding the public card page URL
    pub fn image_url(&self, username: &str) -> String {
        format!(
            "{}?size={}&data={}",
            QR_SERVICE_ENDPOINT,
            QR_SIZE,
            urlencoding::encode(&self.public_profile_url(username))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_without_double_slash() {
        let qr = QrImageGenerator::new("https://cards.test/");
        assert_eq!(
            qr.public_profile_url("john-doe"),
            "https://cards.test/john-doe"
        );
    }

    #[test]
    fn test_image_url_encodes_target() {
        let qr = QrImageGenerator::new("https://cards.test");
        let url = qr.image_url("john-doe");
        assert!(url.starts_with(QR_SERVICE_ENDPOINT));
        assert!(url.contains("size=300x300"));
        assert!(url.contains("data=https%3A%2F%2Fcards.test%2Fjohn-doe"));
    }
}
