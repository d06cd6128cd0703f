use paperchat_types::{LoginRequest, Session, SignupRequest, UpdateImageRequest, UploadedImage};

use crate::error::Result;
use crate::http::ApiClient;

impl ApiClient {
    /// Resolve the viewer. The backend returns the session object bare.
    pub async fn fetch_session(&self) -> Result<Session> {
        self.get_json("/api/user/session").await
    }

    /// Silent credential renewal; the cookie jar absorbs the new credential.
    pub async fn refresh_token(&self) -> Result<()> {
        self.get_empty("/api/user/refresh-token").await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<()> {
        self.post_empty("/api/user/login", req).await
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<()> {
        self.post_empty("/api/user/signup", req).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.post_no_body("/api/user/logout").await
    }

    pub async fn update_image(&self, url: &str) -> Result<()> {
        self.put_empty(
            "/api/user/update-image",
            &UpdateImageRequest {
                image: url.to_string(),
            },
        )
        .await
    }

    /// Multipart profile-image upload; returns the stored URL to hand to
    /// `update_image`.
    pub async fn upload_logo(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadedImage> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);
        self.post_multipart("/api/storage/upload-logo", form).await
    }
}
