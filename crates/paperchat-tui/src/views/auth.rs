use paperchat_client::ApiClient;
use paperchat_types::{LoginRequest, SignupRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: Option<LoginField>,
    pub show_password: bool,
    pub submitting: bool,
    pub notice: Option<String>,
}

impl LoginForm {
    pub fn focus(&self) -> LoginField {
        self.focus.unwrap_or(LoginField::Email)
    }

    pub fn input(&mut self, c: char) {
        match self.focus() {
            LoginField::Email => self.email.push(c),
            LoginField::Password => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus() {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }

    pub fn next_field(&mut self) {
        self.focus = Some(match self.focus() {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        });
    }

    pub fn toggle_password(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Returns true when the backend accepted the credentials. Failures show
    /// one deliberately generic message, whatever the backend said.
    pub async fn submit(&mut self, client: &ApiClient) -> bool {
        if self.submitting {
            return false;
        }
        self.notice = None;
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.notice = Some("Email and password are required".to_string());
            return false;
        }
        self.submitting = true;
        let result = client
            .login(&LoginRequest {
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            })
            .await;
        self.submitting = false;
        match result {
            Ok(()) => {
                tracing::info!("login accepted");
                self.password.clear();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "login rejected");
                self.notice = Some("Invalid email or password".to_string());
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Fullname,
    Email,
    Mobile,
    Password,
}

#[derive(Default)]
pub struct SignupForm {
    pub fullname: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub focus: Option<SignupField>,
    pub show_password: bool,
    pub submitting: bool,
    pub notice: Option<String>,
}

impl SignupForm {
    pub fn focus(&self) -> SignupField {
        self.focus.unwrap_or(SignupField::Fullname)
    }

    pub fn input(&mut self, c: char) {
        match self.focus() {
            SignupField::Fullname => self.fullname.push(c),
            SignupField::Email => self.email.push(c),
            SignupField::Mobile => self.mobile.push(c),
            SignupField::Password => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        let field = match self.focus() {
            SignupField::Fullname => &mut self.fullname,
            SignupField::Email => &mut self.email,
            SignupField::Mobile => &mut self.mobile,
            SignupField::Password => &mut self.password,
        };
        field.pop();
    }

    pub fn next_field(&mut self) {
        self.focus = Some(match self.focus() {
            SignupField::Fullname => SignupField::Email,
            SignupField::Email => SignupField::Mobile,
            SignupField::Mobile => SignupField::Password,
            SignupField::Password => SignupField::Fullname,
        });
    }

    pub fn prev_field(&mut self) {
        self.focus = Some(match self.focus() {
            SignupField::Fullname => SignupField::Password,
            SignupField::Email => SignupField::Fullname,
            SignupField::Mobile => SignupField::Email,
            SignupField::Password => SignupField::Mobile,
        });
    }

    pub fn toggle_password(&mut self) {
        self.show_password = !self.show_password;
    }

    fn validate(&self) -> Option<String> {
        if self.fullname.trim().is_empty()
            || self.email.trim().is_empty()
            || self.mobile.trim().is_empty()
            || self.password.is_empty()
        {
            return Some("All fields are required".to_string());
        }
        if !self.email.contains('@') {
            return Some("Enter a valid email address".to_string());
        }
        None
    }

    /// Returns true when the account was created; the caller routes back to
    /// the login screen.
    pub async fn submit(&mut self, client: &ApiClient) -> bool {
        if self.submitting {
            return false;
        }
        self.notice = None;
        if let Some(problem) = self.validate() {
            self.notice = Some(problem);
            return false;
        }
        self.submitting = true;
        let result = client
            .signup(&SignupRequest {
                fullname: self.fullname.trim().to_string(),
                email: self.email.trim().to_string(),
                mobile: self.mobile.trim().to_string(),
                password: self.password.clone(),
            })
            .await;
        self.submitting = false;
        match result {
            Ok(()) => {
                self.password.clear();
                true
            }
            Err(err) => {
                self.notice = Some(err.notice());
                false
            }
        }
    }
}
