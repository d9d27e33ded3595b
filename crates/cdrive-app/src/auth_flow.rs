//! Login and registration flows.
//!
//! Flows validate form input locally, call the gateway, and report where the
//! caller should go next. They never retry on their own: after a failure the
//! flow stays where it was and waits for the user to resubmit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cdrive_api_client::Gateway;
use cdrive_core::models::VerifyRequest;
use cdrive_core::{ClientError, Credentials, SessionStore, ValidationError};
use validator::Validate;

pub const LOGIN_SUCCESS: &str = "Login successful! Redirecting...";
pub const REGISTER_SUCCESS: &str = "Registration successful! Please check your email for the OTP.";
pub const VERIFY_SUCCESS: &str = "Email verified successfully! You can now log in.";

/// Where the presentation layer should take the user after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Dashboard,
    Login,
    Stay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOutcome {
    pub message: &'static str,
    pub navigate_to: Navigation,
}

struct SubmittingGuard<'a>(&'a AtomicBool);

impl<'a> SubmittingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct LoginFlow<G: ?Sized> {
    gateway: Arc<G>,
    session: Arc<dyn SessionStore>,
    submitting: AtomicBool,
}

impl<G: Gateway + ?Sized> LoginFlow<G> {
    pub fn new(gateway: Arc<G>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            gateway,
            session,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Authenticate and store the token. The token is in the session store
    /// by the time this returns, so the caller can navigate straight to a
    /// protected view. On failure the session is left untouched.
    pub async fn submit(&self, email: &str, password: &str) -> Result<FlowOutcome, ClientError> {
        let credentials = Credentials::new(email.trim(), password);
        credentials.validate()?;

        let _submitting = SubmittingGuard::enter(&self.submitting);
        let response = self.gateway.login(&credentials).await.map_err(|e| {
            tracing::warn!(error_type = e.error_type(), error = %e, "Login failed");
            e
        })?;

        self.session.set_token(&response.token);
        tracing::info!(email = %credentials.email, "Logged in");

        Ok(FlowOutcome {
            message: LOGIN_SUCCESS,
            navigate_to: Navigation::Dashboard,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterStage {
    CollectingCredentials,
    CollectingPasscode,
    Verified,
}

pub struct RegisterFlow<G: ?Sized> {
    gateway: Arc<G>,
    stage: RegisterStage,
    email: Option<String>,
}

impl<G: Gateway + ?Sized> RegisterFlow<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            stage: RegisterStage::CollectingCredentials,
            email: None,
        }
    }

    /// Resume at the passcode step for an account registered earlier.
    pub fn awaiting_passcode(gateway: Arc<G>, email: impl Into<String>) -> Self {
        Self {
            gateway,
            stage: RegisterStage::CollectingPasscode,
            email: Some(email.into()),
        }
    }

    pub fn stage(&self) -> RegisterStage {
        self.stage
    }

    /// Email the passcode is being collected for.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub async fn submit_credentials(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<FlowOutcome, ClientError> {
        self.expect_stage(RegisterStage::CollectingCredentials)?;

        let credentials = Credentials::new(email.trim(), password);
        credentials.validate()?;

        self.gateway.register(&credentials).await.map_err(|e| {
            tracing::warn!(error_type = e.error_type(), error = %e, "Registration failed");
            e
        })?;

        tracing::info!(email = %credentials.email, "Registered, awaiting passcode");
        self.email = Some(credentials.email);
        self.stage = RegisterStage::CollectingPasscode;

        Ok(FlowOutcome {
            message: REGISTER_SUCCESS,
            navigate_to: Navigation::Stay,
        })
    }

    /// A rejected code keeps the flow at the passcode step.
    pub async fn submit_passcode(&mut self, code: &str) -> Result<FlowOutcome, ClientError> {
        self.expect_stage(RegisterStage::CollectingPasscode)?;

        let request = VerifyRequest {
            email: self.email.clone().unwrap_or_default(),
            otp_code: code.trim().to_string(),
        };
        request.validate()?;

        self.gateway
            .verify_passcode(&request.email, &request.otp_code)
            .await
            .map_err(|e| {
                tracing::warn!(error_type = e.error_type(), error = %e, "Verification failed");
                e
            })?;

        tracing::info!(email = %request.email, "Email verified");
        self.stage = RegisterStage::Verified;

        Ok(FlowOutcome {
            message: VERIFY_SUCCESS,
            navigate_to: Navigation::Login,
        })
    }

    fn expect_stage(&self, expected: RegisterStage) -> Result<(), ClientError> {
        if self.stage == expected {
            return Ok(());
        }
        let message = match self.stage {
            RegisterStage::CollectingCredentials => "Register before entering a passcode",
            RegisterStage::CollectingPasscode => "Enter the passcode sent to your email",
            RegisterStage::Verified => "Email already verified. Please log in",
        };
        Err(ValidationError::InvalidInput(message.to_string()).into())
    }
}
