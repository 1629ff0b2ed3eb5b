use std::sync::Arc;

use tracing::{info, warn};

use padelup_core::errors::{BookingError, BookingResult};
use padelup_core::models::{
    account::{LoginForm, RegistrationForm, Session, UserProfile},
    booking::{BookingConfirmation, BookingRequest},
};

use crate::gateway::PadelApi;
use crate::session::SessionStore;

/// The booking service seen through the current user's session.
///
/// Forms are validated before anything is sent, and a successful login is
/// remembered in the injected [`SessionStore`].
pub struct SessionClient<S: SessionStore> {
    api: Arc<dyn PadelApi>,
    store: S,
}

impl<S: SessionStore> SessionClient<S> {
    pub fn new(api: Arc<dyn PadelApi>, store: S) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current(&self) -> Option<Session> {
        self.store.get()
    }

    /// The stored session, or an authentication error when nobody is logged in.
    pub fn session(&self) -> BookingResult<Session> {
        self.store
            .get()
            .ok_or_else(|| BookingError::Authentication("Log in to continue".to_string()))
    }

    pub async fn register(&self, form: RegistrationForm) -> BookingResult<()> {
        let request = form.validate()?;
        self.api.register(&request).await?;

        info!(username = %request.username, "Account registered");
        Ok(())
    }

    pub async fn login(&self, form: LoginForm) -> BookingResult<Session> {
        let request = form.validate()?;
        let session = self.api.login(&request).await?;
        self.store.set(session.clone())?;

        info!(username = %session.user.username, "Session started");
        Ok(session)
    }

    pub fn logout(&self) -> BookingResult<()> {
        self.store.clear()?;
        Ok(())
    }

    pub async fn profile(&self) -> BookingResult<UserProfile> {
        let session = self.session()?;
        self.api.profile(&session.token).await
    }

    /// Submits a confirmed selection with the stored session.
    pub async fn submit(&self, request: &BookingRequest) -> BookingResult<BookingConfirmation> {
        let session = self.session()?;
        self.submit_as(&session, request).await
    }

    /// Submits a confirmed selection on behalf of `session`. When the service
    /// rejects a token that is also the stored one, the stored session is
    /// cleared so the next call asks for a login.
    pub async fn submit_as(
        &self,
        session: &Session,
        request: &BookingRequest,
    ) -> BookingResult<BookingConfirmation> {
        match self.api.submit_booking(session, request).await {
            Err(BookingError::Authentication(message)) => {
                let stored = self.store.get().is_some_and(|s| s.token == session.token);
                if stored {
                    if let Err(e) = self.store.clear() {
                        warn!(error = %e, "Failed to clear expired session");
                    }
                }
                Err(BookingError::Authentication(message))
            }
            result => result,
        }
    }
}
