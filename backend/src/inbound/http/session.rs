//! Session token handling for HTTP handlers.
//!
//! The session cookie is the token service: signing in writes the account id
//! into the encrypted cookie, and every ledger handler reads it back. Handlers
//! only see [`AccountId`]s, never raw cookie contents.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AccountId, Error};

pub(crate) const ACCOUNT_ID_KEY: &str = "account_id";

/// Wrapper exposing account-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Issue a token for `account_id` by storing it in the session cookie.
    ///
    /// The session id is renewed to prevent fixation.
    pub fn issue(&self, account_id: &AccountId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ACCOUNT_ID_KEY, account_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the session entirely.
    pub fn revoke(&self) {
        self.0.purge();
    }

    /// Account id stored in the session, if any and well formed.
    pub fn account_id(&self) -> Result<Option<AccountId>, Error> {
        let raw = self
            .0
            .get::<String>(ACCOUNT_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match AccountId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!("invalid account id in session cookie: {error}");
                None
            }
        }))
    }

    /// Verify the token, failing with `401 Unauthorized` when absent.
    pub fn require_account_id(&self) -> Result<AccountId, Error> {
        self.account_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
