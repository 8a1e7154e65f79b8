//! Authenticated request path
//!
//! Protected requests carry the stored access token. A 401 answer triggers a
//! token refresh and one replay of the request. Requests failing while a
//! refresh is already running wait for that refresh instead of starting
//! their own, so a burst of expired requests produces a single refresh call.

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, ensure_success};
use crate::types::{RefreshRequest, RefreshResponse};
use reqwest::StatusCode;
use std::borrow::Cow;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

const REFRESH_PATH: &str = "/accounts/token/refresh/";

/// New access token, or the error every waiter of a failed refresh shares
type RefreshOutcome = Result<String, Arc<ClientError>>;

/// Refresh coordination: the in-progress flag and the queue of waiters
#[derive(Default)]
pub(super) struct SingleFlight {
    state: Mutex<FlightState>,
}

#[derive(Default)]
struct FlightState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Role of a caller that needs a fresh access token
pub(super) enum Flight<'a> {
    /// No refresh was running; the caller performs it and must settle the guard
    Leader(FlightGuard<'a>),
    /// A refresh is running; the receiver yields its outcome
    Follower(oneshot::Receiver<RefreshOutcome>),
}

impl SingleFlight {
    /// Check and set the in-progress flag in one step
    pub(super) fn join(&self) -> Flight<'_> {
        let mut state = self.lock();
        if state.in_flight {
            let (sender, receiver) = oneshot::channel();
            state.waiters.push(sender);
            Flight::Follower(receiver)
        } else {
            state.in_flight = true;
            Flight::Leader(FlightGuard {
                flight: self,
                settled: false,
            })
        }
    }

    pub(super) fn in_flight(&self) -> bool {
        self.lock().in_flight
    }

    /// Clear the flag and take the queue, so it can be drained only once
    fn finish(&self) -> Vec<oneshot::Sender<RefreshOutcome>> {
        let mut state = self.lock();
        state.in_flight = false;
        mem::take(&mut state.waiters)
    }

    fn lock(&self) -> MutexGuard<'_, FlightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the leader for the duration of the refresh call
///
/// Dropping it unsettled (the leading future was cancelled) clears the flag
/// and releases the waiters with a closed channel.
pub(super) struct FlightGuard<'a> {
    flight: &'a SingleFlight,
    settled: bool,
}

impl FlightGuard<'_> {
    /// Hand the outcome to every waiter in enqueue order; returns how many
    pub(super) fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        let waiters = self.flight.finish();
        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose request was dropped no longer listens
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let abandoned = self.flight.finish();
            warn!(
                waiters = abandoned.len(),
                "Token refresh abandoned before completing"
            );
        }
    }
}

impl ApiClient {
    /// Send a protected request
    ///
    /// The stored access token is attached when present. A 401 answer is
    /// recovered once through a token refresh; any other failure, and a 401
    /// on the replayed request, is returned unchanged.
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        self.send_rebuilt(|| Ok(Cow::Borrowed(request))).await
    }

    /// Send a protected request whose description is taken from `build` on
    /// every attempt, so the replay sees credentials stored by the refresh
    pub(crate) async fn send_rebuilt<'a, F>(&self, build: F) -> Result<reqwest::Response, ClientError>
    where
        F: Fn() -> Result<Cow<'a, ApiRequest>, ClientError>,
    {
        let request = build()?;
        let access = self.inner.tokens.access();
        let response = self.dispatch(&request, access.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response).await;
        }

        // From here on the request counts as retried: the replay below is final
        let rejected = ClientError::from_response(response).await;
        let token = self.renew_access(rejected).await?;

        let request = build()?;
        debug!(path = request.path(), "Replaying request with refreshed token");
        let replay = self.dispatch(&request, Some(&token)).await?;
        ensure_success(replay).await
    }

    /// Obtain a new access token from the stored refresh token
    ///
    /// Shares an in-flight refresh when there is one. Failure ends the
    /// session exactly like a failed automatic refresh.
    pub async fn refresh_access_token(&self) -> Result<String, ClientError> {
        self.renew_access(ClientError::AuthenticationFailed(
            "no refresh token stored".into(),
        ))
        .await
    }

    /// Whether a token refresh call is currently outstanding
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.in_flight()
    }

    async fn renew_access(&self, rejected: ClientError) -> Result<String, ClientError> {
        let Some(refresh) = self.inner.tokens.refresh() else {
            warn!("Access rejected and no refresh token stored, ending session");
            self.end_session();
            return Err(rejected);
        };

        let guard = match self.inner.refresh.join() {
            Flight::Leader(guard) => guard,
            Flight::Follower(waiter) => {
                debug!("Token refresh already in flight, waiting for it");
                return match waiter.await {
                    Ok(Ok(token)) => Ok(token),
                    Ok(Err(error)) => Err(ClientError::RefreshFailed(error)),
                    Err(_) => Err(ClientError::RefreshAbandoned),
                };
            }
        };

        match self.request_refresh(&refresh).await {
            Ok(tokens) => {
                self.inner.tokens.set_access(Some(&tokens.access));
                if let Some(rotated) = tokens.refresh.as_deref() {
                    self.inner.tokens.set_refresh(Some(rotated));
                }
                self.inner.session.revive();
                let released = guard.settle(&Ok(tokens.access.clone()));
                info!(released, "Access token refreshed");
                Ok(tokens.access)
            }
            Err(error) => {
                let error = Arc::new(error);
                let released = guard.settle(&Err(Arc::clone(&error)));
                warn!(released, "Token refresh failed: {error}");
                self.end_session();
                Err(ClientError::RefreshFailed(error))
            }
        }
    }

    /// The refresh call bypasses the gateway: no bearer header, no 401 recovery
    async fn request_refresh(&self, refresh: &str) -> Result<RefreshResponse, ClientError> {
        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest {
            refresh: refresh.to_string(),
        })?;
        let response = self.send_public(&request).await?;
        let tokens: RefreshResponse = response.json().await?;

        if tokens.access.is_empty() {
            return Err(ClientError::AuthenticationFailed(
                "refresh response carried no access token".into(),
            ));
        }
        Ok(tokens)
    }

    /// Store freshly issued credentials and re-arm the session signal
    pub(crate) fn start_session(&self, access: &str, refresh: &str) {
        self.inner.tokens.set_tokens(Some(access), Some(refresh));
        self.inner.session.revive();
    }

    /// Drop the stored credentials and tell the application shell
    pub(crate) fn end_session(&self) {
        self.inner.tokens.clear();
        if self.inner.session.expire() {
            warn!("Session expired, sign-in required");
        }
    }
}
