//! Session lifecycle management
//!
//! Owns the current authentication identity: the bearer token, the user
//! it belongs to, and the loading flag covering the initial identity
//! check. A persisted token is never trusted on its own - only a
//! successful identity check promotes it to an authenticated session,
//! and any failure (expired token, unreachable backend, garbage
//! response) fails closed to logged out.
//!
//! Every identity transition wipes the query cache wholesale; see
//! `core::cache` for why the wipe is coarse.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::client::AuthApi;
use crate::api::errors::ApiError;
use crate::api::types::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, User};
use crate::core::cache::QueryCache;
use crate::core::token_store::TokenStore;
use crate::error::{AppError, Result};

// ============================================================================
// Session Snapshot
// ============================================================================

/// Read-only snapshot of the current session
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    /// True from startup until the first identity check settles
    pub is_loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Shared mutable session state behind the manager
#[derive(Debug)]
struct SessionState {
    user: Option<User>,
    token: Option<String>,
    is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        // Loading until the first hydration attempt completes
        Self {
            user: None,
            token: None,
            is_loading: true,
        }
    }
}

impl SessionState {
    fn snapshot(&self) -> Session {
        Session {
            user: self.user.clone(),
            token: self.token.clone(),
            is_loading: self.is_loading,
        }
    }
}

// ============================================================================
// Session Handle
// ============================================================================

/// Cheap cloneable read handle onto the session state
///
/// The query layer holds one of these instead of the whole manager, so
/// services stay independent of the manager's collaborator generics.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    state: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.snapshot()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }
}

// ============================================================================
// Session Manager
// ============================================================================

/// Owner of the session lifecycle
///
/// Explicitly constructed and passed to dependents - there is no
/// module-level singleton. Methods take `&self`; wrap the manager in an
/// `Arc` to share it across tasks.
pub struct SessionManager<A: AuthApi, S: TokenStore> {
    api: A,
    store: S,
    cache: Arc<QueryCache>,
    state: Arc<RwLock<SessionState>>,
    /// Bumped at the start of every hydration and on every identity
    /// transition. An identity check completing under an old generation
    /// has been superseded and must not touch state.
    generation: AtomicU64,
}

impl<A: AuthApi, S: TokenStore> SessionManager<A, S> {
    pub fn new(api: A, store: S, cache: Arc<QueryCache>) -> Self {
        Self {
            api,
            store,
            cache,
            state: Arc::new(RwLock::new(SessionState::default())),
            generation: AtomicU64::new(0),
        }
    }

    /// Read handle for the query layer
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Shared cache handle
    pub fn cache(&self) -> Arc<QueryCache> {
        Arc::clone(&self.cache)
    }

    pub async fn snapshot(&self) -> Session {
        self.state.read().await.snapshot()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    /// Validate the persisted token against the backend
    ///
    /// No persisted token: settles immediately as unauthenticated with
    /// zero network calls. Otherwise the token is checked against
    /// /api/auth/me; on success the session becomes authenticated, on
    /// any failure the token is cleared everywhere and the session
    /// settles as unauthenticated. The failure itself is not an error
    /// from the caller's point of view - only storage IO can fail here.
    pub async fn hydrate(&self) -> Result<Session> {
        let Some(token) = self.store.load()? else {
            let mut state = self.state.write().await;
            state.user = None;
            state.token = None;
            state.is_loading = false;
            debug!("No persisted token, session starts unauthenticated");
            return Ok(state.snapshot());
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.token = Some(token.clone());
            state.is_loading = true;
        }
        debug!(generation = generation, "Hydrating session from persisted token");

        match self.api.me(&token).await {
            Ok(user) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    info!(username = %user.username, "Session hydrated");
                    let mut state = self.state.write().await;
                    state.user = Some(user);
                    state.is_loading = false;
                } else {
                    debug!(generation = generation, "Discarding superseded hydration result");
                }
            }
            Err(e) => {
                // Fail closed: an expired token and an unreachable backend
                // land in the same place - logged out.
                warn!(error = %e, "Identity check failed, clearing session");
                if self.generation.load(Ordering::SeqCst) == generation {
                    if let Err(clear_err) = self.store.clear() {
                        warn!(error = %clear_err, "Failed to clear persisted token");
                    }
                    let mut state = self.state.write().await;
                    state.user = None;
                    state.token = None;
                    state.is_loading = false;
                }
            }
        }

        Ok(self.snapshot().await)
    }

    /// Exchange credentials for an authenticated session
    ///
    /// On failure the error propagates and no state changes.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let auth = self.api.login(&req).await?;
        self.commit_identity(auth).await
    }

    /// Create an account and log it in
    pub async fn register(&self, req: &RegisterRequest) -> Result<User> {
        let auth = self.api.register(req).await?;
        self.commit_identity(auth).await
    }

    /// Drop the session: persisted token, in-memory identity, cache
    ///
    /// Idempotent and infallible - calling while already logged out is a
    /// no-op that still wipes the cache. Never touches the network.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted token");
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.state.write().await;
            state.user = None;
            state.token = None;
            state.is_loading = false;
        }
        self.cache.invalidate_all().await;
        info!("Logged out");
    }

    /// Apply a partial profile update
    ///
    /// The user is replaced with the server's representation on success;
    /// on failure state is unchanged and the error propagates.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<User> {
        let token = self
            .state
            .read()
            .await
            .token
            .clone()
            .ok_or_else(|| AppError::Api(ApiError::Unauthorized("no active session".to_string())))?;

        let user = self.api.update_profile(&token, update).await?;

        {
            let mut state = self.state.write().await;
            state.user = Some(user.clone());
        }
        info!(username = %user.username, "Profile updated");
        Ok(user)
    }

    /// Persist the token, swap in the new identity, wipe the cache
    async fn commit_identity(&self, auth: AuthResponse) -> Result<User> {
        self.store.save(&auth.token)?;

        // Supersede any in-flight identity check for the old token
        self.generation.fetch_add(1, Ordering::SeqCst);
        let user = auth.user;
        {
            let mut state = self.state.write().await;
            state.user = Some(user.clone());
            state.token = Some(auth.token);
            state.is_loading = false;
        }

        // Identity changed: every cached query result may be scoped to
        // the previous identity.
        self.cache.invalidate_all().await;

        info!(username = %user.username, "Authenticated");
        Ok(user)
    }
}

// ============================================================================
// Tests
// ============================================================================
