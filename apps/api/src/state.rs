use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::certificate::{CertificateState, CertificateStore};
use crate::config::Config;
use crate::errors::{AppError, EditError};

/// One editing session: a certificate store plus bookkeeping.
#[derive(Debug)]
pub struct Session {
    pub store: CertificateStore,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Template every new session starts from.
    pub seed: Arc<CertificateState>,
    /// All live sessions. The lock makes each session single-writer.
    pub sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl AppState {
    pub fn new(config: Config, seed: CertificateState) -> Self {
        Self {
            config,
            seed: Arc::new(seed),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a session on a copy of the seed and returns its id.
    pub async fn open_session(&self) -> Result<Uuid, AppError> {
        let mut seed = (*self.seed).clone();
        seed.pagination.enabled = self.config.pagination_enabled;
        let mut store = CertificateStore::new(seed)?;

        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(AppError::UnprocessableEntity(format!(
                "Session limit of {} reached",
                self.config.max_sessions
            )));
        }

        let id = Uuid::new_v4();
        store.subscribe(move |cert| {
            debug!(
                session = %id,
                total_pages = cert.pagination.total_pages,
                page_breaks = ?cert.pagination.page_breaks,
                oversized = cert.pagination.oversized.len(),
                "Certificate state published"
            );
        });
        let now = Utc::now();
        sessions.insert(
            id,
            Session {
                store,
                created_at: now,
                updated_at: now,
            },
        );
        info!(session = %id, open = sessions.len(), "Opened certificate session");
        Ok(id)
    }

    pub async fn close_session(&self, id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .remove(&id)
            .ok_or_else(|| session_not_found(id))?;
        info!(session = %id, open = sessions.len(), "Closed certificate session");
        Ok(())
    }

    /// Runs `op` against a session's store and returns its output plus the session view.
    ///
    /// `updated_at` only moves when `op` succeeds.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        op: impl FnOnce(&mut CertificateStore) -> Result<T, EditError>,
    ) -> Result<(T, SessionView), AppError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| session_not_found(id))?;
        let out = op(&mut session.store)?;
        session.updated_at = Utc::now();
        Ok((out, SessionView::of(id, session)))
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, AppError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
        Ok(SessionView::of(id, session))
    }
}

/// Snapshot of a session as returned over HTTP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub certificate: CertificateState,
}

impl SessionView {
    fn of(id: Uuid, session: &Session) -> Self {
        Self {
            session_id: id,
            revision: session.store.revision(),
            created_at: session.created_at,
            updated_at: session.updated_at,
            certificate: session.store.snapshot(),
        }
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Certificate session {id} not found"))
}
