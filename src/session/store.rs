use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::models::{Role, UserSummary};
use crate::storage::StorageManager;

use super::record::{PendingVerification, SessionRecord};

/// Point-in-time view of auth state, handed to guards and UI code.
///
/// `authenticated` and `role` are derived from `user`/`token` when the
/// snapshot is taken; they cannot be set independently.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: Option<UserSummary>,
    pub token: Option<String>,
    pub role: Option<Role>,
    pub authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// Ordering token for session writes. Obtain one with
/// [`SessionStore::begin_request`] before an API call and pass it to
/// [`SessionStore::set_session_seq`] with the result; a response that
/// lost the race is discarded instead of overwriting newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestSeq(u64);

struct Inner {
    user: Option<UserSummary>,
    token: Option<String>,
    loading: bool,
    error: Option<String>,
    pending: Option<PendingVerification>,
    /// Highest sequence handed out by `begin_request`.
    issued_seq: u64,
    /// Sequence of the last write that took effect. `clear_session`
    /// raises this to `issued_seq`, fencing off every in-flight request.
    applied_seq: u64,
}

impl Inner {
    fn snapshot(&self) -> Session {
        let authenticated = self.token.is_some() && self.user.is_some();
        Session {
            user: self.user.clone(),
            token: self.token.clone(),
            role: self.user.as_ref().map(|u| u.role),
            authenticated,
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

/// Shared auth state. Clone is cheap; all clones see the same session.
///
/// Starts in the loading state; callers run [`load_from_storage`]
/// (`SessionStore::load_from_storage`) once at startup to rehydrate,
/// which also clears `loading`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
    storage: Arc<StorageManager>,
}

impl SessionStore {
    pub fn new(storage: StorageManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                user: None,
                token: None,
                loading: true,
                error: None,
                pending: None,
                issued_seq: 0,
                applied_seq: 0,
            })),
            storage: Arc::new(storage),
        }
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Rehydrate from disk. An expired record is removed rather than
    /// restored; a corrupt one reads as absent. Ends the loading state
    /// either way. Returns whether a session was restored.
    pub async fn load_from_storage(&self) -> bool {
        let record = self.storage.load_session();
        let pending = self.storage.load_pending();

        let mut inner = self.inner.write().await;
        inner.pending = pending;

        let restored = match record {
            Some(record) if record.is_expired() => {
                info!("Stored session expired, clearing");
                if let Err(e) = self.storage.clear_session() {
                    warn!(error = %e, "Failed to remove expired session record");
                }
                false
            }
            Some(record) => {
                debug!(user = %record.user.email, "Restored session from storage");
                inner.token = Some(record.token);
                inner.user = Some(record.user);
                // Restored state outranks any request begun before now.
                inner.applied_seq = inner.issued_seq;
                true
            }
            None => false,
        };

        inner.loading = false;
        restored
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.snapshot()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        let inner = self.inner.read().await;
        inner.token.is_some() && inner.user.is_some()
    }

    pub async fn set_error(&self, message: impl Into<String>) {
        self.inner.write().await.error = Some(message.into());
    }

    pub async fn clear_error(&self) {
        self.inner.write().await.error = None;
    }

    // ===== Write sequencing =====

    /// Reserve an ordering slot for an API call about to start.
    pub async fn begin_request(&self) -> RequestSeq {
        let mut inner = self.inner.write().await;
        inner.issued_seq += 1;
        RequestSeq(inner.issued_seq)
    }

    /// Reserve an ordering slot and read the session token in one locked
    /// step; `None` when there is no session to act for. Reading the
    /// token separately would leave a gap where a logout fences only the
    /// slots issued so far, and a slot taken after it could re-install
    /// the cleared session.
    pub async fn begin_authed_request(&self) -> Option<(RequestSeq, String)> {
        let mut inner = self.inner.write().await;
        let token = inner.token.clone()?;
        inner.issued_seq += 1;
        Some((RequestSeq(inner.issued_seq), token))
    }

    /// Install a session if `seq` is still current. Returns false (and
    /// changes nothing) when a newer write or a logout landed first.
    pub async fn set_session_seq(&self, seq: RequestSeq, token: String, user: UserSummary) -> bool {
        let mut inner = self.inner.write().await;
        if seq.0 <= inner.applied_seq {
            debug!(seq = seq.0, applied = inner.applied_seq, "Discarding stale session write");
            return false;
        }
        inner.applied_seq = seq.0;
        inner.token = Some(token.clone());
        inner.user = Some(user.clone());
        inner.error = None;
        drop(inner);

        let record = SessionRecord::new(token, user);
        if let Err(e) = self.storage.save_session(&record) {
            // Memory state stands; the session just won't survive a restart.
            warn!(error = %e, "Failed to persist session record");
        }
        true
    }

    /// Install a session unconditionally (single-caller paths).
    pub async fn set_session(&self, token: String, user: UserSummary) {
        let seq = self.begin_request().await;
        self.set_session_seq(seq, token, user).await;
    }

    /// Drop the session from memory and disk. Also fences every
    /// outstanding `RequestSeq`, so a response that was in flight when
    /// the user logged out cannot resurrect the session.
    pub async fn clear_session(&self) {
        let mut inner = self.inner.write().await;
        inner.token = None;
        inner.user = None;
        inner.error = None;
        inner.applied_seq = inner.issued_seq;
        drop(inner);

        if let Err(e) = self.storage.clear_session() {
            warn!(error = %e, "Failed to remove session record");
        }
        if let Err(e) = self.storage.clear_return_url() {
            warn!(error = %e, "Failed to remove stored return URL");
        }
    }

    // ===== Pending verification =====

    pub async fn pending(&self) -> Option<PendingVerification> {
        self.inner.read().await.pending.clone()
    }

    pub async fn set_pending(&self, pending: PendingVerification) {
        if let Err(e) = self.storage.save_pending(&pending) {
            warn!(error = %e, "Failed to persist pending verification");
        }
        self.inner.write().await.pending = Some(pending);
    }

    pub async fn clear_pending(&self) {
        if let Err(e) = self.storage.clear_pending() {
            warn!(error = %e, "Failed to remove pending verification");
        }
        self.inner.write().await.pending = None;
    }

    // ===== Return URL =====

    pub async fn remember_return_url(&self, url: &str) {
        if let Err(e) = self.storage.save_return_url(url) {
            warn!(error = %e, "Failed to persist return URL");
        }
    }

    pub async fn take_return_url(&self) -> Option<String> {
        self.storage.take_return_url()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use tempfile::TempDir;

    fn sample_user(email: &str) -> UserSummary {
        UserSummary {
            id: format!("id-{}", email),
            name: Some("Test".to_string()),
            email: email.to_string(),
            role: Role::Candidate,
            is_email_verified: true,
            profile: None,
        }
    }

    fn store(dir: &TempDir) -> SessionStore {
        let storage = StorageManager::new(dir.path().to_path_buf()).unwrap();
        SessionStore::new(storage)
    }

    #[tokio::test]
    async fn test_starts_loading_and_anonymous() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let snap = store.snapshot().await;
        assert!(snap.loading);
        assert!(!snap.authenticated);
        assert!(snap.user.is_none());

        store.load_from_storage().await;
        let snap = store.snapshot().await;
        assert!(!snap.loading);
        assert!(!snap.authenticated);
    }

    #[tokio::test]
    async fn test_set_session_derives_role_and_authenticated() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.load_from_storage().await;

        store.set_session("jwt".to_string(), sample_user("a@b.co")).await;
        let snap = store.snapshot().await;
        assert!(snap.authenticated);
        assert_eq!(snap.role, Some(Role::Candidate));
        assert_eq!(snap.token.as_deref(), Some("jwt"));
    }

    #[tokio::test]
    async fn test_rehydration_restores_persisted_session() {
        let dir = TempDir::new().unwrap();
        {
            let store = store(&dir);
            store.load_from_storage().await;
            store.set_session("jwt".to_string(), sample_user("a@b.co")).await;
        }

        // Fresh store over the same directory, as after a restart.
        let store = store(&dir);
        assert!(store.load_from_storage().await);
        let snap = store.snapshot().await;
        assert!(snap.authenticated);
        assert_eq!(snap.user.as_ref().map(|u| u.email.as_str()), Some("a@b.co"));
    }

    #[tokio::test]
    async fn test_rehydration_is_idempotent() {
        let dir = TempDir::new().unwrap();
        {
            let store = store(&dir);
            store.load_from_storage().await;
            store.set_session("jwt".to_string(), sample_user("a@b.co")).await;
        }

        let store = store(&dir);
        assert!(store.load_from_storage().await);
        let first = store.snapshot().await;
        assert!(store.load_from_storage().await);
        let second = store.snapshot().await;
        assert_eq!(first.token, second.token);
        assert_eq!(first.authenticated, second.authenticated);
    }

    #[tokio::test]
    async fn test_stale_write_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.load_from_storage().await;

        let older = store.begin_request().await;
        let newer = store.begin_request().await;

        assert!(store.set_session_seq(newer, "jwt-2".to_string(), sample_user("two@x.com")).await);
        // The slower response from the older request must not win.
        assert!(!store.set_session_seq(older, "jwt-1".to_string(), sample_user("one@x.com")).await);

        let snap = store.snapshot().await;
        assert_eq!(snap.token.as_deref(), Some("jwt-2"));
        assert_eq!(snap.user.as_ref().map(|u| u.email.as_str()), Some("two@x.com"));
    }

    #[tokio::test]
    async fn test_logout_fences_in_flight_responses() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.load_from_storage().await;

        let seq = store.begin_request().await;
        store.clear_session().await;

        assert!(!store.set_session_seq(seq, "jwt".to_string(), sample_user("a@b.co")).await);
        assert!(!store.is_authenticated().await);
        assert!(store.storage().load_session().is_none());
    }

    #[tokio::test]
    async fn test_authed_slot_pairs_token_with_the_fence() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.load_from_storage().await;

        // Nothing to act for while anonymous.
        assert!(store.begin_authed_request().await.is_none());

        store.set_session("jwt".to_string(), sample_user("a@b.co")).await;
        let (seq, token) = store.begin_authed_request().await.unwrap();
        assert_eq!(token, "jwt");

        // A logout after the slot was reserved still outranks the write.
        store.clear_session().await;
        assert!(!store.set_session_seq(seq, token, sample_user("a@b.co")).await);
        assert!(!store.is_authenticated().await);
        assert!(store.storage().load_session().is_none());
        assert!(store.begin_authed_request().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_session_wipes_disk_and_return_url() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.load_from_storage().await;
        store.set_session("jwt".to_string(), sample_user("a@b.co")).await;
        store.remember_return_url("/jobs/7").await;

        store.clear_session().await;
        assert!(store.storage().load_session().is_none());
        assert!(store.storage().load_return_url().is_none());
        assert!(!store.snapshot().await.authenticated);
    }

    #[tokio::test]
    async fn test_pending_survives_restart() {
        let dir = TempDir::new().unwrap();
        {
            let store = store(&dir);
            store.load_from_storage().await;
            store
                .set_pending(PendingVerification::new("jane@x.com", Role::Candidate))
                .await;
        }

        let store = store(&dir);
        store.load_from_storage().await;
        let pending = store.pending().await.unwrap();
        assert_eq!(pending.email, "jane@x.com");

        store.clear_pending().await;
        assert!(store.pending().await.is_none());
        assert!(store.storage().load_pending().is_none());
    }

    #[tokio::test]
    async fn test_error_field_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.load_from_storage().await;

        store.set_error("Invalid credentials").await;
        assert_eq!(
            store.snapshot().await.error.as_deref(),
            Some("Invalid credentials")
        );

        store.clear_error().await;
        assert!(store.snapshot().await.error.is_none());

        // A successful login clears any lingering error.
        store.set_error("old failure").await;
        store.set_session("jwt".to_string(), sample_user("a@b.co")).await;
        assert!(store.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_expired_record_is_dropped_on_rehydration() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path().to_path_buf()).unwrap();
        let mut record = SessionRecord::new("jwt".to_string(), sample_user("a@b.co"));
        record.saved_at = chrono::Utc::now() - chrono::Duration::days(8);
        storage.save_session(&record).unwrap();

        let store = SessionStore::new(storage);
        assert!(!store.load_from_storage().await);
        assert!(!store.snapshot().await.authenticated);
        // The stale file is gone, not just ignored.
        assert!(store.storage().load_session().is_none());
    }
}
