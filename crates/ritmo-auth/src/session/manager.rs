//! Session lifecycle orchestration.
//!
//! The manager owns the full token lifecycle: login, rotation, logout,
//! multi-session listing and revocation, session caps, and purging.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, info};
use uuid::Uuid;

use ritmo_core::config::AuthConfig;
use ritmo_core::error::{AppError, ErrorKind};
use ritmo_entity::session::{NewRefreshToken, SessionView};
use ritmo_entity::user::User;

use crate::credentials::CredentialVerifier;
use crate::jwt::{TokenIssuer, TokenVerifier};

use super::store::{SessionStore, UserDirectory};

/// Number of random bytes in a refresh token secret.
const REFRESH_SECRET_BYTES: usize = 64;

/// Client device metadata captured at login.
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    /// User agent string, if the client sent one.
    pub user_agent: Option<String>,
    /// Client IP address, if known.
    pub ip_address: Option<String>,
}

/// A freshly issued access + refresh token pair.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    /// Short-lived stateless JWT.
    pub access_token: String,
    /// Opaque refresh token secret, stored server-side.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Orchestrates authentication and the refresh token session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    /// Session row persistence.
    store: Arc<dyn SessionStore>,
    /// User account lookups.
    directory: Arc<dyn UserDirectory>,
    /// Login credential checking.
    credentials: CredentialVerifier,
    /// Access token signing.
    issuer: TokenIssuer,
    /// Access token validation.
    verifier: TokenVerifier,
    /// Refresh token TTL in days.
    refresh_ttl_days: i64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn UserDirectory>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            credentials: CredentialVerifier::new(directory.clone()),
            store,
            directory,
            issuer: TokenIssuer::new(config),
            verifier: TokenVerifier::new(config),
            refresh_ttl_days: config.refresh_ttl_days as i64,
        }
    }

    /// Authenticate credentials and open a new session.
    ///
    /// Any existing active session carrying the same user agent is revoked
    /// first, so one device holds at most one live session.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        device: DeviceInfo,
    ) -> Result<(User, IssuedTokens), AppError> {
        let user = self.credentials.authenticate(identifier, password).await?;

        if let Some(user_agent) = device.user_agent.as_deref() {
            let replaced = self.store.revoke_by_device(user.id, user_agent).await?;
            if replaced > 0 {
                debug!(
                    user_id = %user.public_id,
                    replaced = replaced,
                    "Revoked prior sessions for the same device"
                );
            }
        }

        let tokens = self
            .open_session(&user, device.user_agent, device.ip_address)
            .await?;

        info!(user_id = %user.public_id, "User logged in");
        Ok((user, tokens))
    }

    /// Rotate a refresh token: consume the presented secret and issue a new
    /// access + refresh pair bound to a new session row.
    ///
    /// The presented secret is single-use. Consumption is atomic, so a
    /// replayed or concurrent presentation of the same secret fails. The
    /// session owner is re-resolved from storage on every rotation;
    /// rotation fails if the account is gone.
    pub async fn refresh(&self, secret: &str) -> Result<(User, IssuedTokens), AppError> {
        let consumed = self
            .store
            .consume(secret)
            .await?
            .ok_or_else(AppError::refresh_invalid)?;

        let user = self
            .directory
            .find_by_id(consumed.user_id)
            .await?
            .ok_or_else(AppError::refresh_invalid)?;

        // The new row inherits the device metadata of the consumed one.
        // Rotation never touches sessions on other devices.
        let tokens = self
            .open_session(&user, consumed.user_agent, consumed.ip_address)
            .await?;

        debug!(user_id = %user.public_id, "Refresh token rotated");
        Ok((user, tokens))
    }

    /// End sessions at logout.
    ///
    /// With `all_devices`, every active session of the user is revoked.
    /// Otherwise only the session carrying the presented secret ends; a
    /// missing or already-dead secret is not an error. Returns the number
    /// of sessions revoked.
    pub async fn logout(
        &self,
        user_id: Uuid,
        secret: Option<&str>,
        all_devices: bool,
    ) -> Result<u64, AppError> {
        let revoked = if all_devices {
            self.store.revoke_all(user_id).await?
        } else {
            match secret {
                Some(secret) => match self.store.revoke_by_secret(secret).await? {
                    Some(_) => 1,
                    None => 0,
                },
                None => 0,
            }
        };

        info!(revoked = revoked, all_devices = all_devices, "User logged out");
        Ok(revoked)
    }

    /// Validate an access token and resolve its subject to a user account.
    pub async fn authenticate_access(&self, token: &str) -> Result<User, AppError> {
        let claims = self.verifier.verify(token)?;

        self.directory
            .find_by_public_id(claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::Unauthenticated,
                    "Token subject does not resolve to a known user",
                )
            })
    }

    /// List the user's active sessions, newest first.
    pub async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<SessionView>, AppError> {
        let rows = self.store.list_active(user_id, Utc::now()).await?;
        Ok(rows.iter().map(SessionView::from).collect())
    }

    /// Revoke one of the user's sessions by id.
    ///
    /// A session id that does not exist, is already dead, or belongs to a
    /// different user all produce the same not-found error.
    pub async fn revoke_session(&self, user_id: Uuid, session_id: Uuid) -> Result<(), AppError> {
        if self.store.revoke_by_id(user_id, session_id).await? {
            info!(session_id = %session_id, "Session revoked");
            Ok(())
        } else {
            Err(AppError::not_found("Session not found"))
        }
    }

    /// Enforce a maximum number of active sessions for a user, revoking the
    /// oldest sessions beyond the cap. Returns the number revoked.
    pub async fn cap_sessions(&self, user_id: Uuid, max_sessions: i64) -> Result<u64, AppError> {
        if max_sessions < 1 {
            return Err(AppError::validation("max_sessions must be at least 1"));
        }

        let active = self.store.list_active(user_id, Utc::now()).await?;
        if active.len() as i64 <= max_sessions {
            return Ok(0);
        }

        // list_active is newest first: everything past the cap is oldest.
        let excess: Vec<Uuid> = active
            .iter()
            .skip(max_sessions as usize)
            .map(|row| row.id)
            .collect();

        let revoked = self.store.revoke_by_ids(user_id, &excess).await?;
        info!(
            user_id = %user_id,
            revoked = revoked,
            max_sessions = max_sessions,
            "Capped active sessions"
        );
        Ok(revoked)
    }

    /// Delete expired and revoked session rows. Returns the number deleted.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let purged = self.store.purge(Utc::now()).await?;
        if purged > 0 {
            info!(purged = purged, "Purged stale refresh tokens");
        }
        Ok(purged)
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.issuer.access_ttl_seconds()
    }

    /// Store a new session row and issue the matching token pair.
    async fn open_session(
        &self,
        user: &User,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Result<IssuedTokens, AppError> {
        let secret = generate_refresh_secret();
        let refresh_expires_at = Utc::now() + chrono::Duration::days(self.refresh_ttl_days);

        self.store
            .insert(NewRefreshToken {
                user_id: user.id,
                token: secret.clone(),
                expires_at: refresh_expires_at,
                user_agent,
                ip_address,
            })
            .await?;

        let (access_token, access_expires_at) = self.issuer.issue(user.public_id)?;

        Ok(IssuedTokens {
            access_token,
            refresh_token: secret,
            access_expires_at,
            refresh_expires_at,
        })
    }
}

/// Generate an opaque refresh token secret from 64 CSPRNG bytes.
fn generate_refresh_secret() -> String {
    let mut bytes = [0u8; REFRESH_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration;

    use ritmo_entity::session::RefreshToken;
    use ritmo_entity::user::UserRole;

    use crate::password::PasswordHasher;

    use super::*;

    /// In-memory session store mirroring the SQL semantics.
    #[derive(Default)]
    struct MemSessionStore {
        rows: Mutex<Vec<RefreshToken>>,
    }

    impl MemSessionStore {
        fn push(&self, row: RefreshToken) {
            self.rows.lock().unwrap().push(row);
        }

        fn all(&self) -> Vec<RefreshToken> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionStore for MemSessionStore {
        async fn insert(&self, token: NewRefreshToken) -> Result<RefreshToken, AppError> {
            let row = RefreshToken {
                id: Uuid::new_v4(),
                user_id: token.user_id,
                token: token.token,
                expires_at: token.expires_at,
                revoked: false,
                user_agent: token.user_agent,
                ip_address: token.ip_address,
                created_at: Utc::now(),
            };
            self.push(row.clone());
            Ok(row)
        }

        async fn consume(&self, secret: &str) -> Result<Option<RefreshToken>, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let now = Utc::now();
            for row in rows.iter_mut() {
                if row.token == secret && !row.revoked && row.expires_at > now {
                    row.revoked = true;
                    return Ok(Some(row.clone()));
                }
            }
            Ok(None)
        }

        async fn revoke_by_secret(&self, secret: &str) -> Result<Option<RefreshToken>, AppError> {
            let mut rows = self.rows.lock().unwrap();
            for row in rows.iter_mut() {
                if row.token == secret && !row.revoked {
                    row.revoked = true;
                    return Ok(Some(row.clone()));
                }
            }
            Ok(None)
        }

        async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let mut count = 0;
            for row in rows.iter_mut() {
                if row.user_id == user_id && !row.revoked {
                    row.revoked = true;
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn revoke_by_id(&self, user_id: Uuid, session_id: Uuid) -> Result<bool, AppError> {
            let mut rows = self.rows.lock().unwrap();
            for row in rows.iter_mut() {
                if row.id == session_id && row.user_id == user_id && !row.revoked {
                    row.revoked = true;
                    return Ok(true);
                }
            }
            Ok(false)
        }

        async fn revoke_by_device(
            &self,
            user_id: Uuid,
            user_agent: &str,
        ) -> Result<u64, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let mut count = 0;
            for row in rows.iter_mut() {
                if row.user_id == user_id
                    && row.user_agent.as_deref() == Some(user_agent)
                    && !row.revoked
                {
                    row.revoked = true;
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn revoke_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let mut count = 0;
            for row in rows.iter_mut() {
                if row.user_id == user_id && ids.contains(&row.id) && !row.revoked {
                    row.revoked = true;
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn list_active(
            &self,
            user_id: Uuid,
            now: DateTime<Utc>,
        ) -> Result<Vec<RefreshToken>, AppError> {
            let mut rows: Vec<RefreshToken> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.user_id == user_id && !row.revoked && row.expires_at > now)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        async fn purge(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.expires_at >= now && !row.revoked);
            Ok((before - rows.len()) as u64)
        }
    }

    /// In-memory user directory.
    #[derive(Default)]
    struct MemUserDirectory {
        users: Vec<User>,
    }

    #[async_trait]
    impl UserDirectory for MemUserDirectory {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<User>, AppError> {
            Ok(self.users.iter().find(|u| u.public_id == public_id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
            Ok(self.users.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
            Ok(self.users.iter().find(|u| u.username == username).cloned())
        }
    }

    const TEST_PASSWORD: &str = "hunter2hunter2";

    fn test_user(username: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            public_id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            first_name: None,
            password_hash: PasswordHasher::new().hash_password(TEST_PASSWORD).unwrap(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "session-manager-test-secret".into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
            cookie_secure: false,
        }
    }

    fn manager_with(
        users: Vec<User>,
    ) -> (SessionManager, Arc<MemSessionStore>, Arc<MemUserDirectory>) {
        let store = Arc::new(MemSessionStore::default());
        let directory = Arc::new(MemUserDirectory { users });
        let manager = SessionManager::new(store.clone(), directory.clone(), &test_config());
        (manager, store, directory)
    }

    fn device(user_agent: &str) -> DeviceInfo {
        DeviceInfo {
            user_agent: Some(user_agent.to_string()),
            ip_address: Some("203.0.113.7".to_string()),
        }
    }

    /// Insert a session row directly, bypassing login.
    fn seed_session(
        store: &MemSessionStore,
        user_id: Uuid,
        age: Duration,
        expires_in: Duration,
    ) -> RefreshToken {
        let row = RefreshToken {
            id: Uuid::new_v4(),
            user_id,
            token: generate_refresh_secret(),
            expires_at: Utc::now() + expires_in,
            revoked: false,
            user_agent: Some("seeded".to_string()),
            ip_address: None,
            created_at: Utc::now() - age,
        };
        store.push(row.clone());
        row
    }

    #[tokio::test]
    async fn test_login_issues_tokens_and_session() {
        let user = test_user("alice", "alice@example.com");
        let public_id = user.public_id;
        let (manager, store, _) = manager_with(vec![user]);

        let (logged_in, tokens) = manager
            .login("alice", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();

        assert_eq!(logged_in.public_id, public_id);
        assert!(tokens.refresh_expires_at > tokens.access_expires_at);

        let claims = manager.verifier.verify(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, public_id);

        let rows = store.all();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].revoked);
        assert_eq!(rows[0].user_agent.as_deref(), Some("Firefox"));
    }

    #[tokio::test]
    async fn test_login_dispatches_identifier_on_at_sign() {
        let user = test_user("bob", "bob@example.com");
        let (manager, _, _) = manager_with(vec![user]);

        manager
            .login("bob@example.com", TEST_PASSWORD, DeviceInfo::default())
            .await
            .unwrap();
        manager
            .login("bob", TEST_PASSWORD, DeviceInfo::default())
            .await
            .unwrap();

        // An email-shaped identifier is never tried as a username.
        let err = manager
            .login("bob@", TEST_PASSWORD, DeviceInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials_without_side_effects() {
        let user = test_user("carol", "carol@example.com");
        let (manager, store, _) = manager_with(vec![user]);

        let err = manager
            .login("carol", "wrong password", device("Firefox"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);

        let err = manager
            .login("nobody", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);

        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn test_login_replaces_session_on_same_device() {
        let user = test_user("dave", "dave@example.com");
        let user_id = user.id;
        let (manager, store, _) = manager_with(vec![user]);

        let (_, first) = manager
            .login("dave", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();
        manager
            .login("dave", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();

        let active = store.list_active(user_id, Utc::now()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_ne!(active[0].token, first.refresh_token);
    }

    #[tokio::test]
    async fn test_login_keeps_sessions_on_other_devices() {
        let user = test_user("erin", "erin@example.com");
        let user_id = user.id;
        let (manager, store, _) = manager_with(vec![user]);

        manager
            .login("erin", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();
        manager
            .login("erin", TEST_PASSWORD, device("Safari"))
            .await
            .unwrap();
        // No user agent at all: nothing to match, nothing replaced.
        manager
            .login("erin", TEST_PASSWORD, DeviceInfo::default())
            .await
            .unwrap();

        let active = store.list_active(user_id, Utc::now()).await.unwrap();
        assert_eq!(active.len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_old_secret_is_single_use() {
        let user = test_user("frank", "frank@example.com");
        let (manager, _, _) = manager_with(vec![user]);

        let (_, tokens) = manager
            .login("frank", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();

        let (_, rotated) = manager.refresh(&tokens.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, tokens.refresh_token);

        // Replaying the consumed secret fails, the new one still works.
        let err = manager.refresh(&tokens.refresh_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RefreshTokenInvalid);
        manager.refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_preserves_device_and_spares_other_sessions() {
        let user = test_user("grace", "grace@example.com");
        let user_id = user.id;
        let (manager, store, _) = manager_with(vec![user]);

        let (_, firefox) = manager
            .login("grace", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();
        manager
            .login("grace", TEST_PASSWORD, device("Safari"))
            .await
            .unwrap();

        manager.refresh(&firefox.refresh_token).await.unwrap();

        let active = store.list_active(user_id, Utc::now()).await.unwrap();
        assert_eq!(active.len(), 2);
        let agents: Vec<_> = active
            .iter()
            .filter_map(|row| row.user_agent.as_deref())
            .collect();
        assert!(agents.contains(&"Firefox"));
        assert!(agents.contains(&"Safari"));
    }

    #[tokio::test]
    async fn test_refresh_rejects_unknown_expired_and_revoked_secrets() {
        let user = test_user("heidi", "heidi@example.com");
        let user_id = user.id;
        let (manager, store, _) = manager_with(vec![user.clone()]);

        let err = manager.refresh("no-such-secret").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RefreshTokenInvalid);

        let expired = seed_session(&store, user_id, Duration::days(8), Duration::days(-1));
        let err = manager.refresh(&expired.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RefreshTokenInvalid);

        let (_, tokens) = manager
            .login("heidi", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();
        manager.logout(user_id, None, true).await.unwrap();
        let err = manager.refresh(&tokens.refresh_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RefreshTokenInvalid);
    }

    #[tokio::test]
    async fn test_refresh_rejects_secret_of_deleted_user() {
        let (manager, store, _) = manager_with(vec![]);

        // Session row exists but its owner is gone from the directory.
        let orphan = seed_session(&store, Uuid::new_v4(), Duration::zero(), Duration::days(7));
        let err = manager.refresh(&orphan.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RefreshTokenInvalid);
    }

    #[tokio::test]
    async fn test_logout_single_session() {
        let user = test_user("ivan", "ivan@example.com");
        let user_id = user.id;
        let (manager, store, _) = manager_with(vec![user]);

        let (_, firefox) = manager
            .login("ivan", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();
        manager
            .login("ivan", TEST_PASSWORD, device("Safari"))
            .await
            .unwrap();

        let revoked = manager
            .logout(user_id, Some(&firefox.refresh_token), false)
            .await
            .unwrap();
        assert_eq!(revoked, 1);
        assert_eq!(store.list_active(user_id, Utc::now()).await.unwrap().len(), 1);

        // A missing or dead secret is not an error.
        assert_eq!(manager.logout(user_id, None, false).await.unwrap(), 0);
        assert_eq!(
            manager
                .logout(user_id, Some(&firefox.refresh_token), false)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_logout_all_devices() {
        let user = test_user("judy", "judy@example.com");
        let user_id = user.id;
        let (manager, store, _) = manager_with(vec![user]);

        let (_, tokens) = manager
            .login("judy", TEST_PASSWORD, device("Firefox"))
            .await
            .unwrap();
        manager
            .login("judy", TEST_PASSWORD, device("Safari"))
            .await
            .unwrap();
        manager
            .login("judy", TEST_PASSWORD, device("Edge"))
            .await
            .unwrap();

        let revoked = manager.logout(user_id, None, true).await.unwrap();
        assert_eq!(revoked, 3);
        assert!(store.list_active(user_id, Utc::now()).await.unwrap().is_empty());

        // Revocation is monotonic: no session comes back.
        let err = manager.refresh(&tokens.refresh_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RefreshTokenInvalid);
    }

    #[tokio::test]
    async fn test_authenticate_access_resolves_user() {
        let user = test_user("mallory", "mallory@example.com");
        let public_id = user.public_id;
        let (manager, _, _) = manager_with(vec![user]);

        let (_, tokens) = manager
            .login("mallory", TEST_PASSWORD, DeviceInfo::default())
            .await
            .unwrap();
        let resolved = manager
            .authenticate_access(&tokens.access_token)
            .await
            .unwrap();
        assert_eq!(resolved.public_id, public_id);
    }

    #[tokio::test]
    async fn test_authenticate_access_rejects_unknown_subject() {
        let user = test_user("niaj", "niaj@example.com");
        let (manager, _, _) = manager_with(vec![user]);
        let (empty_manager, _, _) = manager_with(vec![]);

        let (_, tokens) = manager
            .login("niaj", TEST_PASSWORD, DeviceInfo::default())
            .await
            .unwrap();

        // Token is valid but the subject no longer exists.
        let err = empty_manager
            .authenticate_access(&tokens.access_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first_active_only() {
        let user_id = Uuid::new_v4();
        let (manager, store, _) = manager_with(vec![]);

        let oldest = seed_session(&store, user_id, Duration::hours(3), Duration::days(7));
        let newest = seed_session(&store, user_id, Duration::hours(1), Duration::days(7));
        let middle = seed_session(&store, user_id, Duration::hours(2), Duration::days(7));
        seed_session(&store, user_id, Duration::hours(4), Duration::days(-1)); // expired
        let revoked = seed_session(&store, user_id, Duration::zero(), Duration::days(7));
        store.revoke_by_id(user_id, revoked.id).await.unwrap();
        seed_session(&store, Uuid::new_v4(), Duration::zero(), Duration::days(7)); // other user

        let sessions = manager.list_sessions(user_id).await.unwrap();
        let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
    }

    #[tokio::test]
    async fn test_revoke_session_is_ownership_scoped() {
        let user_id = Uuid::new_v4();
        let stranger_id = Uuid::new_v4();
        let (manager, store, _) = manager_with(vec![]);

        let own = seed_session(&store, user_id, Duration::zero(), Duration::days(7));
        let foreign = seed_session(&store, stranger_id, Duration::zero(), Duration::days(7));

        manager.revoke_session(user_id, own.id).await.unwrap();

        // Another user's session looks like it does not exist.
        let err = manager.revoke_session(user_id, foreign.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(
            store.list_active(stranger_id, Utc::now()).await.unwrap().len(),
            1
        );

        // Revoking twice also reports not found.
        let err = manager.revoke_session(user_id, own.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cap_sessions_revokes_oldest_beyond_cap() {
        let user_id = Uuid::new_v4();
        let (manager, store, _) = manager_with(vec![]);

        let mut seeded = Vec::new();
        for hours in 1..=6 {
            seeded.push(seed_session(
                &store,
                user_id,
                Duration::hours(hours),
                Duration::days(7),
            ));
        }

        let revoked = manager.cap_sessions(user_id, 3).await.unwrap();
        assert_eq!(revoked, 3);

        let remaining = manager.list_sessions(user_id).await.unwrap();
        let ids: Vec<Uuid> = remaining.iter().map(|s| s.id).collect();
        // The three newest survive.
        assert_eq!(ids, vec![seeded[0].id, seeded[1].id, seeded[2].id]);
    }

    #[tokio::test]
    async fn test_cap_sessions_noop_when_under_cap() {
        let user_id = Uuid::new_v4();
        let (manager, store, _) = manager_with(vec![]);

        seed_session(&store, user_id, Duration::hours(1), Duration::days(7));
        seed_session(&store, user_id, Duration::hours(2), Duration::days(7));

        assert_eq!(manager.cap_sessions(user_id, 2).await.unwrap(), 0);
        assert_eq!(manager.cap_sessions(user_id, 5).await.unwrap(), 0);
        assert_eq!(manager.list_sessions(user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cap_sessions_rejects_cap_below_one() {
        let user_id = Uuid::new_v4();
        let (manager, store, _) = manager_with(vec![]);

        seed_session(&store, user_id, Duration::hours(1), Duration::days(7));

        for cap in [0, -1] {
            let err = manager.cap_sessions(user_id, cap).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }
        // No side effects on rejection.
        assert_eq!(manager.list_sessions(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_purge_removes_expired_and_revoked_only() {
        let user_id = Uuid::new_v4();
        let (manager, store, _) = manager_with(vec![]);

        let live = seed_session(&store, user_id, Duration::zero(), Duration::days(7));
        seed_session(&store, user_id, Duration::days(8), Duration::days(-1));
        let dead = seed_session(&store, user_id, Duration::zero(), Duration::days(7));
        store.revoke_by_id(user_id, dead.id).await.unwrap();

        let purged = manager.purge_expired().await.unwrap();
        assert_eq!(purged, 2);

        let rows = store.all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, live.id);
    }
}
