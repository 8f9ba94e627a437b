//! # AuthSession coordinator
//!
//! [`AuthSession`] sits between an [`IdentityProvider`], a [`FederatedProvider`]
//! and a [`ProfileStore`] and enforces that a uid keeps the role it was created
//! with.
//!
//! | Operation | Outcome |
//! |-----------|---------|
//! | [`login`](AuthSession::login) | succeeds when no profile exists or its role matches; otherwise signs out with `RoleMismatch` |
//! | [`signup`](AuthSession::signup) | creates the account and writes the profile; a failed write deletes the new account again |
//! | [`begin_federated_sign_in`](AuthSession::begin_federated_sign_in) | returns the provider's authorization URL |
//! | [`complete_federated_sign_in`](AuthSession::complete_federated_sign_in) | creates the profile with the pre-selected role on first sign-in, accepts a matching returning user, rejects a mismatched one |
//! | [`logout`](AuthSession::logout) | signs out and resets the account chooser; never fails |
//!
//! Every failure after the identity provider has authenticated the user signs
//! the session out again before the error is returned, so no session outlives a
//! failed attempt. External calls are bounded by the session timeout and report
//! [`AuthError::Timeout`] on expiry.
//!
//! Overlapping calls are not serialized; the state stream reflects whichever
//! call finished last.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use super::federated::{FederatedProvider, ProviderResult, SignInRequest};
use super::identity::{Identity, IdentityProvider};
use super::state::{AuthState, AuthSuccess};
use crate::error::AuthError;
use crate::models::{Role, UserProfile};
use crate::profiles::ProfileStore;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const MIN_PASSWORD_LEN: usize = 6;
const FEDERATED_NAME_FALLBACK: &str = "Google User";

pub struct AuthSession<I, F, P> {
    identity: I,
    federated: F,
    profiles: P,
    state: watch::Sender<AuthState>,
    timeout: Duration,
    federated_session: AtomicBool,
}

fn require(value: &str, what: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidInput(format!("{what} is required")));
    }
    Ok(())
}

impl<I, F, P> AuthSession<I, F, P>
where
    I: IdentityProvider,
    F: FederatedProvider,
    P: ProfileStore,
{
    pub fn new(identity: I, federated: F, profiles: P) -> Self {
        Self {
            identity,
            federated,
            profiles,
            state: watch::Sender::new(AuthState::Idle),
            timeout: DEFAULT_TIMEOUT,
            federated_session: AtomicBool::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Watch the state of authentication attempts.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn current_uid(&self) -> Option<String> {
        self.identity.current_uid()
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| AuthError::Timeout)?
    }

    /// Publish the outcome of an attempt.
    fn settle(
        &self,
        operation: &str,
        result: Result<AuthSuccess, AuthError>,
    ) -> Result<AuthSuccess, AuthError> {
        match &result {
            Ok(success) => {
                tracing::info!(operation, uid = %success.uid, created = success.created, "authenticated");
                self.state.send_replace(AuthState::Success);
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "authentication failed");
                self.state.send_replace(AuthState::Error(e.to_string()));
            }
        }
        result
    }

    /// Read the stored profile for a freshly authenticated identity, signing out on failure.
    async fn load_profile(&self, identity: &Identity) -> Result<Option<UserProfile>, AuthError> {
        let result = self
            .bounded(async { self.profiles.get(&identity.uid).await.map_err(AuthError::from) })
            .await;
        if result.is_err() {
            self.identity.sign_out();
        }
        result
    }

    /// Log in with email and password as `role`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthSuccess, AuthError> {
        self.state.send_replace(AuthState::Loading);
        tracing::debug!(operation = "login", %role, "started");
        let result = self.run_login(email.trim(), password, role).await;
        self.settle("login", result)
    }

    async fn run_login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthSuccess, AuthError> {
        require(email, "Email")?;
        require(password, "Password")?;

        let identity = self
            .bounded(self.identity.sign_in_with_password(email, password))
            .await?;
        let profile = self.load_profile(&identity).await?;

        if let Some(stored) = &profile {
            if stored.role != role {
                self.identity.sign_out();
                return Err(AuthError::RoleMismatch {
                    stored: stored.role,
                });
            }
        }
        self.federated_session.store(false, Ordering::SeqCst);

        Ok(AuthSuccess {
            uid: identity.uid,
            profile,
            created: false,
            federated: false,
        })
    }

    /// Create an account and its profile.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<AuthSuccess, AuthError> {
        self.state.send_replace(AuthState::Loading);
        tracing::debug!(operation = "signup", %role, "started");
        let result = self.run_signup(email.trim(), password, name.trim(), role).await;
        self.settle("signup", result)
    }

    async fn run_signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<AuthSuccess, AuthError> {
        require(email, "Email")?;
        require(password, "Password")?;
        require(name, "Name")?;
        if !email.contains('@') {
            return Err(AuthError::InvalidInput("Email is not valid".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let identity = self
            .bounded(self.identity.create_account(email, password))
            .await?;
        let profile = UserProfile {
            uid: identity.uid.clone(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };

        if let Err(e) = self
            .bounded(async { self.profiles.put(&profile).await.map_err(AuthError::from) })
            .await
        {
            self.roll_back_account(&identity).await;
            return Err(AuthError::ProfilePersistenceFailed(e.to_string()));
        }
        self.federated_session.store(false, Ordering::SeqCst);

        Ok(AuthSuccess {
            uid: identity.uid,
            profile: Some(profile),
            created: true,
            federated: false,
        })
    }

    /// Remove an account whose profile could not be written.
    async fn roll_back_account(&self, identity: &Identity) {
        match self.bounded(self.identity.delete_current_account()).await {
            Ok(()) => tracing::info!(uid = %identity.uid, "rolled back account without profile"),
            Err(e) => tracing::error!(uid = %identity.uid, error = %e, "account left without profile"),
        }
        self.identity.sign_out();
    }

    /// Start a federated sign-in. The role is supplied when completing it.
    pub fn begin_federated_sign_in(&self) -> Result<SignInRequest, AuthError> {
        self.federated.begin_sign_in()
    }

    /// Finish a federated sign-in as `role`.
    pub async fn complete_federated_sign_in(
        &self,
        result: &ProviderResult,
        role: Role,
    ) -> Result<AuthSuccess, AuthError> {
        self.state.send_replace(AuthState::Loading);
        tracing::debug!(operation = "federated sign-in", %role, "started");
        let outcome = self.run_federated(result, role).await;
        self.settle("federated sign-in", outcome)
    }

    async fn run_federated(
        &self,
        result: &ProviderResult,
        role: Role,
    ) -> Result<AuthSuccess, AuthError> {
        let credential = self.bounded(self.federated.complete_sign_in(result)).await?;
        let identity = self
            .bounded(self.identity.sign_in_with_federated_credential(&credential))
            .await?;

        match self.load_profile(&identity).await? {
            Some(stored) if stored.role == role => {
                self.federated_session.store(true, Ordering::SeqCst);
                Ok(AuthSuccess {
                    uid: identity.uid,
                    profile: Some(stored),
                    created: false,
                    federated: true,
                })
            }
            Some(stored) => {
                self.identity.sign_out();
                self.revoke_account_selection().await;
                Err(AuthError::RoleMismatch {
                    stored: stored.role,
                })
            }
            None => {
                let name = credential
                    .display_name
                    .or(identity.display_name)
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| FEDERATED_NAME_FALLBACK.to_string());
                let email = credential.email.or(identity.email).unwrap_or_default();
                let profile = UserProfile {
                    uid: identity.uid.clone(),
                    name,
                    email,
                    role,
                };
                if let Err(e) = self
                    .bounded(async { self.profiles.put(&profile).await.map_err(AuthError::from) })
                    .await
                {
                    self.identity.sign_out();
                    return Err(AuthError::ProfilePersistenceFailed(e.to_string()));
                }
                self.federated_session.store(true, Ordering::SeqCst);
                Ok(AuthSuccess {
                    uid: identity.uid,
                    profile: Some(profile),
                    created: true,
                    federated: true,
                })
            }
        }
    }

    async fn revoke_account_selection(&self) {
        if let Err(e) = self.bounded(self.federated.revoke_account_selection()).await {
            tracing::warn!(error = %e, "could not reset account selection");
        }
    }

    /// Sign out. Safe to call without an active session.
    pub async fn logout(&self) {
        tracing::debug!(operation = "logout", "started");
        self.identity.sign_out();
        if self.federated_session.swap(false, Ordering::SeqCst) {
            self.revoke_account_selection().await;
        }
        self.state.send_replace(AuthState::Idle);
        tracing::info!("signed out");
    }

    /// Role of the signed-in user, citizen when unknown.
    pub async fn current_role(&self) -> Role {
        let Some(uid) = self.identity.current_uid() else {
            return Role::Citizen;
        };
        match self
            .bounded(async { self.profiles.get(&uid).await.map_err(AuthError::from) })
            .await
        {
            Ok(Some(profile)) => profile.role,
            Ok(None) => Role::Citizen,
            Err(e) => {
                tracing::warn!(%uid, error = %e, "could not read role");
                Role::Citizen
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    use store::{DocumentStore, MemoryStore, StoreError};

    use super::*;
    use crate::auth::identity::FederatedCredential;
    use crate::auth::MemoryIdentityProvider;
    use crate::profiles::ProfileRepository;

    /// Federated provider that hands out preset credentials by code.
    #[derive(Clone, Default)]
    struct FakeFederated {
        credentials: Arc<Mutex<HashMap<String, FederatedCredential>>>,
        revocations: Arc<AtomicUsize>,
    }

    impl FakeFederated {
        fn with_user(self, code: &str, subject: &str, name: Option<&str>) -> Self {
            self.credentials.lock().unwrap().insert(
                code.to_string(),
                FederatedCredential {
                    provider_id: "google.com".into(),
                    subject: subject.into(),
                    access_token: format!("token-{subject}"),
                    display_name: name.map(String::from),
                    email: Some(format!("{subject}@gmail.com")),
                },
            );
            self
        }

        fn revocations(&self) -> usize {
            self.revocations.load(Ordering::SeqCst)
        }
    }

    impl FederatedProvider for FakeFederated {
        fn begin_sign_in(&self) -> Result<SignInRequest, AuthError> {
            Ok(SignInRequest {
                url: "https://accounts.google.com/o/oauth2/v2/auth?state=s".into(),
                state: "s".into(),
            })
        }

        async fn complete_sign_in(
            &self,
            result: &ProviderResult,
        ) -> Result<FederatedCredential, AuthError> {
            self.credentials
                .lock()
                .unwrap()
                .get(&result.code)
                .cloned()
                .ok_or(AuthError::InvalidCredentials)
        }

        async fn revoke_account_selection(&self) -> Result<(), AuthError> {
            self.revocations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Profile store whose writes always fail.
    #[derive(Clone, Default)]
    struct ReadOnlyProfiles;

    impl ProfileStore for ReadOnlyProfiles {
        async fn get(&self, _uid: &str) -> Result<Option<UserProfile>, StoreError> {
            Ok(None)
        }

        async fn put(&self, _profile: &UserProfile) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write rejected".into()))
        }
    }

    /// Identity provider that never answers password sign-ins.
    #[derive(Clone, Default)]
    struct HangingIdentity(MemoryIdentityProvider);

    impl IdentityProvider for HangingIdentity {
        async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<Identity, AuthError> {
            std::future::pending().await
        }

        async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
            self.0.create_account(email, password).await
        }

        async fn sign_in_with_federated_credential(
            &self,
            credential: &FederatedCredential,
        ) -> Result<Identity, AuthError> {
            self.0.sign_in_with_federated_credential(credential).await
        }

        async fn delete_current_account(&self) -> Result<(), AuthError> {
            self.0.delete_current_account().await
        }

        fn sign_out(&self) {
            self.0.sign_out()
        }

        fn current_uid(&self) -> Option<String> {
            self.0.current_uid()
        }
    }

    /// Identity provider whose password sign-ins finish after a per-email delay.
    #[derive(Clone, Default)]
    struct DelayedIdentity {
        inner: MemoryIdentityProvider,
        delays: Arc<Mutex<HashMap<String, Duration>>>,
    }

    impl DelayedIdentity {
        fn delay(&self, email: &str, delay: Duration) {
            self.delays.lock().unwrap().insert(email.to_string(), delay);
        }
    }

    impl IdentityProvider for DelayedIdentity {
        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Identity, AuthError> {
            let delay = self.delays.lock().unwrap().get(email).copied().unwrap_or_default();
            tokio::time::sleep(delay).await;
            self.inner.sign_in_with_password(email, password).await
        }

        async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
            self.inner.create_account(email, password).await
        }

        async fn sign_in_with_federated_credential(
            &self,
            credential: &FederatedCredential,
        ) -> Result<Identity, AuthError> {
            self.inner.sign_in_with_federated_credential(credential).await
        }

        async fn delete_current_account(&self) -> Result<(), AuthError> {
            self.inner.delete_current_account().await
        }

        fn sign_out(&self) {
            self.inner.sign_out()
        }

        fn current_uid(&self) -> Option<String> {
            self.inner.current_uid()
        }
    }

    type Session = AuthSession<MemoryIdentityProvider, FakeFederated, ProfileRepository<MemoryStore>>;

    fn session(federated: FakeFederated) -> (Session, MemoryStore) {
        let store = MemoryStore::new();
        let session = AuthSession::new(
            MemoryIdentityProvider::default(),
            federated,
            ProfileRepository::new(store.clone()),
        );
        (session, store)
    }

    fn redirect(code: &str) -> ProviderResult {
        ProviderResult {
            code: code.into(),
            state: "s".into(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login_with_same_role() {
        let (auth, _) = session(FakeFederated::default());
        let signed_up = auth
            .signup("a@x.com", "pw1pw1", "Asha", Role::Citizen)
            .await
            .unwrap();
        assert!(signed_up.created);
        assert_eq!(signed_up.message(), "Signup Successful");

        let logged_in = auth.login("a@x.com", "pw1pw1", Role::Citizen).await.unwrap();
        assert_eq!(logged_in.uid, signed_up.uid);
        assert_eq!(logged_in.message(), "Login Successful");
        assert_eq!(auth.state(), AuthState::Success);
    }

    #[tokio::test]
    async fn test_role_mismatch_scenario() {
        let (auth, _) = session(FakeFederated::default());
        auth.signup("a@x.com", "pw1pw1", "Asha", Role::Citizen)
            .await
            .unwrap();
        auth.logout().await;

        let err = auth
            .login("a@x.com", "pw1pw1", Role::Lawyer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::RoleMismatch {
                stored: Role::Citizen
            }
        );
        assert!(auth.current_uid().is_none());
        assert!(matches!(auth.state(), AuthState::Error(_)));

        auth.login("a@x.com", "pw1pw1", Role::Citizen).await.unwrap();
        assert!(auth.current_uid().is_some());
    }

    #[tokio::test]
    async fn test_login_without_profile_succeeds() {
        let (auth, _) = session(FakeFederated::default());
        auth.identity()
            .create_account("legacy@x.com", "pw1pw1")
            .await
            .unwrap();
        auth.identity().sign_out();

        let success = auth
            .login("legacy@x.com", "pw1pw1", Role::Lawyer)
            .await
            .unwrap();
        assert!(success.profile.is_none());
        assert_eq!(auth.current_role().await, Role::Citizen);
    }

    #[tokio::test]
    async fn test_login_reads_capitalised_stored_role() {
        let (auth, store) = session(FakeFederated::default());
        let created = auth
            .signup("d@x.com", "pw1pw1", "Dev", Role::Lawyer)
            .await
            .unwrap();
        store
            .set(
                "users",
                &created.uid,
                serde_json::json!({ "uid": created.uid, "name": "Dev", "email": "d@x.com", "role": "Lawyer" }),
            )
            .await
            .unwrap();

        auth.login("d@x.com", "pw1pw1", Role::Lawyer).await.unwrap();
        assert_eq!(auth.current_role().await, Role::Lawyer);
    }

    #[tokio::test]
    async fn test_wrong_password_keeps_session_closed() {
        let (auth, _) = session(FakeFederated::default());
        auth.signup("a@x.com", "pw1pw1", "Asha", Role::Citizen)
            .await
            .unwrap();
        auth.logout().await;

        assert_eq!(
            auth.login("a@x.com", "wrong1", Role::Citizen).await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(auth.current_uid().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_signup() {
        let (auth, _) = session(FakeFederated::default());
        auth.signup("a@x.com", "pw1pw1", "Asha", Role::Citizen)
            .await
            .unwrap();
        assert_eq!(
            auth.signup("a@x.com", "pw2pw2", "Other", Role::Lawyer).await,
            Err(AuthError::AccountAlreadyExists)
        );
    }

    #[tokio::test]
    async fn test_input_validation() {
        let (auth, _) = session(FakeFederated::default());
        assert!(matches!(
            auth.login(" ", "pw1pw1", Role::Citizen).await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.signup("not-an-email", "pw1pw1", "Asha", Role::Citizen).await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.signup("a@x.com", "pw1", "Asha", Role::Citizen).await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.signup("a@x.com", "pw1pw1", "  ", Role::Citizen).await,
            Err(AuthError::InvalidInput(_))
        ));
        assert_eq!(auth.identity().account_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signup_rolls_back_when_profile_write_fails() {
        let identity = MemoryIdentityProvider::default();
        let auth = AuthSession::new(identity.clone(), FakeFederated::default(), ReadOnlyProfiles);

        let err = auth
            .signup("a@x.com", "pw1pw1", "Asha", Role::Citizen)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProfilePersistenceFailed(_)));
        assert!(identity.current_uid().is_none());
        assert_eq!(identity.account_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let (auth, _) = session(FakeFederated::default());
        let mut states = auth.subscribe();
        assert_eq!(*states.borrow_and_update(), AuthState::Idle);

        auth.signup("a@x.com", "pw1pw1", "Asha", Role::Citizen)
            .await
            .unwrap();
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), AuthState::Success);

        auth.logout().await;
        assert_eq!(auth.state(), AuthState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_published_before_work() {
        let auth = AuthSession::new(
            HangingIdentity::default(),
            FakeFederated::default(),
            ProfileRepository::new(MemoryStore::new()),
        );
        let mut states = auth.subscribe();

        let login = auth.login("a@x.com", "pw1pw1", Role::Citizen);
        tokio::pin!(login);
        tokio::select! {
            biased;
            _ = &mut login => panic!("login finished early"),
            changed = states.changed() => changed.unwrap(),
        }
        assert_eq!(*states.borrow(), AuthState::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_times_out() {
        let auth = AuthSession::new(
            HangingIdentity::default(),
            FakeFederated::default(),
            ProfileRepository::new(MemoryStore::new()),
        )
        .with_timeout(Duration::from_secs(30));

        assert_eq!(
            auth.login("a@x.com", "pw1pw1", Role::Citizen).await,
            Err(AuthError::Timeout)
        );
        assert_eq!(auth.state(), AuthState::Error("Request timed out".into()));
    }

    #[tokio::test]
    async fn test_federated_scenario() {
        let federated = FakeFederated::default().with_user("code-1", "g-1", Some("Dev Sharma"));
        let (auth, store) = session(federated.clone());

        let first = auth
            .complete_federated_sign_in(&redirect("code-1"), Role::Lawyer)
            .await
            .unwrap();
        assert!(first.created);
        assert_eq!(first.message(), "Account Created as lawyer");
        let profile = first.profile.clone().unwrap();
        assert_eq!(profile.role, Role::Lawyer);
        assert_eq!(profile.name, "Dev Sharma");
        let stored_before = store.get("users", &first.uid).await.unwrap();

        auth.logout().await;
        let again = auth
            .complete_federated_sign_in(&redirect("code-1"), Role::Lawyer)
            .await
            .unwrap();
        assert!(!again.created);
        assert_eq!(again.message(), "Welcome back");
        assert_eq!(again.uid, first.uid);
        assert_eq!(store.get("users", &first.uid).await.unwrap(), stored_before);

        auth.logout().await;
        let revocations = federated.revocations();
        let err = auth
            .complete_federated_sign_in(&redirect("code-1"), Role::Citizen)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::RoleMismatch {
                stored: Role::Lawyer
            }
        );
        assert!(auth.current_uid().is_none());
        assert_eq!(federated.revocations(), revocations + 1);
        assert_eq!(store.get("users", &first.uid).await.unwrap(), stored_before);
    }

    #[tokio::test]
    async fn test_federated_name_fallback() {
        let federated = FakeFederated::default().with_user("code-2", "g-2", None);
        let (auth, _) = session(federated);

        let success = auth
            .complete_federated_sign_in(&redirect("code-2"), Role::Citizen)
            .await
            .unwrap();
        let profile = success.profile.unwrap();
        assert_eq!(profile.name, "Google User");
        assert_eq!(profile.email, "g-2@gmail.com");
        assert_eq!(profile.role, Role::Citizen);
    }

    #[tokio::test]
    async fn test_federated_profile_write_failure_signs_out() {
        let federated = FakeFederated::default().with_user("code-3", "g-3", Some("Meera"));
        let identity = MemoryIdentityProvider::default();
        let auth = AuthSession::new(identity.clone(), federated, ReadOnlyProfiles);

        assert!(matches!(
            auth.complete_federated_sign_in(&redirect("code-3"), Role::Citizen)
                .await,
            Err(AuthError::ProfilePersistenceFailed(_))
        ));
        assert!(identity.current_uid().is_none());
    }

    #[tokio::test]
    async fn test_rejected_provider_result() {
        let (auth, _) = session(FakeFederated::default());
        assert_eq!(
            auth.complete_federated_sign_in(&redirect("unknown"), Role::Citizen)
                .await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(auth.current_uid().is_none());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent_and_resets_chooser() {
        let federated = FakeFederated::default().with_user("code-4", "g-4", Some("Ravi"));
        let (auth, _) = session(federated.clone());

        auth.logout().await;
        auth.logout().await;
        assert_eq!(federated.revocations(), 0);

        auth.complete_federated_sign_in(&redirect("code-4"), Role::Citizen)
            .await
            .unwrap();
        auth.logout().await;
        assert_eq!(federated.revocations(), 1);
        auth.logout().await;
        assert_eq!(federated.revocations(), 1);
        assert!(auth.current_uid().is_none());
    }

    #[test]
    fn test_begin_federated_sign_in_delegates() {
        let (auth, _) = session(FakeFederated::default());
        let request = auth.begin_federated_sign_in().unwrap();
        assert_eq!(request.state, "s");
        assert_eq!(auth.state(), AuthState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_logins_last_to_finish_wins() {
        let identity = DelayedIdentity::default();
        let auth = AuthSession::new(
            identity.clone(),
            FakeFederated::default(),
            ProfileRepository::new(MemoryStore::new()),
        );
        let slow = auth
            .signup("slow@x.com", "pw1pw1", "Slow", Role::Citizen)
            .await
            .unwrap();
        auth.logout().await;
        let fast = auth
            .signup("fast@x.com", "pw1pw1", "Fast", Role::Lawyer)
            .await
            .unwrap();
        auth.logout().await;
        identity.delay("slow@x.com", Duration::from_secs(2));
        identity.delay("fast@x.com", Duration::from_secs(1));

        // The fast attempt fails first; the slow one succeeds last and owns the session.
        let (slow_result, fast_result) = tokio::join!(
            auth.login("slow@x.com", "pw1pw1", Role::Citizen),
            auth.login("fast@x.com", "pw1pw1", Role::Citizen),
        );
        assert_eq!(slow_result.unwrap().uid, slow.uid);
        assert_eq!(
            fast_result,
            Err(AuthError::RoleMismatch {
                stored: Role::Lawyer
            })
        );
        assert_eq!(auth.state(), AuthState::Success);
        assert_eq!(auth.current_uid(), Some(slow.uid.clone()));

        auth.logout().await;

        // Reversed: the fast attempt succeeds, the slow one fails last and signs out.
        let (slow_result, fast_result) = tokio::join!(
            auth.login("slow@x.com", "pw1pw1", Role::Lawyer),
            auth.login("fast@x.com", "pw1pw1", Role::Lawyer),
        );
        assert_eq!(fast_result.unwrap().uid, fast.uid);
        assert_eq!(
            slow_result,
            Err(AuthError::RoleMismatch {
                stored: Role::Citizen
            })
        );
        assert_eq!(
            auth.state(),
            AuthState::Error("Access denied: this account is registered as citizen".into())
        );
        assert!(auth.current_uid().is_none());
    }
}
