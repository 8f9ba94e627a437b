//! `signup`, `login` and `google`: drive an [`AuthSession`] from the terminal.
//!
//! Firebase backs the accounts when `firebase.api_key` is set, with profiles in
//! the project's Firestore database (`firebase.project_id`), so the stored role is
//! the same on every machine. Otherwise accounts and profiles are kept offline in
//! the data directory, and a later `login` finds what `signup` created there.

use std::path::PathBuf;

use api::auth::{FirebaseAuth, GoogleOAuth, LocalIdentityProvider, OAuthConfig, ProviderResult};
use api::{
    AuthSession, AuthSuccess, FederatedProvider, FirestoreStore, IdentityProvider,
    ProfileRepository, ProfileStore, Role, Settings,
};
use store::FileStore;
use tokio::io::{AsyncBufReadExt, BufReader};

pub enum Action {
    Signup {
        email: String,
        password: String,
        name: String,
        role: Role,
    },
    Login {
        email: String,
        password: String,
        role: Role,
    },
    Google {
        role: Role,
    },
}

pub async fn run(settings: &Settings, action: Action) -> anyhow::Result<()> {
    let success = authenticate(settings, action).await?;
    println!("{}", success.message());
    if let Some(profile) = &success.profile {
        let tabs: Vec<&str> = profile.role.tabs().iter().map(|t| t.title()).collect();
        println!(
            "{} <{}> ({})\nSections: {}",
            profile.display_name(),
            profile.email,
            profile.role,
            tabs.join(", ")
        );
    }
    Ok(())
}

async fn authenticate(settings: &Settings, action: Action) -> anyhow::Result<AuthSuccess> {
    let google = if settings.google.client_id.trim().is_empty() {
        None
    } else {
        Some(GoogleOAuth::new(OAuthConfig::google(&settings.google)?)?)
    };
    let timeout = settings.auth.timeout();

    if settings.firebase.is_configured() {
        let identity = FirebaseAuth::new(&settings.firebase, timeout)?;
        let firestore = FirestoreStore::new(&settings.firebase, Some(identity.clone()), timeout)?;
        let profiles = ProfileRepository::new(firestore);
        let auth = AuthSession::new(identity, google, profiles).with_timeout(timeout);
        execute(&auth, action).await
    } else {
        tracing::info!(data_dir = %settings.store.data_dir, "using offline accounts");
        let store = FileStore::new(PathBuf::from(&settings.store.data_dir));
        let profiles = ProfileRepository::new(store.clone());
        let identity = LocalIdentityProvider::new(store);
        let auth = AuthSession::new(identity, google, profiles).with_timeout(timeout);
        execute(&auth, action).await
    }
}

async fn execute<I, F, P>(auth: &AuthSession<I, F, P>, action: Action) -> anyhow::Result<AuthSuccess>
where
    I: IdentityProvider,
    F: FederatedProvider,
    P: ProfileStore,
{
    let success = match action {
        Action::Signup {
            email,
            password,
            name,
            role,
        } => auth.signup(&email, &password, &name, role).await?,
        Action::Login {
            email,
            password,
            role,
        } => auth.login(&email, &password, role).await?,
        Action::Google { role } => {
            let request = auth.begin_federated_sign_in()?;
            println!("Open this URL in a browser and sign in:\n\n{}\n", request.url);
            println!("Then paste the URL you were redirected to:");
            let mut line = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut line)
                .await?;
            let result = ProviderResult::from_redirect_url(line.trim())?;
            auth.complete_federated_sign_in(&result, role).await?
        }
    };
    Ok(success)
}
