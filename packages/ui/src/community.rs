use api::auth::IdentityProvider;
use api::client::LawAssistant;
use api::models::{default_news, ForumPost, LawyerProfile, NewsArticle};
use api::repository::CommunityRepository;
use api::RepositoryError;
use store::DocumentStore;
use tokio::sync::watch;

/// Lawyer directory, forum and legal news.
pub struct CommunityViewModel<S, I> {
    repository: CommunityRepository<S>,
    identity: I,
    lawyers: watch::Sender<Vec<LawyerProfile>>,
    posts: watch::Sender<Vec<ForumPost>>,
    news: watch::Sender<Vec<NewsArticle>>,
    is_loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
}

impl<S: DocumentStore + Clone, I: IdentityProvider> CommunityViewModel<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self {
            repository: CommunityRepository::new(store),
            identity,
            lawyers: watch::Sender::new(Vec::new()),
            posts: watch::Sender::new(Vec::new()),
            news: watch::Sender::new(default_news()),
            is_loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
        }
    }

    pub fn lawyers(&self) -> watch::Receiver<Vec<LawyerProfile>> {
        self.lawyers.subscribe()
    }

    pub fn posts(&self) -> watch::Receiver<Vec<ForumPost>> {
        self.posts.subscribe()
    }

    pub fn news(&self) -> watch::Receiver<Vec<NewsArticle>> {
        self.news.subscribe()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    fn fail(&self, e: RepositoryError) {
        tracing::warn!(error = %e, "community");
        self.error.send_replace(Some(e.to_string()));
    }

    /// Reload lawyers and posts. Each list keeps its previous value if it fails.
    pub async fn load_all(&self) {
        self.is_loading.send_replace(true);
        self.error.send_replace(None);
        match self.repository.lawyers().await {
            Ok(lawyers) => {
                self.lawyers.send_replace(lawyers);
            }
            Err(e) => self.fail(e),
        }
        match self.repository.posts().await {
            Ok(posts) => {
                self.posts.send_replace(posts);
            }
            Err(e) => self.fail(e),
        }
        self.is_loading.send_replace(false);
    }

    /// Replace the built-in headlines with live ones when the API answers.
    pub async fn refresh_news(&self, assistant: &impl LawAssistant) {
        match assistant.news().await {
            Ok(articles) if !articles.is_empty() => {
                self.news.send_replace(articles);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "keeping built-in news"),
        }
    }

    pub async fn post_question(&self, title: &str, description: &str) {
        let Some(uid) = self.identity.current_uid() else {
            return self.fail(RepositoryError::NotSignedIn);
        };
        if let Err(e) = self.repository.create_post(&uid, title, description).await {
            return self.fail(e);
        }
        self.load_all().await;
    }

    pub async fn answer_question(&self, post_id: &str, answer: &str) {
        let Some(uid) = self.identity.current_uid() else {
            return self.fail(RepositoryError::NotSignedIn);
        };
        if let Err(e) = self.repository.add_answer(&uid, post_id, answer).await {
            return self.fail(e);
        }
        self.load_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAssistant;
    use api::auth::MemoryIdentityProvider;
    use api::models::{Role, UserProfile};
    use api::{ProfileRepository, ProfileStore};
    use store::MemoryStore;

    async fn signed_in(store: &MemoryStore, role: Role) -> MemoryIdentityProvider {
        let identity = MemoryIdentityProvider::default();
        let created = identity
            .create_account(&format!("{role}@x.com"), "pw1pw1")
            .await
            .unwrap();
        ProfileRepository::new(store.clone())
            .put(&UserProfile {
                uid: created.uid,
                name: format!("{role} user"),
                email: format!("{role}@x.com"),
                role,
            })
            .await
            .unwrap();
        identity
    }

    #[tokio::test]
    async fn test_question_and_answer_flow() {
        let store = MemoryStore::new();
        let citizen = CommunityViewModel::new(store.clone(), signed_in(&store, Role::Citizen).await);
        let lawyer = CommunityViewModel::new(store.clone(), signed_in(&store, Role::Lawyer).await);

        citizen
            .post_question("Cheque bounce", "What can I do under NI Act?")
            .await;
        let posts = citizen.posts().borrow().clone();
        assert_eq!(posts.len(), 1);

        citizen.answer_question(&posts[0].id, "Sue them").await;
        assert!(citizen
            .error()
            .borrow()
            .as_deref()
            .unwrap()
            .starts_with("not permitted"));

        lawyer
            .answer_question(&posts[0].id, "Send a demand notice within 30 days.")
            .await;
        assert!(lawyer.error().borrow().is_none());
        let answers = lawyer.posts().borrow()[0].answers.clone();
        assert_eq!(answers[0].lawyer_name, "lawyer user");
        assert_eq!(lawyer.lawyers().borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_signed_out_cannot_post() {
        let vm = CommunityViewModel::new(MemoryStore::new(), MemoryIdentityProvider::default());
        vm.post_question("title", "desc").await;
        assert_eq!(vm.error().borrow().as_deref(), Some("not signed in"));
    }

    #[tokio::test]
    async fn test_news_falls_back_to_built_in_list() {
        let vm = CommunityViewModel::new(MemoryStore::new(), MemoryIdentityProvider::default());
        assert_eq!(vm.news().borrow().len(), 4);

        vm.refresh_news(&FakeAssistant {
            fail: true,
            ..FakeAssistant::default()
        })
        .await;
        assert_eq!(vm.news().borrow()[0].title, "Supreme Court on BNS");

        vm.refresh_news(&FakeAssistant::default()).await;
        assert_eq!(vm.news().borrow()[0].title, "New e-courts rules");
    }
}
