use api::auth::IdentityProvider;
use api::models::CaseFile;
use api::repository::CaseRepository;
use api::RepositoryError;
use store::DocumentStore;
use tokio::sync::watch;

/// The lawyer's case dashboard.
pub struct CaseDashboardViewModel<S, I> {
    repository: CaseRepository<S>,
    identity: I,
    cases: watch::Sender<Vec<CaseFile>>,
    is_loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
}

impl<S: DocumentStore, I: IdentityProvider> CaseDashboardViewModel<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self {
            repository: CaseRepository::new(store),
            identity,
            cases: watch::Sender::new(Vec::new()),
            is_loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
        }
    }

    pub fn cases(&self) -> watch::Receiver<Vec<CaseFile>> {
        self.cases.subscribe()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    fn report(&self, result: Result<(), RepositoryError>) {
        match result {
            Ok(()) => {
                self.error.send_replace(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "case dashboard");
                self.error.send_replace(Some(e.to_string()));
            }
        }
    }

    fn uid(&self) -> Result<String, RepositoryError> {
        self.identity
            .current_uid()
            .ok_or(RepositoryError::NotSignedIn)
    }

    async fn refresh(&self) -> Result<(), RepositoryError> {
        let uid = self.uid()?;
        let cases = self.repository.list(&uid).await?;
        self.cases.send_replace(cases);
        Ok(())
    }

    pub async fn load_cases(&self) {
        self.is_loading.send_replace(true);
        let result = self.refresh().await;
        self.report(result);
        self.is_loading.send_replace(false);
    }

    pub async fn add_case(
        &self,
        client: &str,
        number: &str,
        court: &str,
        date: &str,
        notes: &str,
    ) {
        let result = async {
            let uid = self.uid()?;
            self.repository
                .add(&uid, CaseFile::new(client, number, court, date, notes))
                .await?;
            self.refresh().await
        }
        .await;
        self.report(result);
    }

    pub async fn delete_case(&self, case_id: &str) {
        let result = async {
            let uid = self.uid()?;
            self.repository.delete(&uid, case_id).await?;
            self.refresh().await
        }
        .await;
        self.report(result);
    }
}
