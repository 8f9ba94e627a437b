use store::{new_document_id, Direction, Document, DocumentStore, Query, StoreError};

use crate::error::RepositoryError;
use crate::models::CaseFile;

fn cases_path(uid: &str) -> String {
    format!("users/{uid}/cases")
}

fn decode_case(doc: &Document) -> Result<CaseFile, StoreError> {
    let mut case: CaseFile = doc.decode()?;
    case.id = doc.id.clone();
    Ok(case)
}

/// A lawyer's tracked cases.
#[derive(Debug, Clone)]
pub struct CaseRepository<S> {
    store: S,
}

impl<S: DocumentStore> CaseRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Store a new case under a fresh id and return it with the id set.
    pub async fn add(&self, uid: &str, mut case: CaseFile) -> Result<CaseFile, RepositoryError> {
        case.id = new_document_id();
        let data = serde_json::to_value(&case).map_err(StoreError::from)?;
        self.store.set(&cases_path(uid), &case.id, data).await?;
        tracing::debug!(uid, case = %case.id, "case added");
        Ok(case)
    }

    /// Cases ordered by next hearing date, soonest first.
    pub async fn list(&self, uid: &str) -> Result<Vec<CaseFile>, RepositoryError> {
        let query = Query::new().order_by("nextHearingDate", Direction::Ascending);
        let docs = self.store.query(&cases_path(uid), &query).await?;
        docs.iter()
            .map(|doc| decode_case(doc).map_err(RepositoryError::from))
            .collect()
    }

    pub async fn delete(&self, uid: &str, case_id: &str) -> Result<(), RepositoryError> {
        self.store.delete(&cases_path(uid), case_id).await?;
        Ok(())
    }
}
