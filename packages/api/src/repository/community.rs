use store::{new_document_id, Direction, Document, DocumentStore, Query, StoreError};

use super::{require, Live};
use crate::error::RepositoryError;
use crate::models::{ForumAnswer, ForumPost, LawyerProfile, Role, UserProfile};
use crate::profiles::{ProfileRepository, ProfileStore};

pub const FORUM_POSTS: &str = "forum_posts";
/// Answer author name when the lawyer's profile has none.
pub const FORUM_ANSWER_NAME_FALLBACK: &str = "Legal Expert";

fn decode_post(doc: &Document) -> Result<ForumPost, StoreError> {
    let mut post: ForumPost = doc.decode()?;
    post.id = doc.id.clone();
    Ok(post)
}

fn decode_lawyer(doc: &Document) -> Result<LawyerProfile, StoreError> {
    let mut lawyer: LawyerProfile = doc.decode()?;
    if lawyer.uid.is_empty() {
        lawyer.uid = doc.id.clone();
    }
    Ok(lawyer)
}

fn newest_first() -> Query {
    Query::new().order_by("timestamp", Direction::Descending)
}

/// Lawyer directory and the question forum.
#[derive(Debug, Clone)]
pub struct CommunityRepository<S> {
    store: S,
    profiles: ProfileRepository<S>,
}

impl<S: DocumentStore + Clone> CommunityRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            profiles: ProfileRepository::new(store.clone()),
            store,
        }
    }

    pub async fn lawyers(&self) -> Result<Vec<LawyerProfile>, RepositoryError> {
        let docs = self.profiles.with_role(Role::Lawyer).await?;
        docs.iter()
            .map(|doc| decode_lawyer(doc).map_err(RepositoryError::from))
            .collect()
    }

    /// Forum posts, newest first.
    pub async fn posts(&self) -> Result<Vec<ForumPost>, RepositoryError> {
        let docs = self.store.query(FORUM_POSTS, &newest_first()).await?;
        docs.iter()
            .map(|doc| decode_post(doc).map_err(RepositoryError::from))
            .collect()
    }

    pub async fn subscribe_posts(&self) -> Result<Live<ForumPost>, RepositoryError> {
        let subscription = self.store.subscribe(FORUM_POSTS).await?;
        Ok(Live::new(subscription, newest_first(), decode_post))
    }

    pub async fn create_post(
        &self,
        author_id: &str,
        title: &str,
        description: &str,
    ) -> Result<ForumPost, RepositoryError> {
        require(title, "title")?;
        let post = ForumPost {
            id: new_document_id(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            author_id: author_id.to_string(),
            answers: Vec::new(),
        };
        let data = serde_json::to_value(&post).map_err(StoreError::from)?;
        self.store.set(FORUM_POSTS, &post.id, data).await?;
        tracing::info!(post = %post.id, author_id, "forum post created");
        Ok(post)
    }

    /// Append an answer by the lawyer `uid` to a post.
    ///
    /// The update rewrites the whole post; concurrent answers may overwrite each
    /// other.
    pub async fn add_answer(
        &self,
        uid: &str,
        post_id: &str,
        content: &str,
    ) -> Result<ForumPost, RepositoryError> {
        require(content, "answer")?;
        let author = self.answering_lawyer(uid).await?;

        let data = self
            .store
            .get(FORUM_POSTS, post_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("forum post {post_id}")))?;
        let mut post = decode_post(&Document::new(post_id, data))?;

        let lawyer_name = if author.name.trim().is_empty() {
            FORUM_ANSWER_NAME_FALLBACK.to_string()
        } else {
            author.name
        };
        post.answers.push(ForumAnswer {
            lawyer_name,
            content: content.trim().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        });

        let data = serde_json::to_value(&post).map_err(StoreError::from)?;
        self.store.set(FORUM_POSTS, post_id, data).await?;
        tracing::info!(post = post_id, uid, "forum answer added");
        Ok(post)
    }

    async fn answering_lawyer(&self, uid: &str) -> Result<UserProfile, RepositoryError> {
        match self.profiles.get(uid).await? {
            Some(profile) if profile.role.can_answer_forum() => Ok(profile),
            Some(_) => Err(RepositoryError::Forbidden(
                "only lawyers can answer forum questions".to_string(),
            )),
            None => Err(RepositoryError::Forbidden(format!("no profile for {uid}"))),
        }
    }
}
