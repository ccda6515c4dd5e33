use domain::{ValidationRules, Verdict};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::traits::ForumClient;

pub struct PostValidator {
    forum: Arc<dyn ForumClient>,
    rules: ValidationRules,
}

impl PostValidator {
    pub fn new(forum: Arc<dyn ForumClient>, rules: ValidationRules) -> Self {
        Self { forum, rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// A fetch failure is an error, a failed check is a `Rejected` verdict.
    pub async fn validate(&self, post_id: &str) -> Result<Verdict, FetchError> {
        let post = self
            .forum
            .fetch_post(post_id)
            .await
            .map_err(|source| FetchError {
                post_id: post_id.to_string(),
                source,
            })?;

        let verdict = self.rules.evaluate(&post);
        match &verdict {
            Verdict::Rejected(reason) => info!(post = %post.id, "{}", reason),
            Verdict::Accepted(_) => debug!(
                post = %post.id,
                created_at = ?post.created_at(),
                ups = post.ups,
                "Post passed validation"
            ),
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_post, FakeForum};
    use domain::RejectReason;

    #[tokio::test]
    async fn accepts_tagged_popular_post() {
        let forum = Arc::new(FakeForum::with_post(sample_post("DD Analysis", 15)));
        let validator = PostValidator::new(forum.clone(), ValidationRules::default());

        let verdict = validator.validate("t3_p1").await.unwrap();
        assert!(verdict.is_accepted());
        assert_eq!(forum.fetches(), vec!["t3_p1".to_string()]);
    }

    #[tokio::test]
    async fn reports_rejection_reason() {
        let forum = Arc::new(FakeForum::with_post(sample_post("Meme", 500)));
        let validator = PostValidator::new(forum, ValidationRules::default());

        let verdict = validator.validate("p1").await.unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected(RejectReason::WrongCategory {
                tag: Some("Meme".into())
            })
        );
    }

    #[tokio::test]
    async fn custom_threshold_is_honoured() {
        let forum = Arc::new(FakeForum::with_post(sample_post("DD", 15)));
        let validator = PostValidator::new(forum, ValidationRules::new("DD", 100));

        let verdict = validator.validate("p1").await.unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected(RejectReason::InsufficientScore { score: 15, minimum: 100 })
        );
    }

    #[tokio::test]
    async fn missing_post_is_fetch_error() {
        let forum = Arc::new(FakeForum::default());
        let validator = PostValidator::new(forum, ValidationRules::default());

        let err = validator.validate("t3_gone").await.unwrap_err();
        assert_eq!(err.post_id, "t3_gone");
    }
}
