use crate::models::{Post, SubmissionPayload};
use std::fmt;

pub const DEFAULT_REQUIRED_MARKER: &str = "DD";
pub const DEFAULT_MIN_SCORE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Flair missing or without the required marker.
    WrongCategory { tag: Option<String> },
    InsufficientScore { score: i64, minimum: i64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::WrongCategory { tag: Some(tag) } => write!(f, "Wrong flair: {}", tag),
            RejectReason::WrongCategory { tag: None } => write!(f, "Wrong flair: <none>"),
            RejectReason::InsufficientScore { score, .. } => {
                write!(f, "Not enough upvotes: {}", score)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(SubmissionPayload),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub required_marker: String,
    pub min_score: i64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            required_marker: DEFAULT_REQUIRED_MARKER.to_string(),
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl ValidationRules {
    pub fn new(required_marker: impl Into<String>, min_score: i64) -> Self {
        Self {
            required_marker: required_marker.into(),
            min_score,
        }
    }

    /// Flair is checked before score; the first failing check is reported.
    pub fn evaluate(&self, post: &Post) -> Verdict {
        let tag_ok = post
            .link_flair_text
            .as_deref()
            .is_some_and(|tag| tag.contains(&self.required_marker));
        if !tag_ok {
            return Verdict::Rejected(RejectReason::WrongCategory {
                tag: post.link_flair_text.clone(),
            });
        }

        if post.ups < self.min_score {
            return Verdict::Rejected(RejectReason::InsufficientScore {
                score: post.ups,
                minimum: self.min_score,
            });
        }

        Verdict::Accepted(SubmissionPayload::from_validated(post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(flair: Option<&str>, ups: i64) -> Post {
        Post {
            id: "n2xk4q".into(),
            author: "DeepValue".into(),
            created_utc: 1_620_000_000.0,
            link_flair_text: flair.map(str::to_string),
            selftext: "## Thesis\n\nThe float is **locked**. Source: https://sec.gov/filing".into(),
            title: "A".repeat(300),
            url: "https://www.reddit.com/r/GME/comments/n2xk4q/".into(),
            ups,
            subreddit: "GME".into(),
        }
    }

    #[test]
    fn wrong_flair_rejects_regardless_of_score() {
        let rules = ValidationRules::default();
        for ups in [0, 10, 10_000] {
            let verdict = rules.evaluate(&post(Some("Discussion"), ups));
            assert_eq!(
                verdict,
                Verdict::Rejected(RejectReason::WrongCategory {
                    tag: Some("Discussion".into())
                })
            );
        }
        assert!(!rules.evaluate(&post(None, 500)).is_accepted());
    }

    #[test]
    fn marker_match_is_case_sensitive() {
        let rules = ValidationRules::default();
        assert!(!rules.evaluate(&post(Some("dd analysis"), 50)).is_accepted());
    }

    #[test]
    fn low_score_rejects_regardless_of_flair() {
        let rules = ValidationRules::default();
        for flair in ["DD Analysis", "📚 Possible DD", "Discussion"] {
            let verdict = rules.evaluate(&post(Some(flair), 9));
            assert!(!verdict.is_accepted(), "flair {flair} with 9 ups passed");
        }
        assert_eq!(
            rules.evaluate(&post(Some("DD"), 9)),
            Verdict::Rejected(RejectReason::InsufficientScore { score: 9, minimum: 10 })
        );
    }

    #[test]
    fn accepted_post_yields_sanitized_payload() {
        let rules = ValidationRules::default();
        let payload = match rules.evaluate(&post(Some("DD Analysis"), 10)) {
            Verdict::Accepted(p) => p,
            other => panic!("expected acceptance, got {:?}", other),
        };

        assert_eq!(payload.id(), "n2xk4q");
        assert_eq!(payload.selftext(), "Thesis\n\nThe float is locked. Source:");
        assert_eq!(payload.title().chars().count(), 256);

        let json = serde_json::to_value(&payload).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["author", "created_utc", "id", "selftext", "subreddit", "title", "url"]
        );
    }

    #[test]
    fn reasons_render_for_logs() {
        let r = RejectReason::InsufficientScore { score: 3, minimum: 10 };
        assert_eq!(r.to_string(), "Not enough upvotes: 3");
        let r = RejectReason::WrongCategory { tag: None };
        assert_eq!(r.to_string(), "Wrong flair: <none>");
    }
}
