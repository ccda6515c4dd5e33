use domain::{Comment, Post};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

pub(crate) const KIND_COMMENT: &str = "t1";
pub(crate) const KIND_POST: &str = "t3";

#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    pub kind: String,
    pub data: T,
}

impl<T> Listing<T> {
    /// Drops children of any other kind (`more` stubs and the like).
    pub fn into_kind<'a>(self, kind: &'a str) -> impl Iterator<Item = T> + 'a
    where
        T: 'a,
    {
        self.data
            .children
            .into_iter()
            .filter(move |t| t.kind == kind)
            .map(|t| t.data)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub link_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subreddit: String,
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Comment {
            id: raw.id,
            name: raw.name,
            body: raw.body,
            link_id: raw.link_id,
            author: raw.author,
            subreddit: raw.subreddit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPost {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created_utc: f64,
    pub link_flair_text: Option<String>,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "score")]
    pub ups: i64,
    #[serde(default)]
    pub subreddit: String,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Post {
            id: raw.id,
            author: raw.author,
            created_utc: raw.created_utc,
            link_flair_text: raw.link_flair_text,
            selftext: raw.selftext,
            title: raw.title,
            url: raw.url,
            ups: raw.ups,
            subreddit: raw.subreddit,
        }
    }
}

/// Scores show up as JSON numbers, occasionally as strings; both are read as
/// base-10 integers.
fn score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| de::Error::custom(format!("score out of range: {}", n))),
        Value::String(s) => i64::from_str_radix(s.trim(), 10)
            .map_err(|e| de::Error::custom(format!("invalid score '{}': {}", s, e))),
        other => Err(de::Error::custom(format!("unexpected score value: {}", other))),
    }
}
