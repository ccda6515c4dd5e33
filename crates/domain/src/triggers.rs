pub const DEFAULT_TRIGGERS: [&str; 2] = ["!moontimer", "!moontimers"];

/// Phrases that start the pipeline when found anywhere in a comment body.
#[derive(Debug, Clone)]
pub struct TriggerSet {
    phrases: Vec<String>,
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS)
    }
}

impl TriggerSet {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn matches(&self, body: &str) -> bool {
        let body = body.to_lowercase();
        self.phrases.iter().any(|p| body.contains(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
