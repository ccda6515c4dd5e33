pub const DEFAULT_SITE_URL: &str = "https://moontimers.com/dd";

/// English ordinal suffix: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st ...
pub fn ordinal(n: u64) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Builds the acknowledgment posted under a triggering comment.
#[derive(Debug, Clone)]
pub struct ReplyComposer {
    site_url: String,
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL)
    }
}

impl ReplyComposer {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }

    pub fn compose(&self, author: &str, count: Option<u64>) -> String {
        let mut message = format!(
            "🤖 *Beep boop!  I'm a robot.*\n\n\
             > This DD post has been added to\n\
             > [🌕MoonTimers.com]({})\n",
            self.site_url
        );

        if let Some(n) = count {
            message.push_str(&format!(
                "\n> It is the {} DD post by u/{} on MoonTimers.\n",
                ordinal(n),
                author
            ));
        }
        message
    }
}
