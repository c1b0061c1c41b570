use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{EddyError, Result};

/// A post whose comment feed should be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostRef {
    url: Url,
}

impl PostRef {
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(EddyError::InvalidPost(format!(
                "unsupported scheme '{}' in {}",
                other, input
            ))),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Filesystem-safe name derived from the URL, used for per-post output files.
    pub fn file_stem(&self) -> String {
        let raw = format!(
            "{}{}",
            self.url.host_str().unwrap_or_default(),
            self.url.path()
        );
        let sanitized: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        sanitized.trim_matches('_').to_string()
    }
}

impl fmt::Display for PostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for PostRef {
    type Err = EddyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostRef {
    type Error = EddyError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PostRef> for String {
    fn from(post: PostRef) -> Self {
        post.url.into()
    }
}
