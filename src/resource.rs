use std::fmt::{Debug, Formatter};

use url::Url;

/// Just a wrapper around a URL and credentials
#[derive(Clone)]
pub struct Resource {
    url: Url,
    username: String,
    password: String,
}

impl Resource {
    pub fn new(url: Url, username: String, password: String) -> Self {
        Self { url, username, password }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn username(&self) -> &str { &self.username }
    pub fn password(&self) -> &str { &self.password }

    /// Build a new Resource by keeping the same credentials but pointing to `href`.
    ///
    /// `href` is resolved against the current URL, so that it can either be absolute, or a path on the same server.
    pub fn combine(&self, href: &str) -> Result<Resource, url::ParseError> {
        let url = self.url.join(href)?;
        Ok(Resource {
            url,
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .finish()
    }
}
