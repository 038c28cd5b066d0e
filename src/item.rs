//! Identifiers of CalDAV items

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use url::Url;

use crate::resource::Resource;


/// The URL of an item (e.g. a task) on the server.
///
/// This is enough to update the item later on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemId {
    content: Url,
}
impl ItemId {
    pub fn as_url(&self) -> &Url {
        &self.content
    }
}
impl From<Url> for ItemId {
    fn from(url: Url) -> Self {
        Self { content: url }
    }
}
impl From<&Resource> for ItemId {
    fn from(resource: &Resource) -> Self {
        Self { content: resource.url().clone() }
    }
}
impl FromStr for ItemId {
    type Err = url::ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let u: Url = s.parse()?;
        Ok(Self::from(u))
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}
