//! Schema identifiers
//!
//! An [`Id`] is the URI placed in a schema's `$id` keyword. Root schemas get
//! one derived from the configured base id and the type's display name.

use std::fmt;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

/// Errors returned by [`Id::validate`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The id could not be parsed as an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The URL has no host
    #[error("Missing hostname")]
    MissingHostname,

    /// The host has no dot in it
    #[error("Hostname does not look valid")]
    InvalidHostname,

    /// Nothing follows the host
    #[error("Path is expected")]
    MissingPath,

    /// Only `http` and `https` are accepted
    #[error("Unexpected scheme: {0}")]
    UnexpectedScheme(String),
}

/// A schema identifier (`$id`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// The empty identifier
    pub const EMPTY: Id = Id(String::new());

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a path segment to the base of this id
    pub fn add(&self, path: &str) -> Id {
        let base = self.base();
        if path.starts_with('/') {
            Id(format!("{}{}", base.0, path))
        } else {
            Id(format!("{}/{}", base.0, path))
        }
    }

    /// This id without any fragment and trailing slashes
    pub fn base(&self) -> Id {
        let trimmed = match self.0.rfind('#') {
            Some(index) => &self.0[..index],
            None => self.0.as_str(),
        };
        Id(trimmed.trim_end_matches('/').to_string())
    }

    /// Anchor reference relative to this id's base
    pub fn anchor(&self, name: &str) -> Id {
        Id(format!("{}#{}", self.base().0, name))
    }

    /// Definition reference relative to this id's base
    pub fn def(&self, name: &str) -> Id {
        Id(format!("{}#/$defs/{}", self.base().0, name))
    }

    /// Check that the id looks like a usable absolute `http(s)` URL with a path
    pub fn validate(&self) -> Result<(), IdError> {
        let url =
            url::Url::parse(&self.0).map_err(|error| IdError::InvalidUrl(error.to_string()))?;

        let host = url.host_str().unwrap_or_default();
        if host.is_empty() {
            return Err(IdError::MissingHostname);
        }
        if !host.contains('.') {
            return Err(IdError::InvalidHostname);
        }

        let has_path = self
            .0
            .split_once("://")
            .is_some_and(|(_, rest)| rest.contains('/'));
        if !has_path {
            return Err(IdError::MissingPath);
        }

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(IdError::UnexpectedScheme(other.to_string())),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lower-case a type name with dashes between words (`TestUser` becomes `test-user`)
pub fn to_kebab_case(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    name.to_case(Case::Kebab)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_joins_with_single_slash() {
        let id = Id::new("https://example.com/schemas/");
        assert_eq!(id.add("user").as_str(), "https://example.com/schemas/user");
        assert_eq!(id.add("/user").as_str(), "https://example.com/schemas/user");
    }

    #[test]
    fn test_base_drops_fragment() {
        let id = Id::new("https://example.com/schemas/user#/$defs/Address");
        assert_eq!(id.base().as_str(), "https://example.com/schemas/user");
    }

    #[test]
    fn test_anchor_and_def() {
        let id = Id::new("https://example.com/schemas/user");
        assert_eq!(
            id.anchor("Address").as_str(),
            "https://example.com/schemas/user#Address"
        );
        assert_eq!(
            id.def("Address").as_str(),
            "https://example.com/schemas/user#/$defs/Address"
        );
    }

    #[test]
    fn test_validate() {
        assert!(Id::new("https://example.com/schemas").validate().is_ok());
        assert_eq!(
            Id::new("https://localhost/schemas").validate(),
            Err(IdError::InvalidHostname)
        );
        assert_eq!(
            Id::new("https://example.com").validate(),
            Err(IdError::MissingPath)
        );
        assert_eq!(
            Id::new("ftp://example.com/schemas").validate(),
            Err(IdError::UnexpectedScheme("ftp".to_string()))
        );
        assert!(matches!(
            Id::new("not a url").validate(),
            Err(IdError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_to_kebab_case() {
        assert_eq!(to_kebab_case("TestUser"), "test-user");
        assert_eq!(to_kebab_case("Outer"), "outer");
        assert_eq!(to_kebab_case(""), "");
    }
}
