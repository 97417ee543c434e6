//! Dependencies discovered while converting values to portable form.

use serde::Serialize;

use crate::model::Udi;

/// How strictly a dependency must be satisfied in the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyMode {
    /// The entity must exist; its version is irrelevant.
    MustExist,
    /// The entity must be identical to what was observed at export time.
    MustMatch,
}

/// A declaration that a converted value relies on another entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    /// The entity depended upon.
    pub udi: Udi,
    /// Whether the entity must be deployed before the item that owns the value.
    pub ordering: bool,
    pub mode: DependencyMode,
    /// Hex SHA-256 of the entity's content, for content-addressed files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Dependency {
    /// Creates an unordered `MustExist` dependency.
    pub fn exists(udi: Udi) -> Self {
        Self {
            udi,
            ordering: false,
            mode: DependencyMode::MustExist,
            checksum: None,
        }
    }

    /// Creates an unordered `MustMatch` dependency.
    pub fn matches(udi: Udi) -> Self {
        Self {
            udi,
            ordering: false,
            mode: DependencyMode::MustMatch,
            checksum: None,
        }
    }

    /// Marks the dependency as one that must be deployed first.
    pub fn ordered(mut self) -> Self {
        self.ordering = true;
        self
    }

    /// Attaches a content checksum.
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::model::ObjectType;

    #[test]
    fn test_constructors() {
        let udi = Udi::for_object(ObjectType::Document, Uuid::from_u128(7));
        let dep = Dependency::exists(udi.clone());
        assert_eq!(dep.mode, DependencyMode::MustExist);
        assert!(!dep.ordering);

        let dep = Dependency::matches(udi).ordered().with_checksum("abc");
        assert_eq!(dep.mode, DependencyMode::MustMatch);
        assert!(dep.ordering);
        assert_eq!(dep.checksum.as_deref(), Some("abc"));
    }

    #[test]
    fn test_serialize() {
        let dep = Dependency::matches(Udi::media_file("1001/a.jpg")).ordered();
        let json = serde_json::to_value(&dep).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "udi": "umb://media-file/1001/a.jpg",
                "ordering": true,
                "mode": "must-match",
            })
        );
    }
}
