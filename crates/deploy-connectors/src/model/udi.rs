//! Portable entity identifiers (UDIs).
//!
//! A UDI names an entity independently of any repository's numeric id space:
//!
//! ```text
//! umb://document/4fc8b1f2cb3c4b0e9bd02d4f1e2a6c7d   key-addressed
//! umb://media-file/1001/photo.jpg                   path-addressed
//! ```

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Scheme prefix of every UDI.
pub const UDI_SCHEME: &str = "umb://";

/// How entities of a given type are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addressing {
    /// Stable unique key (GUID).
    Key,
    /// Relative path inside a file store.
    Path,
}

/// Entity types that can appear in a UDI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Document,
    Media,
    Member,
    Macro,
    DocumentType,
    MediaType,
    DataType,
    MediaFile,
    TemplateFile,
    Stylesheet,
    Script,
    PartialView,
}

impl EntityType {
    /// Every known entity type.
    pub const ALL: [EntityType; 12] = [
        EntityType::Document,
        EntityType::Media,
        EntityType::Member,
        EntityType::Macro,
        EntityType::DocumentType,
        EntityType::MediaType,
        EntityType::DataType,
        EntityType::MediaFile,
        EntityType::TemplateFile,
        EntityType::Stylesheet,
        EntityType::Script,
        EntityType::PartialView,
    ];

    /// Returns the tag used in the UDI text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Document => "document",
            EntityType::Media => "media",
            EntityType::Member => "member",
            EntityType::Macro => "macro",
            EntityType::DocumentType => "document-type",
            EntityType::MediaType => "media-type",
            EntityType::DataType => "data-type",
            EntityType::MediaFile => "media-file",
            EntityType::TemplateFile => "template-file",
            EntityType::Stylesheet => "stylesheet",
            EntityType::Script => "script",
            EntityType::PartialView => "partial-view",
        }
    }

    /// Looks up an entity type from its UDI tag.
    pub fn from_tag(tag: &str) -> Option<EntityType> {
        EntityType::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Returns whether entities of this type are key- or path-addressed.
    pub fn addressing(&self) -> Addressing {
        match self {
            EntityType::MediaFile
            | EntityType::TemplateFile
            | EntityType::Stylesheet
            | EntityType::Script
            | EntityType::PartialView => Addressing::Path,
            _ => Addressing::Key,
        }
    }

    /// Returns the repository object type this entity type resolves through, if any.
    pub fn object_type(&self) -> Option<ObjectType> {
        match self {
            EntityType::Document => Some(ObjectType::Document),
            EntityType::Media => Some(ObjectType::Media),
            EntityType::Member => Some(ObjectType::Member),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object types the entity service can map between local ids and keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Document,
    Media,
    Member,
}

impl ObjectType {
    /// Returns the UDI entity type for this object type.
    pub fn entity_type(&self) -> EntityType {
        match self {
            ObjectType::Document => EntityType::Document,
            ObjectType::Media => EntityType::Media,
            ObjectType::Member => EntityType::Member,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum UdiId {
    Key(Uuid),
    Path(String),
}

/// A portable reference to an entity.
///
/// The entity type decides whether the identifier is a key or a path; the
/// constructors refuse mismatched combinations so every `Udi` formats to text
/// that [`Udi::parse`] reads back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Udi {
    entity_type: EntityType,
    id: UdiId,
}

impl Udi {
    /// Creates a key-addressed UDI. Returns `None` for path-addressed types.
    pub fn from_key(entity_type: EntityType, key: Uuid) -> Option<Udi> {
        match entity_type.addressing() {
            Addressing::Key => Some(Udi {
                entity_type,
                id: UdiId::Key(key),
            }),
            Addressing::Path => None,
        }
    }

    /// Creates a path-addressed UDI. Returns `None` for key-addressed types.
    pub fn from_path(entity_type: EntityType, path: impl Into<String>) -> Option<Udi> {
        match entity_type.addressing() {
            Addressing::Path => Some(Udi {
                entity_type,
                id: UdiId::Path(path.into()),
            }),
            Addressing::Key => None,
        }
    }

    /// Creates the UDI of an object resolved through the entity service.
    pub fn for_object(object_type: ObjectType, key: Uuid) -> Udi {
        Udi {
            entity_type: object_type.entity_type(),
            id: UdiId::Key(key),
        }
    }

    /// Creates a macro UDI.
    pub fn macro_key(key: Uuid) -> Udi {
        Udi {
            entity_type: EntityType::Macro,
            id: UdiId::Key(key),
        }
    }

    /// Creates a media-file UDI from a path relative to the media root.
    pub fn media_file(path: impl Into<String>) -> Udi {
        Udi {
            entity_type: EntityType::MediaFile,
            id: UdiId::Path(path.into()),
        }
    }

    /// Parses a UDI from its text form.
    ///
    /// Keys are accepted with or without hyphens. Anything else (missing
    /// scheme, unknown entity type, bad key) yields `None`.
    pub fn parse(s: &str) -> Option<Udi> {
        let rest = s.strip_prefix(UDI_SCHEME)?;
        let (tag, id) = rest.split_once('/').unwrap_or((rest, ""));
        let entity_type = EntityType::from_tag(tag)?;
        match entity_type.addressing() {
            Addressing::Key => {
                let key = Uuid::try_parse(id).ok()?;
                Udi::from_key(entity_type, key)
            }
            Addressing::Path => Udi::from_path(entity_type, id),
        }
    }

    /// Returns the entity type.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the key of a key-addressed UDI.
    pub fn key(&self) -> Option<Uuid> {
        match &self.id {
            UdiId::Key(key) => Some(*key),
            UdiId::Path(_) => None,
        }
    }

    /// Returns the path of a path-addressed UDI.
    pub fn path(&self) -> Option<&str> {
        match &self.id {
            UdiId::Key(_) => None,
            UdiId::Path(path) => Some(path),
        }
    }

    /// Returns true for a key-addressed UDI carrying the nil key.
    pub fn is_nil(&self) -> bool {
        matches!(self.id, UdiId::Key(key) if key.is_nil())
    }
}

impl fmt::Display for Udi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            UdiId::Key(key) => write!(f, "{UDI_SCHEME}{}/{}", self.entity_type, key.simple()),
            UdiId::Path(path) => write!(f, "{UDI_SCHEME}{}/{}", self.entity_type, path),
        }
    }
}

impl Serialize for Udi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Udi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UdiVisitor;

        impl Visitor<'_> for UdiVisitor {
            type Value = Udi;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a UDI string such as umb://document/<key>")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Udi, E> {
                Udi::parse(v).ok_or_else(|| E::custom(format!("invalid UDI: {v:?}")))
            }
        }

        deserializer.deserialize_str(UdiVisitor)
    }
}

/// Parses a comma-separated list of UDIs, skipping entries that do not parse.
pub fn parse_udi_list(s: &str) -> impl Iterator<Item = Udi> + '_ {
    s.split(',').filter_map(Udi::parse)
}

/// Joins UDIs into their comma-separated text form.
pub fn join_udis<'a>(udis: impl IntoIterator<Item = &'a Udi>) -> String {
    udis.into_iter()
        .map(|udi| udi.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
