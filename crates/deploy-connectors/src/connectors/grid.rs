//! Grid layouts.
//!
//! A grid value nests other editors' values inside its controls. Each control
//! names its editor, and the control's value is converted by whatever
//! connector the registry holds for that editor, exactly as if it were a
//! standalone property. Row and area styles may also point at media files
//! through `url(...)`.

use std::sync::{Arc, Weak};

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::codec::grid::{GridArea, GridControl, GridRow, GridValue, GridVisitor, string_leaves};
use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{Content, ContentBase, Decimal, Dependency, EditorAlias, Property, PropertyValue};
use crate::registry::ConnectorRegistry;
use crate::services::{MediaService, found};

lazy_static! {
    static ref STYLE_MEDIA_URL: Regex =
        Regex::new(r#"(?i)url\([^)]*?(?P<url>/media/\d+/[^)'"]+)"#).expect("valid style url pattern");
}

/// Alias of the stand-in property a control's value is imported through.
const CELL_ALIAS: &str = "value";

/// Converts grid layouts by delegating each control to the registry.
pub struct GridValueConnector {
    registry: Weak<ConnectorRegistry>,
    media: Arc<dyn MediaService>,
}

impl GridValueConnector {
    /// Creates a grid connector that resolves controls through `registry`.
    ///
    /// The registry usually owns this connector, so only a weak handle is kept.
    pub fn new(registry: Weak<ConnectorRegistry>, media: Arc<dyn MediaService>) -> Self {
        Self { registry, media }
    }

    fn registry(&self) -> Result<Arc<ConnectorRegistry>, ConnectorError> {
        self.registry.upgrade().ok_or(ConnectorError::RegistryUnavailable)
    }

    /// Picks the connector for a control, or `None` if the control is kept as is.
    ///
    /// Editors without a dedicated connector only go through the fallback when
    /// the value is a primitive.
    fn route(registry: &ConnectorRegistry, control: &GridControl, value: &Value) -> Option<Cell> {
        let editor = control.alias().map(EditorAlias::from_alias);
        match editor {
            Some(editor) if registry.contains(&editor) => Some(Cell {
                connector: registry.resolve(&editor),
                editor,
                dedicated: true,
            }),
            _ if is_scalar(value) => Some(Cell {
                editor: editor.unwrap_or_else(|| EditorAlias::Other(String::new())),
                connector: registry.default_connector(),
                dedicated: false,
            }),
            _ => None,
        }
    }

    fn style_dependencies(&self, styles: Option<&Value>, dependencies: &mut Vec<Dependency>) {
        let Some(styles) = styles else {
            return;
        };
        for style in string_leaves(styles) {
            for caps in STYLE_MEDIA_URL.captures_iter(style) {
                let url = &caps["url"];
                match found(self.media.media_by_path(url)) {
                    Some(udi) => dependencies.push(Dependency::exists(udi)),
                    None => info!(url, "grid style references media that could not be found"),
                }
            }
        }
    }
}

/// A control's connector and the editor its value is converted under.
struct Cell {
    editor: EditorAlias,
    connector: Arc<dyn ValueConnector>,
    dedicated: bool,
}

impl Cell {
    /// Reads the control's JSON value, or `None` if the fallback cannot carry it.
    fn read(&self, value: &Value) -> Option<PropertyValue> {
        if self.dedicated {
            Some(json_to_value(value))
        } else {
            scalar_json_to_value(value)
        }
    }
}

/// Strings, numbers and nulls can go through the fallback connector.
fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Null | Value::String(_) | Value::Number(_))
}

/// Reads a JSON number as an integer or exact decimal.
fn number_value(n: &Number) -> Option<PropertyValue> {
    match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
        Some(v) => Some(PropertyValue::Integer(v)),
        None => Decimal::parse(&n.to_string()).map(PropertyValue::Decimal),
    }
}

/// Reads a control's JSON value for a dedicated connector.
fn json_to_value(value: &Value) -> PropertyValue {
    match value {
        Value::Null => PropertyValue::Null,
        Value::String(s) => PropertyValue::Text(s.clone()),
        Value::Bool(b) => PropertyValue::Bool(*b),
        Value::Number(n) => number_value(n).unwrap_or_else(|| PropertyValue::Text(n.to_string())),
        Value::Array(_) | Value::Object(_) => PropertyValue::Text(value.to_string()),
    }
}

/// Reads a primitive JSON value for the fallback connector.
///
/// Numbers that are neither `i32` nor an exact decimal yield `None`.
fn scalar_json_to_value(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Null => Some(PropertyValue::Null),
        Value::String(s) => Some(PropertyValue::Text(s.clone())),
        Value::Number(n) => number_value(n),
        _ => None,
    }
}

/// Writes a property value back as a control's JSON value.
///
/// With `embed_structured`, text holding a JSON object or array is embedded
/// as structure again. Otherwise text always stays a string.
fn value_to_json(value: &PropertyValue, embed_structured: bool) -> Value {
    match value {
        PropertyValue::Null => Value::Null,
        PropertyValue::Text(s) => {
            let trimmed = s.trim_start();
            if embed_structured && (trimmed.starts_with('{') || trimmed.starts_with('[')) {
                if let Ok(structured @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str(s) {
                    return structured;
                }
            }
            Value::String(s.clone())
        }
        PropertyValue::Integer(v) => Value::from(*v),
        PropertyValue::Decimal(d) => d
            .to_string()
            .parse::<Number>()
            .map_or_else(|_| Value::String(d.to_string()), Value::Number),
        PropertyValue::DateTime(t) => Value::String(t.to_string()),
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::Binary(bytes) => Value::from(bytes.clone()),
    }
}

struct ExportVisitor<'a> {
    connector: &'a GridValueConnector,
    registry: &'a ConnectorRegistry,
    property: &'a Property,
    dependencies: &'a mut Vec<Dependency>,
}

impl GridVisitor for ExportVisitor<'_> {
    type Error = ConnectorError;

    fn row(&mut self, row: &GridRow) -> Result<(), ConnectorError> {
        self.connector.style_dependencies(row.styles.as_ref(), self.dependencies);
        Ok(())
    }

    fn area(&mut self, area: &GridArea) -> Result<(), ConnectorError> {
        self.connector.style_dependencies(area.styles.as_ref(), self.dependencies);
        Ok(())
    }

    fn control(&mut self, control: &GridControl) -> Result<GridControl, ConnectorError> {
        let Some(value) = control.value.as_ref() else {
            return Ok(control.clone());
        };
        let Some(cell) = GridValueConnector::route(self.registry, control, value) else {
            return Ok(control.clone());
        };
        let Some(local) = cell.read(value) else {
            return Ok(control.clone());
        };

        let property = Property::new(self.property.alias.clone(), cell.editor, local);
        let portable = cell.connector.to_portable(&property, self.dependencies)?;
        Ok(control.with_value(portable.map_or(Value::Null, Value::String)))
    }
}

struct ImportVisitor<'a> {
    registry: &'a ConnectorRegistry,
}

impl GridVisitor for ImportVisitor<'_> {
    type Error = ConnectorError;

    fn control(&mut self, control: &GridControl) -> Result<GridControl, ConnectorError> {
        let (value, portable) = match control.value.as_ref() {
            Some(value @ Value::String(s)) => (value, Some(s.as_str())),
            Some(value @ Value::Null) => (value, None),
            _ => return Ok(control.clone()),
        };
        let Some(cell) = GridValueConnector::route(self.registry, control, value) else {
            return Ok(control.clone());
        };

        let mut scratch = Content::new(0, Uuid::nil())
            .with_property(Property::new(CELL_ALIAS, cell.editor, PropertyValue::Null));
        cell.connector.from_portable(&mut scratch, CELL_ALIAS, portable)?;
        let local = scratch
            .value(CELL_ALIAS)
            .map_or(Value::Null, |v| value_to_json(v, cell.dedicated));
        Ok(control.with_value(local))
    }
}

impl ValueConnector for GridValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::Grid]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(json) = property.value.non_blank_text() else {
            return Ok(None);
        };
        let Some(grid) = GridValue::parse(json) else {
            debug!(alias = %property.alias, "grid value is not a JSON object");
            return Ok(None);
        };

        let registry = self.registry()?;
        let converted = grid.transform(&mut ExportVisitor {
            connector: self,
            registry: &registry,
            property,
            dependencies,
        })?;
        serde_json::to_string(&converted)
            .map(Some)
            .map_err(|err| grid_write_error(json, err))
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let json = match value {
            Some(json) if !json.trim().is_empty() => json,
            other => {
                content.set_value(alias, other.into());
                return Ok(());
            }
        };
        let Some(grid) = GridValue::parse(json) else {
            debug!(alias, "portable grid value is not a JSON object, leaving property unchanged");
            return Ok(());
        };

        let registry = self.registry()?;
        let converted = grid.transform(&mut ImportVisitor { registry: &registry })?;
        let local = serde_json::to_string_pretty(&converted).map_err(|err| grid_write_error(json, err))?;
        content.set_value(alias, PropertyValue::Text(local));
        Ok(())
    }
}

fn grid_write_error(json: &str, err: serde_json::Error) -> ConnectorError {
    ConnectorError::MalformedValue {
        kind: "grid",
        value: json.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_to_value() {
        assert_eq!(json_to_value(&json!(null)), PropertyValue::Null);
        assert_eq!(json_to_value(&json!("a")), PropertyValue::Text("a".into()));
        assert_eq!(json_to_value(&json!(12)), PropertyValue::Integer(12));
        assert_eq!(
            json_to_value(&json!(1.5)),
            PropertyValue::Decimal(Decimal::parse("1.5").unwrap())
        );
        assert_eq!(
            json_to_value(&json!(5_000_000_000i64)),
            PropertyValue::Decimal(Decimal::parse("5000000000").unwrap())
        );
        assert_eq!(
            json_to_value(&json!({"a": 1})),
            PropertyValue::Text(r#"{"a":1}"#.into())
        );
    }

    #[test]
    fn test_scalar_json_to_value() {
        assert_eq!(scalar_json_to_value(&json!("{\"a\":1}")), Some(PropertyValue::Text(r#"{"a":1}"#.into())));
        assert_eq!(scalar_json_to_value(&json!(7)), Some(PropertyValue::Integer(7)));
        assert_eq!(scalar_json_to_value(&json!(1e300)), None);
        assert_eq!(scalar_json_to_value(&json!(true)), None);
        assert_eq!(scalar_json_to_value(&json!([1])), None);
    }

    #[test]
    fn test_value_to_json() {
        let object_text = PropertyValue::Text(r#"{"a":1}"#.into());
        assert_eq!(value_to_json(&object_text, true), json!({"a": 1}));
        assert_eq!(value_to_json(&object_text, false), json!(r#"{"a":1}"#));
        assert_eq!(value_to_json(&PropertyValue::Text("[1,2]".into()), true), json!([1, 2]));
        assert_eq!(value_to_json(&PropertyValue::Text("{not json".into()), true), json!("{not json"));
        assert_eq!(value_to_json(&PropertyValue::Integer(-3), false), json!(-3));
        assert_eq!(
            value_to_json(&PropertyValue::Decimal(Decimal::parse("2.25").unwrap()), false),
            json!(2.25)
        );
    }

    #[test]
    fn test_style_url_pattern() {
        let urls = |s: &str| {
            STYLE_MEDIA_URL
                .captures_iter(s)
                .map(|c| c["url"].to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(urls("url(/media/1001/bg.jpg)"), vec!["/media/1001/bg.jpg"]);
        assert_eq!(urls("URL('/media/1001/bg.jpg') no-repeat"), vec!["/media/1001/bg.jpg"]);
        assert_eq!(
            urls("url(https://cdn.example.com/media/7/x.png), url(/media/8/y.png)"),
            vec!["/media/7/x.png", "/media/8/y.png"]
        );
        assert!(urls("url(/images/bg.jpg)").is_empty());
    }
}
