//! Grid layout documents.
//!
//! A grid value is a JSON tree of sections, rows, areas and controls:
//!
//! ```text
//! { "name": "1 column", "sections": [ { "grid": 12, "rows": [ {
//!     "styles": { "background-image": "url(/media/1001/bg.jpg)" },
//!     "areas": [ { "grid": 12, "controls": [
//!         { "value": "<p>hi</p>", "editor": { "alias": "rte" } }
//!     ] } ]
//! } ] } ] }
//! ```
//!
//! Only the members the converters look at are typed. Every other member is
//! kept in an `extra` map and written back untouched. A missing list stays
//! missing on output.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Root of a grid document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<GridSection>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<GridRow>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areas: Option<Vec<GridArea>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub styles: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridArea {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<GridControl>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub styles: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single editor cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridControl {
    /// `None` when the member is absent, `Some(Value::Null)` when it is `null`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<GridEditor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridEditor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Distinguishes an explicit `null` from a missing member.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl GridControl {
    /// Returns the editor alias, if the control names one.
    pub fn alias(&self) -> Option<&str> {
        self.editor.as_ref()?.alias.as_deref()
    }

    /// Returns a copy of this control holding `value`.
    pub fn with_value(&self, value: Value) -> GridControl {
        GridControl {
            value: Some(value),
            editor: self.editor.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Callbacks for [`GridValue::transform`], invoked in document order.
pub trait GridVisitor {
    type Error;

    /// Called for each row before any of its areas.
    fn row(&mut self, _row: &GridRow) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called for each area before any of its controls.
    fn area(&mut self, _area: &GridArea) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Produces the replacement for a control.
    fn control(&mut self, control: &GridControl) -> Result<GridControl, Self::Error>;
}

impl GridValue {
    /// Parses a grid document. Anything other than a JSON object yields `None`.
    pub fn parse(json: &str) -> Option<GridValue> {
        if !json.trim_start().starts_with('{') {
            return None;
        }
        serde_json::from_str(json).ok()
    }

    /// Builds a new document with every control replaced by the visitor's output.
    ///
    /// The receiver is left untouched. The first visitor error aborts the walk.
    pub fn transform<V: GridVisitor>(&self, visitor: &mut V) -> Result<GridValue, V::Error> {
        Ok(GridValue {
            sections: map_items(&self.sections, |section| section.transform(visitor))?,
            extra: self.extra.clone(),
        })
    }

    pub fn sections(&self) -> &[GridSection] {
        self.sections.as_deref().unwrap_or_default()
    }

    /// Iterates over all controls in document order.
    pub fn controls(&self) -> impl Iterator<Item = &GridControl> {
        self.sections()
            .iter()
            .flat_map(GridSection::rows)
            .flat_map(GridRow::areas)
            .flat_map(GridArea::controls)
    }
}

impl GridSection {
    pub fn rows(&self) -> &[GridRow] {
        self.rows.as_deref().unwrap_or_default()
    }

    fn transform<V: GridVisitor>(&self, visitor: &mut V) -> Result<GridSection, V::Error> {
        Ok(GridSection {
            rows: map_items(&self.rows, |row| row.transform(visitor))?,
            extra: self.extra.clone(),
        })
    }
}

impl GridRow {
    pub fn areas(&self) -> &[GridArea] {
        self.areas.as_deref().unwrap_or_default()
    }

    fn transform<V: GridVisitor>(&self, visitor: &mut V) -> Result<GridRow, V::Error> {
        visitor.row(self)?;
        Ok(GridRow {
            areas: map_items(&self.areas, |area| area.transform(visitor))?,
            styles: self.styles.clone(),
            extra: self.extra.clone(),
        })
    }
}

impl GridArea {
    pub fn controls(&self) -> &[GridControl] {
        self.controls.as_deref().unwrap_or_default()
    }

    fn transform<V: GridVisitor>(&self, visitor: &mut V) -> Result<GridArea, V::Error> {
        visitor.area(self)?;
        Ok(GridArea {
            controls: map_items(&self.controls, |control| visitor.control(control))?,
            styles: self.styles.clone(),
            extra: self.extra.clone(),
        })
    }
}

fn map_items<T, U, E>(
    items: &Option<Vec<T>>,
    f: impl FnMut(&T) -> Result<U, E>,
) -> Result<Option<Vec<U>>, E> {
    items.as_ref().map(|items| items.iter().map(f).collect()).transpose()
}

/// Collects every string leaf of a JSON value, depth first.
pub fn string_leaves(value: &Value) -> Vec<&str> {
    fn walk<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
        match value {
            Value::String(s) => out.push(s),
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SAMPLE: &str = r#"{
        "name": "1 column layout",
        "sections": [{
            "grid": 12,
            "rows": [{
                "name": "Headline",
                "styles": { "background-image": "url(/media/1001/bg.jpg)" },
                "areas": [{
                    "grid": 12,
                    "controls": [
                        { "value": "<p>hi</p>", "editor": { "alias": "rte", "view": "rte" }, "active": false },
                        { "value": null, "editor": { "alias": "media" } },
                        { "editor": { "alias": "headline" } }
                    ]
                }]
            }]
        }]
    }"#;

    struct Upper;

    impl GridVisitor for Upper {
        type Error = ();

        fn control(&mut self, control: &GridControl) -> Result<GridControl, ()> {
            match &control.value {
                Some(Value::String(s)) => Ok(control.with_value(Value::String(s.to_uppercase()))),
                _ => Ok(control.clone()),
            }
        }
    }

    #[test]
    fn test_parse_keeps_unknown_members() {
        let grid = GridValue::parse(SAMPLE).unwrap();
        let out = serde_json::to_value(&grid).unwrap();
        let original: Value = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_null_and_missing_values_are_distinct() {
        let grid = GridValue::parse(SAMPLE).unwrap();
        let controls: Vec<_> = grid.controls().collect();
        assert_eq!(controls.len(), 3);
        assert_eq!(controls[1].value, Some(Value::Null));
        assert_eq!(controls[2].value, None);
        assert_eq!(controls[0].alias(), Some("rte"));
    }

    #[test]
    fn test_transform_builds_new_tree() {
        let grid = GridValue::parse(SAMPLE).unwrap();
        let upper = grid.transform(&mut Upper).unwrap();

        assert_eq!(
            grid.controls().next().unwrap().value,
            Some(json!("<p>hi</p>"))
        );
        assert_eq!(
            upper.controls().next().unwrap().value,
            Some(json!("<P>HI</P>"))
        );
        assert_eq!(upper.extra.get("name"), Some(&json!("1 column layout")));
        assert_eq!(upper.sections()[0].rows()[0].styles, grid.sections()[0].rows()[0].styles);
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(GridValue::parse("[1, 2]").is_none());
        assert!(GridValue::parse("plain text").is_none());
        assert!(GridValue::parse("{ broken").is_none());
        assert_eq!(GridValue::parse("{}"), Some(GridValue::default()));
    }

    #[test]
    fn test_missing_lists_stay_missing() {
        for json in [
            r#"{"name":"empty"}"#,
            r#"{"sections":[]}"#,
            r#"{"sections":[{"grid":12}]}"#,
            r#"{"sections":[{"rows":[{"name":"r"},{"areas":[{"grid":4}]}]}]}"#,
        ] {
            let grid = GridValue::parse(json).unwrap();
            let out = grid.transform(&mut Upper).unwrap();
            assert_eq!(serde_json::to_string(&out).unwrap(), json);
        }
    }

    #[test]
    fn test_string_leaves() {
        let value = json!({ "a": "x", "b": ["y", 1, { "c": "z" }], "d": null });
        assert_eq!(string_leaves(&value), vec!["x", "y", "z"]);
    }
}
