use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// ---------------------------------------------------------------------------
// Flat node graph
// ---------------------------------------------------------------------------

/// Kind of a flattened node. Markdown content only produces tag elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    TagElement,
}

/// One flattened, parent-referencing unit of a compiled content document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    pub id: String,
    pub node_type: NodeType,
    pub parent_id: Option<String>,
    pub tag_name: String,
    /// Render hint for list items, derived from their first child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name_custom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_hook_params: Option<Vec<HookParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_classes: Option<ResponsiveStyles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_payload: Option<ButtonPayload>,
}

impl FlatNode {
    pub fn new(id: impl Into<String>, parent_id: Option<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id,
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }
}

/// A positional code-hook parameter: a scalar, or a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookParam {
    Scalar(String),
    List(Vec<String>),
}

impl HookParam {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            HookParam::Scalar(s) => Some(s),
            HookParam::List(_) => None,
        }
    }

    /// View the parameter as a list; a scalar is a one-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            HookParam::Scalar(s) => vec![s.clone()],
            HookParam::List(items) => items.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Responsive styles
// ---------------------------------------------------------------------------

/// Viewport breakpoints, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Mobile, Breakpoint::Tablet, Breakpoint::Desktop];

    /// Breakpoint for a tuple position; positions past desktop have none.
    pub fn from_position(position: usize) -> Option<Self> {
        Self::ALL.get(position).copied()
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breakpoint::Mobile => write!(f, "mobile"),
            Breakpoint::Tablet => write!(f, "tablet"),
            Breakpoint::Desktop => write!(f, "desktop"),
        }
    }
}

/// Per-breakpoint CSS property maps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponsiveStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<BTreeMap<String, String>>,
}

impl ResponsiveStyles {
    pub fn get(&self, breakpoint: Breakpoint) -> Option<&BTreeMap<String, String>> {
        match breakpoint {
            Breakpoint::Mobile => self.mobile.as_ref(),
            Breakpoint::Tablet => self.tablet.as_ref(),
            Breakpoint::Desktop => self.desktop.as_ref(),
        }
    }

    pub fn insert(&mut self, breakpoint: Breakpoint, property: impl Into<String>, value: impl Into<String>) {
        let slot = match breakpoint {
            Breakpoint::Mobile => &mut self.mobile,
            Breakpoint::Tablet => &mut self.tablet,
            Breakpoint::Desktop => &mut self.desktop,
        };
        slot.get_or_insert_with(BTreeMap::new)
            .insert(property.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        Breakpoint::ALL
            .iter()
            .all(|bp| self.get(*bp).map_or(true, |m| m.is_empty()))
    }
}

// ---------------------------------------------------------------------------
// Options payload
// ---------------------------------------------------------------------------

/// A single value inside an override tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TupleValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl fmt::Display for TupleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleValue::Text(s) => write!(f, "{}", s),
            TupleValue::Number(n) => write!(f, "{}", n),
            TupleValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Mobile/tablet/desktop values for one property at one occurrence.
pub type StyleTuple = Vec<Option<TupleValue>>;

/// Per-tag override table: property -> occurrence index -> tuple.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TagOverrides {
    #[serde(rename = "override", default)]
    pub overrides: BTreeMap<String, Vec<Option<StyleTuple>>>,
}

/// Author-supplied class value, normalized from the shapes the editor writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawClassSpec", into = "RawClassSpec")]
pub enum ClassSpec {
    Scalar(String),
    Alternates(Vec<String>),
    PerBreakpoint(Vec<ResponsiveStyles>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawClassSpec {
    Scalar(String),
    List(Vec<String>),
    Layer(ResponsiveStyles),
    Layers(Vec<ResponsiveStyles>),
}

impl From<RawClassSpec> for ClassSpec {
    fn from(raw: RawClassSpec) -> Self {
        match raw {
            RawClassSpec::Scalar(s) => ClassSpec::Scalar(s),
            RawClassSpec::List(mut list) if list.len() == 1 => ClassSpec::Scalar(list.remove(0)),
            RawClassSpec::List(list) => ClassSpec::Alternates(list),
            RawClassSpec::Layer(layer) => ClassSpec::PerBreakpoint(vec![layer]),
            RawClassSpec::Layers(layers) => ClassSpec::PerBreakpoint(layers),
        }
    }
}

impl From<ClassSpec> for RawClassSpec {
    fn from(spec: ClassSpec) -> Self {
        match spec {
            ClassSpec::Scalar(s) => RawClassSpec::Scalar(s),
            ClassSpec::Alternates(list) => RawClassSpec::List(list),
            ClassSpec::PerBreakpoint(layers) => RawClassSpec::Layers(layers),
        }
    }
}

/// Per-tag default classes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassNames {
    #[serde(default)]
    pub all: BTreeMap<String, ClassSpec>,
}

/// Button behavior attached to a link href.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonPayload {
    #[serde(default)]
    pub callback_payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub button_classes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub button_hover_classes: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_external_url: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bunny_payload: Option<VideoCue>,
}

/// A request to start a video at a given second.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCue {
    pub t: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_context: bool,
}

/// The author-authored style and behavior contract for one markdown pane.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPayload {
    #[serde(default)]
    pub class_names_payload: BTreeMap<String, TagOverrides>,
    #[serde(default)]
    pub class_names: ClassNames,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_names_parent: Option<ClassSpec>,
    #[serde(default)]
    pub buttons: BTreeMap<String, ButtonPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artpack: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal: Option<serde_json::Value>,
}

impl OptionsPayload {
    /// Decode a payload entry by entry. An entry with the wrong shape is
    /// dropped on its own; its siblings still apply.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Self::default();
        };
        let Some(map) = value.as_object() else {
            warn!("Options payload is not an object; using defaults");
            return Self::default();
        };

        let class_names_payload = entries::<Value>("classNamesPayload", map.get("classNamesPayload"))
            .into_iter()
            .filter_map(|(tag, raw)| {
                if !raw.is_object() {
                    warn!(tag = %tag, "Dropping malformed classNamesPayload entry");
                    return None;
                }
                let section = format!("classNamesPayload.{}.override", tag);
                let overrides = entries(&section, raw.get("override"));
                Some((tag, TagOverrides { overrides }))
            })
            .collect();

        Self {
            class_names_payload,
            class_names: ClassNames {
                all: entries("classNames.all", map.get("classNames").and_then(|c| c.get("all"))),
            },
            class_names_parent: map.get("classNamesParent").and_then(|v| single("classNamesParent", v)),
            buttons: entries("buttons", map.get("buttons")),
            artpack: map.get("artpack").filter(|v| !v.is_null()).cloned(),
            modal: map.get("modal").filter(|v| !v.is_null()).cloned(),
        }
    }

    pub fn button(&self, href: &str) -> Option<&ButtonPayload> {
        self.buttons.get(href)
    }
}

fn single<T: DeserializeOwned>(section: &str, value: &Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match T::deserialize(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(section, error = %e, "Dropping malformed options entry");
            None
        }
    }
}

/// Decode every entry of an object section, dropping the ones that fail.
fn entries<T: DeserializeOwned>(section: &str, value: Option<&Value>) -> BTreeMap<String, T> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return BTreeMap::new();
    };
    let Some(map) = value.as_object() else {
        warn!(section, "Options section is not an object; ignoring it");
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(key, raw)| {
            let entry = format!("{}.{}", section, key);
            single(&entry, raw).map(|v| (key.clone(), v))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// File table
// ---------------------------------------------------------------------------

/// Alt text for a known image that has neither authored nor stored alt text.
pub const DEFAULT_FALLBACK_ALT: &str = "Image description could not be found. We apologize";

/// An uploaded image known to the site, referenced from markdown by filename.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: String,
    pub filename: String,
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_node_omits_absent_fields() {
        let node = FlatNode::new("n1", None, "p");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, json!({"id": "n1", "nodeType": "TagElement", "parentId": null, "tagName": "p"}));
    }

    #[test]
    fn test_class_spec_normalization() {
        let scalar: ClassSpec = serde_json::from_value(json!("text-lg")).unwrap();
        assert_eq!(scalar, ClassSpec::Scalar("text-lg".into()));

        let single: ClassSpec = serde_json::from_value(json!(["text-lg"])).unwrap();
        assert_eq!(single, ClassSpec::Scalar("text-lg".into()));

        let alternates: ClassSpec = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(alternates, ClassSpec::Alternates(vec!["a".into(), "b".into()]));

        let layer: ClassSpec =
            serde_json::from_value(json!({"mobile": {"px": "4"}, "desktop": {"px": "12"}})).unwrap();
        match layer {
            ClassSpec::PerBreakpoint(layers) => {
                assert_eq!(layers.len(), 1);
                assert_eq!(layers[0].get(Breakpoint::Mobile).unwrap()["px"], "4");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_options_payload_tolerates_bad_shapes() {
        assert_eq!(OptionsPayload::from_value(None), OptionsPayload::default());
        assert_eq!(OptionsPayload::from_value(Some(&json!([1, 2]))), OptionsPayload::default());
        let bad = json!({"classNames": {"all": {"p": 5}}, "buttons": "nope"});
        assert_eq!(OptionsPayload::from_value(Some(&bad)), OptionsPayload::default());
    }

    #[test]
    fn test_bad_entry_keeps_valid_siblings() {
        let raw = json!({
            "classNamesPayload": {
                "p": {"override": {"mt": [["4", "8", "8"]], "pb": "broken"}},
                "h3": 7
            },
            "classNames": {"all": {"h2": 5, "p": "text-lg"}},
            "classNamesParent": 5,
            "buttons": {
                "#go": {"callbackPayload": "(goto (home))"},
                "#bad": {"callbackPayload": 12}
            }
        });
        let payload = OptionsPayload::from_value(Some(&raw));

        assert_eq!(payload.buttons.len(), 1);
        assert_eq!(payload.button("#go").unwrap().callback_payload, "(goto (home))");
        assert_eq!(payload.class_names.all.len(), 1);
        assert_eq!(payload.class_names.all["p"], ClassSpec::Scalar("text-lg".into()));
        assert_eq!(payload.class_names_payload.len(), 1);
        let p = &payload.class_names_payload["p"].overrides;
        assert_eq!(p.len(), 1);
        assert!(p.contains_key("mt"));
        assert!(payload.class_names_parent.is_none());
    }

    #[test]
    fn test_options_payload_ignores_unknown_keys() {
        let raw = json!({
            "classNamesPayload": {"p": {"override": {"mt": [null, ["4", "8", "8"]]}}},
            "classNames": {"all": {"p": ["a", "b"]}},
            "somethingElse": true
        });
        let payload = OptionsPayload::from_value(Some(&raw));
        let overrides = &payload.class_names_payload["p"].overrides["mt"];
        assert!(overrides[0].is_none());
        assert_eq!(overrides[1].as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_tuple_value_display() {
        let tuple: StyleTuple = serde_json::from_value(json!(["lg", 12, true])).unwrap();
        let rendered: Vec<String> = tuple.iter().flatten().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["lg", "12", "true"]);
    }

    #[test]
    fn test_responsive_styles_insert() {
        let mut styles = ResponsiveStyles::default();
        assert!(styles.is_empty());
        styles.insert(Breakpoint::Tablet, "mt", "8");
        assert!(!styles.is_empty());
        assert!(styles.mobile.is_none());
        assert_eq!(styles.get(Breakpoint::Tablet).unwrap()["mt"], "8");
    }
}
