use crate::source::LayoutSource;
use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub(crate) type Views = IndexMap<String, Vec<String>>;
pub(crate) type Buttons = HashMap<String, Button>;

/// A squeekboard layout as found in its YAML file. Only the parts the
/// conversion needs are modelled, everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawLayout {
    pub views: Views,
    #[serde(default)]
    pub buttons: Buttons,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Button {
    /// Presence alone marks the key as a modifier
    #[serde(default)]
    pub modifier: Option<serde_yaml::Value>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub action: Option<Action>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Action {
    /// Named actions such as `erase` or `show_prefs`
    Named(#[allow(dead_code)] String),
    View(ViewAction),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ViewAction {
    #[serde(default)]
    pub set_view: Option<String>,
    #[serde(default)]
    pub locking: Option<Locking>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Locking {
    #[serde(default)]
    pub lock_view: Option<String>,
    #[serde(default)]
    pub unlock_view: Option<String>,
}

impl Button {
    pub fn is_modifier(&self) -> bool {
        self.modifier.is_some()
    }
}

/// Identifiers derived from a layout's input path
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LayoutId {
    /// Input path without extension, e.g. `terminal/us`
    pub id: String,
    /// `id` made usable inside C identifiers, e.g. `terminal_us`
    pub c_identifier: String,
}

impl LayoutId {
    pub fn from_input(input: &str) -> Self {
        let path = Path::new(input);
        let id = match path.extension() {
            Some(ext) => input[..input.len() - ext.len() - 1].to_owned(),
            None => input.to_owned(),
        };
        let c_identifier = id.to_lowercase().replace('/', "_");
        Self { id, c_identifier }
    }
}

pub(crate) fn parse_layout(content: &str) -> Result<RawLayout> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    match &value {
        serde_yaml::Value::Null => bail!("layout is empty"),
        serde_yaml::Value::Mapping(map) if !map.contains_key("views") => {
            bail!("no \"views\" element in layout")
        }
        serde_yaml::Value::Mapping(_) => {}
        _ => bail!("layout is not a mapping"),
    }
    Ok(serde_yaml::from_value(value)?)
}

pub(crate) fn load_layout(source: &dyn LayoutSource, input: &str) -> Result<RawLayout> {
    let content = source.read(input)?;
    let layout =
        parse_layout(&content).with_context(|| format!("Could not load layout {input}"))?;
    debug!(
        "Loaded {input}: {} views, {} buttons",
        layout.views.len(),
        layout.buttons.len()
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"
outlines:
    default: { width: 35.33, height: 52 }
views:
    base:
        - "q w e"
        - "Shift_L space BackSpace"
    upper:
        - "Q W E"
        - "Shift_L space BackSpace"
buttons:
    Shift_L:
        action:
            locking:
                lock_view: "upper"
                unlock_view: "base"
        outline: "altline"
    BackSpace:
        action: erase
    Ctrl:
        modifier: "Control"
    "1#":
        action:
            set_view: "numbers"
    period:
        label: "."
"#;

    #[test]
    fn test_parse_layout_keeps_view_order() {
        let layout = parse_layout(LAYOUT).unwrap();
        let views: Vec<&String> = layout.views.keys().collect();
        assert_eq!(views, ["base", "upper"]);
        assert_eq!(layout.views["base"][1], "Shift_L space BackSpace");
    }

    #[test]
    fn test_parse_buttons() {
        let layout = parse_layout(LAYOUT).unwrap();
        let buttons = &layout.buttons;

        assert!(buttons["Ctrl"].is_modifier());
        assert!(!buttons["period"].is_modifier());
        assert_eq!(buttons["period"].label.as_deref(), Some("."));

        match &buttons["BackSpace"].action {
            Some(Action::Named(name)) => assert_eq!(name, "erase"),
            other => panic!("Expected named action, got {other:?}"),
        }
        match &buttons["1#"].action {
            Some(Action::View(action)) => {
                assert_eq!(action.set_view.as_deref(), Some("numbers"))
            }
            other => panic!("Expected view action, got {other:?}"),
        }
        match &buttons["Shift_L"].action {
            Some(Action::View(ViewAction {
                locking: Some(locking),
                ..
            })) => {
                assert_eq!(locking.lock_view.as_deref(), Some("upper"));
                assert_eq!(locking.unlock_view.as_deref(), Some("base"));
            }
            other => panic!("Expected locking action, got {other:?}"),
        }
    }

    #[test]
    fn test_buttons_are_optional() {
        let layout = parse_layout("views:\n    base: [\"a b\"]\n").unwrap();
        assert!(layout.buttons.is_empty());
    }

    #[test]
    fn test_missing_views_is_fatal() {
        let err = parse_layout("buttons: {}\n").unwrap_err();
        assert!(err.to_string().contains("views"));
    }

    #[test]
    fn test_empty_layout_is_fatal() {
        assert!(parse_layout("").is_err());
        assert!(parse_layout("views: [").is_err());
    }

    #[test]
    fn test_layout_id_from_input() {
        let id = LayoutId::from_input("terminal/US.yaml");
        assert_eq!(id.id, "terminal/US");
        assert_eq!(id.c_identifier, "terminal_us");

        let id = LayoutId::from_input("de");
        assert_eq!(id.id, "de");
        assert_eq!(id.c_identifier, "de");
    }
}
