use crate::attributes::{self, Attributes, Role};
use crate::keys::{self, HIDDEN_KEY, Keycap, SPACE_KEY};
use crate::layout::Buttons;
use evdev::KeyCode;
use log::warn;

/// Row added on top of a view's own rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TopRow {
    Keys(String),
    /// Row of hidden keys that keeps views without their own extra row aligned
    Placeholder(usize),
}

impl TopRow {
    fn keys(&self) -> Vec<&str> {
        match self {
            TopRow::Keys(row) => row.split_whitespace().collect(),
            TopRow::Placeholder(width) => vec![HIDDEN_KEY; (*width).max(1)],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ViewOptions {
    pub top_row: Option<TopRow>,
    pub arrows_around_space: bool,
    pub scancodes: bool,
}

/// One emitted key of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Key {
    pub keycap: Keycap,
    pub attributes: Attributes,
    /// Empty unless scancode generation is enabled
    pub scancodes: Vec<KeyCode>,
}

/// Key at `index` switches to the view named `destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SwitchEdge {
    pub index: usize,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransformedView {
    pub id: String,
    pub rows: Vec<Vec<Key>>,
    pub modifier_idxs: Vec<usize>,
    pub switchers: Vec<SwitchEdge>,
}

impl TransformedView {
    pub fn num_keys(&self) -> usize {
        self.keys().count()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.rows.iter().flatten()
    }

    /// Per row, per key scancode sequences
    pub fn scancodes(&self) -> Vec<Vec<Vec<KeyCode>>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|key| key.scancodes.clone()).collect())
            .collect()
    }
}

/// Insert arrow keys around the first space key of a row.
pub(crate) fn surround_space_with_arrows(keys: &mut Vec<&str>) {
    if let Some(space) = keys.iter().position(|key| *key == SPACE_KEY) {
        keys.insert(space + 1, "→");
        keys.insert(space, "←");
    }
}

fn resolve_keycap(key: &str, buttons: &Buttons) -> Keycap {
    if let Some(label) = buttons.get(key).and_then(|button| button.label.as_deref())
        && !keys::is_named_arrow(key)
    {
        return Keycap::from_caption(label);
    }
    keys::keycap(key)
}

fn resolve_scancodes(keycap: &Keycap, raw: &str, role: &Role) -> Vec<KeyCode> {
    if role.destination().is_some() || raw == HIDDEN_KEY {
        return Vec::new();
    }
    keys::scancodes_for_keycap(keycap.as_str()).unwrap_or_else(|| {
        warn!(
            "Cannot determine scancodes for unknown keycap \"{}\"",
            keycap.as_str()
        );
        Vec::new()
    })
}

/// Expand the rows of one view into keys with captions, attributes, roles and
/// (optionally) scancodes.
pub(crate) fn transform(
    view_id: &str,
    rows: &[String],
    buttons: &Buttons,
    options: &ViewOptions,
) -> TransformedView {
    let mut row_keys: Vec<(Vec<&str>, bool)> = Vec::with_capacity(rows.len() + 1);
    if let Some(top_row) = &options.top_row {
        row_keys.push((top_row.keys(), true));
    }
    row_keys.extend(rows.iter().map(|row| (row.split_whitespace().collect(), false)));

    let mut index = 0;
    let mut transformed = TransformedView {
        id: view_id.to_owned(),
        rows: Vec::with_capacity(row_keys.len()),
        modifier_idxs: Vec::new(),
        switchers: Vec::new(),
    };

    for (mut keys_in_row, extra_row) in row_keys {
        if options.arrows_around_space {
            surround_space_with_arrows(&mut keys_in_row);
        }

        let mut row = Vec::with_capacity(keys_in_row.len());
        for key in keys_in_row {
            if keys::is_ignored(key) {
                continue;
            }

            let keycap = resolve_keycap(key, buttons);
            if keycap.is_empty() {
                continue;
            }

            let role = Role::resolve(key, view_id, buttons);
            if role == Role::Modifier {
                transformed.modifier_idxs.push(index);
            }
            if let Some(destination) = role.destination() {
                transformed.switchers.push(SwitchEdge {
                    index,
                    destination: destination.to_owned(),
                });
            }

            let attributes = attributes::resolve(key, &role, extra_row, buttons);
            let scancodes = if options.scancodes {
                resolve_scancodes(&keycap, key, &role)
            } else {
                Vec::new()
            };

            row.push(Key {
                keycap,
                attributes,
                scancodes,
            });
            index += 1;
        }
        transformed.rows.push(row);
    }

    transformed
}
