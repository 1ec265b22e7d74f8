use crate::keys::{HIDDEN_KEY, SPACE_KEY, is_arrow_symbol, is_repeatable};
use crate::layout::{Action, Buttons};
use std::fmt;

/// Keys with a buttons table entry that still behave like plain characters
const CHARACTER_BUTTONS: &[&str] = &["\"", "colon", "period", SPACE_KEY];

/// Keys with a buttons table entry that still get the narrow width class
const NARROW_BUTTONS: &[&str] = &["\"", "colon", "period"];

/// What pressing a key does beyond emitting its caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Role {
    Plain,
    Modifier,
    /// Locks `destination`, the current view is not locked
    LockActivator { destination: String },
    /// The current view is the locked one, pressing unlocks to `destination`
    LockDeactivator { destination: String },
    Switcher { destination: String },
}

impl Role {
    /// Resolve the role of `key` while `view_id` is displayed.
    pub fn resolve(key: &str, view_id: &str, buttons: &Buttons) -> Role {
        let Some(button) = buttons.get(key) else {
            return Role::Plain;
        };
        if button.is_modifier() {
            return Role::Modifier;
        }
        let Some(Action::View(action)) = &button.action else {
            return Role::Plain;
        };

        if let Some(destination) = &action.set_view {
            if destination.is_empty() {
                return Role::Plain;
            }
            return Role::Switcher {
                destination: destination.clone(),
            };
        }

        if let Some(locking) = &action.locking
            && let (Some(lock_view), Some(unlock_view)) = (&locking.lock_view, &locking.unlock_view)
        {
            if lock_view == view_id {
                if !unlock_view.is_empty() {
                    return Role::LockDeactivator {
                        destination: unlock_view.clone(),
                    };
                }
            } else if !lock_view.is_empty() {
                return Role::LockActivator {
                    destination: lock_view.clone(),
                };
            }
        }

        Role::Plain
    }

    /// View this key switches to, if any
    pub fn destination(&self) -> Option<&str> {
        match self {
            Role::LockActivator { destination }
            | Role::LockDeactivator { destination }
            | Role::Switcher { destination } => Some(destination),
            Role::Plain | Role::Modifier => None,
        }
    }
}

/// Button matrix control flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CtrlFlag {
    ModInactive,
    ModActive,
    NonChar,
    Popover,
    NoRepeat,
    Hidden,
}

impl CtrlFlag {
    pub fn c_name(self) -> &'static str {
        match self {
            CtrlFlag::ModInactive => "SQ2LV_CTRL_MOD_INACTIVE",
            CtrlFlag::ModActive => "SQ2LV_CTRL_MOD_ACTIVE",
            CtrlFlag::NonChar => "SQ2LV_CTRL_NON_CHAR",
            CtrlFlag::Popover => "LV_BUTTONMATRIX_CTRL_POPOVER",
            CtrlFlag::NoRepeat => "LV_BUTTONMATRIX_CTRL_NO_REPEAT",
            CtrlFlag::Hidden => "LV_BUTTONMATRIX_CTRL_HIDDEN",
        }
    }
}

/// Relative button width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Width {
    Narrow,
    Regular,
    Wide,
}

impl Width {
    pub fn units(self) -> u8 {
        match self {
            Width::Narrow => 2,
            Width::Regular => 3,
            Width::Wide => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attributes {
    pub flags: Vec<CtrlFlag>,
    pub width: Width,
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in &self.flags {
            write!(f, "{} | ", flag.c_name())?;
        }
        write!(f, "{}", self.width.units())
    }
}

/// Derive the control attributes for one occurrence of `key`.
pub(crate) fn resolve(key: &str, role: &Role, extra_row: bool, buttons: &Buttons) -> Attributes {
    let mut flags = Vec::new();
    let has_button = buttons.contains_key(key);

    match role {
        Role::Modifier | Role::LockActivator { .. } => flags.push(CtrlFlag::ModInactive),
        Role::LockDeactivator { .. } => flags.push(CtrlFlag::ModActive),
        Role::Plain | Role::Switcher { .. } => {
            if (has_button && !CHARACTER_BUTTONS.contains(&key)) || is_arrow_symbol(key) {
                flags.push(CtrlFlag::NonChar);
            } else if key != SPACE_KEY {
                flags.push(CtrlFlag::Popover);
            }
        }
    }

    if !is_repeatable(key) {
        flags.push(CtrlFlag::NoRepeat);
    }
    if extra_row {
        flags.push(CtrlFlag::NonChar);
    }
    if key == HIDDEN_KEY {
        flags.push(CtrlFlag::Hidden);
    }

    let width = if !has_button || NARROW_BUTTONS.contains(&key) {
        Width::Narrow
    } else if key == SPACE_KEY {
        Width::Wide
    } else {
        Width::Regular
    };

    Attributes { flags, width }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::parse_layout;
    use proptest::prelude::*;

    fn buttons() -> Buttons {
        parse_layout(
            r#"
views:
    base: ["q"]
buttons:
    Shift_L:
        action:
            locking:
                lock_view: "upper"
                unlock_view: "base"
    Ctrl:
        modifier: "Control"
    "1#":
        action:
            set_view: "numbers"
    BackSpace:
        action: erase
    space:
        outline: "spaceline"
    period:
        label: "."
    Return:
        keysym: "Return"
"#,
        )
        .unwrap()
        .buttons
    }

    #[test]
    fn test_roles() {
        let buttons = buttons();
        assert_eq!(Role::resolve("q", "base", &buttons), Role::Plain);
        assert_eq!(Role::resolve("Ctrl", "base", &buttons), Role::Modifier);
        assert_eq!(Role::resolve("BackSpace", "base", &buttons), Role::Plain);
        assert_eq!(
            Role::resolve("1#", "base", &buttons),
            Role::Switcher {
                destination: "numbers".into()
            }
        );
        assert_eq!(
            Role::resolve("Shift_L", "base", &buttons),
            Role::LockActivator {
                destination: "upper".into()
            }
        );
        assert_eq!(
            Role::resolve("Shift_L", "upper", &buttons),
            Role::LockDeactivator {
                destination: "base".into()
            }
        );
    }

    #[test]
    fn test_incomplete_locking_is_plain() {
        let buttons = parse_layout(
            "views: {}\nbuttons:\n    Shift_L:\n        action:\n            locking:\n                lock_view: upper\n",
        )
        .unwrap()
        .buttons;
        assert_eq!(Role::resolve("Shift_L", "base", &buttons), Role::Plain);
    }

    fn attrs(key: &str, view: &str, extra_row: bool) -> String {
        let buttons = buttons();
        let role = Role::resolve(key, view, &buttons);
        resolve(key, &role, extra_row, &buttons).to_string()
    }

    #[test]
    fn test_plain_character() {
        assert_eq!(
            attrs("q", "base", false),
            "LV_BUTTONMATRIX_CTRL_POPOVER | LV_BUTTONMATRIX_CTRL_NO_REPEAT | 2"
        );
    }

    #[test]
    fn test_lock_keys() {
        assert_eq!(
            attrs("Shift_L", "base", false),
            "SQ2LV_CTRL_MOD_INACTIVE | LV_BUTTONMATRIX_CTRL_NO_REPEAT | 3"
        );
        assert_eq!(
            attrs("Shift_L", "upper", false),
            "SQ2LV_CTRL_MOD_ACTIVE | LV_BUTTONMATRIX_CTRL_NO_REPEAT | 3"
        );
    }

    #[test]
    fn test_modifier() {
        assert_eq!(
            attrs("Ctrl", "base", false),
            "SQ2LV_CTRL_MOD_INACTIVE | LV_BUTTONMATRIX_CTRL_NO_REPEAT | 3"
        );
    }

    #[test]
    fn test_non_character_buttons() {
        assert_eq!(attrs("BackSpace", "base", false), "SQ2LV_CTRL_NON_CHAR | 3");
        assert_eq!(
            attrs("1#", "base", false),
            "SQ2LV_CTRL_NON_CHAR | LV_BUTTONMATRIX_CTRL_NO_REPEAT | 3"
        );
        assert_eq!(attrs("←", "base", false), "SQ2LV_CTRL_NON_CHAR | 2");
    }

    #[test]
    fn test_exempt_buttons() {
        assert_eq!(attrs("space", "base", false), "7");
        assert_eq!(attrs("period", "base", false), "LV_BUTTONMATRIX_CTRL_NO_REPEAT | 2");
    }

    #[test]
    fn test_extra_row_and_hidden() {
        assert_eq!(
            attrs("q", "base", true),
            "LV_BUTTONMATRIX_CTRL_POPOVER | LV_BUTTONMATRIX_CTRL_NO_REPEAT | SQ2LV_CTRL_NON_CHAR | 2"
        );
        let hidden = {
            let buttons = buttons();
            resolve(HIDDEN_KEY, &Role::Plain, true, &buttons)
        };
        assert!(hidden.flags.contains(&CtrlFlag::Hidden));
        assert!(hidden.flags.contains(&CtrlFlag::NonChar));
        assert_eq!(hidden.width, Width::Narrow);
    }

    #[test]
    fn test_space_without_button_is_narrow() {
        let buttons = Buttons::new();
        let attributes = resolve(SPACE_KEY, &Role::Plain, false, &buttons);
        assert!(attributes.flags.is_empty());
        assert_eq!(attributes.width, Width::Narrow);
    }

    proptest! {
        #[test]
        fn test_resolution_is_deterministic(
            key in prop::sample::select(vec!["q", "Q", "space", "Shift_L", "Ctrl", "1#", "period", "BackSpace", "↑", "<hidden>"]),
            view in prop::sample::select(vec!["base", "upper", "numbers"]),
            extra_row in any::<bool>(),
        ) {
            let buttons = buttons();
            let first = resolve(key, &Role::resolve(key, view, &buttons), extra_row, &buttons);
            let second = resolve(key, &Role::resolve(key, view, &buttons), extra_row, &buttons);
            prop_assert_eq!(first, second);
        }
    }
}
