use evdev::KeyCode as K;

/// Raw key used to fill placeholder rows
pub(crate) const HIDDEN_KEY: &str = "<hidden>";
pub(crate) const SPACE_KEY: &str = "space";

const IGNORED_KEYS: &[&str] = &["preferences"];

/// Named arrow keys always take their caption from the static table, even when
/// the layout's buttons table carries a label for them.
const NAMED_ARROWS: &[&str] = &["Up", "Left", "Down", "Right"];

/// Arrow symbols as they appear in rows, including the ones inserted around space
pub(crate) const ARROW_SYMBOLS: &[&str] = &["↑", "←", "↓", "→"];

const LETTERS: [K; 26] = [
    K::KEY_A,
    K::KEY_B,
    K::KEY_C,
    K::KEY_D,
    K::KEY_E,
    K::KEY_F,
    K::KEY_G,
    K::KEY_H,
    K::KEY_I,
    K::KEY_J,
    K::KEY_K,
    K::KEY_L,
    K::KEY_M,
    K::KEY_N,
    K::KEY_O,
    K::KEY_P,
    K::KEY_Q,
    K::KEY_R,
    K::KEY_S,
    K::KEY_T,
    K::KEY_U,
    K::KEY_V,
    K::KEY_W,
    K::KEY_X,
    K::KEY_Y,
    K::KEY_Z,
];

const DIGITS: [K; 10] = [
    K::KEY_0,
    K::KEY_1,
    K::KEY_2,
    K::KEY_3,
    K::KEY_4,
    K::KEY_5,
    K::KEY_6,
    K::KEY_7,
    K::KEY_8,
    K::KEY_9,
];

/// Caption shown on a key of the button matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Keycap {
    /// Preprocessor symbol provided by LVGL or the sq2lv runtime, e.g. `LV_SYMBOL_OK`
    Symbol(String),
    /// Plain caption text, stored unescaped
    Text(String),
}

impl Keycap {
    pub fn from_caption(caption: &str) -> Self {
        if caption.starts_with("LV_") || caption.starts_with("SQ2LV_") {
            Keycap::Symbol(caption.to_owned())
        } else {
            Keycap::Text(caption.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Keycap::Symbol(s) | Keycap::Text(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Right-hand side C value for this caption
    pub fn to_c_value(&self) -> String {
        match self {
            Keycap::Symbol(symbol) => symbol.clone(),
            Keycap::Text(text) => format!("\"{}\"", escape(text)),
        }
    }
}

/// Escape backslashes and double quotes for embedding in a C string literal.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn is_ignored(key: &str) -> bool {
    IGNORED_KEYS.contains(&key)
}

pub(crate) fn is_named_arrow(key: &str) -> bool {
    NAMED_ARROWS.contains(&key)
}

pub(crate) fn is_arrow_symbol(key: &str) -> bool {
    ARROW_SYMBOLS.contains(&key)
}

/// Static caption for a raw key, if it differs from the key itself.
pub(crate) fn keycap_for_key(key: &str) -> Option<&'static str> {
    let caption = match key {
        "↑" | "Up" => "LV_SYMBOL_UP",
        "↓" | "Down" => "LV_SYMBOL_DOWN",
        "←" | "Left" => "LV_SYMBOL_LEFT",
        "→" | "Right" => "LV_SYMBOL_RIGHT",
        "BackSpace" => "LV_SYMBOL_BACKSPACE",
        "Return" => "LV_SYMBOL_OK",
        "Shift_L" => "SQ2LV_SYMBOL_SHIFT",
        "colon" => ":",
        "period" => ".",
        "space" => " ",
        _ => return None,
    };
    Some(caption)
}

/// Caption for a raw key, falling back to the key itself.
pub(crate) fn keycap(key: &str) -> Keycap {
    Keycap::from_caption(keycap_for_key(key).unwrap_or(key))
}

/// Whether a key keeps emitting while held down
pub(crate) fn is_repeatable(key: &str) -> bool {
    matches!(
        key,
        "BackSpace"
            | "Del"
            | "PgUp"
            | "PgDn"
            | "Return"
            | "space"
            | "↑"
            | "←"
            | "↓"
            | "→"
            | "Up"
            | "Left"
            | "Down"
            | "Right"
    )
}

fn shifted(code: K) -> Vec<K> {
    vec![K::KEY_LEFTSHIFT, code]
}

/// Scancodes (US layout) needed to produce a caption. `None` for captions the
/// table doesn't know, an empty sequence for captions that emit nothing.
pub(crate) fn scancodes_for_keycap(caption: &str) -> Option<Vec<K>> {
    let mut chars = caption.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            return Some(vec![LETTERS[(c as u8 - b'a') as usize]]);
        }
        if c.is_ascii_uppercase() {
            return Some(shifted(LETTERS[(c as u8 - b'A') as usize]));
        }
        if c.is_ascii_digit() {
            return Some(vec![DIGITS[(c as u8 - b'0') as usize]]);
        }
    }

    let codes = match caption {
        "ABC" | "abc" | "123" => vec![],
        "Alt" => vec![K::KEY_LEFTALT],
        "Ctrl" => vec![K::KEY_LEFTCTRL],
        "LV_SYMBOL_UP" | "↑" => vec![K::KEY_UP],
        "LV_SYMBOL_DOWN" | "↓" => vec![K::KEY_DOWN],
        "LV_SYMBOL_LEFT" | "←" => vec![K::KEY_LEFT],
        "LV_SYMBOL_RIGHT" | "→" => vec![K::KEY_RIGHT],
        "LV_SYMBOL_BACKSPACE" => vec![K::KEY_BACKSPACE],
        "LV_SYMBOL_OK" => vec![K::KEY_ENTER],
        " " => vec![K::KEY_SPACE],
        "PgUp" => vec![K::KEY_PAGEUP],
        "PgDn" => vec![K::KEY_PAGEDOWN],
        "Home" => vec![K::KEY_HOME],
        "End" => vec![K::KEY_END],
        "Esc" => vec![K::KEY_ESC],
        "Tab" => vec![K::KEY_TAB],
        "Pause" => vec![K::KEY_PAUSE],
        "Insert" => vec![K::KEY_INSERT],
        "Del" => vec![K::KEY_DELETE],
        "Menu" => vec![K::KEY_COMPOSE],
        "Break" => vec![K::KEY_BREAK],
        "F1" => vec![K::KEY_F1],
        "F2" => vec![K::KEY_F2],
        "F3" => vec![K::KEY_F3],
        "F4" => vec![K::KEY_F4],
        "F5" => vec![K::KEY_F5],
        "F6" => vec![K::KEY_F6],
        "F7" => vec![K::KEY_F7],
        "F8" => vec![K::KEY_F8],
        "F9" => vec![K::KEY_F9],
        "F10" => vec![K::KEY_F10],
        "F11" => vec![K::KEY_F11],
        "F12" => vec![K::KEY_F12],
        "!" => shifted(K::KEY_1),
        "@" => shifted(K::KEY_2),
        "#" => shifted(K::KEY_3),
        "$" => shifted(K::KEY_4),
        "%" => shifted(K::KEY_5),
        "^" => shifted(K::KEY_6),
        "&" => shifted(K::KEY_7),
        "*" => shifted(K::KEY_8),
        "(" => shifted(K::KEY_9),
        ")" => shifted(K::KEY_0),
        "-" => vec![K::KEY_MINUS],
        "_" => shifted(K::KEY_MINUS),
        "=" => vec![K::KEY_EQUAL],
        "+" => shifted(K::KEY_EQUAL),
        "[" => vec![K::KEY_LEFTBRACE],
        "{" => shifted(K::KEY_LEFTBRACE),
        "]" => vec![K::KEY_RIGHTBRACE],
        "}" => shifted(K::KEY_RIGHTBRACE),
        ";" => vec![K::KEY_SEMICOLON],
        ":" => shifted(K::KEY_SEMICOLON),
        "'" => vec![K::KEY_APOSTROPHE],
        "\"" => shifted(K::KEY_APOSTROPHE),
        "`" => vec![K::KEY_GRAVE],
        "~" => shifted(K::KEY_GRAVE),
        "\\" => vec![K::KEY_BACKSLASH],
        "|" => shifted(K::KEY_BACKSLASH),
        "," => vec![K::KEY_COMMA],
        "<" => shifted(K::KEY_COMMA),
        "." => vec![K::KEY_DOT],
        ">" => shifted(K::KEY_DOT),
        "/" => vec![K::KEY_SLASH],
        "?" => shifted(K::KEY_SLASH),
        _ => return None,
    };
    Some(codes)
}

/// Descriptive layer name for the views the runtime knows how to present
pub(crate) fn layer_name_for_view(view_id: &str) -> Option<&'static str> {
    let name = match view_id {
        "base" => "Lowercase letters",
        "upper" => "Uppercase letters",
        "numbers" => "Numbers / symbols",
        "eschars" => "Special characters",
        "symbols" => "Symbols",
        "actions" => "Actions",
        _ => return None,
    };
    Some(name)
}

/// Name fragment for a view inside C identifiers
pub(crate) fn view_c_identifier(view_id: &str) -> &str {
    match view_id {
        "base" => "lower",
        "eschars" => "special",
        _ => view_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REPEATABLE: &[&str] = &[
        "BackSpace",
        "Del",
        "PgUp",
        "PgDn",
        "Return",
        "space",
        "↑",
        "←",
        "↓",
        "→",
        "Up",
        "Left",
        "Down",
        "Right",
    ];

    #[test]
    fn test_repeatable_allow_list() {
        for key in REPEATABLE {
            assert!(is_repeatable(key), "{key} should repeat");
        }
        assert!(!is_repeatable("a"));
        assert!(!is_repeatable("Shift_L"));
        assert!(!is_repeatable("preferences"));
    }

    proptest! {
        #[test]
        fn test_repeatable_only_for_allow_list(key in "\\PC{0,12}") {
            prop_assert_eq!(is_repeatable(&key), REPEATABLE.contains(&key.as_str()));
        }
    }

    #[test]
    fn test_keycap_falls_back_to_key() {
        assert_eq!(keycap("q"), Keycap::Text("q".into()));
        assert_eq!(keycap("space"), Keycap::Text(" ".into()));
        assert_eq!(keycap("Return"), Keycap::Symbol("LV_SYMBOL_OK".into()));
        assert_eq!(keycap("Shift_L"), Keycap::Symbol("SQ2LV_SYMBOL_SHIFT".into()));
        assert_eq!(keycap("colon"), Keycap::Text(":".into()));
    }

    #[test]
    fn test_c_value_escapes_text() {
        assert_eq!(Keycap::Text("\\".into()).to_c_value(), "\"\\\\\"");
        assert_eq!(Keycap::Text("\"".into()).to_c_value(), "\"\\\"\"");
        assert_eq!(Keycap::Text("a".into()).to_c_value(), "\"a\"");
        assert_eq!(
            Keycap::Symbol("LV_SYMBOL_UP".into()).to_c_value(),
            "LV_SYMBOL_UP"
        );
    }

    #[test]
    fn test_scancodes_for_letters_and_digits() {
        assert_eq!(scancodes_for_keycap("a"), Some(vec![K::KEY_A]));
        assert_eq!(
            scancodes_for_keycap("Z"),
            Some(vec![K::KEY_LEFTSHIFT, K::KEY_Z])
        );
        assert_eq!(scancodes_for_keycap("7"), Some(vec![K::KEY_7]));
    }

    #[test]
    fn test_scancodes_for_symbols() {
        assert_eq!(scancodes_for_keycap("LV_SYMBOL_OK"), Some(vec![K::KEY_ENTER]));
        assert_eq!(scancodes_for_keycap(" "), Some(vec![K::KEY_SPACE]));
        assert_eq!(
            scancodes_for_keycap("\""),
            Some(vec![K::KEY_LEFTSHIFT, K::KEY_APOSTROPHE])
        );
        assert_eq!(scancodes_for_keycap("ABC"), Some(vec![]));
    }

    #[test]
    fn test_scancodes_for_unknown_caption() {
        assert_eq!(scancodes_for_keycap("π"), None);
        assert_eq!(scancodes_for_keycap("é"), None);
        assert_eq!(scancodes_for_keycap("SQ2LV_SYMBOL_SHIFT"), None);
    }

    #[test]
    fn test_view_tables() {
        assert_eq!(layer_name_for_view("base"), Some("Lowercase letters"));
        assert_eq!(layer_name_for_view("emoji"), None);
        assert_eq!(view_c_identifier("base"), "lower");
        assert_eq!(view_c_identifier("eschars"), "special");
        assert_eq!(view_c_identifier("numbers"), "numbers");
    }
}
