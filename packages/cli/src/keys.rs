//! Key scripts for `screenwright compose`.
//!
//! Plain characters are typed as-is. Named keys are written in angle
//! brackets (`<enter>`, `<tab>`, `<bold>`...), a literal newline is Enter
//! and `<lt>` types a `<`. A `<` that does not open a key name is typed literally.

use screenwright_editor::Key;

fn named_key(name: &str) -> Key {
    match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => Key::Enter,
        "tab" => Key::Tab,
        "backspace" | "bs" => Key::Backspace,
        "bold" => Key::Bold,
        "italic" => Key::Italic,
        "underline" => Key::Underline,
        "undo" => Key::Undo,
        "redo" => Key::Redo,
        "lt" => Key::Char('<'),
        _ => Key::Other(name.to_string()),
    }
}

/// Name between `<` and `>`, if `after` starts with one
fn key_name(after: &str) -> Option<&str> {
    let end = after.find('>')?;
    let name = &after[..end];
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    valid.then_some(name)
}

pub fn parse_script(script: &str) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut rest = script;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => match key_name(&rest[1..]) {
                Some(name) => {
                    keys.push(named_key(name));
                    rest = &rest[name.len() + 2..];
                }
                None => {
                    keys.push(Key::Char('<'));
                    rest = &rest[1..];
                }
            },
            '\r' => rest = &rest[1..],
            '\n' => {
                keys.push(Key::Enter);
                rest = &rest[1..];
            }
            c => {
                keys.push(Key::Char(c));
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    keys
}
