//! Document-level undo/redo key bindings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Undo,
    Redo,
}

/// A key press with modifiers. `key` is stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into().to_lowercase(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    fn normalized(&self) -> Self {
        Self {
            key: self.key.to_lowercase(),
            ..self.clone()
        }
    }
}

impl FromStr for KeyChord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chord = KeyChord::default();
        let mut key: Option<String> = None;
        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "" => return Err(format!("empty segment in key chord '{s}'")),
                "ctrl" | "control" => chord.ctrl = true,
                "meta" | "cmd" | "super" => chord.meta = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                other => {
                    if key.replace(other.to_string()).is_some() {
                        return Err(format!("more than one key in chord '{s}'"));
                    }
                }
            }
        }
        chord.key = key.ok_or_else(|| format!("no key in chord '{s}'"))?;
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.meta {
            write!(f, "meta+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    undo: Vec<KeyChord>,
    redo: Vec<KeyChord>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: vec![KeyChord::new("z").ctrl(), KeyChord::new("z").meta()],
            redo: vec![
                KeyChord::new("z").ctrl().shift(),
                KeyChord::new("z").meta().shift(),
                KeyChord::new("y").ctrl(),
            ],
        }
    }
}

impl KeyBindings {
    pub fn from_specs(undo: &[String], redo: &[String]) -> Result<Self, String> {
        let parse = |specs: &[String]| {
            specs
                .iter()
                .map(|spec| spec.parse::<KeyChord>())
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            undo: parse(undo)?,
            redo: parse(redo)?,
        })
    }

    pub fn resolve(&self, chord: &KeyChord) -> Option<KeyAction> {
        let chord = chord.normalized();
        if self.redo.contains(&chord) {
            return Some(KeyAction::Redo);
        }
        if self.undo.contains(&chord) {
            return Some(KeyAction::Undo);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_resolve_standard_chords() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.resolve(&KeyChord::new("z").ctrl()), Some(KeyAction::Undo));
        assert_eq!(bindings.resolve(&KeyChord::new("Z").meta()), Some(KeyAction::Undo));
        assert_eq!(
            bindings.resolve(&KeyChord::new("z").ctrl().shift()),
            Some(KeyAction::Redo)
        );
        assert_eq!(bindings.resolve(&KeyChord::new("y").ctrl()), Some(KeyAction::Redo));
        assert_eq!(bindings.resolve(&KeyChord::new("z")), None);
        assert_eq!(bindings.resolve(&KeyChord::new("z").ctrl().alt()), None);
    }

    #[test]
    fn parses_chord_strings() {
        let chord: KeyChord = "Ctrl+Shift+Z".parse().unwrap();
        assert_eq!(chord, KeyChord::new("z").ctrl().shift());
        assert_eq!(chord.to_string(), "ctrl+shift+z");
        assert!("ctrl+".parse::<KeyChord>().is_err());
        assert!("ctrl+shift".parse::<KeyChord>().is_err());
        assert!("a+b".parse::<KeyChord>().is_err());
    }

    #[test]
    fn from_specs_builds_custom_bindings() {
        let bindings =
            KeyBindings::from_specs(&["alt+u".to_string()], &["alt+r".to_string()]).unwrap();
        assert_eq!(bindings.resolve(&KeyChord::new("u").alt()), Some(KeyAction::Undo));
        assert_eq!(bindings.resolve(&KeyChord::new("z").ctrl()), None);
        assert!(KeyBindings::from_specs(&["ctrl+".to_string()], &[]).is_err());
    }
}
