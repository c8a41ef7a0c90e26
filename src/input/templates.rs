//! Controller binding templates
//!
//! Saves and loads gamepad binding tables as a sectioned text file:
//!
//! ```text
//! # Controller template: classic
//! [gamepad]
//! buttonA=+moveup
//! rightTrigger=+attack
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::gamepad::{GamepadBindings, GamepadButton};

/// Error type for template I/O
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: expected `button=binding`, found {text:?}")]
    Malformed { line: usize, text: String },
}

/// A named gamepad binding scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTemplate {
    pub name: String,
    pub bindings: GamepadBindings,
}

impl ControlTemplate {
    /// Template holding the stock bindings
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bindings: GamepadBindings::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), TemplateError> {
        let mut file = fs::File::create(path)?;

        writeln!(file, "# Controller template: {}", self.name)?;
        writeln!(file)?;
        writeln!(file, "[gamepad]")?;
        for (button, binding) in self.bindings.iter() {
            writeln!(file, "{}={}", button.name(), binding)?;
        }

        Ok(())
    }

    /// Load a template; buttons missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);

        let mut template = ControlTemplate::new("");
        let mut section = String::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(TemplateError::Malformed {
                    line: number + 1,
                    text: line.to_string(),
                });
            };

            if section != "gamepad" {
                continue;
            }
            match GamepadButton::from_name(key.trim()) {
                Some(button) => template.bindings.set(button, value),
                None => log::warn!("Ignoring unknown controller button {:?}", key.trim()),
            }
        }

        if let Some(stem) = path.file_stem() {
            template.name = stem.to_string_lossy().to_string();
        }

        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_new_template_has_stock_bindings() {
        let template = ControlTemplate::new("stock");
        assert_eq!(template.name, "stock");
        assert_eq!(template.bindings.get(GamepadButton::RightTrigger), "+attack");
        assert_eq!(template.bindings.get(GamepadButton::DpadUp), "");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("southpaw.cfg");

        let mut template = ControlTemplate::new("southpaw");
        template.bindings.set(GamepadButton::LeftTrigger, "+attack");
        template.bindings.set(GamepadButton::RightTrigger, "+zoom");
        template.bindings.set(GamepadButton::DpadUp, "say hi");
        template.save(&path).unwrap();

        let loaded = ControlTemplate::load(&path).unwrap();
        assert_eq!(loaded, template);
    }

    #[test]
    fn test_load_with_comments_and_unknown_buttons() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# A comment").unwrap();
        writeln!(file, "[gamepad]").unwrap();
        writeln!(file, "buttonA = +speed").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "turboButton=+attack").unwrap();
        writeln!(file, "[other]").unwrap();
        writeln!(file, "buttonB=+attack").unwrap();
        file.flush().unwrap();

        let template = ControlTemplate::load(file.path()).unwrap();
        assert_eq!(template.bindings.get(GamepadButton::A), "+speed");
        assert_eq!(template.bindings.get(GamepadButton::B), "+button2");
    }

    #[test]
    fn test_load_rejects_malformed_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[gamepad]").unwrap();
        writeln!(file, "buttonA").unwrap();
        file.flush().unwrap();

        let err = ControlTemplate::load(file.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ControlTemplate::load(&dir.path().join("absent.cfg")).unwrap_err();
        assert!(matches!(err, TemplateError::Io(_)));
    }
}
