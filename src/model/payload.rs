use std::path::Path;

/// Fetched script text, wrapped as an invocable script block so arguments can follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    text: String,
    augmented: bool,
}

impl Payload {
    pub fn from_script(script: &str) -> Self {
        let script = script.strip_prefix('\u{feff}').unwrap_or(script);
        Self {
            text: format!("& {{\n{}\n}}", script.trim_end()),
            augmented: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append `<flag> "<preset>"` when the preset exists on disk right now.
    ///
    /// Applied at most once per payload; later calls leave the text untouched.
    pub fn augment_with_preset(&mut self, flag: &str, preset: &Path) -> bool {
        if self.augmented || !preset.exists() {
            return false;
        }

        self.text
            .push_str(&format!(" {flag} \"{}\"", preset.display()));
        self.augmented = true;
        true
    }
}
