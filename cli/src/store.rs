use std::path::Path;

use jigsaw_core::{Rules, SavedSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SaveFormat {
    Json,
    Binary,
}

impl SaveFormat {
    pub(crate) fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bin") => SaveFormat::Binary,
            _ => SaveFormat::Json,
        }
    }
}

pub(crate) fn read_save(path: &Path) -> Result<SavedSession, Box<dyn std::error::Error>> {
    let saved = match SaveFormat::for_path(path) {
        SaveFormat::Binary => SavedSession::from_bytes(&std::fs::read(path)?)?,
        SaveFormat::Json => SavedSession::from_json(&std::fs::read_to_string(path)?)?,
    };
    log::debug!("read {} pieces from {}", saved.pieces.len(), path.display());
    Ok(saved)
}

pub(crate) fn write_save(
    path: &Path,
    saved: &SavedSession,
) -> Result<(), Box<dyn std::error::Error>> {
    match SaveFormat::for_path(path) {
        SaveFormat::Binary => std::fs::write(path, saved.to_bytes()?)?,
        SaveFormat::Json => std::fs::write(path, saved.to_json_pretty()?)?,
    }
    log::debug!("wrote save to {}", path.display());
    Ok(())
}

pub(crate) fn load_rules(path: Option<&Path>) -> Result<Rules, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };
    let text = std::fs::read_to_string(path)?;
    let rules: Rules = toml::from_str(&text)?;
    log::debug!("loaded rules from {}", path.display());
    Ok(rules.sanitized())
}
