use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start or end with '/'")]
    DanglingSlash,
    #[error("sprite key must not contain an empty path segment")]
    EmptySegment,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key must not carry a file extension; got '.{extension}'")]
    FileExtension { extension: String },
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Sprite keys are asset-relative paths without extension, e.g. `units/engineer`.
/// The rendering layer maps them to files; the simulation only carries them around.
pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(SpriteKeyError::DanglingSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    if key.contains("//") {
        return Err(SpriteKeyError::EmptySegment);
    }
    if let Some((_, extension)) = key.rsplit_once('.') {
        return Err(SpriteKeyError::FileExtension {
            extension: extension.to_string(),
        });
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/')))
    {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}
