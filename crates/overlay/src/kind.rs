/// The three overlay media kinds. Each kind is a singleton: at most one
/// active resource per kind at any time, while the kinds themselves are
/// mutually independent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Audio,
    Image,
    Video,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 3] = [OverlayKind::Audio, OverlayKind::Image, OverlayKind::Video];

    pub fn label(self) -> &'static str {
        match self {
            OverlayKind::Audio => "sound",
            OverlayKind::Image => "image",
            OverlayKind::Video => "video",
        }
    }

    pub fn folder_prefix(self) -> &'static str {
        match self {
            OverlayKind::Audio => "sounds/",
            OverlayKind::Image => "images/",
            OverlayKind::Video => "movies/",
        }
    }

    pub fn default_extension(self) -> &'static str {
        match self {
            OverlayKind::Audio => ".mp3",
            OverlayKind::Image => ".png",
            OverlayKind::Video => ".mp4",
        }
    }

    pub fn recognized_extensions(self) -> &'static [&'static str] {
        match self {
            OverlayKind::Audio => &[".mp3", ".ogg", ".wav"],
            OverlayKind::Image => &[".png", ".jpg", ".jpeg", ".gif", ".webp"],
            OverlayKind::Video => &[".mp4", ".webm", ".ogv"],
        }
    }
}

/// Normalizes a user-supplied media name: trim, prepend the kind's folder
/// prefix when missing, append the kind's default extension when none of
/// the recognized ones is present (case-insensitive).
pub fn normalize_name(kind: OverlayKind, raw: &str) -> String {
    let trimmed = raw.trim();
    let mut name = if trimmed.starts_with(kind.folder_prefix()) {
        trimmed.to_string()
    } else {
        format!("{}{}", kind.folder_prefix(), trimmed)
    };

    let lower = name.to_ascii_lowercase();
    if !kind
        .recognized_extensions()
        .iter()
        .any(|ext| lower.ends_with(ext))
    {
        name.push_str(kind.default_extension());
    }
    name
}
