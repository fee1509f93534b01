/// Relative-path safety checks.
///
/// Map documents, and the sound/image/video names typed into commands, are
/// untrusted strings that end up in URLs under the extension root. Every
/// component that touches a file path funnels it through here first.
///
/// Rejection contract:
/// - empty or all-whitespace input,
/// - any `..` occurrence,
/// - a leading `/` or `\`,
/// - a doubled backslash anywhere,
/// - a drive-letter prefix (`C:`, `z:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    Empty,
    Traversal(String),
    Absolute(String),
    DoubledBackslash(String),
    DriveLetter(String),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::Empty => write!(f, "path is empty"),
            PathError::Traversal(p) => write!(f, "path contains a parent traversal: {p}"),
            PathError::Absolute(p) => write!(f, "path is absolute: {p}"),
            PathError::DoubledBackslash(p) => write!(f, "path contains a doubled backslash: {p}"),
            PathError::DriveLetter(p) => write!(f, "path has a drive-letter prefix: {p}"),
        }
    }
}

impl std::error::Error for PathError {}

/// Folder prefixes that mark a path as already rooted within the host.
pub const HOST_FOLDERS: [&str; 4] = ["maps/", "images/", "sounds/", "movies/"];

/// Validates that `path` is a safe relative path.
pub fn validate_relative(path: &str) -> Result<(), PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }
    if path.contains("..") {
        return Err(PathError::Traversal(path.to_string()));
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(PathError::Absolute(path.to_string()));
    }
    if path.contains("\\\\") {
        return Err(PathError::DoubledBackslash(path.to_string()));
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Err(PathError::DriveLetter(path.to_string()));
    }
    Ok(())
}

pub fn is_host_prefixed(path: &str) -> bool {
    HOST_FOLDERS.iter().any(|p| path.starts_with(p))
}

/// Validates `path`, then roots it under `base_folder` unless it already
/// carries one of the recognized host folder prefixes.
pub fn resolve(path: &str, base_folder: &str) -> Result<String, PathError> {
    validate_relative(path)?;
    if is_host_prefixed(path) {
        return Ok(path.to_string());
    }
    Ok(format!("{base_folder}/{path}"))
}

#[cfg(test)]
mod tests {
    use super::{PathError, resolve, validate_relative};

    #[test]
    fn accepts_plain_relative_paths() {
        assert!(validate_relative("maps/city.json").is_ok());
        assert!(validate_relative("city.json").is_ok());
        assert!(validate_relative("sounds/ambient forest.mp3").is_ok());
    }

    #[test]
    fn rejects_traversal_and_absolute_forms() {
        assert_eq!(
            validate_relative("../etc/passwd"),
            Err(PathError::Traversal("../etc/passwd".into()))
        );
        assert_eq!(
            validate_relative("maps/../../secret.json"),
            Err(PathError::Traversal("maps/../../secret.json".into()))
        );
        assert_eq!(
            validate_relative("/etc/passwd"),
            Err(PathError::Absolute("/etc/passwd".into()))
        );
        assert_eq!(
            validate_relative("\\share\\x"),
            Err(PathError::Absolute("\\share\\x".into()))
        );
        assert_eq!(
            validate_relative("a\\\\b"),
            Err(PathError::DoubledBackslash("a\\\\b".into()))
        );
        assert_eq!(
            validate_relative("C:stuff.json"),
            Err(PathError::DriveLetter("C:stuff.json".into()))
        );
        assert_eq!(validate_relative("   "), Err(PathError::Empty));
    }

    #[test]
    fn resolve_keeps_host_prefixed_paths_verbatim() {
        assert_eq!(resolve("maps/city.json", "maps").unwrap(), "maps/city.json");
        assert_eq!(resolve("sounds/a.mp3", "maps").unwrap(), "sounds/a.mp3");
    }

    #[test]
    fn resolve_roots_bare_paths_under_the_base_folder() {
        assert_eq!(resolve("city.json", "maps").unwrap(), "maps/city.json");
    }

    #[test]
    fn resolve_fails_closed_on_unsafe_input() {
        assert!(resolve("../city.json", "maps").is_err());
    }
}
