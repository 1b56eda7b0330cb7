use mpdctl_core::{is_stream_uri, DirectorySetting};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves a configured directory to a usable path.
///
/// `probed` is the value the daemon reported, only available over a local
/// socket. Any path that does not point at a readable directory resolves to
/// `None`, which callers treat as "feature unavailable".
pub fn resolve_directory(
    label: &str,
    setting: &DirectorySetting,
    probed: Option<&str>,
) -> Option<PathBuf> {
    let candidate = match setting {
        DirectorySetting::Auto => match probed {
            Some(value) if is_stream_uri(value) => {
                tracing::warn!(directory = label, value, "MPD reported a stream URI, ignoring");
                return None;
            }
            Some(value) if !value.is_empty() => value,
            _ => {
                tracing::info!(directory = label, "not reported by MPD, disabling");
                return None;
            }
        },
        DirectorySetting::Path(path) => match path.to_str() {
            Some(path) => path,
            None => {
                tracing::error!(directory = label, path = %path.display(), "path is not valid UTF-8");
                return None;
            }
        },
        DirectorySetting::None => {
            tracing::info!(directory = label, "disabled by configuration");
            return None;
        }
        DirectorySetting::Invalid(raw) => {
            tracing::error!(directory = label, value = %raw, "invalid directory setting");
            return None;
        }
    };

    let path = Path::new(strip_trailing_separator(candidate));
    if is_readable_dir(path) {
        tracing::info!(directory = label, path = %path.display(), "directory resolved");
        Some(path.to_path_buf())
    } else {
        tracing::warn!(directory = label, path = %path.display(), "not a readable directory, disabling");
        None
    }
}

fn strip_trailing_separator(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && !path.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn is_readable_dir(path: &Path) -> bool {
    path.is_dir() && fs::read_dir(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn auto_uses_probed_value() {
        let dir = tempdir().unwrap();
        let probed = format!("{}/", dir.path().display());
        let resolved = resolve_directory("music", &DirectorySetting::Auto, Some(probed.as_str()));
        assert_eq!(resolved.as_deref(), Some(dir.path()));
    }

    #[test]
    fn auto_without_probe_is_empty() {
        assert_eq!(resolve_directory("music", &DirectorySetting::Auto, None), None);
        assert_eq!(
            resolve_directory("music", &DirectorySetting::Auto, Some("http://host/music")),
            None
        );
    }

    #[test]
    fn explicit_path_ignores_probe() {
        let configured = tempdir().unwrap();
        let probed = tempdir().unwrap();
        let setting = DirectorySetting::Path(configured.path().to_path_buf());
        let resolved =
            resolve_directory("playlist", &setting, Some(probed.path().to_str().unwrap()));
        assert_eq!(resolved.as_deref(), Some(configured.path()));
    }

    #[test]
    fn none_and_invalid_are_empty() {
        let probed = tempdir().unwrap();
        let probed = probed.path().to_str().unwrap();
        assert_eq!(resolve_directory("music", &DirectorySetting::None, Some(probed)), None);
        assert_eq!(
            resolve_directory("music", &DirectorySetting::from("music"), Some(probed)),
            None
        );
    }

    #[test]
    fn missing_or_non_directory_paths_are_empty() {
        let dir = tempdir().unwrap();
        let missing = DirectorySetting::Path(dir.path().join("missing"));
        assert_eq!(resolve_directory("music", &missing, None), None);

        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert_eq!(resolve_directory("music", &DirectorySetting::Path(file), None), None);
    }

    #[test]
    fn trailing_separators() {
        assert_eq!(strip_trailing_separator("/srv/music/"), "/srv/music");
        assert_eq!(strip_trailing_separator("/srv/music"), "/srv/music");
        assert_eq!(strip_trailing_separator("/"), "/");
    }
}
