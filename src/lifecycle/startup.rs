//! Startup helpers.

use std::io;
use std::path::PathBuf;

/// Classpath used when none is configured, relative to the working directory.
pub const DEFAULT_CLASSPATH: &str = "src/resources";

/// The configured classpath, or `<working-directory>/src/resources`.
pub fn resolve_classpath(configured: Option<PathBuf>) -> io::Result<PathBuf> {
    match configured {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => Ok(std::env::current_dir()?.join(DEFAULT_CLASSPATH)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_classpath_is_kept() {
        let path = PathBuf::from("/etc/app");
        assert_eq!(resolve_classpath(Some(path.clone())).unwrap(), path);
    }

    #[test]
    fn default_is_under_working_directory() {
        let resolved = resolve_classpath(None).unwrap();
        assert!(resolved.ends_with("src/resources"));
        assert!(resolved.is_absolute());

        let empty = resolve_classpath(Some(PathBuf::new())).unwrap();
        assert_eq!(empty, resolved);
    }
}
