//! Path utilities: expand ~ in user supplied paths.

use std::path::PathBuf;

pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path.trim_start_matches("~/"));
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde("/tmp/x.db"), PathBuf::from("/tmp/x.db"));
        assert_eq!(expand_tilde(":memory:"), PathBuf::from(":memory:"));
    }

    #[test]
    fn tilde_is_expanded_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/data/x.db"), home.join("data/x.db"));
        }
    }
}
