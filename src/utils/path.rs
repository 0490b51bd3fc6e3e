//! Path utilities: expand ~ in configured paths.

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
        assert_eq!(expand_tilde("/srv/db.sqlite"), PathBuf::from("/srv/db.sqlite"));
        assert_eq!(expand_tilde("rel/db.sqlite"), PathBuf::from("rel/db.sqlite"));
    }

    #[test]
    fn tilde_is_expanded_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x/db.sqlite"), home.join("x/db.sqlite"));
        }
    }
}
