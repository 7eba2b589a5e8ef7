use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::{ProjectDirs, BaseDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    /// Directory name used for this profile's config and data
    pub fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "ontrack-dev",
            Profile::Prod => "ontrack",
        }
    }
}

fn project_dirs(profile: Profile) -> Option<ProjectDirs> {
    // "com" qualifier; on macOS this lands under ~/Library/Application Support/ontrack/
    ProjectDirs::from("com", "ontrack", profile.app_name())
}

/// Get the configuration directory path
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    project_dirs(profile).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (database, TUI log file)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    project_dirs(profile).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(path),
    }
}

/// Truncate to `max_width` characters, marking the cut with "..."
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: KeyCode,
    pub requires_ctrl: bool,
}

/// Ctrl, or on macOS also Option, which terminals report as Alt
pub fn has_primary_modifier(modifiers: KeyModifiers) -> bool {
    if cfg!(target_os = "macos") {
        modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    } else {
        modifiers.contains(KeyModifiers::CONTROL)
    }
}

/// Binding as shown in help and hints ("Ctrl+" reads "Opt+" on macOS)
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    if cfg!(target_os = "macos") {
        key_binding.replace("Ctrl+", "Opt+")
    } else {
        key_binding.to_string()
    }
}

/// Parse a binding from the config: a single character ("q"), a named key
/// ("Enter", "Left", "F1"), optionally prefixed with "Ctrl+"
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();
    let (requires_ctrl, key_part) = match key_str.strip_prefix("Ctrl+") {
        Some(rest) => (true, rest),
        None => (false, key_str),
    };
    Ok(ParsedKeyBinding {
        key_code: parse_key_code(key_part)?,
        requires_ctrl,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<KeyCode, String> {
    let code = match key_str {
        "Enter" => KeyCode::Enter,
        "Esc" | "Escape" => KeyCode::Esc,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "Space" | " " => KeyCode::Char(' '),
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Delete" => KeyCode::Delete,
        _ => {
            // F1..F12, then any single character
            let function_key = key_str
                .strip_prefix('F')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=12).contains(n));
            let mut chars = key_str.chars();
            match (function_key, chars.next(), chars.next()) {
                (Some(n), _, _) => KeyCode::F(n),
                (None, Some(c), None) => KeyCode::Char(c),
                (None, None, _) => return Err("Empty key binding".to_string()),
                _ => return Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    };
    Ok(code)
}

/// Whether a key event matches a configured binding string
pub fn matches_binding(binding: &str, key_event: &KeyEvent) -> Result<bool, String> {
    let parsed = parse_key_binding(binding)?;
    Ok(parsed.key_code == key_event.code
        && parsed.requires_ctrl == has_primary_modifier(key_event.modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_special_and_ctrl_bindings() {
        assert_eq!(parse_key_binding("q").unwrap().key_code, KeyCode::Char('q'));
        assert_eq!(parse_key_binding("Enter").unwrap().key_code, KeyCode::Enter);
        assert_eq!(parse_key_binding("F1").unwrap().key_code, KeyCode::F(1));

        let save = parse_key_binding("Ctrl+s").unwrap();
        assert_eq!(save.key_code, KeyCode::Char('s'));
        assert!(save.requires_ctrl);

        assert!(parse_key_binding("Hyper+x").is_err());
    }

    #[test]
    fn binding_match_respects_modifier() {
        let plain = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        let ctrl = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(matches_binding("Ctrl+s", &ctrl), Ok(true));
        assert_eq!(matches_binding("Ctrl+s", &plain), Ok(false));
        assert_eq!(matches_binding("s", &plain), Ok(true));
        assert!(matches_binding("Hyper+s", &plain).is_err());
    }

    #[test]
    fn expands_home_prefix_only() {
        assert_eq!(expand_path("/tmp/tasks.db"), PathBuf::from("/tmp/tasks.db"));
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            assert_eq!(expand_path("~/tasks.db"), home.join("tasks.db"));
        }
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("a long description", 9), "a long...");
    }

    #[test]
    fn profiles_use_separate_directories() {
        assert_ne!(Profile::Dev.app_name(), Profile::Prod.app_name());
    }
}
