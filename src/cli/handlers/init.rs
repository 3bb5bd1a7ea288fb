use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::store::{self, STORE_DIR};

const CONFIG_TOML_TEMPLATE: &str = r##"[project]
name = "{name}"

[ids]
prefix = "{prefix}"

# --- Layout ---
# Geometry of the mindmap, in pixels (virtual pixels in the terminal).
#
# [layout]
# node_width = 200.0
# node_height = 60.0
# vertical_spacing = 20.0
# horizontal_spacing = 100.0
# curve_tension = 0.4
# detour_margin = 80.0

# --- Viewport ---
#
# [viewport]
# min_scale = 0.2
# max_scale = 2.0
# zoom_sensitivity = 0.001

# --- UI Customization ---
# Uncomment and edit to override defaults.

[ui]
# cell_width = 8.0
# cell_height = 16.0
# depth_palette = ["#4488FF", "#44DDFF", "#44FF88", "#FFD700", "#FB4196", "#CC66FF"]
#
# [ui.colors]
# background = "#1E1E2E"
# text = "#E0E0F0"
# dim = "#6C6C8A"
# highlight = "#FB4196"
# node = "#2A2A40"
"##;

/// ID prefixes are 1-5 uppercase ASCII letters
fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() || prefix.len() > 5 || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(format!(
            "invalid prefix \"{}\": use 1-5 uppercase letters (e.g. \"T\" or \"HOME\")",
            prefix
        ));
    }
    Ok(())
}

/// Infer a project name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_config_toml(name: &str, prefix: &str) -> String {
    CONFIG_TOML_TEMPLATE
        .replace("{name}", &name.replace('"', "'"))
        .replace("{prefix}", prefix)
}

pub fn cmd_init(args: InitArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    validate_prefix(&args.prefix)?;

    // Note an enclosing store; the new one will shadow it
    if let Some(parent) = dir.parent()
        && let Ok(parent_root) = store::discover_store(parent)
    {
        eprintln!(
            "Note: parent store found at {}/",
            parent_root.join(STORE_DIR).display()
        );
    }

    let name = args.name.unwrap_or_else(|| {
        dir.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    store::init_store(dir, &render_config_toml(&name, &args.prefix), args.force)?;
    println!("Initialized taskmap: {}", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::MapConfig;

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("T").is_ok());
        assert!(validate_prefix("HOME").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("home").is_err());
        assert!(validate_prefix("TOOLONG").is_err());
        assert!(validate_prefix("T1").is_err());
    }

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("weekend-plans"), "Weekend Plans");
        assert_eq!(infer_name("house"), "House");
    }

    #[test]
    fn rendered_template_parses() {
        let text = render_config_toml("My \"Big\" Move", "MV");
        let config: MapConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.project.name, "My 'Big' Move");
        assert_eq!(config.ids.prefix, "MV");
        assert_eq!(config.layout, Default::default());
    }
}
