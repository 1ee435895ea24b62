//! Inline image preview. Rendering is handed off to external tools:
//! chafa in the terminal's native pixel format first, chafa symbols as
//! the retry, imgcat after that. With neither installed the fallback
//! prints plain file info and an install hint.

use eyre::Result;
use std::path::Path;
use std::process::Command;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp", ".ico", ".svg",
];

/// Whether the path has a known image extension.
pub fn is_image_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// chafa output format for the terminal named by TERM_PROGRAM; `symbols`
/// works everywhere.
fn detect_format() -> &'static str {
    match std::env::var("TERM_PROGRAM").as_deref() {
        Ok("iTerm.app") | Ok("WezTerm") | Ok("Hyper") => "iterm",
        Ok("kitty") => "kitty",
        _ => "symbols",
    }
}

/// Render an image inline in the terminal.
pub fn view_image(path: &str) -> Result<()> {
    let meta = std::fs::metadata(path)?;
    let width = folio_tui::tui::terminal::detect_size().0.to_string();
    let basename = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let format = detect_format();
    let size_arg = format!("--size={width}");
    if run_tool("chafa", &[&size_arg, &format!("--format={format}"), path]) {
        println!("\n{} ({} bytes)", basename, meta.len());
        return Ok(());
    }
    if format != "symbols" && run_tool("chafa", &[&size_arg, "--format=symbols", path]) {
        println!("\n{} ({} bytes)", basename, meta.len());
        return Ok(());
    }
    if run_tool("imgcat", &[path]) {
        return Ok(());
    }

    println!("Image: {path}");
    println!("Size: {} bytes", meta.len());
    println!("Extension: {}", extension_of(path));
    println!("\nInstall chafa for terminal image preview:");
    println!("  brew install chafa");
    Ok(())
}

/// Run an external previewer with inherited stdio; false when the tool
/// is missing or exits non-zero.
fn run_tool(tool: &str, args: &[&str]) -> bool {
    Command::new(tool)
        .args(args)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_path_known_extensions() {
        assert!(is_image_path("shot.png"));
        assert!(is_image_path("photo.JPEG"));
        assert!(is_image_path("/tmp/icon.webp"));
    }

    #[test]
    fn test_is_image_path_rejects_text() {
        assert!(!is_image_path("notes.md"));
        assert!(!is_image_path("README"));
        assert!(!is_image_path("archive.png.txt"));
    }

    #[test]
    fn test_extension_of_preserves_case() {
        assert_eq!(extension_of("a/b.PNG"), ".PNG");
        assert_eq!(extension_of("no-extension"), "");
    }
}
