//! Program metadata readers
//!
//! Minimal readers for the two on-disk formats the scanner understands:
//! XML `Info.plist` files inside `.app` bundles and freedesktop `.desktop`
//! entries. Binary plists are not decoded.

/// Fields read from a bundle's `Info.plist`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleInfo {
    pub identifier: Option<String>,
    pub display_name: Option<String>,
    pub name: Option<String>,
}

/// Fields read from a `.desktop` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopEntryInfo {
    pub name: Option<String>,
    pub entry_type: Option<String>,
    pub no_display: bool,
    pub hidden: bool,
}

impl DesktopEntryInfo {
    /// Whether the entry should appear in a launcher
    pub fn is_launchable(&self) -> bool {
        !self.no_display
            && !self.hidden
            && self
                .entry_type
                .as_deref()
                .map_or(true, |t| t == "Application")
    }
}

/// Read the string value following `<key>{key}</key>` in an XML plist
fn plist_string(xml: &str, key: &str) -> Option<String> {
    let marker = format!("<key>{}</key>", key);
    let rest = &xml[xml.find(&marker)? + marker.len()..];
    let rest = rest.trim_start();
    let value = rest.strip_prefix("<string>")?;
    let end = value.find("</string>")?;
    let value = unescape_xml(value[..end].trim());
    (!value.is_empty()).then_some(value)
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Parse the fields the launcher needs from an XML `Info.plist`
pub fn parse_info_plist(xml: &str) -> BundleInfo {
    BundleInfo {
        identifier: plist_string(xml, "CFBundleIdentifier"),
        display_name: plist_string(xml, "CFBundleDisplayName"),
        name: plist_string(xml, "CFBundleName"),
    }
}

/// Parse the `[Desktop Entry]` group of a `.desktop` file
pub fn parse_desktop_entry(contents: &str) -> DesktopEntryInfo {
    let mut info = DesktopEntryInfo::default();
    let mut in_entry_group = false;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_entry_group = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry_group {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Name" => info.name = Some(value.to_string()),
            "Type" => info.entry_type = Some(value.to_string()),
            "NoDisplay" => info.no_display = value.eq_ignore_ascii_case("true"),
            "Hidden" => info.hidden = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_plist() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>com.example.Sketch</string>
    <key>CFBundleName</key>
    <string>Sketch &amp; Draw</string>
</dict>
</plist>"#;

        let info = parse_info_plist(xml);
        assert_eq!(info.identifier.as_deref(), Some("com.example.Sketch"));
        assert_eq!(info.name.as_deref(), Some("Sketch & Draw"));
        assert_eq!(info.display_name, None);
    }

    #[test]
    fn test_parse_desktop_entry_ignores_other_groups() {
        let contents = "\
# comment
[Desktop Entry]
Type=Application
Name=Text Editor
Name[de]=Texteditor
Exec=gedit %U

[Desktop Action new-window]
Name=New Window
";
        let info = parse_desktop_entry(contents);
        assert_eq!(info.name.as_deref(), Some("Text Editor"));
        assert!(info.is_launchable());
    }

    #[test]
    fn test_hidden_entries_not_launchable() {
        assert!(!parse_desktop_entry("[Desktop Entry]\nName=X\nNoDisplay=true\n").is_launchable());
        assert!(!parse_desktop_entry("[Desktop Entry]\nName=X\nHidden=True\n").is_launchable());
        assert!(!parse_desktop_entry("[Desktop Entry]\nName=X\nType=Link\n").is_launchable());
    }
}
