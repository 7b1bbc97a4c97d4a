//! Top-level layout entries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const APP_PREFIX: &str = "app:";
const FOLDER_PREFIX: &str = "folder:";

/// One slot in the top-level layout
///
/// Serialized as `{"type": "app", "value": "<id>"}`. The `app:<id>` /
/// `folder:<id>` text form is only used at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Entry {
    App(String),
    Folder(String),
}

impl Entry {
    pub fn app(id: impl Into<String>) -> Self {
        Entry::App(id.into())
    }

    pub fn folder(id: impl Into<String>) -> Self {
        Entry::Folder(id.into())
    }

    /// The referenced program or folder id
    pub fn raw_id(&self) -> &str {
        match self {
            Entry::App(id) | Entry::Folder(id) => id,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::App(id) => write!(f, "{}{}", APP_PREFIX, id),
            Entry::Folder(id) => write!(f, "{}{}", FOLDER_PREFIX, id),
        }
    }
}

impl FromStr for Entry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix(APP_PREFIX) {
            Ok(Entry::App(id.to_string()))
        } else if let Some(id) = s.strip_prefix(FOLDER_PREFIX) {
            Ok(Entry::Folder(id.to_string()))
        } else {
            Err(Error::InvalidEntryRef(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_refs() {
        assert_eq!("app:com.example".parse::<Entry>().unwrap(), Entry::app("com.example"));
        assert_eq!("folder:f1".parse::<Entry>().unwrap(), Entry::folder("f1"));
        assert!("widget:x".parse::<Entry>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        let entry = Entry::app("path:/Applications/Foo.app");
        assert_eq!(entry.to_string(), "app:path:/Applications/Foo.app");
        assert_eq!(entry.to_string().parse::<Entry>().unwrap(), entry);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&Entry::folder("f1")).unwrap();
        assert_eq!(json, r#"{"type":"folder","value":"f1"}"#);

        let entry: Entry = serde_json::from_str(r#"{"type":"app","value":"a"}"#).unwrap();
        assert_eq!(entry, Entry::app("a"));
    }
}
