//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> Option<String> {
        None
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn language() -> String {
        "zh-CN".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "src".into()
    }

    pub fn publish() -> PathBuf {
        "docs".into()
    }

    pub mod analytics {
        pub fn id() -> String {
            String::new()
        }
    }

    pub mod i18n {
        pub fn locales() -> Vec<String> {
            vec!["zh-CN".into(), "en-US".into()]
        }
    }
}

// ============================================================================
// [deploy] Section Defaults
// ============================================================================

pub mod deploy {
    pub mod git {
        use std::path::PathBuf;

        pub fn remote() -> String {
            "origin".into()
        }

        pub fn url() -> String {
            String::new()
        }

        pub fn branch() -> String {
            "main".into()
        }

        pub fn token_path() -> Option<PathBuf> {
            None
        }
    }

    pub mod dns {
        use std::path::PathBuf;

        pub fn domain() -> String {
            String::new()
        }

        pub fn pages_host() -> String {
            String::new()
        }

        pub fn token_path() -> Option<PathBuf> {
            None
        }
    }

    pub mod pages {
        use std::path::PathBuf;

        pub fn repo() -> String {
            String::new()
        }

        pub fn token_path() -> Option<PathBuf> {
            None
        }
    }
}

// ============================================================================
// [pull] Section Defaults
// ============================================================================

pub mod pull {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        "../publisher/out".into()
    }
}
