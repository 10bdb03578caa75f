use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Publishing settings.
///
/// These are read once and passed down to every renderer, so a single
/// publish call always sees one consistent set of toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Settings {
    /// Title of the published set, used in page titles and the PDF cover.
    pub title: String,

    /// Version string shown next to the title.
    pub version: String,

    /// Base URL of the Jira instance that `jira` attributes refer to.
    ///
    /// Issue keys are linked as `{jira_url}/browse/{KEY}`.
    pub jira_url: String,

    /// Whether heading items show their level number.
    pub publish_heading_levels: bool,

    /// Whether non-heading items show their level number.
    pub publish_body_levels: bool,

    /// Whether child links and stakeholder-derived links are rendered.
    pub publish_child_links: bool,

    /// Whether references are shown as resolved file locations rather than
    /// the raw keyword.
    pub check_ref: bool,

    /// Whether item headers replace uids in headings and implemented badges
    /// are shown.
    pub enable_headers: bool,

    /// YAML file with test results keyed by test uid.
    pub result_file: Option<PathBuf>,

    /// Diagram rendering service (Kroki API compatible).
    pub uml_server: String,

    /// Timeout for a single diagram request, in seconds.
    pub uml_timeout_secs: u64,

    /// Program converting HTML on stdin into a PDF file.
    pub pdf_command: String,

    /// Prefix for asset URLs in generated pages.
    pub baseurl: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: String::new(),
            jira_url: String::new(),
            publish_heading_levels: true,
            publish_body_levels: true,
            publish_child_links: true,
            check_ref: false,
            enable_headers: true,
            result_file: None,
            uml_server: default_uml_server(),
            uml_timeout_secs: default_uml_timeout_secs(),
            pdf_command: default_pdf_command(),
            baseurl: String::new(),
        }
    }
}

impl Settings {
    /// Loads the settings from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse settings file: {e}"))
    }

    /// The title used for whole-set pages: `"{title} - {version}"`.
    #[must_use]
    pub fn full_title(&self) -> String {
        format!("{} - {}", self.title, self.version)
    }
}

fn default_title() -> String {
    "Requirements".to_string()
}

fn default_uml_server() -> String {
    "https://kroki.io".to_string()
}

const fn default_uml_timeout_secs() -> u64 {
    30
}

fn default_pdf_command() -> String {
    "weasyprint".to_string()
}

const fn enabled() -> bool {
    true
}

/// The serialized versions of the settings.
/// This allows for future changes to the settings format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_title")]
        title: String,

        #[serde(default)]
        version: String,

        #[serde(default)]
        jira_url: String,

        #[serde(default = "enabled")]
        publish_heading_levels: bool,

        #[serde(default = "enabled")]
        publish_body_levels: bool,

        #[serde(default = "enabled")]
        publish_child_links: bool,

        #[serde(default)]
        check_ref: bool,

        #[serde(default = "enabled")]
        enable_headers: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        result_file: Option<PathBuf>,

        #[serde(default = "default_uml_server")]
        uml_server: String,

        #[serde(default = "default_uml_timeout_secs")]
        uml_timeout_secs: u64,

        #[serde(default = "default_pdf_command")]
        pdf_command: String,

        #[serde(default)]
        baseurl: String,
    },
}

impl From<Versions> for Settings {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                title,
                version,
                jira_url,
                publish_heading_levels,
                publish_body_levels,
                publish_child_links,
                check_ref,
                enable_headers,
                result_file,
                uml_server,
                uml_timeout_secs,
                pdf_command,
                baseurl,
            } => Self {
                title,
                version,
                jira_url,
                publish_heading_levels,
                publish_body_levels,
                publish_child_links,
                check_ref,
                enable_headers,
                result_file,
                uml_server,
                uml_timeout_secs,
                pdf_command,
                baseurl,
            },
        }
    }
}

impl From<Settings> for Versions {
    fn from(settings: Settings) -> Self {
        Self::V1 {
            title: settings.title,
            version: settings.version,
            jira_url: settings.jira_url,
            publish_heading_levels: settings.publish_heading_levels,
            publish_body_levels: settings.publish_body_levels,
            publish_child_links: settings.publish_child_links,
            check_ref: settings.check_ref,
            enable_headers: settings.enable_headers,
            result_file: settings.result_file,
            uml_server: settings.uml_server,
            uml_timeout_secs: settings.uml_timeout_secs,
            pdf_command: settings.pdf_command,
            baseurl: settings.baseurl,
        }
    }
}
