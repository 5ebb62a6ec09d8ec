// User settings
// Loaded from <config dir>/retitle/settings.toml, or from $RETITLE_CONFIG

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use retitle_recon::MatchPolicy;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "RETITLE_CONFIG";

pub const DEFAULT_ARCHIVE_NAME: &str = "renamed_pdfs_{date}.zip";
pub const DEFAULT_REPORT_STEM: &str = "similarity_results";
pub const DEFAULT_SHEET_NAME: &str = "Similarity Results";
/// Renders like `Thu Mar 14 2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%a %b %d %Y";
pub const DEFAULT_REPORT_FORMAT: &str = "xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Read { path, message } => {
                write!(f, "cannot read {}: {}", path.display(), message)
            }
            SettingsError::Parse { path, message } => {
                write!(f, "cannot parse {}: {}", path.display(), message)
            }
            SettingsError::Invalid(msg) => write!(f, "invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Where and how batch outputs are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output directory; `None` = current directory.
    pub dir: Option<PathBuf>,
    /// Archive file name; `{date}` is replaced by the run date.
    pub archive_name: String,
    /// Report file name without extension.
    pub report_stem: String,
    pub sheet_name: String,
    /// chrono strftime format used for `{date}`.
    pub date_format: String,
    /// "xlsx" or "csv".
    pub report_format: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: None,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            report_stem: DEFAULT_REPORT_STEM.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            report_format: DEFAULT_REPORT_FORMAT.to_string(),
        }
    }
}

impl OutputSettings {
    pub fn archive_file_name(&self, date: &str) -> String {
        self.archive_name.replace("{date}", date)
    }

    pub fn report_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.report_stem, extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Default reference list, used when `--corpus` is not given.
    pub corpus: Option<PathBuf>,
    pub matching: MatchPolicy,
    pub output: OutputSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("retitle")
            .join("settings.toml")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Strict variant of `load`: any problem with the file is an error.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings: Settings = toml::from_str(&contents).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.matching
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;

        let output = &self.output;
        if !matches!(output.report_format.to_ascii_lowercase().as_str(), "xlsx" | "csv") {
            return Err(SettingsError::Invalid(format!(
                "output.report_format must be \"xlsx\" or \"csv\", got \"{}\"",
                output.report_format
            )));
        }
        if output.archive_name.trim().is_empty() {
            return Err(SettingsError::Invalid("output.archive_name is empty".into()));
        }
        if output.report_stem.trim().is_empty() {
            return Err(SettingsError::Invalid("output.report_stem is empty".into()));
        }
        if output.sheet_name.trim().is_empty() {
            return Err(SettingsError::Invalid("output.sheet_name is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.matching, MatchPolicy::default());
        assert_eq!(s.output.archive_file_name("Thu Mar 14 2024"), "renamed_pdfs_Thu Mar 14 2024.zip");
        assert_eq!(s.output.report_file_name("xlsx"), "similarity_results.xlsx");
        assert_eq!(s.output.sheet_name, "Similarity Results");
        assert!(s.corpus.is_none());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "corpus = \"/srv/names.txt\"\n\n[matching]\ncutoff = 70\n\n[output]\nreport_format = \"csv\"\n",
        )
        .unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.corpus, Some(PathBuf::from("/srv/names.txt")));
        assert_eq!(s.matching.limit, 5);
        assert_eq!(s.matching.cutoff, 70);
        assert_eq!(s.output.report_format, "csv");
        assert_eq!(s.output.archive_name, DEFAULT_ARCHIVE_NAME);
    }

    #[test]
    fn out_of_range_cutoff_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[matching]\ncutoff = 101\n").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn unknown_report_format_is_invalid() {
        let mut s = Settings::default();
        s.output.report_format = "pdf".into();
        assert!(matches!(s.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[matching\nlimit = ").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
        assert!(err.to_string().starts_with("cannot read"));
    }
}
