use rjren_catalog::DEFAULT_ENDPOINT;
use rjren_catalog::models::Locale;
use rjren_library::scan::DEFAULT_MAX_DEPTH;
use rjren_library::{AgeLabels, DEFAULT_MOVE_TEMPLATE, DEFAULT_TEMPLATE, DateFormat, Mode, TagRule};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub scraper: ScraperConfig,
    pub renamer: RenamerConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Depth below each root at which the scanner stops descending.
    pub max_depth: usize,
}
impl Default for ScannerConfig {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Remote catalog access. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub endpoint: String,
    pub locale: Locale,
    pub connect_timeout: u64,
    pub read_timeout: u64,
    /// Pause after every remote lookup; fractions are allowed.
    pub sleep_interval: f64,
    pub http_proxy: Option<String>,
}
impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            locale: Locale::default(),
            connect_timeout: 10,
            read_timeout: 10,
            sleep_interval: 3.0,
            http_proxy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeCategoryMap {
    pub r#gen: String,
    pub r15: String,
    pub r18: String,
}
impl Default for AgeCategoryMap {
    fn default() -> Self {
        let labels = AgeLabels::default();
        Self { r#gen: labels.general, r15: labels.r15, r18: labels.adult }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamerConfig {
    pub template: String,
    pub release_date_format: String,
    pub exclude_square_brackets_in_work_name: bool,
    pub illegal_character_to_full_width: bool,
    pub download_cover: bool,
    pub delimiter: String,
    pub cv_list_left: String,
    pub cv_list_right: String,
    pub series_left: String,
    pub series_right: String,
    /// `0` keeps every tag.
    pub tags_max_number: usize,
    /// Either `"tag"` or `["tag", "replacement"]`.
    pub tags_ordered_list: Vec<TagRule>,
    pub age_cat_map: AgeCategoryMap,
    pub age_cat_left: String,
    pub age_cat_right: String,
    pub age_cat_ignore_r18: bool,
    pub mode: Mode,
    /// Required by `MOVE` and `LINK`.
    pub move_root: Option<PathBuf>,
    pub move_template: String,
}
impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            release_date_format: DateFormat::DEFAULT.to_string(),
            exclude_square_brackets_in_work_name: true,
            illegal_character_to_full_width: false,
            download_cover: false,
            delimiter: " ".to_string(),
            cv_list_left: "(CV ".to_string(),
            cv_list_right: ")".to_string(),
            series_left: "[".to_string(),
            series_right: "]".to_string(),
            tags_max_number: 5,
            tags_ordered_list: Vec::new(),
            age_cat_map: AgeCategoryMap::default(),
            age_cat_left: "(".to_string(),
            age_cat_right: ")".to_string(),
            age_cat_ignore_r18: true,
            mode: Mode::default(),
            move_root: None,
            move_template: DEFAULT_MOVE_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Defaults to the platform's data directory.
    pub path: Option<PathBuf>,
}
