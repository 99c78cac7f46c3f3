//! Conversions from configuration into the types the rest of the workspace
//! works with.

use crate::error::{ErrorKind, Result};
use crate::load::project_dirs;
use crate::model::Config;
use exn::{OptionExt, ResultExt};
use rjren_catalog::HttpSettings;
use rjren_library::{
    AgeLabels, Brackets, DateFormat, FormattingPolicy, IllegalCharacters, Mode, NameCompiler, NameTemplate, Operation,
};
use std::path::PathBuf;
use std::time::Duration;

impl Config {
    pub fn http_settings(&self) -> Result<HttpSettings> {
        let scraper = &self.scraper;
        let sleep_interval = Duration::try_from_secs_f64(scraper.sleep_interval)
            .or_raise(|| ErrorKind::Invalid("scraper.sleep_interval: must be a non-negative number of seconds".into()))?;
        Ok(HttpSettings {
            endpoint: scraper.endpoint.clone(),
            locale: scraper.locale,
            connect_timeout: Duration::from_secs(scraper.connect_timeout),
            read_timeout: Duration::from_secs(scraper.read_timeout),
            sleep_interval,
            proxy: scraper.http_proxy.clone().filter(|proxy| !proxy.is_empty()),
        })
    }

    pub fn policy(&self) -> Result<FormattingPolicy> {
        let renamer = &self.renamer;
        let date_format = renamer
            .release_date_format
            .parse::<DateFormat>()
            .or_raise(|| ErrorKind::Invalid("renamer.release_date_format".into()))?;
        Ok(FormattingPolicy {
            date_format,
            delimiter: renamer.delimiter.clone(),
            cv_brackets: Brackets::new(&renamer.cv_list_left, &renamer.cv_list_right),
            series_brackets: Brackets::new(&renamer.series_left, &renamer.series_right),
            age_brackets: Brackets::new(&renamer.age_cat_left, &renamer.age_cat_right),
            age_labels: AgeLabels {
                general: renamer.age_cat_map.r#gen.clone(),
                r15: renamer.age_cat_map.r15.clone(),
                adult: renamer.age_cat_map.r18.clone(),
            },
            ignore_r18: renamer.age_cat_ignore_r18,
            illegal_characters: match renamer.illegal_character_to_full_width {
                true => IllegalCharacters::FullWidth,
                false => IllegalCharacters::Strip,
            },
            strip_bracketed_name: renamer.exclude_square_brackets_in_work_name,
            tag_rules: renamer.tags_ordered_list.clone(),
            max_tags: renamer.tags_max_number,
        })
    }

    pub fn compiler(&self) -> Result<NameCompiler> {
        let parse = |key: &'static str, template: &str| -> Result<NameTemplate> {
            template.parse::<NameTemplate>().or_raise(|| ErrorKind::Invalid(key.into()))
        };
        Ok(NameCompiler::new(
            parse("renamer.template", &self.renamer.template)?,
            parse("renamer.move_template", &self.renamer.move_template)?,
            self.policy()?,
        ))
    }

    pub fn operation(&self) -> Result<Operation> {
        let root = || {
            self.renamer
                .move_root
                .clone()
                .ok_or_raise(|| ErrorKind::Invalid("renamer.move_root: required in this mode".into()))
        };
        Ok(match self.renamer.mode {
            Mode::Rename => Operation::Rename,
            Mode::Move => Operation::Move { root: root()? },
            Mode::Link => Operation::Link { root: root()? },
        })
    }

    /// The configured cache location, or `cache.sqlite` in the platform's
    /// data directory.
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }
        let dirs = project_dirs().ok_or_raise(|| ErrorKind::NoHomeDirectory)?;
        Ok(dirs.data_dir().join("cache.sqlite"))
    }
}
