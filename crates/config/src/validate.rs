use crate::error::{ErrorKind, Result};
use crate::model::Config;
use derive_more::Display;
use rjren_library::{DateFormat, NameTemplate, RESERVED};
use std::time::Duration;

/// One problem with a loaded configuration, keyed by its dotted path.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{key}: {message}")]
pub struct Violation {
    pub key: &'static str,
    pub message: String,
}
impl Violation {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self { key, message: message.into() }
    }
}

impl Config {
    /// Every violation in the configuration, not just the first.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let renamer = &self.renamer;

        for (key, template) in [("renamer.template", &renamer.template), ("renamer.move_template", &renamer.move_template)] {
            if let Err(err) = template.parse::<NameTemplate>() {
                violations.push(Violation::new(key, (*err).to_string()));
            }
        }
        if let Err(err) = renamer.release_date_format.parse::<DateFormat>() {
            violations.push(Violation::new("renamer.release_date_format", (*err).to_string()));
        }
        let literals = [
            ("renamer.delimiter", &renamer.delimiter),
            ("renamer.cv_list_left", &renamer.cv_list_left),
            ("renamer.cv_list_right", &renamer.cv_list_right),
            ("renamer.series_left", &renamer.series_left),
            ("renamer.series_right", &renamer.series_right),
            ("renamer.age_cat_left", &renamer.age_cat_left),
            ("renamer.age_cat_right", &renamer.age_cat_right),
        ];
        for (key, value) in literals {
            if let Some(c) = value.chars().find(|c| RESERVED.contains(c)) {
                violations.push(Violation::new(key, format!("must not contain the reserved character {c:?}")));
            }
        }
        if renamer.mode.is_path() && renamer.move_root.is_none() {
            violations.push(Violation::new("renamer.move_root", format!("required in {:?} mode", renamer.mode)));
        }
        if Duration::try_from_secs_f64(self.scraper.sleep_interval).is_err() {
            violations.push(Violation::new("scraper.sleep_interval", "must be a non-negative number of seconds"));
        }
        violations
    }

    /// Fails with every violation at once.
    pub fn check(&self) -> Result<()> {
        let violations = self.validate();
        if violations.is_empty() {
            return Ok(());
        }
        let report = violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
        exn::bail!(ErrorKind::Invalid(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rjren_library::Mode;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[rstest]
    #[case("renamer.delimiter", "/")]
    #[case("renamer.cv_list_left", "CV:")]
    #[case("renamer.series_right", "|")]
    #[case("renamer.age_cat_left", "<")]
    fn test_reserved_literals(#[case] key: &str, #[case] value: &str) {
        let mut config = Config::default();
        let field = match key {
            "renamer.delimiter" => &mut config.renamer.delimiter,
            "renamer.cv_list_left" => &mut config.renamer.cv_list_left,
            "renamer.series_right" => &mut config.renamer.series_right,
            _ => &mut config.renamer.age_cat_left,
        };
        *field = value.to_string();
        let violations = config.validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, key);
    }

    #[test]
    fn test_all_violations_are_reported() {
        let mut config = Config::default();
        config.renamer.template = "[maker_name] work_name".to_string();
        config.renamer.move_template = "maker_name".to_string();
        config.renamer.release_date_format = "[year".to_string();
        config.renamer.mode = Mode::Link;
        config.scraper.sleep_interval = -1.0;

        let keys: Vec<&str> = config.validate().iter().map(|v| v.key).collect();
        assert_eq!(
            keys,
            vec![
                "renamer.template",
                "renamer.move_template",
                "renamer.release_date_format",
                "renamer.move_root",
                "scraper.sleep_interval",
            ]
        );
        let err = config.check().unwrap_err();
        let ErrorKind::Invalid(report) = &*err else {
            panic!("expected an invalid configuration, got {err:?}");
        };
        assert_eq!(report.lines().count(), 5);
    }

    #[test]
    fn test_strftime_date_format_names_the_expected_syntax() {
        let mut config = Config::default();
        config.renamer.release_date_format = "%y%m%d".to_string();
        let violations = config.validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "renamer.release_date_format");
        assert!(violations[0].message.contains("[year repr:last_two][month][day]"));
    }

    #[test]
    fn test_move_with_root_is_valid() {
        let mut config = Config::default();
        config.renamer.mode = Mode::Move;
        config.renamer.move_root = Some("/library".into());
        assert!(config.check().is_ok());
    }
}
