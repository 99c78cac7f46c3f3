//! Folder names from work metadata.
//!
//! A [`NameTemplate`] is plain text in which the following words are
//! substituted. Everything else is kept literally.
//!
//! | Token           | Value                                                     |
//! |-----------------|-----------------------------------------------------------|
//! | `rjcode`        | The work code (required in every template)                |
//! | `work_name`     | Display name, optionally without `【…】` segments           |
//! | `maker_id`      | Maker identifier                                          |
//! | `maker_name`    | Maker display name                                        |
//! | `release_date`  | Release date, in the policy's date format                 |
//! | `series_name`   | Series name in series brackets, or nothing                |
//! | `age_cat`       | Age label in age brackets, or nothing                     |
//! | `cv_list_str`   | Voice credits joined by the delimiter, in CV brackets     |
//! | `tags_list_str` | Prioritized, truncated tags joined by the delimiter       |
//!
//! Reserved file-name characters never survive compilation: they are either
//! removed or replaced by full-width lookalikes. In [`Mode::Move`] and
//! [`Mode::Link`] the template may use `/` to create folders, but substituted
//! values never can.
//!
//! ```
//! use rjren_library::{FormattingPolicy, Mode, NameTemplate, compile};
//! # use rjren_catalog::models::{AgeCategory, WorkMetadata};
//! # let metadata = WorkMetadata {
//! #     code: "RJ123456".parse().unwrap(), work_name: "【新作】 Title".into(),
//! #     maker_id: "RG00001".into(), maker_name: "Circle".into(),
//! #     release_date: time::Date::from_calendar_date(2023, time::Month::May, 12).unwrap(),
//! #     series_id: None, series_name: None, age_category: AgeCategory::R15,
//! #     tags: vec![], voice_actors: vec!["Voice".into()], cover_url: String::new(),
//! # };
//!
//! let template: NameTemplate = "age_cat[maker_name][rjcode] work_name cv_list_str".parse().unwrap();
//! let name = compile(&metadata, &template, &FormattingPolicy::default(), Mode::Rename).unwrap();
//! assert_eq!(name, "(R15)[Circle][RJ123456] Title (CV Voice)");
//! ```

mod policy;
mod sanitize;

pub use self::policy::{AgeLabels, Brackets, DateFormat, FormattingPolicy, IllegalCharacters, Mode, TagRule};
pub use self::sanitize::RESERVED;
use self::sanitize::{Reserved, normalize_path, sanitize};
use crate::error::{Error, ErrorKind, Result};
use regex::Regex;
use rjren_catalog::models::{AgeCategory, WorkMetadata};
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::instrument;

pub const DEFAULT_TEMPLATE: &str = "age_cat[maker_name][rjcode] work_name cv_list_str";
pub const DEFAULT_MOVE_TEMPLATE: &str = "maker_name/age_cat[rjcode] work_name cv_list_str";

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"【.*?】").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Code,
    WorkName,
    MakerId,
    MakerName,
    ReleaseDate,
    SeriesName,
    AgeCategory,
    VoiceActors,
    Tags,
}
impl Token {
    // Longest first, so that no token can shadow a longer one.
    const ALL: [(&str, Token); 9] = [
        ("tags_list_str", Token::Tags),
        ("release_date", Token::ReleaseDate),
        ("series_name", Token::SeriesName),
        ("cv_list_str", Token::VoiceActors),
        ("maker_name", Token::MakerName),
        ("work_name", Token::WorkName),
        ("maker_id", Token::MakerId),
        ("age_cat", Token::AgeCategory),
        ("rjcode", Token::Code),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// A parsed name template. Construction fails unless the template contains
/// `rjcode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}
impl NameTemplate {
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
impl FromStr for NameTemplate {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = s;
        'outer: while !rest.is_empty() {
            for (word, token) in Token::ALL {
                if let Some(after) = rest.strip_prefix(word) {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Token(token));
                    rest = after;
                    continue 'outer;
                }
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                literal.push(c);
            }
            rest = chars.as_str();
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        if !segments.contains(&Segment::Token(Token::Code)) {
            exn::bail!(ErrorKind::MissingCode(s.to_string()));
        }
        Ok(Self { source: s.to_string(), segments })
    }
}
impl Display for NameTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.source)
    }
}

/// Compiles `metadata` into a folder name ([`Mode::Rename`]) or a relative
/// path ([`Mode::Move`], [`Mode::Link`]).
///
/// The result is trimmed, non-empty, and free of reserved characters (other
/// than the `/` separators of a relative path).
pub fn compile(metadata: &WorkMetadata, template: &NameTemplate, policy: &FormattingPolicy, mode: Mode) -> Result<String> {
    let characters = policy.illegal_characters;
    let structure = match mode.is_path() {
        true => Reserved::ExceptSeparators,
        false => Reserved::All,
    };
    let mut name = String::with_capacity(template.source.len() * 2);
    for segment in &template.segments {
        match segment {
            Segment::Literal(text) => name.push_str(&sanitize(text, characters, structure)),
            Segment::Token(token) => name.push_str(&sanitize(&render(*token, metadata, policy)?, characters, Reserved::All)),
        }
    }
    let name = sanitize(&name, characters, structure);
    let name = match mode.is_path() {
        true => normalize_path(name.trim()),
        false => name.trim().to_string(),
    };
    if name.is_empty() {
        exn::bail!(ErrorKind::Compile(format!("template {:?} produced an empty name", template.source)));
    }
    Ok(name)
}

/// Values are sanitized before they are wrapped, so a value made only of
/// reserved characters prints nothing at all.
fn render(token: Token, metadata: &WorkMetadata, policy: &FormattingPolicy) -> Result<String> {
    let clean = |value: &str| sanitize(value, policy.illegal_characters, Reserved::All).trim().to_string();
    Ok(match token {
        Token::Code => metadata.code.to_string(),
        Token::WorkName => match policy.strip_bracketed_name {
            true => BRACKETED.replace_all(&metadata.work_name, "").trim().to_string(),
            false => metadata.work_name.clone(),
        },
        Token::MakerId => metadata.maker_id.clone(),
        Token::MakerName => metadata.maker_name.clone(),
        Token::ReleaseDate => policy.date_format.format(metadata.release_date)?,
        Token::SeriesName => {
            let series = clean(metadata.series_name.as_deref().unwrap_or_default());
            match series.is_empty() {
                true => String::new(),
                false => policy.series_brackets.wrap(&series),
            }
        },
        Token::AgeCategory => {
            let label = match (policy.ignore_r18, metadata.age_category) {
                (true, AgeCategory::Adult) => "",
                (_, category) => policy.age_labels.label(category),
            };
            let label = clean(label);
            match label.is_empty() {
                true => String::new(),
                false => policy.age_brackets.wrap(&label),
            }
        },
        Token::VoiceActors => {
            let names: Vec<String> =
                metadata.voice_actors.iter().map(|name| clean(name.as_str())).filter(|name| !name.is_empty()).collect();
            match names.is_empty() {
                true => String::new(),
                false => policy.cv_brackets.wrap(&names.join(&policy.delimiter)),
            }
        },
        Token::Tags => select_tags(&metadata.tags, &policy.tag_rules, policy.max_tags)
            .into_iter()
            .map(|tag| clean(tag))
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(&policy.delimiter),
    })
}

/// Prioritized tags first (in rule order, replacements applied), then the
/// remaining tags in source order, truncated to `max` (`0` for no limit).
fn select_tags<'a>(tags: &'a [String], rules: &'a [TagRule], max: usize) -> Vec<&'a str> {
    let mut consumed = HashSet::new();
    let mut selected: Vec<&str> = Vec::with_capacity(tags.len());
    for rule in rules {
        if tags.iter().any(|tag| tag == rule.original()) {
            consumed.insert(rule.original());
            if !selected.contains(&rule.output()) {
                selected.push(rule.output());
            }
        }
    }
    for tag in tags {
        if !consumed.contains(tag.as_str()) && !selected.contains(&tag.as_str()) {
            selected.push(tag);
        }
    }
    if max > 0 {
        selected.truncate(max);
    }
    selected
}

/// The two templates and the policy, bundled for a rename pass.
#[derive(Debug, Clone)]
pub struct NameCompiler {
    template: NameTemplate,
    move_template: NameTemplate,
    policy: FormattingPolicy,
}
impl NameCompiler {
    pub fn new(template: NameTemplate, move_template: NameTemplate, policy: FormattingPolicy) -> Self {
        Self { template, move_template, policy }
    }

    /// The template used for `mode`.
    pub fn template(&self, mode: Mode) -> &NameTemplate {
        match mode {
            Mode::Rename => &self.template,
            Mode::Move | Mode::Link => &self.move_template,
        }
    }

    pub fn policy(&self) -> &FormattingPolicy {
        &self.policy
    }

    #[instrument(skip_all, fields(code = %metadata.code, ?mode))]
    pub fn compile(&self, metadata: &WorkMetadata, mode: Mode) -> Result<String> {
        compile(metadata, self.template(mode), &self.policy, mode)
    }
}
impl Default for NameCompiler {
    fn default() -> Self {
        // Safety: both default templates contain `rjcode`.
        Self::new(DEFAULT_TEMPLATE.parse().unwrap(), DEFAULT_MOVE_TEMPLATE.parse().unwrap(), FormattingPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::date;

    fn metadata() -> WorkMetadata {
        WorkMetadata {
            code: "RJ123456".parse().unwrap(),
            work_name: "【予告】 Title".to_string(),
            maker_id: "RG00001".to_string(),
            maker_name: "Circle".to_string(),
            release_date: date!(2023 - 05 - 12),
            series_id: None,
            series_name: None,
            age_category: AgeCategory::Adult,
            tags: vec!["Horror".to_string(), "Comedy".to_string(), "NewTag".to_string()],
            voice_actors: vec!["Voice A".to_string(), "Voice B".to_string()],
            cover_url: String::new(),
        }
    }

    fn rename(template: &str, metadata: &WorkMetadata, policy: &FormattingPolicy) -> String {
        compile(metadata, &template.parse().unwrap(), policy, Mode::Rename).unwrap()
    }

    #[rstest]
    #[case("")]
    #[case("[maker_name] work_name")]
    #[case("RJcode work_name")]
    fn test_template_without_code_is_rejected(#[case] template: &str) {
        let err = template.parse::<NameTemplate>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingCode(_)));
    }

    #[test]
    fn test_template_segments() {
        let template: NameTemplate = "[maker_name]rjcode_work_name".parse().unwrap();
        assert_eq!(
            template.segments,
            vec![
                Segment::Literal("[".to_string()),
                Segment::Token(Token::MakerName),
                Segment::Literal("]".to_string()),
                Segment::Token(Token::Code),
                Segment::Literal("_".to_string()),
                Segment::Token(Token::WorkName),
            ]
        );
        assert_eq!(template.to_string(), "[maker_name]rjcode_work_name");
    }

    #[test]
    fn test_default_template_ignores_r18() {
        let name = rename(DEFAULT_TEMPLATE, &metadata(), &FormattingPolicy::default());
        assert_eq!(name, "[Circle][RJ123456] Title (CV Voice A Voice B)");
    }

    #[rstest]
    #[case(AgeCategory::General, false, "(全年龄)[Circle][RJ123456]")]
    #[case(AgeCategory::R15, true, "(R15)[Circle][RJ123456]")]
    #[case(AgeCategory::Adult, false, "(R18)[Circle][RJ123456]")]
    #[case(AgeCategory::Adult, true, "[Circle][RJ123456]")]
    fn test_age_category(#[case] category: AgeCategory, #[case] ignore_r18: bool, #[case] expected: &str) {
        let metadata = WorkMetadata { age_category: category, ..metadata() };
        let policy = FormattingPolicy { ignore_r18, ..FormattingPolicy::default() };
        assert_eq!(rename("age_cat[maker_name][rjcode]", &metadata, &policy), expected);
    }

    #[test]
    fn test_empty_age_label_prints_no_brackets() {
        let metadata = WorkMetadata { age_category: AgeCategory::General, ..metadata() };
        let policy = FormattingPolicy {
            age_labels: AgeLabels { general: String::new(), ..AgeLabels::default() },
            ..FormattingPolicy::default()
        };
        assert_eq!(rename("age_cat rjcode", &metadata, &policy), "RJ123456");
    }

    #[test]
    fn test_tag_priority() {
        let policy = FormattingPolicy {
            tag_rules: vec![
                TagRule::Keep("Comedy".to_string()),
                TagRule::Replace("Horror".to_string(), "Scary".to_string()),
            ],
            max_tags: 2,
            ..FormattingPolicy::default()
        };
        assert_eq!(rename("rjcode tags_list_str", &metadata(), &policy), "RJ123456 Comedy Scary");
    }

    #[rstest]
    #[case(0, "Comedy Horror NewTag")]
    #[case(1, "Comedy")]
    #[case(10, "Comedy Horror NewTag")]
    fn test_tag_limit(#[case] max_tags: usize, #[case] expected: &str) {
        let policy = FormattingPolicy {
            tag_rules: vec![TagRule::Keep("Comedy".to_string()), TagRule::Keep("Absent".to_string())],
            max_tags,
            ..FormattingPolicy::default()
        };
        assert_eq!(rename("tags_list_str rjcode", &metadata(), &policy), format!("{expected} RJ123456"));
    }

    #[test]
    fn test_reserved_only_credits_and_tags_print_nothing() {
        let metadata = WorkMetadata {
            voice_actors: vec!["?".to_string(), "Voice A".to_string()],
            tags: vec!["|".to_string(), "Comedy".to_string()],
            ..metadata()
        };
        assert_eq!(
            rename("rjcode cv_list_str tags_list_str", &metadata, &FormattingPolicy::default()),
            "RJ123456 (CV Voice A) Comedy"
        );
        let metadata = WorkMetadata { voice_actors: vec![":".to_string()], ..metadata };
        assert_eq!(rename("rjcode cv_list_str", &metadata, &FormattingPolicy::default()), "RJ123456");
    }

    #[test]
    fn test_empty_voice_list_prints_nothing() {
        let metadata = WorkMetadata { voice_actors: vec![], ..metadata() };
        assert_eq!(rename("rjcode cv_list_str", &metadata, &FormattingPolicy::default()), "RJ123456");
    }

    #[rstest]
    #[case(None, "RJ123456")]
    #[case(Some(""), "RJ123456")]
    #[case(Some("Series"), "[Series] RJ123456")]
    #[case(Some("???"), "RJ123456")]
    #[case(Some(" a:b "), "[ab] RJ123456")]
    fn test_series_name(#[case] series: Option<&str>, #[case] expected: &str) {
        let metadata = WorkMetadata { series_name: series.map(str::to_string), ..metadata() };
        assert_eq!(rename("series_name rjcode", &metadata, &FormattingPolicy::default()), expected);
    }

    #[test]
    fn test_release_date_and_maker_id() {
        assert_eq!(
            rename("release_date maker_id rjcode", &metadata(), &FormattingPolicy::default()),
            "230512 RG00001 RJ123456"
        );
    }

    #[rstest]
    #[case(true, "Title")]
    #[case(false, "【予告】 Title")]
    fn test_bracketed_work_name(#[case] strip: bool, #[case] expected: &str) {
        let policy = FormattingPolicy { strip_bracketed_name: strip, ..FormattingPolicy::default() };
        assert_eq!(rename("rjcode work_name", &metadata(), &policy), format!("RJ123456 {expected}"));
    }

    #[rstest]
    #[case(IllegalCharacters::Strip, "RJ123456 ABCD")]
    #[case(IllegalCharacters::FullWidth, "RJ123456 A／B：C？D")]
    fn test_reserved_characters_in_values(#[case] characters: IllegalCharacters, #[case] expected: &str) {
        let metadata = WorkMetadata { work_name: "A/B:C?D".to_string(), ..metadata() };
        let policy = FormattingPolicy { illegal_characters: characters, ..FormattingPolicy::default() };
        assert_eq!(rename("rjcode work_name", &metadata, &policy), expected);
    }

    #[test]
    fn test_values_are_not_substituted_again() {
        let metadata = WorkMetadata { work_name: "maker_name rjcode".to_string(), ..metadata() };
        assert_eq!(
            rename("rjcode work_name", &metadata, &FormattingPolicy::default()),
            "RJ123456 maker_name rjcode"
        );
    }

    #[test]
    fn test_rename_template_cannot_create_folders() {
        assert_eq!(rename("maker_name/rjcode", &metadata(), &FormattingPolicy::default()), "CircleRJ123456");
    }

    #[rstest]
    #[case(DEFAULT_MOVE_TEMPLATE, "Circle/[RJ123456] Title (CV Voice A Voice B)")]
    #[case(r" maker_name \ rjcode ", "Circle/RJ123456")]
    #[case("//maker_name//series_name/rjcode/", "Circle/RJ123456")]
    fn test_move_paths(#[case] template: &str, #[case] expected: &str) {
        let template: NameTemplate = template.parse().unwrap();
        let name = compile(&metadata(), &template, &FormattingPolicy::default(), Mode::Move).unwrap();
        assert_eq!(name, expected);
    }

    #[rstest]
    #[case(IllegalCharacters::Strip, "Circle/RJ123456")]
    #[case(IllegalCharacters::FullWidth, "Cir／cle/RJ123456")]
    fn test_values_cannot_create_folders(#[case] characters: IllegalCharacters, #[case] expected: &str) {
        let metadata = WorkMetadata { maker_name: "Cir/cle".to_string(), ..metadata() };
        let policy = FormattingPolicy { illegal_characters: characters, ..FormattingPolicy::default() };
        let template: NameTemplate = "maker_name/rjcode".parse().unwrap();
        assert_eq!(compile(&metadata, &template, &policy, Mode::Link).unwrap(), expected);
    }

    #[rstest]
    #[case("..", "Circle/RJ123456")]
    #[case(".", "Circle/RJ123456")]
    #[case(" .. ", "Circle/RJ123456")]
    #[case("...", "Circle/.../RJ123456")]
    fn test_dot_values_cannot_leave_their_folder(#[case] work_name: &str, #[case] expected: &str) {
        let metadata = WorkMetadata { work_name: work_name.to_string(), ..metadata() };
        let template: NameTemplate = "maker_name/work_name/rjcode".parse().unwrap();
        for mode in [Mode::Move, Mode::Link] {
            assert_eq!(compile(&metadata, &template, &FormattingPolicy::default(), mode).unwrap(), expected);
        }
    }

    #[rstest]
    #[case(IllegalCharacters::Strip)]
    #[case(IllegalCharacters::FullWidth)]
    fn test_no_reserved_characters_survive(#[case] characters: IllegalCharacters) {
        let metadata = WorkMetadata {
            work_name: r#"<a>|"b"\c/d*e?f:g"#.to_string(),
            maker_name: "x:y".to_string(),
            series_name: Some("s/t".to_string()),
            tags: vec!["t|u".to_string()],
            voice_actors: vec!["v?w".to_string()],
            ..metadata()
        };
        let policy = FormattingPolicy { illegal_characters: characters, ..FormattingPolicy::default() };
        let template = r#"age_cat[maker_name]<rjcode>|series_name "work_name" cv_list_str tags_list_str*?"#;
        let name = rename(template, &metadata, &policy);
        assert!(!name.contains(RESERVED), "{name}");
    }

    #[test]
    fn test_compiler_selects_template_by_mode() {
        let compiler = NameCompiler::default();
        assert_eq!(compiler.template(Mode::Rename).as_str(), DEFAULT_TEMPLATE);
        assert_eq!(compiler.template(Mode::Link).as_str(), DEFAULT_MOVE_TEMPLATE);
        assert_eq!(
            compiler.compile(&metadata(), Mode::Move).unwrap(),
            "Circle/[RJ123456] Title (CV Voice A Voice B)"
        );
    }
}
