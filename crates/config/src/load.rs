use crate::error::{ErrorKind, Result};
use crate::model::Config;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Environment variables with this prefix override the configuration file;
/// nested keys are separated by `__` (`RJREN_RENAMER__MODE=MOVE`).
pub const ENV_PREFIX: &str = "RJREN_";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "rjren")
}

/// `config.toml` in the platform's configuration directory.
pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn file(path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let figment = Figment::new();
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnknownFormat(path.to_path_buf())),
    })
}

impl Config {
    /// Layers the built-in defaults, the configuration file and the
    /// environment.
    ///
    /// An explicit `path` must exist. Without one, the
    /// [default location](default_path) is used when a file is present there.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::Missing(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|path| path.is_file()),
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = &path {
            tracing::debug!(path = %path.display(), "reading configuration file");
            figment = figment.merge(file(path)?);
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .or_raise(|| ErrorKind::Load)
    }
}
