use directories::ProjectDirs;
use std::path::PathBuf;

/// Application directories in the XDG layout
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/napari-hub)
    pub config: PathBuf,

    /// Cache directory (~/.cache/napari-hub)
    pub cache: PathBuf,

    /// Config file path
    pub config_file: PathBuf,

    /// Cached plugin index
    pub index_cache: PathBuf,
}

impl Directories {
    /// Standard XDG paths, or `None` when no home directory can be determined.
    #[must_use]
    pub fn new() -> Option<Self> {
        let project = ProjectDirs::from("", "", "napari-hub")?;

        let config = project.config_dir().to_path_buf();
        let cache = project.cache_dir().to_path_buf();

        Some(Self {
            config_file: config.join("config.json"),
            index_cache: cache.join("plugins.json"),
            config,
            cache,
        })
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.json"),
            index_cache: base.join("plugins.json"),
            config: base.clone(),
            cache: base,
        }
    }
}
