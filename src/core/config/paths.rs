use std::env;
use std::fs;
use std::path::PathBuf;

/// Filesystem locations used by the service. All directories are created
/// on construction so later code can assume they exist.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Account database (users).
    pub db_path: PathBuf,
    /// Vector index database. Opaque on-disk format; the only contract is
    /// that it survives restarts.
    pub index_db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::with_data_dir(discover_data_dir())
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let log_dir = data_dir.join("logs");
        let upload_dir = data_dir.join("uploads");
        let db_path = data_dir.join("askdocs.db");
        let index_db_path = data_dir.join("index.db");
        let config_path = data_dir.join("askdocs.toml");

        for dir in [&data_dir, &log_dir, &upload_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            log_dir,
            upload_dir,
            db_path,
            index_db_path,
            config_path,
        }
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("ASKDOCS_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(debug_assertions) {
        return env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("data");
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("AskDocs");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("AskDocs");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(xdg).join("askdocs")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
