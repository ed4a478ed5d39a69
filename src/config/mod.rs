mod settings;

pub use settings::{CatalogSettings, Config, DiscountPolicy, StoreSettings};

use crate::error::{PosError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.supersaver/ or the XDG equivalent)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "supersaver") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        PosError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".supersaver"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Load config.toml, falling back to defaults when the file is absent
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| PosError::ConfigParse { path, source: e })
}

/// Create the config directory with a template config and a sample catalog
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(PosError::AlreadyInitialized(config_dir.to_path_buf()));
    }

    fs::create_dir_all(config_dir)?;
    fs::write(config_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(config_dir.join("items.csv"), CATALOG_TEMPLATE)?;
    tracing::info!(path = %config_dir.display(), "initialized config directory");

    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[catalog]
path = "items.csv"          # relative to the working directory, ~ is expanded
discount_policy = "reject"  # "reject" drops rows over max_discount, "clamp" caps them
max_discount = 75.0

[store]
output_dir = "."            # receipts (Bill_*.txt) and revenue reports
"#;

/// Sample catalog written by `pos init`
pub const CATALOG_TEMPLATE: &str = "\
ItemCode,ItemName,Price,Size,ManufactureDate,ExpiryDate,Manufacturer,Discount
A1,Soap,50.00,100g,2024-01-01,2025-01-01,Acme,10
B2,Rice,320.00,1kg,2024-02-10,2025-02-10,Golden Fields,5
C3,Milk Powder,1150.00,400g,2024-03-01,2025-09-01,Highland,0
D4,Biscuits,180.00,200g,2024-04-15,2024-12-15,Munchee,15
";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.catalog.path, "items.csv");
        assert_eq!(config.catalog.max_discount, 75.0);
        assert_eq!(config.catalog.discount_policy, DiscountPolicy::Reject);
        assert_eq!(config.store.output_dir, ".");
    }

    #[test]
    fn template_parses() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[catalog]\ndiscount_policy = \"clamp\"\n",
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.catalog.discount_policy, DiscountPolicy::Clamp);
        assert_eq!(config.catalog.path, "items.csv");
        assert_eq!(config.store.output_dir, ".");
    }

    #[test]
    fn invalid_config_reports_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[catalog\n").unwrap();

        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, PosError::ConfigParse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn init_refuses_existing_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("pos");
        init_config_dir(&target).unwrap();
        assert!(target.join("config.toml").exists());
        assert!(target.join("items.csv").exists());

        let err = init_config_dir(&target).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn expand_path_leaves_plain_paths() {
        assert_eq!(expand_path("items.csv"), PathBuf::from("items.csv"));
        assert_eq!(expand_path("/tmp/items.csv"), PathBuf::from("/tmp/items.csv"));
    }
}
