//! Application configuration module / 应用配置模块
//!
//! Manages configuration loaded from config.json.
//! Creates default config file on first run / 首次运行时创建默认配置文件

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{LexiconError, Result};

/// Global configuration instance / 全局配置实例
static CONFIG: OnceCell<Arc<RwLock<AppConfig>>> = OnceCell::new();

/// Default snapshot location / 默认词库快照地址
pub const DEFAULT_SNAPSHOT_URL: &str =
    "https://raw.githubusercontent.com/zjarhdgkrwk-lang/moji-assets/main/dictionary.db";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Word store configuration / 词库配置
    pub store: StoreConfig,
    /// Search configuration / 搜索配置
    pub search: SearchConfig,
    /// Accent graph rendering / 声调图渲染
    pub render: RenderConfig,
    /// User preferences file / 用户偏好
    pub prefs: PrefsConfig,
}

/// Word store configuration / 词库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Remote snapshot URL (plain SQLite or .gz) / 远程快照地址
    pub snapshot_url: String,
    /// Local snapshot file, takes precedence over the URL when set / 本地快照文件
    pub snapshot_path: Option<String>,
    /// Table holding the entries / 词条表名
    pub table: String,
    /// Fetch timeout in seconds / 下载超时（秒）
    pub fetch_timeout_secs: u64,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Max candidates pulled from the store per query / 每次查询的候选上限
    pub candidate_limit: usize,
    /// Max ranked results shown / 显示结果上限
    pub result_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Width available to each accent graph (CSS px) / 声调图可用宽度
    pub container_width: f64,
    /// Display density / 像素比
    pub device_pixel_ratio: f64,
    /// Where drawn graphs are written, empty disables output / 图输出目录
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefsConfig {
    /// Key-value file persisting the theme choice / 主题偏好文件
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_url: DEFAULT_SNAPSHOT_URL.to_string(),
            snapshot_path: None,
            table: "words".to_string(),
            fetch_timeout_secs: 300,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 100,
            result_limit: 30,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            container_width: 320.0,
            device_pixel_ratio: 1.0,
            output_dir: "graphs".to_string(),
        }
    }
}

impl Default for PrefsConfig {
    fn default() -> Self {
        Self {
            file: "prefs.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the preferences file path / 获取偏好文件路径
    pub fn get_prefs_path(&self) -> PathBuf {
        PathBuf::from(&self.prefs.file)
    }

    /// Get the graph output directory, None when disabled / 获取图输出目录
    pub fn get_output_dir(&self) -> Option<PathBuf> {
        if self.render.output_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.render.output_dir))
        }
    }

    /// Table name checked against SQL injection / 校验后的表名
    pub fn table_name(&self) -> Result<&str> {
        let table = self.store.table.as_str();
        let valid = !table.is_empty()
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !table.starts_with(|c: char| c.is_ascii_digit());
        if valid {
            Ok(table)
        } else {
            Err(LexiconError::Config(format!("invalid table name: {:?}", table)))
        }
    }
}

/// Get the default config file path / 获取配置文件路径
fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| LexiconError::Config(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| LexiconError::Config(format!("Failed to parse config file: {}", e)))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&default_config_path())
}

/// Save configuration to file / 保存配置到文件
pub fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(config_path, content)?;
    Ok(())
}

/// Install the loaded configuration as the global instance / 初始化全局配置
pub fn init_config(config: AppConfig) -> Result<Arc<RwLock<AppConfig>>> {
    let config_arc = Arc::new(RwLock::new(config));

    CONFIG
        .set(config_arc.clone())
        .map_err(|_| LexiconError::Config("Config already initialized".to_string()))?;

    Ok(config_arc)
}

/// Get global configuration instance / 获取全局配置实例
pub fn get_config() -> Arc<RwLock<AppConfig>> {
    CONFIG
        .get_or_init(|| {
            let config = load_config().unwrap_or_default();
            Arc::new(RwLock::new(config))
        })
        .clone()
}

/// Get a read-only snapshot of current config / 获取当前配置的只读快照
pub fn config() -> AppConfig {
    get_config().read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.search.candidate_limit, 100);
        assert_eq!(config.search.result_limit, 30);
        assert_eq!(config.store.table, "words");
        assert_eq!(config.get_prefs_path(), PathBuf::from("prefs.json"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"search": {"result_limit": 10}}"#).unwrap();
        assert_eq!(config.search.result_limit, 10);
        assert_eq!(config.search.candidate_limit, 100);
        assert_eq!(config.render.device_pixel_ratio, 1.0);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.store.snapshot_url, DEFAULT_SNAPSHOT_URL);

        // Second load reads the written file / 第二次读取已写入的文件
        let again = load_config_from(&path).unwrap();
        assert_eq!(again.search.result_limit, config.search.result_limit);
    }

    #[test]
    fn test_table_name_validation() {
        let mut config = AppConfig::default();
        assert_eq!(config.table_name().unwrap(), "words");
        config.store.table = "words; DROP TABLE x".to_string();
        assert!(config.table_name().is_err());
        config.store.table = "1words".to_string();
        assert!(config.table_name().is_err());
    }

    // The only test touching the global instance
    #[test]
    fn test_global_config() {
        let mut initial = AppConfig::default();
        initial.search.result_limit = 7;
        let shared = init_config(initial).unwrap();
        assert_eq!(config().search.result_limit, 7);

        assert!(matches!(init_config(AppConfig::default()), Err(LexiconError::Config(_))));

        shared.write().render.container_width = 480.0;
        assert_eq!(config().render.container_width, 480.0);
        assert!(Arc::ptr_eq(&shared, &get_config()));
    }

    #[test]
    fn test_output_dir_disabled() {
        let mut config = AppConfig::default();
        assert!(config.get_output_dir().is_some());
        config.render.output_dir.clear();
        assert!(config.get_output_dir().is_none());
    }
}
