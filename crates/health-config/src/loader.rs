use crate::error::ConfigError;
use crate::settings::{Settings, DEFAULTS};
use config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};

/// 配置加载器
///
/// 优先级：命令行/环境变量覆盖 > TOML 配置文件 > 内置默认值
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    overrides: Vec<(&'static str, String)>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// 设置覆盖值，`None` 表示未提供
    pub fn set_override(mut self, key: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.overrides.push((key, value));
        }
        self
    }

    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();

        for (key, value) in DEFAULTS {
            builder = builder.set_default(*key, *value)?;
        }

        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
        }

        for (key, value) in &self.overrides {
            builder = builder.set_override(*key, value.as_str())?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = ConfigLoader::new().load().unwrap();
        assert_eq!(settings.listen_address, "0.0.0.0:8080");
        assert_eq!(settings.metrics_path, "/metrics");
        assert_eq!(settings.regions, "all-regions");
        assert_eq!(settings.slack_token, None);
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "regions = \"us-east-1,eu-west-1\"\nslack_channel = \"C0123\"\nignore_events = \"AWS_EC2_OPERATIONAL_ISSUE\""
        )
        .unwrap();

        let settings = ConfigLoader::new()
            .with_file(file.path())
            .set_override("regions", Some("sa-east-1".to_string()))
            .set_override("slack_token", None)
            .load()
            .unwrap();

        assert_eq!(settings.regions, "sa-east-1");
        assert_eq!(settings.slack_channel.as_deref(), Some("C0123"));
        assert_eq!(settings.slack_token, None);
        assert_eq!(settings.ignore_events, "AWS_EC2_OPERATIONAL_ISSUE");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ConfigLoader::new()
            .with_file("/nonexistent/health-exporter.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
