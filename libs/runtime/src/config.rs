use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::paths::resolve_home_dir;

/// Environment variable prefix; `USERDESK__SERVER__PORT=9000` sets `server.port`.
pub const ENV_PREFIX: &str = "USERDESK__";

const DEFAULT_HOME_SUBDIR: &str = ".userdesk";

/// Whole-process configuration: typed global sections plus a per-module bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Logging sections; `None` falls back to a plain console subscriber.
    pub logging: Option<LoggingConfig>,
    /// Directory of `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// module name → raw config value, decoded with [`AppConfig::module_config`].
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Absolute after loading. Empty selects `~/.userdesk`.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_sec: 0,
        }
    }
}

/// subsystem (crate target prefix) → section. `default` catches the rest.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// trace | debug | info | warn | error | off
    pub console_level: String,
    /// Log file, relative to `server.home_dir` unless absolute. Empty disables it.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/userdesk.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// defaults → YAML file → `USERDESK__*` environment.
    ///
    /// `server.home_dir` is made absolute and created, then module files from
    /// `modules_dir` are merged into the bag.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        anyhow::ensure!(
            config_path.as_ref().is_file(),
            "config file not found: {}",
            config_path.as_ref().display()
        );

        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| {
                format!(
                    "invalid configuration in {}",
                    config_path.as_ref().display()
                )
            })?;

        config.finish()?;
        Ok(config)
    }

    /// Loads `config_path` when given, otherwise the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut config = Self::default();
                config.finish()?;
                Ok(config)
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        let configured = Some(self.server.home_dir.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let home: PathBuf = resolve_home_dir(configured, DEFAULT_HOME_SUBDIR, true)
            .context("cannot resolve server.home_dir")?;
        self.server.home_dir = home.to_string_lossy().into_owned();

        if let Some(dir) = self.modules_dir.clone() {
            merge_module_files(&mut self.modules, dir)?;
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("cannot serialize config to YAML")
    }

    /// Decode the `modules.<name>` entry. A missing entry yields `T::default()`.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            None | Some(serde_json::Value::Null) => Ok(T::default()),
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("invalid config for module '{name}'")),
        }
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if args.verbose == 0 {
            return;
        }
        let level = if args.verbose == 1 { "debug" } else { "trace" };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }
}

/// Command line switches that influence configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    /// Start with an empty user store instead of fetching seed records.
    pub no_seed: bool,
}

fn merge_module_files(
    bag: &mut HashMap<String, serde_json::Value>,
    dir: impl AsRef<Path>,
) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if !path.is_file() || !is_yaml {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let value: serde_yaml::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        bag.insert(name.to_string(), serde_json::to_value(value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn yaml_path(p: &Path) -> String {
        p.to_string_lossy().replace('\\', "/")
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct DemoModule {
        #[serde(default)]
        setting: String,
        #[serde(default)]
        count: u32,
    }

    #[test]
    fn test_default_config_structure() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.home_dir, "");

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "info");
        assert_eq!(logging["default"].file, "logs/userdesk.log");
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_load_layered_reads_yaml_and_creates_home() {
        let tmp = tempdir().unwrap();
        let home = tmp.path().join("home");
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(
            &cfg_path,
            format!(
                r#"
server:
  home_dir: "{}"
  host: "0.0.0.0"
  port: 9090
  timeout_sec: 30
logging:
  default:
    console_level: debug
    file: "logs/default.log"
"#,
                yaml_path(&home)
            ),
        )
        .unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert!(Path::new(&config.server.home_dir).is_absolute());
        assert!(home.is_dir());
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.timeout_sec, 30);
        assert_eq!(
            config.logging.as_ref().unwrap()["default"].console_level,
            "debug"
        );
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = AppConfig::load_layered(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(
            &cfg_path,
            format!(
                "server:\n  home_dir: \"{}\"\n  host: h\n  port: 1\ndatabase:\n  url: x\n",
                yaml_path(tmp.path())
            ),
        )
        .unwrap();
        assert!(AppConfig::load_layered(&cfg_path).is_err());
    }

    #[test]
    fn test_minimal_yaml_leaves_optional_sections_empty() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(
            &cfg_path,
            format!(
                "server:\n  home_dir: \"{}\"\n  host: localhost\n  port: 8081\n",
                yaml_path(tmp.path())
            ),
        )
        .unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert_eq!(config.server.port, 8081);
        assert!(config.logging.is_none());
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_modules_dir_is_merged_by_file_stem() {
        let tmp = tempdir().unwrap();
        let modules_dir = tmp.path().join("modules");
        fs::create_dir_all(&modules_dir).unwrap();
        fs::write(
            modules_dir.join("demo.yaml"),
            "setting: \"value1\"\ncount: 42\n",
        )
        .unwrap();
        fs::write(modules_dir.join("notes.txt"), "ignored").unwrap();

        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(
            &cfg_path,
            format!(
                r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 8080
modules_dir: "{}"
modules:
  existing:
    setting: "inline"
"#,
                yaml_path(tmp.path()),
                yaml_path(&modules_dir)
            ),
        )
        .unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert!(config.modules.contains_key("existing"));
        assert!(!config.modules.contains_key("notes"));

        let demo: DemoModule = config.module_config("demo").unwrap();
        assert_eq!(
            demo,
            DemoModule {
                setting: "value1".into(),
                count: 42
            }
        );
    }

    #[test]
    fn test_module_config_missing_and_invalid() {
        let mut config = AppConfig::default();
        let missing: DemoModule = config.module_config("nope").unwrap();
        assert_eq!(missing, DemoModule::default());

        config
            .modules
            .insert("demo".into(), serde_json::json!({ "count": "many" }));
        let err = config.module_config::<DemoModule>("demo").unwrap_err();
        assert!(err.to_string().contains("demo"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&CliArgs {
            port: Some(3000),
            verbose: 2,
            ..CliArgs::default()
        });
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.logging.as_ref().unwrap()["default"].console_level,
            "trace"
        );
    }

    #[test]
    fn test_cli_verbose_levels_matrix() {
        for (verbose, expected) in [(0, "info"), (1, "debug"), (2, "trace"), (5, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                verbose,
                ..CliArgs::default()
            });
            let level = &config.logging.as_ref().unwrap()["default"].console_level;
            assert_eq!(level, expected, "verbose={verbose}");
        }
    }

    #[test]
    fn test_to_yaml_roundtrip() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("server:"));
        assert!(yaml.contains("logging:"));

        let back: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.server.port, config.server.port);
    }
}
