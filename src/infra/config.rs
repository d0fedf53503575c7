use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::chunk::Decoding;
use crate::core::search::SearchQuery;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Window decoding and display settings
    pub view: ViewConfig,

    /// Default search flags
    pub search: SearchConfig,

    /// Where history and bookmark snapshots live
    pub state: StateConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig
{
    /// `lossy` replaces invalid UTF-8, `strict` fails the read
    pub decoding: Decoding,
    /// Print a severity tag in front of each line
    pub show_level: bool,
    /// Pretty-print JSON embedded in lines
    pub expand_json: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig
{
    pub regex: bool,
    pub case_sensitive: bool,
    pub focus: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig
{
    /// State file; defaults to the platform data dir
    pub file: Option<PathBuf>,
    /// Record opened files in the recent-files history
    pub record_history: Option<bool>,
}

impl Default for ViewConfig
{
    fn default() -> Self
    {
        Self { decoding: Decoding::Lossy, show_level: false, expand_json: false }
    }
}

impl SearchConfig
{
    /// Query for `term` using these flags, overridden by explicit CLI flags
    pub fn query(
        &self,
        term: &str,
        regex: bool,
        case_sensitive: bool,
    ) -> SearchQuery
    {
        SearchQuery {
            term: term.to_string(),
            use_regex: regex || self.regex,
            case_sensitive: case_sensitive || self.case_sensitive,
        }
    }
}

impl StateConfig
{
    /// Resolve the state file: CLI override, config, platform default
    pub fn resolve(
        &self,
        override_path: Option<&Path>,
    ) -> PathBuf
    {
        if let Some(p) = override_path
        {
            return p.join("state.json");
        }
        if let Some(p) = &self.file
        {
            return p.clone();
        }
        dirs::data_local_dir()
            .map(|d| d.join("logwarp"))
            .unwrap_or_else(|| PathBuf::from(".logwarp"))
            .join("state.json")
    }

    pub fn records_history(&self) -> bool
    {
        self.record_history
            .unwrap_or(true)
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["logwarp.toml", "logwarp.yaml", "logwarp.json", ".logwarp.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with LOGWARP_ prefix (LOGWARP_SEARCH__REGEX=true)
    builder = builder.add_source(
        config::Environment::with_prefix("LOGWARP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("logwarp.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml()
    {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(text.contains("decoding = \"lossy\""));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.view.decoding, Decoding::Lossy);
        assert!(!back.search.regex);
    }

    #[test]
    fn partial_toml_fills_defaults()
    {
        let cfg: Config = toml::from_str("[search]\ncase_sensitive = true\n").unwrap();
        assert!(cfg.search.case_sensitive);
        assert!(!cfg.search.focus);
        assert_eq!(cfg.view.decoding, Decoding::Lossy);
        assert!(cfg.state.records_history());
    }

    #[test]
    fn cli_flags_widen_config_flags()
    {
        let cfg = SearchConfig { regex: true, case_sensitive: false, focus: false };
        let q = cfg.query("a+", false, true);
        assert!(q.use_regex);
        assert!(q.case_sensitive);
    }

    #[test]
    fn state_dir_override_wins()
    {
        let cfg = StateConfig { file: Some(PathBuf::from("/etc/x.json")), record_history: None };
        assert_eq!(cfg.resolve(Some(Path::new("/tmp/s"))), PathBuf::from("/tmp/s/state.json"));
        assert_eq!(cfg.resolve(None), PathBuf::from("/etc/x.json"));
    }
}
