use compact_str::CompactString;
use eyre::{ensure, eyre};
use log::LevelFilter;
use serde::Deserialize;
use std::{path::Path, str::FromStr};

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Recorded `getUpdates` response or single update, relative to the work dir.
    pub updates_file: CompactString,
    #[serde(default = "default_log_level")]
    pub log_level: CompactString,
    #[serde(default)]
    pub stop_on_error: bool,
}

fn default_log_level() -> CompactString {
    "info".into()
}

impl GlobalConfig {
    fn validate(&self) -> eyre::Result<()> {
        ensure!(
            !self.updates_file.is_empty(),
            "updates file name cannot be empty"
        );
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> eyre::Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.as_str())
            .map_err(|_| eyre!("unknown log level '{}'", self.log_level))
    }

    pub fn from_xml(contents: &str) -> eyre::Result<Self> {
        let config = serde_xml_rs::from_str::<Self>(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_xml(contents.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config() {
        let config = GlobalConfig::from_xml(
            r#"<config>
                <updates_file>dump.json</updates_file>
                <log_level>debug</log_level>
                <stop_on_error>true</stop_on_error>
            </config>"#,
        )
        .unwrap();
        assert_eq!(
            config,
            GlobalConfig {
                updates_file: "dump.json".into(),
                log_level: "debug".into(),
                stop_on_error: true,
            }
        );
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn defaults() {
        let config =
            GlobalConfig::from_xml("<config><updates_file>a.json</updates_file></config>")
                .unwrap();
        assert_eq!(config.log_level, "info");
        assert!(!config.stop_on_error);
    }

    #[test]
    fn rejects_empty_updates_file() {
        assert!(GlobalConfig::from_xml("<config><updates_file></updates_file></config>").is_err());
    }

    #[test]
    fn rejects_unknown_level() {
        let err = GlobalConfig::from_xml(
            "<config><updates_file>a.json</updates_file><log_level>loud</log_level></config>",
        )
        .unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}
