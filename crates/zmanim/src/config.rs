use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use zmanim_calendar::{AdapterOptions, Location, PgStoreOptions, TransliterationStyle};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub location: LocationConfig,
}

/// カレンダーから取得するイベントの設定。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CalendarConfig {
    /// 英語名の表記 (ashkenazi | sephardi)
    #[serde(default)]
    pub style: TransliterationStyle,
    #[serde(default = "enabled")]
    pub exclude_modern: bool,
    #[serde(default = "enabled")]
    pub special_shabbat: bool,
    #[serde(default = "enabled")]
    pub shabbat_mevarchim: bool,
}

fn enabled() -> bool {
    true
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            style: TransliterationStyle::default(),
            exclude_modern: true,
            special_shabbat: true,
            shabbat_mevarchim: true,
        }
    }
}

impl CalendarConfig {
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            exclude_modern: self.exclude_modern,
            special_shabbat: self.special_shabbat,
            shabbat_mevarchim: self.shabbat_mevarchim,
            ..AdapterOptions::default()
        }
    }
}

/// パターンストアの設定。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// カタログをメモリ上で評価する。`catalog` 省略時は組み込みカタログ。
    Memory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        catalog: Option<PathBuf>,
    },
    Postgres {
        database_url: String,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        #[serde(default = "default_query_timeout", with = "humantime_serde")]
        query_timeout: Duration,
    },
    /// ストアなし。安息日のみ判定する。
    None,
}

fn default_max_connections() -> u32 {
    PgStoreOptions::default().max_connections
}

fn default_query_timeout() -> Duration {
    PgStoreOptions::default().query_timeout
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory { catalog: None }
    }
}

/// 観測地点。`is_israel` を省略すると座標から判定する。
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde_as(as = "DisplayFromStr")]
    pub timezone: Tz,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_israel: Option<bool>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "Jerusalem".to_string(),
            latitude: 31.7683,
            longitude: 35.2137,
            timezone: chrono_tz::Asia::Jerusalem,
            is_israel: None,
        }
    }
}

impl LocationConfig {
    pub fn to_location(&self) -> Location {
        let location = Location::new(&self.name, self.latitude, self.longitude, self.timezone);
        match self.is_israel {
            Some(is_israel) => location.with_israel(is_israel),
            None => location,
        }
    }
}

pub fn open_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
    let config: Config = toml::from_str(&content).context("Failed to parse configuration file")?;
    Ok(config)
}

pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize configuration")?;
    fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
    Ok(())
}
