//! Configuration types for site-harvest

use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

use crate::error::{Error, Result};
use crate::types::Endpoint;

/// Per-endpoint fetch behavior (attempt budget, timeout, backoff)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of attempts per endpoint, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound on a single attempt (default: 10 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Fixed delay after a connection failure or timeout (default: 2 seconds)
    #[serde(default = "default_backoff", with = "duration_serde")]
    pub backoff: Duration,

    /// User-Agent header sent with every request (None = HTTP client default)
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout: default_timeout(),
            backoff: default_backoff(),
            user_agent: None,
        }
    }
}

/// Where the collected table is written
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination CSV file (default: "hospital_data.csv")
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// Top-level configuration
///
/// Every field has a default, so `{}` is a valid configuration file and
/// reproduces the built-in hospital collection run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Ordered list of addresses to fetch (default: built-in hospital list)
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Output location
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults. The result is not
    /// validated; call [`Config::validate`] before use.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check that every setting is usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key when an endpoint is
    /// blank, or when the attempt budget or timeout is zero. Malformed URLs
    /// are accepted here; they fail at fetch time and are skipped like any
    /// other unreachable endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.max_attempts == 0 {
            return Err(Error::config(
                "max_attempts must be at least 1",
                "fetch.max_attempts",
            ));
        }
        if self.fetch.timeout.is_zero() {
            return Err(Error::config(
                "timeout must be greater than zero",
                "fetch.timeout",
            ));
        }
        for (i, address) in self.endpoints.iter().enumerate() {
            if address.trim().is_empty() {
                return Err(Error::config(
                    "endpoint address must not be empty",
                    format!("endpoints[{i}]"),
                ));
            }
        }
        Ok(())
    }

    /// Validated endpoint list, in configuration order
    pub fn endpoint_list(&self) -> Result<Vec<Endpoint>> {
        self.validate()?;
        self.endpoints.iter().cloned().map(Endpoint::new).collect()
    }

    /// Output file path
    pub fn output_path(&self) -> &PathBuf {
        &self.output.path
    }
}

pub(crate) fn default_max_attempts() -> u32 {
    3
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff() -> Duration {
    Duration::from_secs(2)
}

fn default_output_path() -> PathBuf {
    PathBuf::from("hospital_data.csv")
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect()
}

/// Hospital home pages collected when no endpoint list is configured
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://www.mayoclinic.org/",
    "https://my.clevelandclinic.org/",
    "https://www.uhn.ca/",
    "https://www.hopkinsmedicine.org/",
    "https://www.massgeneral.org/",
    "https://www.charite.de/",
    "https://www.karolinska.se/",
    "https://www.aphp.fr/hopital/pitie-salpetriere",
    "https://www.sheba.co.il/",
    "https://www.usz.ch/",
    "https://www.sgh.com.sg/",
    "https://www.uclahealth.org/",
    "https://www.chuv.ch/",
    "https://www.unispital-basel.ch/",
    "https://www.klinikum.uni-heidelberg.de/",
    "https://stanfordhealthcare.org/",
    "https://www.aphp.fr/hopital/europeen-georges-pompidou",
    "https://www.h.u-tokyo.ac.jp/",
    "https://www.brighamandwomens.org/",
    "https://www.mountsinai.org/",
    "https://www.rigshospitalet.dk/",
    "https://www.amc.seoul.kr/asan/main.do",
    "https://www.auh.dk/",
    "https://hospital.luke.ac.jp/",
    "https://www.akhwien.at/",
    "https://www.lmu-klinikum.de/",
    "https://www.mri.tum.de/",
    "https://www.einstein.br/",
    "https://oslo-universitetssykehus.no/",
    "https://sunnybrook.ca/",
    "https://www.nm.org/",
    "https://www.mountsinai.on.ca/",
    "https://www.amsterdamumc.org/",
    "https://www.samsunghospital.com/",
    "https://www.policlinicogemelli.it/",
    "https://www.guysandstthomas.nhs.uk/",
    "https://www.uofmhealth.org/",
    "https://www.chu-lille.fr/",
    "https://www.mh-hannover.de/",
    "https://www.yuhs.or.kr/en/hospitals/severance/",
    "https://www.cedars-sinai.org/",
    "https://www.umcutrecht.nl/",
    "https://www.snuh.org/",
    "https://www.uzleuven.be/en",
    "https://www.kameda.com/",
    "https://www.comunidad.madrid/hospital/lapaz",
    "https://www.nygh.on.ca/",
    "https://www.uke.de/",
    "https://www.ucsfhealth.org/",
    "https://www.hus.fi/",
];

// Duration serialization helper (seconds, fractional when needed)
mod duration_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            serializer.serialize_f64(duration.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
