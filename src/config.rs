use std::{
    collections::BTreeMap,
    env,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

const DEFAULT_API_ENDPOINT: &str = "https://www.nyckel.com";

/// An error encountered while loading or resolving a configuration profile.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The config file could not be read.
    #[error("Failed to load config file")]
    Io(#[from] io::Error),
    /// The config file is not valid YAML for a profile list.
    #[error("Invalid configuration")]
    Invalid(#[from] serde_yaml::Error),
    /// The selected profile is not in the config file.
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),
    /// The client secret is not ASCII.
    #[error("Client secret contains invalid characters")]
    InvalidClientSecret,
    /// Neither the config file nor the environment supplied a client id.
    #[error("No client id found (set NYCKEL_CLIENT_ID)")]
    NoClientId,
    /// Neither the config file nor the environment supplied a client secret.
    #[error("No client secret found (set NYCKEL_CLIENT_SECRET)")]
    NoClientSecret,
    /// The API endpoint is not a valid URI.
    #[error("Invalid URI")]
    InvalidUri(#[from] http::uri::InvalidUri),
}

/// A fully resolved configuration profile for talking to Nyckel.
#[derive(Clone)]
pub struct Profile {
    /// The name of the profile.
    pub name: String,
    /// The base URI of the API. Path templates are resolved against it.
    pub api_endpoint: http::Uri,
    /// The OAuth2 client id.
    pub client_id: String,
    /// The OAuth2 client secret.
    pub client_secret: String,
    /// The user-agent used on requests.
    pub user_agent: String,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("api_endpoint", &self.api_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"********")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// A profile stored in the config file.
#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigProfile {
    api_endpoint: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct Config {
    profiles: BTreeMap<String, ConfigProfile>,
}

impl Profile {
    /// Build a profile directly, without consulting the environment or any
    /// config file.
    pub fn new(
        api_endpoint: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        let client_secret = client_secret.into();
        if !client_secret.is_ascii() {
            return Err(Error::InvalidClientSecret);
        }

        Ok(Self {
            name: "default".to_owned(),
            api_endpoint: api_endpoint.parse()?,
            client_id: client_id.into(),
            client_secret,
            user_agent: make_ua(None),
        })
    }

    /// Load the selected profile from the Nyckel configuration file (usually
    /// ~/.config/nyckel.yaml), with environment overrides applied.
    ///
    /// If `NYCKEL_PROFILE` is set, that will be used to select the profile.
    /// Otherwise the profile `default` will be used.
    pub fn from_default_env() -> Result<Self, Error> {
        if let Ok(s) = env::var("NYCKEL_PROFILE") {
            Self::from_env(&s)
        } else {
            Self::from_env("default")
        }
    }

    /// Load the given profile from the Nyckel configuration file (usually
    /// ~/.config/nyckel.yaml). If no configuration file is present, then the
    /// configuration will be loaded solely from the environment.
    ///
    /// The following environment variables can override the corresponding
    /// values in the config file:
    ///
    /// | Environment Variable    | Config Value    |
    /// |-------------------------|-----------------|
    /// | `NYCKEL_CLIENT_ID`      | `client_id`     |
    /// | `NYCKEL_CLIENT_SECRET`  | `client_secret` |
    /// | `NYCKEL_API_ENDPOINT`   | `api_endpoint`  |
    ///
    /// The older `NYKEL_CLIENT_ID` and `NYKEL_CLIENT_SECRET` spellings are
    /// accepted as well.
    pub fn from_env(name: &str) -> Result<Self, Error> {
        let client_id = var_with_legacy("NYCKEL_CLIENT_ID", "NYKEL_CLIENT_ID");
        let client_secret = var_with_legacy("NYCKEL_CLIENT_SECRET", "NYKEL_CLIENT_SECRET");
        let api_endpoint = env::var("NYCKEL_API_ENDPOINT").ok();

        let profile = match find_config().and_then(|p| read_profile(&p, name)) {
            Ok(p) => p,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no config file found");
                Default::default()
            }
            // With everything supplied by the environment, a missing profile
            // entry is not an error.
            Err(Error::ProfileNotFound(_)) if client_id.is_some() && client_secret.is_some() => {
                Default::default()
            }
            Err(e) => return Err(e),
        };

        let api_endpoint = api_endpoint
            .as_deref()
            .or(profile.api_endpoint.as_deref())
            .unwrap_or(DEFAULT_API_ENDPOINT)
            .parse()?;

        let Some(client_id) = client_id.or(profile.client_id) else {
            return Err(Error::NoClientId);
        };

        let Some(client_secret) = client_secret.or(profile.client_secret) else {
            return Err(Error::NoClientSecret);
        };

        if !client_secret.is_ascii() {
            return Err(Error::InvalidClientSecret);
        }

        Ok(Self {
            name: name.to_owned(),
            api_endpoint,
            client_id,
            client_secret,
            user_agent: make_ua(None),
        })
    }

    /// Load the given profile (or 'default') from the given file, which must
    /// be a valid Nyckel configuration file. Does not read any environment
    /// variables.
    ///
    /// Usually, you will want to use [Profile::from_env] instead.
    pub fn read(path: impl AsRef<Path>, name: Option<&str>) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = name.unwrap_or("default").to_owned();
        let profile = read_profile(path, &name)?;
        Self::from_raw(profile, name)
    }

    /// Modifies the user-agent to have a different prefix.
    pub fn with_ua_product(self, ua_product: &str) -> Self {
        Self {
            user_agent: make_ua(Some(ua_product)),
            ..self
        }
    }

    fn from_raw(raw: ConfigProfile, name: String) -> Result<Self, Error> {
        let ConfigProfile {
            api_endpoint,
            client_id,
            client_secret,
        } = raw;

        let api_endpoint = api_endpoint
            .unwrap_or(DEFAULT_API_ENDPOINT.to_string())
            .parse()?;
        let client_id = client_id.ok_or(Error::NoClientId)?;
        let client_secret = client_secret.ok_or(Error::NoClientSecret)?;
        if !client_secret.is_ascii() {
            return Err(Error::InvalidClientSecret);
        }

        Ok(Self {
            name,
            api_endpoint,
            client_id,
            client_secret,
            user_agent: make_ua(None),
        })
    }
}

fn var_with_legacy(name: &str, legacy: &str) -> Option<String> {
    env::var(name)
        .or_else(|_| env::var(legacy))
        .ok()
        .filter(|v| !v.is_empty())
}

fn find_config() -> Result<PathBuf, Error> {
    let Some(home) = env::home_dir() else {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "No $HOME found for the current user",
        )));
    };

    let canonical = home.join(".config/nyckel.yaml");
    if canonical.exists() {
        return Ok(canonical);
    }

    for fallback in [".config/nyckel.yml", ".nyckel/config.yaml"] {
        let path = home.join(fallback);
        if path.exists() {
            return Ok(path);
        }
    }

    Ok(canonical)
}

fn read_profile(p: &Path, name: &str) -> Result<ConfigProfile, Error> {
    let file = File::open(p)?;
    let mut config: Config = serde_yaml::from_reader(file).map_err(Error::Invalid)?;
    let Some(config_profile) = config.profiles.remove(name) else {
        return Err(Error::ProfileNotFound(name.to_string()));
    };

    debug!(path = %p.display(), "loaded config file");

    Ok(config_profile)
}

fn make_ua(product: Option<&str>) -> String {
    format!("{}/{}", product.unwrap_or("nyckel"), env!("NYCKEL_VERSION"))
}
