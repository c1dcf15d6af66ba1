use std::io::ErrorKind;
use std::path::PathBuf;

use eyre::{eyre, Result};
use serde::Deserialize;

/// How tests reach the reservation system
#[derive(Clone, Copy, PartialEq, Eq, Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// In-process: requests go straight to the dispatcher
    #[default]
    Direct,
    /// Through a real TCP server on an ephemeral port
    Tcp,
}

#[derive(Clone, Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct TestSettings {
    #[serde(skip)]
    pub project_root: Option<PathBuf>,

    #[serde(default)]
    pub transport: Transport,

    /// Worker threads serving the direct transport
    #[serde(default = "default_workers")]
    pub direct_workers: u16,
}

fn default_workers() -> u16 {
    4
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            project_root: None,
            transport: Transport::default(),
            direct_workers: default_workers(),
        }
    }
}

const SETTINGS_FILE: &str = "inflight-tests.toml";

impl TestSettings {
    /// Read the nearest `inflight-tests.toml` above the current directory
    ///
    /// Without one, the defaults apply. `INFLIGHT_TRANSPORT` overrides the
    /// transport either way.
    pub fn load() -> Result<Self> {
        let mut settings = match find_settings_file()? {
            Some((root, contents)) => {
                let mut settings: TestSettings = toml::from_str(&contents)?;
                settings.project_root = Some(root);
                settings
            }
            None => TestSettings::default(),
        };

        if let Some(v) = std::env::var_os("INFLIGHT_TRANSPORT") {
            if v.eq_ignore_ascii_case("direct") {
                settings.transport = Transport::Direct;
            } else if v.eq_ignore_ascii_case("tcp") {
                settings.transport = Transport::Tcp;
            } else {
                return Err(eyre!("INFLIGHT_TRANSPORT must be `direct` or `tcp`, got {v:?}"));
            }
        }

        if settings.direct_workers == 0 {
            return Err(eyre!("direct-workers must be at least 1"));
        }
        Ok(settings)
    }
}

fn find_settings_file() -> Result<Option<(PathBuf, String)>> {
    let mut path = std::env::current_dir()?;
    loop {
        path.push(SETTINGS_FILE);

        match std::fs::read_to_string(&path) {
            Ok(s) => {
                path.pop();
                return Ok(Some((path, s)));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        path.pop();
        if !path.pop() {
            return Ok(None);
        }
    }
}
