//! Cloud providers supported by docker-machine
//!
//! Each provider carries a static descriptor: the regions, sizes and images
//! offered to the operator, and the docker-machine flag names for each
//! abstract parameter.

use crate::error::{FleetError, Result};
use dockhand_config::Settings;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A selectable value: provider code and human label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub code: &'static str,
    pub label: &'static str,
}

const fn choice(code: &'static str, label: &'static str) -> Choice {
    Choice { code, label }
}

/// docker-machine flag names (without the leading `--`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverFlags {
    pub token: &'static str,
    pub access_key: Option<&'static str>,
    pub name: Option<&'static str>,
    pub region: &'static str,
    pub size: &'static str,
    pub image: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverDescriptor {
    /// docker-machine driver id
    pub id: &'static str,
    pub regions: &'static [Choice],
    pub sizes: &'static [Choice],
    pub images: &'static [Choice],
    pub flags: DriverFlags,
}

static DIGITALOCEAN: DriverDescriptor = DriverDescriptor {
    id: "digitalocean",
    regions: &[choice("ams3", "Amsterdam 3")],
    sizes: &[
        choice("512mb", "$5/mo, 1 vCPU, 512MB memory, 20GB SSD"),
        choice("1gb", "$10/mo, 1 vCPU, 1GB memory, 30GB SSD"),
        choice("2gb", "$20/mo, 1 vCPU, 2GB memory, 40GB SSD"),
    ],
    images: &[choice("ubuntu-16-04-x64", "Ubuntu 16.04")],
    flags: DriverFlags {
        token: "digitalocean-access-token",
        access_key: None,
        name: None,
        region: "digitalocean-region",
        size: "digitalocean-size",
        image: "digitalocean-image",
    },
};

static SCALEWAY: DriverDescriptor = DriverDescriptor {
    id: "scaleway",
    regions: &[choice("par1", "Paris"), choice("ams1", "Amsterdam")],
    sizes: &[
        choice("VC1S", "€2.99/mo, Virtual 2 x86 64bit cores, 2GB memory, 50GB SSD Disk"),
        choice("VC1M", "€5.99/mo, Virtual 4 x86 64bit cores, 4GB memory, 100GB SSD Disk"),
        choice("VC1L", "€9.99/mo, Virtual 6 x86 64bit cores, 8GB memory, 200GB SSD Disk"),
        choice("C2S", "€11.99/mo, BareMetal 4 x86 64bit cores, 8GB memory, 50GB SSD Disk"),
        choice("C2M", "€17.99/mo, BareMetal 8 x86 64bit cores, 16GB memory, 50GB SSD Disk"),
        choice(
            "C2L",
            "€23.99/mo, BareMetal 8 x86 64bit cores, 32GB memory, 50GB SSD Disk + 250GB Direct SSD Disk",
        ),
    ],
    images: &[choice("ubuntu-xenial", "Ubuntu 16.04")],
    flags: DriverFlags {
        token: "scaleway-token",
        access_key: Some("scaleway-organization"),
        name: Some("scaleway-name"),
        region: "scaleway-region",
        size: "scaleway-commercial-type",
        image: "scaleway-image",
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    DigitalOcean,
    Scaleway,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::DigitalOcean, Provider::Scaleway];

    pub fn descriptor(&self) -> &'static DriverDescriptor {
        match self {
            Provider::DigitalOcean => &DIGITALOCEAN,
            Provider::Scaleway => &SCALEWAY,
        }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor().id
    }

    /// Settings key holding the API token
    pub fn token_setting(&self) -> &'static str {
        match self {
            Provider::DigitalOcean => "digitalocean_token",
            Provider::Scaleway => "scaleway_token",
        }
    }

    pub fn token<'a>(&self, settings: &'a Settings) -> Option<&'a str> {
        match self {
            Provider::DigitalOcean => settings.digitalocean_token.as_deref(),
            Provider::Scaleway => settings.scaleway_token.as_deref(),
        }
    }

    /// Settings key holding the access key, for providers that take one
    pub fn access_key_setting(&self) -> Option<&'static str> {
        match self {
            Provider::DigitalOcean => None,
            Provider::Scaleway => Some("scaleway_access_key"),
        }
    }

    pub fn access_key<'a>(&self, settings: &'a Settings) -> Option<&'a str> {
        match self {
            Provider::DigitalOcean => None,
            Provider::Scaleway => settings.scaleway_access_key.as_deref(),
        }
    }

    /// API token, or `MissingCredential`
    pub fn require_token<'a>(&self, settings: &'a Settings) -> Result<&'a str> {
        self.token(settings)
            .filter(|t| !t.is_empty())
            .ok_or(FleetError::MissingCredential {
                provider: self.id(),
                setting: self.token_setting(),
            })
    }

    /// Access key when the provider takes one; `Ok(None)` when it does not
    pub fn require_access_key<'a>(&self, settings: &'a Settings) -> Result<Option<&'a str>> {
        let Some(setting) = self.access_key_setting() else {
            return Ok(None);
        };
        self.access_key(settings)
            .filter(|k| !k.is_empty())
            .map(Some)
            .ok_or(FleetError::MissingCredential {
                provider: self.id(),
                setting,
            })
    }

    pub fn is_configured(&self, settings: &Settings) -> bool {
        self.require_token(settings).is_ok()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self> {
        Provider::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| FleetError::UnknownProvider(s.to_string()))
    }
}
