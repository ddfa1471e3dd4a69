//! docker-machine CLI wrapper

use crate::error::Result;
use crate::machine::{Machine, host_from_url};
use crate::provider::Provider;
use dockhand_config::Settings;
use dockhand_core::{CommandSpec, Executor};
use std::collections::BTreeMap;

pub const DOCKER_MACHINE: &str = "docker-machine";

/// Options for `docker-machine create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMachineConfig {
    pub name: String,
    pub provider: Provider,
    pub region: Option<String>,
    pub size: Option<String>,
    pub image: Option<String>,
}

impl CreateMachineConfig {
    pub fn new(name: impl Into<String>, provider: Provider) -> Self {
        Self {
            name: name.into(),
            provider,
            region: None,
            size: None,
            image: None,
        }
    }

    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn size(mut self, size: Option<String>) -> Self {
        self.size = size;
        self
    }

    pub fn image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

/// docker-machine invoked through the executor
#[derive(Clone)]
pub struct DockerMachine {
    executor: Executor,
}

impl DockerMachine {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Current machines, keyed and ordered by name
    pub async fn ls(&self) -> Result<BTreeMap<String, Machine>> {
        // errors for unreachable machines go to stderr; the table is still usable
        let output = self
            .executor
            .run(CommandSpec::new(DOCKER_MACHINE).arg("ls").silent(true))
            .await?;
        Ok(parse_ls(&output))
    }

    pub async fn create(&self, config: &CreateMachineConfig) -> Result<()> {
        let spec = create_command(config, self.executor.settings())?;
        self.executor.run(spec).await?;
        Ok(())
    }

    pub async fn rm(&self, name: &str) -> Result<()> {
        self.executor.run(rm_command(name)).await?;
        Ok(())
    }
}

/// `docker-machine create -d <driver> --<flag> <value>... <name>`
pub fn create_command(config: &CreateMachineConfig, settings: &Settings) -> Result<CommandSpec> {
    let provider = config.provider;
    let flags = provider.descriptor().flags;
    let flag = |name: &str| format!("--{}", name);

    let mut spec = CommandSpec::new(DOCKER_MACHINE)
        .args(["create", "-d", provider.id()])
        .arg(flag(flags.token))
        .arg(provider.require_token(settings)?);

    if let (Some(access_key_flag), Some(access_key)) =
        (flags.access_key, provider.require_access_key(settings)?)
    {
        spec = spec.arg(flag(access_key_flag)).arg(access_key);
    }
    if let Some(name_flag) = flags.name {
        spec = spec.arg(flag(name_flag)).arg(&config.name);
    }

    for (value, flag_name) in [
        (&config.region, flags.region),
        (&config.size, flags.size),
        (&config.image, flags.image),
    ] {
        if let Some(value) = value {
            spec = spec.arg(flag(flag_name)).arg(value);
        }
    }

    Ok(spec.arg(&config.name))
}

/// `docker-machine rm -y <name>`
pub fn rm_command(name: &str) -> CommandSpec {
    CommandSpec::new(DOCKER_MACHINE).args(["rm", "-y", name])
}

/// Parse the `docker-machine ls` table
///
/// Columns: NAME ACTIVE DRIVER STATE URL ... Header and `error ` lines and
/// lines with fewer than two fields are skipped; a stopped machine has no
/// URL and therefore no IP.
pub fn parse_ls(output: &str) -> BTreeMap<String, Machine> {
    let mut machines = BTreeMap::new();

    for line in output.lines() {
        if line.starts_with("NAME") || line.starts_with("error ") {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }

        let url = fields
            .get(4)
            .filter(|f| f.contains("://"))
            .map(|f| f.to_string());
        let machine = Machine {
            name: fields[0].to_string(),
            active: fields[1] == "*",
            driver: fields.get(2).copied().unwrap_or_default().to_string(),
            running: fields.get(3) == Some(&"Running"),
            ip: url.as_deref().and_then(host_from_url),
            url,
        };
        machines.insert(machine.name.clone(), machine);
    }

    machines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FleetError;

    const LS_OUTPUT: &str = "\
NAME     ACTIVE   DRIVER         STATE     URL                         SWARM   DOCKER        ERRORS
web-2    -        digitalocean   Stopped                                       Unknown
db-1     *        scaleway       Running   tcp://51.15.10.20:2376              v17.03.0-ce
web-1    -        digitalocean   Running   tcp://188.166.1.2:2376              v17.03.0-ce
error getting state for host old: machine does not exist
x
";

    #[test]
    fn test_parse_ls() {
        let machines = parse_ls(LS_OUTPUT);

        let names: Vec<_> = machines.keys().cloned().collect();
        assert_eq!(names, vec!["db-1", "web-1", "web-2"]);

        let db = &machines["db-1"];
        assert!(db.active);
        assert!(db.running);
        assert_eq!(db.driver, "scaleway");
        assert_eq!(db.url.as_deref(), Some("tcp://51.15.10.20:2376"));
        assert_eq!(db.ip.as_deref(), Some("51.15.10.20"));

        let stopped = &machines["web-2"];
        assert!(!stopped.running);
        assert!(!stopped.active);
        assert_eq!(stopped.url, None);
        assert_eq!(stopped.ip, None);
    }

    #[test]
    fn test_parse_ls_skips_short_lines() {
        let machines = parse_ls("NAME ACTIVE\nlonely\n\n   \n");
        assert!(machines.is_empty());
    }

    #[test]
    fn test_parse_ls_tolerates_truncated_rows() {
        let machines = parse_ls("half -\n");
        let half = &machines["half"];
        assert_eq!(half.driver, "");
        assert!(!half.running);
        assert_eq!(half.ip, None);
    }

    fn settings() -> Settings {
        Settings {
            digitalocean_token: Some("do-token".into()),
            scaleway_token: Some("scw-token".into()),
            scaleway_access_key: Some("org-id".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_command_digitalocean() {
        let config = CreateMachineConfig::new("web-3", Provider::DigitalOcean)
            .region(Some("ams3".into()))
            .size(Some("1gb".into()));
        let spec = create_command(&config, &settings()).unwrap();

        assert_eq!(
            spec.to_string(),
            "docker-machine create -d digitalocean --digitalocean-access-token do-token \
             --digitalocean-region ams3 --digitalocean-size 1gb web-3"
        );
    }

    #[test]
    fn test_create_command_scaleway_includes_access_key_and_name() {
        let config = CreateMachineConfig::new("db-2", Provider::Scaleway)
            .image(Some("ubuntu-xenial".into()));
        let spec = create_command(&config, &settings()).unwrap();

        assert_eq!(
            spec.to_string(),
            "docker-machine create -d scaleway --scaleway-token scw-token \
             --scaleway-organization org-id --scaleway-name db-2 \
             --scaleway-image ubuntu-xenial db-2"
        );
    }

    #[test]
    fn test_create_command_missing_token() {
        let config = CreateMachineConfig::new("web-3", Provider::DigitalOcean);
        let err = create_command(&config, &Settings::default()).unwrap_err();
        assert!(matches!(err, FleetError::MissingCredential { .. }));
    }

    #[test]
    fn test_create_command_missing_access_key() {
        let config = CreateMachineConfig::new("db-2", Provider::Scaleway);
        let settings = Settings {
            scaleway_token: Some("scw-token".into()),
            ..Default::default()
        };
        let err = create_command(&config, &settings).unwrap_err();
        assert!(matches!(
            err,
            FleetError::MissingCredential {
                provider: "scaleway",
                setting: "scaleway_access_key",
            }
        ));
    }

    #[test]
    fn test_rm_command() {
        assert_eq!(rm_command("web-1").to_string(), "docker-machine rm -y web-1");
    }
}
