pub mod create;
pub mod databases;
pub mod destroy;
pub mod drivers;
pub mod images;
pub mod init;
pub mod launch;
pub mod machines;
pub mod volumes;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::context::Console;
    use dockhand_config::Settings;
    use dockhand_core::CommandOutput;
    use dockhand_core::testing::MockRunner;
    use std::sync::Arc;
    use tempfile::TempDir;

    pub const LS: &str = "\
NAME    ACTIVE   DRIVER         STATE     URL                   SWARM   DOCKER   ERRORS
web-1   -        digitalocean   Running   tcp://10.0.0.1:2376           v1
";

    pub const COMPOSE: &str = "\
services:
  api:
    image: registry.example.com/api:1.2
    links:
      - mysql
    volumes:
      - /volumes/assets/app:/app/assets
      - /volumes/cache:/tmp/cache
  worker:
    image: registry.example.com/worker
    links:
      - mysql:db
  mysql:
    image: mysql:5.7
";

    pub fn settings() -> Settings {
        Settings {
            registry_address: "registry.example.com".into(),
            registry_user: Some("deploy".into()),
            registry_password: Some("secret".into()),
            master_address: "master.example.com".into(),
            master_volumes_path: "/srv/volumes".into(),
            master_database_path: "/srv/databases".into(),
            local_volumes_path: "/home/ops/volumes".into(),
            local_repos_path: "/home/ops/repos".into(),
            non_backed_up_volumes: vec!["cache".into()],
            ..Default::default()
        }
    }

    /// Console over a temporary compose file; `docker-machine ls` lists web-1
    pub fn console(runner: MockRunner, settings: Settings) -> (TempDir, Arc<MockRunner>, Console) {
        let dir = tempfile::tempdir().unwrap();
        let compose_file = dir.path().join("docker-compose.yml");
        std::fs::write(&compose_file, COMPOSE).unwrap();

        let runner = Arc::new(runner.on("docker-machine ls", CommandOutput::success(LS)));
        let settings = Settings {
            compose_file,
            ..settings
        };
        let console = Console::new(settings, runner.clone());
        (dir, runner, console)
    }
}
