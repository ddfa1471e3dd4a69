//! Database synchronization
//!
//! The master node keeps one SQL dump per database under
//! `master_database_path`. Syncing copies the whole dump directory to a
//! worker's `/tmp` and reloads a database from it inside the engine
//! container. Only master → worker is supported.

use crate::error::{Result, SyncError};
use crate::machine_ip;
use dockhand_cloud::FleetRegistry;
use dockhand_core::{ExecOptions, Executor, Target, TopologyReader, shell_escape};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct DatabaseSync {
    executor: Executor,
    registry: Arc<FleetRegistry>,
    topology: TopologyReader,
}

impl DatabaseSync {
    pub fn new(executor: Executor, registry: Arc<FleetRegistry>, topology: TopologyReader) -> Self {
        Self {
            executor,
            registry,
            topology,
        }
    }

    fn ensure_known(&self, database: &str) -> Result<()> {
        if self.topology.list_database_backed_services()?.contains(database) {
            Ok(())
        } else {
            Err(SyncError::DatabaseNotFound(database.to_string()))
        }
    }

    fn dump_source(&self) -> &str {
        self.executor
            .settings()
            .master_database_path
            .trim_end_matches('/')
    }

    /// Where the dump directory lands on a worker
    pub fn remote_dump_dir(&self) -> String {
        let name = Path::new(self.dump_source())
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("/tmp/{}", name)
    }

    /// Copy the dump directory from `src` to the worker `dst`
    #[instrument(skip(self))]
    pub async fn sync_dump(&self, database: &str, src: &str, dst: &str) -> Result<()> {
        if src != Target::MASTER {
            return Err(SyncError::NotImplemented(format!(
                "database dumps can only be copied from master, not {}",
                src
            )));
        }
        self.ensure_known(database)?;
        let ip = machine_ip(&self.registry, dst).await?;

        let command = format!(
            "rsync -avz {} {}@{}:/tmp/",
            shell_escape(self.dump_source()),
            self.executor.settings().ssh_user,
            ip
        );
        self.executor
            .execute(&Target::Master, &command, ExecOptions::silent())
            .await?;
        Ok(())
    }

    /// Recreate `database` on `dst` and load its dump
    #[instrument(skip(self))]
    pub async fn load_dump(&self, database: &str, dst: &str) -> Result<()> {
        self.ensure_known(database)?;
        let target = self.registry.resolve(dst).await?;
        if !matches!(target, Target::Machine { .. }) {
            return Err(SyncError::NotImplemented(format!(
                "database dumps can only be loaded on a machine, not {}",
                dst
            )));
        }

        let engine = shell_escape(&self.executor.settings().database_engine);
        let dir = self.remote_dump_dir();
        let db = database;
        let recreate = format!(
            "docker exec {engine} bash -c 'MYSQL_PWD=$MYSQL_ROOT_PASSWORD mysql -u root -e \"drop database if exists {db}; create database {db}\"'"
        );
        let load = format!(
            "cat {dir}/{db}.sql | docker exec -i {engine} bash -c 'MYSQL_PWD=$MYSQL_ROOT_PASSWORD mysql -u root {db}'"
        );

        self.executor
            .execute(&target, &recreate, ExecOptions::silent())
            .await?;
        self.executor
            .execute(&target, &load, ExecOptions::silent())
            .await?;
        Ok(())
    }

    /// Copy and load each database from master, stopping at the first failure
    pub async fn sync_from_master<F>(&self, databases: &[String], dst: &str, mut on_database: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        for database in databases {
            on_database(database);
            self.sync_dump(database, Target::MASTER, dst).await?;
            self.load_dump(database, dst).await?;
        }
        info!("Synchronized {} databases from master to {}", databases.len(), dst);
        Ok(())
    }
}
