//! Per-machine health figures for the machine listing

use crate::error::Result;
use dockhand_core::{ExecOptions, Executor, Target};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MachineStats {
    /// e.g. `3 days`
    pub uptime: Option<String>,
    /// 1, 5 and 15 minute load averages as printed by `uptime`
    pub load: Option<String>,
    /// Root filesystem usage, `<used> of <size> (<percent>)`
    pub disk: Option<String>,
}

impl MachineStats {
    /// Run `uptime` and `df -h` on the target
    ///
    /// Output that cannot be parsed leaves the field empty; only command
    /// failures are errors.
    pub async fn collect(executor: &Executor, target: &Target) -> Result<Self> {
        let uptime = executor
            .execute(target, "uptime", ExecOptions::silent())
            .await?;
        let df = executor
            .execute(target, "df -h", ExecOptions::silent())
            .await?;

        let (uptime, load) = parse_uptime(&uptime);
        Ok(Self {
            uptime,
            load,
            disk: parse_disk(&df),
        })
    }
}

/// `(uptime, load)` from a line like
/// ` 10:14:03 up 3 days,  2:01,  1 user,  load average: 0.00, 0.01, 0.05`
pub fn parse_uptime(output: &str) -> (Option<String>, Option<String>) {
    let output = output.trim();
    let uptime = output
        .split_once("up ")
        .and_then(|(_, rest)| rest.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let load = output
        .split_once("load average: ")
        .map(|(_, rest)| rest.trim().to_string());
    (uptime, load)
}

/// Usage of the filesystem mounted at `/`
pub fn parse_disk(output: &str) -> Option<String> {
    output.lines().skip(1).find_map(|row| {
        let cols: Vec<&str> = row.split_whitespace().collect();
        match cols.as_slice() {
            [_, size, used, _, percent, "/", ..] => Some(format!("{} of {} ({})", used, size, percent)),
            _ => None,
        }
    })
}
