use crate::context::Console;
use colored::Colorize;
use dockhand_cloud::{Machine, MachineStats};

pub async fn handle(console: &Console, json: bool, with_stats: bool) -> anyhow::Result<()> {
    let machines = console.registry.list_machines().await?;

    let mut rows = Vec::with_capacity(machines.len());
    for machine in machines.into_values() {
        let stats = if with_stats { collect_stats(console, &machine).await } else { None };
        rows.push((machine, stats));
    }

    if json {
        let value: Vec<_> = rows
            .iter()
            .map(|(machine, stats)| serde_json::json!({ "machine": machine, "stats": stats }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    if rows.is_empty() {
        println!("{}", "No machines".dimmed());
        return Ok(());
    }
    println!(
        "{}",
        format!(
            "{:<15} {:<15} {:<20} {:<10} {:<10} {:<15} {:<20} {:<25}",
            "Name", "Driver", "IP", "Running", "Active", "Uptime", "Load", "Disk"
        )
        .cyan()
        .bold()
    );
    for (machine, stats) in &rows {
        let stats = stats.clone().unwrap_or_default();
        let dash = || "-".to_string();
        println!(
            "{:<15} {:<15} {:<20} {:<10} {:<10} {:<15} {:<20} {:<25}",
            machine.name,
            machine.driver,
            machine.ip.clone().unwrap_or_else(dash),
            machine.running,
            machine.active,
            stats.uptime.unwrap_or_else(dash),
            stats.load.unwrap_or_else(dash),
            stats.disk.unwrap_or_else(dash),
        );
    }
    println!();
    Ok(())
}

/// Stats for a running machine; an unreachable machine only costs a warning
async fn collect_stats(console: &Console, machine: &Machine) -> Option<MachineStats> {
    let target = machine.target().filter(|_| machine.running)?;
    match MachineStats::collect(&console.executor, &target).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!("Could not collect stats for {}: {}", machine.name, e);
            None
        }
    }
}
