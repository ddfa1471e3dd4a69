use crate::context::Console;
use crate::utils;
use colored::Colorize;

pub async fn handle(console: &Console, machine: &str, database: Option<&str>) -> anyhow::Result<()> {
    let available = console.topology.list_database_backed_services()?;
    let databases: Vec<String> = match database {
        Some(database) => {
            utils::ensure_known("database", database, &available)?;
            vec![database.to_string()]
        }
        None => available.into_iter().collect(),
    };

    println!();
    println!(
        "{}",
        format!(
            "Synchronizing {} databases from master to {}",
            databases.len(),
            machine
        )
        .cyan()
    );

    let pb = utils::progress_bar(databases.len());
    let mut started = 0;
    let result = console
        .database_sync()
        .sync_from_master(&databases, machine, |database| {
            pb.set_position(started);
            pb.set_message(utils::label(database));
            started += 1;
        })
        .await;

    match result {
        Ok(()) => {
            pb.set_position(databases.len() as u64);
            pb.finish_with_message("Done!".green().to_string());
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}
