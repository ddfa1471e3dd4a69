use crate::context::Console;
use crate::utils;
use colored::Colorize;

pub async fn handle(console: &Console, machine: &str, service: Option<&str>) -> anyhow::Result<()> {
    println!();
    match service {
        Some(service) => println!("{}", format!("Recreating {} on {}", service, machine).cyan()),
        None => println!("{}", format!("Recreating all services on {}", machine).cyan()),
    }

    console.launcher().launch(machine, service).await?;
    utils::done();
    Ok(())
}
