use crate::context::Console;
use crate::utils;
use colored::Colorize;

pub async fn handle(console: &Console, machine: &str, yes: bool) -> anyhow::Result<()> {
    // existence check up front so a typo is not mistaken for a docker-machine error
    let machine = console.registry.get_machine(machine).await?;

    if !yes {
        println!();
        println!(
            "{}",
            format!(
                "Warning: {} ({}) and everything on it will be destroyed.",
                machine.name, machine.driver
            )
            .yellow()
        );
        println!("Run again with --yes to confirm");
        return Ok(());
    }

    println!();
    println!("{}", format!("Destroying machine {}", machine.name).cyan());
    console.machines().destroy(&machine.name).await?;
    utils::done();
    Ok(())
}
