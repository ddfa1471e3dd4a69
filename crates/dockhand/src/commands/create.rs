use crate::context::Console;
use crate::utils;
use colored::Colorize;
use dockhand_cloud::{CreateMachineConfig, FleetRegistry, Provider};

pub async fn handle(
    console: &Console,
    name: &str,
    provider: Option<&str>,
    region: Option<String>,
    size: Option<String>,
    image: Option<String>,
) -> anyhow::Result<()> {
    let provider: Provider = provider
        .ok_or_else(|| anyhow::anyhow!("--provider is required"))?
        .parse()?;
    if !FleetRegistry::list_drivers(console.settings()).contains(&provider) {
        println!(
            "{}",
            format!("Warning: no token configured for {}", provider).yellow()
        );
    }

    let descriptor = provider.descriptor();
    utils::ensure_choice("region", region.as_deref(), descriptor.regions)?;
    utils::ensure_choice("size", size.as_deref(), descriptor.sizes)?;
    utils::ensure_choice("image", image.as_deref(), descriptor.images)?;

    let config = CreateMachineConfig::new(name, provider)
        .region(region)
        .size(size)
        .image(image);

    println!();
    println!("{}", format!("Creating new machine {}", name).cyan());
    console.machines().create(&config).await?;
    utils::done();
    println!("Next: {} init {}", "dockhand".cyan(), name);
    Ok(())
}

pub async fn handle_existing(console: &Console, name: &str) -> anyhow::Result<()> {
    println!();
    println!("{}", format!("Provisioning existing machine {}", name).cyan());
    console.machines().provision(name).await?;
    println!(
        "{}",
        "Registering existing machines is not supported yet; nothing was changed.".yellow()
    );
    Ok(())
}
