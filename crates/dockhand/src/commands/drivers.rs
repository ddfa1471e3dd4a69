use crate::context::Console;
use colored::Colorize;
use dockhand_cloud::{Choice, FleetRegistry, Provider};

pub fn handle(console: &Console) {
    let configured = FleetRegistry::list_drivers(console.settings());

    println!();
    for provider in Provider::ALL {
        let descriptor = provider.descriptor();
        if configured.contains(&provider) {
            println!("{} {}", "✓".green(), provider.id().bold());
        } else {
            println!(
                "{} {} {}",
                "✗".red(),
                provider.id().bold(),
                format!("(set {})", provider.token_setting()).dimmed()
            );
        }
        print_choices("regions", descriptor.regions);
        print_choices("sizes", descriptor.sizes);
        print_choices("images", descriptor.images);
        println!();
    }
}

fn print_choices(title: &str, choices: &[Choice]) {
    println!("  {}:", title);
    for choice in choices {
        println!("    {:<14} {}", choice.code.cyan(), choice.label);
    }
}
