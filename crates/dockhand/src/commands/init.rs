use crate::context::Console;
use crate::utils;
use colored::Colorize;
use dockhand_cloud::{BootstrapStep, StepOutcome};

pub async fn handle(console: &Console, machine: &str, step: Option<&str>) -> anyhow::Result<()> {
    let bootstrapper = console.bootstrapper();

    if let Some(id) = step {
        let step = BootstrapStep::from_id(id).ok_or_else(|| {
            let ids: Vec<_> = BootstrapStep::ALL.iter().map(|s| s.id()).collect();
            anyhow::anyhow!("Unknown step '{}'\nAvailable: {}", id, ids.join(", "))
        })?;
        println!();
        println!("{}", format!("Running {} on {}", step, machine).cyan());
        print_outcome(step, &bootstrapper.run_step(machine, step).await?);
        return Ok(());
    }

    println!();
    let pb = utils::progress_bar(BootstrapStep::ALL.len());
    let mut started = 0;
    let result = bootstrapper
        .run_with_progress(machine, |step| {
            pb.set_position(started);
            pb.set_message(utils::label(step.name()));
            started += 1;
        })
        .await;

    match result {
        Ok(report) => {
            pb.set_position(report.steps.len() as u64);
            pb.finish_with_message("Done!".green().to_string());
            println!();
            for (step, outcome) in &report.steps {
                print_outcome(*step, outcome);
            }
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}

fn print_outcome(step: BootstrapStep, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Applied => println!("  {} {}", "✓".green(), step),
        StepOutcome::Skipped { reason } => {
            println!("  {} {} {}", "-".dimmed(), step, format!("({})", reason).dimmed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use dockhand_cloud::FleetError;
    use dockhand_config::{ConfigError, Settings};
    use dockhand_core::testing::MockRunner;

    #[tokio::test]
    async fn test_full_bootstrap() {
        let (_dir, runner, console) = fixtures::console(MockRunner::new(), fixtures::settings());

        handle(&console, "web-1", None).await.unwrap();

        assert!(runner.ran_shell("swapon /swapfile"));
        assert!(runner.ran_shell("apt-get install -y htop"));
        assert!(runner.ran_shell("docker login -u deploy -p secret registry.example.com"));
        assert!(runner.ran_shell("mkdir -p /volumes"));
    }

    #[tokio::test]
    async fn test_single_step() {
        let (_dir, runner, console) = fixtures::console(MockRunner::new(), fixtures::settings());

        handle(&console, "web-1", Some("volumes")).await.unwrap();

        assert_eq!(runner.shell_commands(), vec!["mkdir -p /volumes"]);
    }

    #[tokio::test]
    async fn test_unknown_step_runs_nothing() {
        let (_dir, runner, console) = fixtures::console(MockRunner::new(), fixtures::settings());

        let err = handle(&console, "web-1", Some("kernel")).await.unwrap_err();

        assert!(err.to_string().starts_with("Unknown step 'kernel'"));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_failed_step_stops_the_sequence() {
        let settings = Settings {
            registry_password: None,
            ..fixtures::settings()
        };
        let (_dir, runner, console) = fixtures::console(MockRunner::new(), settings);

        let err = handle(&console, "web-1", None).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FleetError>(),
            Some(FleetError::Config(ConfigError::Missing(..)))
        ));
        assert!(!runner.ran("docker login"));
        assert!(!runner.ran_shell("mkdir -p /volumes"));
    }
}
