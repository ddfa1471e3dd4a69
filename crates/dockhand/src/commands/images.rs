use crate::context::Console;
use crate::utils;
use colored::Colorize;
use dockhand_build::{BuildProgress, Stage, build_and_push_all};

pub async fn handle(console: &Console, image: Option<&str>) -> anyhow::Result<()> {
    let available = console.topology.list_image_backed_services()?;
    let images: Vec<String> = match image {
        Some(image) => {
            utils::ensure_known("image", image, &available)?;
            vec![image.to_string()]
        }
        None => available.into_iter().collect(),
    };
    if images.is_empty() {
        println!(
            "{}",
            format!("No services use images from {}", console.settings().registry_address).dimmed()
        );
        return Ok(());
    }

    println!();
    println!("{}", format!("Building and pushing {} images", images.len()).cyan());

    let build = BuildProgress::new("build", images.len());
    let push = BuildProgress::new("push", images.len());
    let mut built = 0;
    let mut pushed = 0;
    let result = build_and_push_all(&console.executor, &images, |stage, image| match stage {
        Stage::Build => {
            if built > 0 {
                build.advance();
            }
            built += 1;
            build.start(image);
        }
        Stage::Push => {
            if pushed == 0 {
                build.advance();
                build.finish_success();
            } else {
                push.advance();
            }
            pushed += 1;
            push.start(image);
        }
    })
    .await;

    match result {
        Ok(()) => {
            push.advance();
            push.finish_success();
            Ok(())
        }
        Err(e) => {
            if pushed > 0 {
                push.finish_error("failed");
            } else {
                build.finish_error("failed");
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use dockhand_build::BuildError;
    use dockhand_core::CommandOutput;
    use dockhand_core::testing::MockRunner;

    fn built() -> MockRunner {
        MockRunner::new().on("docker build", CommandOutput::success("Successfully built 4e2f1c\n"))
    }

    #[tokio::test]
    async fn test_builds_then_pushes_every_private_image() {
        let (_dir, runner, console) = fixtures::console(built(), fixtures::settings());

        handle(&console, None).await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "docker build -t registry.example.com/api:1.2 /home/ops/repos/api",
                "docker build -t registry.example.com/worker /home/ops/repos/worker",
                "docker push registry.example.com/api:1.2",
                "docker push registry.example.com/worker",
            ]
        );
    }

    #[tokio::test]
    async fn test_single_image() {
        let (_dir, runner, console) = fixtures::console(built(), fixtures::settings());

        handle(&console, Some("worker")).await.unwrap();

        assert_eq!(runner.count("docker build"), 1);
        assert!(runner.ran("docker push registry.example.com/worker"));
        assert!(!runner.ran("api"));
    }

    #[tokio::test]
    async fn test_unknown_image_runs_nothing() {
        let (_dir, runner, console) = fixtures::console(built(), fixtures::settings());

        let err = handle(&console, Some("api")).await.unwrap_err();

        assert!(err.to_string().contains("Available: api:1.2, worker"));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_build_failure_is_a_build_error_and_nothing_is_pushed() {
        let (_dir, runner, console) = fixtures::console(
            MockRunner::new().on("docker build", CommandOutput::failure(1, "no Dockerfile")),
            fixtures::settings(),
        );

        let err = handle(&console, None).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::BuildFailed { image, .. }) if image == "api:1.2"
        ));
        assert!(!runner.ran("docker push"));
    }
}
