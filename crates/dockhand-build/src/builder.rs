use crate::error::{BuildError, Result};
use crate::image_tag;
use crate::pusher::{split_tag, validate_image_name};
use dockhand_core::{CommandSpec, Executor};
use tracing::{debug, info, instrument};

/// Printed by the classic builder on success
const CLASSIC_MARKER: &str = "Successfully built ";
/// BuildKit prints `naming to <tag>` once the image is written
const BUILDKIT_MARKER: &str = "naming to ";

/// Builds images from `<local_repos_path>/<repository>` and tags them for
/// the private registry, tag included
#[derive(Clone)]
pub struct ImageBuilder {
    executor: Executor,
}

impl ImageBuilder {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub fn build_command(&self, image: &str) -> Result<CommandSpec> {
        let settings = self.executor.settings();
        let tag = image_tag(settings.require_registry_address()?, image);
        let (repository, _) = split_tag(image);
        let context = settings.local_repos_path.join(repository);
        Ok(CommandSpec::new("docker")
            .args(["build", "-t"])
            .arg(tag)
            .arg(context.display().to_string())
            .silent(true))
    }

    /// Build one image and return its full tag
    ///
    /// A zero exit status is not trusted on its own: the output must also
    /// contain the builder's success line.
    #[instrument(skip(self))]
    pub async fn build(&self, image: &str) -> Result<String> {
        validate_image_name(image)?;
        let tag = image_tag(self.executor.settings().require_registry_address()?, image);
        let spec = self.build_command(image)?;
        let command = spec.to_string();

        info!("Building {}", tag);
        let output = self.executor.run_output(spec).await?;
        let log = format!("{}{}", output.stdout, output.stderr);

        if !output.is_success() {
            return Err(BuildError::BuildFailed {
                image: image.to_string(),
                command,
                output: log,
            });
        }
        if !has_success_marker(&log, &tag) {
            return Err(BuildError::MissingSuccessMarker {
                image: image.to_string(),
                command,
                output: log,
            });
        }

        debug!("Built {}", tag);
        Ok(tag)
    }
}

/// The classic success line, or a BuildKit `naming to` line for exactly
/// this tag (an untagged reference also matches `:latest`)
fn has_success_marker(log: &str, tag: &str) -> bool {
    if log.contains(CLASSIC_MARKER) {
        return true;
    }
    let latest = match split_tag(tag.rsplit('/').next().unwrap_or(tag)) {
        (_, Some(_)) => None,
        (_, None) => Some(format!("{}:latest", tag)),
    };
    log.lines()
        .filter_map(|line| line.split_once(BUILDKIT_MARKER))
        .filter_map(|(_, rest)| rest.split_whitespace().next())
        .any(|named| named == tag || latest.as_deref() == Some(named))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhand_config::Settings;
    use dockhand_core::CommandOutput;
    use dockhand_core::testing::MockRunner;
    use std::sync::Arc;

    fn builder(runner: Arc<MockRunner>) -> ImageBuilder {
        let settings = Settings {
            registry_address: "registry.example.com".into(),
            local_repos_path: "/home/ops/repos".into(),
            ..Default::default()
        };
        ImageBuilder::new(Executor::new(runner, Arc::new(settings)))
    }

    #[test]
    fn test_build_command() {
        let spec = builder(Arc::new(MockRunner::new())).build_command("api").unwrap();
        assert_eq!(
            spec.to_string(),
            "docker build -t registry.example.com/api /home/ops/repos/api"
        );
    }

    #[tokio::test]
    async fn test_build_classic_success() {
        let runner = Arc::new(MockRunner::new().on(
            "docker build",
            CommandOutput::success("Step 1/3 : FROM python:3\nSuccessfully built 4e2f1c\n"),
        ));
        let tag = builder(runner).build("api").await.unwrap();
        assert_eq!(tag, "registry.example.com/api");
    }

    #[tokio::test]
    async fn test_build_buildkit_success_on_stderr() {
        let output = CommandOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: "#8 naming to registry.example.com/api done\n".into(),
        };
        let runner = Arc::new(MockRunner::new().on("docker build", output));
        assert!(builder(runner).build("api").await.is_ok());
    }

    #[test]
    fn test_build_command_keeps_tag() {
        let spec = builder(Arc::new(MockRunner::new())).build_command("api:1.2").unwrap();
        assert_eq!(
            spec.to_string(),
            "docker build -t registry.example.com/api:1.2 /home/ops/repos/api"
        );
    }

    #[test]
    fn test_buildkit_marker_matches_exact_tag() {
        let tag = "registry.example.com/api";
        assert!(has_success_marker("#8 naming to registry.example.com/api done", tag));
        assert!(has_success_marker("#8 naming to registry.example.com/api:latest done", tag));
        assert!(!has_success_marker("#8 naming to registry.example.com/api-v2 done", tag));
        assert!(!has_success_marker("#8 naming to registry.example.com/api:1.2 done", tag));

        let tagged = "registry.example.com/api:1.2";
        assert!(has_success_marker("#8 naming to registry.example.com/api:1.2 done", tagged));
        assert!(!has_success_marker("#8 naming to registry.example.com/api:1.2.1 done", tagged));
    }

    #[tokio::test]
    async fn test_build_tagged_image() {
        let output = CommandOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: "#8 naming to registry.example.com/api:1.2 done\n".into(),
        };
        let runner = Arc::new(MockRunner::new().on("docker build", output));
        let tag = builder(runner).build("api:1.2").await.unwrap();
        assert_eq!(tag, "registry.example.com/api:1.2");
    }

    #[tokio::test]
    async fn test_build_exit_zero_without_marker() {
        let runner = Arc::new(MockRunner::new().on("docker build", CommandOutput::success("Step 1/3\n")));
        let err = builder(runner).build("api").await.unwrap_err();
        assert!(matches!(err, BuildError::MissingSuccessMarker { image, .. } if image == "api"));
    }

    #[tokio::test]
    async fn test_build_non_zero_exit() {
        let runner = Arc::new(MockRunner::new().on(
            "docker build",
            CommandOutput::failure(1, "unable to prepare context"),
        ));
        let err = builder(runner).build("api").await.unwrap_err();
        match err {
            BuildError::BuildFailed { command, output, .. } => {
                assert!(command.starts_with("docker build -t registry.example.com/api"));
                assert!(output.contains("unable to prepare context"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_requires_registry() {
        let runner = Arc::new(MockRunner::new());
        let builder = ImageBuilder::new(Executor::new(runner.clone(), Arc::new(Settings::default())));
        assert!(matches!(builder.build("api").await, Err(BuildError::Config(_))));
        assert!(runner.commands().is_empty());
    }
}
