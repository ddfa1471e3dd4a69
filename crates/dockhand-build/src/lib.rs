//! dockhand image build and publish
//!
//! Images named in the compose file under the private registry prefix are
//! built from the operator's local checkouts and pushed to the registry.

pub mod builder;
pub mod error;
pub mod progress;
pub mod pusher;

pub use builder::ImageBuilder;
pub use error::{BuildError, Result};
pub use progress::BuildProgress;
pub use pusher::{ImagePusher, validate_image_name};

use dockhand_core::Executor;

/// `<registry>/<image>`
pub fn image_tag(registry: &str, image: &str) -> String {
    format!("{}/{}", registry.trim_end_matches('/'), image)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Push,
}

/// Build every image, then push every image
///
/// `on_image` is called before each image of each stage. The first failure
/// aborts the whole batch.
pub async fn build_and_push_all<F>(executor: &Executor, images: &[String], mut on_image: F) -> Result<()>
where
    F: FnMut(Stage, &str),
{
    let builder = ImageBuilder::new(executor.clone());
    let pusher = ImagePusher::new(executor.clone());

    for image in images {
        on_image(Stage::Build, image);
        builder.build(image).await?;
    }
    for image in images {
        on_image(Stage::Push, image);
        pusher.push(image).await?;
    }

    tracing::info!("Published {} images", images.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhand_config::Settings;
    use dockhand_core::CommandOutput;
    use dockhand_core::testing::MockRunner;
    use std::sync::Arc;

    fn executor(runner: Arc<MockRunner>) -> Executor {
        let settings = Settings {
            registry_address: "registry.example.com".into(),
            local_repos_path: "/repos".into(),
            ..Default::default()
        };
        Executor::new(runner, Arc::new(settings))
    }

    #[test]
    fn test_image_tag() {
        assert_eq!(image_tag("registry.example.com", "api"), "registry.example.com/api");
        assert_eq!(image_tag("localhost:5000/", "web"), "localhost:5000/web");
    }

    #[tokio::test]
    async fn test_builds_everything_before_pushing() {
        let runner = Arc::new(MockRunner::new().on("docker build", CommandOutput::success("Successfully built abc\n")));
        let images = vec!["api".to_string(), "web".to_string()];
        let mut seen = Vec::new();

        build_and_push_all(&executor(runner.clone()), &images, |stage, image| {
            seen.push((stage, image.to_string()))
        })
        .await
        .unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "docker build -t registry.example.com/api /repos/api",
                "docker build -t registry.example.com/web /repos/web",
                "docker push registry.example.com/api",
                "docker push registry.example.com/web",
            ]
        );
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[2], (Stage::Push, "api".to_string()));
    }

    #[tokio::test]
    async fn test_tagged_image_is_built_and_pushed_with_its_tag() {
        let runner = Arc::new(MockRunner::new().on("docker build", CommandOutput::success("Successfully built abc\n")));
        let images = vec!["api:1.2".to_string()];

        build_and_push_all(&executor(runner.clone()), &images, |_, _| {})
            .await
            .unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "docker build -t registry.example.com/api:1.2 /repos/api",
                "docker push registry.example.com/api:1.2",
            ]
        );
    }

    #[tokio::test]
    async fn test_build_failure_aborts_before_any_push() {
        let runner = Arc::new(
            MockRunner::new()
                .on("/repos/api", CommandOutput::success("Successfully built abc\n"))
                .on("/repos/web", CommandOutput::failure(1, "no Dockerfile")),
        );
        let images = vec!["api".to_string(), "web".to_string(), "worker".to_string()];

        let err = build_and_push_all(&executor(runner.clone()), &images, |_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::BuildFailed { image, .. } if image == "web"));
        assert!(!runner.ran("docker push"));
        assert!(!runner.ran("worker"));
    }
}
