//! Image publishing
//!
//! Pushes images built by [`crate::ImageBuilder`] to the private registry.
//! The docker daemon must already be logged in to the registry.

use crate::error::{BuildError, Result};
use crate::image_tag;
use dockhand_core::{CommandSpec, Executor};
use tracing::info;

#[derive(Clone)]
pub struct ImagePusher {
    executor: Executor,
}

impl ImagePusher {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Push `<registry>/<image>` and return the pushed tag
    pub async fn push(&self, image: &str) -> Result<String> {
        validate_image_name(image)?;
        let tag = image_tag(self.executor.settings().require_registry_address()?, image);

        info!("Pushing {}", tag);
        self.executor
            .run(CommandSpec::new("docker").arg("push").arg(&tag).silent(true))
            .await?;
        Ok(tag)
    }
}

/// `api:1.2` -> (`api`, `Some("1.2")`)
pub fn split_tag(image: &str) -> (&str, Option<&str>) {
    match image.split_once(':') {
        Some((repository, tag)) => (repository, Some(tag)),
        None => (image, None),
    }
}

/// Image reference rules
///
/// Repository: lowercase letters, digits and `._-/` separators, starting with
/// a letter or digit, at most 128 characters. Optional tag after `:`: letters,
/// digits and `._-`, not starting with `.` or `-`, at most 128 characters.
pub fn validate_image_name(image: &str) -> Result<()> {
    let invalid = || BuildError::InvalidImageName(image.to_string());
    let (repository, tag) = split_tag(image);

    if repository.is_empty() || repository.len() > 128 {
        return Err(invalid());
    }
    if !repository.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(invalid());
    }
    if !repository
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_' | '/'))
    {
        return Err(invalid());
    }

    if let Some(tag) = tag {
        let valid = !tag.is_empty()
            && tag.len() <= 128
            && tag.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(invalid());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhand_config::Settings;
    use dockhand_core::{CommandOutput, CoreError};
    use dockhand_core::testing::MockRunner;
    use std::sync::Arc;

    fn pusher(runner: Arc<MockRunner>) -> ImagePusher {
        let settings = Settings {
            registry_address: "registry.example.com".into(),
            ..Default::default()
        };
        ImagePusher::new(Executor::new(runner, Arc::new(settings)))
    }

    #[test]
    fn test_validate_image_name() {
        assert!(validate_image_name("api").is_ok());
        assert!(validate_image_name("team/api-v2.worker_1").is_ok());
        assert!(validate_image_name("").is_err());
        assert!(validate_image_name("-api").is_err());
        assert!(validate_image_name("Api").is_err());
        assert!(validate_image_name("api:latest").is_ok());
        assert!(validate_image_name("team/api:1.2.0-rc_1").is_ok());
        assert!(validate_image_name("api:").is_err());
        assert!(validate_image_name("api:-1").is_err());
        assert!(validate_image_name("api:1:2").is_err());
        assert!(validate_image_name("API:1.2").is_err());
        assert!(validate_image_name(&"a".repeat(129)).is_err());
    }

    #[tokio::test]
    async fn test_push() {
        let runner = Arc::new(MockRunner::new());
        let tag = pusher(runner.clone()).push("api").await.unwrap();

        assert_eq!(tag, "registry.example.com/api");
        assert_eq!(runner.command_lines(), vec!["docker push registry.example.com/api"]);
    }

    #[test]
    fn test_split_tag() {
        assert_eq!(split_tag("api:1.2"), ("api", Some("1.2")));
        assert_eq!(split_tag("team/api"), ("team/api", None));
    }

    #[tokio::test]
    async fn test_push_keeps_tag() {
        let runner = Arc::new(MockRunner::new());
        let tag = pusher(runner.clone()).push("api:1.2").await.unwrap();

        assert_eq!(tag, "registry.example.com/api:1.2");
        assert_eq!(runner.command_lines(), vec!["docker push registry.example.com/api:1.2"]);
    }

    #[tokio::test]
    async fn test_push_failure_propagates_command_error() {
        let runner = Arc::new(MockRunner::new().on(
            "docker push",
            CommandOutput::failure(1, "denied: requested access to the resource is denied"),
        ));
        let err = pusher(runner).push("api").await.unwrap_err();
        assert!(matches!(
            err,
            BuildError::Command(CoreError::CommandFailed { code: Some(1), .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_name_never_pushes() {
        let runner = Arc::new(MockRunner::new());
        assert!(pusher(runner.clone()).push("Bad Name").await.is_err());
        assert!(runner.commands().is_empty());
    }
}
