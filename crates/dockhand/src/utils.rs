use colored::Colorize;
use dockhand_build::BuildError;
use dockhand_cloud::Choice;
use indicatif::{ProgressBar, ProgressStyle};

/// Final error text; build failures carry the tail of the build log
pub fn error_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<BuildError>() {
        Some(build) => build.user_message(),
        None => format!("{:#}", error),
    }
}

/// Require `value` to be one of `known`
pub fn ensure_known<'a, I>(kind: &str, value: &str, known: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let known: Vec<&String> = known.into_iter().collect();
    if known.iter().any(|k| k.as_str() == value) {
        return Ok(());
    }
    let available = known.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ");
    Err(anyhow::anyhow!(
        "Unknown {} '{}'\nAvailable: {}",
        kind,
        value,
        if available.is_empty() { "(none)" } else { &available }
    ))
}

/// Require an optional provider code to be one of the offered choices
pub fn ensure_choice(kind: &str, value: Option<&str>, choices: &[Choice]) -> anyhow::Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if choices.iter().any(|c| c.code == value) {
        return Ok(());
    }
    let available = choices
        .iter()
        .map(|c| c.code)
        .collect::<Vec<_>>()
        .join(", ");
    Err(anyhow::anyhow!(
        "Unknown {} '{}'\nAvailable: {}",
        kind,
        value,
        available
    ))
}

/// Bar over a batch of items, labelled with the item in flight
pub fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:<12} [{bar:30.cyan}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("▮▮ "),
    );
    pb
}

/// Truncate a label to the bar's message column
pub fn label(name: &str) -> String {
    name.chars().take(12).collect::<String>().cyan().to_string()
}

pub fn done() {
    println!("{}", "Done!".green());
}
