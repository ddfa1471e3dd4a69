use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Bar over a batch of images, labelled with the image in flight
pub struct BuildProgress {
    progress_bar: ProgressBar,
}

impl BuildProgress {
    pub fn new(stage: &str, total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>8} {spinner:.green} [{bar:30.cyan}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("▮▮ "),
        );
        pb.set_prefix(stage.to_string());

        Self { progress_bar: pb }
    }

    pub fn start(&self, image: &str) {
        self.progress_bar.set_message(image.to_string());
    }

    pub fn advance(&self) {
        self.progress_bar.inc(1);
    }

    pub fn finish_success(&self) {
        self.progress_bar
            .finish_with_message(format!("{}", "Done!".green()));
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .abandon_with_message(format!("{}", error.red()));
    }
}
