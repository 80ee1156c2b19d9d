use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// One progress bar per temperature batch, replaced when the batch changes.
pub struct TemperatureProgress {
    current: Mutex<Option<(f32, ProgressBar)>>,
}

impl TemperatureProgress {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    pub fn update(&self, temperature: f32, done: usize, total: usize) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        let stale = current
            .as_ref()
            .map_or(true, |(temp, _)| *temp != temperature);
        if stale {
            if let Some((_, bar)) = current.take() {
                bar.finish();
            }
            *current = Some((temperature, new_bar(temperature, total)));
        }
        if let Some((_, bar)) = current.as_ref() {
            bar.set_position(done as u64);
            if done >= total {
                bar.finish();
            }
        }
    }

    pub fn finish(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some((_, bar)) = current.take() {
                bar.finish();
            }
        }
    }
}

fn new_bar(temperature: f32, total: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let bar = ProgressBar::new(total as u64).with_style(style);
    bar.set_message(format!("temp {temperature}"));
    bar
}
