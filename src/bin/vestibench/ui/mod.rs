mod progress;
mod report;

pub use progress::TemperatureProgress;
pub use report::{print_clean_summary, print_report};
