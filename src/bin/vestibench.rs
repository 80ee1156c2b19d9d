#[path = "vestibench/app/mod.rs"]
mod app;
#[path = "vestibench/args.rs"]
mod args;
#[path = "vestibench/logging.rs"]
mod logging;
#[path = "vestibench/ui/mod.rs"]
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
