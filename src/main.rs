#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = submission_roster::run().await {
        eprintln!("submission-roster fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
