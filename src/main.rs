#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = bsu_portal::run().await {
        eprintln!("bsu-portal fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
