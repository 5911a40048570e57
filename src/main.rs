#[tokio::main]
async fn main() -> fmtgate::Result<()> {
    color_eyre::install()?;
    fmtgate::cli::run().await
}
