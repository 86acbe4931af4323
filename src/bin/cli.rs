use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    taskchat::cli::run().await
}
