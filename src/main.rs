//! async-logger server binary

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    async_logger::server::run().await
}
