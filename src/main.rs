use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    trademark_search::init_logging();
    trademark_search::run().await
}
