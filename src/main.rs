use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    reagent::run().await
}
