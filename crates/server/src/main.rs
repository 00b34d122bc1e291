#[tokio::main]
async fn main() -> anyhow::Result<()> {
    explore_assistant_server::start().await
}
