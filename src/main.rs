use menu_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    menu_server::start_server(config).await
}
