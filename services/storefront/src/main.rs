//! Storefront 二进制入口：分发 CLI，装配日志与配置后启动 HTTP 服务。

mod api;
mod app;
mod auth;
mod catalog;
mod cli;
mod config;
mod logging;
mod media;
mod state;

#[tokio::main]
/// 启动店面服务。
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = std::env::args().skip(1).collect::<Vec<String>>();
    match cli::dispatch(&args)? {
        cli::CliDispatch::Run => {}
        cli::CliDispatch::Exit => return Ok(()),
    }

    let _log_runtime = logging::init("storefront")?;
    let config = config::Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    app::run(config).await
}
