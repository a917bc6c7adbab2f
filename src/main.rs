//! Postify - PostifyAI 终端客户端
//!
//! 入口：初始化日志、加载配置、创建生成控制器与 TUI，并运行主循环。

use anyhow::Context;
use postify::config::load_config;
use postify::core::{create_api_from_config, create_client};
use postify::ui::run_app;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        postify::config::AppConfig::default()
    });

    // 创建控制器：返回命令发送端、状态接收端；选项加载在后台跑一次
    let api = create_api_from_config(&cfg);
    let (cmd_tx, state_rx) = create_client(api);

    // 启动 TUI 主循环（消费 state，向 cmd_tx 发送用户指令）
    run_app(state_rx, cmd_tx).await.context("App run failed")?;

    Ok(())
}
