//! wrapslack CLI
//!
//! 运行命令，退出码匹配过滤条件时发送 Slack 通知

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};
use wrapslack::cli::{handle_wrap, WrapArgs};
use wrapslack::SendResult;

#[derive(Parser)]
#[command(name = "wrapslack")]
#[command(about = "Run a command and notify Slack when its exit code matches")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: WrapArgs,
}

fn main() -> Result<()> {
    // 日志写到 stderr，避免和被包装命令的 stdout 混在一起
    // 通过 RUST_LOG 控制级别，例如: RUST_LOG=wrapslack=debug wrapslack make
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wrapslack=warn"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match handle_wrap(cli.args)? {
        SendResult::Sent(message) => debug!(channel = %message.channel, "Notified"),
        SendResult::Skipped(reason) => debug!(reason = %reason, "Not notified"),
    }

    Ok(())
}
