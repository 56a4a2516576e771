//! wrapslack - 运行命令，按退出码过滤后通知到 Slack
//!
//! 流程：解析配置 → 执行命令 → 过滤退出码 → 渲染模板 → 发送通知

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod notification;
pub mod runner;

pub use config::{ConfigLayer, EffectiveConfig};
pub use error::{Result, WrapError};
pub use filter::{decide, should_notify, ExitCodeSet, FilterDecision};
pub use notification::{
    MessageTemplate, NotificationChannel, NotificationMessage, SendResult, SlackChannel,
};
pub use runner::{CommandRunner, RunResult, SENTINEL_EXIT_CODE};

use tracing::debug;

/// 根据运行结果决定是否通知，需要时发送一次
pub fn notify_on_exit(
    config: &EffectiveConfig,
    run: &RunResult,
    channel: &dyn NotificationChannel,
) -> Result<SendResult> {
    let decision = decide(run.exit_code, &config.ignore_codes, &config.notify_codes);
    if !decision.should_notify() {
        let reason = decision.reason(run.exit_code);
        debug!(reason = %reason, "Skipping notification");
        return Ok(SendResult::Skipped(reason));
    }

    if run.host_name.is_empty() {
        return Err(WrapError::template("cannot determine host name"));
    }

    let message = NotificationMessage::build(config, run);
    debug!(channel = channel.name(), text = %message.text, "Sending notification");
    channel.send(&message)?;
    Ok(SendResult::Sent(message))
}

/// 完整流程：执行命令并按需通知
pub fn run_and_notify(
    config: &EffectiveConfig,
    command: &[String],
    runner: &CommandRunner,
    channel: &dyn NotificationChannel,
) -> Result<SendResult> {
    let run = runner.run(command)?;
    notify_on_exit(config, &run, channel)
}
