// src/cli/wrap.rs
//! 包装命令 - 执行命令并在退出码匹配时通知 Slack

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::{self, ConfigLayer, DEFAULT_CONFIG_PATH};
use crate::error::WrapError;
use crate::notification::{SendResult, SlackChannel, SLACK_API_URL};
use crate::runner::CommandRunner;

/// 命令行参数
#[derive(Debug, Clone, Default, Args)]
pub struct WrapArgs {
    /// Slack API token（也可通过 SLACK_TOKEN 环境变量设置）
    #[arg(long)]
    pub slack_token: Option<String>,

    /// 发送通知的 Slack channel
    #[arg(long)]
    pub slack_channel: Option<String>,

    /// 消息模板，可用变量：{{hostName}} {{command}} {{exitCode}}
    #[arg(long)]
    pub slack_message_template: Option<String>,

    /// 显示图标 [default: :robot_face:]
    #[arg(long)]
    pub slack_icon_emoji: Option<String>,

    /// 显示用户名 [default: wrapslack]
    #[arg(long)]
    pub slack_username: Option<String>,

    /// 逗号分隔的需要通知的退出码（空字符串表示全部）
    #[arg(long, visible_alias = "notify-exit-code", allow_negative_numbers = true)]
    pub notify_exit_codes: Option<String>,

    /// 逗号分隔的不需要通知的退出码 [default: 0]
    #[arg(long, visible_alias = "ignore-exit-code", allow_negative_numbers = true)]
    pub ignore_exit_codes: Option<String>,

    /// 要执行的命令及其参数
    #[arg(trailing_var_arg = true, num_args = 1.., value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl WrapArgs {
    /// 命令行 flag 对应的配置层
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            token: self.slack_token.clone(),
            channel: self.slack_channel.clone(),
            message_template: self.slack_message_template.clone(),
            icon_emoji: self.slack_icon_emoji.clone(),
            username: self.slack_username.clone(),
            notify_exit_codes: self.notify_exit_codes.clone(),
            ignore_exit_codes: self.ignore_exit_codes.clone(),
        }
    }
}

/// 运行环境：配置文件路径和 Slack API 地址
#[derive(Debug, Clone)]
pub struct WrapContext {
    pub config_path: PathBuf,
    pub api_url: String,
}

impl Default for WrapContext {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            api_url: SLACK_API_URL.to_string(),
        }
    }
}

/// 处理包装命令（使用默认配置文件和进程环境变量）
pub fn handle_wrap(args: WrapArgs) -> Result<SendResult> {
    handle_wrap_in(args, &WrapContext::default(), |key| std::env::var(key).ok())
}

/// 处理包装命令
pub fn handle_wrap_in<F>(args: WrapArgs, ctx: &WrapContext, env: F) -> Result<SendResult>
where
    F: Fn(&str) -> Option<String>,
{
    // 1. 解析配置（失败时不会启动进程，也不会访问网络）
    let config = config::resolve(args.config_layer(), &ctx.config_path, env)?;

    if args.command.is_empty() {
        return Err(WrapError::usage("command is required").into());
    }

    // 2. 执行命令
    let runner = CommandRunner::new();
    let run = runner.run(&args.command)?;

    // 3. 过滤并通知
    let channel = SlackChannel::with_api_url(&config.token, &ctx.api_url)?;
    Ok(crate::notify_on_exit(&config, &run, &channel)?)
}
