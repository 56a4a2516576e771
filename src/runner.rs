//! 命令执行模块 - 运行被包装的命令并获取退出码
//!
//! 子进程继承 stdin，stdout 和 stderr 都写到 wrapslack 自身的 stdout，
//! 输出不经缓冲、实时可见。不设超时，一直等到子进程结束。

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};

use sysinfo::System;
use tracing::{debug, warn};

use crate::error::{Result, WrapError};

/// 无法取得真实退出码时使用的哨兵值（启动失败或被信号终止）
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// 主机名；无法获取时为空字符串，只有在需要通知时才报错
    pub host_name: String,
    pub command_args: Vec<String>,
    pub exit_code: i32,
}

impl RunResult {
    /// 命令行（参数以单个空格连接）
    pub fn command_line(&self) -> String {
        self.command_args.join(" ")
    }

    /// 退出码是否为哨兵值
    pub fn is_sentinel(&self) -> bool {
        self.exit_code == SENTINEL_EXIT_CODE
    }
}

/// 命令执行器
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    host_name: Option<String>,
}

impl CommandRunner {
    /// 子进程结束后再查询本机主机名
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定主机名（测试用）
    pub fn with_host_name(host_name: impl Into<String>) -> Self {
        Self {
            host_name: Some(host_name.into()),
        }
    }

    /// 执行命令，阻塞直到子进程结束
    ///
    /// `args` 为空时返回 `WrapError::Usage`，不会启动任何进程。
    /// 启动失败不视为致命错误：记录 warn 日志并以 `-1` 作为退出码继续。
    pub fn run(&self, args: &[String]) -> Result<RunResult> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| WrapError::usage("command is required"))?;

        let mut command = Command::new(program);
        command.args(rest).stdin(Stdio::inherit());
        attach_output(&mut command, program)?;

        debug!(command = %program, args = ?rest, "Spawning command");

        let exit_code = match command.spawn() {
            Ok(child) => wait_exit_code(child, program)?,
            Err(source) => {
                let err = WrapError::Execution {
                    command: program.clone(),
                    source,
                };
                warn!(error = %err, "Command could not be started");
                SENTINEL_EXIT_CODE
            }
        };

        debug!(command = %program, exit_code, "Command finished");

        let host_name = match &self.host_name {
            Some(name) => name.clone(),
            None => local_host_name().unwrap_or_else(|err| {
                debug!(error = %err, "Host name unavailable");
                String::new()
            }),
        };

        Ok(RunResult {
            host_name,
            command_args: args.to_vec(),
            exit_code,
        })
    }
}

fn wait_exit_code(mut child: Child, program: &str) -> Result<i32> {
    let status = child.wait().map_err(|source| WrapError::Execution {
        command: program.to_string(),
        source,
    })?;
    Ok(exit_code_of(status))
}

/// 从 ExitStatus 推导退出码；被信号终止时没有退出码，返回哨兵值
pub fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(SENTINEL_EXIT_CODE)
}

/// 把子进程的 stdout 和 stderr 都接到当前进程的 stdout
#[cfg(unix)]
fn attach_output(command: &mut Command, program: &str) -> Result<()> {
    use std::os::fd::AsFd;

    let to_error = |source: io::Error| WrapError::Execution {
        command: program.to_string(),
        source,
    };

    let stdout = io::stdout().as_fd().try_clone_to_owned().map_err(to_error)?;
    let stderr = stdout.try_clone().map_err(to_error)?;
    command.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr));
    Ok(())
}

#[cfg(not(unix))]
fn attach_output(command: &mut Command, _program: &str) -> Result<()> {
    command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    Ok(())
}

/// 获取本机主机名
pub fn local_host_name() -> Result<String> {
    System::host_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| WrapError::template("cannot determine host name"))
}
