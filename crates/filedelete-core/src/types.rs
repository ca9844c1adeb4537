//! 公共类型（对外暴露）
use serde::Serialize;

use crate::options::ScanStats;

/// 与调用方 shell 约定的退出码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCode {
    Success,
    /// 参数非法 / 路径不存在或不是目录 / 未预期的内部错误
    InvalidArguments,
    /// 危险路径或路径深度不足
    SafetyBlocked,
    /// 至少一个文件删除失败
    PartialErrors,
    /// 没有任何文件命中过滤条件
    NothingToDo,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InvalidArguments => 2,
            ExitCode::SafetyBlocked => 3,
            ExitCode::PartialErrors => 4,
            ExitCode::NothingToDo => 5,
        }
    }
}

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    DryRun,
    Apply,
}

/// 单次运行的汇总（对应 --json 输出的单个对象）
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    #[serde(flatten)]
    pub stats: ScanStats,
    pub removed_dirs: usize,
    pub exit_code: u8,
    #[serde(skip)]
    pub outcome: ExitCode,
}

impl RunSummary {
    pub fn new(mode: RunMode, stats: ScanStats, removed_dirs: usize, outcome: ExitCode) -> Self {
        Self { mode, stats, removed_dirs, exit_code: outcome.code(), outcome }
    }
}
