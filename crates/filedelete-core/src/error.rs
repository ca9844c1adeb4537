//! 错误类型（对外暴露）
use std::path::PathBuf;
use thiserror::Error;

use crate::types::ExitCode;

/// 大小/日期字符串解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid size '{value}': {message}")]
    InvalidSize { value: String, message: String },

    #[error("invalid date '{value}': expected DD-MM-YYYY")]
    InvalidDate { value: String },
}

/// 过滤器构建错误（构建失败的过滤器不会被加入流水线）
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// 路径安全校验失败原因；每种原因对应唯一的退出码
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SafetyError {
    #[error("path '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("path '{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("path '{0}' is considered dangerous for deletion operations")]
    Dangerous(PathBuf),

    #[error("path '{path}' is too shallow (depth: {depth})")]
    TooShallow { path: PathBuf, depth: usize },
}

impl SafetyError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SafetyError::NotFound(_) | SafetyError::NotADirectory(_) => ExitCode::InvalidArguments,
            SafetyError::Dangerous(_) | SafetyError::TooShallow { .. } => ExitCode::SafetyBlocked,
        }
    }
}
