//! 安全策略配置加载（TOML）
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::safety::OsFamily;

/// 超过该数量的真实删除需要交互确认
pub const DEFAULT_MAX_DELETE: usize = 100;

/// Unix 类系统的危险目录（自身及其子路径）
pub const DANGEROUS_PATHS_UNIX: &[&str] = &[
    "/", "/bin", "/sbin", "/etc", "/usr", "/var", "/opt", "/root", "/lib", "/lib64",
    "/boot", "/dev", "/proc", "/sys", "/tmp", "/var/log",
];

/// Windows 系统目录；盘符根（如 `D:\`）只拦截完全相等
pub const DANGEROUS_PATHS_WINDOWS: &[&str] = &[
    r"C:\", r"D:\", r"E:\", r"F:\", r"G:\", r"H:\", r"I:\", r"J:\", r"K:\", r"L:\", r"M:\",
    r"N:\", r"O:\", r"P:\", r"Q:\", r"R:\", r"S:\", r"T:\", r"U:\", r"V:\", r"W:\", r"X:\",
    r"Y:\", r"Z:\",
    r"C:\Windows",
    r"C:\Program Files",
    r"C:\Program Files (x86)",
    r"C:\System Volume Information",
];

/// 允许绕过最小深度检查的目录名（开发用测试数据目录）
pub const DEFAULT_DEPTH_EXEMPT: &[&str] = &["test-data"];

/// 生效的安全策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyPolicy {
    pub os: OsFamily,
    pub dangerous_paths: Vec<String>,
    pub depth_exempt: Vec<String>,
    pub max_delete: usize,
}

impl SafetyPolicy {
    /// 指定系统族的内置策略
    pub fn for_os(os: OsFamily) -> Self {
        let dangerous = match os {
            OsFamily::Unix => DANGEROUS_PATHS_UNIX,
            OsFamily::Windows => DANGEROUS_PATHS_WINDOWS,
        };
        Self {
            os,
            dangerous_paths: dangerous.iter().map(|s| s.to_string()).collect(),
            depth_exempt: DEFAULT_DEPTH_EXEMPT.iter().map(|s| s.to_string()).collect(),
            max_delete: DEFAULT_MAX_DELETE,
        }
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::for_os(OsFamily::host())
    }
}

/// `[safety]` 表；缺省字段沿用内置值
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SafetySection {
    #[serde(default)]
    dangerous_paths: Option<Vec<String>>,
    #[serde(default)]
    depth_exempt: Option<Vec<String>>,
    #[serde(default)]
    max_delete: Option<usize>,
}

/// 顶层配置文件结构
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    safety: SafetySection,
}

/// 解析配置文本并叠加到宿主系统的内置策略上
pub fn parse_policy(text: &str) -> Result<SafetyPolicy> {
    let parsed: ConfigFile = toml::from_str(text).context("parse config")?;
    let mut policy = SafetyPolicy::default();

    if let Some(paths) = parsed.safety.dangerous_paths { policy.dangerous_paths = paths; }
    if let Some(exempt) = parsed.safety.depth_exempt { policy.depth_exempt = exempt; }
    if let Some(max) = parsed.safety.max_delete { policy.max_delete = max; }

    Ok(policy)
}

/// 从 TOML 文件加载安全策略
pub fn load_policy(path: &Path) -> Result<SafetyPolicy> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    parse_policy(&txt).with_context(|| format!("invalid config file {}", path.display()))
}
