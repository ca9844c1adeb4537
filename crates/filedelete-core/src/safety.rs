//! 路径安全检查与大批量删除确认
//!
//! - 危险路径判定是关于“解析后的绝对路径 + 系统族 + 黑名单”的纯函数，
//!   因此 Windows 规则在任何宿主上都可以测试。
//! - 确认门把“是否需要确认”（纯函数）与“如何交互”（注入的读写端）分开。
use std::io::{BufRead, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::SafetyPolicy;
use crate::error::SafetyError;

/// 路径规则所属的系统族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Unix,
    Windows,
}

impl OsFamily {
    pub fn host() -> Self {
        if cfg!(windows) { OsFamily::Windows } else { OsFamily::Unix }
    }

    fn separator(self) -> char {
        match self {
            OsFamily::Unix => '/',
            OsFamily::Windows => '\\',
        }
    }

    fn fold(self, s: &str) -> String {
        match self {
            OsFamily::Unix => s.to_string(),
            OsFamily::Windows => s.to_lowercase(),
        }
    }
}

/// 解析为绝对路径：优先 canonicalize（解析符号链接），路径不存在时退化为词法归一化
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(p) = std::fs::canonicalize(path) {
        return strip_verbatim(p);
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    normalize_lexically(&absolute)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => { out.pop(); }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Windows 上 canonicalize 返回 `\\?\C:\..` 或 `\\?\UNC\server\share`
fn strip_verbatim(path: PathBuf) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix(r"\\?\UNC\") {
        return PathBuf::from(format!(r"\\{}", rest));
    }
    if let Some(rest) = s.strip_prefix(r"\\?\") {
        return PathBuf::from(rest);
    }
    path
}

/// 对已解析的路径字符串做危险判定
pub fn classify_path(path: &str, os: OsFamily, dangerous_paths: &[String]) -> bool {
    let sep = os.separator();
    let path_cmp = os.fold(path);

    for dp in dangerous_paths {
        let trimmed = dp.trim_end_matches(['/', '\\']);
        // 文件系统根 "/" 与盘符根 "X:" 只拦截完全相等，不拦截其子路径
        let is_root = trimmed.is_empty();
        let is_drive_root = trimmed.len() == 2 && trimmed.ends_with(':');
        if is_root || is_drive_root {
            let root = format!("{}{}", trimmed, sep);
            if path_cmp == os.fold(&root) { return true; }
            continue;
        }

        let dp_cmp = os.fold(trimmed);
        if path_cmp == dp_cmp || path_cmp.starts_with(&format!("{}{}", dp_cmp, sep)) {
            return true;
        }
    }

    match os {
        OsFamily::Windows => {
            let bytes = path.as_bytes();
            let drive_root = bytes.len() == 3 && bytes[0].is_ascii_alphabetic() && &path[1..] == r":\";
            let unc_root = path.starts_with(r"\\") && path.matches('\\').count() <= 3;
            drive_root || unc_root
        }
        OsFamily::Unix => path == "/" || path.matches('/').count() < 2,
    }
}

/// 判断路径是否过于危险（使用宿主系统的内置黑名单）
pub fn is_dangerous_path(path: &Path) -> bool {
    SafetyPolicy::default().is_dangerous(path)
}

impl SafetyPolicy {
    pub fn is_dangerous(&self, path: &Path) -> bool {
        let resolved = resolve_path(path);
        let dangerous = classify_path(&resolved.to_string_lossy(), self.os, &self.dangerous_paths);
        debug!(path = %resolved.display(), dangerous, "classified path");
        dangerous
    }

    /// 路径不足两级时，相对路径、含 `.`/`..`、隐藏目录或豁免名则放行
    fn is_depth_exempt(&self, path: &Path) -> bool {
        if !path.is_absolute() {
            return true;
        }
        path.components().any(|c| match c {
            Component::CurDir | Component::ParentDir => true,
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                name.starts_with('.') || self.depth_exempt.iter().any(|e| e.as_str() == name)
            }
            _ => false,
        })
    }
}

/// 删除前的综合安全校验：存在 → 是目录 → 非危险 → 深度足够
pub fn validate_path_safety(path: &Path, policy: &SafetyPolicy) -> Result<(), SafetyError> {
    if !path.exists() {
        return Err(SafetyError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(SafetyError::NotADirectory(path.to_path_buf()));
    }
    if policy.is_dangerous(path) {
        warn!(path = %path.display(), "blocked dangerous path");
        return Err(SafetyError::Dangerous(path.to_path_buf()));
    }

    let depth = path.components().count();
    if depth < 2 && !policy.is_depth_exempt(path) {
        warn!(path = %path.display(), depth, "blocked shallow path");
        return Err(SafetyError::TooShallow { path: path.to_path_buf(), depth });
    }

    info!(path = %path.display(), "path passed safety checks");
    Ok(())
}

/// 文件数超过阈值才需要确认
pub fn needs_confirmation(file_count: usize, threshold: usize) -> bool {
    file_count > threshold
}

/// 大批量操作的交互确认；只有 y/yes 放行，EOF 或读取失败视为取消
pub fn confirm_large_operation<R: BufRead, W: Write>(
    file_count: usize,
    threshold: usize,
    mut input: R,
    mut output: W,
) -> bool {
    if !needs_confirmation(file_count, threshold) {
        return true;
    }

    let _ = writeln!(output, "Warning: This operation would affect {} files.", file_count);
    let _ = writeln!(output, "This exceeds the safety threshold of {} files.", threshold);
    let _ = write!(output, "Do you want to continue? (y/N): ");
    let _ = output.flush();

    let mut line = String::new();
    let confirmed = match input.read_line(&mut line) {
        Ok(0) => false,
        Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(e) => {
            debug!(error = %e, "confirmation prompt interrupted");
            false
        }
    };
    if !confirmed {
        let _ = writeln!(output);
        info!(file_count, threshold, "operation cancelled by user");
    }
    confirmed
}
