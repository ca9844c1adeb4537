//! 过滤选项与统计信息（模块）
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::Metadata;
use std::io;
use std::str::FromStr;
use std::time::SystemTime;
use tracing::warn;

/// 年龄过滤所比较的时间戳
/// - Mtime：内容修改时间（默认）
/// - Ctime：Unix 下为元数据变更时间，其他平台退化为创建时间
/// - Atime：访问时间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeField {
    #[default]
    Mtime,
    Ctime,
    Atime,
}

impl TimeField {
    /// 从元数据中读取对应的时间戳
    pub fn timestamp(self, meta: &Metadata) -> io::Result<SystemTime> {
        match self {
            TimeField::Mtime => meta.modified(),
            TimeField::Atime => meta.accessed(),
            TimeField::Ctime => change_time(meta),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeField::Mtime => "mtime",
            TimeField::Ctime => "ctime",
            TimeField::Atime => "atime",
        }
    }
}

#[cfg(unix)]
fn change_time(meta: &Metadata) -> io::Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;

    epoch_offset(meta.ctime(), meta.ctime_nsec())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "ctime out of range"))
}

/// `(secs, nsec)` 按 timespec 语义换算：nsec 总是向未来方向累加
#[cfg(unix)]
fn epoch_offset(secs: i64, nsec: i64) -> Option<SystemTime> {
    use std::time::Duration;

    let whole = Duration::from_secs(secs.unsigned_abs());
    let base = if secs >= 0 {
        SystemTime::UNIX_EPOCH.checked_add(whole)
    } else {
        SystemTime::UNIX_EPOCH.checked_sub(whole)
    }?;
    base.checked_add(Duration::from_nanos(u64::try_from(nsec).ok()?))
}

#[cfg(not(unix))]
fn change_time(meta: &Metadata) -> io::Result<SystemTime> {
    meta.created()
}

impl FromStr for TimeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mtime" => Ok(TimeField::Mtime),
            "ctime" => Ok(TimeField::Ctime),
            "atime" => Ok(TimeField::Atime),
            other => Err(format!("unknown time field '{}', expected mtime, ctime or atime", other)),
        }
    }
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 文件名正则的编译选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    /// 忽略模式中的空白并允许 `#` 注释
    pub verbose: bool,
}

impl RegexFlags {
    /// 解析逗号分隔的标志名（IGNORECASE/I, MULTILINE/M, DOTALL/S, VERBOSE/X）
    /// 未知标志只记录警告，不影响其余标志
    pub fn parse(list: &str) -> Self {
        let mut flags = RegexFlags::default();
        for name in list.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match name.to_ascii_uppercase().as_str() {
                "IGNORECASE" | "I" => flags.case_insensitive = true,
                "MULTILINE" | "M" => flags.multi_line = true,
                "DOTALL" | "S" => flags.dot_matches_new_line = true,
                "VERBOSE" | "X" => flags.verbose = true,
                _ => warn!(flag = name, "unknown regex flag"),
            }
        }
        flags
    }
}

/// 会话统计（scan/delete 累加，只有 reset_stats 才清零）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub scanned: usize,
    pub matched: usize,
    pub deleted: usize,
    pub errors: usize,
}
