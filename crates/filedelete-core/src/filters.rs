//! 过滤谓词（每种过滤器携带自己编译好的参数）
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

use crate::error::FilterError;
use crate::options::{RegexFlags, TimeField};

/// 闭区间字节范围；max 为 None 表示无上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    pub min: u64,
    pub max: Option<u64>,
}

impl SizeRange {
    pub fn contains(&self, size: u64) -> bool {
        size >= self.min && self.max.map_or(true, |max| size <= max)
    }
}

/// 年龄截止点：所选时间戳严格早于 cutoff 才算命中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeCutoff {
    pub cutoff: SystemTime,
    pub field: TimeField,
}

/// 文件名 glob：include 为白名单，exclude 为黑名单
#[derive(Debug, Clone)]
pub struct NameGlobs {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl NameGlobs {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, FilterError> {
        Ok(Self { include: build_glob_set(include)?, exclude: build_glob_set(exclude)? })
    }

    fn is_match(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(name) { return false; }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(name) { return false; }
        }
        true
    }
}

/// 单个过滤谓词
#[derive(Debug, Clone)]
pub enum FilterPredicate {
    /// 已归一化（小写、去掉前导点）的扩展名集合
    Extension(HashSet<String>),
    Age(AgeCutoff),
    Size(SizeRange),
    Glob(NameGlobs),
    /// 在文件名中搜索（非全匹配）
    Regex(Regex),
}

impl FilterPredicate {
    pub fn extension<S: AsRef<str>>(extensions: &[S]) -> Self {
        let set = extensions.iter().map(|e| normalize_extension(e.as_ref())).collect();
        FilterPredicate::Extension(set)
    }

    pub fn regex(pattern: &str, flags: RegexFlags) -> Result<Self, FilterError> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .ignore_whitespace(flags.verbose)
            .build()
            .map_err(|source| FilterError::InvalidRegex { pattern: pattern.to_string(), source })?;
        Ok(FilterPredicate::Regex(re))
    }

    /// 过滤器种类名（日志用）
    pub fn kind(&self) -> &'static str {
        match self {
            FilterPredicate::Extension(_) => "extension",
            FilterPredicate::Age(_) => "age",
            FilterPredicate::Size(_) => "size",
            FilterPredicate::Glob(_) => "glob",
            FilterPredicate::Regex(_) => "regex",
        }
    }

    /// 判断 `path` 是否通过本过滤器；`meta` 为跟随符号链接后的元数据
    /// 非普通文件一律不命中
    pub fn matches(&self, path: &Path, meta: &Metadata) -> bool {
        if !meta.is_file() {
            return false;
        }
        match self {
            FilterPredicate::Extension(set) => match path.extension() {
                Some(ext) => set.contains(&ext.to_string_lossy().to_lowercase()),
                None => false,
            },
            FilterPredicate::Age(age) => match age.field.timestamp(meta) {
                Ok(t) => t < age.cutoff,
                Err(e) => {
                    warn!(path = %path.display(), field = %age.field, error = %e, "could not access file time");
                    false
                }
            },
            FilterPredicate::Size(range) => range.contains(meta.len()),
            FilterPredicate::Glob(globs) => globs.is_match(&file_name(path)),
            FilterPredicate::Regex(re) => re.is_match(&file_name(path)),
        }
    }
}

/// ".LOG" / "log" / ".log" 统一为 "log"
pub(crate) fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// 空列表返回 None（不参与判断）
fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>, FilterError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FilterError::InvalidGlob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| FilterError::InvalidGlob {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })?;
    Ok(Some(set))
}
