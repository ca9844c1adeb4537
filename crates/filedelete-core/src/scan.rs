//! 过滤流水线与目录扫描
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::FilterError;
use crate::filters::{normalize_extension, AgeCutoff, FilterPredicate, NameGlobs, SizeRange};
use crate::options::{RegexFlags, ScanStats, TimeField};
use crate::parse::{parse_date_string, parse_size_string};

const SECS_PER_DAY: u64 = 24 * 3600;

/// 删除引擎：绑定一个基准目录与递归开关，持有过滤器与会话统计
#[derive(Debug)]
pub struct FileDelete {
    pub(crate) base_path: PathBuf,
    recursive: bool,
    filters: Vec<FilterPredicate>,
    pub(crate) stats: ScanStats,
}

impl FileDelete {
    pub fn new(base_path: &Path, recursive: bool) -> Self {
        let base_path = std::fs::canonicalize(base_path).unwrap_or_else(|_| base_path.to_path_buf());
        Self { base_path, recursive, filters: Vec::new(), stats: ScanStats::default() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// 追加一个已编译的过滤器
    pub fn add_filter(&mut self, filter: FilterPredicate) {
        debug!(kind = filter.kind(), "added filter");
        self.filters.push(filter);
    }

    /// 构建失败统一处理：记录错误，不追加过滤器，把错误交给调用方
    fn add_or_report(&mut self, built: Result<FilterPredicate, FilterError>) -> Result<(), FilterError> {
        match built {
            Ok(filter) => {
                self.add_filter(filter);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "filter not added");
                Err(e)
            }
        }
    }

    pub fn add_extension_filter<S: AsRef<str>>(&mut self, extensions: &[S]) {
        if extensions.is_empty() {
            return;
        }
        let set: HashSet<String> = extensions.iter().map(|e| normalize_extension(e.as_ref())).collect();
        debug!(extensions = ?set, "extension filter");
        self.add_filter(FilterPredicate::Extension(set));
    }

    /// `older_than_days` 优先；为 None 或 0 时才使用 `before_date`
    pub fn add_age_filter(
        &mut self,
        older_than_days: Option<u64>,
        before_date: Option<&str>,
        field: TimeField,
    ) -> Result<(), FilterError> {
        let days = older_than_days.filter(|d| *d > 0);
        let before_date = before_date.filter(|s| !s.trim().is_empty());

        let cutoff = match (days, before_date) {
            (Some(days), _) => {
                let window = Duration::from_secs(days.saturating_mul(SECS_PER_DAY));
                Ok(SystemTime::now().checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH))
            }
            (None, Some(date)) => parse_date_string(date).map_err(FilterError::from),
            (None, None) => return Ok(()),
        };

        let built = cutoff.map(|cutoff| {
            debug!(field = %field, ?cutoff, "age filter");
            FilterPredicate::Age(AgeCutoff { cutoff, field })
        });
        self.add_or_report(built)
    }

    pub fn add_size_filter(&mut self, min_size: Option<&str>, max_size: Option<&str>) -> Result<(), FilterError> {
        let min_size = min_size.filter(|s| !s.trim().is_empty());
        let max_size = max_size.filter(|s| !s.trim().is_empty());
        if min_size.is_none() && max_size.is_none() {
            return Ok(());
        }

        self.add_or_report(build_size_filter(min_size, max_size))
    }

    pub fn add_glob_filter(&mut self, include: &[String], exclude: &[String]) -> Result<(), FilterError> {
        if include.is_empty() && exclude.is_empty() {
            return Ok(());
        }
        debug!(?include, ?exclude, "glob filter");
        self.add_or_report(NameGlobs::new(include, exclude).map(FilterPredicate::Glob))
    }

    pub fn add_regex_filter(&mut self, pattern: &str, flags: RegexFlags) -> Result<(), FilterError> {
        if pattern.is_empty() {
            return Ok(());
        }
        debug!(pattern, ?flags, "regex filter");
        self.add_or_report(FilterPredicate::regex(pattern, flags))
    }

    /// 无过滤器时只要求是普通文件；否则所有过滤器都必须通过
    pub fn apply_filters(&self, path: &Path) -> bool {
        let meta = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "metadata unavailable");
                return false;
            }
        };
        if self.filters.is_empty() {
            return meta.is_file();
        }
        self.filters.iter().all(|f| f.matches(path, &meta))
    }

    /// 枚举候选并过滤；递归模式遍历整棵子树，否则只列出直接子项
    pub fn find_files(&mut self) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(&self.base_path).min_depth(1).follow_links(false);
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut matched = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "failed to access entry");
                    continue;
                }
            };
            self.stats.scanned += 1;

            let path = entry.into_path();
            if self.apply_filters(&path) {
                debug!(path = %path.display(), "matched");
                self.stats.matched += 1;
                matched.push(path);
            }
        }

        info!(
            base = %self.base_path.display(),
            recursive = self.recursive,
            scanned = self.stats.scanned,
            matched = matched.len(),
            "scan finished"
        );
        matched
    }

    pub fn get_stats(&self) -> ScanStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ScanStats::default();
    }
}

fn build_size_filter(min_size: Option<&str>, max_size: Option<&str>) -> Result<FilterPredicate, FilterError> {
    let min = min_size.map(parse_size_string).transpose()?.unwrap_or(0);
    let max = max_size.map(parse_size_string).transpose()?;
    debug!(min, ?max, "size filter");
    Ok(FilterPredicate::Size(SizeRange { min, max }))
}
