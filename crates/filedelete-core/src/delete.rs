//! 删除执行与空目录清理
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::scan::FileDelete;

impl FileDelete {
    /// 逐个删除（或模拟删除）文件，返回本次调用的 (deleted, errors)
    ///
    /// 单个文件失败只记一次错误，不会中断后续文件。dry-run 下不触碰文件系统，
    /// 但同样计入 deleted，使两种模式的统计形状一致。
    pub fn delete_files(&mut self, files: &[PathBuf], dry_run: bool) -> (usize, usize) {
        let mut deleted = 0usize;
        let mut errors = 0usize;

        for path in files {
            if dry_run {
                info!(path = %path.display(), "[DRY-RUN] would delete");
                deleted += 1;
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => {
                    info!(path = %path.display(), "deleted");
                    deleted += 1;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "failed to delete");
                    errors += 1;
                }
            }
        }

        self.stats.deleted += deleted;
        self.stats.errors += errors;
        (deleted, errors)
    }

    /// 自底向上删除基准目录下的空目录（基准目录本身保留），返回删除数量
    ///
    /// 是否为空按访问时的实际状态判断，因此子目录被删后父目录可以在同一轮被删除。
    pub fn delete_empty_dirs(&self) -> usize {
        let mut removed = 0usize;
        let walker = WalkDir::new(&self.base_path).min_depth(1).follow_links(false).contents_first(true);

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let is_empty = match fs::read_dir(path) {
                Ok(mut it) => it.next().is_none(),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "could not list directory");
                    false
                }
            };
            if !is_empty {
                continue;
            }
            match fs::remove_dir(path) {
                Ok(()) => {
                    info!(path = %path.display(), "removed empty directory");
                    removed += 1;
                }
                Err(e) => debug!(path = %path.display(), error = %e, "could not remove directory"),
            }
        }
        removed
    }
}
