//! 核心删除库
//!
//! 设计要点：
//! - 过滤器在添加时一次性编译为带参数的枚举变体，路径必须通过全部过滤器才算命中。
//! - 扫描、删除、空目录清理均为单线程同步执行；单个文件的失败只计数，不中断批处理。
//! - 危险路径判定与确认门在任何扫描之前执行；交互部分由调用方注入读写端。
//! - 所有事件通过 `tracing` 输出，最终汇总由调用方根据 `get_stats()` 生成。

mod config;
mod delete;
mod error;
mod filters;
mod options;
mod parse;
mod safety;
mod scan;
mod types;

pub use config::{
    load_policy, parse_policy, SafetyPolicy, DANGEROUS_PATHS_UNIX, DANGEROUS_PATHS_WINDOWS,
    DEFAULT_DEPTH_EXEMPT, DEFAULT_MAX_DELETE,
};
pub use error::{FilterError, ParseError, SafetyError};
pub use filters::{AgeCutoff, FilterPredicate, NameGlobs, SizeRange};
pub use options::{RegexFlags, ScanStats, TimeField};
pub use parse::{parse_date_string, parse_size_string};
pub use safety::{
    classify_path, confirm_large_operation, is_dangerous_path, needs_confirmation, resolve_path,
    validate_path_safety, OsFamily,
};
pub use scan::FileDelete;
pub use types::{ExitCode, RunMode, RunSummary};
