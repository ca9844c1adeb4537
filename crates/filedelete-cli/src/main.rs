use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use filedelete_core::{
    confirm_large_operation, load_policy, needs_confirmation, validate_path_safety, ExitCode, FileDelete,
    RegexFlags, RunMode, RunSummary, SafetyPolicy, ScanStats, TimeField,
};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(
    name = "filedelete",
    version,
    about = "按扩展名、年龄、大小、glob、正则过滤并安全地批量删除文件",
    after_help = "Example: filedelete --path ./logs --recursive --ext log --older-than-days 30"
)]
struct Cli {
    /// 要搜索的基准目录
    #[arg(long)]
    path: PathBuf,

    /// 递归搜索子目录
    #[arg(long)]
    recursive: bool,

    /// 只匹配 N 天之前的文件
    #[arg(long, conflicts_with = "before_date", help_heading = "Date filters")]
    older_than_days: Option<u64>,

    /// 只匹配该日期（DD-MM-YYYY，本地零点）之前的文件
    #[arg(long, help_heading = "Date filters")]
    before_date: Option<String>,

    /// 年龄比较使用的时间戳：mtime、ctime 或 atime
    #[arg(long, default_value = "mtime", help_heading = "Date filters")]
    time_field: TimeField,

    /// 包含的扩展名（可重复）
    #[arg(long = "ext")]
    ext: Vec<String>,

    /// 最小文件大小（例如 10K、5M、1G）
    #[arg(long, help_heading = "Size filters")]
    min_size: Option<String>,

    /// 最大文件大小（例如 10K、5M、1G）
    #[arg(long, help_heading = "Size filters")]
    max_size: Option<String>,

    /// 文件名需匹配的 glob（可重复，任一命中即可）
    #[arg(long, help_heading = "Pattern filters")]
    include_glob: Vec<String>,

    /// 文件名不得匹配的 glob（可重复）
    #[arg(long, help_heading = "Pattern filters")]
    exclude_glob: Vec<String>,

    /// 在文件名中搜索的正则
    #[arg(long, help_heading = "Pattern filters")]
    name_regex: Option<String>,

    /// 正则标志，逗号分隔（IGNORECASE,MULTILINE,DOTALL,VERBOSE）
    #[arg(long, default_value = "", help_heading = "Pattern filters")]
    regex_flags: String,

    /// 只模拟删除（默认行为）
    #[arg(long, conflicts_with = "apply", help_heading = "Execution mode")]
    dry_run: bool,

    /// 真正删除文件；超过阈值时需要确认
    #[arg(long, visible_alias = "yes", help_heading = "Execution mode")]
    apply: bool,

    /// 跳过确认提示（谨慎使用）
    #[arg(long, help_heading = "Execution mode")]
    force: bool,

    /// 非交互模式：需要确认时直接中止
    #[arg(long, help_heading = "Execution mode")]
    no_prompt: bool,

    /// 无需确认即可删除的最大文件数（默认取配置文件，否则 100）
    #[arg(long, help_heading = "Execution mode")]
    max_delete: Option<usize>,

    /// 删除文件后清理空目录
    #[arg(long)]
    delete_empty_dirs: bool,

    /// 日志等级（RUST_LOG 优先）
    #[arg(long, value_enum, default_value_t = LogLevel::Info, help_heading = "Output options")]
    log_level: LogLevel,

    /// 日志同时写入该文件
    #[arg(long, help_heading = "Output options")]
    log_file: Option<PathBuf>,

    /// 只输出最终汇总（逐文件日志降为 warn）
    #[arg(long, help_heading = "Output options")]
    summary_only: bool,

    /// 以 JSON 输出汇总
    #[arg(long, help_heading = "Output options")]
    json: bool,

    /// 安全策略配置文件（TOML）
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Cli {
    fn effective_log_level(&self) -> LogLevel {
        if self.summary_only { self.log_level.max(LogLevel::Warn) } else { self.log_level }
    }

    fn mode(&self) -> RunMode {
        if self.dry_run || !self.apply { RunMode::DryRun } else { RunMode::Apply }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    if let Err(e) = init_tracing(cli.effective_log_level(), cli.log_file.as_deref()) {
        eprintln!("error: {e:#}");
        return std::process::ExitCode::from(ExitCode::InvalidArguments.code());
    }

    // 最外层兜底：任何未预期的错误都映射为参数错误
    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "unexpected error");
            debug!(error = ?e, "unexpected error details");
            ExitCode::InvalidArguments
        }
    };
    std::process::ExitCode::from(code.code())
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let policy = match &cli.config {
        Some(path) => load_policy(path)?,
        None => SafetyPolicy::default(),
    };
    let max_delete = cli.max_delete.unwrap_or(policy.max_delete);
    let mode = cli.mode();
    info!(path = ?cli.path, ?mode, recursive = cli.recursive, max_delete, "starting");

    if let Err(e) = validate_path_safety(&cli.path, &policy) {
        error!(error = %e, "path rejected");
        return report(cli, RunSummary::new(mode, ScanStats::default(), 0, e.exit_code()), false);
    }

    let mut engine = FileDelete::new(&cli.path, cli.recursive);
    if add_filters(&mut engine, cli).is_err() {
        // 过滤器构建失败已由引擎记录；宁可中止也不扩大删除范围
        return report(cli, RunSummary::new(mode, ScanStats::default(), 0, ExitCode::InvalidArguments), false);
    }

    let matched = engine.find_files();
    if matched.is_empty() {
        info!("no files matched the specified criteria");
        return report(cli, RunSummary::new(mode, engine.get_stats(), 0, ExitCode::NothingToDo), true);
    }

    let mut removed_dirs = 0;
    match mode {
        RunMode::DryRun => {
            info!(count = matched.len(), "dry-run: files that would be deleted");
            engine.delete_files(&matched, true);
        }
        RunMode::Apply => {
            if needs_confirmation(matched.len(), max_delete) && !cli.force {
                if cli.no_prompt {
                    // 无法确认时按安全拦截处理，复用退出码 3
                    error!(count = matched.len(), max_delete, "confirmation required but --no-prompt given; aborting");
                    let summary = RunSummary::new(mode, engine.get_stats(), 0, ExitCode::SafetyBlocked);
                    return report(cli, summary, true);
                }
                let stdin = io::stdin();
                if !confirm_large_operation(matched.len(), max_delete, stdin.lock(), io::stderr()) {
                    info!("operation cancelled by user");
                    return report(cli, RunSummary::new(mode, engine.get_stats(), 0, ExitCode::Success), true);
                }
            }

            let (deleted, errors) = engine.delete_files(&matched, false);
            info!(deleted, errors, "deletion finished");

            if cli.delete_empty_dirs {
                removed_dirs = engine.delete_empty_dirs();
                info!(removed_dirs, "removed empty directories");
            }
        }
    }

    let stats = engine.get_stats();
    let code = if stats.errors > 0 { ExitCode::PartialErrors } else { ExitCode::Success };
    report(cli, RunSummary::new(mode, stats, removed_dirs, code), true)
}

/// 按命令行参数向引擎添加过滤器；任一构建失败即返回错误
fn add_filters(engine: &mut FileDelete, cli: &Cli) -> Result<()> {
    engine.add_extension_filter(&cli.ext);
    engine.add_age_filter(cli.older_than_days, cli.before_date.as_deref(), cli.time_field)?;
    engine.add_size_filter(cli.min_size.as_deref(), cli.max_size.as_deref())?;
    engine.add_glob_filter(&cli.include_glob, &cli.exclude_glob)?;
    if let Some(pattern) = &cli.name_regex {
        engine.add_regex_filter(pattern, RegexFlags::parse(&cli.regex_flags))?;
    }
    debug!(filters = engine.filter_count(), "filters ready");
    Ok(())
}

/// 输出汇总（stdout），返回退出码
fn report(cli: &Cli, summary: RunSummary, scanned: bool) -> Result<ExitCode> {
    if cli.json {
        println!("{}", serde_json::to_string(&summary).context("serialize summary")?);
    } else if scanned {
        let mode = match summary.mode {
            RunMode::DryRun => "dry-run",
            RunMode::Apply => "apply",
        };
        println!(
            "Summary: mode={} scanned={} matched={} deleted={} errors={} removed_dirs={}",
            mode,
            summary.stats.scanned,
            summary.stats.matched,
            summary.stats.deleted,
            summary.stats.errors,
            summary.removed_dirs,
        );
        if summary.mode == RunMode::DryRun && summary.stats.deleted > 0 {
            println!("Dry run mode: no files were deleted. Re-run with --apply to delete.");
        }
    }
    Ok(summary.outcome)
}

fn init_tracing(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let builder = FmtSubscriber::builder().with_env_filter(env_filter);

    // 日志写 stderr，stdout 只留给汇总/JSON
    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            let subscriber = builder.with_ansi(false).with_writer(io::stderr.and(Mutex::new(file))).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => tracing::subscriber::set_global_default(builder.with_writer(io::stderr).finish()),
    };
    if result.is_err() {
        warn!("tracing subscriber already installed");
    }
    Ok(())
}
