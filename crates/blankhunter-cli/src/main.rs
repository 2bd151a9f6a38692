use anyhow::{bail, Context, Result};
use blankhunter_core::{
    analyze, analyze_file, analyze_stream, convert_to_path, convert_to_writer, load_options, scan_and_write,
    AnalysisResult, ImpostorItem, ScanOptions,
};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "blankhunter", version, about = "伪空白猎人：查找并替换看起来像空格的 Unicode 字符")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 分析单个文件或文本，列出出现过的伪空白种类
    Analyze {
        /// 输入文件；"-" 表示标准输入
        #[arg(required_unless_present = "text")]
        path: Option<PathBuf>,

        /// 直接分析给定文本
        #[arg(long, conflicts_with = "path")]
        text: Option<String>,

        /// 以 JSON 数组输出
        #[arg(long)]
        json: bool,

        /// 发现伪空白时以状态码 1 退出
        #[arg(long)]
        check: bool,
    },
    /// 替换伪空白为 ASCII 空格
    Convert {
        /// 输入文件；"-" 表示标准输入
        input: PathBuf,

        /// 输出文件（默认写到标准输出）
        #[arg(long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// 原地改写输入文件
        #[arg(long)]
        in_place: bool,
    },
    /// 扫描目录并生成 JSON 报告
    Scan {
        /// 输入目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON 数组）
        #[arg(long, default_value = "./report.json")]
        output: PathBuf,

        /// 配置文件（TOML）；命令行参数优先
        #[arg(long)]
        config: Option<PathBuf>,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long)]
        threads: Option<String>,

        /// 最大扫描文件大小（单位字节，例如 5242880 代表 5MB）
        #[arg(long)]
        max_file_size: Option<u64>,

        /// 目录遍历最大深度
        #[arg(long)]
        max_depth: Option<usize>,

        /// 不跳过疑似二进制文件
        #[arg(long)]
        include_binary: bool,

        /// 就地替换发现的伪空白
        #[arg(long)]
        fix: bool,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { path, text, json, check } => {
            let found = match (text, path) {
                (Some(text), _) => print_report(&analyze(&text)?, json)?,
                (None, Some(path)) if is_stdin(&path) => print_report(&analyze_stream(read_stdin()?)?, json)?,
                (None, Some(path)) => {
                    let result = analyze_file(&path).with_context(|| format!("analyze {}", path.display()))?;
                    print_report(&result, json)?
                }
                (None, None) => bail!("either a path or --text is required"),
            };
            if check && found {
                std::process::exit(1);
            }
        }
        Commands::Convert { input, output, in_place } => {
            // 原地改写时先整读进内存，避免替换时源文件句柄仍被占用
            let source = if is_stdin(&input) {
                if in_place {
                    bail!("--in-place needs a file input");
                }
                read_stdin()?
            } else if in_place {
                Cursor::new(std::fs::read(&input).with_context(|| format!("read {}", input.display()))?)
            } else {
                let result = analyze_file(&input).with_context(|| format!("analyze {}", input.display()))?;
                return write_converted(result, output.as_deref());
            };
            let result = analyze_stream(source)?;
            let target = if in_place { Some(input.as_path()) } else { output.as_deref() };
            write_converted(result, target)?;
        }
        Commands::Scan { input, output, config, threads, max_file_size, max_depth, include_binary, fix } => {
            let mut opts = match &config {
                Some(p) => load_options(p)?,
                None => ScanOptions::default(),
            };
            if let Some(t) = threads.as_deref() { opts.threads = parse_threads(t); }
            if max_file_size.is_some() { opts.max_file_size = max_file_size; }
            if max_depth.is_some() { opts.max_depth = max_depth; }
            if include_binary { opts.skip_binary = false; }
            if fix { opts.fix = true; }
            info!(?input, ?output, ?opts, "starting scan");

            // 以缓冲方式打开输出文件，按 JSON 数组流式写入
            let mut out = BufWriter::new(File::create(&output).context("create output file")?);
            let stats = scan_and_write(&input, &mut out, &opts).context("scan and write failed")?;
            out.flush().context("flush output file")?;

            if stats.files_failed > 0 {
                warn!(files_failed = stats.files_failed, "some files could not be scanned");
            }
            info!(
                files_scanned = stats.files_scanned,
                files_skipped = stats.files_skipped,
                files_with_impostors = stats.files_with_impostors,
                files_fixed = stats.files_fixed,
                "scan finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 留给分析/转换结果
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// 标准输入不可定位，整读进内存后再分析
fn read_stdin() -> Result<Cursor<Vec<u8>>> {
    let mut buf = Vec::new();
    io::stdin().lock().read_to_end(&mut buf).context("read stdin")?;
    Ok(Cursor::new(buf))
}

/// 打印分析结果，返回是否发现伪空白
fn print_report<S>(result: &AnalysisResult<S>, json: bool) -> Result<bool> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let items: Vec<ImpostorItem> = result.impostors().iter().map(ImpostorItem::from).collect();
        serde_json::to_writer_pretty(&mut out, &items)?;
        writeln!(out)?;
    } else {
        for item in result.impostors().iter().map(ImpostorItem::from) {
            writeln!(out, "{}\t{}", item.code_point, item.name)?;
        }
    }
    out.flush()?;
    info!(kinds = result.impostors().len(), "analysis finished");
    Ok(result.has_impostors())
}

fn write_converted<S: Read + Seek>(mut result: AnalysisResult<S>, target: Option<&Path>) -> Result<()> {
    match target {
        Some(path) => {
            convert_to_path(&mut result, path).with_context(|| format!("write {}", path.display()))?;
            info!(?path, kinds = result.impostors().len(), "conversion written");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            convert_to_writer(&mut result, &mut out).context("write stdout")?;
        }
    }
    Ok(())
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
