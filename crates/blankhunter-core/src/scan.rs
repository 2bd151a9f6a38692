//! 批量扫描主流程与并行调度
use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::analysis::analyze_file;
use crate::conversion::{convert, write_atomic};
use crate::findings::FileOutcome;
use crate::options::{ScanOptions, ScanStats};
use crate::types::{ImpostorItem, OutputItem};

/// 二进制判定的抽样长度
const BINARY_SAMPLE: usize = 8192;

/// 扫描目录并将含伪空白的文件以 JSON 数组流式写入 `out`
/// 稳定性保证：文件按路径排序，无论线程数多少输出顺序一致
pub fn scan_and_write(input_dir: &Path, out: &mut dyn Write, opts: &ScanOptions) -> Result<ScanStats> {
    if !input_dir.is_dir() {
        bail!("input is not a directory: {}", input_dir.display());
    }
    let files = collect_files(input_dir, opts);

    let mut report = ReportWriter::new(out, input_dir);
    report.begin()?;

    // 决策：线程数>1 且文件多于一个时走并行调度；否则串行
    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    if threads > 1 && files.len() > 1 {
        scan_parallel(&files, &mut report, opts, threads)?;
    } else {
        for path in &files {
            let outcome = scan_file(path, opts);
            report.record(path, outcome)?;
        }
    }

    report.finish()
}

/// 遍历输入目录，收集普通文件并按路径排序
fn collect_files(input_dir: &Path, opts: &ScanOptions) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(input_dir).min_depth(1);
    if let Some(depth) = opts.max_depth {
        walker = walker.max_depth(depth);
    }
    let mut files: Vec<PathBuf> = vec![];
    for entry in walker {
        let entry = match entry { Ok(e) => e, Err(_) => continue };
        if entry.file_type().is_file() { files.push(entry.into_path()); }
    }
    files.sort();
    files
}

/// 处理单个文件：大小/二进制过滤 → 分析 → 可选的替换结果
/// 不在此处写回文件：写回由 Writer 在记录报告前完成，保证被改写的文件都出现在报告中
fn scan_file(path: &Path, opts: &ScanOptions) -> FileOutcome {
    if let Some(max) = opts.max_file_size {
        match std::fs::metadata(path) {
            Ok(md) if md.len() > max => return FileOutcome::Skipped,
            Ok(_) => {}
            Err(_) => return FileOutcome::Failed,
        }
    }
    if opts.skip_binary {
        match sample_is_binary(path) {
            Ok(true) => return FileOutcome::Skipped,
            Ok(false) => {}
            Err(_) => return FileOutcome::Failed,
        }
    }

    let mut result = match analyze_file(path) {
        Ok(r) => r,
        Err(_) => return FileOutcome::Failed,
    };
    if !result.has_impostors() {
        return FileOutcome::Clean;
    }
    let impostors = result.impostors().to_vec();
    if !opts.fix {
        return FileOutcome::Found { impostors, converted: None };
    }
    match convert(&mut result) {
        Ok(bytes) => FileOutcome::Found { impostors, converted: Some(bytes) },
        Err(_) => FileOutcome::Failed,
    }
}

fn sample_is_binary(path: &Path) -> std::io::Result<bool> {
    let mut buf = Vec::with_capacity(BINARY_SAMPLE);
    File::open(path)?.take(BINARY_SAMPLE as u64).read_to_end(&mut buf)?;
    Ok(is_probably_binary(&buf))
}

/// 判定缓冲区是否“明显是二进制”
/// 只要包含 NUL 字节（0x00）即认为二进制。
/// 不按可打印 ASCII 比例判断：非拉丁文本本身大多是多字节序列。
fn is_probably_binary(buf: &[u8]) -> bool {
    buf.contains(&0)
}

/// 并行调度：
/// - Rayon 线程池并行扫描（只读，不改写文件）
/// - 当前线程作为 Writer，按 idx 重排、写回并流式写 JSON，保证稳定顺序
/// - Writer 出错时置取消标志、关闭通道并等待扫描线程退出后再返回
fn scan_parallel(files: &[PathBuf], report: &mut ReportWriter<'_>, opts: &ScanOptions, threads: usize) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    type Msg = (usize /*idx*/, FileOutcome);
    let (tx, rx) = channel::bounded::<Msg>(256);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let files_vec: Vec<(usize, PathBuf)> = files.iter().cloned().enumerate().collect();
    let worker_opts = opts.clone();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);

    let scan_thread = std::thread::spawn(move || {
        pool.install(|| {
            files_vec.par_iter().for_each(|(idx, path)| {
                if worker_cancel.load(Ordering::Relaxed) { return; }
                let _ = tx.send((*idx, scan_file(path, &worker_opts)));
            });
        });
        // 结束后 Sender 全部被丢弃，Receiver 将收到关闭信号
    });

    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, FileOutcome> = BTreeMap::new();
    let mut write_err: Option<anyhow::Error> = None;
    'recv: while let Ok((idx, outcome)) = rx.recv() {
        buffer.insert(idx, outcome);
        while let Some(outcome) = buffer.remove(&next_idx) {
            if let Err(e) = report.record(&files[next_idx], outcome) {
                write_err = Some(e);
                break 'recv;
            }
            next_idx += 1;
        }
    }

    // 阻塞在 send 上的 worker 会因通道关闭而立即返回
    cancel.store(true, Ordering::Relaxed);
    drop(rx);
    let joined = scan_thread.join();
    if let Some(e) = write_err {
        return Err(e);
    }
    joined.map_err(|_| anyhow!("scan worker panicked"))?;
    if next_idx != files.len() {
        bail!("scan finished with {} of {} files reported", next_idx, files.len());
    }
    Ok(())
}

/// 报告写出器：维护 JSON 数组分隔符与统计
struct ReportWriter<'a> {
    out: &'a mut dyn Write,
    root: &'a Path,
    first: bool,
    stats: ScanStats,
}

impl<'a> ReportWriter<'a> {
    fn new(out: &'a mut dyn Write, root: &'a Path) -> Self {
        Self { out, root, first: true, stats: ScanStats::default() }
    }

    fn begin(&mut self) -> Result<()> {
        write!(self.out, "[")?;
        Ok(())
    }

    /// 记录单个文件；若带有替换结果，先原子写回再写报告项
    fn record(&mut self, path: &Path, outcome: FileOutcome) -> Result<()> {
        let (impostors, converted) = match outcome {
            FileOutcome::Skipped => { self.stats.files_skipped += 1; return Ok(()); }
            FileOutcome::Failed => { self.stats.files_failed += 1; return Ok(()); }
            FileOutcome::Clean => { self.stats.files_scanned += 1; return Ok(()); }
            FileOutcome::Found { impostors, converted } => (impostors, converted),
        };
        let fixed = match converted {
            Some(bytes) => {
                if write_atomic(path, &bytes).is_err() {
                    self.stats.files_failed += 1;
                    return Ok(());
                }
                true
            }
            None => false,
        };
        self.stats.files_scanned += 1;
        self.stats.files_with_impostors += 1;
        if fixed { self.stats.files_fixed += 1; }

        let rel = path.strip_prefix(self.root).unwrap_or(path).to_string_lossy();
        let item = OutputItem {
            path: &*rel,
            impostors: impostors.iter().map(ImpostorItem::from).collect(),
            fixed,
        };
        if !self.first { write!(self.out, ",")?; } else { self.first = false; }
        serde_json::to_writer(&mut *self.out, &item)?;
        Ok(())
    }

    fn finish(mut self) -> Result<ScanStats> {
        write!(self.out, "]")?;
        self.out.flush()?;
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_bytes_mark_binary() {
        assert!(is_probably_binary(b"abc\0def"));
        assert!(!is_probably_binary("全角\u{3000}空格".as_bytes()));
        assert!(!is_probably_binary(b""));
    }
}
