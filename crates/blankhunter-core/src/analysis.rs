//! 伪空白分析（第一遍扫描）
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ScanError};
use crate::matcher::{self, Resolved};

/// 一种伪空白：码点与名称（不记录位置）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Impostor {
    pub scalar: char,
    pub name: &'static str,
}

/// 分析结果：持有已回到起点的字节源，以及按首次出现顺序排列、互不重复的伪空白种类
#[derive(Debug)]
pub struct AnalysisResult<S> {
    source: S,
    impostors: Vec<Impostor>,
}

impl<S> AnalysisResult<S> {
    /// 出现过的伪空白种类（首次出现顺序）
    pub fn impostors(&self) -> &[Impostor] {
        &self.impostors
    }

    pub fn has_impostors(&self) -> bool {
        !self.impostors.is_empty()
    }

    /// 底层字节源（转换时需要再次定位）
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

/// 分析内存中的文本；空文本视为非法参数
pub fn analyze(text: &str) -> Result<AnalysisResult<Cursor<Vec<u8>>>> {
    if text.is_empty() {
        return Err(ScanError::InvalidArgument("text must not be empty"));
    }
    analyze_stream(Cursor::new(text.as_bytes().to_vec()))
}

/// 分析文件
/// 文件句柄由结果持有；任何出错路径上句柄都会随 drop 释放
pub fn analyze_file(path: impl AsRef<Path>) -> Result<AnalysisResult<File>> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ScanError::InvalidArgument("path must not be empty"));
    }
    // 目录在部分平台上可以打开，但不是可分析的文件
    if path.is_dir() {
        return Err(ScanError::NotFound(path.to_path_buf()));
    }
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ScanError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    analyze_stream(file)
}

/// 分析调用方提供的可读、可定位字节流
/// - 定位失败：InvalidOperation（例如管道、标准输入）
/// - 读取被拒绝：InvalidOperation；其余 I/O 错误原样返回
pub fn analyze_stream<S: Read + Seek>(mut source: S) -> Result<AnalysisResult<S>> {
    if source.seek(SeekFrom::Start(0)).is_err() {
        return Err(ScanError::InvalidOperation("stream can't seek"));
    }

    let mut seen: HashSet<char> = HashSet::new();
    let mut impostors: Vec<Impostor> = Vec::new();
    matcher::walk(&mut source, |resolved| {
        if let Resolved::Impostor(entry) = resolved {
            if seen.insert(entry.scalar) {
                impostors.push(Impostor { scalar: entry.scalar, name: entry.name });
            }
        }
    })
    .map_err(read_error)?;

    Ok(AnalysisResult { source, impostors })
}

/// 以只写方式打开的文件描述符读取时返回 EBADF（各 Unix 平台均为 9）
#[cfg(unix)]
const EBADF: i32 = 9;

/// 把读取阶段的 I/O 错误归类
pub(crate) fn read_error(e: io::Error) -> ScanError {
    if is_unreadable(&e) {
        return ScanError::InvalidOperation("stream can't read");
    }
    ScanError::Io(e)
}

fn is_unreadable(e: &io::Error) -> bool {
    if matches!(e.kind(), io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied) {
        return true;
    }
    #[cfg(unix)]
    {
        if e.raw_os_error() == Some(EBADF) {
            return true;
        }
    }
    false
}
