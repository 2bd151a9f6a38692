//! 伪空白转换（第二遍扫描）
//!
//! 独立地从头重扫字节源，不复用分析阶段的去重状态：每一次出现都会被替换。
//! 是否替换以目录为准，而不是分析结果中的种类列表。
use std::fs;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::analysis::{read_error, AnalysisResult};
use crate::error::{Result, ScanError};
use crate::matcher::{self, Resolved};

/// 替换后的规范空格
const ASCII_SPACE: u8 = b' ';

/// 将全部伪空白替换为单个 ASCII 空格，返回完整的输出缓冲区
/// 输出长度不超过输入长度；其余字节按原顺序原样保留
pub fn convert<S: Read + Seek>(result: &mut AnalysisResult<S>) -> Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::new();
    matcher::walk(result.source_mut(), |resolved| match resolved {
        Resolved::Impostor(_) => out.push(ASCII_SPACE),
        Resolved::Literal(lit) => out.extend_from_slice(lit.as_bytes()),
    })
    .map_err(read_error)?;
    Ok(out)
}

/// 转换并按 UTF-8 解码为字符串
pub fn convert_to_string<S: Read + Seek>(result: &mut AnalysisResult<S>) -> Result<String> {
    let bytes = convert(result)?;
    String::from_utf8(bytes).map_err(|e| ScanError::InvalidData(e.utf8_error().to_string()))
}

/// 转换并写入调用方提供的流
/// 整个缓冲区先在内存中生成，转换失败时不会向 sink 写入任何内容
pub fn convert_to_writer<S: Read + Seek, W: Write + ?Sized>(result: &mut AnalysisResult<S>, sink: &mut W) -> Result<()> {
    let bytes = convert(result)?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    Ok(())
}

/// 转换并写入文件（不存在则创建，存在则覆盖）
/// 先写同目录临时文件再原子替换，目标文件要么完整写入，要么保持原样
pub fn convert_to_path<S: Read + Seek>(result: &mut AnalysisResult<S>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ScanError::InvalidArgument("path must not be empty"));
    }
    let bytes = convert(result)?;
    write_atomic(path, &bytes)
}

/// 原子写文件：同目录临时文件 + rename
/// 覆盖已有文件时沿用其权限位（临时文件默认 0600）
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let existing = match fs::metadata(path) {
        Ok(md) => Some(md.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    if let Some(perms) = existing {
        tmp.as_file().set_permissions(perms)?;
    }
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ScanError::Io(e.error))?;
    Ok(())
}
