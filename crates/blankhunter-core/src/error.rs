//! 核心错误类型（对外暴露）
use std::path::PathBuf;
use thiserror::Error;

/// 分析/转换过程中的错误
/// - 参数校验失败在调用点同步返回，不做任何本地恢复或重试
/// - I/O 错误原样上抛
#[derive(Debug, Error)]
pub enum ScanError {
    /// 参数非法（空文本、空路径等）
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// 待分析的文件不存在
    #[error("file not found to analyze: {}", .0.display())]
    NotFound(PathBuf),
    /// 流不具备读取或定位能力
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// 转换结果无法按 UTF-8 解码为字符串
    #[error("converted bytes are not valid UTF-8: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
