//! 单文件扫描结果（内部使用）
use crate::analysis::Impostor;

/// 单个文件的处理结果
#[derive(Debug, Clone)]
pub(crate) enum FileOutcome {
    /// 超过大小上限或疑似二进制
    Skipped,
    /// 打开或读取失败
    Failed,
    /// 未发现伪空白
    Clean,
    /// 发现伪空白（首次出现顺序）
    /// `converted` 为待写回的替换结果；由 Writer 按报告顺序落盘
    Found { impostors: Vec<Impostor>, converted: Option<Vec<u8>> },
}
