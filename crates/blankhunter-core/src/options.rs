//! 扫描选项与统计信息（模块）

/// 批量扫描选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    /// 目录遍历最大深度；None 表示不限
    pub max_depth: Option<usize>,
    /// 跳过疑似二进制的文件
    pub skip_binary: bool,
    /// 发现伪空白后就地替换（原子写回）
    pub fix: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: None,
            threads: None,
            max_depth: None,
            skip_binary: true,
            fix: false,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub files_with_impostors: usize,
    pub files_fixed: usize,
}
