//! 伪空白扫描核心库
//!
//! 设计要点：
//! - 逐字节扫描 UTF-8 字节流，按固定目录识别“看起来是空白但不是 ASCII 空格”的码点。
//! - 分析（第一遍）只报告出现过的种类，按首次出现顺序去重，不记录位置。
//! - 转换（第二遍）独立重扫，把每一次出现替换为单个 ASCII 空格，其余字节原样保留。
//! - 两遍共用同一匹配过程，分类结果逐字节一致。
//! - 核心不输出日志；批量扫描与 CLI 在外层。

pub mod catalog;
mod error;
mod matcher;
mod analysis;
mod conversion;
mod options;
mod config;
mod types;
mod findings;
mod scan;

pub use catalog::{CandidateSet, CatalogEntry};
pub use error::{Result, ScanError};
pub use analysis::{analyze, analyze_file, analyze_stream, AnalysisResult, Impostor};
pub use conversion::{convert, convert_to_path, convert_to_string, convert_to_writer};
pub use options::{ScanOptions, ScanStats};
pub use config::{load_options, parse_options};
pub use types::{ImpostorItem, OutputItem};
pub use scan::scan_and_write;
