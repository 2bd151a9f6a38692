//! 配置文件加载（TOML）
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::options::ScanOptions;

/// `[scan]` 表；缺省字段保持默认值
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScanSection {
    #[serde(default)]
    max_file_size: Option<u64>,
    #[serde(default)]
    threads: Option<usize>,
    #[serde(default)]
    max_depth: Option<usize>,
    #[serde(default)]
    skip_binary: Option<bool>,
    #[serde(default)]
    fix: Option<bool>,
}

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    scan: ScanSection,
}

/// 解析 TOML 文本为扫描选项
pub fn parse_options(txt: &str) -> Result<ScanOptions> {
    let parsed: ConfigFile = toml::from_str(txt).context("parse config")?;
    let s = parsed.scan;
    let defaults = ScanOptions::default();
    Ok(ScanOptions {
        max_file_size: s.max_file_size.or(defaults.max_file_size),
        // 0 与 "auto" 等价
        threads: s.threads.filter(|&n| n >= 1).or(defaults.threads),
        max_depth: s.max_depth.or(defaults.max_depth),
        skip_binary: s.skip_binary.unwrap_or(defaults.skip_binary),
        fix: s.fix.unwrap_or(defaults.fix),
    })
}

/// 从配置文件加载扫描选项
pub fn load_options(path: &Path) -> Result<ScanOptions> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    parse_options(&txt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        assert_eq!(parse_options("").unwrap(), ScanOptions::default());
    }

    #[test]
    fn scan_table_overrides_defaults() {
        let opts = parse_options(
            "[scan]\nmax_file_size = 1024\nthreads = 2\nmax_depth = 3\nskip_binary = false\nfix = true\n",
        )
        .unwrap();
        assert_eq!(opts.max_file_size, Some(1024));
        assert_eq!(opts.threads, Some(2));
        assert_eq!(opts.max_depth, Some(3));
        assert!(!opts.skip_binary);
        assert!(opts.fix);
    }

    #[test]
    fn zero_threads_means_auto() {
        assert_eq!(parse_options("[scan]\nthreads = 0\n").unwrap().threads, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_options("[scan]\nthreadz = 2\n").is_err());
    }
}
