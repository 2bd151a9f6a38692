//! 伪空白字符目录（进程级只读常量表）
//!
//! 每个条目记录名称、码点及其精确的 UTF-8 字节序列。
//! 多个条目可共享字节前缀（例如 `E2 80`），匹配器据此逐字节收窄候选集合。

/// 目录条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub scalar: char,
    pub pattern: &'static [u8],
}

impl CatalogEntry {
    const fn new(name: &'static str, scalar: char, pattern: &'static [u8]) -> Self {
        Self { name, scalar, pattern }
    }

    /// `U+XXXX` 形式的码点文本
    pub fn code_point(&self) -> String {
        format!("U+{:04X}", self.scalar as u32)
    }
}

/// 目录条目数（候选集合使用 u32 位图，不得超过 32）
pub const CATALOG_LEN: usize = 23;

static CATALOG: [CatalogEntry; CATALOG_LEN] = [
    CatalogEntry::new("CHARACTER TABULATION", '\u{0009}', b"\x09"),
    CatalogEntry::new("NON-BREAKING SPACE", '\u{00A0}', b"\xC2\xA0"),
    CatalogEntry::new("OGHAM SPACE MARK", '\u{1680}', b"\xE1\x9A\x80"),
    CatalogEntry::new("EN QUAD", '\u{2000}', b"\xE2\x80\x80"),
    CatalogEntry::new("EM QUAD", '\u{2001}', b"\xE2\x80\x81"),
    CatalogEntry::new("EN SPACE", '\u{2002}', b"\xE2\x80\x82"),
    CatalogEntry::new("EM SPACE", '\u{2003}', b"\xE2\x80\x83"),
    CatalogEntry::new("THREE-PER-EM SPACE", '\u{2004}', b"\xE2\x80\x84"),
    CatalogEntry::new("FOUR-PER-EM SPACE", '\u{2005}', b"\xE2\x80\x85"),
    CatalogEntry::new("SIX-PER-EM SPACE", '\u{2006}', b"\xE2\x80\x86"),
    CatalogEntry::new("FIGURE SPACE", '\u{2007}', b"\xE2\x80\x87"),
    CatalogEntry::new("PUNCTUATION SPACE", '\u{2008}', b"\xE2\x80\x88"),
    CatalogEntry::new("THIN SPACE", '\u{2009}', b"\xE2\x80\x89"),
    CatalogEntry::new("HAIR SPACE", '\u{200A}', b"\xE2\x80\x8A"),
    CatalogEntry::new("NARROW NON-BREAKING SPACE", '\u{202F}', b"\xE2\x80\xAF"),
    CatalogEntry::new("MEDIUM MATHEMATICAL SPACE", '\u{205F}', b"\xE2\x81\x9F"),
    CatalogEntry::new("IDEOGRAPHIC SPACE", '\u{3000}', b"\xE3\x80\x80"),
    CatalogEntry::new("MONGOLIAN VOWEL SEPARATOR", '\u{180E}', b"\xE1\xA0\x8E"),
    CatalogEntry::new("ZERO WIDTH SPACE", '\u{200B}', b"\xE2\x80\x8B"),
    CatalogEntry::new("ZERO WIDTH NON-JOINER", '\u{200C}', b"\xE2\x80\x8C"),
    CatalogEntry::new("ZERO WIDTH JOINER", '\u{200D}', b"\xE2\x80\x8D"),
    CatalogEntry::new("WORD JOINER", '\u{2060}', b"\xE2\x81\xA0"),
    CatalogEntry::new("ZERO WIDTH NON-BREAKING SPACE", '\u{FEFF}', b"\xEF\xBB\xBF"),
];

/// 全部目录条目（稳定顺序）
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

/// 按下标取条目；下标来自 `CandidateSet`，保证有效
pub(crate) fn entry(index: usize) -> &'static CatalogEntry {
    &CATALOG[index]
}

/// 按码点查找条目
///
/// ```
/// let nbsp = blankhunter_core::catalog::lookup('\u{00A0}').unwrap();
/// assert_eq!(nbsp.name, "NON-BREAKING SPACE");
/// ```
///
/// 下标访问仅限 crate 内部（下标由 `CandidateSet` 保证有效）：
///
/// ```compile_fail
/// let _ = blankhunter_core::catalog::entry(0);
/// ```
pub fn lookup(scalar: char) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.scalar == scalar)
}

/// 是否为伪空白（仅以是否在目录中为准；ASCII 空格不在其中）
pub fn is_impostor(scalar: char) -> bool {
    lookup(scalar).is_some()
}

/// 候选条目集合：目录下标的位图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CandidateSet(u32);

impl CandidateSet {
    pub const EMPTY: CandidateSet = CandidateSet(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(self, index: usize) -> bool {
        index < CATALOG_LEN && self.0 & (1 << index) != 0
    }

    /// 仅剩一个候选时返回其下标
    pub fn single(self) -> Option<usize> {
        if self.len() == 1 { Some(self.0.trailing_zeros() as usize) } else { None }
    }

    /// 候选中字节序列长度恰为 `len` 的条目
    /// UTF-8 编码无前缀包含关系，故至多一个
    pub fn complete_at(self, len: usize) -> Option<usize> {
        self.iter().find(|&i| CATALOG[i].pattern.len() == len)
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..CATALOG_LEN).filter(move |&i| self.contains(i))
    }

    fn insert(&mut self, index: usize) {
        self.0 |= 1 << index;
    }
}

/// 首字节等于 `byte` 的全部条目；`byte` 不可能开启任何条目时为空
pub fn entries_starting_with(byte: u8) -> CandidateSet {
    let mut set = CandidateSet::EMPTY;
    for (i, e) in CATALOG.iter().enumerate() {
        if e.pattern[0] == byte {
            set.insert(i);
        }
    }
    set
}

/// 收窄候选：保留字节序列长度 ≥ position+1 且第 position 字节等于 `byte` 的条目
pub fn narrow(candidates: CandidateSet, position: usize, byte: u8) -> CandidateSet {
    let mut set = CandidateSet::EMPTY;
    for i in candidates.iter() {
        if CATALOG[i].pattern.get(position) == Some(&byte) {
            set.insert(i);
        }
    }
    set
}
