//! 字节级匹配引擎
//!
//! 设计要点：
//! - 已读取首字节后，按目录逐字节收窄候选，只消费属于该字符的字节。
//! - 下一个字节先窥视（peek）再决定是否消费：不能让任何候选存活的字节留在流中，
//!   作为下一轮的首字节重新处理。
//! - 单一候选也逐字节校验剩余部分，不盲目跳过。
//! - 分析与转换两遍扫描共用 `walk`，保证逐字节分类完全一致。
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use crate::catalog::{self, CatalogEntry};

/// 已消费但未构成任何目录条目的字节（原样透传）
/// 最长的目录条目为 3 字节，未完成匹配时至多消费 2 字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    bytes: [u8; 4],
    len: usize,
}

impl Literal {
    fn single(byte: u8) -> Self {
        Self { bytes: [byte, 0, 0, 0], len: 1 }
    }

    fn push(&mut self, byte: u8) {
        self.bytes[self.len] = byte;
        self.len += 1;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// 一次匹配的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// 完整匹配到的目录条目
    Impostor(&'static CatalogEntry),
    /// 非目录内容（真实字符或其中一个字节），原样保留
    Literal(Literal),
}

/// 带单字节窥视能力的字节读取器
pub(crate) struct ByteReader<R> {
    inner: R,
}

impl<R: BufRead> ByteReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner }
    }

    /// 查看下一个字节但不推进位置；流结束返回 None
    pub(crate) fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// 读取一个字节并推进位置
    pub(crate) fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let b = self.peek_byte()?;
        if b.is_some() {
            self.inner.consume(1);
        }
        Ok(b)
    }
}

/// 给定已读出的首字节 `lead`，解析其后字节所代表的字符
///
/// 消费规则：
/// - `lead` 不可能开启任何条目：零额外消费，结果为 `lead` 自身
/// - 每读一个字节都收窄候选；收窄为空的字节不被消费
/// - 某候选的字节序列被完整读到时返回该条目
/// - 候选耗尽或流提前结束：已消费的字节整体作为字面量返回
pub(crate) fn resolve<R: BufRead>(src: &mut ByteReader<R>, lead: u8) -> io::Result<Resolved> {
    let mut candidates = catalog::entries_starting_with(lead);
    let mut consumed = Literal::single(lead);
    let mut position = 1;

    while !candidates.is_empty() {
        if let Some(i) = candidates.complete_at(position) {
            return Ok(Resolved::Impostor(catalog::entry(i)));
        }
        let next = match src.peek_byte()? {
            Some(b) => b,
            None => break,
        };
        let narrowed = catalog::narrow(candidates, position, next);
        if narrowed.is_empty() {
            break;
        }
        src.next_byte()?;
        consumed.push(next);
        candidates = narrowed;
        position += 1;
    }

    Ok(Resolved::Literal(consumed))
}

/// 从头到尾扫描整个源，对每个解析结果调用 `visit`
/// 开始前与结束后都会把源定位回起点
pub(crate) fn walk<S, F>(source: &mut S, mut visit: F) -> io::Result<()>
where
    S: Read + Seek,
    F: FnMut(Resolved),
{
    source.seek(SeekFrom::Start(0))?;
    {
        let mut reader = ByteReader::new(BufReader::new(&mut *source));
        while let Some(lead) = reader.next_byte()? {
            visit(resolve(&mut reader, lead)?);
        }
    }
    source.seek(SeekFrom::Start(0))?;
    Ok(())
}
