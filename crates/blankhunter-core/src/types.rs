//! 公共类型（对外暴露）
use serde::Serialize;

use crate::analysis::Impostor;
use crate::catalog;

/// 报告中的单个伪空白种类
#[derive(Debug, Clone, Serialize)]
pub struct ImpostorItem<'a> {
    pub code_point: String,
    pub name: &'a str,
}

impl From<&Impostor> for ImpostorItem<'static> {
    fn from(i: &Impostor) -> Self {
        let code_point = catalog::lookup(i.scalar)
            .map(|e| e.code_point())
            .unwrap_or_else(|| format!("U+{:04X}", i.scalar as u32));
        Self { code_point, name: i.name }
    }
}

/// 输出项结构（对应报告 JSON 数组的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct OutputItem<'a> {
    pub path: &'a str,
    pub impostors: Vec<ImpostorItem<'a>>,
    #[serde(skip_serializing_if = "is_false")]
    pub fixed: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}
