// ==========================================
// 销售协同系统 - 产品目录与价格档位
// ==========================================
// 职责: 价格解析引擎的只读输入
// 红线: 同一产品的档位 min_quantity 必须非负且互不相同
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PricingModel - 定价模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingModel {
    Fixed,  // 固定价
    Tiered, // 阶梯价
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingModel::Fixed => write!(f, "FIXED"),
            PricingModel::Tiered => write!(f, "TIERED"),
        }
    }
}

// ==========================================
// PriceTier - 价格档位
// ==========================================
// 阶梯价按 min_quantity 构成阶跃函数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTier {
    pub min_quantity: i64,          // 起订数量(非负,同一产品内唯一)
    pub unit_price: Decimal,        // 档位单价
    pub price_type: Option<String>, // 档位类型标签(如 "批发" / "项目价")
}

// ==========================================
// CatalogItem - 目录产品
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: String,             // 产品ID
    pub name: String,                // 产品名称
    pub model_no: Option<String>,    // 型号
    pub pricing_model: PricingModel, // 定价模式
    pub base_price: Option<Decimal>, // 固定价(FIXED 模式必填)
    pub price_tiers: Vec<PriceTier>, // 价格档位(TIERED 模式使用)
}

impl CatalogItem {
    /// 构造固定价产品
    pub fn fixed(item_id: impl Into<String>, name: impl Into<String>, base_price: Decimal) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            model_no: None,
            pricing_model: PricingModel::Fixed,
            base_price: Some(base_price),
            price_tiers: vec![],
        }
    }

    /// 构造阶梯价产品
    pub fn tiered(
        item_id: impl Into<String>,
        name: impl Into<String>,
        tiers: Vec<PriceTier>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            model_no: None,
            pricing_model: PricingModel::Tiered,
            base_price: None,
            price_tiers: tiers,
        }
    }
}
