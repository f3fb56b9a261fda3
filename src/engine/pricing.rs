// ==========================================
// 销售协同系统 - 价格解析引擎
// ==========================================
// 职责: 按数量与定价模式解析有效单价
// 红线: 纯函数,无副作用,不访问数据库
// ==========================================

use crate::domain::catalog::{CatalogItem, PricingModel};
use crate::engine::error::{EngineError, EngineResult};
use rust_decimal::Decimal;

// ==========================================
// PricingResolver - 价格解析引擎
// ==========================================
pub struct PricingResolver;

impl PricingResolver {
    /// 解析有效单价
    ///
    /// # 参数
    /// - item: 目录产品(含定价模式与档位)
    /// - quantity: 订购数量
    ///
    /// # 规则
    /// - FIXED: 直接返回 base_price,缺失则配置非法
    /// - TIERED: 在 min_quantity <= quantity 的档位中取 min_quantity 最大者;
    ///   数量低于最小档位则无适用档位
    pub fn resolve_price(item: &CatalogItem, quantity: i64) -> EngineResult<Decimal> {
        if quantity <= 0 {
            return Err(EngineError::InvalidQuantity { quantity });
        }

        match item.pricing_model {
            PricingModel::Fixed => item.base_price.ok_or_else(|| EngineError::InvalidCatalogItem {
                item_id: item.item_id.clone(),
                message: "固定价产品缺少 base_price".to_string(),
            }),
            PricingModel::Tiered => {
                // 档位数量唯一是目录侧不变式,这里仍以更低单价兜底平局
                let mut best: Option<(i64, Decimal)> = None;
                for tier in &item.price_tiers {
                    if tier.min_quantity > quantity {
                        continue;
                    }
                    best = match best {
                        None => Some((tier.min_quantity, tier.unit_price)),
                        Some((best_qty, best_price)) => {
                            if tier.min_quantity > best_qty
                                || (tier.min_quantity == best_qty && tier.unit_price < best_price)
                            {
                                Some((tier.min_quantity, tier.unit_price))
                            } else {
                                Some((best_qty, best_price))
                            }
                        }
                    };
                }
                best.map(|(_, price)| price)
                    .ok_or_else(|| EngineError::NoApplicableTier {
                        item_id: item.item_id.clone(),
                        quantity,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::PriceTier;
    use rust_decimal_macros::dec;

    fn tiered_item() -> CatalogItem {
        CatalogItem::tiered(
            "EQ-001",
            "液压成型机",
            vec![
                PriceTier {
                    min_quantity: 1,
                    unit_price: dec!(100),
                    price_type: None,
                },
                PriceTier {
                    min_quantity: 10,
                    unit_price: dec!(90),
                    price_type: None,
                },
                PriceTier {
                    min_quantity: 50,
                    unit_price: dec!(80),
                    price_type: Some("批量价".to_string()),
                },
            ],
        )
    }

    #[test]
    fn test_fixed_price() {
        let item = CatalogItem::fixed("EQ-002", "控制柜", dec!(12800));
        assert_eq!(PricingResolver::resolve_price(&item, 3).unwrap(), dec!(12800));
    }

    #[test]
    fn test_fixed_price_missing_base() {
        let mut item = CatalogItem::fixed("EQ-003", "配件包", dec!(1));
        item.base_price = None;
        let err = PricingResolver::resolve_price(&item, 1).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCatalogItem { .. }));
    }

    #[test]
    fn test_tiered_step_function() {
        let item = tiered_item();
        assert_eq!(PricingResolver::resolve_price(&item, 1).unwrap(), dec!(100));
        assert_eq!(PricingResolver::resolve_price(&item, 9).unwrap(), dec!(100));
        assert_eq!(PricingResolver::resolve_price(&item, 10).unwrap(), dec!(90));
        assert_eq!(PricingResolver::resolve_price(&item, 25).unwrap(), dec!(90));
        assert_eq!(PricingResolver::resolve_price(&item, 50).unwrap(), dec!(80));
        assert_eq!(PricingResolver::resolve_price(&item, 60).unwrap(), dec!(80));
    }

    #[test]
    fn test_quantity_below_lowest_tier() {
        let mut item = tiered_item();
        item.price_tiers.retain(|t| t.min_quantity >= 10);
        let err = PricingResolver::resolve_price(&item, 5).unwrap_err();
        assert!(matches!(err, EngineError::NoApplicableTier { .. }));
    }

    #[test]
    fn test_invalid_quantity() {
        let item = tiered_item();
        let err = PricingResolver::resolve_price(&item, 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuantity { quantity: 0 }));
        let err = PricingResolver::resolve_price(&item, -3).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuantity { quantity: -3 }));
    }
}
