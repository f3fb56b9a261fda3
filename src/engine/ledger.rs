// ==========================================
// 销售协同系统 - 财务规则引擎
// ==========================================
// 职责: 行项目定价汇总,收款累计与收款状态派生
// 红线: payment_status 唯一事实来源是收款记录累计额,禁止独立设置
// ==========================================

use crate::domain::actor::Actor;
use crate::domain::catalog::CatalogItem;
use crate::domain::order::{OrderLineItem, PaymentInfo, PaymentRecord};
use crate::domain::types::{FulfillmentStatus, PaymentStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::pricing::PricingResolver;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// ==========================================
// Totals - 整单金额汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,   // 行项目小计
    pub tax_amount: Decimal, // 税额
    pub total: Decimal,      // 应收总额
}

// ==========================================
// FinancialLedger - 财务规则引擎
// ==========================================
pub struct FinancialLedger;

impl FinancialLedger {
    /// 按目录定价构建订单行项目
    ///
    /// 单价由价格引擎按行数量解析,行总价 = 单价 × 数量
    pub fn price_line(item: &CatalogItem, quantity: i64) -> EngineResult<OrderLineItem> {
        let unit_price = PricingResolver::resolve_price(item, quantity)?;
        Ok(OrderLineItem {
            item_id: item.item_id.clone(),
            name: item.name.clone(),
            quantity,
            unit_price,
            total_price: unit_price * Decimal::from(quantity),
            fulfillment: FulfillmentStatus::Pending,
        })
    }

    /// 计算整单金额
    ///
    /// # 规则
    /// - subtotal = Σ (unit_price × quantity)
    /// - tax_amount = subtotal × tax_rate / 100
    /// - total = subtotal + tax_amount + shipping_cost - discount
    /// - total < 0 时拒绝提交,调用方需调整输入
    pub fn compute_totals(
        line_items: &[OrderLineItem],
        tax_rate: Decimal,
        shipping_cost: Decimal,
        discount: Decimal,
    ) -> EngineResult<Totals> {
        let subtotal: Decimal = line_items
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum();
        let tax_amount = subtotal * tax_rate / Decimal::from(100);
        let total = subtotal + tax_amount + shipping_cost - discount;

        if total < Decimal::ZERO {
            return Err(EngineError::NegativeTotal {
                total: total.to_string(),
            });
        }

        Ok(Totals {
            subtotal,
            tax_amount,
            total,
        })
    }

    /// 登记一笔收款并重新派生收款状态
    ///
    /// 必须在订单的单记录写锁内调用,避免 paid_amount 丢失更新
    pub fn record_payment(
        payment: &mut PaymentInfo,
        total: Decimal,
        amount: Decimal,
        method: impl Into<String>,
        reference: Option<String>,
        received_on: NaiveDate,
        actor: &Actor,
    ) -> EngineResult<PaymentRecord> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidPaymentAmount {
                amount: amount.to_string(),
            });
        }

        let record = PaymentRecord {
            record_id: Uuid::new_v4().to_string(),
            amount,
            method: method.into(),
            reference,
            received_on,
            recorded_by: actor.snapshot(),
            recorded_at: Utc::now(),
        };

        payment.payment_records.push(record.clone());
        payment.paid_amount += amount;
        payment.payment_status = Self::derive_payment_status(payment.paid_amount, total);

        Ok(record)
    }

    /// 收款状态派生规则(唯一派生口径)
    ///
    /// - paid == 0          → 未收款
    /// - 0 < paid < total   → 部分收款
    /// - paid >= total      → 已收款
    pub fn derive_payment_status(paid_amount: Decimal, total: Decimal) -> PaymentStatus {
        if paid_amount <= Decimal::ZERO {
            PaymentStatus::Pending
        } else if paid_amount < total {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Paid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Role;
    use rust_decimal_macros::dec;

    fn line(unit_price: Decimal, quantity: i64) -> OrderLineItem {
        OrderLineItem {
            item_id: "EQ-001".to_string(),
            name: "液压成型机".to_string(),
            quantity,
            unit_price,
            total_price: unit_price * Decimal::from(quantity),
            fulfillment: FulfillmentStatus::Pending,
        }
    }

    fn commercial() -> Actor {
        Actor::new("u10", "王商务", Role::Commercial)
    }

    #[test]
    fn test_compute_totals() {
        let lines = vec![line(dec!(100), 3), line(dec!(50), 2)];
        let totals =
            FinancialLedger::compute_totals(&lines, dec!(13), dec!(20), dec!(10)).unwrap();
        assert_eq!(totals.subtotal, dec!(400));
        assert_eq!(totals.tax_amount, dec!(52));
        assert_eq!(totals.total, dec!(462));
    }

    #[test]
    fn test_negative_total_rejected() {
        let lines = vec![line(dec!(10), 1)];
        let err = FinancialLedger::compute_totals(&lines, dec!(0), dec!(0), dec!(100)).unwrap_err();
        assert!(matches!(err, EngineError::NegativeTotal { .. }));
    }

    #[test]
    fn test_payment_accumulation_and_derivation() {
        // 总额 1000: 300 + 400 → 部分收款, 再 300 → 已收款
        let mut payment = PaymentInfo::empty();
        let total = dec!(1000);
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let actor = commercial();

        FinancialLedger::record_payment(&mut payment, total, dec!(300), "电汇", None, today, &actor)
            .unwrap();
        assert_eq!(payment.paid_amount, dec!(300));
        assert_eq!(payment.payment_status, PaymentStatus::Partial);

        FinancialLedger::record_payment(&mut payment, total, dec!(400), "电汇", None, today, &actor)
            .unwrap();
        assert_eq!(payment.paid_amount, dec!(700));
        assert_eq!(payment.payment_status, PaymentStatus::Partial);

        FinancialLedger::record_payment(&mut payment, total, dec!(300), "承兑", None, today, &actor)
            .unwrap();
        assert_eq!(payment.paid_amount, dec!(1000));
        assert_eq!(payment.payment_status, PaymentStatus::Paid);
        assert_eq!(payment.payment_records.len(), 3);
    }

    #[test]
    fn test_payment_status_independent_of_order() {
        // 同一组金额不论到账顺序,派生结果一致
        let amounts = [dec!(700), dec!(200), dec!(100)];
        let total = dec!(1000);
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let actor = commercial();

        let mut forward = PaymentInfo::empty();
        for a in amounts {
            FinancialLedger::record_payment(&mut forward, total, a, "电汇", None, today, &actor)
                .unwrap();
        }
        let mut backward = PaymentInfo::empty();
        for a in amounts.iter().rev() {
            FinancialLedger::record_payment(&mut backward, total, *a, "电汇", None, today, &actor)
                .unwrap();
        }
        assert_eq!(forward.paid_amount, backward.paid_amount);
        assert_eq!(forward.payment_status, PaymentStatus::Paid);
        assert_eq!(backward.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_invalid_payment_amount() {
        let mut payment = PaymentInfo::empty();
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let err = FinancialLedger::record_payment(
            &mut payment,
            dec!(1000),
            dec!(0),
            "电汇",
            None,
            today,
            &commercial(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPaymentAmount { .. }));
        assert!(payment.payment_records.is_empty());
        assert_eq!(payment.paid_amount, Decimal::ZERO);
    }

    #[test]
    fn test_derivation_boundaries() {
        assert_eq!(
            FinancialLedger::derive_payment_status(dec!(0), dec!(100)),
            PaymentStatus::Pending
        );
        assert_eq!(
            FinancialLedger::derive_payment_status(dec!(99.99), dec!(100)),
            PaymentStatus::Partial
        );
        assert_eq!(
            FinancialLedger::derive_payment_status(dec!(100), dec!(100)),
            PaymentStatus::Paid
        );
        assert_eq!(
            FinancialLedger::derive_payment_status(dec!(120), dec!(100)),
            PaymentStatus::Paid
        );
    }
}
