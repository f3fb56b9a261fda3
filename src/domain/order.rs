// ==========================================
// 销售协同系统 - 销售订单领域模型
// ==========================================
// 职责: 赢单项目转出的正式订单,承载定价/收款/发运记录
// 红线: payment_records 与 shipments 只追加; payment_status 只能派生
// ==========================================

use crate::domain::actor::ActorSnapshot;
use crate::domain::audit::AuditEntry;
use crate::domain::types::{ApprovalStatus, FulfillmentStatus, OrderStatus, PaymentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderLineItem - 订单行项目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub item_id: String,                // 目录产品ID
    pub name: String,                   // 产品名称(创建时点快照)
    pub quantity: i64,                  // 数量
    pub unit_price: Decimal,            // 单价(由价格引擎解析)
    pub total_price: Decimal,           // 行总价 = 单价 × 数量
    pub fulfillment: FulfillmentStatus, // 行履约子状态
}

// ==========================================
// FinancialInfo - 财务块
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialInfo {
    pub tax_rate: Decimal,      // 税率(百分比,如 13 表示 13%)
    pub shipping_cost: Decimal, // 运费
    pub discount: Decimal,      // 整单折扣额
    pub subtotal: Decimal,      // 行项目小计
    pub tax_amount: Decimal,    // 税额
    pub total: Decimal,         // 应收总额
}

// ==========================================
// PaymentRecord - 收款记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub record_id: String,          // 记录ID
    pub amount: Decimal,            // 收款金额(> 0)
    pub method: String,             // 收款方式(电汇/承兑/...)
    pub reference: Option<String>,  // 凭证号
    pub received_on: NaiveDate,     // 到账日期
    pub recorded_by: ActorSnapshot, // 登记人快照
    pub recorded_at: DateTime<Utc>, // 登记时间
}

// ==========================================
// PaymentInfo - 收款块
// ==========================================
// paid_amount 单调递增,payment_status 由累计金额派生
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub payment_records: Vec<PaymentRecord>, // 收款记录(只追加)
    pub paid_amount: Decimal,                // 累计已收
    pub payment_status: PaymentStatus,       // 派生收款状态
    pub final_payment_confirmed: bool,       // 尾款确认标志(发货前置条件)
}

impl PaymentInfo {
    pub fn empty() -> Self {
        Self {
            payment_records: vec![],
            paid_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            final_payment_confirmed: false,
        }
    }
}

// ==========================================
// ApprovalInfo - 审批块
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalInfo {
    pub status: ApprovalStatus,             // 审批状态
    pub approver: Option<ActorSnapshot>,    // 审批人快照
    pub decided_at: Option<DateTime<Utc>>,  // 审批时间
    pub comment: Option<String>,            // 审批意见
}

impl ApprovalInfo {
    pub fn pending() -> Self {
        Self {
            status: ApprovalStatus::Pending,
            approver: None,
            decided_at: None,
            comment: None,
        }
    }
}

// ==========================================
// ShipmentRecord - 发运记录
// ==========================================
// 批次号按订单内顺序编号,追加后不可变更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub batch_no: i32,              // 订单内批次序号(从 1 起)
    pub tracking_no: String,        // 运单号
    pub carrier: Option<String>,    // 承运商
    pub shipped_on: NaiveDate,      // 发运日期
    pub shipped_by: ActorSnapshot,  // 操作人快照
    pub recorded_at: DateTime<Utc>, // 登记时间
}

// ==========================================
// ProjectSnapshot - 项目快照
// ==========================================
// 订单创建时点的客户/项目名冗余,创建后不可变更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project_no: String,   // 项目展示编号
    pub client_name: String,  // 客户名称
    pub project_name: String, // 项目名称
}

// ==========================================
// SalesOrder - 销售订单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrder {
    pub order_id: String,                  // 内部ID
    pub order_no: String,                  // 展示编号 (SO 前缀)
    pub project_id: String,                // 来源项目(1:1)
    pub project_snapshot: ProjectSnapshot, // 项目快照(不可变)
    pub status: OrderStatus,               // 订单状态
    pub line_items: Vec<OrderLineItem>,    // 行项目
    pub financial: FinancialInfo,          // 财务块
    pub payment: PaymentInfo,              // 收款块
    pub approval: ApprovalInfo,            // 审批块
    pub shipments: Vec<ShipmentRecord>,    // 发运记录(只追加)
    pub production_order_id: Option<String>, // 关联生产单
    pub history: Vec<AuditEntry>,          // 操作历史(只追加)
    pub created_by: ActorSnapshot,         // 创建人快照
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalesOrder {
    /// 下一个发运批次号
    pub fn next_shipment_batch_no(&self) -> i32 {
        self.shipments.len() as i32 + 1
    }
}
