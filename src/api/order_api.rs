// ==========================================
// 销售协同系统 - 销售订单 API
// ==========================================
// 职责: 项目转订单、审批确认、收款登记、发货与联动
// 红线: 一项目一订单; 转订单即锁定项目; 联动失败显式上报
// ==========================================

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::outcome::{PropagationOutcome, TransitionOutcome};
use crate::api::repositories::FlowRepositories;
use crate::domain::order::{
    ApprovalInfo, FinancialInfo, PaymentInfo, ProjectSnapshot, SalesOrder, ShipmentRecord,
};
use crate::domain::types::{
    ApprovalStatus, EntityKind, FulfillmentStatus, OrderStatus, ProjectStatus, Role, SequenceKind,
};
use crate::domain::Actor;
use crate::engine::audit::AuditRecorder;
use crate::engine::authorization::OwnershipPolicy;
use crate::engine::error::EngineError;
use crate::engine::ledger::FinancialLedger;
use crate::engine::workflow::{order_transition, production_transition, OrderAction, ProductionAction};

// ==========================================
// CreateOrderInput
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderInput {
    pub lines: Vec<OrderLineInput>,
    pub tax_rate: Decimal,      // 税率(百分比)
    pub shipping_cost: Decimal, // 运费
    pub discount: Decimal,      // 整单折扣额
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub item_id: String,
    pub quantity: i64,
}

// ==========================================
// ShipOrderInput
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipOrderInput {
    pub tracking_no: String,
    pub carrier: Option<String>,
    pub shipped_on: NaiveDate,
}

// ==========================================
// OrderApi - 销售订单 API
// ==========================================
pub struct OrderApi {
    repos: FlowRepositories,
}

impl OrderApi {
    pub fn new(repos: FlowRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按ID查询订单
    pub async fn get_order(&self, order_id: &str) -> ApiResult<SalesOrder> {
        self.fetch(order_id)
    }

    /// 分页列表(可按状态过滤)
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<SalesOrder>> {
        Ok(self
            .repos
            .order_repo
            .list(status.map(|s| s.to_db_str()), limit, offset)?)
    }

    /// 按状态分组统计
    pub async fn order_statistics(&self) -> ApiResult<Vec<(String, i64)>> {
        Ok(self.repos.order_repo.count_by_status()?)
    }

    // ==========================================
    // 创建: 项目转订单
    // ==========================================

    /// 从赢单项目创建订单
    ///
    /// 前置条件: 项目状态为赢单,且尚未关联订单(一项目一订单)。
    /// 订单创建成功后锁定项目; 锁定写入失败不回滚订单,在联动结果中上报。
    pub async fn create_from_project(
        &self,
        actor: &Actor,
        project_id: &str,
        input: CreateOrderInput,
    ) -> ApiResult<TransitionOutcome<SalesOrder>> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::Project, project_id)
            .await;

        let mut project = self
            .repos
            .project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::not_found("CommercialProject", project_id))?;
        OwnershipPolicy::authorize(actor, &project).map_err(ApiError::from)?;

        if project.status != ProjectStatus::Won {
            return Err(EngineError::precondition("仅赢单项目可转订单").into());
        }
        if project.linked_order_id.is_some()
            || self.repos.order_repo.find_by_project(project_id)?.is_some()
        {
            return Err(ApiError::DuplicateLink {
                source_id: project_id.to_string(),
            });
        }
        if input.lines.is_empty() {
            return Err(ApiError::InvalidInput("订单至少包含一个行项目".to_string()));
        }

        // 行项目定价: 单价由价格引擎按数量解析
        let mut line_items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item = self
                .repos
                .catalog_repo
                .find_by_id(&line.item_id)?
                .ok_or_else(|| ApiError::not_found("CatalogItem", &line.item_id))?;
            line_items.push(FinancialLedger::price_line(&item, line.quantity)?);
        }
        let totals = FinancialLedger::compute_totals(
            &line_items,
            input.tax_rate,
            input.shipping_cost,
            input.discount,
        )?;

        let now = Utc::now();
        let order_no = self
            .repos
            .sequence_repo
            .next_number(SequenceKind::SalesOrder, now.date_naive())?;

        let mut order = SalesOrder {
            order_id: Uuid::new_v4().to_string(),
            order_no: order_no.clone(),
            project_id: project_id.to_string(),
            project_snapshot: ProjectSnapshot {
                project_no: project.project_no.clone(),
                client_name: project.client_name.clone(),
                project_name: project.project_name.clone(),
            },
            status: OrderStatus::Pending,
            line_items,
            financial: FinancialInfo {
                tax_rate: input.tax_rate,
                shipping_cost: input.shipping_cost,
                discount: input.discount,
                subtotal: totals.subtotal,
                tax_amount: totals.tax_amount,
                total: totals.total,
            },
            payment: PaymentInfo::empty(),
            approval: ApprovalInfo::pending(),
            shipments: vec![],
            production_order_id: None,
            history: vec![],
            created_by: actor.snapshot(),
            created_at: now,
            updated_at: now,
        };
        order.history.push(
            AuditRecorder::entry("CREATE_ORDER", actor, "项目转销售订单")
                .with_metadata(json!({
                    "order_no": order_no,
                    "project_no": project.project_no,
                    "total": order.financial.total.to_string(),
                }))
                .build(),
        );
        self.repos.order_repo.insert(&order)?;
        info!(order_no = %order.order_no, project_no = %project.project_no, "销售订单已创建");

        // 联动: 锁定项目(订单创建的必然副作用)
        project.locked = true;
        project.locked_at = Some(now);
        project.locked_reason = Some(format!("已转销售订单 {}", order.order_no));
        project.linked_order_id = Some(order.order_id.clone());
        project.updated_at = now;
        project.operation_history.push(
            AuditRecorder::entry("LOCK_FOR_ORDER", actor, "项目转订单,商务条款锁定")
                .with_metadata(json!({ "order_no": order.order_no }))
                .build(),
        );
        let propagation = match self.repos.project_repo.update(&project) {
            Ok(()) => PropagationOutcome::Applied {
                target: project.project_no.clone(),
            },
            Err(e) => {
                warn!(project_no = %project.project_no, error = %e, "项目锁定联动失败");
                PropagationOutcome::Failed {
                    target: project.project_no.clone(),
                    reason: e.to_string(),
                }
            }
        };

        Ok(TransitionOutcome {
            entity: order,
            propagation,
        })
    }

    // ==========================================
    // 审批
    // ==========================================

    /// 商务审批通过
    pub async fn approve(
        &self,
        actor: &Actor,
        order_id: &str,
        comment: Option<String>,
    ) -> ApiResult<SalesOrder> {
        self.decide_approval(actor, order_id, ApprovalStatus::Approved, comment)
            .await
    }

    /// 商务审批驳回
    pub async fn reject(
        &self,
        actor: &Actor,
        order_id: &str,
        comment: Option<String>,
    ) -> ApiResult<SalesOrder> {
        self.decide_approval(actor, order_id, ApprovalStatus::Rejected, comment)
            .await
    }

    async fn decide_approval(
        &self,
        actor: &Actor,
        order_id: &str,
        decision: ApprovalStatus,
        comment: Option<String>,
    ) -> ApiResult<SalesOrder> {
        if !matches!(actor.role, Role::Commercial | Role::Admin) {
            return Err(EngineError::Forbidden {
                reason: "仅商务角色可审批订单".to_string(),
            }
            .into());
        }

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self.fetch(order_id)?;
        if order.approval.status != ApprovalStatus::Pending {
            return Err(EngineError::precondition("订单审批已定稿,不可重复审批").into());
        }

        let now = Utc::now();
        order.approval = ApprovalInfo {
            status: decision,
            approver: Some(actor.snapshot()),
            decided_at: Some(now),
            comment: comment.clone(),
        };
        order.updated_at = now;
        let operation = match decision {
            ApprovalStatus::Approved => "APPROVE_ORDER",
            _ => "REJECT_ORDER",
        };
        order.history.push(
            AuditRecorder::entry(operation, actor, format!("商务审批: {}", decision))
                .with_metadata(json!({ "comment": comment }))
                .build(),
        );
        self.repos.order_repo.update(&order)?;
        Ok(order)
    }

    // ==========================================
    // 状态流转
    // ==========================================

    /// 确认订单(前置条件: 审批已通过)
    pub async fn confirm(&self, actor: &Actor, order_id: &str) -> ApiResult<SalesOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self.fetch(order_id)?;
        OwnershipPolicy::authorize(actor, &order).map_err(ApiError::from)?;

        let to = self.require_edge(&order, OrderAction::Confirm)?;
        if order.approval.status != ApprovalStatus::Approved {
            return Err(EngineError::precondition("订单未通过商务审批").into());
        }

        let from = order.status;
        order.status = to;
        order.updated_at = Utc::now();
        order.history.push(
            AuditRecorder::entry(OrderAction::Confirm.as_str(), actor, "确认订单")
                .with_transition(from, to)
                .build(),
        );
        self.repos.order_repo.update(&order)?;
        info!(order_no = %order.order_no, "订单已确认");
        Ok(order)
    }

    /// 登记收款(在订单写锁内追加,重新派生收款状态)
    pub async fn record_payment(
        &self,
        actor: &Actor,
        order_id: &str,
        amount: Decimal,
        method: &str,
        reference: Option<String>,
        received_on: NaiveDate,
    ) -> ApiResult<SalesOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self.fetch(order_id)?;
        OwnershipPolicy::authorize(actor, &order).map_err(ApiError::from)?;

        if matches!(order.status, OrderStatus::Cancelled) {
            return Err(EngineError::precondition("已取消订单不可登记收款").into());
        }

        let total = order.financial.total;
        let record = FinancialLedger::record_payment(
            &mut order.payment,
            total,
            amount,
            method,
            reference,
            received_on,
            actor,
        )?;
        order.updated_at = Utc::now();
        order.history.push(
            AuditRecorder::entry("RECORD_PAYMENT", actor, "登记收款")
                .with_metadata(json!({
                    "record_id": record.record_id,
                    "amount": amount.to_string(),
                    "method": method,
                    "paid_amount": order.payment.paid_amount.to_string(),
                    "payment_status": order.payment.payment_status.to_string(),
                }))
                .build(),
        );
        self.repos.order_repo.update(&order)?;
        info!(
            order_no = %order.order_no,
            amount = %amount,
            paid = %order.payment.paid_amount,
            status = %order.payment.payment_status,
            "收款已登记"
        );
        Ok(order)
    }

    /// 确认尾款(前置条件: 货款已全额到账,部分到账一律拒绝)
    pub async fn confirm_final_payment(
        &self,
        actor: &Actor,
        order_id: &str,
    ) -> ApiResult<SalesOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self.fetch(order_id)?;
        OwnershipPolicy::authorize(actor, &order).map_err(ApiError::from)?;

        if order.payment.paid_amount < order.financial.total {
            return Err(EngineError::precondition(format!(
                "货款未全额到账: 已收 {} / 应收 {}",
                order.payment.paid_amount, order.financial.total
            ))
            .into());
        }

        order.payment.final_payment_confirmed = true;
        order.updated_at = Utc::now();
        order.history.push(
            AuditRecorder::entry("CONFIRM_FINAL_PAYMENT", actor, "确认尾款到账").build(),
        );
        self.repos.order_repo.update(&order)?;
        Ok(order)
    }

    /// 转待发货(前置条件: 尾款已确认),联动生产单
    pub async fn mark_ready_to_ship(
        &self,
        actor: &Actor,
        order_id: &str,
    ) -> ApiResult<TransitionOutcome<SalesOrder>> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self.fetch(order_id)?;
        OwnershipPolicy::authorize(actor, &order).map_err(ApiError::from)?;

        let to = self.require_edge(&order, OrderAction::MarkReadyToShip)?;
        if !order.payment.final_payment_confirmed {
            return Err(EngineError::precondition("尾款未确认,不可转待发货").into());
        }

        let from = order.status;
        order.status = to;
        order.updated_at = Utc::now();
        order.history.push(
            AuditRecorder::entry(OrderAction::MarkReadyToShip.as_str(), actor, "订单转待发货")
                .with_transition(from, to)
                .build(),
        );
        self.repos.order_repo.update(&order)?;

        let propagation = self
            .propagate_to_production(
                actor,
                &order,
                ProductionAction::MarkReadyToShip,
                "订单侧联动: 转待发货",
            )
            .await;

        Ok(TransitionOutcome {
            entity: order,
            propagation,
        })
    }

    /// 发货(前置条件: 运单号非空),追加发运批次并联动生产单
    pub async fn ship(
        &self,
        actor: &Actor,
        order_id: &str,
        input: ShipOrderInput,
    ) -> ApiResult<TransitionOutcome<SalesOrder>> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self.fetch(order_id)?;
        OwnershipPolicy::authorize(actor, &order).map_err(ApiError::from)?;

        let to = self.require_edge(&order, OrderAction::Ship)?;
        if input.tracking_no.trim().is_empty() {
            return Err(EngineError::precondition("发货必须提供运单号").into());
        }

        let from = order.status;
        let batch_no = order.next_shipment_batch_no();
        order.shipments.push(ShipmentRecord {
            batch_no,
            tracking_no: input.tracking_no.clone(),
            carrier: input.carrier.clone(),
            shipped_on: input.shipped_on,
            shipped_by: actor.snapshot(),
            recorded_at: Utc::now(),
        });
        for line in &mut order.line_items {
            line.fulfillment = FulfillmentStatus::Shipped;
        }
        order.status = to;
        order.updated_at = Utc::now();
        order.history.push(
            AuditRecorder::entry(OrderAction::Ship.as_str(), actor, "订单发货")
                .with_transition(from, to)
                .with_metadata(json!({
                    "batch_no": batch_no,
                    "tracking_no": input.tracking_no,
                    "carrier": input.carrier,
                }))
                .build(),
        );
        self.repos.order_repo.update(&order)?;
        info!(order_no = %order.order_no, tracking_no = %input.tracking_no, "订单已发货");

        let propagation = self
            .propagate_to_production(
                actor,
                &order,
                ProductionAction::MarkShipped,
                "订单侧联动: 已发货",
            )
            .await;

        Ok(TransitionOutcome {
            entity: order,
            propagation,
        })
    }

    /// 完成订单
    pub async fn complete(&self, actor: &Actor, order_id: &str) -> ApiResult<SalesOrder> {
        self.simple_transition(actor, order_id, OrderAction::Complete, "订单完成")
            .await
    }

    /// 取消订单
    pub async fn cancel(&self, actor: &Actor, order_id: &str) -> ApiResult<SalesOrder> {
        self.simple_transition(actor, order_id, OrderAction::Cancel, "取消订单")
            .await
    }

    /// 删除订单(仅限待确认或已取消状态)
    pub async fn delete_order(&self, actor: &Actor, order_id: &str) -> ApiResult<()> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let order = self.fetch(order_id)?;
        OwnershipPolicy::authorize(actor, &order).map_err(ApiError::from)?;

        if !order.status.deletable() {
            return Err(EngineError::precondition(format!(
                "当前状态不允许删除订单: {}",
                order.status.label()
            ))
            .into());
        }

        self.repos.order_repo.delete(order_id)?;
        warn!(order_no = %order.order_no, actor = %actor.id, "订单已删除");
        Ok(())
    }

    // ==========================================
    // 内部工具
    // ==========================================

    /// 无前置条件、无联动的通用流转
    async fn simple_transition(
        &self,
        actor: &Actor,
        order_id: &str,
        action: OrderAction,
        description: &str,
    ) -> ApiResult<SalesOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self.fetch(order_id)?;
        OwnershipPolicy::authorize(actor, &order).map_err(ApiError::from)?;

        let to = self.require_edge(&order, action)?;
        let from = order.status;
        order.status = to;
        order.updated_at = Utc::now();
        order.history.push(
            AuditRecorder::entry(action.as_str(), actor, description)
                .with_transition(from, to)
                .build(),
        );
        self.repos.order_repo.update(&order)?;
        Ok(order)
    }

    /// 查流转表,无边即非法流转
    fn require_edge(&self, order: &SalesOrder, action: OrderAction) -> ApiResult<OrderStatus> {
        order_transition(order.status, action)
            .ok_or_else(|| {
                EngineError::IllegalTransition {
                    entity: EntityKind::SalesOrder.to_string(),
                    from: order.status.to_string(),
                    action: action.as_str().to_string(),
                }
                .into()
            })
    }

    /// 订单侧事件联动生产单(第二次单实体写,失败不回滚主流转)
    async fn propagate_to_production(
        &self,
        actor: &Actor,
        order: &SalesOrder,
        action: ProductionAction,
        description: &str,
    ) -> PropagationOutcome {
        let production_id = match &order.production_order_id {
            Some(id) => id.clone(),
            None => {
                warn!(order_no = %order.order_no, "订单未关联生产单,联动跳过");
                return PropagationOutcome::Failed {
                    target: "-".to_string(),
                    reason: "订单未关联生产单".to_string(),
                };
            }
        };

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, &production_id)
            .await;

        let result = (|| -> ApiResult<String> {
            let mut production = self
                .repos
                .production_repo
                .find_by_id(&production_id)?
                .ok_or_else(|| ApiError::not_found("ProductionOrder", &production_id))?;

            let from = production.status;
            let to = production_transition(from, action).ok_or_else(|| {
                ApiError::from(EngineError::IllegalTransition {
                    entity: EntityKind::ProductionOrder.to_string(),
                    from: from.to_string(),
                    action: action.as_str().to_string(),
                })
            })?;

            production.status = to;
            production.updated_at = Utc::now();
            production.logs.push(
                AuditRecorder::entry(action.as_str(), actor, description)
                    .with_transition(from, to)
                    .with_metadata(json!({ "order_no": order.order_no }))
                    .build(),
            );
            self.repos.production_repo.update(&production)?;
            Ok(production.production_no)
        })();

        match result {
            Ok(no) => PropagationOutcome::Applied { target: no },
            Err(e) => {
                warn!(order_no = %order.order_no, error = %e, "生产单联动失败");
                PropagationOutcome::Failed {
                    target: production_id,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn fetch(&self, order_id: &str) -> ApiResult<SalesOrder> {
        self.repos
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::not_found("SalesOrder", order_id))
    }
}
