// ==========================================
// 销售协同系统 - 生产单 API
// ==========================================
// 职责: 订单转生产、排期/开工/报检/质检、延期暂停分支
// 红线: 创建前置条件必须全额满足; 质检通过联动订单侧状态
// ==========================================

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::outcome::{PropagationOutcome, TransitionOutcome};
use crate::api::repositories::FlowRepositories;
use crate::domain::production::{ProductionOrder, ProductionSchedule};
use crate::domain::types::{
    ApprovalStatus, EntityKind, MaterialReadiness, OrderStatus, ProductionStatus, Role,
    SequenceKind,
};
use crate::domain::Actor;
use crate::engine::audit::AuditRecorder;
use crate::engine::authorization::OwnershipPolicy;
use crate::engine::error::EngineError;
use crate::engine::workflow::{order_transition, production_transition, OrderAction, ProductionAction};
use rust_decimal::Decimal;

// ==========================================
// ProductionApi - 生产单 API
// ==========================================
pub struct ProductionApi {
    repos: FlowRepositories,
}

impl ProductionApi {
    pub fn new(repos: FlowRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按ID查询生产单
    pub async fn get_production_order(&self, production_id: &str) -> ApiResult<ProductionOrder> {
        self.fetch(production_id)
    }

    /// 分页列表(可按状态过滤)
    pub async fn list_production_orders(
        &self,
        status: Option<ProductionStatus>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<ProductionOrder>> {
        Ok(self
            .repos
            .production_repo
            .list(status.map(|s| s.to_db_str()), limit, offset)?)
    }

    /// 按状态分组统计
    pub async fn production_statistics(&self) -> ApiResult<Vec<(String, i64)>> {
        Ok(self.repos.production_repo.count_by_status()?)
    }

    // ==========================================
    // 创建: 订单转生产
    // ==========================================

    /// 从已确认订单创建生产单
    ///
    /// 前置条件: 订单已确认、审批通过、已有收款(部分满足一律拒绝)。
    /// 创建成功后联动订单进入生产中; 联动失败不回滚生产单。
    pub async fn create_from_order(
        &self,
        actor: &Actor,
        order_id: &str,
    ) -> ApiResult<TransitionOutcome<ProductionOrder>> {
        if !matches!(
            actor.role,
            Role::Production | Role::ProductionManager | Role::Admin
        ) {
            return Err(EngineError::Forbidden {
                reason: "仅生产角色可创建生产单".to_string(),
            }
            .into());
        }

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, order_id)
            .await;

        let mut order = self
            .repos
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::not_found("SalesOrder", order_id))?;

        if order.status != OrderStatus::Confirmed {
            return Err(EngineError::precondition("订单未确认,不可投产").into());
        }
        if order.approval.status != ApprovalStatus::Approved {
            return Err(EngineError::precondition("订单未通过商务审批,不可投产").into());
        }
        if order.payment.paid_amount <= Decimal::ZERO {
            return Err(EngineError::precondition("订单未收到任何货款,不可投产").into());
        }
        if self
            .repos
            .production_repo
            .find_by_order(order_id)?
            .is_some()
        {
            return Err(ApiError::DuplicateLink {
                source_id: order_id.to_string(),
            });
        }

        let now = Utc::now();
        let production_no = self
            .repos
            .sequence_repo
            .next_number(SequenceKind::ProductionOrder, now.date_naive())?;

        let mut production = ProductionOrder {
            production_id: Uuid::new_v4().to_string(),
            production_no: production_no.clone(),
            order_id: order_id.to_string(),
            status: ProductionStatus::Pending,
            schedule: ProductionSchedule::empty(),
            progress: 0,
            material_readiness: MaterialReadiness::NotReady,
            logs: vec![],
            created_by: actor.snapshot(),
            created_at: now,
            updated_at: now,
        };
        production.logs.push(
            AuditRecorder::entry("CREATE_PRODUCTION", actor, "订单转生产单")
                .with_metadata(json!({
                    "production_no": production_no,
                    "order_no": order.order_no,
                }))
                .build(),
        );
        self.repos.production_repo.insert(&production)?;
        info!(production_no = %production.production_no, order_no = %order.order_no, "生产单已创建");

        // 联动: 订单进入生产中(持有订单写锁期间完成)
        let propagation = match order_transition(order.status, OrderAction::StartProduction) {
            Some(to) => {
                let from = order.status;
                order.status = to;
                order.production_order_id = Some(production.production_id.clone());
                order.updated_at = now;
                order.history.push(
                    AuditRecorder::entry(
                        OrderAction::StartProduction.as_str(),
                        actor,
                        "生产单已创建,订单进入生产中",
                    )
                    .with_transition(from, to)
                    .with_metadata(json!({ "production_no": production.production_no }))
                    .build(),
                );
                match self.repos.order_repo.update(&order) {
                    Ok(()) => PropagationOutcome::Applied {
                        target: order.order_no.clone(),
                    },
                    Err(e) => {
                        warn!(order_no = %order.order_no, error = %e, "订单联动失败");
                        PropagationOutcome::Failed {
                            target: order.order_no.clone(),
                            reason: e.to_string(),
                        }
                    }
                }
            }
            None => PropagationOutcome::Failed {
                target: order.order_no.clone(),
                reason: "订单当前状态无投产流转边".to_string(),
            },
        };

        Ok(TransitionOutcome {
            entity: production,
            propagation,
        })
    }

    // ==========================================
    // 生产侧流转
    // ==========================================

    /// 排产(设置计划起止日期)
    pub async fn schedule(
        &self,
        actor: &Actor,
        production_id: &str,
        planned_start: NaiveDate,
        planned_end: NaiveDate,
    ) -> ApiResult<ProductionOrder> {
        if planned_end < planned_start {
            return Err(ApiError::InvalidInput(
                "计划完工日期不得早于计划开工日期".to_string(),
            ));
        }

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        let to = self.require_edge(&production, ProductionAction::Schedule)?;
        let from = production.status;
        production.status = to;
        production.schedule.planned_start = Some(planned_start);
        production.schedule.planned_end = Some(planned_end);
        production.updated_at = Utc::now();
        production.logs.push(
            AuditRecorder::entry(ProductionAction::Schedule.as_str(), actor, "生产排期")
                .with_transition(from, to)
                .with_metadata(json!({
                    "planned_start": planned_start,
                    "planned_end": planned_end,
                }))
                .build(),
        );
        self.repos.production_repo.update(&production)?;
        Ok(production)
    }

    /// 开工(前置条件: 已齐料,部分齐料一律拒绝)
    pub async fn start(&self, actor: &Actor, production_id: &str) -> ApiResult<ProductionOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        let to = self.require_edge(&production, ProductionAction::Start)?;
        if production.material_readiness != MaterialReadiness::Ready {
            return Err(EngineError::precondition(format!(
                "物料未齐不可开工: 当前齐料状态 {}",
                production.material_readiness.label()
            ))
            .into());
        }

        let from = production.status;
        production.status = to;
        production.schedule.actual_start = Some(Utc::now().date_naive());
        production.updated_at = Utc::now();
        production.logs.push(
            AuditRecorder::entry(ProductionAction::Start.as_str(), actor, "生产开工")
                .with_transition(from, to)
                .build(),
        );
        self.repos.production_repo.update(&production)?;
        info!(production_no = %production.production_no, "生产已开工");
        Ok(production)
    }

    /// 更新生产进度(仅生产中,0-100)
    pub async fn update_progress(
        &self,
        actor: &Actor,
        production_id: &str,
        progress: u8,
    ) -> ApiResult<ProductionOrder> {
        if progress > 100 {
            return Err(ApiError::InvalidInput("进度百分比不得超过 100".to_string()));
        }

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        if production.status != ProductionStatus::InProduction {
            return Err(EngineError::precondition("仅生产中可更新进度").into());
        }

        let before = production.progress;
        production.progress = progress;
        production.updated_at = Utc::now();
        production.logs.push(
            AuditRecorder::entry("UPDATE_PROGRESS", actor, "更新生产进度")
                .with_metadata(json!({ "from": before, "to": progress }))
                .build(),
        );
        self.repos.production_repo.update(&production)?;
        Ok(production)
    }

    /// 更新齐料状态
    pub async fn update_material_readiness(
        &self,
        actor: &Actor,
        production_id: &str,
        readiness: MaterialReadiness,
    ) -> ApiResult<ProductionOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        if matches!(
            production.status,
            ProductionStatus::Completed | ProductionStatus::Cancelled
        ) {
            return Err(EngineError::precondition("终态生产单不可更新齐料状态").into());
        }

        let before = production.material_readiness;
        production.material_readiness = readiness;
        production.updated_at = Utc::now();
        production.logs.push(
            AuditRecorder::entry("UPDATE_MATERIAL_READINESS", actor, "更新齐料状态")
                .with_metadata(json!({
                    "from": before.to_string(),
                    "to": readiness.to_string(),
                }))
                .build(),
        );
        self.repos.production_repo.update(&production)?;
        Ok(production)
    }

    /// 报检(前置条件: 进度已达 100)
    pub async fn submit_qc(&self, actor: &Actor, production_id: &str) -> ApiResult<ProductionOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        let to = self.require_edge(&production, ProductionAction::SubmitQc)?;
        if production.progress < 100 {
            return Err(EngineError::precondition(format!(
                "生产进度未完成不可报检: 当前 {}%",
                production.progress
            ))
            .into());
        }

        let from = production.status;
        production.status = to;
        production.updated_at = Utc::now();
        production.logs.push(
            AuditRecorder::entry(ProductionAction::SubmitQc.as_str(), actor, "提交质检")
                .with_transition(from, to)
                .build(),
        );
        self.repos.production_repo.update(&production)?;
        Ok(production)
    }

    /// 质检通过,联动订单侧状态
    ///
    /// 锁序约定: 先订单后生产单,与订单侧联动方向一致,避免互相等待
    pub async fn pass_qc(
        &self,
        actor: &Actor,
        production_id: &str,
    ) -> ApiResult<TransitionOutcome<ProductionOrder>> {
        // order_id 创建后不变,锁外预读仅用于确定锁键
        let order_id = self.fetch(production_id)?.order_id;
        let _order_guard = self
            .repos
            .locks
            .acquire(EntityKind::SalesOrder, &order_id)
            .await;
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        let to = self.require_edge(&production, ProductionAction::PassQc)?;
        let from = production.status;
        production.status = to;
        production.updated_at = Utc::now();
        production.logs.push(
            AuditRecorder::entry(ProductionAction::PassQc.as_str(), actor, "质检通过")
                .with_transition(from, to)
                .build(),
        );
        self.repos.production_repo.update(&production)?;
        info!(production_no = %production.production_no, "质检通过");

        // 联动: 订单侧同步质检通过(第二次单实体写)
        let propagation = self.propagate_qc_passed(actor, &production).await;

        Ok(TransitionOutcome {
            entity: production,
            propagation,
        })
    }

    /// 标记延期(需填写原因)
    pub async fn mark_delayed(
        &self,
        actor: &Actor,
        production_id: &str,
        reason: &str,
    ) -> ApiResult<ProductionOrder> {
        if reason.trim().is_empty() {
            return Err(EngineError::precondition("延期必须填写原因").into());
        }
        self.branch_transition(
            actor,
            production_id,
            ProductionAction::MarkDelayed,
            "生产延期",
            Some(json!({ "reason": reason })),
        )
        .await
    }

    /// 暂停生产
    pub async fn pause(&self, actor: &Actor, production_id: &str) -> ApiResult<ProductionOrder> {
        self.branch_transition(actor, production_id, ProductionAction::Pause, "暂停生产", None)
            .await
    }

    /// 恢复生产
    pub async fn resume(&self, actor: &Actor, production_id: &str) -> ApiResult<ProductionOrder> {
        self.branch_transition(
            actor,
            production_id,
            ProductionAction::Resume,
            "恢复生产",
            None,
        )
        .await
    }

    /// 取消生产单(需填写原因)
    pub async fn cancel(
        &self,
        actor: &Actor,
        production_id: &str,
        reason: &str,
    ) -> ApiResult<ProductionOrder> {
        if reason.trim().is_empty() {
            return Err(EngineError::precondition("取消生产必须填写原因").into());
        }
        self.branch_transition(
            actor,
            production_id,
            ProductionAction::Cancel,
            "取消生产单",
            Some(json!({ "reason": reason })),
        )
        .await
    }

    /// 完成生产单(发货后收尾)
    pub async fn complete(&self, actor: &Actor, production_id: &str) -> ApiResult<ProductionOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        let to = self.require_edge(&production, ProductionAction::Complete)?;
        let from = production.status;
        production.status = to;
        production.schedule.actual_end = Some(Utc::now().date_naive());
        production.updated_at = Utc::now();
        production.logs.push(
            AuditRecorder::entry(ProductionAction::Complete.as_str(), actor, "生产单完成")
                .with_transition(from, to)
                .build(),
        );
        self.repos.production_repo.update(&production)?;
        Ok(production)
    }

    // ==========================================
    // 内部工具
    // ==========================================

    /// 分支流转(延期/暂停/恢复/取消)
    async fn branch_transition(
        &self,
        actor: &Actor,
        production_id: &str,
        action: ProductionAction,
        description: &str,
        metadata: Option<serde_json::Value>,
    ) -> ApiResult<ProductionOrder> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ProductionOrder, production_id)
            .await;

        let mut production = self.fetch(production_id)?;
        OwnershipPolicy::authorize(actor, &production).map_err(ApiError::from)?;

        let to = self.require_edge(&production, action)?;
        let from = production.status;
        production.status = to;
        production.updated_at = Utc::now();
        let mut builder = AuditRecorder::entry(action.as_str(), actor, description)
            .with_transition(from, to);
        if let Some(meta) = metadata {
            builder = builder.with_metadata(meta);
        }
        production.logs.push(builder.build());
        self.repos.production_repo.update(&production)?;
        Ok(production)
    }

    /// 查流转表,无边即非法流转
    fn require_edge(
        &self,
        production: &ProductionOrder,
        action: ProductionAction,
    ) -> ApiResult<ProductionStatus> {
        production_transition(production.status, action).ok_or_else(|| {
            EngineError::IllegalTransition {
                entity: EntityKind::ProductionOrder.to_string(),
                from: production.status.to_string(),
                action: action.as_str().to_string(),
            }
            .into()
        })
    }

    /// 质检通过联动订单(失败不回滚生产侧流转)
    ///
    /// 调用方已按锁序持有订单写锁
    async fn propagate_qc_passed(
        &self,
        actor: &Actor,
        production: &ProductionOrder,
    ) -> PropagationOutcome {
        let result = (|| -> ApiResult<String> {
            let mut order = self
                .repos
                .order_repo
                .find_by_id(&production.order_id)?
                .ok_or_else(|| ApiError::not_found("SalesOrder", &production.order_id))?;

            let from = order.status;
            let to = order_transition(from, OrderAction::PassQc).ok_or_else(|| {
                ApiError::from(EngineError::IllegalTransition {
                    entity: EntityKind::SalesOrder.to_string(),
                    from: from.to_string(),
                    action: OrderAction::PassQc.as_str().to_string(),
                })
            })?;

            order.status = to;
            order.updated_at = Utc::now();
            order.history.push(
                AuditRecorder::entry(
                    OrderAction::PassQc.as_str(),
                    actor,
                    "生产侧联动: 质检通过",
                )
                .with_transition(from, to)
                .with_metadata(json!({ "production_no": production.production_no }))
                .build(),
            );
            self.repos.order_repo.update(&order)?;
            Ok(order.order_no)
        })();

        match result {
            Ok(no) => PropagationOutcome::Applied { target: no },
            Err(e) => {
                warn!(production_no = %production.production_no, error = %e, "订单联动失败");
                PropagationOutcome::Failed {
                    target: production.order_id.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn fetch(&self, production_id: &str) -> ApiResult<ProductionOrder> {
        self.repos
            .production_repo
            .find_by_id(production_id)?
            .ok_or_else(|| ApiError::not_found("ProductionOrder", production_id))
    }
}
