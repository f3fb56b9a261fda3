// ==========================================
// 销售协同系统 - 商机项目 API
// ==========================================
// 职责: 项目创建、销售阶段推进、技术方案维护、转订单锁定
// 红线: 锁定后物料清单与定价字段不可修改; 失单为终态
// ==========================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::repositories::FlowRepositories;
use crate::domain::project::{BomEntry, CommercialProject, TechnicalItem};
use crate::domain::types::{EntityKind, ProjectStatus, Role, SequenceKind};
use crate::domain::Actor;
use crate::engine::audit::AuditRecorder;
use crate::engine::authorization::OwnershipPolicy;
use crate::engine::error::EngineError;
use crate::engine::workflow::{project_transition, ProjectAction};

// ==========================================
// CreateProjectInput
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub client_name: String,
    pub project_name: String,
}

// ==========================================
// ProjectApi - 商机项目 API
// ==========================================
pub struct ProjectApi {
    repos: FlowRepositories,
}

impl ProjectApi {
    pub fn new(repos: FlowRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按ID查询项目
    pub async fn get_project(&self, project_id: &str) -> ApiResult<CommercialProject> {
        self.repos
            .project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::not_found("CommercialProject", project_id))
    }

    /// 分页列表(可按状态过滤)
    pub async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<CommercialProject>> {
        Ok(self.repos.project_repo.list(
            status.map(|s| s.to_db_str()),
            limit,
            offset,
        )?)
    }

    /// 按状态分组统计
    pub async fn project_statistics(&self) -> ApiResult<Vec<(String, i64)>> {
        Ok(self.repos.project_repo.count_by_status()?)
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 创建项目(销售发起,创建人即归属销售)
    pub async fn create_project(
        &self,
        actor: &Actor,
        input: CreateProjectInput,
    ) -> ApiResult<CommercialProject> {
        if !matches!(actor.role, Role::Sales | Role::SalesManager | Role::Admin) {
            return Err(EngineError::Forbidden {
                reason: "仅销售角色可创建项目".to_string(),
            }
            .into());
        }
        if input.client_name.trim().is_empty() || input.project_name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "客户名称与项目名称不能为空".to_string(),
            ));
        }

        let now = Utc::now();
        let project_no = self
            .repos
            .sequence_repo
            .next_number(SequenceKind::Project, now.date_naive())?;

        let mut project = CommercialProject {
            project_id: Uuid::new_v4().to_string(),
            project_no: project_no.clone(),
            client_name: input.client_name,
            project_name: input.project_name,
            status: ProjectStatus::InitialContact,
            owner: actor.snapshot(),
            technical_assignee: None,
            technical_items: vec![],
            technical_version: 0,
            bom_snapshot: vec![],
            lost_reason: None,
            locked: false,
            locked_reason: None,
            locked_at: None,
            linked_order_id: None,
            operation_history: vec![],
            created_by: actor.snapshot(),
            created_at: now,
            updated_at: now,
        };
        project.operation_history.push(
            AuditRecorder::entry("CREATE_PROJECT", actor, "创建商机项目")
                .with_metadata(json!({ "project_no": project_no }))
                .build(),
        );

        self.repos.project_repo.insert(&project)?;
        info!(project_no = %project.project_no, actor = %actor.id, "商机项目已创建");
        Ok(project)
    }

    /// 推进销售阶段(逐级)
    pub async fn advance_stage(
        &self,
        actor: &Actor,
        project_id: &str,
    ) -> ApiResult<CommercialProject> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::Project, project_id)
            .await;

        let mut project = self.fetch(project_id)?;
        OwnershipPolicy::authorize(actor, &project).map_err(ApiError::from)?;

        let from = project.status;
        let to = project_transition(from, ProjectAction::AdvanceStage).ok_or_else(|| {
            EngineError::IllegalTransition {
                entity: EntityKind::Project.to_string(),
                from: from.to_string(),
                action: ProjectAction::AdvanceStage.as_str().to_string(),
            }
        })?;

        project.status = to;
        project.updated_at = Utc::now();
        project.operation_history.push(
            AuditRecorder::entry(
                ProjectAction::AdvanceStage.as_str(),
                actor,
                format!("销售阶段推进: {} → {}", from.label(), to.label()),
            )
            .with_transition(from, to)
            .build(),
        );
        self.repos.project_repo.update(&project)?;
        info!(project_no = %project.project_no, from = %from, to = %to, "销售阶段已推进");
        Ok(project)
    }

    /// 失单(终态,需填写原因)
    pub async fn mark_lost(
        &self,
        actor: &Actor,
        project_id: &str,
        reason: &str,
    ) -> ApiResult<CommercialProject> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::Project, project_id)
            .await;

        let mut project = self.fetch(project_id)?;
        OwnershipPolicy::authorize(actor, &project).map_err(ApiError::from)?;

        if reason.trim().is_empty() {
            return Err(EngineError::precondition("失单必须填写原因").into());
        }

        let from = project.status;
        let to = project_transition(from, ProjectAction::MarkLost).ok_or_else(|| {
            EngineError::IllegalTransition {
                entity: EntityKind::Project.to_string(),
                from: from.to_string(),
                action: ProjectAction::MarkLost.as_str().to_string(),
            }
        })?;

        project.status = to;
        project.lost_reason = Some(reason.to_string());
        project.updated_at = Utc::now();
        project.operation_history.push(
            AuditRecorder::entry(ProjectAction::MarkLost.as_str(), actor, "项目失单")
                .with_transition(from, to)
                .with_metadata(json!({ "reason": reason }))
                .build(),
        );
        self.repos.project_repo.update(&project)?;
        warn!(project_no = %project.project_no, reason = %reason, "项目已失单");
        Ok(project)
    }

    /// 指派技术支持
    pub async fn assign_technical_support(
        &self,
        actor: &Actor,
        project_id: &str,
        engineer: &Actor,
    ) -> ApiResult<CommercialProject> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::Project, project_id)
            .await;

        let mut project = self.fetch(project_id)?;
        OwnershipPolicy::authorize(actor, &project).map_err(ApiError::from)?;

        if project.status.is_terminal() {
            return Err(EngineError::precondition("失单项目不可再指派").into());
        }
        if engineer.role != Role::TechnicalSupport {
            return Err(ApiError::InvalidInput(
                "被指派人必须是技术支持角色".to_string(),
            ));
        }

        project.technical_assignee = Some(engineer.snapshot());
        project.updated_at = Utc::now();
        project.operation_history.push(
            AuditRecorder::entry("ASSIGN_TECHNICAL", actor, "指派技术支持")
                .with_metadata(json!({ "engineer_id": engineer.id, "engineer_name": engineer.name }))
                .build(),
        );
        self.repos.project_repo.update(&project)?;
        Ok(project)
    }

    /// 更新技术方案条目(版本号递增; 锁定后拒绝)
    pub async fn update_technical_items(
        &self,
        actor: &Actor,
        project_id: &str,
        items: Vec<TechnicalItem>,
    ) -> ApiResult<CommercialProject> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::Project, project_id)
            .await;

        let mut project = self.fetch(project_id)?;
        OwnershipPolicy::authorize(actor, &project).map_err(ApiError::from)?;

        if !project.commercial_terms_mutable() {
            return Err(EngineError::precondition("项目已锁定,技术方案不可修改").into());
        }

        project.technical_items = items;
        project.technical_version += 1;
        project.updated_at = Utc::now();
        project.operation_history.push(
            AuditRecorder::entry("UPDATE_TECHNICAL_ITEMS", actor, "更新技术方案")
                .with_metadata(json!({ "version": project.technical_version }))
                .build(),
        );
        self.repos.project_repo.update(&project)?;
        Ok(project)
    }

    /// 更新物料清单快照(锁定后拒绝)
    pub async fn update_bom(
        &self,
        actor: &Actor,
        project_id: &str,
        bom: Vec<BomEntry>,
    ) -> ApiResult<CommercialProject> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::Project, project_id)
            .await;

        let mut project = self.fetch(project_id)?;
        OwnershipPolicy::authorize(actor, &project).map_err(ApiError::from)?;

        if !project.commercial_terms_mutable() {
            return Err(EngineError::precondition("项目已锁定,物料清单不可修改").into());
        }

        project.bom_snapshot = bom;
        project.updated_at = Utc::now();
        project.operation_history.push(
            AuditRecorder::entry("UPDATE_BOM", actor, "更新物料清单").build(),
        );
        self.repos.project_repo.update(&project)?;
        Ok(project)
    }

    fn fetch(&self, project_id: &str) -> ApiResult<CommercialProject> {
        self.repos
            .project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::not_found("CommercialProject", project_id))
    }
}
