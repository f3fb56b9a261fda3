// ==========================================
// 销售协同系统 - 归属权限引擎
// ==========================================
// 职责: 判定操作人对实体实例的操作资格
// 红线: 权限判定先于一切状态/财务变更,拒绝即短路,不产生部分效果
// ==========================================

use crate::domain::order::SalesOrder;
use crate::domain::production::ProductionOrder;
use crate::domain::project::CommercialProject;
use crate::domain::ticket::ServiceTicket;
use crate::domain::types::{EntityKind, Role};
use crate::domain::Actor;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// OwnedEntity - 归属元数据接口
// ==========================================
// 实体只需暴露类别与三个关系字段,判定逻辑集中在引擎
pub trait OwnedEntity {
    /// 实体类别(决定角色直通域)
    fn kind(&self) -> EntityKind;

    /// 创建人ID
    fn creator_id(&self) -> &str;

    /// 归属人ID(如项目归属销售)
    fn owner_id(&self) -> Option<&str>;

    /// 受理/指派人ID
    fn assignee_id(&self) -> Option<&str>;
}

impl OwnedEntity for CommercialProject {
    fn kind(&self) -> EntityKind {
        EntityKind::Project
    }
    fn creator_id(&self) -> &str {
        &self.created_by.id
    }
    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner.id)
    }
    fn assignee_id(&self) -> Option<&str> {
        self.technical_assignee.as_ref().map(|a| a.id.as_str())
    }
}

impl OwnedEntity for SalesOrder {
    fn kind(&self) -> EntityKind {
        EntityKind::SalesOrder
    }
    fn creator_id(&self) -> &str {
        &self.created_by.id
    }
    fn owner_id(&self) -> Option<&str> {
        None
    }
    fn assignee_id(&self) -> Option<&str> {
        None
    }
}

impl OwnedEntity for ProductionOrder {
    fn kind(&self) -> EntityKind {
        EntityKind::ProductionOrder
    }
    fn creator_id(&self) -> &str {
        &self.created_by.id
    }
    fn owner_id(&self) -> Option<&str> {
        None
    }
    fn assignee_id(&self) -> Option<&str> {
        None
    }
}

impl OwnedEntity for ServiceTicket {
    fn kind(&self) -> EntityKind {
        EntityKind::ServiceTicket
    }
    fn creator_id(&self) -> &str {
        &self.created_by.id
    }
    fn owner_id(&self) -> Option<&str> {
        None
    }
    fn assignee_id(&self) -> Option<&str> {
        self.assigned_to.as_ref().map(|a| a.id.as_str())
    }
}

// ==========================================
// OwnershipPolicy - 归属权限引擎
// ==========================================
pub struct OwnershipPolicy;

impl OwnershipPolicy {
    /// 判定操作资格
    ///
    /// # 规则(依次短路)
    /// 1. 管理员恒通过
    /// 2. 域经理对本域实体类别恒通过
    /// 3. 操作人ID命中创建人/归属人/受理人任一关系字段则通过
    /// 4. 否则拒绝 ownership_violation
    pub fn authorize(actor: &Actor, entity: &dyn OwnedEntity) -> EngineResult<()> {
        if actor.role == Role::Admin {
            return Ok(());
        }

        if Self::domain_manager_bypass(actor.role, entity.kind()) {
            return Ok(());
        }

        let id = actor.id.as_str();
        let related = id == entity.creator_id()
            || entity.owner_id() == Some(id)
            || entity.assignee_id() == Some(id);
        if related {
            return Ok(());
        }

        Err(EngineError::Forbidden {
            reason: "ownership_violation".to_string(),
        })
    }

    /// 域经理直通: 对本域实体类别不要求关系字段命中
    fn domain_manager_bypass(role: Role, kind: EntityKind) -> bool {
        matches!(
            (role, kind),
            (Role::SalesManager, EntityKind::Project)
                | (Role::SalesManager, EntityKind::SalesOrder)
                | (Role::ProductionManager, EntityKind::ProductionOrder)
                | (Role::AfterSalesManager, EntityKind::ServiceTicket)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeEntity {
        kind: EntityKind,
        creator: String,
        owner: Option<String>,
        assignee: Option<String>,
    }

    impl OwnedEntity for FakeEntity {
        fn kind(&self) -> EntityKind {
            self.kind
        }
        fn creator_id(&self) -> &str {
            &self.creator
        }
        fn owner_id(&self) -> Option<&str> {
            self.owner.as_deref()
        }
        fn assignee_id(&self) -> Option<&str> {
            self.assignee.as_deref()
        }
    }

    fn project_entity() -> FakeEntity {
        FakeEntity {
            kind: EntityKind::Project,
            creator: "u01".to_string(),
            owner: Some("u02".to_string()),
            assignee: Some("u03".to_string()),
        }
    }

    #[test]
    fn test_admin_always_allowed() {
        let admin = Actor::new("u99", "管理员", Role::Admin);
        assert!(OwnershipPolicy::authorize(&admin, &project_entity()).is_ok());
    }

    #[test]
    fn test_relation_match_allowed() {
        let entity = project_entity();
        for id in ["u01", "u02", "u03"] {
            let actor = Actor::new(id, "someone", Role::Sales);
            assert!(OwnershipPolicy::authorize(&actor, &entity).is_ok());
        }
    }

    #[test]
    fn test_unrelated_actor_denied() {
        let outsider = Actor::new("u42", "路人", Role::Sales);
        let err = OwnershipPolicy::authorize(&outsider, &project_entity()).unwrap_err();
        assert_eq!(
            err,
            EngineError::Forbidden {
                reason: "ownership_violation".to_string()
            }
        );
    }

    #[test]
    fn test_domain_manager_bypass_scoped_to_kind() {
        let sales_mgr = Actor::new("u50", "销售经理", Role::SalesManager);
        assert!(OwnershipPolicy::authorize(&sales_mgr, &project_entity()).is_ok());

        // 销售经理对服务工单没有直通
        let ticket = FakeEntity {
            kind: EntityKind::ServiceTicket,
            creator: "u01".to_string(),
            owner: None,
            assignee: None,
        };
        assert!(OwnershipPolicy::authorize(&sales_mgr, &ticket).is_err());

        let aftersales_mgr = Actor::new("u51", "售后经理", Role::AfterSalesManager);
        assert!(OwnershipPolicy::authorize(&aftersales_mgr, &ticket).is_ok());
    }
}
