// ==========================================
// 订单全流程测试
// ==========================================
// 测试范围:
// 1. 项目 → 订单 → 生产 → 发货 → 完成 全链路
// 2. 一项目一订单与项目锁定
// 3. 非法流转与删除规则
// ==========================================


use equip_sales_flow::api::{OrderApi, ProductionApi, ProjectApi, ShipOrderInput};
use equip_sales_flow::domain::types::{
    MaterialReadiness, OrderStatus, ProductionStatus, ProjectStatus,
};
use equip_sales_flow::{ApiError, PropagationOutcome};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use test_helpers::*;

#[tokio::test]
async fn test_full_pipeline_project_to_completion() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());
    let production_api = ProductionApi::new(env.repos.clone());
    let project_api = ProjectApi::new(env.repos.clone());

    // 项目赢单并转订单
    let project_id = won_project(&env.repos).await;
    let outcome = order_api
        .create_from_project(&sales(), &project_id, default_order_input())
        .await
        .unwrap();
    let order_id = outcome.entity.order_id.clone();
    assert_eq!(outcome.entity.status, OrderStatus::Pending);
    assert_eq!(outcome.entity.financial.subtotal, dec!(2350));
    assert_eq!(outcome.entity.financial.total, dec!(2350));
    assert!(matches!(
        outcome.propagation,
        PropagationOutcome::Applied { .. }
    ));

    // 项目侧已锁定
    let project = project_api.get_project(&project_id).await.unwrap();
    assert!(project.locked);
    assert_eq!(project.status, ProjectStatus::Won);
    assert_eq!(project.linked_order_id.as_deref(), Some(order_id.as_str()));

    // 审批 → 确认 → 全额收款
    order_api
        .approve(&commercial(), &order_id, None)
        .await
        .unwrap();
    order_api.confirm(&sales(), &order_id).await.unwrap();
    order_api
        .record_payment(
            &sales(),
            &order_id,
            dec!(2350),
            "电汇",
            Some("PAY-001".to_string()),
            NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
        )
        .await
        .unwrap();

    // 投产: 订单联动进入生产中
    let outcome = production_api
        .create_from_order(&production_manager(), &order_id)
        .await
        .unwrap();
    let production_id = outcome.entity.production_id.clone();
    assert_eq!(outcome.entity.status, ProductionStatus::Pending);
    assert!(matches!(
        outcome.propagation,
        PropagationOutcome::Applied { .. }
    ));
    let order = order_api.get_order(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::InProduction);
    assert_eq!(
        order.production_order_id.as_deref(),
        Some(production_id.as_str())
    );

    // 生产链路: 排产 → 齐料 → 开工 → 进度 → 报检 → 质检通过
    production_api
        .schedule(
            &production_manager(),
            &production_id,
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
        )
        .await
        .unwrap();
    production_api
        .update_material_readiness(&production_manager(), &production_id, MaterialReadiness::Ready)
        .await
        .unwrap();
    production_api
        .start(&production_manager(), &production_id)
        .await
        .unwrap();
    production_api
        .update_progress(&production_manager(), &production_id, 100)
        .await
        .unwrap();
    production_api
        .submit_qc(&production_manager(), &production_id)
        .await
        .unwrap();
    let outcome = production_api
        .pass_qc(&production_manager(), &production_id)
        .await
        .unwrap();
    assert!(matches!(
        outcome.propagation,
        PropagationOutcome::Applied { .. }
    ));
    let order = order_api.get_order(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::QcPassed);

    // 尾款确认 → 待发货(联动生产单)
    order_api
        .confirm_final_payment(&sales(), &order_id)
        .await
        .unwrap();
    let outcome = order_api
        .mark_ready_to_ship(&sales(), &order_id)
        .await
        .unwrap();
    assert_eq!(outcome.entity.status, OrderStatus::ReadyToShip);
    assert!(matches!(
        outcome.propagation,
        PropagationOutcome::Applied { .. }
    ));
    let production = production_api
        .get_production_order(&production_id)
        .await
        .unwrap();
    assert_eq!(production.status, ProductionStatus::ReadyToShip);

    // 发货: 批次号顺延,生产单联动
    let outcome = order_api
        .ship(
            &sales(),
            &order_id,
            ShipOrderInput {
                tracking_no: "SF123456789".to_string(),
                carrier: Some("顺丰".to_string()),
                shipped_on: NaiveDate::from_ymd_opt(2026, 4, 20).unwrap(),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.entity.status, OrderStatus::Shipped);
    assert_eq!(outcome.entity.shipments.len(), 1);
    assert_eq!(outcome.entity.shipments[0].batch_no, 1);
    assert!(matches!(
        outcome.propagation,
        PropagationOutcome::Applied { .. }
    ));
    let production = production_api
        .get_production_order(&production_id)
        .await
        .unwrap();
    assert_eq!(production.status, ProductionStatus::Shipped);

    // 收尾
    let order = order_api.complete(&sales(), &order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    let production = production_api
        .complete(&production_manager(), &production_id)
        .await
        .unwrap();
    assert_eq!(production.status, ProductionStatus::Completed);

    // 历史条目为流转留痕(只增)
    assert!(order.history.len() >= 7);
    assert!(production.logs.len() >= 7);
}

#[tokio::test]
async fn test_duplicate_order_rejected() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());

    let project_id = won_project(&env.repos).await;
    order_api
        .create_from_project(&sales(), &project_id, default_order_input())
        .await
        .unwrap();

    let err = order_api
        .create_from_project(&sales(), &project_id, default_order_input())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::DuplicateLink { .. }));
}

#[tokio::test]
async fn test_order_requires_won_project() {
    let env = setup();
    let project_api = ProjectApi::new(env.repos.clone());
    let order_api = OrderApi::new(env.repos.clone());

    let project = project_api
        .create_project(
            &sales(),
            equip_sales_flow::api::CreateProjectInput {
                client_name: "西南机械".to_string(),
                project_name: "试制线".to_string(),
            },
        )
        .await
        .unwrap();

    let err = order_api
        .create_from_project(&sales(), &project.project_id, default_order_input())
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());
}

#[tokio::test]
async fn test_locked_project_rejects_commercial_edits() {
    let env = setup();
    let project_api = ProjectApi::new(env.repos.clone());

    let project_id = won_project(&env.repos).await;
    let order_api = OrderApi::new(env.repos.clone());
    order_api
        .create_from_project(&sales(), &project_id, default_order_input())
        .await
        .unwrap();

    // 锁定后物料清单与技术方案均不可修改(锁定不自动解除)
    let err = project_api
        .update_bom(&sales(), &project_id, vec![])
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());
    let err = project_api
        .update_technical_items(&sales(), &project_id, vec![])
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());

    let project = project_api.get_project(&project_id).await.unwrap();
    assert!(project.locked);
}

#[tokio::test]
async fn test_confirm_requires_approval() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());

    let order_id = pending_order(&env.repos).await;
    let err = order_api.confirm(&sales(), &order_id).await.unwrap_err();
    assert!(err.is_precondition_failed());

    // 审批通过后可确认
    order_api
        .approve(&commercial(), &order_id, None)
        .await
        .unwrap();
    let order = order_api.confirm(&sales(), &order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_illegal_transition_leaves_state_unchanged() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());

    let order_id = pending_order(&env.repos).await;
    let before = order_api.get_order(&order_id).await.unwrap();

    // 待确认状态没有发货边
    let err = order_api
        .ship(
            &sales(),
            &order_id,
            ShipOrderInput {
                tracking_no: "SF000".to_string(),
                carrier: None,
                shipped_on: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_illegal_transition());

    // 状态与历史均未变化
    let after = order_api.get_order(&order_id).await.unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.history.len(), before.history.len());
    assert!(after.shipments.is_empty());
}

#[tokio::test]
async fn test_ship_requires_tracking_number() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());
    let production_api = ProductionApi::new(env.repos.clone());

    let order_id = confirmed_order(&env.repos).await;
    order_api
        .record_payment(
            &sales(),
            &order_id,
            dec!(2350),
            "电汇",
            None,
            NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
        )
        .await
        .unwrap();
    let production_id = production_api
        .create_from_order(&production_manager(), &order_id)
        .await
        .unwrap()
        .entity
        .production_id;
    production_api
        .schedule(
            &production_manager(),
            &production_id,
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
        )
        .await
        .unwrap();
    production_api
        .update_material_readiness(&production_manager(), &production_id, MaterialReadiness::Ready)
        .await
        .unwrap();
    production_api
        .start(&production_manager(), &production_id)
        .await
        .unwrap();
    production_api
        .update_progress(&production_manager(), &production_id, 100)
        .await
        .unwrap();
    production_api
        .submit_qc(&production_manager(), &production_id)
        .await
        .unwrap();
    production_api
        .pass_qc(&production_manager(), &production_id)
        .await
        .unwrap();
    order_api
        .confirm_final_payment(&sales(), &order_id)
        .await
        .unwrap();
    order_api
        .mark_ready_to_ship(&sales(), &order_id)
        .await
        .unwrap();

    // 运单号为空 → 前置条件失败,状态不变
    let err = order_api
        .ship(
            &sales(),
            &order_id,
            ShipOrderInput {
                tracking_no: "  ".to_string(),
                carrier: None,
                shipped_on: NaiveDate::from_ymd_opt(2026, 4, 20).unwrap(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());
    let order = order_api.get_order(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::ReadyToShip);
}

#[tokio::test]
async fn test_delete_rules() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());

    // 待确认订单可删除
    let order_id = pending_order(&env.repos).await;
    order_api.delete_order(&sales(), &order_id).await.unwrap();
    let err = order_api.get_order(&order_id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // 已确认订单不可删除
    let order_id = confirmed_order(&env.repos).await;
    let err = order_api
        .delete_order(&sales(), &order_id)
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());
}

#[tokio::test]
async fn test_production_creation_preconditions() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());
    let production_api = ProductionApi::new(env.repos.clone());

    // 已确认但分文未收: 拒绝投产(部分满足即硬失败)
    let order_id = confirmed_order(&env.repos).await;
    let err = production_api
        .create_from_order(&production_manager(), &order_id)
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());

    // 部分收款即可投产,但开工仍被齐料约束
    order_api
        .record_payment(
            &sales(),
            &order_id,
            dec!(700),
            "电汇",
            None,
            NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
        )
        .await
        .unwrap();
    let production_id = production_api
        .create_from_order(&production_manager(), &order_id)
        .await
        .unwrap()
        .entity
        .production_id;

    production_api
        .schedule(
            &production_manager(),
            &production_id,
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
        )
        .await
        .unwrap();

    // 部分齐料不可开工
    production_api
        .update_material_readiness(
            &production_manager(),
            &production_id,
            MaterialReadiness::Partial,
        )
        .await
        .unwrap();
    let err = production_api
        .start(&production_manager(), &production_id)
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());
}

#[tokio::test]
async fn test_final_payment_confirmation_rejects_partial() {
    let env = setup();
    let order_api = OrderApi::new(env.repos.clone());

    let order_id = confirmed_order(&env.repos).await;
    order_api
        .record_payment(
            &sales(),
            &order_id,
            dec!(700),
            "电汇",
            None,
            NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
        )
        .await
        .unwrap();

    // 部分到账一律拒绝确认尾款
    let err = order_api
        .confirm_final_payment(&sales(), &order_id)
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());
}
