// ==========================================
// 服务工单流程测试
// ==========================================
// 测试范围:
// 1. 受理 → 报告 → 解决 → 关闭/重开 链路
// 2. 报告缺失与重开参数的硬前置条件
// 3. 关闭角色限制与删除规则
// ==========================================


use equip_sales_flow::api::{CreateTicketInput, TicketApi};
use equip_sales_flow::domain::types::TicketStatus;
use equip_sales_flow::ApiError;
use test_helpers::*;

async fn new_ticket(repos: &equip_sales_flow::FlowRepositories) -> String {
    let api = TicketApi::new(repos.clone());
    api.create_ticket(
        &aftersales(),
        CreateTicketInput {
            order_id: None,
            title: "设备异响".to_string(),
            description: "客户反馈主轴运行异响".to_string(),
        },
    )
    .await
    .expect("创建工单失败")
    .ticket_id
}

#[tokio::test]
async fn test_ticket_happy_path_to_closed() {
    let env = setup();
    let api = TicketApi::new(env.repos.clone());

    let ticket_id = new_ticket(&env.repos).await;

    // 无受理人时,具备资格的工程师受理并自动获得指派
    let ticket = api.accept_ticket(&engineer(), &ticket_id).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert_eq!(ticket.assigned_to.as_ref().unwrap().id, "u-eng");

    // 保存报告后才能标记解决
    api.save_final_report(
        &engineer(),
        &ticket_id,
        "更换主轴轴承,试机正常",
        Some("轴承磨损".to_string()),
        Some("更换备件并润滑".to_string()),
    )
    .await
    .unwrap();
    let ticket = api.mark_resolved(&engineer(), &ticket_id).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::ResolvedPendingConfirm);

    // 客户反馈 + 售后经理确认关闭
    api.record_customer_feedback(&engineer(), &ticket_id, 5, Some("响应及时".to_string()))
        .await
        .unwrap();
    let ticket = api
        .close_ticket(&aftersales_manager(), &ticket_id)
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Closed);
    assert_eq!(ticket.closed_by.as_ref().unwrap().id, "u-asm");

    // 终态无出边
    let err = api
        .accept_ticket(&engineer(), &ticket_id)
        .await
        .unwrap_err();
    assert!(err.is_illegal_transition());
}

#[tokio::test]
async fn test_mark_resolved_requires_report() {
    let env = setup();
    let api = TicketApi::new(env.repos.clone());

    let ticket_id = new_ticket(&env.repos).await;
    api.accept_ticket(&engineer(), &ticket_id).await.unwrap();

    // 无报告 → 前置条件失败
    let err = api.mark_resolved(&engineer(), &ticket_id).await.unwrap_err();
    assert!(err.is_precondition_failed());
    let ticket = api.get_ticket(&ticket_id).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::InProgress);

    // 保存报告后同一调用成功
    api.save_final_report(&engineer(), &ticket_id, "已处理", None, None)
        .await
        .unwrap();
    let ticket = api.mark_resolved(&engineer(), &ticket_id).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::ResolvedPendingConfirm);
}

#[tokio::test]
async fn test_reopen_requires_reason_and_comments() {
    let env = setup();
    let api = TicketApi::new(env.repos.clone());

    let ticket_id = new_ticket(&env.repos).await;
    api.accept_ticket(&engineer(), &ticket_id).await.unwrap();
    api.save_final_report(&engineer(), &ticket_id, "已处理", None, None)
        .await
        .unwrap();
    api.mark_resolved(&engineer(), &ticket_id).await.unwrap();

    // 缺少任一参数均拒绝
    let err = api
        .reopen_ticket(&engineer(), &ticket_id, "", "复测仍有异响")
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());
    let err = api
        .reopen_ticket(&engineer(), &ticket_id, "问题复现", "")
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());

    // 两者齐备: 回到处理中,且一条历史携带双字段
    let before_len = api.get_ticket(&ticket_id).await.unwrap().history.len();
    let ticket = api
        .reopen_ticket(&engineer(), &ticket_id, "问题复现", "复测仍有异响")
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert_eq!(ticket.history.len(), before_len + 1);
    let entry = ticket.history.last().unwrap();
    let metadata = entry.metadata.as_ref().unwrap();
    assert_eq!(metadata["reason"], "问题复现");
    assert_eq!(metadata["comments"], "复测仍有异响");
}

#[tokio::test]
async fn test_close_restricted_to_manager() {
    let env = setup();
    let api = TicketApi::new(env.repos.clone());

    let ticket_id = new_ticket(&env.repos).await;
    api.accept_ticket(&engineer(), &ticket_id).await.unwrap();
    api.save_final_report(&engineer(), &ticket_id, "已处理", None, None)
        .await
        .unwrap();
    api.mark_resolved(&engineer(), &ticket_id).await.unwrap();

    // 受理工程师本人也无权关闭
    let err = api.close_ticket(&engineer(), &ticket_id).await.unwrap_err();
    assert!(err.is_forbidden());

    // 管理员可关闭
    let ticket = api.close_ticket(&admin(), &ticket_id).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Closed);
}

#[tokio::test]
async fn test_accept_respects_assignment() {
    let env = setup();
    let api = TicketApi::new(env.repos.clone());

    let ticket_id = new_ticket(&env.repos).await;
    api.assign_engineer(&aftersales_manager(), &ticket_id, &engineer())
        .await
        .unwrap();

    // 已指派他人: 其它售后不可受理
    let err = api
        .accept_ticket(&aftersales(), &ticket_id)
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());

    // 被指派工程师受理成功
    let ticket = api.accept_ticket(&engineer(), &ticket_id).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::InProgress);
}

#[tokio::test]
async fn test_ticket_delete_rules() {
    let env = setup();
    let api = TicketApi::new(env.repos.clone());

    // 待受理可删除
    let ticket_id = new_ticket(&env.repos).await;
    api.delete_ticket(&aftersales(), &ticket_id).await.unwrap();
    let err = api.get_ticket(&ticket_id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // 处理中不可删除
    let ticket_id = new_ticket(&env.repos).await;
    api.accept_ticket(&engineer(), &ticket_id).await.unwrap();
    let err = api
        .delete_ticket(&engineer(), &ticket_id)
        .await
        .unwrap_err();
    assert!(err.is_precondition_failed());

    // 取消后可删除
    api.cancel_ticket(&engineer(), &ticket_id, "客户撤销报修")
        .await
        .unwrap();
    api.delete_ticket(&engineer(), &ticket_id).await.unwrap();
}
