// ==========================================
// 商机项目流程测试
// ==========================================
// 测试范围:
// 1. 销售阶段逐级推进与失单终态
// 2. 操作历史随流转留痕
// 3. 展示编号与统计
// ==========================================


use equip_sales_flow::api::{CreateProjectInput, ProjectApi};
use equip_sales_flow::domain::types::ProjectStatus;
use test_helpers::*;

async fn new_project(repos: &equip_sales_flow::FlowRepositories) -> String {
    ProjectApi::new(repos.clone())
        .create_project(
            &sales(),
            CreateProjectInput {
                client_name: "北方装备".to_string(),
                project_name: "冲压线扩建".to_string(),
            },
        )
        .await
        .unwrap()
        .project_id
}

#[tokio::test]
async fn test_stage_advances_one_step_at_a_time() {
    let env = setup();
    let api = ProjectApi::new(env.repos.clone());
    let project_id = new_project(&env.repos).await;

    let expected = [
        ProjectStatus::RequirementConfirmed,
        ProjectStatus::Quoted,
        ProjectStatus::Negotiation,
        ProjectStatus::Won,
    ];
    for status in expected {
        let project = api.advance_stage(&sales(), &project_id).await.unwrap();
        assert_eq!(project.status, status);
    }

    // 赢单后无推进边
    let err = api.advance_stage(&sales(), &project_id).await.unwrap_err();
    assert!(err.is_illegal_transition());

    // 每次推进各留一条带前后状态的历史
    let project = api.get_project(&project_id).await.unwrap();
    let transitions = project
        .operation_history
        .iter()
        .filter(|e| e.is_transition())
        .count();
    assert_eq!(transitions, 4);
}

#[tokio::test]
async fn test_lost_is_terminal() {
    let env = setup();
    let api = ProjectApi::new(env.repos.clone());
    let project_id = new_project(&env.repos).await;

    // 失单必须填写原因
    let err = api.mark_lost(&sales(), &project_id, " ").await.unwrap_err();
    assert!(err.is_precondition_failed());

    let project = api
        .mark_lost(&sales(), &project_id, "竞争对手低价中标")
        .await
        .unwrap();
    assert_eq!(project.status, ProjectStatus::Lost);
    assert_eq!(project.lost_reason.as_deref(), Some("竞争对手低价中标"));

    // 失单后不可推进、不可再失单、不可指派
    assert!(api
        .advance_stage(&sales(), &project_id)
        .await
        .unwrap_err()
        .is_illegal_transition());
    assert!(api
        .mark_lost(&sales(), &project_id, "重复失单")
        .await
        .unwrap_err()
        .is_illegal_transition());
    assert!(api
        .assign_technical_support(&sales(), &project_id, &engineer())
        .await
        .unwrap_err()
        .is_precondition_failed());
}

#[tokio::test]
async fn test_project_numbers_are_distinct_and_prefixed() {
    let env = setup();
    let api = ProjectApi::new(env.repos.clone());

    let a = api.get_project(&new_project(&env.repos).await).await.unwrap();
    let b = api.get_project(&new_project(&env.repos).await).await.unwrap();
    assert!(a.project_no.starts_with("XM"));
    assert!(b.project_no.starts_with("XM"));
    assert_ne!(a.project_no, b.project_no);
}

#[tokio::test]
async fn test_statistics_group_by_status() {
    let env = setup();
    let api = ProjectApi::new(env.repos.clone());

    let p1 = new_project(&env.repos).await;
    let _p2 = new_project(&env.repos).await;
    api.mark_lost(&sales(), &p1, "需求搁置").await.unwrap();

    let stats = api.project_statistics().await.unwrap();
    let lookup = |status: &str| {
        stats
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };
    assert_eq!(lookup("LOST"), 1);
    assert_eq!(lookup("INITIAL_CONTACT"), 1);
}
