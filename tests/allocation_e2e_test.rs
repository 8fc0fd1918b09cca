// ==========================================
// 月度拜访分配端到端测试
// ==========================================
// 场景: 运行日期 2026-08-20 → 目标月 2026-09 (30 天, 8 个周末日, 22 个工作日)
// 标准场景见 test_helpers::seed_standard_scenario
// ==========================================


use chrono::Datelike;
use std::collections::HashMap;
use test_helpers::*;
use visit_allocator::domain::{CustomerType, TaskType, UserRole};
use visit_allocator::engine::{
    RepresentativeOutcome, ScoringPipeline, VisitAllocationOrchestrator,
};
use visit_allocator::logging;

fn run_date() -> chrono::NaiveDate {
    date(2026, 8, 20)
}

#[test]
fn test_full_allocation_for_dealer_officer() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, config) = open_repos(&db_path);
    seed_standard_scenario(&repos);
    seed_config(&config, run_date());

    let orchestrator =
        VisitAllocationOrchestrator::new(repos.clone(), config.load_allocator_config().unwrap());
    let summary = orchestrator.run(run_date()).unwrap();

    assert_eq!(summary.target_month, "2026-09");
    assert_eq!(summary.allocated_count(), 1);

    let visit_header_id = match summary.outcome_for("U1").unwrap() {
        RepresentativeOutcome::Allocated {
            visit_header_id,
            quota,
            working_days,
            per_day,
            remainder,
            routes,
            route_visits,
            tasks,
            remainder_tasks,
            ..
        } => {
            assert_eq!(*quota, 45);
            assert_eq!(*working_days, 22);
            assert_eq!(*per_day, 2);
            assert_eq!(*remainder, 1);
            assert_eq!(*routes, 3);
            assert_eq!(*route_visits, 22);
            assert_eq!(*tasks, 45);
            assert_eq!(*remainder_tasks, 1);
            visit_header_id.clone()
        }
        other => panic!("unexpected outcome: {:?}", other),
    };

    // 计划头
    let headers = repos.visit_repo.find_headers_for("U1", date(2026, 9, 1)).unwrap();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].name, "Asha Verma-September");
    assert_eq!(headers[0].month, "September");
    assert_eq!(headers[0].visit_count, 45);
    assert_eq!(headers[0].approver_id, "U1");

    // 客户权重
    let weight = |id: &str| repos.account_repo.find_by_id(id).unwrap().unwrap().weightage;
    assert_eq!(weight("G1"), 4);
    assert_eq!(weight("D1"), 4);
    assert_eq!(weight("D2"), 3);
    assert_eq!(weight("D3"), 2);
    assert_eq!(weight("D4"), 1);
    assert_eq!(weight("RA"), 4);
    assert_eq!(weight("RB"), 0);
    assert_eq!(weight("DX"), 0);

    // 线路权重回写
    let routes = repos
        .user_route_repo
        .find_weighted_routes("U1", &["RT1".to_string(), "RT2".to_string(), "RT3".to_string()])
        .unwrap();
    let route_weights: Vec<(&str, i32)> = routes
        .iter()
        .map(|r| (r.route_id.as_str(), r.weightage_point))
        .collect();
    assert_eq!(route_weights, vec![("RT1", 8), ("RT2", 6), ("RT3", 4)]);

    // 线路拜访: 序列 RT1,RT1,RT2,RT2,RT3 循环 22 个工作日
    let route_visits = repos.visit_repo.list_route_visits(&visit_header_id).unwrap();
    assert_eq!(route_visits.len(), 22);
    assert_eq!(route_visits[0].visit_date, date(2026, 9, 1));
    let order: Vec<&str> = route_visits.iter().take(6).map(|v| v.route_id.as_str()).collect();
    assert_eq!(order, vec!["RT1", "RT1", "RT2", "RT2", "RT3", "RT1"]);
    let mut per_route: HashMap<&str, usize> = HashMap::new();
    for v in &route_visits {
        *per_route.entry(v.route_id.as_str()).or_insert(0) += 1;
    }
    assert_eq!(per_route["RT1"], 10);
    assert_eq!(per_route["RT2"], 8);
    assert_eq!(per_route["RT3"], 4);
    assert!(route_visits.iter().all(|v| v.name == "Asha Verma"));

    // 拜访任务
    let tasks = repos.visit_repo.list_tasks(&visit_header_id).unwrap();
    assert_eq!(tasks.len(), 45);
    let placeholders = tasks.iter().filter(|t| t.is_placeholder()).count();
    assert_eq!(placeholders, 18);
    assert!(tasks
        .iter()
        .filter(|t| t.is_placeholder())
        .all(|t| t.subject == "Visit for NON-UTCL" && t.account_id.is_none()));

    // 9/1: RT1 的 D1、D2 + 余量占位
    let first_day: Vec<_> = tasks.iter().filter(|t| t.visit_date == date(2026, 9, 1)).collect();
    assert_eq!(first_day.len(), 3);
    assert_eq!(first_day[0].account_id.as_deref(), Some("D1"));
    assert_eq!(first_day[1].account_id.as_deref(), Some("D2"));
    assert_eq!(first_day[2].task_type, TaskType::NonCustomerVisit);
    assert_eq!(first_day[2].route_id, "RT1");

    // 客户拜访次数
    let visits = |id: &str| repos.account_repo.find_by_id(id).unwrap().unwrap().visit_count;
    assert_eq!(visits("D1"), 5);
    assert_eq!(visits("D2"), 5);
    assert_eq!(visits("D4"), 5);
    assert_eq!(visits("RA"), 4);
    assert_eq!(visits("D3"), 4);
    assert_eq!(visits("G1"), 4);
    assert_eq!(visits("RB"), 0);
}

#[test]
fn test_weekday_holiday_is_skipped_and_remainder_grows() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, config) = open_repos(&db_path);
    seed_standard_scenario(&repos);
    seed_config(&config, run_date());
    repos
        .holiday_repo
        .insert("HOL-1", "Local Festival", date(2026, 9, 15))
        .unwrap();

    let orchestrator =
        VisitAllocationOrchestrator::new(repos.clone(), config.load_allocator_config().unwrap());
    let summary = orchestrator.run(run_date()).unwrap();

    match summary.outcome_for("U1").unwrap() {
        RepresentativeOutcome::Allocated {
            working_days,
            per_day,
            remainder,
            tasks,
            ..
        } => {
            assert_eq!(*working_days, 21);
            assert_eq!(*per_day, 2);
            assert_eq!(*remainder, 3);
            assert_eq!(*tasks, 45);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let header = &repos.visit_repo.find_headers_for("U1", date(2026, 9, 1)).unwrap()[0];
    assert!(repos
        .visit_repo
        .find_route_visit(date(2026, 9, 15), &header.visit_header_id)
        .unwrap()
        .is_none());

    // 余量落在前三个工作日
    let tasks = repos.visit_repo.list_tasks(&header.visit_header_id).unwrap();
    for day in [1, 2, 3] {
        let count = tasks.iter().filter(|t| t.visit_date == date(2026, 9, day)).count();
        assert_eq!(count, 3, "day {}", day);
    }
    assert_eq!(
        tasks.iter().filter(|t| t.visit_date == date(2026, 9, 4)).count(),
        2
    );
}

#[test]
fn test_skip_paths_do_not_abort_run() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, config) = open_repos(&db_path);
    seed_standard_scenario(&repos);
    seed_config(&config, run_date());

    // 无地理映射
    seed_representative(
        &repos,
        &representative("U2", "Bala Krishnan", UserRole::DealerOfficer),
        None,
        None,
    );
    // 有映射但角色无配额
    seed_representative(
        &repos,
        &representative("U3", "Chitra Rao", UserRole::AreaManager),
        Some(REGION),
        None,
    );
    // 有配额但无客户
    seed_representative(
        &repos,
        &representative("U4", "Deepak Singh", UserRole::RetailOfficer),
        Some(REGION),
        Some(30),
    );
    // 未配置的角色: 不在处理范围
    seed_representative(
        &repos,
        &representative("U5", "Esha Nair", UserRole::Other(100_000_009)),
        Some(REGION),
        Some(30),
    );

    let orchestrator =
        VisitAllocationOrchestrator::new(repos.clone(), config.load_allocator_config().unwrap());
    let summary = orchestrator.run(run_date()).unwrap();

    assert_eq!(summary.outcomes.len(), 4);
    assert_eq!(summary.allocated_count(), 1);
    assert_eq!(summary.skipped_count(), 3);
    assert!(summary.outcome_for("U5").is_none());

    // 按姓名排序处理
    let order: Vec<&str> = summary.outcomes.iter().map(|o| o.user_id()).collect();
    assert_eq!(order, vec!["U1", "U2", "U3", "U4"]);

    for user_id in ["U2", "U3", "U4"] {
        assert!(matches!(
            summary.outcome_for(user_id),
            Some(RepresentativeOutcome::Skipped { .. })
        ));
        // 跳过的代表不创建计划头
        assert!(repos
            .visit_repo
            .find_headers_for(user_id, date(2026, 9, 1))
            .unwrap()
            .is_empty());
    }
}

#[test]
fn test_skipped_representative_still_gets_scored() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, config) = open_repos(&db_path);
    seed_standard_scenario(&repos);
    seed_config(&config, run_date());

    // 无地理映射, 但名下有线路客户
    seed_representative(
        &repos,
        &representative("U2", "Bala Krishnan", UserRole::DealerOfficer),
        None,
        None,
    );
    seed_route_mappings(&repos, "U2", &["RT9"]);
    for (id, sale) in [("X1", 100.0), ("X2", 50.0), ("X3", 20.0)] {
        repos
            .account_repo
            .insert(&account(id, "U2", Some("RT9"), CustomerType::Dealer, sale, None))
            .unwrap();
    }

    let orchestrator =
        VisitAllocationOrchestrator::new(repos.clone(), config.load_allocator_config().unwrap());
    let summary = orchestrator.run(run_date()).unwrap();

    assert!(matches!(
        summary.outcome_for("U2"),
        Some(RepresentativeOutcome::Skipped { .. })
    ));
    assert!(repos
        .visit_repo
        .find_headers_for("U2", date(2026, 9, 1))
        .unwrap()
        .is_empty());

    // N=3: 名次上限 1, 2, 3 → 4, 3, 2
    let weight = |id: &str| repos.account_repo.find_by_id(id).unwrap().unwrap().weightage;
    assert_eq!((weight("X1"), weight("X2"), weight("X3")), (4, 3, 2));

    let routes = repos
        .user_route_repo
        .find_weighted_routes("U2", &["RT9".to_string()])
        .unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].weightage_point, 9);
}

#[test]
fn test_quota_below_working_days_uses_placeholders_only() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, config) = open_repos(&db_path);
    seed_standard_scenario_with_quota(&repos, 10);
    seed_config(&config, run_date());

    let orchestrator =
        VisitAllocationOrchestrator::new(repos.clone(), config.load_allocator_config().unwrap());
    let summary = orchestrator.run(run_date()).unwrap();

    let visit_header_id = match summary.outcome_for("U1").unwrap() {
        RepresentativeOutcome::Allocated {
            visit_header_id,
            quota,
            working_days,
            per_day,
            remainder,
            routes,
            route_visits,
            tasks,
            placeholder_tasks,
            remainder_tasks,
            ..
        } => {
            assert_eq!(*quota, 10);
            assert_eq!(*working_days, 22);
            assert_eq!(*per_day, 0);
            assert_eq!(*remainder, 10);
            assert_eq!(*routes, 3);
            assert_eq!(*route_visits, 22);
            assert_eq!(*tasks, 10);
            assert_eq!(*placeholder_tasks, 10);
            assert_eq!(*remainder_tasks, 10);
            visit_header_id.clone()
        }
        other => panic!("unexpected outcome: {:?}", other),
    };

    // 每条线路各占 1 个位置: RT1,RT2,RT3 循环
    let route_visits = repos.visit_repo.list_route_visits(&visit_header_id).unwrap();
    assert_eq!(route_visits.len(), 22);
    let mut per_route: HashMap<&str, usize> = HashMap::new();
    for v in &route_visits {
        *per_route.entry(v.route_id.as_str()).or_insert(0) += 1;
    }
    assert_eq!(per_route["RT1"], 8);
    assert_eq!(per_route["RT2"], 7);
    assert_eq!(per_route["RT3"], 7);

    // 只有余量占位任务, 落在前 10 个工作日
    let tasks = repos.visit_repo.list_tasks(&visit_header_id).unwrap();
    assert_eq!(tasks.len(), 10);
    assert!(tasks
        .iter()
        .all(|t| t.is_placeholder() && t.task_type == TaskType::NonCustomerVisit));
    let days: Vec<u32> = tasks.iter().map(|t| t.visit_date.day()).collect();
    assert_eq!(days, vec![1, 2, 3, 4, 7, 8, 9, 10, 11, 14]);

    for id in ["D1", "D2", "D3", "D4", "G1", "RA"] {
        assert_eq!(repos.account_repo.find_by_id(id).unwrap().unwrap().visit_count, 0);
    }
}

#[test]
fn test_month_without_working_days_is_skipped() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, config) = open_repos(&db_path);
    seed_standard_scenario(&repos);
    seed_config(&config, run_date());
    for day in 1..=30 {
        repos
            .holiday_repo
            .insert(&format!("HOL-{}", day), "Shutdown", date(2026, 9, day))
            .unwrap();
    }

    let orchestrator =
        VisitAllocationOrchestrator::new(repos.clone(), config.load_allocator_config().unwrap());
    let summary = orchestrator.run(run_date()).unwrap();

    match summary.outcome_for("U1").unwrap() {
        RepresentativeOutcome::Skipped { reason, .. } => assert!(reason.contains("2026-09")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_rerun_duplicates_visit_records() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, config) = open_repos(&db_path);
    seed_standard_scenario(&repos);
    seed_config(&config, run_date());

    let orchestrator =
        VisitAllocationOrchestrator::new(repos.clone(), config.load_allocator_config().unwrap());
    orchestrator.run(run_date()).unwrap();
    orchestrator.run(run_date()).unwrap();

    // 重复运行不去重: 两个计划头, 各自一整套记录
    let headers = repos.visit_repo.find_headers_for("U1", date(2026, 9, 1)).unwrap();
    assert_eq!(headers.len(), 2);
    assert_ne!(headers[0].visit_header_id, headers[1].visit_header_id);
    for header in &headers {
        assert_eq!(repos.visit_repo.count_tasks(&header.visit_header_id).unwrap(), 45);
        assert_eq!(
            repos
                .visit_repo
                .list_route_visits(&header.visit_header_id)
                .unwrap()
                .len(),
            22
        );
    }

    // 重置后重新计算, 拜访次数不累加
    let d1 = repos.account_repo.find_by_id("D1").unwrap().unwrap();
    assert_eq!(d1.weightage, 4);
    assert_eq!(d1.visit_count, 5);
}

#[test]
fn test_rescoring_same_snapshot_is_idempotent() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let (repos, _config) = open_repos(&db_path);
    seed_standard_scenario(&repos);

    let rep = representative("U1", "Asha Verma", UserRole::DealerOfficer);
    let pipeline = ScoringPipeline::new(repos.account_repo.clone(), -10.0);

    repos.account_repo.reset_region_accounts(REGION).unwrap();
    let first = pipeline.score_representative(&rep, REGION).unwrap();
    let first_weights: Vec<i32> = ["G1", "D1", "D2", "D3", "D4", "RA", "RB"]
        .iter()
        .map(|id| repos.account_repo.find_by_id(id).unwrap().unwrap().weightage)
        .collect();

    repos.account_repo.reset_region_accounts(REGION).unwrap();
    let second = pipeline.score_representative(&rep, REGION).unwrap();
    let second_weights: Vec<i32> = ["G1", "D1", "D2", "D3", "D4", "RA", "RB"]
        .iter()
        .map(|id| repos.account_repo.find_by_id(id).unwrap().unwrap().weightage)
        .collect();

    assert_eq!(first, second);
    assert_eq!(first_weights, second_weights);
    assert_eq!(first.get("RT1"), Some(8));
    assert_eq!(first.get("RT2"), Some(6));
    assert_eq!(first.get("RT3"), Some(4));
}
