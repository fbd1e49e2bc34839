//! Integration tests for the plan analysis pipeline.

use infrasync_kernel::{
    Outcome, PlanDocument, PlanReport, RiskCatalog, RiskLevel, RuleEngine,
};
use pretty_assertions::assert_eq;

fn fixture_plan() -> &'static str {
    r#"{
      "format_version": "1.2",
      "terraform_version": "1.6.6",
      "resource_changes": [
        {
          "address": "aws_instance.web",
          "mode": "managed",
          "type": "aws_instance",
          "name": "web",
          "change": {
            "actions": ["create"],
            "before": null,
            "after": {"ami": "ami-0abc", "instance_type": "t3.small"},
            "after_unknown": {"id": true, "arn": true},
            "before_sensitive": false,
            "after_sensitive": {}
          }
        },
        {
          "address": "aws_security_group.web",
          "mode": "managed",
          "type": "aws_security_group",
          "name": "web",
          "change": {
            "actions": ["update"],
            "before": {"name": "web", "cidr_blocks": ["10.0.0.0/16"]},
            "after": {"name": "web", "cidr_blocks": ["10.0.0.0/16", "0.0.0.0/0"]},
            "after_unknown": {},
            "before_sensitive": {},
            "after_sensitive": {}
          }
        },
        {
          "address": "aws_rds_cluster.prod_main",
          "mode": "managed",
          "type": "aws_rds_cluster",
          "name": "prod_main",
          "change": {
            "actions": ["delete", "create"],
            "before": {"engine": "aurora-postgresql", "master_password": "hunter2"},
            "after": {"engine": "aurora-postgresql", "master_password": "hunter3"},
            "after_unknown": {"endpoint": true},
            "before_sensitive": {"master_password": true},
            "after_sensitive": {"master_password": true}
          }
        },
        {
          "address": "aws_s3_bucket.logs",
          "mode": "managed",
          "type": "aws_s3_bucket",
          "name": "logs",
          "change": {
            "actions": ["delete"],
            "before": {"bucket": "company-logs"},
            "after": null,
            "after_unknown": {},
            "before_sensitive": {},
            "after_sensitive": false
          }
        },
        {
          "address": "aws_iam_role.reader",
          "mode": "managed",
          "type": "aws_iam_role",
          "name": "reader",
          "change": {
            "actions": ["no-op"],
            "before": {"name": "reader"},
            "after": {"name": "reader"}
          }
        }
      ]
    }"#
}

fn run(json: &str) -> PlanReport {
    let summary = PlanDocument::from_json_str(json).unwrap().into_summary();
    PlanReport::build(summary, &RuleEngine::default())
}

#[test]
fn realistic_plan_is_summarized_and_analyzed() {
    let report = run(fixture_plan());
    let summary = &report.summary;

    assert_eq!(summary.tool_version(), "1.6.6");
    assert_eq!(summary.to_create(), 1);
    assert_eq!(summary.to_update(), 1);
    assert_eq!(summary.to_replace(), 1);
    assert_eq!(summary.to_delete(), 1);
    assert_eq!(summary.no_changes(), 1);
    assert_eq!(summary.changes().len(), 5);

    let found: Vec<_> = report
        .warnings
        .iter()
        .map(|w| (w.resource.as_str(), w.level))
        .collect();
    assert_eq!(
        found,
        vec![
            ("aws_security_group.web", RiskLevel::High),
            ("aws_rds_cluster.prod_main", RiskLevel::Critical),
            ("aws_s3_bucket.logs", RiskLevel::High),
        ]
    );

    assert_eq!(report.outcome(), Outcome::CriticalRisk);
}

#[test]
fn replace_of_production_database_is_one_critical_warning() {
    let report = run(fixture_plan());
    let critical: Vec<_> = report.warnings_at(RiskLevel::Critical).collect();

    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].resource, "aws_rds_cluster.prod_main");
    assert!(critical[0].message.contains("REPLACED"));
}

#[test]
fn deleted_attributes_snapshot_is_empty_map() {
    let report = run(fixture_plan());
    let bucket = report
        .summary
        .changes()
        .iter()
        .find(|c| c.address == "aws_s3_bucket.logs")
        .unwrap();

    assert!(bucket.is_delete());
    assert!(bucket.after.is_empty());
    assert_eq!(bucket.before.len(), 1);
}

#[test]
fn deterministic_output_across_runs() {
    let first = serde_json::to_string(&run(fixture_plan())).unwrap();
    let second = serde_json::to_string(&run(fixture_plan())).unwrap();
    assert_eq!(first, second, "Same plan must produce identical JSON output");
}

#[test]
fn empty_plan_exits_clean() {
    let report = run(r#"{"format_version": "1.2", "terraform_version": "1.6.6"}"#);
    assert!(report.summary.changes().is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.outcome(), Outcome::NoChanges);
}

#[test]
fn custom_catalog_from_json() {
    let catalog: RiskCatalog = serde_json::from_str(
        r#"{"resource_types": {"storage": ["aws_s3_bucket"], "database": ["aws_rds"]},
            "production_markers": ["logs"]}"#,
    )
    .unwrap();
    let engine = RuleEngine::with_builtin_rules(catalog);

    let summary = PlanDocument::from_json_str(fixture_plan())
        .unwrap()
        .into_summary();
    let report = PlanReport::build(summary, &engine);

    let bucket: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| w.resource == "aws_s3_bucket.logs")
        .map(|w| w.level)
        .collect();
    assert_eq!(bucket, vec![RiskLevel::Critical, RiskLevel::High]);

    // No security_group category in this catalog.
    assert!(report
        .warnings
        .iter()
        .all(|w| w.resource != "aws_security_group.web"));
}

#[test]
fn warnings_serialize_with_lowercase_levels() {
    let report = run(fixture_plan());
    let value = serde_json::to_value(&report.warnings).unwrap();

    assert_eq!(value[0]["level"], "high");
    assert_eq!(value[0]["type"], "aws_security_group");
    assert_eq!(value[1]["level"], "critical");
}

#[test]
fn serialized_report_masks_sensitive_attributes() {
    let report = run(fixture_plan());
    let text = serde_json::to_string(&report).unwrap();
    assert!(!text.contains("hunter2"));
    assert!(!text.contains("hunter3"));

    let value = serde_json::to_value(&report).unwrap();
    let cluster = &value["summary"]["changes"][2];
    assert_eq!(cluster["type"], "aws_rds_cluster");
    assert_eq!(cluster["before"]["master_password"], "(sensitive)");
    assert_eq!(cluster["after"]["endpoint"], "(known after apply)");
    assert_eq!(cluster["after"]["engine"], "aurora-postgresql");
}
