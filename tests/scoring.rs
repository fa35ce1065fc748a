//! Tests for scoring, grading and confidence through the public API.
mod common;
use common::*;
use flowaudit::prelude::*;
use flowaudit::scoring::{analyzed_node_count, grade, health_score, severity_multiplier};
use flowaudit::vocabulary::Vocabulary;
use serde_json::json;

#[test]
fn test_multiplier_is_one_point_nine_five_for_busy_active_workflows() {
    let workflow = WorkflowMetadata::new("wf", "wf")
        .with_status("active")
        .with_contact_count(1000);
    let m = severity_multiplier(&workflow, &ScoringWeights::default());
    assert!((m - 1.95).abs() < 1e-9);
}

#[test]
fn test_custom_weights_change_the_multiplier() {
    let weights = ScoringWeights {
        high_volume_contacts: 100,
        high_volume_factor: 2.0,
        ..ScoringWeights::default()
    };
    let workflow = WorkflowMetadata::new("wf", "wf").with_contact_count(150);
    assert_eq!(severity_multiplier(&workflow, &weights), 2.0);

    let analyzer = Analyzer::builder().with_weights(weights).build();
    let result = analyzer.analyze(&empty_graph(), &workflow);
    assert_eq!(result.metadata.severity_multiplier, 2.0);
    assert_eq!(result.health_score, 100);
}

#[test]
fn test_action_count_surcharge() {
    let actions: Vec<ActionRecord> = (0..51).map(|i| healthy_email(&format!("a{}", i))).collect();
    let mut workflow = WorkflowMetadata::new("wf", "Big").with_actions(actions);
    workflow.description = Some("Onboarding".to_string());
    assert_eq!(
        health_score(&[], &workflow, 1.0, &ScoringWeights::default()),
        90
    );
    workflow.actions.pop();
    assert_eq!(
        health_score(&[], &workflow, 1.0, &ScoringWeights::default()),
        100
    );
}

#[test]
fn test_score_bounds_and_grade_agree_across_penalties() {
    let weights = ScoringWeights::default();
    let workflow = WorkflowMetadata::new("wf", "wf").with_contact_count(5000);
    let multiplier = severity_multiplier(&workflow, &weights);
    assert_eq!(multiplier, 1.5);
    for count in 0..12 {
        let issues: Vec<Issue> = (0..count)
            .map(|i| Issue {
                severity: Severity::Medium,
                category: IssueCategory::DeadBranch,
                title: IssueCategory::DeadBranch.title().to_string(),
                description: format!("dead {}", i),
                node_ids: vec![format!("n{}", i)],
                fix: String::new(),
                penalty: 8.0,
            })
            .collect();
        let score = health_score(&issues, &workflow, multiplier, &weights);
        assert!(score <= 100);
        let expected = (100.0 - 12.0 * count as f64).clamp(0.0, 100.0).round() as u8;
        assert_eq!(score, expected);
        let g = grade(score);
        match score {
            90..=100 => assert_eq!(g, Grade::Excellent),
            70..=89 => assert_eq!(g, Grade::Good),
            50..=69 => assert_eq!(g, Grade::NeedsAttention),
            30..=49 => assert_eq!(g, Grade::HighRisk),
            _ => assert_eq!(g, Grade::Critical),
        }
    }
}

#[test]
fn test_analyzed_node_count_is_a_coverage_proxy() {
    let g = graph(
        vec![
            trigger("t", "form_submitted"),
            trigger("t_blank", " "),
            action("a", "SendEmail"),
            action("b", "MysteryStep"),
            condition("c"),
            Node::new("u", NodeKind::Unknown, "SendEmail"),
        ],
        &[],
    );
    let vocabulary = Vocabulary::new();
    assert_eq!(analyzed_node_count(&g, &vocabulary), 3);
    assert_eq!(
        analyzed_node_count(&g, &vocabulary.with_alias("MysteryStep", "task")),
        4
    );
}

#[test]
fn test_low_coverage_lowers_confidence() {
    let nodes: Vec<Node> = (0..6)
        .map(|i| action(&format!("x{}", i), "VendorThing"))
        .chain([action("a", "SendEmail").with_config(config(json!({"to": "a@example.com"})))])
        .collect();
    let result = Analyzer::default().analyze(&graph(nodes, &[]), &WorkflowMetadata::new("wf", "wf"));
    assert_eq!(result.metadata.analyzed_node_count, 1);
    assert_eq!(result.metadata.total_node_count, 7);
    assert_eq!(result.confidence, Confidence::Low);
}

#[test]
fn test_full_coverage_gives_high_confidence() {
    let actions: Vec<ActionRecord> = (0..5).map(|i| healthy_email(&format!("a{}", i))).collect();
    let (graph, mut workflow) = linear_workflow(actions);
    workflow.description = Some("Five emails".to_string());
    let result = Analyzer::default().analyze(&graph, &workflow);
    assert_eq!(result.metadata.analyzed_node_count, 6);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.health_score, 100);
}

#[test]
fn test_result_serializes_with_camel_case_names() {
    let (graph, workflow) = linear_workflow(vec![ActionRecord::new("a1", "SendEmail")]);
    let result = Analyzer::default().analyze(&graph, &workflow);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["workflowId"], "wf-test");
    assert_eq!(value["healthScore"], 70);
    assert_eq!(value["grade"], "Good");
    assert_eq!(value["metadata"]["severityMultiplier"], 1.0);
    assert_eq!(value["issues"][0]["category"], "missing_required_field");
    assert_eq!(value["issues"][0]["nodeIds"], json!(["a1"]));
    assert_eq!(value["performance"]["complexity"], "Low");

    let back: AnalysisResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_extreme_inputs_keep_every_number_finite() {
    let wait = |id: &str| action(id, "Delay").with_config(config(json!({"delay": 1e308})));
    let hook = |id: &str| ActionRecord::new(id, "Webhook");
    let nodes = (0..60).map(|i| wait(&format!("w{}", i))).collect();
    let graph = graph(nodes, &[]);
    let workflow = WorkflowMetadata::new("wf", "wf")
        .with_status("active")
        .with_contact_count(u64::MAX)
        .with_actions((0..60).map(|i| hook(&format!("h{}", i))).collect());

    let result = Analyzer::default().analyze(&graph, &workflow);

    assert!(result.performance.estimated_time_seconds.is_finite());
    assert!(result.metadata.severity_multiplier.is_finite());
    assert!(result.issues.iter().all(|i| i.penalty.is_finite()));
    assert_eq!(result.health_score, 0);
    assert_eq!(result.grade, Grade::Critical);

    let json = serde_json::to_string(&result).unwrap();
    assert!(!json.contains(":null"), "{}", json);
}
