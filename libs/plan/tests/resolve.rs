//! Resolution of operations trees into flat plans.

use std::collections::BTreeMap;

use matchmaker_plan::{resolve, LimitId, PlanError};
use rstest::rstest;
use serde_json::json;

fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_options_merge_per_branch() {
    let plan = resolve(&json!([{
        "toCreate": "alice",
        "options": {"a": "1"},
        "children": [
            {"options": {"b": "2"}, "game": "X"},
            {"options": {"a": "3"}, "game": "Y"}
        ]
    }]));

    assert!(plan.is_clean());
    assert_eq!(plan.operations.len(), 2);
    assert_eq!(plan.operations[0].game, "X");
    assert_eq!(plan.operations[0].options, options(&[("a", "1"), ("b", "2")]));
    assert_eq!(plan.operations[1].game, "Y");
    assert_eq!(plan.operations[1].options, options(&[("a", "3")]));
}

#[test]
fn test_node_without_game_emits_nothing() {
    let plan = resolve(&json!({
        "toCreate": "alice",
        "options": {"a": "1"},
        "children": [
            {"options": {"b": "2"}},
            {"options": {"a": "3"}, "game": "X"}
        ]
    }));

    assert_eq!(plan.operations.len(), 1);
    assert_eq!(plan.operations[0].options, options(&[("a", "3")]));
}

#[test]
fn test_game_is_emitted_before_children() {
    let plan = resolve(&json!({
        "toCreate": "alice",
        "game": "Parent",
        "children": ["Child", {"game": "Other"}]
    }));

    let games: Vec<_> = plan.operations.iter().map(|op| op.game.as_str()).collect();
    assert_eq!(games, vec!["Parent", "Child", "Other"]);
    let ids: Vec<_> = plan.operations.iter().map(|op| op.id.index()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_invitees_accumulate_and_siblings_are_isolated() {
    let plan = resolve(&json!({
        "toCreate": "alice",
        "toInvite": "bob",
        "children": [
            {"toInvite": ["carol", "dave"], "game": "A"},
            {"game": "B"},
            {"toCreate": "erin", "game": "C"}
        ]
    }));

    let invited = |i: usize| -> Vec<&str> {
        plan.operations[i]
            .to_invite
            .iter()
            .map(String::as_str)
            .collect()
    };
    assert_eq!(invited(0), vec!["bob", "carol", "dave"]);
    assert_eq!(invited(1), vec!["bob"]);
    assert_eq!(plan.operations[1].to_create, "alice");
    assert_eq!(plan.operations[2].to_create, "erin");
}

#[test]
fn test_short_children_alias() {
    let plan = resolve(&json!({"toCreate": "alice", "c": ["Azul", "Patchwork"]}));
    assert_eq!(plan.operations.len(), 2);
}

#[test]
fn test_limits_are_shared_by_identity_down_the_tree() {
    let plan = resolve(&json!([
        {
            "toCreate": "alice",
            "limit": 2,
            "children": [
                "Azul",
                {"limit": 1, "children": ["Patchwork", "Hive"]}
            ]
        },
        {"toCreate": "alice", "limit": 2, "game": "Splendor"}
    ]));

    assert!(plan.is_clean());
    assert_eq!(plan.limits.len(), 3);
    let names: Vec<_> = plan.limits.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Limit 1", "Limit 2", "Limit 3"]);

    let first = LimitId::from_index(0);
    let inner = LimitId::from_index(1);
    let separate = LimitId::from_index(2);
    assert_eq!(plan.operations[0].limits, vec![first]);
    assert_eq!(plan.operations[1].limits, vec![first, inner]);
    assert_eq!(plan.operations[2].limits, vec![first, inner]);
    // Same target as the first limit, still a different limit.
    assert_eq!(plan.operations[3].limits, vec![separate]);
    assert_eq!(plan.limit(separate).unwrap().target, 2);
}

#[test]
fn test_malformed_invite_skips_only_its_subtree() {
    let plan = resolve(&json!({
        "toCreate": "alice",
        "children": [
            {"toInvite": 5, "game": "Broken", "children": ["AlsoSkipped"]},
            {"game": "Fine"}
        ]
    }));

    let games: Vec<_> = plan.operations.iter().map(|op| op.game.as_str()).collect();
    assert_eq!(games, vec!["Fine"]);
    assert_eq!(
        plan.errors,
        vec![PlanError::InvalidInvite {
            path: "$.children[0]".to_string()
        }]
    );
}

#[test]
fn test_rejected_node_does_not_consume_a_limit_number() {
    let plan = resolve(&json!({
        "toCreate": "alice",
        "children": [
            {"limit": 1, "toInvite": [1], "game": "Broken"},
            {"limit": 1, "game": "Fine"}
        ]
    }));

    assert_eq!(plan.limits.len(), 1);
    assert_eq!(plan.limits[0].name, "Limit 1");
}

#[rstest]
#[case::invite_list_with_number(json!({"toCreate": "a", "toInvite": ["b", 3], "game": "G"}))]
#[case::options_not_object(json!({"toCreate": "a", "options": ["x"], "game": "G"}))]
#[case::negative_limit(json!({"toCreate": "a", "limit": -1, "game": "G"}))]
#[case::fractional_limit(json!({"toCreate": "a", "limit": 1.5, "game": "G"}))]
#[case::creator_not_string(json!({"toCreate": 1, "game": "G"}))]
#[case::game_not_string(json!({"toCreate": "a", "game": 12}))]
#[case::boolean_node(json!(true))]
fn test_structural_errors_are_collected(#[case] tree: serde_json::Value) {
    let plan = resolve(&tree);
    assert!(plan.operations.is_empty());
    assert_eq!(plan.errors.len(), 1);
}

#[test]
fn test_errors_do_not_halt_traversal() {
    let plan = resolve(&json!([
        {"toCreate": "a", "game": 1},
        {"toCreate": "a", "options": 3, "game": "G"},
        {"toCreate": "a", "game": "Kept"}
    ]));

    assert_eq!(plan.errors.len(), 2);
    assert_eq!(plan.operations.len(), 1);
    assert_eq!(plan.operations[0].game, "Kept");
}
