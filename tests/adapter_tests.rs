//! Adapter closed loop: a scripted controller against the JSON-lines runtime

use serde_json::Value;

use tile_match::adapter::Runtime;
use tile_match::core::{GameConfig, GameSession, Grid};

fn runtime(layout: &[&str]) -> Runtime {
    let grid = Grid::parse(layout).unwrap();
    let config = GameConfig {
        cols: grid.cols(),
        rows: grid.rows(),
        ..GameConfig::default()
    };
    Runtime::new(GameSession::from_grid(config, grid, 99).unwrap())
}

fn run_script(rt: &mut Runtime, script: &[&str]) -> Vec<Value> {
    let input = script.join("\n");
    let mut output = Vec::new();
    rt.run(input.as_bytes(), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn replies_for(replies: &[Value], seq: u64) -> Vec<&Value> {
    replies.iter().filter(|r| r["seq"] == seq).collect()
}

#[test]
fn test_scripted_session() {
    let mut rt = runtime(&["AABC", "BCAB", "CABC"]);
    let replies = run_script(
        &mut rt,
        &[
            r#"{"type":"snapshot","seq":1}"#,
            r#"{"type":"pick","seq":2,"col":2,"row":1}"#,
            r#"{"type":"pick","seq":3,"col":2,"row":0}"#,
            r#"{"type":"tick","seq":4,"elapsed_ms":16}"#,
            r#"{"type":"hint","seq":5}"#,
            r#"{"type":"teleport","seq":6}"#,
            r#"{"type":"pick","seq":7,"col":9,"row":9}"#,
            r#"{"type":"restart","seq":8}"#,
        ],
    );
    assert_eq!(rt.handled(), 8);

    // Every reply carries a timestamp
    assert!(replies.iter().all(|r| r["ts"].as_u64().is_some()));

    let obs = replies_for(&replies, 1);
    assert_eq!(obs.len(), 1);
    assert_eq!(obs[0]["type"], "observation");
    assert_eq!(obs[0]["board"], serde_json::json!(["AABC", "BCAB", "CABC"]));
    assert_eq!(obs[0]["phase"], "idle");
    assert_eq!(obs[0]["playable"], true);

    let select = replies_for(&replies, 2);
    assert_eq!(select.len(), 2);
    assert_eq!(select[0]["event"]["name"], "highlighted");
    assert_eq!(select[0]["event"]["tile"]["col"], 2);
    assert_eq!(select[1]["type"], "outcome");
    assert_eq!(select[1]["result"], "selected");

    let swap = replies_for(&replies, 3);
    let (outcome, events) = swap.split_last().unwrap();
    assert!(events.iter().all(|e| e["type"] == "event"));
    let names: Vec<_> = events
        .iter()
        .map(|e| e["event"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names[0], "unhighlighted");
    assert!(names.contains(&"swapped"));
    assert!(names.contains(&"cleared"));
    assert!(names.contains(&"scoreChanged"));
    assert!(!names.contains(&"swapReverted"));
    assert_eq!(outcome["result"], "matched");
    assert!(outcome["report"]["score_delta"].as_u64().unwrap() >= 30);

    let ack = replies_for(&replies, 4);
    assert_eq!(ack.last().unwrap()["type"], "ack");
    assert_eq!(ack.last().unwrap()["locked"], false);

    let hint = replies_for(&replies, 5);
    assert_eq!(hint.len(), 1);
    assert_eq!(hint[0]["type"], "hint");

    let unknown = replies_for(&replies, 6);
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0]["type"], "error");
    assert_eq!(unknown[0]["code"], "unknown_type");

    let oob = replies_for(&replies, 7);
    assert_eq!(oob.len(), 1);
    assert_eq!(oob[0]["code"], "out_of_bounds");

    let restarted = replies_for(&replies, 8);
    assert_eq!(restarted.len(), 1);
    assert_eq!(restarted[0]["type"], "observation");
    assert_eq!(restarted[0]["episode_id"], 1);
    assert_eq!(restarted[0]["score"], 0);
    assert_eq!(restarted[0]["moves"], 0);
}

#[test]
fn test_revert_reply_has_no_report() {
    let mut rt = runtime(&["AB", "BA"]);
    let replies = run_script(
        &mut rt,
        &[
            r#"{"type":"pick","seq":1,"col":0,"row":0}"#,
            r#"{"type":"pick","seq":2,"col":0,"row":1}"#,
            r#"{"type":"snapshot","seq":3}"#,
        ],
    );

    let second = replies_for(&replies, 2);
    let outcome = second.last().unwrap();
    assert_eq!(outcome["result"], "reverted");
    assert!(outcome.get("report").is_none());
    assert!(second
        .iter()
        .any(|r| r["event"]["name"] == "swapReverted"));

    let obs = replies_for(&replies, 3);
    assert_eq!(obs[0]["board"], serde_json::json!(["AB", "BA"]));
    assert_eq!(obs[0]["score"], 0);
    assert!(obs[0].get("selected").is_none());
}

#[test]
fn test_tap_bomb_over_the_wire() {
    let mut rt = runtime(&["ABC", "BcA", "CAB"]);
    let replies = run_script(&mut rt, &[r#"{"type":"pick","seq":11,"col":1,"row":1}"#]);

    let detonated = replies
        .iter()
        .find(|r| r["event"]["name"] == "detonated")
        .unwrap();
    assert_eq!(detonated["seq"], 11);
    assert_eq!(detonated["event"]["target"], 2);
    assert_eq!(detonated["event"]["bomb"]["special"], true);

    let blasted = replies
        .iter()
        .filter(|r| r["event"]["name"] == "cleared" && r["event"]["cause"] == "areaClear")
        .count();
    assert_eq!(blasted, 3);

    let first_score = replies
        .iter()
        .find(|r| r["event"]["name"] == "scoreChanged")
        .unwrap();
    assert_eq!(first_score["event"]["delta"], 60);

    let outcome = replies.last().unwrap();
    assert_eq!(outcome["result"], "detonated");
    assert!(outcome["report"]["score_delta"].as_u64().unwrap() >= 60);
}

#[test]
fn test_malformed_lines_do_not_stop_the_loop() {
    let mut rt = runtime(&["AB", "BA"]);
    let replies = run_script(
        &mut rt,
        &[
            "{not json",
            "",
            r#"{"type":"pick","seq":2,"col":"x"}"#,
            r#"{"type":"snapshot","seq":3}"#,
        ],
    );

    assert_eq!(rt.handled(), 3);
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["code"], "invalid_message");
    assert_eq!(replies[1]["code"], "invalid_message");
    assert_eq!(replies[2]["type"], "observation");
}
