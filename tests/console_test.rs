//! End-to-end console sessions

mod common;

use common::TrackerTest;

#[tokio::test]
async fn test_console_round_trip() {
    let mut t = TrackerTest::start().await.expect("Failed to start tracker");

    t.ok("add Aria 24 18").await;
    t.ok("npc npc_goblin 12").await;
    t.ok("npc npc_goblin 8").await;
    t.ok("env | Rocks fall").await;

    let out = t.ok("start").await;
    assert!(out.starts_with("Round 1  Turn 1/4"), "{}", out);
    assert!(out.contains("> ["), "{}", out);
    assert!(out.contains("Lair Action (env) init 20 - Rocks fall"), "{}", out);

    t.ok("next").await;
    t.ok("dmg 5").await;
    t.ok("cond Blessed").await;
    let shown = t.ok("show").await;
    assert!(shown.contains("staged: dmg 5 heal 0 toggle [Blessed]"), "{}", shown);
    t.ok("next").await;

    let aria = t.encounter().order()[1].as_combatant().unwrap().clone();
    assert_eq!(aria.name(), "Aria");
    assert_eq!(aria.current_hp(), 19);
    assert!(aria.conditions().contains("Blessed"));

    let names: Vec<String> = t
        .encounter()
        .roster()
        .combatants()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["Aria", "Goblin", "Goblin 2"]);
}

#[tokio::test]
async fn test_console_targeting() {
    let mut t = TrackerTest::start().await.unwrap();
    let aria = t.ok("add Aria 24 18").await;
    assert!(aria.starts_with("added [c_1] Aria"), "{}", aria);
    t.ok("add Orc 15 10 npc").await;
    t.ok("add Wolf 11 12 npc").await;

    t.ok("target c_1").await;
    t.ok("pick c_2").await;
    t.ok("pick c_3").await;

    let err = t.run("apply dmg").await;
    assert_eq!(err, "error: Amount must be a positive number");

    t.ok("amount 12").await;
    assert_eq!(t.ok("apply dmg").await, "damaged 2 target(s)");

    let hp: Vec<i32> = ["c_2", "c_3"]
        .iter()
        .map(|id| t.encounter().combatant(id).unwrap().current_hp())
        .collect();
    assert_eq!(hp, vec![3, 0]);
    assert!(t.encounter().targeting().is_none());
}

#[tokio::test]
async fn test_console_rejects_bad_input() {
    let mut t = TrackerTest::start().await.unwrap();

    assert_eq!(t.run("start").await, "error: Add at least one entry before starting combat");
    assert_eq!(t.run("add Aria zero 10").await, "error: Valid HP required");
    assert_eq!(t.run("add Aria 0 10").await, "error: Valid HP required");
    assert_eq!(t.run("npc npc_nope 10").await, "error: Template npc_nope not found");
    assert_eq!(t.run("dmg 4").await, "error: No active entry");
    assert!(t.run("fly").await.starts_with("error: unknown command"));
    assert!(t.encounter().roster().is_empty());

    assert_eq!(t.run("rm c_99").await, "no entry c_99");
    assert_eq!(t.run("").await, "");
    assert_eq!(t.run("quit").await, "<quit>");
}

#[tokio::test]
async fn test_console_library_commands() {
    let mut t = TrackerTest::start().await.unwrap();

    let out = t.ok("lib add Giant Spider 26 14 1").await;
    assert!(out.starts_with("added template Giant Spider (npc_"), "{}", out);
    assert!(t.ok("lib").await.contains("Giant Spider  HP 26  AC 14  CR 1"));

    t.ok("lib rm npc_goblin").await;
    assert_eq!(t.run("lib rm npc_goblin").await, "error: Template npc_goblin not found");
    t.ok("lib reset").await;
    assert!(!t.ok("lib").await.contains("Giant Spider"));

    t.ok("conds add Hexed").await;
    assert_eq!(t.run("conds add Hexed").await, "error: Condition \"Hexed\" already exists");
    assert!(t.ok("conds").await.ends_with("Concentration, Hexed"));
    t.ok("conds reset").await;
    assert!(!t.ok("conds").await.contains("Hexed"));
}

#[tokio::test]
async fn test_console_end_clears_encounter() {
    let mut t = TrackerTest::start().await.unwrap();
    t.ok("add Aria 24 18").await;
    t.ok("start").await;
    t.ok("next").await;
    assert_eq!(t.active_id().as_deref(), Some("c_1"));

    assert_eq!(t.ok("end").await, "combat ended");
    assert!(t.encounter().roster().is_empty());
    assert!(t.ok("show").await.starts_with("Building roster (0 entries)"));
}

#[tokio::test]
async fn test_console_quick_hp_buttons() {
    let mut t = TrackerTest::start().await.unwrap();
    t.ok("add Orc 15 10 npc").await;

    assert_eq!(t.ok("hit c_1 6").await, "c_1 now at 9 HP");
    assert_eq!(t.ok("hit c_1 -2").await, "c_1 now at 7 HP");
    assert_eq!(t.ok("mend c_1 -3").await, "c_1 now at 10 HP");
    assert_eq!(t.ok("mend c_1 40").await, "c_1 now at 15 HP");
    assert_eq!(t.ok("hit c_9 4").await, "no combatant c_9");
}

#[tokio::test]
async fn test_console_show_marks_targets() {
    let mut t = TrackerTest::start().await.unwrap();
    t.ok("add Aria 24 18").await;
    t.ok("add Orc 15 10 npc").await;
    t.ok("target c_1").await;
    t.ok("pick c_2").await;

    let shown = t.ok("show").await;
    assert!(shown.contains("* [c_2] Orc"), "{}", shown);
    assert!(shown.contains("  [c_1] Aria"), "{}", shown);
    assert!(shown.contains("targeting from c_1: [c_2]"), "{}", shown);
}
