//! The CD player chart, end to end.
//!
//! Exercises nested compound states, deep history, eventless guarded
//! transitions and both exporters on one realistic definition.

use serde_json::{json, Value};
use statecraft::core::{ActionResult, ChartDefinition, Registry};
use statecraft::export::{to_plantuml, to_visualizer_format, ExportOptions};
use statecraft::interpreter::Interpreter;
use statecraft::patch::PatchOperation;

fn cd_player_json() -> Value {
    json!({
        "states": {
            "no_cd_loaded": {
                "cd_drawer_closed": "", "cd_drawer_open": "", "closing_cd_drawer": ""
            },
            "cd_loaded": {
                "cd_loaded_group": {
                    "cd_paused_group": {
                        "time_and_track_fields_not_blank": "", "time_and_track_fields_blank": ""
                    },
                    "cd_playing": "",
                    "cd_stopped": ""
                },
                "stepping_forwards": "",
                "stepping_backwards": ""
            }
        },
        "transitions": [
            { "from": "nok", "to": "no_cd_loaded", "event": "init", "action": "fsm_initialize_model" },
            { "from": "no_cd_loaded", "to": "cd_drawer_closed", "event": "init", "action": "identity" },
            { "from": "cd_drawer_closed", "to": "cd_drawer_open", "event": "EJECT", "action": "open_drawer" },
            { "from": "cd_drawer_open", "to": "closing_cd_drawer", "event": "EJECT", "action": "close_drawer" },
            { "from": "closing_cd_drawer", "guards": [
                { "predicate": "is_not_cd_in_drawer", "to": "cd_drawer_closed", "action": "identity" },
                { "predicate": "is_cd_in_drawer", "to": "cd_loaded", "action": "identity" }
            ] },
            { "from": "cd_loaded", "to": "cd_loaded_group", "event": "init", "action": "identity" },
            { "from": "cd_playing", "to": "cd_paused_group", "event": "PAUSE", "action": "pause_playing_cd" },
            { "from": "cd_paused_group", "to": "cd_playing", "event": "PAUSE", "action": "resume_paused_cd" },
            { "from": "cd_paused_group", "to": "cd_playing", "event": "PLAY", "action": "resume_paused_cd" },
            { "from": "cd_paused_group", "to": "time_and_track_fields_not_blank", "event": "init", "action": "identity" },
            { "from": "time_and_track_fields_not_blank", "to": "time_and_track_fields_blank", "event": "TIMER_EXPIRED", "action": "create_pause_timer" },
            { "from": "time_and_track_fields_blank", "to": "time_and_track_fields_not_blank", "event": "TIMER_EXPIRED", "action": "create_pause_timer" },
            { "from": "cd_paused_group", "to": "cd_stopped", "event": "STOP", "action": "stop" },
            { "from": "cd_stopped", "to": "cd_playing", "event": "PLAY", "action": "play" },
            { "from": "cd_playing", "to": "cd_stopped", "event": "STOP", "action": "stop" },
            { "from": "cd_loaded_group", "to": "cd_stopped", "event": "init", "action": "stop" },
            { "from": "cd_loaded_group", "event": "NEXT_TRACK", "guards": [
                { "predicate": "is_last_track", "to": "cd_stopped", "action": "stop" },
                { "predicate": "is_not_last_track", "to": "history.cd_loaded_group", "action": "go_next_track" }
            ] },
            { "from": "cd_loaded_group", "event": "PREVIOUS_TRACK", "guards": [
                { "predicate": "is_track_gt_1", "to": "history.cd_loaded_group", "action": "go_previous_track" },
                { "predicate": "is_track_eq_1", "to": "history.cd_loaded_group", "action": "go_track_1" }
            ] },
            { "from": "cd_loaded", "to": "cd_drawer_open", "event": "EJECT", "action": "eject" },
            { "from": "stepping_forwards", "event": "TIMER_EXPIRED", "guards": [
                { "predicate": "is_not_end_of_cd", "to": "stepping_forwards", "action": "go_forward_1_s" },
                { "predicate": "is_end_of_cd", "to": "cd_stopped", "action": "stop" }
            ] },
            { "from": "stepping_forwards", "to": "history.cd_loaded_group", "event": "FORWARD_UP", "action": "stop_forward_timer" },
            { "from": "cd_loaded_group", "to": "stepping_forwards", "event": "FORWARD_DOWN", "action": "go_forward_1_s" },
            { "from": "stepping_backwards", "to": "stepping_backwards", "event": "TIMER_EXPIRED", "action": "go_backward_1_s" },
            { "from": "stepping_backwards", "to": "history.cd_loaded_group", "event": "REVERSE_UP", "action": "stop_backward_timer" },
            { "from": "cd_loaded_group", "to": "stepping_backwards", "event": "REVERSE_DOWN", "action": "go_backward_1_s" }
        ]
    })
}

fn number(model: &Value, key: &str) -> i64 {
    model[key].as_i64().unwrap_or(0)
}

fn set(key: &str, value: Value) -> ActionResult {
    ActionResult::new(vec![PatchOperation::replace(format!("/{key}"), value)], Value::Null)
}

fn registry() -> Registry {
    let mut registry = Registry::new();

    registry.predicate("is_cd_in_drawer", |model, _, _| model["cd_in_drawer"] == json!(true));
    registry.predicate("is_not_cd_in_drawer", |model, _, _| model["cd_in_drawer"] != json!(true));
    registry.predicate("is_last_track", |model, _, _| {
        number(model, "track") == number(model, "track_count")
    });
    registry.predicate("is_not_last_track", |model, _, _| {
        number(model, "track") < number(model, "track_count")
    });
    registry.predicate("is_track_gt_1", |model, _, _| number(model, "track") > 1);
    registry.predicate("is_track_eq_1", |model, _, _| number(model, "track") == 1);
    registry.predicate("is_not_end_of_cd", |model, _, settings| {
        number(model, "position") < number(settings, "cd_length")
    });
    registry.predicate("is_end_of_cd", |model, _, settings| {
        number(model, "position") >= number(settings, "cd_length")
    });

    registry.action("fsm_initialize_model", |_, _, _| {
        ActionResult::new(
            vec![
                PatchOperation::add("/track", json!(1)),
                PatchOperation::add("/position", json!(0)),
            ],
            json!("initialized"),
        )
    });
    registry.action("close_drawer", |_, payload, _| {
        set("cd_in_drawer", json!(payload["with_cd"] == json!(true)))
    });
    registry.action("eject", |_, _, _| set("cd_in_drawer", json!(false)));
    registry.action("go_next_track", |model, _, _| set("track", json!(number(model, "track") + 1)));
    registry.action("go_previous_track", |model, _, _| {
        set("track", json!(number(model, "track") - 1))
    });
    registry.action("go_track_1", |_, _, _| set("track", json!(1)));
    registry.action("go_forward_1_s", |model, _, _| {
        set("position", json!(number(model, "position") + 1))
    });
    registry.action("go_backward_1_s", |model, _, _| {
        set("position", json!((number(model, "position") - 1).max(0)))
    });
    for name in [
        "identity",
        "open_drawer",
        "play",
        "stop",
        "pause_playing_cd",
        "resume_paused_cd",
        "create_pause_timer",
        "stop_forward_timer",
        "stop_backward_timer",
    ] {
        registry.action(name, move |_, _, _| ActionResult::output(json!(name)));
    }

    registry
}

fn cd_player() -> ChartDefinition {
    ChartDefinition::from_json(&cd_player_json(), &registry()).unwrap()
}

fn player() -> Interpreter {
    let model = json!({ "cd_in_drawer": false, "track_count": 3 });
    let mut interpreter = Interpreter::new(cd_player(), model, json!({ "cd_length": 2 })).unwrap();
    interpreter.initialize().unwrap();
    interpreter
}

fn loaded_player() -> Interpreter {
    let mut interpreter = player();
    interpreter.dispatch("EJECT", None).unwrap();
    interpreter
        .dispatch("EJECT", Some(json!({ "with_cd": true })))
        .unwrap();
    interpreter
}

#[test]
fn definition_is_valid() {
    assert!(cd_player().validate().is_ok());
}

#[test]
fn initialize_reaches_closed_drawer() {
    let mut interpreter =
        Interpreter::new(cd_player(), json!({ "track_count": 3 }), Value::Null).unwrap();

    let outcome = interpreter.initialize().unwrap();

    assert_eq!(outcome.control_state, "cd_drawer_closed");
    assert_eq!(outcome.outputs, vec![json!("initialized"), json!("identity")]);
    assert_eq!(outcome.model["track"], json!(1));
}

#[test]
fn closing_without_cd_returns_to_closed() {
    let mut interpreter = player();
    interpreter.dispatch("EJECT", None).unwrap();

    let outcome = interpreter.dispatch("EJECT", None).unwrap();

    assert_eq!(outcome.control_state, "cd_drawer_closed");
    assert_eq!(
        interpreter.log().get_path(),
        vec!["cd_drawer_closed", "cd_drawer_open", "closing_cd_drawer", "cd_drawer_closed"]
    );
}

#[test]
fn closing_with_cd_enters_loaded_group() {
    let interpreter = loaded_player();

    assert_eq!(interpreter.control_state(), Some("cd_stopped"));
    assert_eq!(interpreter.model()["cd_in_drawer"], json!(true));
    assert_eq!(
        interpreter.history().get("no_cd_loaded"),
        Some("closing_cd_drawer")
    );
}

#[test]
fn next_track_keeps_playing() {
    let mut interpreter = loaded_player();
    interpreter.dispatch("PLAY", None).unwrap();

    let outcome = interpreter.dispatch("NEXT_TRACK", None).unwrap();

    assert_eq!(outcome.control_state, "cd_playing");
    assert_eq!(outcome.model["track"], json!(2));
    assert_eq!(outcome.outputs, vec![Value::Null]);
}

#[test]
fn next_track_on_last_track_stops() {
    let mut interpreter = loaded_player();
    interpreter.dispatch("PLAY", None).unwrap();
    interpreter.dispatch("NEXT_TRACK", None).unwrap();
    interpreter.dispatch("NEXT_TRACK", None).unwrap();

    let outcome = interpreter.dispatch("NEXT_TRACK", None).unwrap();

    assert_eq!(outcome.model["track"], json!(3));
    assert_eq!(outcome.control_state, "cd_stopped");
    assert_eq!(outcome.outputs, vec![json!("stop")]);
}

#[test]
fn previous_track_on_first_track_stays_put() {
    let mut interpreter = loaded_player();
    interpreter.dispatch("PLAY", None).unwrap();

    let outcome = interpreter.dispatch("PREVIOUS_TRACK", None).unwrap();

    assert_eq!(outcome.control_state, "cd_playing");
    assert_eq!(outcome.model["track"], json!(1));
}

#[test]
fn stepping_resumes_paused_leaf_through_history() {
    let mut interpreter = loaded_player();
    interpreter.dispatch("PLAY", None).unwrap();
    interpreter.dispatch("PAUSE", None).unwrap();
    interpreter.dispatch("TIMER_EXPIRED", None).unwrap();
    assert_eq!(interpreter.control_state(), Some("time_and_track_fields_blank"));

    interpreter.dispatch("FORWARD_DOWN", None).unwrap();
    assert_eq!(interpreter.control_state(), Some("stepping_forwards"));
    assert_eq!(
        interpreter.history().get("cd_loaded_group"),
        Some("time_and_track_fields_blank")
    );

    let outcome = interpreter.dispatch("FORWARD_UP", None).unwrap();

    assert_eq!(outcome.control_state, "time_and_track_fields_blank");
    assert_eq!(outcome.model["position"], json!(1));
}

#[test]
fn stepping_forwards_stops_at_end_of_cd() {
    let mut interpreter = loaded_player();
    interpreter.dispatch("FORWARD_DOWN", None).unwrap();

    let step = interpreter.dispatch("TIMER_EXPIRED", None).unwrap();
    assert_eq!(step.control_state, "stepping_forwards");
    assert_eq!(step.model["position"], json!(2));

    let end = interpreter.dispatch("TIMER_EXPIRED", None).unwrap();
    assert_eq!(end.control_state, "cd_stopped");
}

#[test]
fn eject_bubbles_out_of_nested_states() {
    let mut interpreter = loaded_player();
    interpreter.dispatch("PLAY", None).unwrap();
    interpreter.dispatch("PAUSE", None).unwrap();

    let outcome = interpreter.dispatch("EJECT", None).unwrap();

    assert_eq!(outcome.control_state, "cd_drawer_open");
    assert_eq!(outcome.model["cd_in_drawer"], json!(false));
    assert_eq!(
        interpreter.history().get("cd_paused_group"),
        Some("time_and_track_fields_not_blank")
    );
    assert_eq!(
        interpreter.history().get("cd_loaded"),
        Some("time_and_track_fields_not_blank")
    );
}

#[test]
fn visualizer_format_matches_reference() {
    let document = to_visualizer_format(&cd_player(), &ExportOptions::default()).unwrap();
    let json = document.to_json().unwrap();

    assert_eq!(
        json["states"],
        json!(["nok", [
            ["no_cd_loaded", ["cd_drawer_closed", "cd_drawer_open", "closing_cd_drawer"]],
            ["cd_loaded", [
                ["cd_loaded_group", [
                    ["cd_paused_group", ["time_and_track_fields_not_blank", "time_and_track_fields_blank"]],
                    "cd_playing",
                    "cd_stopped"
                ]],
                "stepping_forwards",
                "stepping_backwards"
            ]]
        ]])
    );
    assert_eq!(json["transitions"], cd_player_json()["transitions"]);
}

#[test]
fn visualizer_format_reads_back() {
    let document = to_visualizer_format(&cd_player(), &ExportOptions::default()).unwrap();
    let mut names = document.states.names();
    names.sort_unstable();

    let definition = cd_player();
    let mut expected = definition.states.names();
    expected.push("nok");
    expected.sort_unstable();

    assert_eq!(names, expected);
}

#[test]
fn plantuml_rendering() {
    let text = to_plantuml(&cd_player(), &ExportOptions::default()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "state \"no cd loaded\" as no_cd_loaded {");
    assert!(lines.contains(&"  state \"cd drawer open\" as cd_drawer_open <<NoContent>> {"));
    assert!(lines.contains(&"  [*] --> cd_drawer_closed :  / identity"));
    assert!(lines.contains(&"    [*] --> cd_stopped :  / stop"));
    assert!(lines.contains(&"      [*] --> time_and_track_fields_not_blank :  / identity"));
    assert!(lines.contains(&"[*] --> no_cd_loaded :  / fsm_initialize_model"));
    assert!(lines.contains(&"closing_cd_drawer --> cd_loaded :  [is_cd_in_drawer] / identity"));
    assert!(lines.contains(
        &"cd_loaded_group --> cd_loaded_group.cd_loaded_group.H : NEXT_TRACK [is_not_last_track] / go_next_track"
    ));
    assert!(lines.contains(
        &"stepping_forwards --> stepping_forwards.cd_loaded_group.H : FORWARD_UP / stop_forward_timer"
    ));
    assert_eq!(
        lines.last(),
        Some(&"cd_loaded_group --> stepping_backwards : REVERSE_DOWN / go_backward_1_s")
    );
}
