//! Snapshot tests for the bundled demo form.
//!
//! The rendered grid is printed one cell per line, so a layout or labelling change shows up as a
//! readable diff.
//!
//! Run with: `cargo test --test render_snapshot_tests`
//! Update snapshots with: `cargo insta review`

use std::rc::Rc;
use std::sync::Arc;

use reflectgrid::demo::{JobConfig, RunMode};
use reflectgrid::toolkit::headless::{HeadlessGrid, HeadlessToolkit};
use reflectgrid::{FormServices, LayoutStrategy, NamingStrategy, ReflectorGrid};

fn demo_engine(layout: LayoutStrategy) -> (ReflectorGrid, Rc<std::cell::RefCell<JobConfig>>) {
    let target = JobConfig::shared();
    let mut engine = ReflectorGrid::new(Rc::new(HeadlessToolkit)).with_services(Arc::new(FormServices::new()));
    engine.set_layout_strategy(layout);
    engine.bind(&target).unwrap();
    (engine, target)
}

fn text(engine: &ReflectorGrid) -> String {
    HeadlessGrid::downcast(engine.container())
        .expect("headless container")
        .render_text()
}

#[test]
fn test_demo_paired() {
    let (engine, _target) = demo_engine(LayoutStrategy::Paired);
    insta::assert_snapshot!(text(&engine), @r#"
    00:0 label "Function Name"
    00:1 text "testFunction"
    01:0 label "Number"
    01:1 stepper 20
    02:0 label "Choice For You"
    02:1 select [*you, are, nice]
    03:0 label "Text Area"
    03:1 textarea ""
    04:0 label "Option" tip="Defines the runtime of this application"
    04:1 select [*Full, Partial, DryRun] tip="Defines the runtime of this application"
    05:0+2 separator
    06:0 label "Data"
    07:0 label "Port To Send To"
    07:1 stepper 8090
    08:0 label "Ip Address"
    08:1 text "127.0.0.1"
    09:0 label "Message"
    09:1 textarea "hello\n"
    10:0+2 separator
    11:0 label "Uneditable For You"
    11:1 text "blocked" read-only
    12:0 label "Test Function"
    12:1 button "Press Me!"
    13:0 label "Disabled Function" tip="This is an explanation of what happens when you press the button"
    13:1 button "Disabled!" disabled tip="This is an explanation of what happens when you press the button"
    14:0 label "Name"
    14:1 text "ExampleName"
    "#);
}

#[test]
fn test_demo_stacked_verbatim_head() {
    let (mut engine, _target) = demo_engine(LayoutStrategy::Stacked);
    engine.set_field_naming_strategy(NamingStrategy::Verbatim);
    engine.regenerate().unwrap();

    let rendered = text(&engine);
    let head: Vec<&str> = rendered.lines().take(6).collect();
    insta::assert_snapshot!(head.join("\n"), @r#"
    00:0 label "function_name"
    01:0 text "testFunction"
    02:0 label "number"
    03:0 stepper 20
    04:0 label "choice_for_you"
    05:0 select [*you, are, nice]
    "#);
}

#[test]
fn test_demo_edits_show_after_regenerate() {
    let (mut engine, target) = demo_engine(LayoutStrategy::Paired);
    {
        let grid = HeadlessGrid::downcast_mut(engine.container_mut()).expect("headless container");
        grid.control_mut("Option").expect("option").select_named("DryRun").unwrap();
        grid.control_mut("Port To Send To").expect("port").set_value(70000.into()).unwrap();
        grid.control_mut("Test Function").expect("button").fire().unwrap();
    }

    {
        let job = target.borrow();
        assert_eq!(job.option, RunMode::DryRun);
        assert_eq!(job.data.port_to_send_to, 65535);
        assert_eq!(job.presses, 1);
        // Actions are not field writes; the nested endpoint has no observer of its own.
        assert_eq!(job.changes, 1);
    }

    engine.regenerate().unwrap();
    let rendered = text(&engine);
    assert!(rendered.contains("04:1 select [Full, Partial, *DryRun]"));
    assert!(rendered.contains("07:1 stepper 65535"));
}
