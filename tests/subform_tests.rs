//! Sub-form tests: composite fields, nested engines, and cycle detection.
//!
//! Run with: `cargo test --test subform_tests`

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use reflectgrid::toolkit::headless::{HeadlessControl, HeadlessGrid, HeadlessToolkit};
use reflectgrid::{
    BindError, FieldAnnotation, FieldChange, FieldObserver, FieldType, FormServices, LayoutStrategy,
    MemberDescriptor, Reflect, ReflectError, ReflectorGrid, SharedTarget, Value,
};
use reflectgrid_core::{Composite, CompositeMut};

fn engine(services: &Arc<FormServices>, layout: LayoutStrategy) -> ReflectorGrid {
    let mut engine = ReflectorGrid::new(Rc::new(HeadlessToolkit)).with_services(Arc::clone(services));
    engine.set_layout_strategy(layout);
    engine
}

fn grid(engine: &ReflectorGrid) -> &HeadlessGrid {
    HeadlessGrid::downcast(engine.container()).expect("headless container")
}

fn control<'a>(engine: &'a mut ReflectorGrid, label: &str) -> &'a mut HeadlessControl {
    HeadlessGrid::downcast_mut(engine.container_mut())
        .and_then(|grid| grid.control_mut(label))
        .unwrap_or_else(|| panic!("no control labelled {label:?}"))
}

#[derive(Debug, Reflect)]
struct Address {
    #[grid]
    street: String,
    #[grid]
    city: String,
}

#[derive(Debug, Reflect)]
#[grid(observer)]
struct Person {
    #[grid]
    name: String,
    #[grid(tooltip = "where they live")]
    address: Address,
    #[grid]
    age: u8,
    observed: Vec<&'static str>,
}

impl FieldObserver for Person {
    fn on_field_value_changed(&mut self, field: &MemberDescriptor) {
        self.observed.push(field.name);
    }
}

fn address(street: &str) -> Address {
    Address {
        street: street.into(),
        city: "Zurich".into(),
    }
}

fn person() -> Rc<RefCell<Person>> {
    Rc::new(RefCell::new(Person {
        name: "Ada".into(),
        address: address("Main St"),
        age: 36,
        observed: Vec::new(),
    }))
}

// =============================================================================
// Layout of lifted pairs
// =============================================================================

#[test]
fn test_subform_paired_rendering() {
    let services = Arc::new(FormServices::new());
    let mut engine = engine(&services, LayoutStrategy::Paired);
    engine.bind(&person()).unwrap();

    insta::assert_snapshot!(grid(&engine).render_text(), @r#"
    00:0 label "Name"
    00:1 text "Ada"
    01:0+2 separator
    02:0 label "Address" tip="where they live"
    03:0 label "Street"
    03:1 text "Main St"
    04:0 label "City"
    04:1 text "Zurich"
    05:0+2 separator
    06:0 label "Age"
    06:1 stepper 36
    "#);
}

#[test]
fn test_subform_stacked_row_advance() {
    let services = Arc::new(FormServices::new());
    let mut engine = engine(&services, LayoutStrategy::Stacked);
    engine.bind(&person()).unwrap();

    insta::assert_snapshot!(grid(&engine).render_text(), @r#"
    00:0 label "Name"
    01:0 text "Ada"
    02:0 separator
    03:0 label "Address" tip="where they live"
    04:0 label "Street"
    05:0 text "Main St"
    06:0 label "City"
    07:0 text "Zurich"
    08:0 separator
    09:0 label "Age"
    10:0 stepper 36
    "#);

    // Rows 2..=8: two separators, one heading, and two rows per lifted pair.
    let nested_pairs = 2;
    assert_eq!(grid(&engine).row_count(), 2 + (2 + 1 + 2 * nested_pairs) + 2);
}

#[test]
fn test_nested_bindings_are_lifted() {
    let services = Arc::new(FormServices::new());
    let mut engine = engine(&services, LayoutStrategy::Paired);
    engine.bind(&person()).unwrap();

    let bound: Vec<(&str, &str)> = engine
        .bindings()
        .iter()
        .map(|binding| (binding.member.declaring_type, binding.member.name))
        .collect();
    assert_eq!(
        bound,
        [("Person", "name"), ("Address", "street"), ("Address", "city"), ("Person", "age")]
    );
}

#[test]
fn test_two_levels_of_nesting_stay_flat() {
    #[derive(Reflect)]
    struct Company {
        #[grid]
        hq: Person,
    }

    let services = Arc::new(FormServices::new());
    let company = Rc::new(RefCell::new(Company {
        hq: Person {
            name: "Head".into(),
            address: address("Bahnhofstrasse"),
            age: 12,
            observed: Vec::new(),
        },
    }));
    let mut engine = engine(&services, LayoutStrategy::Paired);
    engine.bind(&company).unwrap();

    assert_eq!(
        grid(&engine).structure(),
        [
            "separator", "label", // Hq
            "label", "text", // Name
            "separator", "label", // Address
            "label", "text", "label", "text", // Street, City
            "separator", //
            "label", "stepper", // Age
            "separator",
        ]
    );

    control(&mut engine, "Street").enter_text("Paradeplatz").unwrap();
    assert_eq!(company.borrow().hq.address.street, "Paradeplatz");
}

// =============================================================================
// Writes through nested controls
// =============================================================================

#[test]
fn test_nested_writes_reach_the_owned_composite() {
    let services = Arc::new(FormServices::new());
    let owners = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&owners);
    services.subscribe(move |change: &FieldChange<'_>| {
        sink.lock().push((change.object.type_name(), change.field.name, change.new_value.clone()));
    });

    let target = person();
    let mut engine = engine(&services, LayoutStrategy::Paired);
    engine.bind(&target).unwrap();

    control(&mut engine, "Street").enter_text("Elm St").unwrap();
    control(&mut engine, "Name").enter_text("Grace").unwrap();

    let person = target.borrow();
    assert_eq!(person.address.street, "Elm St");
    assert_eq!(person.name, "Grace");
    // The nested engine's target is the address; the person only observes its own fields.
    assert_eq!(person.observed, ["name"]);
    assert_eq!(
        *owners.lock(),
        [
            ("Address", "street", Value::Text("Elm St".into())),
            ("Person", "name", Value::Text("Grace".into())),
        ]
    );
}

#[derive(Reflect)]
struct Contact {
    #[grid]
    name: String,
    #[grid]
    address: Option<Address>,
}

#[test]
fn test_present_optional_composite_renders() {
    let services = Arc::new(FormServices::new());
    let contact = Rc::new(RefCell::new(Contact {
        name: "Lin".into(),
        address: Some(address("Quai")),
    }));
    let mut engine = engine(&services, LayoutStrategy::Paired);
    engine.bind(&contact).unwrap();
    assert_eq!(engine.bindings().len(), 3);

    control(&mut engine, "City").enter_text("Geneva").unwrap();
    assert_eq!(
        contact.borrow().address.as_ref().map(|a| a.city.as_str()),
        Some("Geneva")
    );
}

#[test]
fn test_absent_optional_composite_is_fatal() {
    let services = Arc::new(FormServices::new());
    let contact = Rc::new(RefCell::new(Contact {
        name: "Lin".into(),
        address: None,
    }));
    let mut engine = engine(&services, LayoutStrategy::Paired);
    assert_eq!(
        engine.bind(&contact),
        Err(BindError::NullComposite {
            type_name: "Contact",
            field: "address",
        })
    );
    assert!(engine.container().is_empty());
}

#[test]
fn test_shared_composite_rendered_twice_is_not_a_cycle() {
    #[derive(Reflect)]
    struct Office {
        #[grid]
        site: Rc<RefCell<Address>>,
        #[grid]
        mailing: Rc<RefCell<Address>>,
    }

    let services = Arc::new(FormServices::new());
    let shared = Rc::new(RefCell::new(address("Lake Rd")));
    let office = Rc::new(RefCell::new(Office {
        site: Rc::clone(&shared),
        mailing: Rc::clone(&shared),
    }));
    let mut engine = engine(&services, LayoutStrategy::Paired);
    engine.bind(&office).unwrap();
    assert_eq!(engine.bindings().len(), 4);

    control(&mut engine, "Street").enter_text("Hill Rd").unwrap();
    assert_eq!(shared.borrow().street, "Hill Rd");
}

// =============================================================================
// Cycles
// =============================================================================

/// A hand-written accessor table with a shared link back into the graph.
struct Ring {
    name: String,
    next: Option<Rc<RefCell<Ring>>>,
}

impl Reflect for Ring {
    fn type_name(&self) -> &'static str {
        "Ring"
    }

    fn declared_members(&self) -> Vec<MemberDescriptor> {
        vec![
            MemberDescriptor::field("Ring", "name", FieldType::Text, FieldAnnotation::DEFAULT),
            MemberDescriptor::field(
                "Ring",
                "next",
                FieldType::Composite { type_name: "Ring" },
                FieldAnnotation::DEFAULT,
            ),
        ]
    }

    fn field(&self, name: &str) -> Result<Value, ReflectError> {
        match name {
            "name" => Ok(Value::Text(self.name.clone())),
            "next" => Ok(Value::Object("Ring")),
            _ => Err(ReflectError::no_such_field("Ring", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), ReflectError> {
        match (name, value) {
            ("name", Value::Text(text)) => {
                self.name = text;
                Ok(())
            }
            _ => Err(ReflectError::no_such_field("Ring", name)),
        }
    }

    fn composite(&self, name: &str) -> Result<Composite<'_>, ReflectError> {
        match (name, &self.next) {
            ("next", Some(next)) => {
                let shared: SharedTarget = next.clone();
                Ok(Composite::Shared(shared))
            }
            ("next", None) => Ok(Composite::Null),
            _ => Err(ReflectError::not_composite("Ring", name)),
        }
    }

    fn composite_mut(&mut self, name: &str) -> Result<CompositeMut<'_>, ReflectError> {
        match (name, &self.next) {
            ("next", Some(next)) => {
                let shared: SharedTarget = next.clone();
                Ok(CompositeMut::Shared(shared))
            }
            ("next", None) => Ok(CompositeMut::Null),
            _ => Err(ReflectError::not_composite("Ring", name)),
        }
    }
}

fn ring(name: &str) -> Rc<RefCell<Ring>> {
    Rc::new(RefCell::new(Ring {
        name: name.into(),
        next: None,
    }))
}

#[test]
fn test_self_reference_is_a_cycle() {
    let services = Arc::new(FormServices::new());
    let a = ring("a");
    a.borrow_mut().next = Some(Rc::clone(&a));

    let mut engine = engine(&services, LayoutStrategy::Paired);
    assert_eq!(
        engine.bind(&a),
        Err(BindError::CyclicGraph {
            type_name: "Ring",
            field: "next",
        })
    );
    a.borrow_mut().next = None;
}

#[test]
fn test_transitive_cycle_is_detected() {
    let services = Arc::new(FormServices::new());
    let a = ring("a");
    let b = ring("b");
    a.borrow_mut().next = Some(Rc::clone(&b));
    b.borrow_mut().next = Some(Rc::clone(&a));

    let mut engine = engine(&services, LayoutStrategy::Stacked);
    let result = engine.bind(&a);
    assert_eq!(
        result,
        Err(BindError::CyclicGraph {
            type_name: "Ring",
            field: "next",
        })
    );
    assert!(engine.bindings().is_empty());
    b.borrow_mut().next = None;
}
