use conformant::catalog::{
    self, Adjustable, CounterDataSource, Dial, FullyNamed, HasValue, Hamster, Location, Person,
    PrettyTextRepresentable, Starship, TextRepresentable, Togglable, TowardsZeroSource,
};
use conformant::conformance::{verify, ContractViolation, Described, Semantics, TypeDescriptor};
use conformant::contract::{Access, Contract, Member};
use conformant::object::Object;
use conformant::registry::ConformanceRegistry;
use conformant::ConformantError;

fn descriptor_of<C: Contract + ?Sized>() -> &'static conformant::contract::ContractDescriptor {
    C::descriptor()
}

#[test]
fn catalog_types_pass_their_audits() {
    assert_eq!(verify(&Person::describe(), descriptor_of::<dyn FullyNamed>()), Ok(()));
    assert_eq!(verify(&Starship::describe(), descriptor_of::<dyn FullyNamed>()), Ok(()));
    assert_eq!(verify(&Dial::describe(), descriptor_of::<dyn Adjustable>()), Ok(()));
    assert_eq!(
        verify(&TowardsZeroSource::describe(), descriptor_of::<dyn CounterDataSource>()),
        Ok(())
    );
}

#[test]
fn missing_member_is_reported() {
    let described = TypeDescriptor::new("Blank", Semantics::Value);
    let violation = verify(&described, descriptor_of::<dyn HasValue>()).unwrap_err();
    assert!(matches!(
        violation,
        ContractViolation::MissingMember { type_name: "Blank", contract: "HasValue", .. }
    ));
}

#[test]
fn read_only_property_cannot_meet_read_write_requirement() {
    let described = TypeDescriptor::new("FixedDial", Semantics::Value)
        .provide(Member::property("level", "i64", Access::Get))
        .provide(Member::property("ceiling", "i64", Access::Get));
    let violation = verify(&described, descriptor_of::<dyn Adjustable>()).unwrap_err();
    assert!(matches!(violation, ContractViolation::InsufficientAccess { .. }));
}

#[test]
fn read_write_property_meets_read_only_requirement() {
    let described = TypeDescriptor::new("Nameplate", Semantics::Value)
        .provide(Member::property("full_name", "String", Access::GetSet));
    assert_eq!(verify(&described, descriptor_of::<dyn FullyNamed>()), Ok(()));
}

#[test]
fn property_of_the_wrong_type_is_a_mismatch() {
    let described = TypeDescriptor::new("Measured", Semantics::Value)
        .provide(Member::property("value", "f64", Access::Get));
    let violation = verify(&described, descriptor_of::<dyn HasValue>()).unwrap_err();
    assert!(matches!(violation, ContractViolation::SignatureMismatch { .. }));
}

#[test]
fn mutating_method_requires_a_mutating_requirement() {
    // reading only is fine where mutation is allowed
    let reading = TypeDescriptor::new("Bell", Semantics::Value)
        .provide(Member::method("toggle", &[], "()"));
    assert_eq!(verify(&reading, descriptor_of::<dyn Togglable>()), Ok(()));

    let described = TypeDescriptor::new("Stamp", Semantics::Value)
        .provide(Member::mutating_method("increment", &["i64"], "Option<i64>"));
    let violation = verify(&described, descriptor_of::<dyn CounterDataSource>()).unwrap_err();
    assert!(matches!(violation, ContractViolation::SignatureMismatch { .. }));
}

#[test]
fn optional_members_may_be_left_out() {
    let described = TypeDescriptor::new("Silent", Semantics::Value);
    assert_eq!(verify(&described, descriptor_of::<dyn CounterDataSource>()), Ok(()));
}

#[test]
fn value_type_cannot_meet_reference_only_contract() {
    let described = TypeDescriptor::new("Spot", Semantics::Value)
        .provide(Member::method("handle", &[], "&dyn Handle"))
        .provide(Member::property("latitude", "f64", Access::Get))
        .provide(Member::property("longitude", "f64", Access::Get));
    let violation = verify(&described, descriptor_of::<dyn Location>()).unwrap_err();
    assert_eq!(
        violation,
        ContractViolation::ValueSemantics { type_name: "Spot", contract: "Location" }
    );
}

#[test]
fn inherited_requirements_are_checked() {
    let described = TypeDescriptor::new("Caption", Semantics::Value)
        .provide(Member::property("pretty_text_description", "String", Access::Get));
    let violation = verify(&described, descriptor_of::<dyn PrettyTextRepresentable>()).unwrap_err();
    assert!(matches!(
        violation,
        ContractViolation::MissingMember { contract: "PrettyTextRepresentable", .. }
    ));
}

#[test]
fn child_contract_needs_its_parent_declared_first() {
    let registry = ConformanceRegistry::new();
    let error = registry
        .declare::<Hamster, dyn PrettyTextRepresentable>()
        .unwrap_err();
    assert!(matches!(
        error,
        ConformantError::MissingParent {
            type_name: "Hamster",
            contract: "PrettyTextRepresentable",
            parent: "TextRepresentable",
        }
    ));
    assert!(!registry.declare::<Hamster, dyn TextRepresentable>().unwrap());
    assert!(!registry.declare::<Hamster, dyn PrettyTextRepresentable>().unwrap());
}

#[test]
fn declaring_twice_reports_previously_kept() {
    let registry = ConformanceRegistry::new();
    assert!(!registry.declare::<Person, dyn FullyNamed>().unwrap());
    assert!(registry.declare::<Person, dyn FullyNamed>().unwrap());
    assert_eq!(registry.conformers_of::<dyn FullyNamed>(), vec!["Person"]);
}

#[test]
fn described_declaration_is_kept() {
    let registry = ConformanceRegistry::new();
    // a read-only full name is all FullyNamed asks for
    registry.declare_described::<Starship, dyn FullyNamed>().unwrap();
    assert!(registry.conforms::<dyn FullyNamed>(&Starship::new("Enterprise", Some("USS"))));
    assert!(!registry.conforms::<dyn Object>(&Starship::new("Enterprise", Some("USS"))));
}

#[test]
fn registry_knows_the_contracts_of_a_type() {
    let registry = catalog::registry().unwrap();
    let contracts = registry.contracts_of(std::any::TypeId::of::<Hamster>());
    assert_eq!(contracts, vec!["TextRepresentable", "PrettyTextRepresentable"]);
    let pretty = registry.contract("PrettyTextRepresentable").unwrap();
    assert!(pretty.extends("TextRepresentable"));
    assert_eq!(pretty.effective_requirements().len(), 2);
    assert!(registry.contract("Location").unwrap().is_reference_only());
}

#[test]
fn report_lists_contracts_and_conformers() {
    let registry = catalog::registry().unwrap();
    let report = registry.report();
    let has_value = report
        .contracts
        .iter()
        .find(|entry| entry.name == "HasValue")
        .unwrap();
    assert_eq!(has_value.conformers, vec!["StructWithValue", "ClassWithValue"]);

    let text = report.to_string();
    assert!(text.contains("Location: Object (reference types only)"));
    assert!(text.contains("    property level: i64 { get set }"));

    let json = serde_json::to_value(&report).unwrap();
    let first = &json["contracts"][0];
    assert_eq!(first["name"], "FullyNamed");
    assert_eq!(first["requirements"][0]["kind"], "property");
    assert_eq!(first["requirements"][0]["access"], "get");
}
