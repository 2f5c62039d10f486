mod common;

use std::collections::HashMap;

use common::*;
use sinaa_container::prelude::*;

#[test]
fn configuration() {
    let factory = ConfiguredFactory::new(catalog());
    factory.init(concrete_types(), HashMap::new(), configurations());

    let a = factory.make::<ComplexA>("ComplexA", Arguments::new()).unwrap();
    assert_eq!(
        a.to_string(),
        "ComplexA:SimpleB-OK:string=hello world:boolean=yes:defaultBoolean=yes"
    );

    let a = factory
        .make::<ComplexA>("ComplexA", Arguments::new().with("string", "hello"))
        .unwrap();
    assert_eq!(
        a.to_string(),
        "ComplexA:SimpleB-OK:string=hello:boolean=yes:defaultBoolean=yes"
    );

    factory.set_configuration(
        "ComplexA",
        Configuration::from([
            ("string".to_owned(), Value::from("world")),
            ("boolean".to_owned(), Value::from(false)),
        ]),
    );
    let a = factory.make::<ComplexA>("ComplexA", Arguments::new()).unwrap();
    assert_eq!(
        a.to_string(),
        "ComplexA:SimpleB-OK:string=world:boolean=no:defaultBoolean=no"
    );

    factory.init(HashMap::new(), HashMap::new(), HashMap::new());
    assert!(factory.configurations().is_empty());
    assert!(factory.concrete_types().is_empty());
}

#[test]
fn settings_file() {
    let settings = FactorySettings::from_json(SETTINGS_JSON).unwrap();
    let factory = ConfiguredFactory::with_settings(catalog(), settings);

    let a = factory.make::<ComplexA>("ComplexA", Arguments::new()).unwrap();
    assert_eq!(
        a.to_string(),
        "ComplexA:SimpleB-OK:string=hello world:boolean=yes:defaultBoolean=yes"
    );

    let replaced_b = factory.make::<ConcreteB>("ReplacedB", Arguments::new()).unwrap();
    assert_eq!(replaced_b.exist(), "AbstractC-OK:ConcreteB-OK");
}

#[test]
fn configuration_applies_to_members() {
    let factory = ConfiguredFactory::new(catalog());
    factory.set_configuration(
        "InitializeA",
        Configuration::from([("string".to_owned(), Value::from("configured"))]),
    );

    let init_a = factory.make::<InitializeA>("InitializeA::init", Arguments::new()).unwrap();
    assert_eq!(init_a.to_string(), "InitializeA:SimpleB-OK:string=configured");
}

#[test]
fn configured_factory_is_passed_to_callbacks() {
    let factory = ConfiguredFactory::new(catalog());
    factory.set_configurations(configurations());
    factory.set_callback("ReplacedB", |resolver: &dyn Resolver, _: &TypeKey, _: &Arguments| {
        resolver.create("ComplexA", Arguments::new())
    });

    let a = factory.make::<ComplexA>("ReplacedB", Arguments::new()).unwrap();
    assert_eq!(
        a.to_string(),
        "ComplexA:SimpleB-OK:string=hello world:boolean=yes:defaultBoolean=yes"
    );
}

#[test]
fn plain_factory_ignores_configurations() {
    let settings = FactorySettings::from_json(SETTINGS_JSON).unwrap();
    let factory = Factory::with_settings(catalog(), settings);

    assert_eq!(factory.concrete_types().len(), 3);
    assert!(matches!(
        factory.create("ComplexA", Arguments::new()),
        Err(SinaaError::MissingArgument(_))
    ));
}

#[test]
fn broken_settings_are_reported() {
    match FactorySettings::from_json(r#"{ "ambiguity": "sometimes" }"#) {
        Err(SinaaError::Settings(err)) => assert!(err.to_string().contains("sometimes")),
        other => panic!("Expected Settings error, got: {other:?}"),
    }
}
