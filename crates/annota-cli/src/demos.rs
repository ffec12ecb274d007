//! Demo targets for `annota run`.
//!
//! `Greeter` exercises expected-type checks on method results, `Person`
//! exercises strategy validation on fields.

use annota_engine::{
    ClassBuilder, ClassMetadata, DispatchEngine, DispatchReport, Introspect, MetadataCell,
    NonEmptyString, PositiveNumber, RegistrationError, Type,
};
use clap::ValueEnum;

/// Which demo targets to dispatch over
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Greeter methods checked against expected result types
    ExpectedTypes,
    /// Person fields checked by validation strategies
    Validation,
    /// Both of the above
    All,
}

pub struct Greeter;

impl Greeter {
    fn message(&self) -> String {
        "Hello, World!".to_string()
    }

    fn number(&self) -> i64 {
        42
    }
}

impl Introspect for Greeter {
    fn class_metadata() -> Result<&'static ClassMetadata<Self>, RegistrationError> {
        static META: MetadataCell<Greeter> = MetadataCell::new();
        META.get_or_try_init(|| {
            Ok(ClassBuilder::new("Greeter")
                .method("message", Type::string(), Greeter::message)?
                .method("number", Type::int(), Greeter::number)?
                .expect_type("message", Type::string())?
                // Deliberately wrong: number() returns an int
                .expect_type("number", Type::string())?
                .build())
        })
    }
}

pub struct Person {
    name: String,
    age: i64,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

impl Introspect for Person {
    fn class_metadata() -> Result<&'static ClassMetadata<Self>, RegistrationError> {
        static META: MetadataCell<Person> = MetadataCell::new();
        META.get_or_try_init(|| {
            Ok(ClassBuilder::new("Person")
                .field("name", Type::string(), |p: &Person| p.name.clone())?
                .field("age", Type::int(), |p: &Person| p.age)?
                .validate_with::<NonEmptyString>("name")?
                .validate_with::<PositiveNumber>("age")?
                .build())
        })
    }
}

fn people() -> Vec<Person> {
    vec![
        Person::new("Ada", 36),
        Person::new("", 30),
        Person::new("Bob", -5),
    ]
}

/// Dispatch over the selected demo targets
pub fn run(engine: &DispatchEngine, demo: Demo) -> Result<Vec<DispatchReport>, RegistrationError> {
    let mut reports = Vec::new();

    if matches!(demo, Demo::ExpectedTypes | Demo::All) {
        reports.push(engine.run(&Greeter)?);
    }
    if matches!(demo, Demo::Validation | Demo::All) {
        for person in people() {
            reports.push(engine.run(&person)?);
        }
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use annota_engine::Value;

    #[test]
    fn test_greeter_demo() {
        let reports = run(&DispatchEngine::default(), Demo::ExpectedTypes).unwrap();
        assert_eq!(reports.len(), 1);

        let greeter = &reports[0];
        assert_eq!(greeter.class, "Greeter");
        let message = greeter.entries[0].as_outcome().unwrap();
        assert_eq!(message.value, Value::from("Hello, World!"));
        assert!(message.verdict);
        let number = greeter.entries[1].as_outcome().unwrap();
        assert_eq!(number.actual, "int");
        assert!(!number.verdict);
    }

    #[test]
    fn test_validation_demo() {
        let reports = run(&DispatchEngine::default(), Demo::Validation).unwrap();
        let verdicts: Vec<Vec<bool>> = reports
            .iter()
            .map(|r| r.entries.iter().map(|e| e.passed()).collect())
            .collect();
        assert_eq!(
            verdicts,
            vec![vec![true, true], vec![false, true], vec![true, false]]
        );
    }

    #[test]
    fn test_all_demos() {
        let reports = run(&DispatchEngine::default(), Demo::All).unwrap();
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.completed));
    }
}
