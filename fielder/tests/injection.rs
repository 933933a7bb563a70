//! Round-level behavior over real Rust sources.
//!
//! Each test lowers a small module, runs one round through the CLI host and
//! inspects the resulting tree and diagnostics.

use std::path::Path;

use fielder::coordinator::Coordinator;
use fielder::environment::default_providers;
use fielder::host::lower::lower;
use fielder::{Diagnostics, Injected, InsertionPolicy, Injector, Severity, SourceHost};

fn inject(source: &str) -> Injected {
    inject_with(source, InsertionPolicy::Prepend)
}

fn inject_with(source: &str, policy: InsertionPolicy) -> Injected {
    Injector::new(SourceHost::Cli)
        .policy(policy)
        .inject_source(source, Path::new("test.rs"))
        .expect("source should parse")
}

#[test]
fn existing_field_is_never_duplicated() {
    let injected = inject(
        r#"
        #[fielder(name = "value", ty = i64)]
        #[derive(Default)]
        pub struct Item {
            pub value: i64,
        }
        "#,
    );
    let round = &injected.round;

    assert_eq!(round.field_names("Item"), vec!["value"]);
    assert!(round.summary.injected.is_empty());
    assert_eq!(round.count(Severity::Warning), 1);
    assert_eq!(round.diagnostics.len(), 1);
}

#[test]
fn zero_argument_constructor_gates_injection() {
    let without = inject(
        r#"
        #[fielder(name = "x", ty = u8)]
        pub struct Car { wheels: u8 }

        impl Car {
            pub fn with_wheels(wheels: u8) -> Self { Car { wheels } }
        }
        "#,
    );
    assert_eq!(without.round.field_names("Car"), vec!["wheels"]);
    assert_eq!(without.round.count(Severity::Error), 1);
    assert_eq!(without.round.diagnostics.len(), 1);
    let message = &without.round.diagnostics().next().unwrap().message;
    assert!(message.contains("zero-argument constructor"), "{message}");

    let with = inject(
        r#"
        #[fielder(name = "x", ty = u8)]
        pub struct Car { wheels: u8 }

        impl Car {
            pub fn with_wheels(wheels: u8) -> Self { Car { wheels } }
            pub fn new() -> Self { Car { wheels: 4 } }
        }
        "#,
    );
    assert_eq!(with.round.field_names("Car"), vec!["x", "wheels"]);
    assert!(!with.round.has_errors());
}

#[test]
fn only_named_structs_accept_fields() {
    let injected = inject(
        r#"
        #[fielder(name = "code", ty = u32)]
        pub enum Kind { Product, Service }

        impl Kind {
            pub fn new() -> Self { Kind::Product }
        }

        #[fielder(name = "code", ty = u32)]
        #[derive(Default)]
        pub struct Pair(u8, u8);
        "#,
    );
    let round = &injected.round;

    assert!(round.summary.injected.is_empty());
    assert_eq!(round.count(Severity::Warning), 2);
    assert_eq!(round.count(Severity::Error), 0);
    let subjects: Vec<_> = round.located().into_iter().filter_map(|d| d.subject).collect();
    assert_eq!(subjects, vec!["enum `Kind`", "tuple struct `Pair`"]);
}

#[test]
fn specs_are_processed_independently() {
    let source = r#"
        #[add_fields(
            field(name = "a", ty = String, modifiers = 1),
            field(name = "b", ty = String, modifiers = 1),
            field(name = "c", ty = u8, modifiers = 1),
        )]
        #[derive(Default)]
        pub struct Item {
            pub b: String,
        }
    "#;

    let prepended = inject(source);
    assert_eq!(prepended.round.field_names("Item"), vec!["c", "a", "b"]);
    assert_eq!(prepended.round.summary.injected.len(), 2);
    assert_eq!(prepended.round.summary.skipped, 1);
    assert_eq!(prepended.round.count(Severity::Warning), 1);
    assert_eq!(prepended.round.count(Severity::Note), 2);

    let ordered = inject_with(source, InsertionPolicy::DeclarationOrder);
    assert_eq!(ordered.round.field_names("Item"), vec!["a", "c", "b"]);
}

#[test]
fn unresolvable_type_only_fails_its_own_field() {
    let injected = inject(
        r#"
        use std::time::Duration;

        #[add_fields(
            field(name = "first", ty = Duration),
            field(name = "ghost", ty = Nowhere),
            field(name = "third", ty = "std::net::Ipv4Addr"),
        )]
        #[derive(Default)]
        pub struct Probe {}
        "#,
    );
    let round = &injected.round;

    assert_eq!(round.field_names("Probe"), vec!["third", "first"]);
    assert_eq!(round.count(Severity::Error), 1);
    let error = round
        .diagnostics()
        .find(|d| d.severity == Severity::Error)
        .unwrap();
    assert!(error.message.contains("Nowhere"), "{}", error.message);
}

#[test]
fn second_round_over_same_tree_skips_everything() {
    let file = syn::parse_file(
        r#"
        #[add_fields(field(name = "model", ty = String), field(name = "year", ty = u16))]
        #[derive(Default)]
        pub struct Car { wheels: u8 }
        "#,
    )
    .unwrap();
    let mut unit = lower(&file.items);
    let coordinator = Coordinator::for_environment(&SourceHost::Cli, &default_providers()).unwrap();

    let mut first = Diagnostics::new();
    let summary = coordinator.process(&mut unit.tree, &unit.batch, &unit.types, &mut first);
    assert_eq!(summary.injected.len(), 2);

    let mut second = Diagnostics::new();
    let summary = coordinator.process(&mut unit.tree, &unit.batch, &unit.types, &mut second);
    assert!(summary.injected.is_empty());
    assert_eq!(summary.skipped, 2);
    assert_eq!(second.count(Severity::Warning), 2);

    let car = unit.tree.types().next().unwrap().0;
    assert_eq!(unit.tree.fields(car).count(), 3);
}

#[test]
fn malformed_annotations_are_reported_per_type() {
    let injected = inject(
        r#"
        #[fielder(name = "ok", ty = u8)]
        #[add_fields(field(name = "shared", ty = u8, modifiers = "public static"))]
        #[derive(Default)]
        pub struct Item {}

        #[fielder(nam = "typo", ty = u8)]
        #[derive(Default)]
        pub struct Other {}
        "#,
    );
    let round = &injected.round;

    assert_eq!(round.field_names("Item"), vec!["ok"]);
    assert!(round.field_names("Other").is_empty());
    assert_eq!(round.count(Severity::Error), 2);
    assert_eq!(round.count(Severity::Note), 1);
}

#[test]
fn types_in_inline_modules_are_injected() {
    let injected = inject(
        r#"
        pub mod models {
            #[fielder(name = "id", ty = u64)]
            pub struct User { pub name: String }

            impl User {
                pub fn new() -> Self { User { name: String::new() } }
            }
        }
        "#,
    );

    assert_eq!(injected.round.field_names("User"), vec!["id", "name"]);
    assert!(injected.round.span(injected.round.summary.injected[0].target).is_some());
}
