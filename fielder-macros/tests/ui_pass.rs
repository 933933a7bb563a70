//! Modules expanded by `#[inject]` compile and behave as written.

#[test]
fn ui_pass() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/*.rs");
}
