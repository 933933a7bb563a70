#[fielder_macros::inject]
mod models {
    #[fielder(name = "id", ty = u64)]
    #[derive(Debug, Default)]
    pub struct User {
        pub name: String,
    }

    impl User {
        pub fn named(name: &str) -> Self {
            User { name: name.to_string() }
        }
    }
}

fn main() {
    let user = models::User::named("ada");
    assert_eq!(user.id, 0);
    assert_eq!(user.name, "ada");
}
