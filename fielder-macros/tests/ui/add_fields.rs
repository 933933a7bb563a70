use fielder_macros::inject;

#[inject(insertion = "declaration-order")]
mod shop {
    use std::time::Duration;

    #[add_fields(
        field(name = "sku", ty = String, modifiers = "public"),
        field(name = "ttl", ty = Duration, modifiers = "protected final"),
        field(name = "hidden", ty = bool),
    )]
    pub struct Product {
        pub title: String,
    }

    impl Product {
        pub fn new() -> Self {
            Self { title: String::from("lamp") }
        }

        pub fn is_hidden(&self) -> bool {
            self.hidden
        }
    }
}

fn main() {
    let product = shop::Product::new();
    assert_eq!(product.title, "lamp");
    assert!(product.sku.is_empty());
    assert_eq!(product.ttl, std::time::Duration::ZERO);
    assert!(!product.is_hidden());
}
