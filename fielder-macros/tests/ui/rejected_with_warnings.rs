#[fielder_macros::inject]
mod inventory {
    #[fielder(name = "count", ty = u32)]
    #[derive(Default)]
    pub struct Stock {
        pub count: u32,
    }

    #[fielder(name = "code", ty = u32)]
    pub enum Kind {
        Tool,
    }
}

fn main() {
    let stock = inventory::Stock::default();
    assert_eq!(stock.count, 0);
    let _ = inventory::Kind::Tool;
}
