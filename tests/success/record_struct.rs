use typed_arrow_ext::prelude::*;
use typed_arrow_ext::Record;

#[derive(Record)]
pub struct User {
    name: String,
    email: Option<String>,
    age: u8,
}

fn main() {
    let _ = User::item_class();
}
