use typed_arrow_ext::Record;

#[derive(Record)]
#[allow(dead_code)]
struct Clash {
    #[record(name = "v")]
    a: i64,
    #[record(name = "v")]
    b: i64,
}

fn main() {}
