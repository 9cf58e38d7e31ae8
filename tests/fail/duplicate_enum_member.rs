use typed_arrow_ext::IntEnum;

#[derive(IntEnum)]
#[allow(dead_code)]
enum Clash {
    #[int_enum(name = "same")]
    First,
    #[int_enum(name = "same")]
    Second,
}

fn main() {}
