use typed_arrow_ext::IntEnum;

#[derive(IntEnum)]
#[repr(u64)]
#[allow(dead_code)]
enum Huge {
    Big = u64::MAX,
}

fn main() {}
