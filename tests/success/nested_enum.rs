use typed_arrow_ext::{IntEnum, Record, bridge::ItemType};

#[derive(IntEnum)]
#[int_enum(name = "Suit")]
enum CardSuit {
    Hearts,
    Spades = 4,
    #[int_enum(name = "clubs")]
    Clubs,
}

#[derive(Record)]
struct Card {
    suit: CardSuit,
    rank: Option<u8>,
}

#[derive(Record)]
struct Hand {
    #[record(name = "first_card")]
    first: Card,
    second: Option<Card>,
}

fn main() {
    let _ = Hand::item_class();
    let _ = CardSuit::Clubs.into_item();
}
