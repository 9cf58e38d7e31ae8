//! Proc-macros for typed-arrow-ext: `#[derive(Record)]` and `#[derive(IntEnum)]`.

mod attrs;
mod int_enum;
mod record;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Bind a struct with named fields to a record item class.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::derive_record(&input)
}

/// Bind a fieldless enum to an integer enumeration item class.
#[proc_macro_derive(IntEnum, attributes(int_enum))]
pub fn derive_int_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    int_enum::derive_int_enum(&input)
}
