use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Fields, LitStr};

use crate::attrs::parse_name_override;

pub(crate) fn derive_record(input: &DeriveInput) -> TokenStream {
    match impl_record(input) {
        Ok(ts) => ts.into(),
        Err(e) => e.into_compile_error().into(),
    }
}

fn impl_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let Data::Struct(DataStruct {
        fields: Fields::Named(fields),
        ..
    }) = &input.data
    else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Record)] only supports structs with named fields",
        ));
    };
    // The class lives in a per-type static, which generic items cannot have.
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Record)] does not support generic structs",
        ));
    }

    let class_name = parse_name_override(&input.attrs, "record")?.unwrap_or_else(|| name.to_string());
    let class_lit = LitStr::new(&class_name, name.span());

    let len = fields.named.len();
    let mut field_defs = Vec::with_capacity(len);
    let mut into_values = Vec::with_capacity(len);
    let mut from_values = Vec::with_capacity(len);
    let mut seen = HashSet::with_capacity(len);

    for f in &fields.named {
        let Some(ident) = f.ident.as_ref() else {
            return Err(syn::Error::new_spanned(f, "field without a name"));
        };
        let ty = &f.ty;
        let field_name = parse_name_override(&f.attrs, "record")?.unwrap_or_else(|| ident.to_string());
        if !seen.insert(field_name.clone()) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("duplicate record field name `{field_name}`"),
            ));
        }
        let field_lit = LitStr::new(&field_name, ident.span());

        field_defs.push(quote! {
            ::typed_arrow_ext::item::RecordField::new(
                #field_lit,
                <#ty as ::typed_arrow_ext::bridge::ItemType>::item_class(),
                <#ty as ::typed_arrow_ext::bridge::ItemType>::NULLABLE,
            )
        });
        into_values.push(quote! {
            ::typed_arrow_ext::bridge::ItemType::into_item(self.#ident)
        });
        from_values.push(quote! {
            #ident: <#ty as ::typed_arrow_ext::bridge::ItemType>::from_item(
                __values.next().flatten(),
            )?
        });
    }

    Ok(quote! {
        impl #name {
            #[doc(hidden)]
            fn __record_class() -> &'static ::std::sync::Arc<::typed_arrow_ext::item::RecordClass> {
                static CLASS: ::std::sync::OnceLock<::std::sync::Arc<::typed_arrow_ext::item::RecordClass>> =
                    ::std::sync::OnceLock::new();
                CLASS.get_or_init(|| {
                    let __class = ::typed_arrow_ext::item::RecordClass::new(
                        #class_lit,
                        ::std::vec![#(#field_defs),*],
                    )
                    .expect("struct field names are unique");
                    ::std::sync::Arc::new(__class)
                })
            }
        }

        impl ::typed_arrow_ext::bridge::ItemType for #name {
            fn item_class() -> ::typed_arrow_ext::item::ItemClass {
                ::typed_arrow_ext::item::ItemClass::Record(::std::sync::Arc::clone(Self::__record_class()))
            }

            fn into_item(self) -> ::core::option::Option<::typed_arrow_ext::item::Item> {
                let __value = ::typed_arrow_ext::item::RecordValue::new(
                    ::std::sync::Arc::clone(Self::__record_class()),
                    ::std::vec![#(#into_values),*],
                )
                .expect("one value per declared field");
                ::core::option::Option::Some(::typed_arrow_ext::item::Item::Record(__value))
            }

            fn from_item(
                item: ::core::option::Option<::typed_arrow_ext::item::Item>,
            ) -> ::typed_arrow_ext::error::Result<Self> {
                match item {
                    ::core::option::Option::Some(::typed_arrow_ext::item::Item::Record(__record))
                        if __record.class().name() == #class_lit && __record.values().len() == #len =>
                    {
                        let mut __values = __record.into_values().into_iter();
                        ::core::result::Result::Ok(Self { #(#from_values),* })
                    }
                    other => ::core::result::Result::Err(
                        ::typed_arrow_ext::bridge::mismatch::<Self>(other),
                    ),
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn renamed_fields_must_stay_unique() {
        let input: DeriveInput = parse_quote! {
            struct Clash {
                #[record(name = "v")]
                a: i64,
                #[record(name = "v")]
                b: i64,
            }
        };
        let err = impl_record(&input).unwrap_err();
        assert_eq!(err.to_string(), "duplicate record field name `v`");
    }

    #[test]
    fn rename_may_take_a_free_name() {
        let input: DeriveInput = parse_quote! {
            struct Swap {
                #[record(name = "b")]
                a: i64,
                c: i64,
            }
        };
        assert!(impl_record(&input).is_ok());
    }

    #[test]
    fn generics_are_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T> {
                inner: T,
            }
        };
        assert!(impl_record(&input).is_err());
    }
}
