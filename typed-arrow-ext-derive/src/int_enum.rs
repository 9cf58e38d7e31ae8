use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Meta, Token, punctuated::Punctuated};

use crate::attrs::parse_name_override;

pub(crate) fn derive_int_enum(input: &DeriveInput) -> TokenStream {
    match impl_int_enum(input) {
        Ok(ts) => ts.into(),
        Err(e) => e.into_compile_error().into(),
    }
}

/// Members are stored as `i64`; wider unsigned discriminants would wrap.
fn check_repr(attrs: &[Attribute]) -> syn::Result<()> {
    for attr in attrs.iter().filter(|a| a.path().is_ident("repr")) {
        let reprs = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for repr in &reprs {
            match repr {
                Meta::Path(path) if ["u64", "usize", "u128", "i128"].iter().any(|ty| path.is_ident(ty)) => {
                    return Err(syn::Error::new_spanned(
                        path,
                        "#[derive(IntEnum)] stores members as i64; use a repr of at most 64 signed bits",
                    ));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn impl_int_enum(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(IntEnum)] only supports enums",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(IntEnum)] does not support generic enums",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(IntEnum)] requires at least one variant",
        ));
    }

    check_repr(&input.attrs)?;

    let class_name =
        parse_name_override(&input.attrs, "int_enum")?.unwrap_or_else(|| name.to_string());
    let class_lit = LitStr::new(&class_name, name.span());

    let mut members = Vec::with_capacity(data.variants.len());
    let mut to_names = Vec::with_capacity(data.variants.len());
    let mut from_names = Vec::with_capacity(data.variants.len());
    let mut seen = HashSet::with_capacity(data.variants.len());
    for v in &data.variants {
        if !matches!(v.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                v,
                "#[derive(IntEnum)] variants cannot carry fields",
            ));
        }
        let ident = &v.ident;
        let member = parse_name_override(&v.attrs, "int_enum")?.unwrap_or_else(|| ident.to_string());
        if !seen.insert(member.clone()) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("duplicate enum member name `{member}`"),
            ));
        }
        let member_lit = LitStr::new(&member, ident.span());
        members.push(quote! { (#member_lit, #name::#ident as i64) });
        to_names.push(quote! { #name::#ident => #member_lit });
        from_names.push(quote! { #member_lit => ::core::option::Option::Some(#name::#ident) });
    }

    Ok(quote! {
        impl #name {
            #[doc(hidden)]
            fn __enum_class() -> &'static ::std::sync::Arc<::typed_arrow_ext::item::EnumClass> {
                static CLASS: ::std::sync::OnceLock<::std::sync::Arc<::typed_arrow_ext::item::EnumClass>> =
                    ::std::sync::OnceLock::new();
                CLASS.get_or_init(|| {
                    let __class = ::typed_arrow_ext::item::EnumClass::new(
                        #class_lit,
                        [#(#members),*],
                    )
                    .expect("variant names are unique");
                    ::std::sync::Arc::new(__class)
                })
            }
        }

        impl ::typed_arrow_ext::bridge::ItemType for #name {
            fn item_class() -> ::typed_arrow_ext::item::ItemClass {
                ::typed_arrow_ext::item::ItemClass::Enum(::std::sync::Arc::clone(Self::__enum_class()))
            }

            fn into_item(self) -> ::core::option::Option<::typed_arrow_ext::item::Item> {
                let __name = match self { #(#to_names),* };
                let __member = ::typed_arrow_ext::item::EnumValue::from_name(Self::__enum_class(), __name)
                    .expect("variant is a member of its own class");
                ::core::option::Option::Some(::typed_arrow_ext::item::Item::Enum(__member))
            }

            fn from_item(
                item: ::core::option::Option<::typed_arrow_ext::item::Item>,
            ) -> ::typed_arrow_ext::error::Result<Self> {
                match item {
                    ::core::option::Option::Some(::typed_arrow_ext::item::Item::Enum(__member))
                        if __member.class().name() == #class_lit =>
                    {
                        let __found = match __member.name() {
                            #(#from_names,)*
                            _ => ::core::option::Option::None,
                        };
                        __found.ok_or_else(|| {
                            ::typed_arrow_ext::bridge::mismatch::<Self>(::core::option::Option::Some(
                                ::typed_arrow_ext::item::Item::Enum(__member),
                            ))
                        })
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
    fn renamed_variants_must_stay_unique() {
        let input: DeriveInput = parse_quote! {
            enum Clash {
                #[int_enum(name = "same")]
                First,
                #[int_enum(name = "same")]
                Second,
            }
        };
        let err = impl_int_enum(&input).unwrap_err();
        assert_eq!(err.to_string(), "duplicate enum member name `same`");
    }

    #[test]
    fn wide_unsigned_reprs_are_rejected() {
        let input: DeriveInput = parse_quote! {
            #[repr(u64)]
            enum Big {
                Top = 18_446_744_073_709_551_615,
            }
        };
        assert!(impl_int_enum(&input).is_err());

        let input: DeriveInput = parse_quote! {
            #[repr(C, i32)]
            enum Small {
                Low = -1,
                High = 7,
            }
        };
        assert!(impl_int_enum(&input).is_ok());
    }
}
