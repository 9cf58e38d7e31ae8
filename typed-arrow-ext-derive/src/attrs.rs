use syn::{Attribute, LitStr};

/// `name = "..."` from `#[<attr_name>(...)]`, e.g. `#[record(name = "custom")]`.
pub(crate) fn parse_name_override(
    attrs: &[Attribute],
    attr_name: &str,
) -> syn::Result<Option<String>> {
    let mut name: Option<String> = None;
    for attr in attrs {
        if !attr.path().is_ident(attr_name) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let s: LitStr = meta.value()?.parse()?;
                if name.is_some() {
                    return Err(meta.error("duplicate `name` override"));
                }
                name = Some(s.value());
                Ok(())
            } else {
                Err(meta.error(format!("unsupported #[{attr_name}] attribute")))
            }
        })?;
    }
    Ok(name)
}
