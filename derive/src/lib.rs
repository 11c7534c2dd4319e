extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashMap;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, GenericArgument,
    PathArguments, Type,
};

/// Field attributes parsed from `#[tlv(...)]` annotations
///
/// # Fields
///
/// * `tag` - Context tag of the field, required
/// * `optional` - The field may be absent from the structure
/// * `nullable` - The field is present but may be null
/// * `rename` - Label used in the descriptor instead of the field name
#[derive(Debug, Clone, Default)]
struct FieldAttributes {
    tag: Option<u8>,
    optional: bool,
    nullable: bool,
    rename: Option<String>,
}

/// Extract and parse `#[tlv(...)]` attribute values from field attributes
///
/// Multiple attributes can be combined, in one or several annotations:
/// `#[tlv(tag = 3, nullable)]`.
///
/// # Supported Attributes
///
/// * `#[tlv(tag = N)]` - Context tag, 0 to 255
/// * `#[tlv(optional)]` - Field may be absent
/// * `#[tlv(nullable)]` - Field may be null
/// * `#[tlv(rename = "label")]` - Descriptor label
fn get_field_attributes(attrs: &[Attribute]) -> syn::Result<FieldAttributes> {
    let mut parsed = FieldAttributes::default();

    for attr in attrs {
        if !attr.path().is_ident("tlv") {
            continue;
        }
        attr.parse_args_with(|input: syn::parse::ParseStream| {
            while !input.is_empty() {
                let ident = input.parse::<syn::Ident>()?;

                if ident == "tag" {
                    input.parse::<syn::Token![=]>()?;
                    let lit = input.parse::<syn::LitInt>()?;
                    let tag = lit.base10_parse::<u8>().map_err(|_| {
                        syn::Error::new(lit.span(), "context tags must be in 0..=255")
                    })?;
                    if parsed.tag.replace(tag).is_some() {
                        return Err(syn::Error::new(lit.span(), "tag given twice"));
                    }
                } else if ident == "optional" {
                    parsed.optional = true;
                } else if ident == "nullable" {
                    parsed.nullable = true;
                } else if ident == "rename" {
                    input.parse::<syn::Token![=]>()?;
                    let lit_str = input.parse::<syn::LitStr>()?;
                    parsed.rename = Some(lit_str.value());
                } else {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("Unknown attribute: {}", ident),
                    ));
                }

                // Consume comma if present, otherwise end
                if input.peek(syn::Token![,]) {
                    input.parse::<syn::Token![,]>()?;
                }
            }
            Ok(())
        })?;
    }

    Ok(parsed)
}

/// Check if a type is `Option<T>`
fn is_option_type(ty: &Type) -> bool {
    extract_inner_type_from_option(ty).is_some()
}

/// Extract the inner type `T` from `Option<T>`
///
/// Returns `None` if the type is not an `Option`.
fn extract_inner_type_from_option(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let seg = type_path.path.segments.last()?;
        if seg.ident == "Option" {
            if let PathArguments::AngleBracketed(args) = &seg.arguments {
                if let Some(GenericArgument::Type(inner_ty)) = args.args.first() {
                    return Some(inner_ty);
                }
            }
        }
    }
    None
}

/// Generated code for one field.
struct FieldCode {
    descriptor: TokenStream2,
    to_record: TokenStream2,
    from_record: TokenStream2,
}

fn field_code(f: &Field, struct_name: &str) -> syn::Result<(u8, FieldCode)> {
    let Some(ident) = f.ident.as_ref() else {
        return Err(syn::Error::new_spanned(f, "fields must be named"));
    };
    let attrs = get_field_attributes(&f.attrs)?;
    let Some(tag) = attrs.tag else {
        return Err(syn::Error::new_spanned(
            ident,
            format!(
                "field `{}` needs a context tag: #[tlv(tag = N)]",
                ident
            ),
        ));
    };

    let ty = &f.ty;
    let inner = extract_inner_type_from_option(ty);
    // Option<T> fields are optional unless only `nullable` is given.
    let optional = attrs.optional || (inner.is_some() && !attrs.nullable);
    let nullable = attrs.nullable;
    if (attrs.optional || nullable) && inner.is_none() {
        return Err(syn::Error::new_spanned(
            ty,
            "optional and nullable fields must have type Option<T>",
        ));
    }

    let label = attrs.rename.unwrap_or_else(|| ident.to_string());
    let optional_modifier = optional.then(|| quote! { .optional() });
    let nullable_modifier = nullable.then(|| quote! { .nullable() });

    let descriptor = quote! {
        tlv_codec::FieldDescriptor::new(
            #label,
            #tag,
            <#ty as tlv_codec::TlvField>::field_type(),
        ) #optional_modifier #nullable_modifier
    };

    let to_record = if optional {
        quote! {
            if let Some(value) = &self.#ident {
                record.insert(#label, tlv_codec::TlvField::to_field(value));
            }
        }
    } else {
        quote! {
            record.insert(#label, tlv_codec::TlvField::to_field(&self.#ident));
        }
    };

    let from_record = match inner {
        // Option<Option<T>>: absent is None, null is Some(None)
        Some(inner) if optional && is_option_type(inner) => quote! {
            #ident: match record.take(#label) {
                Some(field) => Some(
                    <#inner as tlv_codec::TlvField>::from_field(field)
                        .map_err(|e| e.in_field(#label))?,
                ),
                None => None,
            },
        },
        _ if optional => quote! {
            #ident: match record.take(#label) {
                Some(field) => <#ty as tlv_codec::TlvField>::from_field(field)
                    .map_err(|e| e.in_field(#label))?,
                None => None,
            },
        },
        _ => quote! {
            #ident: <#ty as tlv_codec::TlvField>::from_field(
                record.take(#label).ok_or(tlv_codec::SchemaError::MissingField {
                    field: #label,
                    object: #struct_name,
                })?,
            )
            .map_err(|e| e.in_field(#label))?,
        },
    };

    Ok((
        tag,
        FieldCode {
            descriptor,
            to_record,
            from_record,
        },
    ))
}

/// Derive macro for implementing the `TlvObject` trait
///
/// Generates a static descriptor for the struct, the record conversions and
/// a `TlvField` implementation so the struct can be nested in other objects.
///
/// # Supported Attributes
///
/// * `#[tlv(tag = N)]` - Context tag of the field, required and unique
/// * `#[tlv(optional)]` - Field may be absent; implied for `Option<T>`
/// * `#[tlv(nullable)]` - Field may be null; requires `Option<T>`
/// * `#[tlv(rename = "label")]` - Descriptor label
///
/// A field that is both optional and nullable is written as
/// `Option<Option<T>>`: `None` when absent, `Some(None)` when null.
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(TlvObject)]
/// struct Report {
///     #[tlv(tag = 0)]
///     endpoint: u16,
///     #[tlv(tag = 1, nullable)]
///     value: Option<i32>,
///     #[tlv(tag = 2)]
///     label: Option<String>,
/// }
/// ```
#[proc_macro_derive(TlvObject, attributes(tlv))]
pub fn derive_tlv_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let struct_name = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "TlvObject cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "TlvObject requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "TlvObject can only be derived for structs",
            ))
        }
    };

    let mut used_tags = HashMap::new();
    let mut descriptors = Vec::new();
    let mut to_record = Vec::new();
    let mut from_record = Vec::new();

    for f in fields {
        let (tag, code) = field_code(f, &struct_name)?;
        let field_name = f.ident.as_ref().map(ToString::to_string).unwrap_or_default();
        if let Some(dup_field_name) = used_tags.insert(tag, field_name.clone()) {
            return Err(syn::Error::new_spanned(
                f,
                format!(
                    "Context tag {} is duplicated for struct '{}' (fields '{}' and '{}')",
                    tag, struct_name, dup_field_name, field_name
                ),
            ));
        }
        descriptors.push(code.descriptor);
        to_record.push(code.to_record);
        from_record.push(code.from_record);
    }

    Ok(quote! {
        impl tlv_codec::TlvObject for #name {
            fn descriptor() -> &'static tlv_codec::Descriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<tlv_codec::Descriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    tlv_codec::Descriptor::new(#struct_name, vec![#(#descriptors),*])
                })
            }

            #[allow(unused_mut)]
            fn to_record(&self) -> tlv_codec::Record {
                let mut record = tlv_codec::Record::new();
                #(#to_record)*
                record
            }

            #[allow(unused_mut)]
            fn from_record(
                mut record: tlv_codec::Record,
            ) -> ::std::result::Result<Self, tlv_codec::SchemaError> {
                Ok(#name {
                    #(#from_record)*
                })
            }
        }

        impl tlv_codec::TlvField for #name {
            fn field_type() -> tlv_codec::FieldType {
                tlv_codec::FieldType::Struct(<#name as tlv_codec::TlvObject>::descriptor)
            }

            fn to_field(&self) -> tlv_codec::FieldValue {
                tlv_codec::FieldValue::Object(tlv_codec::TlvObject::to_record(self))
            }

            fn from_field(
                field: tlv_codec::FieldValue,
            ) -> ::std::result::Result<Self, tlv_codec::SchemaError> {
                match field {
                    tlv_codec::FieldValue::Object(record) => {
                        <#name as tlv_codec::TlvObject>::from_record(record)
                    }
                    other => Err(tlv_codec::SchemaError::Mismatch {
                        expected: "structure",
                        found: other.kind_name(),
                    }),
                }
            }
        }
    })
}
