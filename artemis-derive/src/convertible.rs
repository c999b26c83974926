use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DataEnum, DataStruct, DeriveInput, Field, LitStr, Result, Type};

fn ignored_fields(ast: &DeriveInput) -> Result<Vec<String>> {
    let mut ignored = vec![];
    for attr in &ast.attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let value: LitStr = meta.value()?.parse()?;
                    ignored.extend(value.value().split(',').map(|field| field.trim().to_string()));
                    Ok(())
                } else {
                    Err(meta.error("expected `ignored`"))
                }
            })?;
        }
    }
    Ok(ignored)
}

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let ignored = ignored_fields(ast)?;

    let fields: Vec<&Field> = match &data.fields {
        syn::Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "Only structs with named fields are supported",
            ))
        }
    };

    let mut kept_idents: Vec<&Ident> = Vec::with_capacity(fields.len());
    let mut kept_names: Vec<String> = Vec::with_capacity(fields.len());
    let mut initializers = Vec::with_capacity(fields.len());

    for field in &fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.unraw().to_string();
        let ty: &Type = &field.ty;

        if ignored.contains(&field_name) {
            initializers.push(quote! { #ident: ::std::default::Default::default() });
        } else {
            initializers.push(quote! {
                #ident: <#ty as artemis::common::Convertible>::from_value(
                    record.find(#field_name).unwrap_or(&artemis::common::Value::Null),
                )?
            });
            kept_idents.push(ident);
            kept_names.push(field_name);
        }
    }

    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics artemis::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> artemis::errors::MappingResult<artemis::common::Value> {
                let mut record = artemis::common::Record::new(#type_name);
                #(
                    let value = artemis::common::Convertible::to_value(&self.#kept_idents)?;
                    if !value.is_null() {
                        record.put(#kept_names, value);
                    }
                )*
                Ok(artemis::common::Value::Record(record))
            }

            fn from_value(value: &artemis::common::Value) -> artemis::errors::MappingResult<Self::Output> {
                match value {
                    artemis::common::Value::Record(record) => Ok(#name {
                        #(#initializers,)*
                    }),
                    _ => {
                        Err(artemis::errors::MappingError::new(
                            &format!("Value {} is not a record of {}", value, #type_name),
                            artemis::errors::ErrorKind::MappingError,
                        ))
                    }
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut variant_idents = Vec::with_capacity(data.variants.len());
    let mut variant_names = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, syn::Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Only enums with unit variants can derive Convertible",
            ));
        }
        variant_idents.push(&variant.ident);
        variant_names.push(variant.ident.unraw().to_string());
    }

    let gen = quote! {
        impl #impl_generics artemis::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> artemis::errors::MappingResult<artemis::common::Value> {
                match self {
                    #(#name::#variant_idents => Ok(artemis::common::Value::String(#variant_names.to_string())),)*
                }
            }

            fn from_value(value: &artemis::common::Value) -> artemis::errors::MappingResult<Self::Output> {
                match value {
                    artemis::common::Value::String(variant) => match variant.as_str() {
                        #(#variant_names => Ok(#name::#variant_idents),)*
                        _ => {
                            Err(artemis::errors::MappingError::new(
                                &format!("{} is not a variant of {}", variant, #type_name),
                                artemis::errors::ErrorKind::MappingError,
                            ))
                        }
                    },
                    _ => {
                        Err(artemis::errors::MappingError::new(
                            &format!("Value {} is not a variant of {}", value, #type_name),
                            artemis::errors::ErrorKind::MappingError,
                        ))
                    }
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
