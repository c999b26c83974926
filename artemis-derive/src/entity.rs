use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    DataStruct, DeriveInput, Field, GenericArgument, LitStr, Path, PathArguments, Result, Type,
};

#[derive(Default)]
struct EntityOptions {
    name: Option<String>,
    embeddable: bool,
    factory: Option<Path>,
}

#[derive(Default)]
struct FieldOptions {
    id: bool,
    column: Option<String>,
    converter: Option<Path>,
    nested: bool,
    skip: bool,
}

enum Shape {
    Scalar,
    Sequence,
    Mapping,
}

const SEQUENCES: [&str; 4] = ["Vec", "VecDeque", "HashSet", "BTreeSet"];
const MAPPINGS: [&str; 2] = ["HashMap", "BTreeMap"];

pub(crate) fn generate_entity_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "Cannot derive Entity for generic structs",
        ));
    }

    let fields: Vec<&Field> = match &data.fields {
        syn::Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "Only structs with named fields are supported",
            ))
        }
    };

    let name = &ast.ident;
    let options = parse_entity_options(ast)?;

    let mut accessors = Vec::with_capacity(fields.len());
    let mut declarations = Vec::with_capacity(fields.len());
    let mut id_seen = false;

    for field in fields {
        let field_options = parse_field_options(field)?;
        if field_options.skip {
            continue;
        }

        let ident = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "Only structs with named fields are supported")
        })?;
        let field_name = ident.unraw().to_string();
        let ty = &field.ty;
        let getter = Ident::new(&format!("__artemis_get_{}", field_name), Span::call_site());
        let setter = Ident::new(&format!("__artemis_set_{}", field_name), Span::call_site());

        if field_options.id {
            if id_seen {
                return Err(syn::Error::new_spanned(field, "Only one field can be marked #[id]"));
            }
            id_seen = true;
        }

        let declaration = if field_options.nested {
            let (inner, optional) = match option_inner(ty) {
                Some(inner) => (inner, true),
                None => (ty, false),
            };

            let borrow = if optional {
                quote! { Ok(owner.#ident.as_ref().map(|it| it as &dyn ::std::any::Any)) }
            } else {
                quote! { Ok(Some(&owner.#ident as &dyn ::std::any::Any)) }
            };
            let assign = if optional {
                quote! { Some(*artemis::mapping::downcast_box::<#inner>(value)?) }
            } else {
                quote! { *artemis::mapping::downcast_box::<#inner>(value)? }
            };

            accessors.push(quote! {
                fn #getter(entity: &dyn ::std::any::Any)
                    -> artemis::errors::MappingResult<Option<&dyn ::std::any::Any>> {
                    let owner = artemis::mapping::downcast_ref::<#name>(entity)?;
                    #borrow
                }

                fn #setter(
                    entity: &mut dyn ::std::any::Any,
                    value: Box<dyn ::std::any::Any + Send>,
                ) -> artemis::errors::MappingResult<()> {
                    artemis::mapping::downcast_mut::<#name>(entity)?.#ident = #assign;
                    Ok(())
                }
            });

            quote! {
                artemis::mapping::FieldDeclaration::nested(
                    #field_name,
                    <#inner as artemis::mapping::Entity>::declare,
                    #getter,
                    #setter,
                )
            }
        } else {
            accessors.push(quote! {
                fn #getter(entity: &dyn ::std::any::Any)
                    -> artemis::errors::MappingResult<artemis::common::Value> {
                    artemis::common::Convertible::to_value(
                        &artemis::mapping::downcast_ref::<#name>(entity)?.#ident,
                    )
                }

                fn #setter(
                    entity: &mut dyn ::std::any::Any,
                    value: &artemis::common::Value,
                ) -> artemis::errors::MappingResult<()> {
                    artemis::mapping::downcast_mut::<#name>(entity)?.#ident =
                        <#ty as artemis::common::Convertible>::from_value(value)?;
                    Ok(())
                }
            });

            let constructor = match shape_of(ty) {
                Shape::Scalar => quote! { scalar },
                Shape::Sequence => quote! { sequence },
                Shape::Mapping => quote! { mapping },
            };
            quote! {
                artemis::mapping::FieldDeclaration::#constructor(#field_name, #getter, #setter)
            }
        };

        let id = field_options.id.then(|| quote! { .as_id() });
        let column = field_options
            .column
            .as_ref()
            .map(|column| quote! { .with_column(#column) });
        let converter = field_options
            .converter
            .as_ref()
            .map(|converter| quote! { .with_converter(<#converter as ::std::default::Default>::default()) });

        declarations.push(quote! {
            .with_field(#declaration #id #column #converter)
        });
    }

    let type_name = name.to_string();
    let logical_name = options.name.as_ref().map(|it| quote! { .with_name(#it) });
    let embeddable = options.embeddable.then(|| quote! { .as_embeddable() });
    let factory = match &options.factory {
        Some(factory) => quote! { .with_factory(#factory) },
        None => quote! { .with_factory(artemis::mapping::default_factory::<#name>) },
    };

    let gen = quote! {
        impl artemis::mapping::Entity for #name {
            fn declare() -> artemis::mapping::TypeDeclaration {
                #(#accessors)*

                artemis::mapping::TypeDeclaration::new::<#name>(#type_name)
                    #logical_name
                    #embeddable
                    #factory
                    #(#declarations)*
            }
        }
    };

    Ok(TokenStream::from(gen))
}

fn parse_entity_options(ast: &DeriveInput) -> Result<EntityOptions> {
    let mut options = EntityOptions::default();
    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.name = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("embeddable") {
                    options.embeddable = true;
                    Ok(())
                } else if meta.path.is_ident("factory") {
                    options.factory = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `name`, `embeddable` or `factory`"))
                }
            })?;
        }
    }
    Ok(options)
}

fn parse_field_options(field: &Field) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if attr.path().is_ident("id") {
            options.id = true;
            if matches!(attr.meta, syn::Meta::List(_)) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        let value: LitStr = meta.value()?.parse()?;
                        options.column = Some(value.value());
                        Ok(())
                    } else {
                        Err(meta.error("expected `name`"))
                    }
                })?;
            }
        } else if attr.path().is_ident("column") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.column = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("converter") {
                    options.converter = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("nested") {
                    options.nested = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `name`, `converter`, `nested` or `skip`"))
                }
            })?;
        }
    }

    if options.skip && (options.id || options.nested) {
        return Err(syn::Error::new_spanned(
            field,
            "A skipped field cannot be an identifier or a nested entity",
        ));
    }
    if options.nested && options.converter.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "A nested entity field cannot have a converter",
        ));
    }
    Ok(options)
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        _ => None,
    }
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

fn shape_of(ty: &Type) -> Shape {
    // Option<Vec<T>> is still a sequence
    let ty = option_inner(ty).unwrap_or(ty);
    match last_segment(ty).map(|segment| segment.ident.to_string()) {
        Some(ident) if SEQUENCES.contains(&ident.as_str()) => Shape::Sequence,
        Some(ident) if MAPPINGS.contains(&ident.as_str()) => Shape::Mapping,
        _ => Shape::Scalar,
    }
}
