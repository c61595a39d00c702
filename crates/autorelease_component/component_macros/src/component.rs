//! Code generation for `#[derive(Component)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Index, Member, Type};

/// How a field takes part in scanning.
enum FieldRole {
    Property,
    State,
    Skipped,
}

/// Generates the `Component` impl for a struct.
pub(crate) fn derive_component(input: &DeriveInput) -> TokenStream {
    let ac = autorelease_macro_utils::resolve_crate_path(
        autorelease_macro_utils::AutoreleaseCrate::Component,
    );

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return syn::Error::new_spanned(
                data.enum_token,
                "#[derive(Component)] only supports structs",
            )
            .to_compile_error();
        }
        Data::Union(data) => {
            return syn::Error::new_spanned(
                data.union_token,
                "#[derive(Component)] only supports structs",
            )
            .to_compile_error();
        }
    };

    let mut visits = Vec::new();
    let mut state: Option<Member> = None;

    for (index, field) in iter_fields(fields).enumerate() {
        let role = match field_role(field) {
            Ok(role) => role,
            Err(err) => return err.to_compile_error(),
        };
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(index)),
        };

        match role {
            FieldRole::Property => {
                let name = match &member {
                    Member::Named(ident) => ident.to_string(),
                    Member::Unnamed(index) => index.index.to_string(),
                };
                visits.push(quote! {
                    (&#ac::__private::Field(&self.#member)).visit_field(#name, __visit);
                });
            }
            FieldRole::State => {
                if state.is_some() {
                    return syn::Error::new_spanned(
                        field,
                        "a component can have only one instance state field",
                    )
                    .to_compile_error();
                }
                state = Some(member);
            }
            FieldRole::Skipped => {}
        }
    }

    let probe_imports = if visits.is_empty() {
        quote! {}
    } else {
        quote! {
            use #ac::__private::{ViaMaybeReleasable as _, ViaOpaque as _};
        }
    };

    let instance_state = match state {
        Some(member) => quote! { ::core::option::Option::Some(&self.#member) },
        None => quote! { ::core::option::Option::None },
    };

    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics #ac::Component for #name #ty_generics #where_clause {
            fn component_name(&self) -> &'static str {
                #name_str
            }

            fn visit_properties(
                &self,
                __visit: &mut dyn FnMut(&'static str, &dyn #ac::MaybeReleasable),
            ) {
                #probe_imports
                #(#visits)*
            }

            fn instance_state(&self) -> ::core::option::Option<&#ac::InstanceState> {
                #instance_state
            }
        }
    }
}

fn iter_fields(fields: &Fields) -> Box<dyn Iterator<Item = &Field> + '_> {
    match fields {
        Fields::Named(named) => Box::new(named.named.iter()),
        Fields::Unnamed(unnamed) => Box::new(unnamed.unnamed.iter()),
        Fields::Unit => Box::new(core::iter::empty()),
    }
}

/// Reads `#[component(state)]` / `#[component(skip)]`, falling back to
/// detecting an `InstanceState` field by type.
fn field_role(field: &Field) -> syn::Result<FieldRole> {
    let mut role = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("component")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("state") {
                role = Some(FieldRole::State);
                Ok(())
            } else if meta.path.is_ident("skip") {
                role = Some(FieldRole::Skipped);
                Ok(())
            } else {
                Err(meta.error("expected `state` or `skip`"))
            }
        })?;
    }

    Ok(role.unwrap_or_else(|| {
        if is_instance_state(&field.ty) {
            FieldRole::State
        } else {
            FieldRole::Property
        }
    }))
}

fn is_instance_state(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
    {
        return segment.ident == "InstanceState";
    }
    false
}
