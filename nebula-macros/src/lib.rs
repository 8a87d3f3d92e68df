use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Index};

/// Derive `nebula::animation::Animatable` for a struct by interpolating every
/// field independently.
///
/// Every field type must itself implement `Animatable`. Works for structs with
/// named fields, tuple structs and unit structs.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy, PartialEq, Animatable)]
/// pub struct Pose {
///     rotate_x: f32,
///     rotate_y: f32,
/// }
/// ```
#[proc_macro_derive(Animatable)]
pub fn derive_animatable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return syn::Error::new_spanned(
                &input.ident,
                "Animatable can only be derived for structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let body = match &data.fields {
        Fields::Named(fields) => {
            let lerps = fields.named.iter().map(|field| {
                let field_name = field.ident.as_ref().expect("named field");
                let ty = &field.ty;
                quote! {
                    #field_name: <#ty as ::nebula::animation::Animatable>::lerp(
                        &from.#field_name,
                        &to.#field_name,
                        t,
                    )
                }
            });
            quote! { Self { #(#lerps),* } }
        }
        Fields::Unnamed(fields) => {
            let lerps = fields.unnamed.iter().enumerate().map(|(i, field)| {
                let index = Index::from(i);
                let ty = &field.ty;
                quote! {
                    <#ty as ::nebula::animation::Animatable>::lerp(&from.#index, &to.#index, t)
                }
            });
            quote! { Self(#(#lerps),*) }
        }
        Fields::Unit => quote! { Self },
    };

    let expanded = quote! {
        impl #impl_generics ::nebula::animation::Animatable for #name #ty_generics #where_clause {
            // Unit structs never read their arguments.
            #[allow(unused_variables)]
            fn lerp(from: &Self, to: &Self, t: f32) -> Self {
                #body
            }
        }
    };

    expanded.into()
}
