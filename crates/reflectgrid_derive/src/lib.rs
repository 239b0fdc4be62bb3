//! Derive and attribute macros that generate reflectgrid accessor tables.
//!
//! These macros replace runtime reflection with generated code:
//! - `Reflect`: implements `reflectgrid_core::Reflect` (field table, parent link, composite
//!   navigation, observer capability) and `GridField` so the type can be nested in another form
//! - `GridEnum`: exposes the constants of a fieldless enum and makes it a `GridField`
//! - `grid_actions`: turns `#[action]` methods of an impl block into `GridActions`
//!
//! Generated code refers to `::reflectgrid_core`, so the using crate must depend on it.
//!
//! # Example
//! ```ignore
//! #[derive(Reflect)]
//! #[grid(observer, actions)]
//! struct Server {
//!     #[grid(parent)]
//!     base: Node,
//!     #[grid(tooltip = "TCP port")]
//!     port: u16,
//!     #[grid(options("debug", "info", "warn"))]
//!     log_level: String,
//!     internal_counter: u64, // not annotated, invisible to the engine
//! }
//!
//! #[grid_actions]
//! impl Server {
//!     #[action(name = "Restart")]
//!     fn restart(&mut self) {}
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::Parser;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, FnArg, ImplItem, ItemImpl, Lit, LitBool, LitStr,
    Meta, ReturnType, Type, UnOp, parse_macro_input,
};

// ============================================================================
// #[derive(Reflect)]
// ============================================================================

/// Generates the `Reflect` accessor table for a struct with named fields.
///
/// ## Attributes
/// - struct: `#[grid(observer)]` (the type implements `FieldObserver`), `#[grid(actions)]` (the type has
///   a `#[grid_actions]` impl block)
/// - field: `#[grid]`, `#[grid(parent)]`, and the annotation keys `editable`, `options(..)`, `kind`,
///   `tooltip`, `name`, `min`, `max`, `step`, `wrap`
#[proc_macro_derive(Reflect, attributes(grid))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_reflect(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct StructOptions {
    observer: bool,
    actions: bool,
}

#[derive(Default)]
struct FieldOptions {
    parent: bool,
    editable: Option<bool>,
    options: Vec<LitStr>,
    kind: Option<LitStr>,
    tooltip: Option<LitStr>,
    name: Option<LitStr>,
    min: Option<String>,
    max: Option<String>,
    step: Option<String>,
    wrap: bool,
}

struct GridFieldSpec {
    ident: syn::Ident,
    ty: Type,
    options: FieldOptions,
}

fn expand_reflect(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "#[derive(Reflect)] requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "#[derive(Reflect)] can only be used on structs",
            ));
        }
    };

    let struct_options = parse_struct_options(&input.attrs)?;

    let mut parent: Option<syn::Ident> = None;
    let mut grid_fields = Vec::new();
    for field in fields {
        let Some(options) = parse_field_options(&field.attrs)? else {
            continue;
        };
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        if options.parent {
            if parent.is_some() {
                return Err(syn::Error::new(
                    field.span(),
                    "only one field can be marked #[grid(parent)]",
                ));
            }
            parent = Some(ident);
            continue;
        }
        grid_fields.push(GridFieldSpec {
            ident,
            ty: field.ty.clone(),
            options,
        });
    }

    let descriptors = grid_fields.iter().map(|spec| field_descriptor(&name_str, spec));
    let field_names: Vec<String> = grid_fields.iter().map(|spec| spec.ident.unraw().to_string()).collect();
    let field_idents: Vec<&syn::Ident> = grid_fields.iter().map(|spec| &spec.ident).collect();
    let field_types: Vec<&Type> = grid_fields.iter().map(|spec| &spec.ty).collect();

    let action_members = if struct_options.actions {
        quote! {
            members.extend(<Self as ::reflectgrid_core::GridActions>::action_members());
        }
    } else {
        quote! {}
    };

    let parent_impl = parent.map(|parent| {
        quote! {
            fn parent(&self) -> ::core::option::Option<&dyn ::reflectgrid_core::Reflect> {
                ::core::option::Option::Some(&self.#parent)
            }

            fn parent_mut(&mut self) -> ::core::option::Option<&mut dyn ::reflectgrid_core::Reflect> {
                ::core::option::Option::Some(&mut self.#parent)
            }
        }
    });

    let invoke_impl = struct_options.actions.then(|| {
        quote! {
            fn invoke(&mut self, name: &str) -> ::core::result::Result<(), ::reflectgrid_core::ReflectError> {
                <Self as ::reflectgrid_core::GridActions>::invoke_action(self, name)
            }
        }
    });

    let observer_impl = struct_options.observer.then(|| {
        quote! {
            fn as_field_observer(&mut self) -> ::core::option::Option<&mut dyn ::reflectgrid_core::FieldObserver> {
                ::core::option::Option::Some(self)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::reflectgrid_core::Reflect for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #name_str
            }

            fn declared_members(&self) -> ::std::vec::Vec<::reflectgrid_core::MemberDescriptor> {
                #[allow(unused_mut)]
                let mut members: ::std::vec::Vec<::reflectgrid_core::MemberDescriptor> =
                    ::std::vec![#(#descriptors),*];
                #action_members
                members
            }

            #parent_impl

            fn field(&self, name: &str) -> ::core::result::Result<::reflectgrid_core::Value, ::reflectgrid_core::ReflectError> {
                match name {
                    #(
                        #field_names => ::core::result::Result::Ok(
                            ::reflectgrid_core::GridField::to_value(&self.#field_idents)
                        ),
                    )*
                    _ => ::core::result::Result::Err(::reflectgrid_core::ReflectError::no_such_field(#name_str, name)),
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: ::reflectgrid_core::Value,
            ) -> ::core::result::Result<(), ::reflectgrid_core::ReflectError> {
                match name {
                    #(
                        #field_names => {
                            self.#field_idents = <#field_types as ::reflectgrid_core::GridField>::from_value(value)
                                .map_err(|found| ::reflectgrid_core::ReflectError::TypeMismatch {
                                    type_name: #name_str,
                                    field: name.to_string(),
                                    expected: <#field_types as ::reflectgrid_core::GridField>::field_type().name(),
                                    found: found.kind_name(),
                                })?;
                            ::core::result::Result::Ok(())
                        }
                    )*
                    _ => {
                        let _ = value;
                        ::core::result::Result::Err(::reflectgrid_core::ReflectError::no_such_field(#name_str, name))
                    }
                }
            }

            fn composite(
                &self,
                name: &str,
            ) -> ::core::result::Result<::reflectgrid_core::Composite<'_>, ::reflectgrid_core::ReflectError> {
                match name {
                    #(
                        #field_names => ::reflectgrid_core::GridField::composite(&self.#field_idents)
                            .ok_or_else(|| ::reflectgrid_core::ReflectError::not_composite(#name_str, name)),
                    )*
                    _ => ::core::result::Result::Err(::reflectgrid_core::ReflectError::no_such_field(#name_str, name)),
                }
            }

            fn composite_mut(
                &mut self,
                name: &str,
            ) -> ::core::result::Result<::reflectgrid_core::CompositeMut<'_>, ::reflectgrid_core::ReflectError> {
                match name {
                    #(
                        #field_names => ::reflectgrid_core::GridField::composite_mut(&mut self.#field_idents)
                            .ok_or_else(|| ::reflectgrid_core::ReflectError::not_composite(#name_str, name)),
                    )*
                    _ => ::core::result::Result::Err(::reflectgrid_core::ReflectError::no_such_field(#name_str, name)),
                }
            }

            #invoke_impl

            #observer_impl
        }

        impl #impl_generics ::reflectgrid_core::GridField for #name #ty_generics #where_clause {
            fn field_type() -> ::reflectgrid_core::FieldType {
                ::reflectgrid_core::FieldType::Composite { type_name: #name_str }
            }

            fn to_value(&self) -> ::reflectgrid_core::Value {
                ::reflectgrid_core::Value::Object(#name_str)
            }

            fn from_value(
                value: ::reflectgrid_core::Value,
            ) -> ::core::result::Result<Self, ::reflectgrid_core::Value> {
                ::core::result::Result::Err(value)
            }

            fn composite(&self) -> ::core::option::Option<::reflectgrid_core::Composite<'_>> {
                ::core::option::Option::Some(::reflectgrid_core::Composite::Borrowed(self))
            }

            fn composite_mut(&mut self) -> ::core::option::Option<::reflectgrid_core::CompositeMut<'_>> {
                ::core::option::Option::Some(::reflectgrid_core::CompositeMut::Borrowed(self))
            }
        }
    })
}

fn field_descriptor(type_name: &str, spec: &GridFieldSpec) -> TokenStream2 {
    let field_name = spec.ident.unraw().to_string();
    let ty = &spec.ty;
    let options = &spec.options;

    let editable = options.editable.unwrap_or(true);
    let choices = &options.options;
    let field_kind = match &options.kind {
        Some(kind) => quote! { ::reflectgrid_core::FieldKind::from_name(#kind) },
        None => quote! { ::reflectgrid_core::FieldKind::SingleLine },
    };
    let tooltip = options
        .tooltip
        .as_ref()
        .map_or_else(|| quote! { "" }, |tooltip| quote! { #tooltip });
    let display_name = option_str(options.name.as_ref().map(LitStr::value).as_deref());
    let min = option_str(options.min.as_deref());
    let max = option_str(options.max.as_deref());
    let step = option_str(options.step.as_deref());
    let wrap = options.wrap;

    quote! {
        ::reflectgrid_core::MemberDescriptor::field(
            #type_name,
            #field_name,
            <#ty as ::reflectgrid_core::GridField>::field_type(),
            ::reflectgrid_core::FieldAnnotation {
                editable: #editable,
                options: &[#(#choices),*],
                field_kind: #field_kind,
                tooltip: #tooltip,
                display_name: #display_name,
                min: #min,
                max: #max,
                step: #step,
                wrap: #wrap,
            },
        )
    }
}

fn option_str(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(value) => quote! { ::core::option::Option::Some(#value) },
        None => quote! { ::core::option::Option::None },
    }
}

fn parse_struct_options(attrs: &[Attribute]) -> syn::Result<StructOptions> {
    let mut options = StructOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("grid")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("observer") {
                options.observer = true;
                Ok(())
            } else if meta.path.is_ident("actions") {
                options.actions = true;
                Ok(())
            } else {
                Err(meta.error("unknown struct-level grid attribute; expected `observer` or `actions`"))
            }
        })?;
    }
    Ok(options)
}

/// Returns `None` when the field carries no `#[grid]` attribute.
fn parse_field_options(attrs: &[Attribute]) -> syn::Result<Option<FieldOptions>> {
    let mut found = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("grid")) {
        let options = found.get_or_insert_with(FieldOptions::default);
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("parent") {
                options.parent = true;
            } else if meta.path.is_ident("editable") {
                options.editable = Some(parse_flag(&meta)?);
            } else if meta.path.is_ident("wrap") {
                options.wrap = parse_flag(&meta)?;
            } else if meta.path.is_ident("options") {
                let content;
                syn::parenthesized!(content in meta.input);
                let choices = content.parse_terminated(|input| input.parse::<LitStr>(), syn::Token![,])?;
                options.options = choices.into_iter().collect();
            } else if meta.path.is_ident("kind") {
                options.kind = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("tooltip") {
                options.tooltip = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("min") {
                options.min = Some(parse_number(&meta.value()?.parse()?)?);
            } else if meta.path.is_ident("max") {
                options.max = Some(parse_number(&meta.value()?.parse()?)?);
            } else if meta.path.is_ident("step") {
                options.step = Some(parse_number(&meta.value()?.parse()?)?);
            } else {
                return Err(meta.error("unknown grid attribute"));
            }
            Ok(())
        })?;
    }
    Ok(found)
}

/// A bare flag means `true`; otherwise `key = <bool>`.
fn parse_flag(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<bool> {
    if meta.input.peek(syn::Token![=]) {
        let value: LitBool = meta.value()?.parse()?;
        Ok(value.value)
    } else {
        Ok(true)
    }
}

/// Accepts integer, float and string literals, optionally negated.
fn parse_number(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Int(int) => Ok(int.base10_digits().to_string()),
            Lit::Float(float) => Ok(float.base10_digits().to_string()),
            Lit::Str(text) => Ok(text.value()),
            other => Err(syn::Error::new(other.span(), "expected a numeric literal")),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_), expr, ..
        }) => Ok(format!("-{}", parse_number(expr)?)),
        other => Err(syn::Error::new(other.span(), "expected a numeric literal")),
    }
}

// ============================================================================
// #[derive(GridEnum)]
// ============================================================================

/// Generates `GridEnum` and `GridField` for a fieldless enum.
///
/// Constants are offered in declaration order, named after their variants.
#[proc_macro_derive(GridEnum)]
pub fn derive_grid_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_grid_enum(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_grid_enum(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(GridEnum)] can only be used on enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(GridEnum)] requires at least one variant",
        ));
    }

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "#[derive(GridEnum)] only supports fieldless variants",
            ));
        }
        variants.push(&variant.ident);
    }
    let constants: Vec<String> = variants.iter().map(|ident| ident.unraw().to_string()).collect();
    let indices: Vec<Literal> = (0..variants.len()).map(Literal::usize_unsuffixed).collect();

    Ok(quote! {
        impl #impl_generics ::reflectgrid_core::GridEnum for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #name_str;
            const CONSTANTS: &'static [&'static str] = &[#(#constants),*];

            fn index(&self) -> usize {
                match self {
                    #( Self::#variants => #indices, )*
                }
            }

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #( #indices => ::core::option::Option::Some(Self::#variants), )*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics ::reflectgrid_core::GridField for #name #ty_generics #where_clause {
            fn field_type() -> ::reflectgrid_core::FieldType {
                ::reflectgrid_core::FieldType::Enum(<Self as ::reflectgrid_core::GridEnum>::enum_info())
            }

            fn to_value(&self) -> ::reflectgrid_core::Value {
                ::reflectgrid_core::enum_to_value(self)
            }

            fn from_value(
                value: ::reflectgrid_core::Value,
            ) -> ::core::result::Result<Self, ::reflectgrid_core::Value> {
                ::reflectgrid_core::enum_from_value(value)
            }
        }
    })
}

// ============================================================================
// #[grid_actions]
// ============================================================================

/// Collects the `#[action(...)]` methods of an inherent impl block into `GridActions`.
///
/// Action methods take only `&self` or `&mut self` and return `()` or `Result<(), E: Display>`.
/// Recognised keys: `name`, `tooltip`, `enabled`.
#[proc_macro_attribute]
pub fn grid_actions(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(
            TokenStream2::from(args).span(),
            "#[grid_actions] takes no arguments",
        )
        .into_compile_error()
        .into();
    }
    let item = parse_macro_input!(input as ItemImpl);
    expand_grid_actions(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct ActionSpec {
    ident: syn::Ident,
    enabled: bool,
    tooltip: Option<LitStr>,
    name: Option<LitStr>,
}

fn expand_grid_actions(mut item: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[grid_actions] must be placed on an inherent impl block",
        ));
    }
    let type_name = match item.self_ty.as_ref() {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .ok_or_else(|| syn::Error::new(path.span(), "expected a named type"))?,
        other => return Err(syn::Error::new(other.span(), "expected a named type")),
    };

    let mut actions = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let mut spec: Option<ActionSpec> = None;
        let mut kept = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            if attr.path().is_ident("action") {
                spec = Some(parse_action(&attr, method.sig.ident.clone())?);
            } else {
                kept.push(attr);
            }
        }
        method.attrs = kept;
        if let Some(spec) = spec {
            validate_action_signature(&method.sig)?;
            actions.push(spec);
        }
    }

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let method_names: Vec<String> = actions.iter().map(|action| action.ident.unraw().to_string()).collect();
    let method_idents: Vec<&syn::Ident> = actions.iter().map(|action| &action.ident).collect();
    let descriptors = actions.iter().zip(&method_names).map(|(action, method_name)| {
        let enabled = action.enabled;
        let tooltip = action
            .tooltip
            .as_ref()
            .map_or_else(|| quote! { "" }, |tooltip| quote! { #tooltip });
        let caption = action
            .name
            .as_ref()
            .map_or_else(|| quote! { "" }, |name| quote! { #name });
        quote! {
            ::reflectgrid_core::MemberDescriptor::action(
                #type_name,
                #method_name,
                ::reflectgrid_core::ActionAnnotation {
                    enabled: #enabled,
                    tooltip: #tooltip,
                    name: #caption,
                },
            )
        }
    });

    Ok(quote! {
        #item

        impl #impl_generics ::reflectgrid_core::GridActions for #self_ty #where_clause {
            fn action_members() -> ::std::vec::Vec<::reflectgrid_core::MemberDescriptor> {
                ::std::vec![#(#descriptors),*]
            }

            fn invoke_action(&mut self, name: &str) -> ::core::result::Result<(), ::reflectgrid_core::ReflectError> {
                match name {
                    #(
                        #method_names => ::reflectgrid_core::ActionOutcome::into_outcome(self.#method_idents())
                            .map_err(|message| ::reflectgrid_core::ReflectError::ActionFailed {
                                type_name: #type_name,
                                action: name.to_string(),
                                message,
                            }),
                    )*
                    _ => ::core::result::Result::Err(::reflectgrid_core::ReflectError::no_such_action(#type_name, name)),
                }
            }
        }
    })
}

fn parse_action(attr: &Attribute, ident: syn::Ident) -> syn::Result<ActionSpec> {
    let mut spec = ActionSpec {
        ident,
        enabled: true,
        tooltip: None,
        name: None,
    };
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(spec);
    }
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("enabled") {
            spec.enabled = parse_flag(&meta)?;
        } else if meta.path.is_ident("tooltip") {
            spec.tooltip = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("name") {
            spec.name = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("unknown action attribute; expected `name`, `tooltip` or `enabled`"));
        }
        Ok(())
    });
    let Meta::List(list) = &attr.meta else {
        return Err(syn::Error::new(attr.span(), "expected #[action(...)]"));
    };
    parser.parse2(list.tokens.clone())?;
    Ok(spec)
}

fn validate_action_signature(sig: &syn::Signature) -> syn::Result<()> {
    if sig.asyncness.is_some() {
        return Err(syn::Error::new(sig.span(), "actions cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(sig.generics.span(), "actions cannot be generic"));
    }
    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(_)) => {}
        _ => {
            return Err(syn::Error::new(
                sig.span(),
                "actions must take `&self` or `&mut self`",
            ));
        }
    }
    if let Some(extra) = inputs.next() {
        return Err(syn::Error::new(extra.span(), "actions cannot take arguments"));
    }
    if let ReturnType::Type(_, ty) = &sig.output {
        if matches!(ty.as_ref(), Type::ImplTrait(_)) {
            return Err(syn::Error::new(ty.span(), "actions must return `()` or `Result<(), E>`"));
        }
    }
    Ok(())
}
