use crate::utils::{ensure_event_derives, ensure_field};
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Item, Lit, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[domain_event] 宏实现
/// - 仅支持具名字段结构体：`struct Xxx { .. }`（空结构体写作 `struct Xxx {}`）
/// - 缺失时在最前插入 `header: ::ddd_kernel::event::EventHeader` 字段
/// - 合并派生：Debug, Clone
/// - 生成 `EventKind`、`DomainEvent` 实现，默认同时实现 `IntegrationEvent`
/// - 参数：`event_type = "..."`（默认结构体名）、`version = N`（默认 1）、
///   `integration = true|false`（默认 true）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as DomainEventAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let st = match &mut input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[domain_event] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(
                st.span(),
                "#[domain_event] supports only named-field struct, e.g., struct X { .. } or struct X {}",
            )
            .to_compile_error()
            .into();
        }
    };

    let header_ident: syn::Ident = syn::parse_quote!(header);
    let header_ty: syn::Type = syn::parse_quote!(::ddd_kernel::event::EventHeader);
    ensure_field(fields_named, &header_ident, &header_ty);

    if let Err(err) = ensure_event_derives(&mut st.attrs) {
        return err.to_compile_error().into();
    }

    let ident = &st.ident;
    let event_type = cfg
        .event_type
        .unwrap_or_else(|| syn::LitStr::new(&ident.to_string(), ident.span()));
    let version = cfg
        .version
        .unwrap_or_else(|| syn::LitInt::new("1", proc_macro2::Span::call_site()));
    let integration = cfg.integration.unwrap_or(true);

    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let capability = if integration {
        quote! {
            fn as_integration_event(&self) -> ::std::option::Option<&dyn ::ddd_kernel::event::IntegrationEvent> {
                ::std::option::Option::Some(self)
            }

            fn into_integration_event(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn ::ddd_kernel::event::IntegrationEvent>,
                ::std::sync::Arc<dyn ::ddd_kernel::event::DomainEvent>,
            > {
                ::std::result::Result::Ok(self)
            }
        }
    } else {
        quote! {
            fn as_integration_event(&self) -> ::std::option::Option<&dyn ::ddd_kernel::event::IntegrationEvent> {
                ::std::option::Option::None
            }

            fn into_integration_event(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn ::ddd_kernel::event::IntegrationEvent>,
                ::std::sync::Arc<dyn ::ddd_kernel::event::DomainEvent>,
            > {
                ::std::result::Result::Err(self)
            }
        }
    };

    let integration_impl = if integration {
        quote! {
            impl #impl_generics ::ddd_kernel::event::IntegrationEvent for #ident #ty_generics #where_clause {}
        }
    } else {
        quote! {}
    };

    let out = quote! {
        #st

        impl #impl_generics ::ddd_kernel::event::EventKind for #ident #ty_generics #where_clause {
            const EVENT_TYPE: &'static str = #event_type;
            const EVENT_VERSION: u32 = #version;
        }

        impl #impl_generics ::ddd_kernel::event::DomainEvent for #ident #ty_generics #where_clause {
            fn header(&self) -> &::ddd_kernel::event::EventHeader {
                &self.header
            }

            fn kind(&self) -> &'static str {
                <Self as ::ddd_kernel::event::EventKind>::EVENT_TYPE
            }

            fn default_version(&self) -> u32 {
                <Self as ::ddd_kernel::event::EventKind>::EVENT_VERSION
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            #capability
        }

        #integration_impl
    };

    TokenStream::from(out)
}

// -------- parsing --------

struct DomainEventAttrConfig {
    event_type: Option<syn::LitStr>,
    version: Option<syn::LitInt>,
    integration: Option<bool>,
}

impl Parse for DomainEventAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            event_type: None,
            version: None,
            integration: None,
        };

        if input.is_empty() {
            return Ok(cfg);
        }

        let pairs: Punctuated<syn::MetaNameValue, Token![,]> =
            Punctuated::parse_terminated(input)?;

        for kv in pairs {
            let key = match kv.path.get_ident() {
                Some(ident) => ident.clone(),
                None => return Err(syn::Error::new(kv.path.span(), "invalid attribute key")),
            };
            let lit = match &kv.value {
                Expr::Lit(syn::ExprLit { lit, .. }) => lit.clone(),
                other => {
                    return Err(syn::Error::new(other.span(), "expected literal value"));
                }
            };

            match (key.to_string().as_str(), lit) {
                ("event_type", Lit::Str(s)) => {
                    if cfg.event_type.is_some() {
                        return Err(duplicate(&key));
                    }
                    if s.value().is_empty() {
                        return Err(syn::Error::new(s.span(), "'event_type' must not be empty"));
                    }
                    cfg.event_type = Some(s);
                }
                ("version", Lit::Int(i)) => {
                    if cfg.version.is_some() {
                        return Err(duplicate(&key));
                    }
                    if i.base10_parse::<u32>()? == 0 {
                        return Err(syn::Error::new(i.span(), "'version' must be >= 1"));
                    }
                    cfg.version = Some(i);
                }
                ("integration", Lit::Bool(b)) => {
                    if cfg.integration.is_some() {
                        return Err(duplicate(&key));
                    }
                    cfg.integration = Some(b.value());
                }
                ("event_type", other) | ("version", other) | ("integration", other) => {
                    return Err(syn::Error::new(
                        other.span(),
                        format!("unexpected literal type for '{key}'"),
                    ));
                }
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        "unknown key; expected 'event_type' | 'version' | 'integration'",
                    ));
                }
            }
        }

        Ok(cfg)
    }
}

fn duplicate(key: &syn::Ident) -> syn::Error {
    syn::Error::new(key.span(), format!("duplicate key '{key}' in attribute"))
}
