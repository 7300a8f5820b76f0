use syn::{Attribute, Field, FieldsNamed, Ident, Path, Token, Type, punctuated::Punctuated};

/// 事件结构体必须具备的 derive：`Arc<dyn DomainEvent>` 需要 `Debug`，
/// 重放与测试需要 `Clone`
const EVENT_DERIVES: [&str; 2] = ["Debug", "Clone"];

/// 把所有 `#[derive(..)]` 合并为一个，并补上缺失的 `Debug` / `Clone`
///
/// 用户写的 derive 保持原顺序排在后面；`std::fmt::Debug` 这类带路径的写法
/// 按末段识别，不会重复派生。无法解析的 derive 列表原样报错。
pub(crate) fn ensure_event_derives(attrs: &mut Vec<Attribute>) -> syn::Result<()> {
    let mut declared: Vec<Path> = Vec::new();
    let mut others: Vec<Attribute> = Vec::new();
    for attr in attrs.drain(..) {
        if attr.path().is_ident("derive") {
            declared.extend(attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?);
        } else {
            others.push(attr);
        }
    }

    let missing = EVENT_DERIVES
        .iter()
        .filter(|name| !declared.iter().any(|p| last_ident_is(p, name)))
        .map(|name| Path::from(Ident::new(name, proc_macro2::Span::call_site())))
        .collect::<Vec<Path>>();
    let derives: Vec<Path> = missing.into_iter().chain(declared).collect();

    attrs.push(syn::parse_quote!(#[derive(#(#derives),*)]));
    attrs.extend(others);
    Ok(())
}

fn last_ident_is(path: &Path, name: &str) -> bool {
    path.segments.last().is_some_and(|seg| seg.ident == name)
}

/// 缺少 `name` 字段时把它插入到最前；已声明则保持用户的定义
pub(crate) fn ensure_field(fields_named: &mut FieldsNamed, name: &Ident, ty: &Type) {
    let declared = fields_named
        .named
        .iter()
        .any(|f| f.ident.as_ref() == Some(name));
    if declared {
        return;
    }

    let field: Field = syn::parse_quote! { #name: #ty };
    fields_named.named.insert(0, field);
}
