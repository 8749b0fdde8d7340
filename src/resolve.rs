//! Static helpers over the swc syntax tree.
//!
//! Everything here is pure: literal resolution (does this node statically
//! evaluate to a string?), name resolution through import aliases and object
//! destructuring, and the small shape predicates the extractor is built from.

use swc_ecma_ast::{
    CallExpr, Callee, Expr, ImportDecl, ImportSpecifier, JSXAttrName, JSXAttrOrSpread,
    JSXAttrValue, JSXElement, JSXElementChild, JSXElementName, JSXExpr, JSXExprContainer,
    JSXText, Lit, MemberProp, ModuleExportName, ObjectPatProp, Pat, PropName, Tpl,
};

/// A node that may statically evaluate to a string literal.
///
/// Accepted: string literals, template literals without expressions, JSX text
/// and expression containers wrapping one of those. Identifiers, calls,
/// member access and interpolated templates resolve to `None`.
pub trait StaticString {
    fn static_string(&self) -> Option<String>;
}

/// Resolve any supported node to its literal string value.
pub fn resolve_literal<T: StaticString + ?Sized>(node: &T) -> Option<String> {
    node.static_string()
}

impl StaticString for Expr {
    fn static_string(&self) -> Option<String> {
        match self {
            // t('key')
            Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
            // t(`key`)
            Expr::Tpl(tpl) => tpl.static_string(),
            // t(('key'))
            Expr::Paren(paren) => paren.expr.static_string(),
            _ => None,
        }
    }
}

impl StaticString for Tpl {
    fn static_string(&self) -> Option<String> {
        // `hello ${name}` can't be known statically
        if !self.exprs.is_empty() || self.quasis.len() != 1 {
            return None;
        }
        let quasi = &self.quasis[0];
        match quasi.cooked.as_ref() {
            Some(cooked) => cooked.as_str().map(|s| s.to_string()),
            None => Some(quasi.raw.to_string()),
        }
    }
}

impl StaticString for JSXExprContainer {
    fn static_string(&self) -> Option<String> {
        match &self.expr {
            JSXExpr::Expr(expr) => expr.static_string(),
            JSXExpr::JSXEmptyExpr(_) => None,
        }
    }
}

impl StaticString for JSXText {
    fn static_string(&self) -> Option<String> {
        Some(clean_jsx_text(&self.value))
    }
}

impl StaticString for JSXElementChild {
    fn static_string(&self) -> Option<String> {
        match self {
            JSXElementChild::JSXText(text) => text.static_string(),
            JSXElementChild::JSXExprContainer(container) => container.static_string(),
            _ => None,
        }
    }
}

impl StaticString for JSXAttrValue {
    fn static_string(&self) -> Option<String> {
        match self {
            // message="hello"
            JSXAttrValue::Str(s) => s.value.as_str().map(|s| s.to_string()),
            // message={"hello"}
            JSXAttrValue::JSXExprContainer(container) => container.static_string(),
            _ => None,
        }
    }
}

/// Element children resolve only when, after JSX whitespace rules drop
/// layout-only text and empty `{}` containers, exactly one child remains and
/// that child is itself a literal. Several children reach the component as a
/// list at runtime, which is never a valid message.
impl StaticString for [JSXElementChild] {
    fn static_string(&self) -> Option<String> {
        let mut meaningful = self.iter().filter(|child| !is_layout_only(child));
        let only = meaningful.next()?;
        if meaningful.next().is_some() {
            return None;
        }
        only.static_string().filter(|value| !value.is_empty())
    }
}

fn is_layout_only(child: &JSXElementChild) -> bool {
    match child {
        JSXElementChild::JSXText(text) => clean_jsx_text(&text.value).is_empty(),
        JSXElementChild::JSXExprContainer(container) => {
            matches!(container.expr, JSXExpr::JSXEmptyExpr(_))
        }
        _ => false,
    }
}

/// Collapse JSX text the way JSX compilers do before it reaches a component:
/// tabs become spaces, lines are trimmed at their inner edges, blank lines are
/// dropped and the remaining lines are joined by a single space.
pub fn clean_jsx_text(raw: &str) -> String {
    let lines: Vec<&str> = raw.split(['\n', '\r']).collect();
    let last_line = lines.len().saturating_sub(1);
    let last_non_empty = lines
        .iter()
        .rposition(|line| line.chars().any(|c| c != ' ' && c != '\t'))
        .unwrap_or(0);

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut trimmed = line.replace('\t', " ");
        if i != 0 {
            trimmed = trimmed.trim_start_matches(' ').to_string();
        }
        if i != last_line {
            trimmed = trimmed.trim_end_matches(' ').to_string();
        }
        if !trimmed.is_empty() {
            out.push_str(&trimmed);
            if i != last_non_empty {
                out.push(' ');
            }
        }
    }
    out
}

// =============================================================================
// Name resolution
// =============================================================================

/// `import { useTranslation as useT } from '...'` -> `useT` for
/// `useTranslation`. Without a matching specifier the exported name is
/// returned unchanged.
pub fn import_binding(decl: &ImportDecl, exported: &str) -> String {
    decl.specifiers
        .iter()
        .find_map(|spec| match spec {
            ImportSpecifier::Named(named) => {
                let imported = match &named.imported {
                    Some(ModuleExportName::Ident(ident)) => ident.sym.as_ref(),
                    // import { "x" as y } never names a binding we track
                    Some(ModuleExportName::Str(_)) => return None,
                    None => named.local.sym.as_ref(),
                };
                (imported == exported).then(|| named.local.sym.to_string())
            }
            _ => None,
        })
        .unwrap_or_else(|| exported.to_string())
}

/// `const { t: translate } = ...` -> `translate` for key `t`.
///
/// Only properties bound to a plain identifier resolve: a nested pattern
/// (`{ t: { x } }`) or a defaulted shorthand (`{ t = fallback }`) yields `None`.
pub fn pattern_binding(props: &[ObjectPatProp], key: &str) -> Option<String> {
    props.iter().find_map(|prop| match prop {
        // { t }
        ObjectPatProp::Assign(assign) if assign.key.sym.as_ref() == key => {
            assign.value.is_none().then(|| assign.key.sym.to_string())
        }
        // { t: alias }
        ObjectPatProp::KeyValue(kv) => match (&kv.key, kv.value.as_ref()) {
            (PropName::Ident(name), Pat::Ident(binding)) if name.sym.as_ref() == key => {
                Some(binding.id.sym.to_string())
            }
            _ => None,
        },
        _ => None,
    })
}

// =============================================================================
// Shape predicates
// =============================================================================

/// import {} from '<package>'
pub fn is_import_from(decl: &ImportDecl, package: &str) -> bool {
    decl.src.value.as_str() == Some(package)
}

/// Name of a plain identifier callee: `t(...)` -> `t`
pub fn callee_ident(callee: &Callee) -> Option<&str> {
    match callee {
        Callee::Expr(expr) => match expr.as_ref() {
            Expr::Ident(ident) => Some(ident.sym.as_ref()),
            _ => None,
        },
        _ => None,
    }
}

/// `name(...)`
pub fn is_call_to(expr: &Expr, name: &str) -> bool {
    match expr {
        Expr::Call(call) => callee_ident(&call.callee) == Some(name),
        Expr::Paren(paren) => is_call_to(&paren.expr, name),
        _ => false,
    }
}

/// `object.property(...)`
pub fn is_member_call(call: &CallExpr, object: &str, property: &str) -> bool {
    let Callee::Expr(expr) = &call.callee else {
        return false;
    };
    let Expr::Member(member) = expr.as_ref() else {
        return false;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return false;
    };
    match member.obj.as_ref() {
        Expr::Ident(obj) => obj.sym.as_ref() == object && prop.sym.as_ref() == property,
        _ => false,
    }
}

/// `<Name>...</Name>`
pub fn is_component(elem: &JSXElement, name: &str) -> bool {
    match &elem.opening.name {
        JSXElementName::Ident(ident) => ident.sym.as_ref() == name,
        _ => false,
    }
}

/// Value of a named JSX attribute, if present and not a bare flag
pub fn jsx_attr_value<'a>(elem: &'a JSXElement, name: &str) -> Option<&'a JSXAttrValue> {
    elem.opening.attrs.iter().find_map(|attr| match attr {
        JSXAttrOrSpread::JSXAttr(jsx_attr) => match &jsx_attr.name {
            JSXAttrName::Ident(ident) if ident.sym.as_ref() == name => jsx_attr.value.as_ref(),
            _ => None,
        },
        _ => None,
    })
}
