//! JSX lowering to `React.createElement(tag, props, ...children)`.

use super::syntax::error_at;
use super::text::{collapse_jsx_whitespace, decode_entities, is_identifier, js_string};
use super::{Emitter, JSX_FACTORY, JSX_FRAGMENT, JSX_NODES, TsxNode};
use crate::error::StageError;

/// Node kinds that name a tag. Closing tags open with a single `</` token, so
/// the name is found by kind rather than by skipping punctuation.
const TAG_NAME_KINDS: &[&str] = &[
    "identifier",
    "member_expression",
    "nested_identifier",
    "jsx_namespace_name",
];

impl Emitter<'_> {
    /// Lower a JSX element, self-closing element, or fragment to a factory call.
    pub(super) fn render_jsx(&mut self, node: &TsxNode<'_>) -> Result<String, StageError> {
        match node.kind().as_ref() {
            "jsx_self_closing_element" => {
                let (tag, props) = self.tag_and_props(node)?;
                Ok(factory_call(&tag, &props, &[]))
            }
            "jsx_fragment" => {
                let tokens: Vec<_> = node.children().collect();
                let start = tokens
                    .iter()
                    .find(|t| t.kind().as_ref() == ">")
                    .map_or(node.range().start, |t| t.range().end);
                let end = tokens
                    .iter()
                    .rev()
                    .find(|t| t.kind().as_ref() == "<")
                    .map_or(node.range().end, |t| t.range().start);
                let children = self.render_children(node, start, end)?;
                Ok(factory_call(JSX_FRAGMENT, "null", &children))
            }
            _ => {
                let opening = node
                    .children()
                    .find(|c| c.kind().as_ref() == "jsx_opening_element")
                    .ok_or_else(|| error_at(self.source, node, "Expected \"jsx_opening_element\""))?;
                let closing = node
                    .children()
                    .find(|c| c.kind().as_ref() == "jsx_closing_element")
                    .ok_or_else(|| error_at(self.source, node, "Expected \"jsx_closing_element\""))?;
                self.check_closing(&opening, &closing)?;

                let (tag, props) = self.tag_and_props(&opening)?;
                let children =
                    self.render_children(node, opening.range().end, closing.range().start)?;
                Ok(factory_call(&tag, &props, &children))
            }
        }
    }

    fn check_closing(&self, opening: &TsxNode<'_>, closing: &TsxNode<'_>) -> Result<(), StageError> {
        let open = tag_name(opening).map(|n| n.text().to_string()).unwrap_or_default();
        let close = tag_name(closing).map(|n| n.text().to_string()).unwrap_or_default();
        if open == close {
            return Ok(());
        }
        Err(error_at(
            self.source,
            closing,
            &format!("Unexpected closing \"{close}\" tag does not match opening \"{open}\" tag"),
        ))
    }

    /// Tag expression and props object of an opening or self-closing tag.
    fn tag_and_props(&mut self, node: &TsxNode<'_>) -> Result<(String, String), StageError> {
        let tag = tag_name(node).map_or_else(|| JSX_FRAGMENT.to_string(), |name| tag_expression(&name));

        let mut props = Vec::new();
        for child in node.children() {
            match child.kind().as_ref() {
                "jsx_attribute" => props.push(self.render_attribute(&child)?),
                "jsx_expression" => {
                    if let Some(spread) = self.render_embedded(&child)? {
                        props.push(spread);
                    }
                }
                _ => {}
            }
        }

        let props = if props.is_empty() {
            String::from("null")
        } else {
            format!("{{ {} }}", props.join(", "))
        };
        Ok((tag, props))
    }

    fn render_attribute(&mut self, attr: &TsxNode<'_>) -> Result<String, StageError> {
        let mut parts = attr.children().filter(|c| c.kind().as_ref() != "=");
        let name = parts
            .next()
            .ok_or_else(|| error_at(self.source, attr, "Expected \"attribute name\""))?;
        let name = name.text();
        let key = if is_identifier(&name) {
            name.to_string()
        } else {
            js_string(&name)
        };

        let value = match parts.next() {
            None => String::from("true"),
            Some(value) => match value.kind().as_ref() {
                "string" => {
                    let quoted = value.text();
                    let inner = quoted
                        .get(1..quoted.len().saturating_sub(1))
                        .unwrap_or_default();
                    js_string(&decode_entities(inner))
                }
                "jsx_expression" => self.render_embedded(&value)?.ok_or_else(|| {
                    error_at(
                        self.source,
                        &value,
                        "JSX attributes must only be assigned a non-empty expression",
                    )
                })?,
                _ => self.render(&value)?,
            },
        };
        Ok(format!("{key}: {value}"))
    }

    /// Children between `start` and `end`: text runs from the raw source, and
    /// rendered elements and expressions.
    fn render_children(
        &mut self,
        node: &TsxNode<'_>,
        start: usize,
        end: usize,
    ) -> Result<Vec<String>, StageError> {
        let mut children = Vec::new();
        let mut cursor = start;

        for child in node.children() {
            let range = child.range();
            if range.start < start || range.end > end {
                continue;
            }
            let kind = child.kind();
            let is_element = JSX_NODES.contains(&kind.as_ref());
            if !is_element && kind.as_ref() != "jsx_expression" {
                continue;
            }

            self.push_text(&mut children, cursor, range.start);
            let rendered = if is_element {
                Some(self.render_jsx(&child)?)
            } else {
                self.render_embedded(&child)?
            };
            children.extend(rendered);
            cursor = range.end;
        }
        self.push_text(&mut children, cursor, end);
        Ok(children)
    }

    fn push_text(&self, children: &mut Vec<String>, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let text = collapse_jsx_whitespace(&decode_entities(&self.source[start..end]));
        if !text.is_empty() {
            children.push(js_string(&text));
        }
    }

    /// Contents of a `{...}` container, or `None` when it holds only comments.
    fn render_embedded(&mut self, container: &TsxNode<'_>) -> Result<Option<String>, StageError> {
        let inner: Vec<_> = container
            .children()
            .filter(|c| !matches!(c.kind().as_ref(), "{" | "}"))
            .collect();
        if inner.iter().all(|c| c.kind().as_ref() == "comment") {
            return Ok(None);
        }

        let mut out = String::new();
        let mut cursor = None;
        for child in &inner {
            let range = child.range();
            if child.kind().as_ref() == "comment" {
                cursor = Some(range.end);
                continue;
            }
            if let Some(prev) = cursor.filter(|&prev| range.start > prev) {
                out.push_str(&self.source[prev..range.start]);
            }
            out.push_str(&self.render(child)?);
            cursor = Some(range.end);
        }
        Ok(Some(out.trim().to_string()))
    }
}

/// Name node of an opening, closing, or self-closing tag.
fn tag_name<'r>(tag: &TsxNode<'r>) -> Option<TsxNode<'r>> {
    tag.children().find(|c| TAG_NAME_KINDS.contains(&c.kind().as_ref()))
}

/// Intrinsic elements (`div`, `my-widget`, `svg:rect`) become strings;
/// components and member paths (`Card`, `Tabs.List`) stay references.
fn tag_expression(name: &TsxNode<'_>) -> String {
    let text = name.text();
    let intrinsic = name.kind().as_ref() == "jsx_namespace_name"
        || text.contains('-')
        || (text.chars().next().is_some_and(char::is_lowercase) && !text.contains('.'));
    if intrinsic {
        js_string(&text)
    } else {
        text.to_string()
    }
}

fn factory_call(tag: &str, props: &str, children: &[String]) -> String {
    if children.is_empty() {
        format!("{JSX_FACTORY}({tag}, {props})")
    } else {
        format!("{JSX_FACTORY}({tag}, {props}, {})", children.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::super::transpile;
    use pretty_assertions::assert_eq;

    fn lower(expr: &str) -> String {
        let out = transpile(&format!("const el = {expr};")).unwrap();
        out.strip_prefix("const el = ")
            .and_then(|s| s.strip_suffix(';'))
            .unwrap_or(&out)
            .to_string()
    }

    #[test]
    fn intrinsic_element_with_text() {
        assert_eq!(
            lower(r#"<div className="p-4">Hi</div>"#),
            r#"React.createElement("div", { className: "p-4" }, "Hi")"#
        );
    }

    #[test]
    fn component_with_expression_and_boolean_props() {
        assert_eq!(
            lower("<Card title={t} elevated />"),
            "React.createElement(Card, { title: t, elevated: true })"
        );
    }

    #[test]
    fn fragments_use_fragment_component() {
        assert_eq!(
            lower("<><Text>a</Text>{x}</>"),
            r#"React.createElement(React.Fragment, null, React.createElement(Text, null, "a"), x)"#
        );
    }

    #[test]
    fn multiline_text_collapses() {
        assert_eq!(
            lower("<p>\n  Hello\n  world\n</p>"),
            r#"React.createElement("p", null, "Hello world")"#
        );
    }

    #[test]
    fn quoted_keys_and_spread() {
        assert_eq!(
            lower(r#"<svg aria-label="x" {...rest} />"#),
            r#"React.createElement("svg", { "aria-label": "x", ...rest })"#
        );
    }

    #[test]
    fn nested_elements_inside_expressions() {
        assert_eq!(
            lower("<ul>{items.map((i) => <li key={i}>{i}</li>)}</ul>"),
            r#"React.createElement("ul", null, items.map((i) => React.createElement("li", { key: i }, i)))"#
        );
    }

    #[test]
    fn comment_containers_are_dropped() {
        assert_eq!(
            lower("<div>{/* note */}ok</div>"),
            r#"React.createElement("div", null, "ok")"#
        );
    }

    #[test]
    fn entities_decode_in_text_and_attributes() {
        assert_eq!(
            lower(r#"<p title="a &amp; b">x &lt; y</p>"#),
            r#"React.createElement("p", { title: "a & b" }, "x < y")"#
        );
    }

    #[test]
    fn member_tags_stay_references() {
        assert_eq!(lower("<Tabs.List />"), "React.createElement(Tabs.List, null)");
    }

    #[test]
    fn type_syntax_inside_containers_is_erased() {
        assert_eq!(
            lower("<Text>{(n as number) + 1}</Text>"),
            "React.createElement(Text, null, (n) + 1)"
        );
    }

    #[test]
    fn matching_closing_tags_are_accepted() {
        assert_eq!(lower("<div>Hi</div>"), r#"React.createElement("div", null, "Hi")"#);
        assert_eq!(
            lower("<Tabs.List>x</Tabs.List>"),
            r#"React.createElement(Tabs.List, null, "x")"#
        );
        assert_eq!(
            lower("<svg:g></svg:g>"),
            r#"React.createElement("svg:g", null)"#
        );
    }

    #[test]
    fn mismatched_closing_tag_is_compile_error() {
        let err = transpile("const el = <div></span>;").unwrap_err();
        assert!(matches!(err, crate::error::StageError::Compile(_)), "{err}");
        assert!(
            err.to_string()
                .contains(r#"closing "span" tag does not match opening "div" tag"#),
            "{err}"
        );
    }
}
