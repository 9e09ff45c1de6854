//! TSX to JavaScript transpiler.
//!
//! The source is parsed with the tree-sitter TSX grammar (through ast-grep),
//! then re-emitted by a copying walk over the tree: text between child nodes
//! is copied verbatim, type-only syntax is erased, and JSX is lowered to
//! `React.createElement` calls. The output is a plain ES module body; the
//! same input always yields byte-identical output.

mod jsx;
mod syntax;
mod text;

use ast_grep_core::Node;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::{LanguageExt, SupportLang};

use crate::error::StageError;

pub(crate) type TsxNode<'r> = Node<'r, StrDoc<SupportLang>>;

/// JSX element factory the output calls.
pub const JSX_FACTORY: &str = "React.createElement";

/// Fragment component passed to the factory for `<>...</>`.
pub const JSX_FRAGMENT: &str = "React.Fragment";

/// Nodes that only carry type information and are dropped with their text.
const ERASED: &[&str] = &[
    "type_annotation",
    "type_arguments",
    "type_parameters",
    "type_predicate_annotation",
    "asserts_annotation",
    "opting_type_annotation",
    "omitting_type_annotation",
    "adding_type_annotation",
    "interface_declaration",
    "type_alias_declaration",
    "ambient_declaration",
    "function_signature",
    "abstract_method_signature",
    "index_signature",
    "implements_clause",
    "accessibility_modifier",
    "override_modifier",
];

/// Expressions whose type-level wrapper is dropped, keeping the operand.
const UNWRAPPED: &[&str] = &[
    "as_expression",
    "satisfies_expression",
    "non_null_expression",
    "instantiation_expression",
];

/// Nodes that may carry TypeScript-only modifier tokens as direct children.
const MODIFIED: &[&str] = &[
    "required_parameter",
    "optional_parameter",
    "public_field_definition",
    "variable_declarator",
    "method_definition",
    "abstract_class_declaration",
];

/// Modifier tokens dropped from [`MODIFIED`] nodes.
const MODIFIER_TOKENS: &[&str] = &["?", "!", "readonly", "declare", "abstract", "override"];

/// Declarations that make an `export` statement type-only.
const TYPE_DECLARATIONS: &[&str] = &[
    "interface_declaration",
    "type_alias_declaration",
    "ambient_declaration",
    "function_signature",
];

pub(crate) const JSX_NODES: &[&str] = &["jsx_element", "jsx_self_closing_element", "jsx_fragment"];

/// Transpile TSX source into an executable JavaScript module body.
///
/// # Errors
///
/// Returns [`StageError::Compile`] with a `line:column: message` text for the
/// first parse error, a mismatched JSX closing tag, or unsupported syntax.
pub fn transpile(source: &str) -> Result<String, StageError> {
    let tree = SupportLang::Tsx.ast_grep(source);
    let root = tree.root();

    if let Some(err) = syntax::first_syntax_error(&root, source) {
        tracing::debug!(error = %err, "transpile rejected source");
        return Err(err);
    }

    // The root node may not span leading or trailing whitespace.
    let span = root.range();
    let mut emitter = Emitter::new(source);
    emitter.out.push_str(&source[..span.start]);
    emitter.emit(&root)?;
    emitter.out.push_str(&source[span.end..]);
    Ok(emitter.finish())
}

struct Emitter<'s> {
    source: &'s str,
    out: String,
}

impl<'s> Emitter<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            out: String::with_capacity(source.len()),
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn emit(&mut self, node: &TsxNode<'_>) -> Result<(), StageError> {
        let kind = node.kind();
        let kind = kind.as_ref();

        if ERASED.contains(&kind) {
            return Ok(());
        }
        if UNWRAPPED.contains(&kind) {
            return match node.children().next() {
                Some(operand) => self.emit(&operand),
                None => Ok(()),
            };
        }
        if JSX_NODES.contains(&kind) {
            let call = self.render_jsx(node)?;
            self.out.push_str(&call);
            return Ok(());
        }

        match kind {
            "export_statement" | "import_statement" if is_type_only(node) => Ok(()),
            "enum_declaration" => Err(syntax::error_at(
                self.source,
                node,
                "enum declarations are not supported",
            )),
            k if MODIFIED.contains(&k) => self.emit_children(node, MODIFIER_TOKENS),
            _ => self.emit_children(node, &[]),
        }
    }

    /// Copy `node`, emitting each child in turn and the text between children
    /// verbatim. Children whose kind is in `skip` are dropped.
    fn emit_children(&mut self, node: &TsxNode<'_>, skip: &[&str]) -> Result<(), StageError> {
        let range = node.range();
        let mut cursor = range.start;
        let mut has_children = false;

        for child in node.children() {
            has_children = true;
            let child_range = child.range();
            if child_range.start > cursor {
                self.out.push_str(&self.source[cursor..child_range.start]);
            }
            if !skip.contains(&child.kind().as_ref()) {
                self.emit(&child)?;
            }
            cursor = cursor.max(child_range.end);
        }

        if has_children {
            if range.end > cursor {
                self.out.push_str(&self.source[cursor..range.end]);
            }
        } else {
            self.out.push_str(&self.source[range]);
        }
        Ok(())
    }

    /// Emit `node` into a fresh buffer and return it.
    fn render(&mut self, node: &TsxNode<'_>) -> Result<String, StageError> {
        let saved = std::mem::take(&mut self.out);
        let result = self.emit(node);
        let rendered = std::mem::replace(&mut self.out, saved);
        result.map(|()| rendered)
    }
}

/// `export interface ...`, `export type { X }`, `import type { X } from ...`.
fn is_type_only(node: &TsxNode<'_>) -> bool {
    node.children().any(|child| {
        let kind = child.kind();
        kind.as_ref() == "type" || TYPE_DECLARATIONS.contains(&kind.as_ref())
    })
}
