use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use oxc_syntax::operator::BinaryOperator;
use std::collections::HashSet;

use crate::{
    error::ProbeError,
    types::{Location, SpecKind, Specifier},
};

/// Extract every dependency specifier reachable in a production build of one
/// module: static imports, re-exports with a source, dynamic `import()`, and
/// literal `require()` calls. Branches guarded by a decidable
/// `process.env.NODE_ENV` comparison are pruned before descent.
pub fn dependencies_of(source: &str, location: &Location) -> Result<Vec<Specifier>, ProbeError> {
    let st = source_type_for(location);
    let allocator = Allocator::default();
    let ParserReturn { program, panicked, .. } = OxcParser::new(&allocator, source, st).parse();
    if panicked {
        return Err(ProbeError::ParseFailed { location: location.to_string() });
    }

    let mut extractor = Extractor::default();
    for stmt in &program.body {
        extractor.walk_statement(stmt);
    }

    // Distinct specifier strings; order carries no meaning downstream.
    let mut seen: HashSet<String> = HashSet::new();
    let specs: Vec<Specifier> =
        extractor.specs.into_iter().filter(|s| seen.insert(s.request.clone())).collect();
    debug!("Found {} dependency specifier(s) in {}", specs.len(), location);
    Ok(specs)
}

fn source_type_for(location: &Location) -> SourceType {
    let ext = location.extension();

    let mut st = SourceType::default()
        .with_jsx(matches!(ext, Some("jsx") | Some("tsx")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")));

    // Everything except explicit CommonJS parses in module mode so that
    // import declarations are accepted; require() parses fine either way.
    if !matches!(ext, Some("cjs") | Some("cts")) {
        st = st.with_module(true);
    }

    st
}

#[derive(Default)]
struct Extractor {
    specs: Vec<Specifier>,
}

impl Extractor {
    fn push(&mut self, request: &str, kind: SpecKind) {
        trace!("Found specifier: '{}'", request);
        self.specs.push(Specifier { request: request.to_string(), kind });
    }

    fn walk_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                if decl.import_kind.is_type() {
                    return;
                }
                // `import { type Foo } from 'x'` with no runtime specifier
                // is erased at build time.
                let has_runtime_import = if let Some(specifiers) = &decl.specifiers {
                    specifiers.iter().any(|spec| match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => !s.import_kind.is_type(),
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => true,
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => true,
                    })
                } else {
                    true
                };
                if has_runtime_import {
                    self.push(&decl.source.value, SpecKind::Static);
                }
            }
            Statement::ExportNamedDeclaration(decl) => {
                if decl.export_kind.is_type() {
                    return;
                }
                if let Some(source) = &decl.source {
                    self.push(&source.value, SpecKind::Static);
                }
                if let Some(inner) = &decl.declaration {
                    self.walk_declaration(inner);
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                if !decl.export_kind.is_type() {
                    self.push(&decl.source.value, SpecKind::Static);
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                if let Some(expr) = decl.declaration.as_expression() {
                    self.walk_expression(expr);
                }
            }
            Statement::ExpressionStatement(es) => self.walk_expression(&es.expression),
            Statement::VariableDeclaration(vd) => {
                for decl in &vd.declarations {
                    if let Some(init) = &decl.init {
                        self.walk_expression(init);
                    }
                }
            }
            Statement::FunctionDeclaration(f) => {
                if let Some(body) = &f.body {
                    for s in &body.statements {
                        self.walk_statement(s);
                    }
                }
            }
            Statement::ClassDeclaration(c) => self.walk_class(c),
            Statement::BlockStatement(b) => {
                for s in &b.body {
                    self.walk_statement(s);
                }
            }
            Statement::IfStatement(ifs) => match prune_verdict(&ifs.test) {
                Some(true) => self.walk_statement(&ifs.consequent),
                Some(false) => {
                    if let Some(alt) = &ifs.alternate {
                        self.walk_statement(alt);
                    }
                }
                None => {
                    self.walk_expression(&ifs.test);
                    self.walk_statement(&ifs.consequent);
                    if let Some(alt) = &ifs.alternate {
                        self.walk_statement(alt);
                    }
                }
            },
            Statement::ForStatement(f) => {
                if let Some(init) = &f.init {
                    match init {
                        ForStatementInit::VariableDeclaration(vd) => {
                            for decl in &vd.declarations {
                                if let Some(e) = &decl.init {
                                    self.walk_expression(e);
                                }
                            }
                        }
                        other => {
                            if let Some(e) = other.as_expression() {
                                self.walk_expression(e);
                            }
                        }
                    }
                }
                if let Some(test) = &f.test {
                    self.walk_expression(test);
                }
                if let Some(update) = &f.update {
                    self.walk_expression(update);
                }
                self.walk_statement(&f.body);
            }
            Statement::ForInStatement(f) => {
                self.walk_expression(&f.right);
                self.walk_statement(&f.body);
            }
            Statement::ForOfStatement(f) => {
                self.walk_expression(&f.right);
                self.walk_statement(&f.body);
            }
            Statement::WhileStatement(w) => {
                self.walk_expression(&w.test);
                self.walk_statement(&w.body);
            }
            Statement::DoWhileStatement(d) => {
                self.walk_statement(&d.body);
                self.walk_expression(&d.test);
            }
            Statement::SwitchStatement(sw) => {
                self.walk_expression(&sw.discriminant);
                for case in &sw.cases {
                    if let Some(test) = &case.test {
                        self.walk_expression(test);
                    }
                    for s in &case.consequent {
                        self.walk_statement(s);
                    }
                }
            }
            Statement::TryStatement(t) => {
                for s in &t.block.body {
                    self.walk_statement(s);
                }
                if let Some(handler) = &t.handler {
                    for s in &handler.body.body {
                        self.walk_statement(s);
                    }
                }
                if let Some(finalizer) = &t.finalizer {
                    for s in &finalizer.body {
                        self.walk_statement(s);
                    }
                }
            }
            Statement::LabeledStatement(l) => self.walk_statement(&l.body),
            Statement::ReturnStatement(r) => {
                if let Some(arg) = &r.argument {
                    self.walk_expression(arg);
                }
            }
            Statement::ThrowStatement(t) => self.walk_expression(&t.argument),
            _ => {}
        }
    }

    fn walk_declaration(&mut self, decl: &Declaration) {
        match decl {
            Declaration::VariableDeclaration(vd) => {
                for d in &vd.declarations {
                    if let Some(init) = &d.init {
                        self.walk_expression(init);
                    }
                }
            }
            Declaration::FunctionDeclaration(f) => {
                if let Some(body) = &f.body {
                    for s in &body.statements {
                        self.walk_statement(s);
                    }
                }
            }
            Declaration::ClassDeclaration(c) => self.walk_class(c),
            _ => {}
        }
    }

    fn walk_class(&mut self, class: &Class) {
        for element in &class.body.body {
            match element {
                ClassElement::MethodDefinition(m) => {
                    if let Some(body) = &m.value.body {
                        for s in &body.statements {
                            self.walk_statement(s);
                        }
                    }
                }
                ClassElement::PropertyDefinition(p) => {
                    if let Some(value) = &p.value {
                        self.walk_expression(value);
                    }
                }
                ClassElement::StaticBlock(b) => {
                    for s in &b.body {
                        self.walk_statement(s);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::CallExpression(ce) => {
                if let Expression::Identifier(callee) = &ce.callee
                    && callee.name == "require"
                    && !ce.arguments.is_empty()
                    && let Some(Expression::StringLiteral(sl)) = ce.arguments[0].as_expression()
                {
                    self.push(&sl.value, SpecKind::Static);
                }
                self.walk_expression(&ce.callee);
                for arg in &ce.arguments {
                    if let Some(arg_expr) = arg.as_expression() {
                        self.walk_expression(arg_expr);
                    }
                }
            }
            Expression::ImportExpression(ie) => {
                if let Expression::StringLiteral(sl) = &ie.source {
                    self.push(&sl.value, SpecKind::Dynamic);
                } else {
                    self.walk_expression(&ie.source);
                }
            }
            Expression::ConditionalExpression(ce) => match prune_verdict(&ce.test) {
                Some(true) => self.walk_expression(&ce.consequent),
                Some(false) => self.walk_expression(&ce.alternate),
                None => {
                    self.walk_expression(&ce.test);
                    self.walk_expression(&ce.consequent);
                    self.walk_expression(&ce.alternate);
                }
            },
            Expression::ArrayExpression(ae) => {
                for elem in &ae.elements {
                    if let Some(e) = elem.as_expression() {
                        self.walk_expression(e);
                    }
                }
            }
            Expression::ObjectExpression(oe) => {
                for prop in &oe.properties {
                    match prop {
                        ObjectPropertyKind::ObjectProperty(p) => self.walk_expression(&p.value),
                        ObjectPropertyKind::SpreadProperty(s) => self.walk_expression(&s.argument),
                    }
                }
            }
            Expression::AssignmentExpression(ae) => self.walk_expression(&ae.right),
            Expression::BinaryExpression(be) => {
                self.walk_expression(&be.left);
                self.walk_expression(&be.right);
            }
            Expression::LogicalExpression(le) => {
                self.walk_expression(&le.left);
                self.walk_expression(&le.right);
            }
            Expression::UnaryExpression(ue) => self.walk_expression(&ue.argument),
            Expression::SequenceExpression(se) => {
                for e in &se.expressions {
                    self.walk_expression(e);
                }
            }
            Expression::ParenthesizedExpression(pe) => self.walk_expression(&pe.expression),
            Expression::AwaitExpression(ae) => self.walk_expression(&ae.argument),
            Expression::NewExpression(ne) => {
                self.walk_expression(&ne.callee);
                for arg in &ne.arguments {
                    if let Some(arg_expr) = arg.as_expression() {
                        self.walk_expression(arg_expr);
                    }
                }
            }
            Expression::TemplateLiteral(tl) => {
                for e in &tl.expressions {
                    self.walk_expression(e);
                }
            }
            Expression::ArrowFunctionExpression(af) => {
                for s in &af.body.statements {
                    self.walk_statement(s);
                }
            }
            Expression::FunctionExpression(f) => {
                if let Some(body) = &f.body {
                    for s in &body.statements {
                        self.walk_statement(s);
                    }
                }
            }
            Expression::ClassExpression(c) => self.walk_class(c),
            Expression::StaticMemberExpression(me) => self.walk_expression(&me.object),
            Expression::ComputedMemberExpression(me) => {
                self.walk_expression(&me.object);
                self.walk_expression(&me.expression);
            }
            _ => {}
        }
    }
}

/// Decide a `process.env.NODE_ENV <op> "<literal>"` test against a
/// production build. `Some(true)`/`Some(false)` prune one branch;
/// `None` means the test is not the canonical pattern and both branches
/// stay reachable.
fn prune_verdict(test: &Expression) -> Option<bool> {
    let Expression::BinaryExpression(be) = test else {
        return None;
    };
    let is_eq =
        matches!(be.operator, BinaryOperator::Equality | BinaryOperator::StrictEquality);
    let is_ne =
        matches!(be.operator, BinaryOperator::Inequality | BinaryOperator::StrictInequality);
    if !is_eq && !is_ne {
        return None;
    }

    let literal = match (&be.left, &be.right) {
        (Expression::StringLiteral(sl), other) if is_node_env(other) => sl.value.as_str(),
        (other, Expression::StringLiteral(sl)) if is_node_env(other) => sl.value.as_str(),
        _ => return None,
    };

    // Only the literal "production" is recognized as the truth value.
    let equals_production = literal == "production";
    Some(if is_eq { equals_production } else { !equals_production })
}

fn is_node_env(expr: &Expression) -> bool {
    let Expression::StaticMemberExpression(outer) = expr else {
        return false;
    };
    if outer.property.name != "NODE_ENV" {
        return false;
    }
    let Expression::StaticMemberExpression(inner) = &outer.object else {
        return false;
    };
    inner.property.name == "env"
        && matches!(&inner.object, Expression::Identifier(id) if id.name == "process")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn deps(source: &str) -> Vec<String> {
        let location = Location::Local(PathBuf::from("test.js"));
        dependencies_of(source, &location)
            .unwrap()
            .into_iter()
            .map(|s| s.request)
            .collect()
    }

    #[test]
    fn test_static_import() {
        assert_eq!(deps("import foo from './foo';"), vec!["./foo"]);
    }

    #[test]
    fn test_side_effect_import() {
        assert_eq!(deps("import './polyfills';"), vec!["./polyfills"]);
    }

    #[test]
    fn test_named_reexport() {
        assert_eq!(deps("export { isEqual } from './isEqual.js';"), vec!["./isEqual.js"]);
    }

    #[test]
    fn test_export_all() {
        assert_eq!(deps("export * from './everything';"), vec!["./everything"]);
    }

    #[test]
    fn test_dynamic_import() {
        let specs = dependencies_of("import('./lazy');", &Location::Local("test.js".into())).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].request, "./lazy");
        assert!(matches!(specs[0].kind, SpecKind::Dynamic));
    }

    #[test]
    fn test_require_call() {
        assert_eq!(deps("const dbg = require('debug');"), vec!["debug"]);
    }

    #[test]
    fn test_require_inside_function_body() {
        assert_eq!(deps("function load() { return require('./inner'); }"), vec!["./inner"]);
    }

    #[test]
    fn test_not_production_branch_pruned() {
        let src = r#"
            if (process.env.NODE_ENV !== "production") {
                require("dev-only");
            }
        "#;
        assert!(deps(src).is_empty());
    }

    #[test]
    fn test_production_branch_kept() {
        let src = r#"
            if (process.env.NODE_ENV === "production") {
                require("prod-only");
            } else {
                require("dev-only");
            }
        "#;
        assert_eq!(deps(src), vec!["prod-only"]);
    }

    #[test]
    fn test_flipped_operand_order() {
        let src = r#"
            if ("production" === process.env.NODE_ENV) {
                require("prod-only");
            }
        "#;
        assert_eq!(deps(src), vec!["prod-only"]);
    }

    #[test]
    fn test_loose_inequality_against_other_literal() {
        // NODE_ENV != "development" is definitely true in production.
        let src = r#"
            if (process.env.NODE_ENV != "development") {
                require("kept");
            } else {
                require("dropped");
            }
        "#;
        assert_eq!(deps(src), vec!["kept"]);
    }

    #[test]
    fn test_indeterminate_test_keeps_both_branches() {
        let src = r#"
            if (globalThis.__DEV__) {
                require("./a");
            } else {
                require("./b");
            }
        "#;
        let mut found = deps(src);
        found.sort();
        assert_eq!(found, vec!["./a", "./b"]);
    }

    #[test]
    fn test_non_node_env_ternary_keeps_both() {
        let src = "const mod = cond ? require('./a') : require('./b');";
        let mut found = deps(src);
        found.sort();
        assert_eq!(found, vec!["./a", "./b"]);
    }

    #[test]
    fn test_node_env_ternary_prunes() {
        let src = r#"const logger = process.env.NODE_ENV === "production" ? require("noop") : require("verbose");"#;
        assert_eq!(deps(src), vec!["noop"]);
    }

    #[test]
    fn test_non_comparison_operator_is_indeterminate() {
        // `>` is outside the recognized operator set.
        let src = r#"
            if (process.env.NODE_ENV > "production") {
                require("./odd");
            }
        "#;
        assert_eq!(deps(src), vec!["./odd"]);
    }

    #[test]
    fn test_nested_pruning_inside_function() {
        let src = r#"
            function setup() {
                if (process.env.NODE_ENV !== "production") {
                    require("./devtools");
                }
                require("./core");
            }
        "#;
        assert_eq!(deps(src), vec!["./core"]);
    }

    #[test]
    fn test_duplicate_specifiers_collapse() {
        let src = "import a from './a'; const b = require('./a');";
        assert_eq!(deps(src), vec!["./a"]);
    }

    #[test]
    fn test_type_only_import_skipped() {
        let location = Location::Local(PathBuf::from("test.ts"));
        let specs = dependencies_of("import type { Foo } from './types';", &location).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_no_dependencies() {
        assert!(deps("const x = 42;").is_empty());
    }
}
