//! Resolver behaviour: declaration order, shadowing across every scoping
//! construct, unresolved names, duplicates and fatal tree errors.

use jscope_binder::{
    BindError, BinderOptions, BinderState, BoundUnit, Resolution, ResolvedUse, SymbolId,
    SymbolKind, bind_source,
};
use jscope_common::diagnostic_codes;
use jscope_parser::parser::node::{
    BlockData, CompilationUnitData, NameData, NodeData, ResourceListData, SwitchData, TryData,
};
use jscope_parser::{ModifierFlags, NodeArena, NodeIndex, NodeKind, NodeList};

fn bind(source: &str) -> (NodeArena, NodeIndex, BoundUnit) {
    let (arena, root, bound, diagnostics) =
        bind_source("Test.java", source, BinderOptions::default()).expect("binds");
    assert!(diagnostics.is_empty(), "parse diagnostics: {diagnostics:?}");
    (arena, root, bound)
}

/// Kind of the symbol each use of `name` resolves to, `None` when unresolved.
fn kinds_of_uses(arena: &NodeArena, root: NodeIndex, bound: &BoundUnit, name: &str) -> Vec<Option<SymbolKind>> {
    arena
        .name_uses(root)
        .into_iter()
        .filter(|&idx| arena.get_identifier_name(idx) == Some(name))
        .map(|idx| {
            bound
                .resolve_name_use(arena, idx)
                .and_then(Resolution::symbol)
                .and_then(|id| bound.symbol(id))
                .map(|symbol| symbol.kind)
        })
        .collect()
}

fn resolutions(arena: &NodeArena, root: NodeIndex, bound: &BoundUnit, name: &str) -> Vec<Resolution> {
    arena
        .name_uses(root)
        .into_iter()
        .filter(|&idx| arena.get_identifier_name(idx) == Some(name))
        .filter_map(|idx| bound.resolve_name_use(arena, idx))
        .collect()
}

fn declarations(arena: &NodeArena, root: NodeIndex, bound: &BoundUnit, name: &str) -> Vec<SymbolId> {
    arena
        .descendants(root)
        .into_iter()
        .filter(|&idx| arena.kind(idx) == Some(NodeKind::Identifier))
        .filter(|&idx| arena.get_identifier_name(idx) == Some(name))
        .filter_map(|idx| bound.symbol_of_declaration(idx))
        .collect()
}

// =============================================================================
// Declaration order and shadowing
// =============================================================================

#[test]
fn test_use_before_inner_declaration_resolves_outward() {
    let source = "class C { int f; { f = 1; int f; { f = 2; } } }";
    let (arena, root, bound) = bind(source);
    let decls = declarations(&arena, root, &bound, "f");
    assert_eq!(decls.len(), 2);
    assert_eq!(
        resolutions(&arena, root, &bound, "f"),
        vec![Resolution::Resolved(decls[0]), Resolution::Resolved(decls[1])]
    );
}

#[test]
fn test_bare_name_statements_follow_declaration_order() {
    let source = "class C { int f; { f; int f; { f; } } }";
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "f"),
        vec![Some(SymbolKind::Field), Some(SymbolKind::LocalVariable)]
    );
}

#[test]
fn test_use_before_local_without_outer_is_unresolved() {
    let source = "class C { void m() { x = 1; int x = 2; x = 3; } }";
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "x"),
        vec![None, Some(SymbolKind::LocalVariable)]
    );
}

#[test]
fn test_fields_are_visible_before_their_declaration() {
    let source = "class C { int a = b; int b = 1; void m() { b = a; } }";
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "b"),
        vec![Some(SymbolKind::Field), Some(SymbolKind::Field)]
    );
}

#[test]
fn test_local_is_not_visible_after_its_block() {
    let source = "class C { void m() { { int y = 1; } y = 2; } }";
    let (arena, root, bound) = bind(source);
    assert_eq!(kinds_of_uses(&arena, root, &bound, "y"), vec![None]);
}

#[test]
fn test_unknown_and_qualifier_names_are_unresolved() {
    let source = "class C { void m() { System.out.println(value); } }";
    let (arena, root, bound) = bind(source);
    assert_eq!(kinds_of_uses(&arena, root, &bound, "System"), vec![None]);
    assert_eq!(kinds_of_uses(&arena, root, &bound, "value"), vec![None]);
}

// =============================================================================
// Loops
// =============================================================================

#[test]
fn test_for_each_iterable_cannot_see_the_loop_variable() {
    let source = r#"
class C {
    int[] x;
    void m() {
        for (int x : x) {
            use(x);
        }
        use(x);
    }
}
"#;
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "x"),
        vec![
            Some(SymbolKind::Field),
            Some(SymbolKind::LocalVariable),
            Some(SymbolKind::Field)
        ]
    );
}

#[test]
fn test_basic_for_variables_scope_to_the_statement() {
    let source = r#"
class C {
    void m(int n) {
        for (int i = 0, j = i; i < n; i++, j++) {
            int k = i + j;
        }
        i = 0;
    }
}
"#;
    let (arena, root, bound) = bind(source);
    let i_kinds = kinds_of_uses(&arena, root, &bound, "i");
    assert_eq!(i_kinds.len(), 5);
    assert!(i_kinds[..4].iter().all(|k| *k == Some(SymbolKind::LocalVariable)));
    assert_eq!(i_kinds[4], None, "i is gone after the loop");
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "n"),
        vec![Some(SymbolKind::FormalParameter)]
    );
}

// =============================================================================
// Lambdas and nested classes
// =============================================================================

#[test]
fn test_lambda_parameters_shadow_fields() {
    let source = r#"
class C {
    int a;
    Object f = (a, b) -> a + b;
    Object g = a;
}
"#;
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "a"),
        vec![Some(SymbolKind::FormalParameter), Some(SymbolKind::Field)]
    );
    let lambda_param = declarations(&arena, root, &bound, "a")[1];
    let owner = bound.symbol(lambda_param).unwrap().owner;
    assert_eq!(arena.kind(owner), Some(NodeKind::Lambda));
}

#[test]
fn test_lambda_block_body_locals() {
    let source = r#"
class C {
    void m(int t) {
        Runnable r = () -> { int t2 = t; use(t2); };
        use(t2);
    }
}
"#;
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "t2"),
        vec![Some(SymbolKind::LocalVariable), None]
    );
}

#[test]
fn test_anonymous_class_sees_enclosing_locals() {
    let source = r#"
class C {
    void m() {
        int local = 1;
        int shadowed = 2;
        Runnable r = new Runnable() {
            int shadowed = 3;
            public void run() {
                use(local, shadowed);
            }
        };
        use(shadowed);
    }
}
"#;
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "local"),
        vec![Some(SymbolKind::LocalVariable)]
    );
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "shadowed"),
        vec![Some(SymbolKind::Field), Some(SymbolKind::LocalVariable)]
    );
}

#[test]
fn test_local_class_body_chains_to_the_enclosing_block() {
    let source = r#"
class C {
    void m() {
        int before = 1;
        class Local {
            int own;
            int get() { return before + own + after; }
        }
        int after = 2;
    }
}
"#;
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "before"),
        vec![Some(SymbolKind::LocalVariable)]
    );
    assert_eq!(kinds_of_uses(&arena, root, &bound, "own"), vec![Some(SymbolKind::Field)]);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "after"),
        vec![None],
        "locals declared after the class are not visible in it"
    );
}

#[test]
fn test_nested_member_type_shadows_outer_fields() {
    let source = r#"
class Outer {
    int a;
    int b;
    static class Nested {
        String a;
        void m() { use(a, b); }
    }
}
"#;
    let (arena, root, bound) = bind(source);
    let a_decls = declarations(&arena, root, &bound, "a");
    let b_decls = declarations(&arena, root, &bound, "b");
    assert_eq!(
        resolutions(&arena, root, &bound, "a"),
        vec![Resolution::Resolved(a_decls[1])]
    );
    assert_eq!(
        resolutions(&arena, root, &bound, "b"),
        vec![Resolution::Resolved(b_decls[0])]
    );
}

// =============================================================================
// Enums, interfaces, switch expressions
// =============================================================================

#[test]
fn test_enum_constants_are_public_static_final_fields() {
    let source = r#"
enum Color {
    RED, GREEN {
        Color next() { return RED; }
    };
    static Color first() { return RED; }
}
"#;
    let (arena, root, bound) = bind(source);
    let red = declarations(&arena, root, &bound, "RED")[0];
    let symbol = bound.symbol(red).unwrap();
    assert_eq!(symbol.kind, SymbolKind::Field);
    assert_eq!(
        symbol.modifiers(),
        ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL
    );
    assert_eq!(
        resolutions(&arena, root, &bound, "RED"),
        vec![Resolution::Resolved(red), Resolution::Resolved(red)]
    );
}

#[test]
fn test_interface_fields_get_implicit_modifiers() {
    let source = "interface Limits { int MAX = 10; int TWICE = MAX * 2; }";
    let (arena, root, bound) = bind(source);
    let max = declarations(&arena, root, &bound, "MAX")[0];
    assert_eq!(
        bound.symbol(max).unwrap().modifiers(),
        ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL
    );
    assert_eq!(
        resolutions(&arena, root, &bound, "MAX"),
        vec![Resolution::Resolved(max)]
    );
}

#[test]
fn test_switch_expression_arrow_rules() {
    let source = r#"
class C {
    int v;
    int m(int v) {
        return switch (v) {
            case 1 -> {
                int w = v;
                yield w;
            }
            case 2 -> w;
            default -> 0;
        };
    }
}
"#;
    let (arena, root, bound) = bind(source);
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "v"),
        vec![Some(SymbolKind::FormalParameter), Some(SymbolKind::FormalParameter)]
    );
    assert_eq!(
        kinds_of_uses(&arena, root, &bound, "w"),
        vec![Some(SymbolKind::LocalVariable), None],
        "a block rule's locals stay inside the block"
    );
}

// =============================================================================
// Duplicates and self references
// =============================================================================

#[test]
fn test_duplicate_declaration_keeps_the_first() {
    let source = "class C { void m() { int a = 1; int a = 2; use(a); } }";
    let (arena, root, bound) = bind(source);
    let decls = declarations(&arena, root, &bound, "a");
    assert_eq!(decls.len(), 2, "both declarations get symbols");
    assert_eq!(
        resolutions(&arena, root, &bound, "a"),
        vec![Resolution::Resolved(decls[0])]
    );

    let diagnostics = bound.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, diagnostic_codes::DUPLICATE_DECLARATION);
    assert_eq!(diagnostic.start, bound.symbol(decls[1]).unwrap().declaration_position);
    assert_eq!(diagnostic.related_information.len(), 1);
    assert_eq!(
        diagnostic.related_information[0].start,
        bound.symbol(decls[0]).unwrap().declaration_position
    );
}

#[test]
fn test_duplicate_reporting_can_be_disabled() {
    let source = "class C { int a; int a; }";
    let options = BinderOptions {
        report_duplicates: false,
        ..BinderOptions::default()
    };
    let (_, _, bound, _) = bind_source("Test.java", source, options).unwrap();
    assert!(bound.diagnostics().is_empty());
}

#[test]
fn test_shadowing_across_scopes_is_not_a_duplicate() {
    let source = "class C { int a; void m(int a) { { int b; } int b; } }";
    let (_, _, bound) = bind(source);
    assert!(bound.diagnostics().is_empty());
}

#[test]
fn test_field_self_reference_is_flagged() {
    let source = "class C { int x = x + 1; int y = x; }";
    let (arena, root, bound) = bind(source);
    let flags: Vec<bool> = arena
        .name_uses(root)
        .into_iter()
        .map(|idx| bound.is_self_reference_in_initializer(&arena, idx))
        .collect();
    assert_eq!(flags, vec![true, false]);
}

// =============================================================================
// Bulk and visibility queries
// =============================================================================

#[test]
fn test_parallel_resolution_matches_sequential() {
    let mut source = String::from("class Big {\n    int field;\n    void m(int p) {\n");
    for i in 0..200usize {
        source.push_str(&format!("        int v{i} = p + field + v{};\n", i.saturating_sub(1)));
    }
    source.push_str("    }\n}\n");
    let (arena, _, bound) = bind(&source);

    let sequential: Vec<ResolvedUse> = bound.resolve_all_uses(&arena);
    let parallel = bound.par_resolve_all_uses(&arena);
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.len(), 600);
    assert!(sequential.iter().all(|u| u.resolution.is_resolved()));
}

#[test]
fn test_visible_symbols_innermost_first_without_shadowed() {
    let source = r#"
class C {
    int a;
    int b;
    void m(int b) {
        int c = 0;
        marker();
        int d = 0;
    }
}
"#;
    let (arena, root, bound) = bind(source);
    let marker = arena
        .descendants(root)
        .into_iter()
        .find(|&idx| arena.kind(idx) == Some(NodeKind::MethodCall))
        .unwrap();
    let scope = bound.scope_of(marker).unwrap();
    let position = arena.get(marker).unwrap().pos;

    let visible: Vec<(String, SymbolKind)> = bound
        .visible_symbols_at(scope, position)
        .into_iter()
        .map(|id| {
            let symbol = bound.symbol(id).unwrap();
            (symbol.name.clone(), symbol.kind)
        })
        .collect();
    assert_eq!(
        visible,
        vec![
            ("c".to_string(), SymbolKind::LocalVariable),
            ("b".to_string(), SymbolKind::FormalParameter),
            ("a".to_string(), SymbolKind::Field),
        ]
    );
}

#[test]
fn test_resolve_name_use_rejects_non_uses() {
    let (arena, root, bound) = bind("class C { int a; }");
    assert_eq!(bound.resolve_name_use(&arena, root), None);
    assert_eq!(bound.resolve_name_use(&arena, NodeIndex::NONE), None);
}

// =============================================================================
// Fatal errors
// =============================================================================

#[test]
fn test_scope_depth_limit() {
    let source = "class C { void m() { { { { int x; } } } } }";
    let options = BinderOptions {
        max_scope_depth: 3,
        ..BinderOptions::default()
    };
    let (arena, root, _) = jscope_parser::parse_source("Deep.java", source).unwrap();
    let err = BinderState::with_options("Deep.java", options)
        .bind_compilation_unit(&arena, root)
        .unwrap_err();
    assert!(
        matches!(err, BindError::ScopeTooDeep { limit: 3, .. }),
        "unexpected error: {err}"
    );
}

fn unit_around(arena: &mut NodeArena, child: NodeIndex) -> NodeIndex {
    let root = arena.add_node(
        NodeKind::CompilationUnit,
        0,
        100,
        NodeData::CompilationUnit(CompilationUnitData {
            file_name: "Manual.java".to_string(),
            types: vec![child].into(),
            ..CompilationUnitData::default()
        }),
    );
    arena.link_parents(root);
    root
}

fn bind_manual(arena: &NodeArena, root: NodeIndex) -> BindError {
    BinderState::new("Manual.java")
        .bind_compilation_unit(arena, root)
        .unwrap_err()
}

#[test]
fn test_switch_without_body_is_malformed() {
    let mut arena = NodeArena::new();
    let selector = arena.add_node(
        NodeKind::NameExpression,
        8,
        9,
        NodeData::Name(NameData {
            name: "x".to_string(),
        }),
    );
    let switch = arena.add_node(
        NodeKind::SwitchStatement,
        0,
        10,
        NodeData::Switch(SwitchData {
            expression: selector,
            body: NodeIndex::NONE,
        }),
    );
    let root = unit_around(&mut arena, switch);
    assert_eq!(
        bind_manual(&arena, root),
        BindError::MalformedTree {
            node: switch,
            reason: "switch without a body"
        }
    );
}

#[test]
fn test_empty_resource_list_is_malformed() {
    let mut arena = NodeArena::new();
    let list = arena.add_node(
        NodeKind::ResourceList,
        4,
        6,
        NodeData::ResourceList(ResourceListData::default()),
    );
    let body = arena.add_node(NodeKind::Block, 7, 9, NodeData::Block(BlockData::default()));
    let try_statement = arena.add_node(
        NodeKind::TryStatement,
        0,
        20,
        NodeData::Try(TryData {
            resources: list,
            try_block: body,
            catch_clauses: NodeList::new(),
            finally_block: NodeIndex::NONE,
        }),
    );
    let root = unit_around(&mut arena, try_statement);
    assert!(matches!(
        bind_manual(&arena, root),
        BindError::MalformedTree { node, .. } if node == list
    ));
}

#[test]
fn test_dangling_child_index_is_malformed() {
    let mut arena = NodeArena::new();
    let block = arena.add_node(
        NodeKind::Block,
        0,
        2,
        NodeData::Block(BlockData {
            statements: vec![NodeIndex(999)].into(),
        }),
    );
    let root = unit_around(&mut arena, block);
    assert!(matches!(
        bind_manual(&arena, root),
        BindError::MalformedTree { node: NodeIndex(999), .. }
    ));
}

#[test]
fn test_payload_kind_mismatch_is_malformed() {
    let mut arena = NodeArena::new();
    let block = arena.add_node(NodeKind::Block, 0, 2, NodeData::None);
    let catch = arena.add_node(NodeKind::CatchClause, 0, 2, NodeData::Block(BlockData::default()));
    let outer = arena.add_node(
        NodeKind::Block,
        0,
        4,
        NodeData::Block(BlockData {
            statements: vec![block, catch].into(),
        }),
    );
    let root = unit_around(&mut arena, outer);
    assert!(matches!(
        bind_manual(&arena, root),
        BindError::MalformedTree { node, .. } if node == catch
    ));
}

#[test]
fn test_root_must_be_a_compilation_unit() {
    let mut arena = NodeArena::new();
    let block = arena.add_node(NodeKind::Block, 0, 2, NodeData::Block(BlockData::default()));
    assert!(matches!(
        bind_manual(&arena, block),
        BindError::MalformedTree { .. }
    ));
}
