//! Symbol records: kinds, owners, positions and pass-through modifiers.

use jscope_binder::{BinderOptions, BoundUnit, Symbol, SymbolKind, bind_source};
use jscope_parser::{ModifierFlags, NodeArena, NodeIndex, NodeKind};

fn bind(source: &str) -> (NodeArena, NodeIndex, BoundUnit) {
    let (arena, root, bound, diagnostics) =
        bind_source("Test.java", source, BinderOptions::default()).expect("binds");
    assert!(diagnostics.is_empty(), "parse diagnostics: {diagnostics:?}");
    (arena, root, bound)
}

fn symbol_named<'a>(bound: &'a BoundUnit, name: &str) -> &'a Symbol {
    bound
        .symbols()
        .iter()
        .map(|(_, symbol)| symbol)
        .find(|symbol| symbol.name == name)
        .unwrap_or_else(|| panic!("no symbol named {name}"))
}

#[test]
fn test_every_declaration_kind() {
    let source = r#"
record Point(int x, int y) {
    static int count;

    Point {
        count++;
    }

    int sum(int extra) {
        int total = x + y + extra;
        try (Res res = open()) {
            return total;
        } catch (Exception err) {
            return 0;
        }
    }
}
"#;
    let (_, _, bound) = bind(source);
    let kinds: Vec<(&str, SymbolKind)> = bound
        .symbols()
        .iter()
        .map(|(_, symbol)| (symbol.name.as_str(), symbol.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("x", SymbolKind::RecordComponentField),
            ("y", SymbolKind::RecordComponentField),
            ("count", SymbolKind::Field),
            ("x", SymbolKind::RecordComponentParameter),
            ("y", SymbolKind::RecordComponentParameter),
            ("extra", SymbolKind::FormalParameter),
            ("total", SymbolKind::LocalVariable),
            ("res", SymbolKind::ResourceVariable),
            ("err", SymbolKind::ExceptionParameter),
        ]
    );
}

#[test]
fn test_owners() {
    let source = r#"
class C {
    int field;
    void m(int p) {
        int local = 0;
        for (String s : items) { }
        try { } catch (Exception e) { }
        Runnable r = () -> { int inLambda = 0; };
    }
    { int inInit = 0; }
}
"#;
    let (arena, _, bound) = bind(source);
    let owner_kind = |name: &str| arena.kind(symbol_named(&bound, name).owner);

    assert_eq!(owner_kind("field"), Some(NodeKind::ClassDeclaration));
    assert_eq!(owner_kind("p"), Some(NodeKind::MethodDeclaration));
    assert_eq!(owner_kind("local"), Some(NodeKind::MethodDeclaration));
    assert_eq!(owner_kind("s"), Some(NodeKind::ForEachStatement));
    assert_eq!(owner_kind("e"), Some(NodeKind::CatchClause));
    assert_eq!(owner_kind("inLambda"), Some(NodeKind::Lambda));
    assert_eq!(owner_kind("inInit"), Some(NodeKind::Initializer));
}

#[test]
fn test_positions() {
    let source = "class C { void m() { int a = 1, b = a; try (R r = f()) { } } }";
    let (arena, _, bound) = bind(source);

    let a = symbol_named(&bound, "a");
    assert_eq!(a.declaration_position, source.find("a = 1").unwrap() as u32);
    assert_eq!(a.visible_from, a.declaration_position);
    assert_eq!(arena.get_identifier_name(a.declaration), Some("a"));

    let b = symbol_named(&bound, "b");
    assert!(b.declaration_position > a.declaration_position);

    let r = symbol_named(&bound, "r");
    let resource_end = source.rfind(") {").unwrap() as u32;
    assert_eq!(r.declaration_position, source.find("r = f").unwrap() as u32);
    assert!(r.visible_from > r.declaration_position);
    assert!(r.visible_from <= resource_end);
}

#[test]
fn test_modifiers_pass_through() {
    let source = r#"
class C {
    private static final int K = 1;
    protected volatile int v;
    void m(final int p) {
        final int local = p;
        try (R r = open()) { }
    }
}
"#;
    let (_, _, bound) = bind(source);
    assert_eq!(
        symbol_named(&bound, "K").modifiers(),
        ModifierFlags::PRIVATE | ModifierFlags::STATIC | ModifierFlags::FINAL
    );
    assert_eq!(
        symbol_named(&bound, "v").modifiers(),
        ModifierFlags::PROTECTED | ModifierFlags::VOLATILE
    );
    assert_eq!(symbol_named(&bound, "p").modifiers(), ModifierFlags::FINAL);
    assert_eq!(symbol_named(&bound, "local").modifiers(), ModifierFlags::FINAL);
    assert_eq!(
        symbol_named(&bound, "r").modifiers(),
        ModifierFlags::FINAL,
        "resources are implicitly final"
    );
}

#[test]
fn test_symbol_of_declaration_accepts_declarator_and_name() {
    let source = "class C { int a = 1, b; void m(int p) { } }";
    let (arena, root, bound) = bind(source);
    let declarators: Vec<NodeIndex> = arena
        .descendants(root)
        .into_iter()
        .filter(|&idx| arena.kind(idx) == Some(NodeKind::VariableDeclarator))
        .collect();
    assert_eq!(declarators.len(), 2);

    for declarator in declarators {
        let by_node = bound.symbol_of_declaration(declarator).unwrap();
        let name = arena
            .get_variable_declarator(arena.get(declarator).unwrap())
            .unwrap()
            .name;
        assert_eq!(bound.symbol_of_declaration(name), Some(by_node));
        assert_eq!(bound.symbol(by_node).unwrap().declaration, name);
    }

    let parameter = arena
        .descendants(root)
        .into_iter()
        .find(|&idx| arena.kind(idx) == Some(NodeKind::Parameter))
        .unwrap();
    let id = bound.symbol_of_declaration(parameter).unwrap();
    assert_eq!(bound.symbol(id).unwrap().kind, SymbolKind::FormalParameter);

    let class = arena
        .descendants(root)
        .into_iter()
        .find(|&idx| arena.kind(idx) == Some(NodeKind::ClassDeclaration))
        .unwrap();
    assert_eq!(bound.symbol_of_declaration(class), None);
}

#[test]
fn test_compact_parameters_do_not_replace_component_declarations() {
    let (arena, root, bound) = bind("record R(int x) { R { } }");
    let component = arena
        .descendants(root)
        .into_iter()
        .find(|&idx| arena.kind(idx) == Some(NodeKind::RecordComponent))
        .unwrap();
    let id = bound.symbol_of_declaration(component).unwrap();
    assert_eq!(bound.symbol(id).unwrap().kind, SymbolKind::RecordComponentField);
    assert_eq!(bound.symbols().len(), 2);
}
