//! Variable scoping scenarios: shadowing, try statements, switch fallthrough
//! and record constructors.

use jscope_binder::{BinderOptions, BoundUnit, Resolution, Symbol, SymbolId, SymbolKind, bind_source};
use jscope_parser::{ModifierFlags, NodeArena, NodeIndex, NodeKind};

struct Fixture {
    arena: NodeArena,
    root: NodeIndex,
    bound: BoundUnit,
}

impl Fixture {
    fn new(source: &str) -> Self {
        let (arena, root, bound, diagnostics) =
            bind_source("Test.java", source, BinderOptions::default()).expect("binds");
        assert!(diagnostics.is_empty(), "parse diagnostics: {diagnostics:?}");
        assert!(
            bound.diagnostics().is_empty(),
            "binder diagnostics: {:?}",
            bound.diagnostics()
        );
        Fixture { arena, root, bound }
    }

    fn nodes(&self, kind: NodeKind) -> Vec<NodeIndex> {
        self.arena
            .descendants(self.root)
            .into_iter()
            .filter(|&idx| self.arena.kind(idx) == Some(kind))
            .collect()
    }

    /// Symbols of every declared variable-like name, in source order.
    fn declared(&self) -> Vec<SymbolId> {
        self.nodes(NodeKind::Identifier)
            .into_iter()
            .filter_map(|idx| self.bound.symbol_of_declaration(idx))
            .collect()
    }

    /// Resolutions of every use of `name`, in source order.
    fn uses(&self, name: &str) -> Vec<Resolution> {
        self.arena
            .name_uses(self.root)
            .into_iter()
            .filter(|&idx| self.arena.get_identifier_name(idx) == Some(name))
            .filter_map(|idx| self.bound.resolve_name_use(&self.arena, idx))
            .collect()
    }

    /// Resolve `name` as if it were used at the start of `node`.
    fn resolve_at(&self, node: NodeIndex, name: &str) -> Resolution {
        let scope = self.bound.scope_of(node).expect("node is bound");
        let pos = self.arena.get(node).expect("node exists").pos;
        self.bound.resolve(scope, name, pos)
    }

    fn symbol(&self, id: SymbolId) -> &Symbol {
        self.bound.symbol(id).expect("symbol exists")
    }

    fn symbol_of(&self, resolution: Resolution) -> &Symbol {
        let id = resolution.symbol().expect("name resolves");
        self.symbol(id)
    }
}

// =============================================================================
// Shadowing of variables
// =============================================================================

const SHADOWING: &str = r#"
class Outer extends Sup {
    private T f;

    {
        f.foo(); // outer field
        T f;

        for (T f : f.foo()) { // local in initializer
           f.foo(); // foreach parameter
        }
    }

    void method(T f) {
        f.foo(); // method parameter

        {
            T f;
            f.foo(); // local in block
        }
    }

    class Inner {
        T f;

        {
            f.foo(); // inner field
        }
    }
}
"#;

#[test]
fn test_shadowing_resolves_each_use_to_nearest_declaration() {
    let fx = Fixture::new(SHADOWING);
    let declared = fx.declared();
    assert_eq!(declared.len(), 6, "six declarations of f");
    let [outer_field, local_in_init, foreach_param, method_param, local_in_block, inner_field] =
        declared[..]
    else {
        unreachable!()
    };

    let uses = fx.uses("f");
    assert_eq!(
        uses,
        vec![
            Resolution::Resolved(outer_field),
            Resolution::Resolved(local_in_init),
            Resolution::Resolved(foreach_param),
            Resolution::Resolved(method_param),
            Resolution::Resolved(local_in_block),
            Resolution::Resolved(inner_field),
        ]
    );
}

#[test]
fn test_shadowing_symbol_kinds_and_modifiers() {
    let fx = Fixture::new(SHADOWING);
    let uses = fx.uses("f");

    let outer = fx.symbol_of(uses[0]);
    assert_eq!(outer.kind, SymbolKind::Field);
    assert_eq!(outer.modifiers(), ModifierFlags::PRIVATE);

    assert_eq!(fx.symbol_of(uses[1]).kind, SymbolKind::LocalVariable);
    assert_eq!(
        fx.symbol_of(uses[2]).kind,
        SymbolKind::LocalVariable,
        "for-each variables are locals"
    );
    assert_eq!(fx.symbol_of(uses[3]).kind, SymbolKind::FormalParameter);
    assert_eq!(fx.symbol_of(uses[4]).kind, SymbolKind::LocalVariable);

    let inner = fx.symbol_of(uses[5]);
    assert_eq!(inner.kind, SymbolKind::Field);
    assert!(inner.modifiers().is_empty());
}

// =============================================================================
// Try statement
// =============================================================================

const TRY_STATEMENT: &str = r#"
class Outer extends Sup {
    private Reader r; // outer field

    {
        try {

        } catch (Exception e) {
          e.printStackTrace();
        }

        try (Reader r = new StringReader("k")) {
          r.read();
        } catch (Exception e) {
          r.close();
        } finally {
          r.close();
        }

        try (Reader r = new StringReader("k");
             BufferedReader br = r.buffered()) {

        }

        try (Reader f = r;
             BufferedReader r = f.buffered()) {
        }
    }
}
"#;

#[test]
fn test_try_statement_scoping() {
    let fx = Fixture::new(TRY_STATEMENT);
    let declared = fx.declared();
    assert_eq!(declared.len(), 8);
    let [outer_field, exception1, reader1, _exception2, reader2, _buffered, reader3, br2] =
        declared[..]
    else {
        unreachable!()
    };

    assert_eq!(fx.uses("e"), vec![Resolution::Resolved(exception1)]);

    let r_uses = fx.uses("r");
    assert_eq!(
        r_uses,
        vec![
            Resolution::Resolved(reader1),     // inside the try body
            Resolution::Resolved(outer_field), // inside catch
            Resolution::Resolved(outer_field), // inside finally
            Resolution::Resolved(reader2),     // initializer of a later resource
            Resolution::Resolved(outer_field), // before the resource named r
        ]
    );
    assert_eq!(fx.uses("f"), vec![Resolution::Resolved(reader3)]);

    let symbol = fx.symbol(reader1);
    assert_eq!(symbol.kind, SymbolKind::ResourceVariable);
    assert!(symbol.modifiers().contains(ModifierFlags::FINAL));
    assert_eq!(fx.symbol(exception1).kind, SymbolKind::ExceptionParameter);
    assert_eq!(fx.symbol(br2).kind, SymbolKind::ResourceVariable);
}

#[test]
fn test_resources_are_in_scope_for_an_empty_try_body() {
    let fx = Fixture::new(TRY_STATEMENT);
    let declared = fx.declared();
    let (reader3, br2) = (declared[6], declared[7]);

    let last_try = *fx.nodes(NodeKind::TryStatement).last().unwrap();
    let body = fx.arena.get_try(fx.arena.get(last_try).unwrap()).unwrap().try_block;
    let block = fx.arena.get(body).unwrap();
    assert!(fx.arena.get_block(block).unwrap().statements.is_empty());

    let scope = fx.bound.construct_scope(body).expect("the try body opens a block");
    assert_eq!(fx.bound.resolve(scope, "f", block.pos), Resolution::Resolved(reader3));
    assert_eq!(fx.bound.resolve(scope, "r", block.pos), Resolution::Resolved(br2));
}

#[test]
fn test_resource_symbols_are_owned_by_their_resource_list() {
    let fx = Fixture::new(TRY_STATEMENT);
    let reader1 = fx.declared()[2];
    let owner = fx.symbol(reader1).owner;
    assert_eq!(fx.arena.kind(owner), Some(NodeKind::ResourceList));
    assert_eq!(
        fx.arena.kind(fx.arena.parent(owner)),
        Some(NodeKind::TryStatement)
    );
}

// =============================================================================
// Switch statement
// =============================================================================

const SWITCH_STATEMENT: &str = r#"
class Outer extends Sup {
    private int j; // outer field

    {
        switch (j) {
        case 4:
            int i = j;
            int j = i;
            return j + 1;
        case 3:
            int k = 0, l = k + l;
            return i + 1;
        }
    }
}
"#;

#[test]
fn test_switch_statement_scoping() {
    let fx = Fixture::new(SWITCH_STATEMENT);
    let declared = fx.declared();
    assert_eq!(declared.len(), 5);
    let [outer_field, ivar, jvar, kvar, lvar] = declared[..] else {
        unreachable!()
    };

    assert_eq!(
        fx.uses("j"),
        vec![
            Resolution::Resolved(outer_field), // selector never sees case locals
            Resolution::Resolved(outer_field), // before the local j is declared
            Resolution::Resolved(jvar),        // after it
        ]
    );
    assert_eq!(
        fx.uses("i"),
        vec![
            Resolution::Resolved(ivar),
            Resolution::Resolved(ivar), // reached by fallthrough
        ]
    );
    assert_eq!(fx.uses("k"), vec![Resolution::Resolved(kvar)]);
    assert_eq!(
        fx.uses("l"),
        vec![Resolution::Resolved(lvar)],
        "a variable is in scope in its own initializer"
    );
}

#[test]
fn test_switch_self_reference_is_flagged_but_resolved() {
    let fx = Fixture::new(SWITCH_STATEMENT);
    let flagged: Vec<&str> = fx
        .arena
        .name_uses(fx.root)
        .into_iter()
        .filter(|&idx| fx.bound.is_self_reference_in_initializer(&fx.arena, idx))
        .filter_map(|idx| fx.arena.get_identifier_name(idx))
        .collect();
    assert_eq!(flagged, vec!["l"]);
}

// =============================================================================
// Record constructors
// =============================================================================

const RECORD_CONSTRUCTORS: &str = r#"
record Cons(int x, int... rest) {
    Cons {
        assert true;
    }

    Cons(int x2, int y2) {
        assert false;
        this.x = x2;
        x2 = x;
        this.rest = new int[] { y2 };
    }
}
"#;

#[test]
fn test_compact_constructor_sees_components_as_parameters() {
    let fx = Fixture::new(RECORD_CONSTRUCTORS);
    let compact = fx.nodes(NodeKind::CompactConstructorDeclaration)[0];
    let inside_compact = fx.nodes(NodeKind::AssertStatement)[0];

    for name in ["x", "rest"] {
        let symbol = fx.symbol_of(fx.resolve_at(inside_compact, name));
        assert_eq!(symbol.kind, SymbolKind::RecordComponentParameter, "{name}");
        assert_eq!(symbol.owner, compact, "{name} is owned by the compact constructor");
    }
}

#[test]
fn test_explicit_constructor_sees_components_as_fields() {
    let fx = Fixture::new(RECORD_CONSTRUCTORS);
    let declared = fx.declared();
    assert_eq!(declared.len(), 4);
    let [x_comp, rest_comp, x2_formal, y2_formal] = declared[..] else {
        unreachable!()
    };
    let inside_regular = fx.nodes(NodeKind::AssertStatement)[1];

    for (name, component) in [("x", x_comp), ("rest", rest_comp)] {
        let resolution = fx.resolve_at(inside_regular, name);
        assert_eq!(resolution, Resolution::Resolved(component), "{name}");
        let symbol = fx.symbol(component);
        assert_eq!(symbol.kind, SymbolKind::RecordComponentField);
        assert_eq!(symbol.modifiers(), ModifierFlags::PRIVATE | ModifierFlags::FINAL);
    }

    assert_eq!(
        fx.uses("x2"),
        vec![Resolution::Resolved(x2_formal), Resolution::Resolved(x2_formal)]
    );
    assert_eq!(fx.uses("x"), vec![Resolution::Resolved(x_comp)]);
    assert_eq!(fx.uses("y2"), vec![Resolution::Resolved(y2_formal)]);
    assert_eq!(fx.symbol(x2_formal).kind, SymbolKind::FormalParameter);
}
