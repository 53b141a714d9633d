// Integration tests for parsing well-formed Enforce Script

use enscript::parser::ast::*;
use enscript::parser::{parse, ParseOutput, ParserConfig};

const PLAYER_MOD: &str = r#"
// Player helper
#ifdef SERVER
class ServerOnly {}
#endif

modded class PlayerBase extends ManBase
{
    protected ref array<string> m_Names;
    static const int MAX = 10;

    void PlayerBase()
    {
        m_Names = new array<string>();
    }

    override void OnConnect(int id, out string name = "")
    {
        foreach (int i, string n : m_Names)
        {
            if (n == name)
                return;
            else
                continue;
        }

        switch (id)
        {
            case 0:
                Print("zero");
                break;
            default:
                break;
        }

        for (int j = 0; j < MAX; j++) { Print(j); }
        while (false) {}
    }
}
"#;

fn parse_clean(source: &str, config: &ParserConfig) -> ParseOutput {
    let output = parse("file:///test.c", source, 1, config);
    assert!(output.diagnostics.is_empty(), "Unexpected diagnostics: {:?}", output.diagnostics);
    output
}

fn names(declarations: &[Declaration]) -> Vec<&str> {
    declarations.iter().map(|d| d.name()).collect()
}

#[test]
fn test_mod_file() {
    let output = parse_clean(PLAYER_MOD, &ParserConfig::default());
    assert_eq!(names(&output.file.body), ["PlayerBase"]);

    let class = output.file.body[0].as_class().expect("class");
    assert_eq!(class.modifiers, ["modded"]);
    assert_eq!(names(&class.members), ["m_Names", "MAX", "PlayerBase", "OnConnect"]);

    let kinds: Vec<&str> = class.members.iter().map(|d| d.kind_name()).collect();
    assert_eq!(kinds, ["variable", "variable", "constructor", "method"]);
    assert_eq!(class.members[0].modifiers(), ["protected", "ref"]);
}

#[test]
fn test_method_body_statements() {
    let output = parse_clean(PLAYER_MOD, &ParserConfig::default());
    let class = output.file.body[0].as_class().expect("class");
    let Declaration::Method(method) = &class.members[3] else {
        panic!("Expected method");
    };

    let body = method.function.body.as_ref().expect("body");
    assert_eq!(body.statements.len(), 4);
    assert!(matches!(&body.statements[0], Statement::ForEach { variables, .. } if variables.len() == 2));
    assert!(matches!(&body.statements[1], Statement::Switch { cases, .. } if cases.len() == 2));
    assert!(matches!(&body.statements[2], Statement::For { .. }));
    assert!(matches!(&body.statements[3], Statement::While { .. }));
}

#[test]
fn test_defined_symbol_enables_block() {
    let config = ParserConfig::default().with_definitions(["SERVER"]);
    let output = parse_clean(PLAYER_MOD, &config);
    assert_eq!(names(&output.file.body), ["ServerOnly", "PlayerBase"]);
}

#[test]
fn test_declarations_in_source_order_with_exact_idents() {
    let source = "class Alpha {}\nenum Beta { X }\ntypedef int Gamma;\nvoid Delta();\nint Epsilon;\n";
    let output = parse_clean(source, &ParserConfig::default());

    assert_eq!(names(&output.file.body), ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]);
    for decl in &output.file.body {
        let ident = decl.ident();
        assert_eq!(&source[ident.start..ident.end], ident.name);
    }
}

#[test]
fn test_nested_conditionals() {
    let source = "#ifdef A\n#ifndef B\nint x;\n#endif\n#endif\n";

    let output = parse_clean(source, &ParserConfig::default().with_definitions(["A"]));
    assert_eq!(names(&output.file.body), ["x"]);

    let output = parse_clean(source, &ParserConfig::default().with_definitions(["A", "B"]));
    assert!(output.file.body.is_empty());

    let output = parse_clean(source, &ParserConfig::default());
    assert!(output.file.body.is_empty());
}

#[test]
fn test_offsets_are_chars() {
    let source = "// héllo wörld\nint x;";
    let output = parse_clean(source, &ParserConfig::default());
    let ident = output.file.body[0].ident();
    assert_eq!(ident.start, source.chars().position(|c| c == 'x').expect("x"));
    assert_eq!(output.file.end, source.chars().count());
}

#[test]
fn test_library_preset_skips_bodies() {
    let output = parse_clean(PLAYER_MOD, &ParserConfig::library());
    let class = output.file.body[0].as_class().expect("class");
    let Declaration::Method(method) = &class.members[3] else {
        panic!("Expected method");
    };
    assert!(method.function.body.as_ref().is_some_and(|b| b.statements.is_empty()));
}

#[test]
fn test_parse_is_deterministic() {
    let first = parse("file:///test.c", PLAYER_MOD, 3, &ParserConfig::default());
    let second = parse("file:///test.c", PLAYER_MOD, 3, &ParserConfig::default());
    assert_eq!(format!("{:?}", first), format!("{:?}", second));
}
