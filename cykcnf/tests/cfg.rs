mod common;

use cykcnf::cfg::cfg::{SymbolIndex, CFG};
use cykcnf::cfg::fresh::FreshNames;
use cykcnf::cfg::production::{Production, Symbol};
use cykcnf::cfg::terminal::Terminal;
use cykcnf::cfg::variable::Variable;
use cykcnf::config::NormalFormConfig;
use cykcnf::error::{Error, InvalidGrammar};
use cykcnf::input_symbol::tokenize;
use cykcnf::language::Language;
use cykcnf::{normalize, recognize};

use common::{alphabet, init_logging, language, start_on_rhs, words};

const SAMPLE_GRAMMARS: [(&str, &str, usize); 7] = [
    ("S", "S -> a S b | $", 6),
    ("S", "S -> A S A | a B\nA -> B | S\nB -> b | $", 5),
    ("S", "S -> A B c | d\nA -> C\nC -> $ | a\nB -> b | $", 5),
    ("S", "S -> A | a\nA -> B | b\nB -> A | S | c", 4),
    ("S", "S -> ( S ) S | $", 6),
    ("E", "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | x", 5),
    (
        "S",
        "S -> A B C D\nA -> a | $\nB -> b | $\nC -> c | $\nD -> d | $",
        5,
    ),
];

fn sample(index: usize) -> CFG {
    let (start, text, _) = SAMPLE_GRAMMARS[index];
    CFG::from_text(text, Variable::new(start)).unwrap()
}

fn assert_normal_form(cfg: &CFG) {
    assert!(cfg.is_normal_form(), "not in CNF:\n{}", cfg);
    assert!(!start_on_rhs(cfg), "start symbol on a right-hand side:\n{}", cfg);
    for body in cfg.productions.iter().flatten() {
        match body.as_slice() {
            [SymbolIndex::TerminalIndex(_)] => {}
            [SymbolIndex::VariableIndex(_), SymbolIndex::VariableIndex(_)] => {}
            _ => panic!("unexpected body {:?}", body),
        }
    }
    // only the start symbol may be non-generating, and only when the language is empty
    let generating = cfg.get_generating_symbols();
    let reachable = cfg.get_reachable_symbols();
    for (v, variable) in cfg.variables.iter().enumerate() {
        assert!(
            generating[v] || v == cfg.start_symbol,
            "{} is not generating:\n{}",
            variable,
            cfg
        );
        assert!(reachable[v], "{} is unreachable:\n{}", variable, cfg);
    }
}

fn variable_names(cfg: &CFG) -> Vec<&str> {
    cfg.variables.iter().map(|v| v.get_name()).collect()
}

#[test]
fn test_cfg_to_text() {
    let cfg = CFG::from_text("S -> a S | B A b | $\nA -> a\nB -> b", Variable::new("S")).unwrap();
    let expected_output = "Start Symbol: S\n\
S -> a S | B A b | ε\n\
B -> b\n\
A -> a\n\
Terminals: a b";
    assert_eq!(cfg.to_text(), expected_output);
    assert_eq!(cfg.to_string(), expected_output);
}

#[test]
fn test_from_text() {
    let text = r#"
        S -> A | B
        A -> Bobo r
        B -> a
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    assert_eq!(cfg.productions.len(), 4); // Bobo is a variable without productions
    assert_eq!(cfg.get_productions().len(), 4);
    assert_eq!(cfg.terminals.len(), 2);
    assert!(cfg.get_productions_of(&Variable::new("Bobo")).is_empty());
}

#[test]
fn test_from_text_quoted_and_continued() {
    let text = r#"
        "VAR:s" -> "TER:A" b
            | "VAR:t"
        t -> c
        "#;

    let cfg = CFG::from_text(text, Variable::new("s")).unwrap();
    assert_eq!(variable_names(&cfg), vec!["s", "t"]);
    assert_eq!(
        cfg.get_productions_of(&Variable::new("s")),
        vec![
            Production::new(
                Variable::new("s"),
                vec![Symbol::T(Terminal::new("A")), Symbol::T(Terminal::new("b"))]
            ),
            Production::new(Variable::new("s"), vec![Symbol::V(Variable::new("t"))]),
        ]
    );
    // "t -> c" has a lowercase head, which is fine for heads
    assert_eq!(cfg.get_productions_of(&Variable::new("t")).len(), 1);
}

#[test]
fn test_from_text_malformed() {
    let result = CFG::from_text("S -> a\nthis is not a rule", Variable::new("S"));
    assert_eq!(
        result.unwrap_err(),
        Error::InvalidGrammar(InvalidGrammar::MalformedRule("this is not a rule".to_string()))
    );
    assert!(CFG::from_text("| a", Variable::new("S")).is_err());
    assert!(CFG::from_text("S T -> a", Variable::new("S")).is_err());
}

#[test]
fn test_duplicates_removed() {
    let cfg = CFG::from_text("S -> a | a | b\nS -> a", Variable::new("S")).unwrap();
    assert_eq!(cfg.num_productions(), 2);
}

#[test]
fn test_undeclared_start() {
    let result = CFG::from_text("S -> a", Variable::new("T"));
    assert_eq!(
        result.unwrap_err(),
        Error::InvalidGrammar(InvalidGrammar::UndeclaredStart(Variable::new("T")))
    );
}

#[test]
fn test_overlapping_alphabets() {
    let result = CFG::new(
        Variable::new("S"),
        vec![Variable::new("S"), Variable::new("a")],
        vec![Terminal::new("a")],
        vec![],
    );
    assert_eq!(
        result.unwrap_err(),
        Error::InvalidGrammar(InvalidGrammar::OverlappingSymbol("a".to_string()))
    );
}

#[test]
fn test_undeclared_symbols() {
    let s = Variable::new("S");
    let result = CFG::new(
        s.clone(),
        vec![s.clone()],
        vec![Terminal::new("a")],
        vec![Production::new(
            s.clone(),
            vec![Symbol::T(Terminal::new("a")), Symbol::V(Variable::new("A"))],
        )],
    );
    assert_eq!(
        result.unwrap_err(),
        Error::InvalidGrammar(InvalidGrammar::UndeclaredSymbol {
            head: s.clone(),
            symbol: "A".to_string()
        })
    );

    let result = CFG::new(
        s.clone(),
        vec![s.clone()],
        vec![],
        vec![Production::new(s.clone(), vec![Symbol::T(Terminal::new("b"))])],
    );
    assert!(matches!(
        result,
        Err(Error::InvalidGrammar(InvalidGrammar::UndeclaredSymbol { .. }))
    ));

    let result = CFG::new(
        s.clone(),
        vec![s],
        vec![],
        vec![Production::new(Variable::new("B"), vec![])],
    );
    assert_eq!(
        result.unwrap_err(),
        Error::InvalidGrammar(InvalidGrammar::UndeclaredHead(Variable::new("B")))
    );
}

#[test]
fn test_normalize_rejects_tampered_grammar() {
    let mut cfg = CFG::from_text("S -> A b\nA -> a", Variable::new("S")).unwrap();
    cfg.productions[0].push(vec![SymbolIndex::VariableIndex(7)]);
    assert!(matches!(
        normalize(&cfg),
        Err(Error::InvalidGrammar(InvalidGrammar::UndeclaredSymbol { .. }))
    ));

    let mut cfg = CFG::from_text("S -> A b\nA -> a", Variable::new("S")).unwrap();
    cfg.start_symbol = 5;
    assert!(matches!(
        normalize(&cfg),
        Err(Error::InvalidGrammar(InvalidGrammar::Inconsistent(_)))
    ));

    let mut cfg = CFG::from_text("S -> A b\nA -> a", Variable::new("S")).unwrap();
    cfg.terminals.push(Terminal::new("A"));
    assert_eq!(
        normalize(&cfg).unwrap_err(),
        Error::InvalidGrammar(InvalidGrammar::OverlappingSymbol("A".to_string()))
    );
}

#[test]
fn test_epsilon() {
    let cfg = CFG::from_text("S -> epsilon", Variable::new("S")).unwrap();
    assert!(!cfg.is_empty());
    assert_eq!(cfg.terminals.len(), 0); // No terminals present for epsilon
    assert!(cfg.generates_epsilon());
}

#[test]
fn test_epsilon2() {
    let text = r#"
        S -> A B | a
        A -> $
        B -> b
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    assert!(!cfg.is_empty());
    assert!(!cfg.generates_epsilon());
}

#[test]
fn test_epsilon3() {
    let text = r#"
        S -> B | a A | a
        A -> $
        B -> b | A
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    assert!(!cfg.is_empty());
    assert!(cfg.generates_epsilon());
}

#[test]
fn test_nullable_self_reference() {
    let text = r#"
        S -> A b | B
        A -> A B
        B -> $ | b
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    let nullable = cfg.get_nullable_symbols();
    // A only derives itself followed by nullable symbols, that does not make it nullable
    assert_eq!(nullable, vec![true, false, true]);
    let generating = cfg.get_generating_symbols();
    assert_eq!(generating, vec![true, false, true]);
}

#[test]
fn test_to_cnf_simple() {
    // is already in CNF
    let text = r#"
        S -> A B | a
        A -> a
        B -> b
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    assert!(cfg.is_normal_form());
    let cnf_cfg = cfg.to_normal_form().unwrap();
    assert_normal_form(&cnf_cfg);
    assert_eq!(variable_names(&cnf_cfg), vec!["A", "B", "S0"]);
    assert_eq!(cnf_cfg.get_start_symbol(), &Variable::new("S0"));
    assert_eq!(cnf_cfg.terminals.len(), 2);
}

#[test]
fn test_to_cnf_with_terminals_in_long_bodies() {
    let cfg = CFG::from_text("S -> a S b | a b", Variable::new("S")).unwrap();
    let cnf_cfg = normalize(&cfg).unwrap();
    assert_normal_form(&cnf_cfg);
    assert_eq!(variable_names(&cnf_cfg), vec!["S", "S0", "X_a", "X_b", "B0"]);
    println!("CNF CFG: {}", cnf_cfg.to_text());
    assert_eq!(
        cnf_cfg.get_productions_of(&Variable::new("B0")),
        vec![Production::new(
            Variable::new("B0"),
            vec![Symbol::V(Variable::new("S")), Symbol::V(Variable::new("X_b"))]
        )]
    );
    assert!(recognize(&cnf_cfg, &tokenize("a a b b")).unwrap());
    assert!(!recognize(&cnf_cfg, &tokenize("a b b")).unwrap());
}

#[test]
fn test_to_cnf_custom_names() {
    let cfg = CFG::from_text("S -> a S b | a b", Variable::new("S")).unwrap();
    let config = NormalFormConfig {
        start_symbol: "Start".to_string(),
        terminal_prefix: "T".to_string(),
        binary_prefix: "Bin".to_string(),
    };
    let cnf_cfg = cfg.to_normal_form_with(&config).unwrap();
    assert_eq!(variable_names(&cnf_cfg), vec!["S", "Start", "Ta", "Tb", "Bin0"]);
}

#[test]
fn test_fresh_start_does_not_collide() {
    let cfg = CFG::from_text("S0 -> a S0 | a", Variable::new("S0")).unwrap();
    let cnf_cfg = normalize(&cfg).unwrap();
    assert_eq!(cnf_cfg.get_start_symbol().get_name(), "S0_1");
    assert_normal_form(&cnf_cfg);

    // names are never carried over from one run to the next
    let mut names = FreshNames::for_grammar(&cfg);
    assert_eq!(names.fresh("S0").get_name(), "S0_1");
    assert_eq!(
        normalize(&cfg).unwrap().get_start_symbol().get_name(),
        "S0_1"
    );
}

#[test]
fn test_to_cnf_shared_suffixes() {
    let text = r#"
        S -> A B C D | B B C D
        A -> a
        B -> b
        C -> c
        D -> d
        "#;
    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    let cnf_cfg = normalize(&cfg).unwrap();
    assert_normal_form(&cnf_cfg);
    // B C D and C D are decomposed once
    let helpers = variable_names(&cnf_cfg)
        .into_iter()
        .filter(|n| n.starts_with('B') && n.len() > 1)
        .count();
    assert_eq!(helpers, 2);
    assert!(cnf_cfg.accepts_string("a b c d"));
    assert!(cnf_cfg.accepts_string("b b c d"));
    assert!(!cnf_cfg.accepts_string("a b c"));
}

#[test]
fn test_to_cnf_removal_of_useless_symbols() {
    let text = r#"
        S -> A B | C
        A -> a
        B -> b
        C -> D
        D -> E
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    let cnf_cfg = cfg.to_normal_form().unwrap();
    println!("CNF CFG: {}", cnf_cfg.to_text());

    // S0 -> A B, A -> a, B -> b
    assert_eq!(cnf_cfg.productions.len(), 3);
    assert_eq!(variable_names(&cnf_cfg), vec!["A", "B", "S0"]);
    // the terminal alphabet is untouched
    assert_eq!(cnf_cfg.terminals, cfg.terminals);
}

#[test]
fn test_unit_cycle_terminates() {
    let text = r#"
        S -> A | a
        A -> B | b
        B -> A | S | c
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    let closures = cfg.get_unit_closures();
    assert_eq!(closures[0], vec![0, 1, 2]);
    assert_eq!(closures[2], vec![2, 1, 0]);

    let cnf_cfg = normalize(&cfg).unwrap();
    assert_normal_form(&cnf_cfg);
    for word in ["a", "b", "c"] {
        assert!(cnf_cfg.accepts_string(word), "should accept {}", word);
    }
    assert!(!cnf_cfg.accepts_string("a b"));
}

#[test]
fn test_pathological_grammar_without_generating_symbols() {
    let cfg = CFG::from_text("S -> A\nA -> a A", Variable::new("S")).unwrap();
    assert!(cfg.is_empty());
    let cnf_cfg = normalize(&cfg).unwrap();
    assert_eq!(cnf_cfg.variables.len(), 1);
    assert!(cnf_cfg.productions[cnf_cfg.start_symbol].is_empty());
    assert!(cnf_cfg.is_empty());
    assert!(!recognize(&cnf_cfg, &tokenize("a")).unwrap());
    assert!(!recognize(&cnf_cfg, &tokenize("a a")).unwrap());
}

#[test]
fn test_accepts_empty_survives_normalization() {
    let cfg = CFG::from_text("S -> A B\nA -> a | $\nB -> $", Variable::new("S")).unwrap();
    assert!(cfg.generates_epsilon());
    let cnf_cfg = normalize(&cfg).unwrap();
    assert!(cnf_cfg.accepts_empty);
    assert!(cnf_cfg.generates_epsilon());
    assert!(recognize(&cnf_cfg, &[]).unwrap());
    assert!(recognize(&cnf_cfg, &tokenize("a")).unwrap());

    let cfg = CFG::from_text("S -> A B\nA -> a | $\nB -> b", Variable::new("S")).unwrap();
    let cnf_cfg = normalize(&cfg).unwrap();
    assert!(!cnf_cfg.accepts_empty);
    assert!(!recognize(&cnf_cfg, &[]).unwrap());
}

/// Scenario: an epsilon production reachable from the start through a nullable chain
#[test]
fn test_epsilon_chain_preserves_language() {
    init_logging();
    let text = r#"
        S -> A B c | d
        A -> C
        C -> $ | a
        B -> b | $
        "#;
    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    let cnf_cfg = normalize(&cfg).unwrap();
    assert_normal_form(&cnf_cfg);

    for word in ["c", "a c", "b c", "a b c", "d"] {
        assert!(cnf_cfg.accepts_string(word), "should accept {}", word);
    }
    for word in ["a", "b", "a b", "c c", "d c", "a a c"] {
        assert!(!cnf_cfg.accepts_string(word), "should reject {}", word);
    }
}

#[test]
fn test_accept() {
    let text = r#"
        S -> A B | C | A B A S
        A -> a
        B -> b
        B -> $
        C -> c
        "#;

    let cfg = CFG::from_text(text, Variable::new("S")).unwrap();
    // the raw grammar is normalized on the fly
    assert!(cfg.accepts_string("a b"));
    let cfg = cfg.to_normal_form().unwrap();
    assert!(!cfg.is_empty());
    println!("CFG: {}", cfg.to_text());

    for word in ["a b", "a", "c", "a a c", "a b a a b", "a a a b", "a b a c"] {
        assert!(
            cfg.accepts_string(word),
            "CFG should accept the word '{}', but it does not.",
            word
        );
    }
    for word in ["e", "a b c", "a b a c a", "b b", "a a", "a a b", ""] {
        assert!(
            !cfg.accepts_string(word),
            "CFG should not accept the word '{}', but it does.",
            word
        );
    }
}

#[test]
fn test_language_preserved() {
    init_logging();
    for (index, (_, text, max_len)) in SAMPLE_GRAMMARS.iter().enumerate() {
        let cfg = sample(index);
        let cnf_cfg = normalize(&cfg).unwrap();
        assert_normal_form(&cnf_cfg);

        let expected = language(&cfg, *max_len);
        assert_eq!(cnf_cfg.accepts_empty, expected.contains(&Vec::<String>::new()));
        for word in words(&alphabet(&cfg), *max_len) {
            let sentence = tokenize(&word.join(" "));
            assert_eq!(
                recognize(&cnf_cfg, &sentence).unwrap(),
                expected.contains(&word),
                "grammar\n{}\ndisagrees on {:?}",
                text,
                word
            );
        }
    }
}

#[test]
fn test_normalize_idempotent() {
    for index in 0..SAMPLE_GRAMMARS.len() {
        let once = normalize(&sample(index)).unwrap();
        let twice = normalize(&once).unwrap();
        assert_normal_form(&twice);
        assert_eq!(once.variables.len(), twice.variables.len());
        assert_eq!(once.num_productions(), twice.num_productions());
        assert_eq!(once.accepts_empty, twice.accepts_empty);
        assert_eq!(twice.get_start_symbol().get_name(), "S0_1");
    }
}

#[test]
fn test_accepts_after_editing_normal_form() {
    let mut cfg = CFG::from_text("S -> A B\nA -> a\nB -> b", Variable::new("S")).unwrap();
    assert!(cfg.is_normal_form());
    assert!(!cfg.accepts_string("a"));

    // S -> A
    let a = cfg.get_variable_map()[&Variable::new("A")];
    cfg.productions[cfg.start_symbol].push(vec![SymbolIndex::VariableIndex(a)]);
    assert!(cfg.check_normal_form().is_err());
    assert!(cfg.accepts_string("a"));
    assert!(cfg.accepts_string("a b"));
    assert!(!cfg.accepts_string("b"));
}

#[test]
fn test_get_productions() {
    let cfg = CFG::from_text("S -> A b | $\nA -> a", Variable::new("S")).unwrap();
    let productions = cfg.get_productions();
    assert_eq!(productions.len(), 3);
    assert_eq!(productions[0].to_string(), "S -> A b");
    assert_eq!(productions[1].to_string(), "S -> ε");
    assert!(productions[1].is_epsilon());
    assert_eq!(productions[2].to_string(), "A -> a");
    assert!(!productions[2].is_unit());
}
