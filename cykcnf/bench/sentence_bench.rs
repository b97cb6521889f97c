use std::time::Instant;

use cykcnf::cfg::cfg::CFG;
use cykcnf::cfg::terminal::Terminal;
use cykcnf::cfg::variable::Variable;
use cykcnf::cyk::CykParser;
use cykcnf::language::Language;

const KITCHEN_GRAMMAR: &str = r#"
S -> NP VP

NP -> Det N | Det Adj N | NP PP
    | he | she

VP -> V | V NP | VP PP

PP -> P NP

V -> cooks | eats | cuts
P -> in | with
N -> cake | soup | knife | oven | spoon | table
Adj -> hot | sharp | big
Det -> a | the
"#;

fn sentences() -> Vec<Vec<Terminal>> {
    let mut sentences = vec![
        "he cooks".to_string(),
        "she eats the hot soup with a spoon".to_string(),
        "he cuts the cake with a sharp knife in the big oven".to_string(),
    ];
    for k in 1..=6 {
        let mut sentence = "she cooks the soup".to_string();
        for _ in 0..k {
            sentence.push_str(" with a spoon in the oven");
        }
        sentences.push(sentence);
    }
    sentences
        .iter()
        .map(|s| s.split_whitespace().map(Terminal::new).collect())
        .collect()
}

fn main() {
    let cfg = CFG::from_text(KITCHEN_GRAMMAR, Variable::new("S")).unwrap();
    println!("CFG size (productions): {}", cfg.num_productions());
    assert!(!cfg.is_empty());

    let start = Instant::now();
    let cfg = cfg.to_normal_form().unwrap();
    println!(
        "CFG in normal form size (productions): {} in {:?}",
        cfg.num_productions(),
        start.elapsed()
    );
    //println!("{}", cfg.to_text());

    let parser = CykParser::new(&cfg).unwrap();
    for sentence in sentences() {
        let start = Instant::now();
        for _ in 0..40 {
            assert!(parser.recognize(&sentence));
        }
        let recognize_time = start.elapsed() / 40;

        let start = Instant::now();
        let forest = parser.parse(&sentence).unwrap();
        let trees = forest.count_trees();
        println!(
            "{:>3} tokens: recognize {:?}, parse {:?}, {} trees",
            sentence.len(),
            recognize_time,
            start.elapsed(),
            trees
        );
        assert!(cfg.accepts(&sentence));
    }
    println!("All sentences accepted!");
}
