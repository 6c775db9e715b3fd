//! Highlight example
//!
//! Tokenizes a file line by line and prints each token with its kind.
//!
//! ```text
//! cargo run -p typeset-languages --example highlight -- page.html
//! ```

use std::path::Path;
use typeset_core::{Token, TokenKind};

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: highlight <file>");
        std::process::exit(2);
    };

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{path}: {err}");
            std::process::exit(1);
        }
    };

    let language = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("plaintext");
    let registry = typeset_languages::builtin_registry();
    let tokenizer = registry.resolve(language);
    println!("=== {path} ({}) ===\n", tokenizer.language_id());

    let mut state = tokenizer.initial_state();
    for (index, line) in source.split('\n').enumerate() {
        let out = tokenizer.tokenize(line, &state);
        println!("{:>4} {}", index + 1, render(&out.tokens));
        state = out.outbound;
    }
}

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|token| token.kind != TokenKind::Whitespace)
        .map(|token| format!("{}:{:?}", token.kind, token.text))
        .collect::<Vec<_>>()
        .join(" ")
}
