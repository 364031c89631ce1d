use std::io::Read;
use tap_parser::{Lexer, Parser};

fn main() {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source).unwrap();

    println!("=== Tokens ===");
    for chunk in Lexer::new(&source) {
        match chunk {
            Ok(chunk) => {
                for token in chunk {
                    println!("{:?}", token);
                }
            }
            Err(err) => {
                println!("{}", err);
                return;
            }
        }
    }

    println!("\n=== Nodes ===");
    match Parser::parse(&source) {
        Ok(nodes) => {
            for node in nodes {
                println!("{:?}", node);
            }
        }
        Err(err) => println!("{}", err),
    }
}
