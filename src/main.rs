use lisplet::builtins::standard_builtins;
use lisplet::evaluator::interpret;
use lisplet::lexer::tokenize;

fn main() {
    let input = "(begin (define square (lambda (x) (* x x))) (square 12))";
    println!("Input:\n{}", input);

    match tokenize(input) {
        Ok(tokens) => {
            println!("Tokens:");
            for token in tokens {
                println!("  {:?}", token);
            }
        }
        Err(e) => {
            eprintln!("Lexer Error: {}", e);
        }
    }

    match interpret(&standard_builtins(), input) {
        Ok(value) => println!("Result: {}", value),
        Err(message) => eprintln!("Error: {}", message),
    }
}
