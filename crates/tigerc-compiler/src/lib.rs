//! The Tiger front end: lexing, parsing, semantic analysis, and lowering
//! to [`tigerc_ir::Module`].

mod ast;
mod ctx;
mod diagnostics;
mod lexer;
mod library;
mod lower;
mod parser;
mod preprocess;
mod typeck;

pub use diagnostics::{CompileError, Diagnostic, Result, Severity};
pub use lower::compile;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_small_program_end_to_end() {
        let src = r#"
            let
                type  intlist = { hd: int, tl: intlist }
                function cons(h: int, t: intlist): intlist =
                    intlist { hd = h, tl = t }
                var list := cons(1, cons(2, nil))
            in
                print(chr(list.hd + 64))
            end
        "#;
        let module = compile(src).expect("well-typed program should compile");
        assert!(!module.functions.is_empty());
    }

    #[test]
    fn reports_the_first_semantic_error_with_a_position() {
        let err = compile("1 + \"oops\"").unwrap_err();
        assert!(err.to_string().contains("row:"));
    }

    #[test]
    fn reports_parse_errors_too() {
        let err = compile("let in").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
    }
}
