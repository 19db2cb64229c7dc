use super::tokenizer::TokenType as TT;
use super::{parse, tokenize_string, Block, LexError, Tokenizer, TokenizerState};

fn parse_string(input: &str) -> Result<Block, String> {
    let tokens = tokenize_string(input).map_err(|e| e.to_string())?;
    parse(&tokens).map_err(|e| e.to_string())
}

fn parse_tree_matches(input: &str, tree_repr: &str) {
    match parse_string(input) {
        Ok(tree) => {
            let result_repr = format!("{tree:?}");
            assert!(
                result_repr.contains(tree_repr),
                "\nFailed to parse \"{}\":\nexpected \"{}\" somewhere in \"{}\"\n",
                input,
                tree_repr,
                result_repr
            )
        }
        Err(e) => panic!("\nFailed to parse \"{input}\": {e}\n"),
    }
}

fn assert_raises_error(input: &str, msg: &str) {
    match parse_string(input) {
        Ok(tree) => panic!("\n\"{input}\" parsed without error: {tree:?}\n"),
        Err(e) => assert_eq!(msg, e.as_str()),
    }
}

fn token_types(input: &str) -> Vec<TT> {
    tokenize_string(input)
        .unwrap()
        .into_iter()
        .map(|t| t.typ)
        .collect()
}

#[test]
fn test_simple_tokens() {
    assert_eq!(
        token_types("let x = 1"),
        vec![TT::KEYWORD, TT::NAME, TT::EQUAL, TT::NUMBER, TT::NEWLINE, TT::ENDMARKER]
    );
    assert_eq!(
        token_types("a <= b != c && !d || e"),
        vec![
            TT::NAME,
            TT::LESSEQUAL,
            TT::NAME,
            TT::NOTEQUAL,
            TT::NAME,
            TT::DOUBLEAMPER,
            TT::EXCLAMATION,
            TT::NAME,
            TT::DOUBLEVBAR,
            TT::NAME,
            TT::NEWLINE,
            TT::ENDMARKER
        ]
    );
}

#[test]
fn test_keywords_need_word_boundary() {
    assert_eq!(
        token_types("letter"),
        vec![TT::NAME, TT::NEWLINE, TT::ENDMARKER]
    );
    assert_eq!(
        token_types("return_value"),
        vec![TT::NAME, TT::NEWLINE, TT::ENDMARKER]
    );
}

#[test]
fn test_string_lexeme_drops_quotes() {
    let tokens = tokenize_string("print('single') # trailing comment").unwrap();
    assert_eq!(tokens[2].typ, TT::STRING);
    assert_eq!(tokens[2].to_string(), "STRING('single')");
    assert_eq!(tokens.len(), 6);
}

#[test]
fn test_indentation_tokens() {
    assert_eq!(
        token_types("if (1):\n    print(1)\nprint(2)"),
        vec![
            TT::KEYWORD,
            TT::LPAR,
            TT::NUMBER,
            TT::RPAR,
            TT::COLON,
            TT::NEWLINE,
            TT::INDENT,
            TT::KEYWORD,
            TT::LPAR,
            TT::NUMBER,
            TT::RPAR,
            TT::NEWLINE,
            TT::DEDENT,
            TT::KEYWORD,
            TT::LPAR,
            TT::NUMBER,
            TT::RPAR,
            TT::NEWLINE,
            TT::ENDMARKER
        ]
    );
}

#[test]
fn test_open_blocks_closed_at_end_of_input() {
    let types = token_types("if (1):\n  if (2):\n    x");
    let n = types.len();
    assert_eq!(&types[n - 3..], &[TT::DEDENT, TT::DEDENT, TT::ENDMARKER]);
}

#[test]
fn test_blank_and_comment_lines_are_ignored() {
    assert_eq!(
        token_types("\n# comment\n   \nx\n      # indented comment\n"),
        vec![TT::NAME, TT::NEWLINE, TT::ENDMARKER]
    );
}

#[test]
fn test_tabs_count_as_four_spaces() {
    let types = token_types("if (1):\n\tx\n    y");
    assert_eq!(types.iter().filter(|t| **t == TT::INDENT).count(), 1);
    assert_eq!(types.iter().filter(|t| **t == TT::DEDENT).count(), 1);
}

#[test]
fn test_implicit_line_joining() {
    assert_eq!(
        token_types("print(1 +\n        2)"),
        vec![
            TT::KEYWORD,
            TT::LPAR,
            TT::NUMBER,
            TT::PLUS,
            TT::NUMBER,
            TT::RPAR,
            TT::NEWLINE,
            TT::ENDMARKER
        ]
    );
}

#[test]
fn test_lex_errors() {
    assert!(matches!(
        tokenize_string("if (1):\n    x\n  y"),
        Err(LexError::InconsistentIndentation { line: 3 })
    ));
    assert!(matches!(
        tokenize_string("a & b"),
        Err(LexError::UnexpectedCharacter { character: '&', .. })
    ));
    assert!(matches!(
        tokenize_string("x = @"),
        Err(LexError::UnexpectedCharacter { character: '@', .. })
    ));
    assert!(matches!(
        tokenize_string("print(\"open)"),
        Err(LexError::UnterminatedString { .. })
    ));
    assert!(matches!(
        tokenize_string("1."),
        Err(LexError::MalformedNumber { .. })
    ));
    assert!(matches!(
        tokenize_string("1.2.3"),
        Err(LexError::MalformedNumber { .. })
    ));
    assert!(matches!(
        tokenize_string("print(1))"),
        Err(LexError::UnmatchedClose { character: ')', .. })
    ));
    assert!(matches!(
        tokenize_string("}"),
        Err(LexError::UnmatchedClose { character: '}', .. })
    ));
    assert_eq!(
        tokenize_string("if (1):\n    x\n  y").unwrap_err().to_string(),
        "LexError: indentation of line 3 does not match any enclosing indentation level"
    );
}

#[test]
fn test_incremental_tokenizer() {
    let mut tokenizer = Tokenizer::new();
    assert_eq!(tokenizer.tokenize(["function f(a):"]), TokenizerState::ContinuationNeeded);
    assert_eq!(tokenizer.tokenize(["    return a"]), TokenizerState::ContinuationNeeded);
    assert_eq!(tokenizer.tokenize(["f(1"]), TokenizerState::ContinuationNeeded);
    assert_eq!(tokenizer.tokenize([")"]), TokenizerState::Ok);
    let tokens = tokenizer.finalize();
    assert_eq!(tokens.last().map(|t| t.typ), Some(TT::ENDMARKER));
    assert!(parse(&tokens).is_ok());

    let mut tokenizer = Tokenizer::new();
    assert!(matches!(
        tokenizer.tokenize([")"]),
        TokenizerState::Error(LexError::UnmatchedClose { .. })
    ));
    assert_eq!(tokenizer.tokenize(["print(1"]), TokenizerState::ContinuationNeeded);
    assert_eq!(tokenizer.tokenize([")"]), TokenizerState::Ok);

    let mut tokenizer = Tokenizer::new();
    assert!(matches!(
        tokenizer.tokenize(["x = $"]),
        TokenizerState::Error(LexError::UnexpectedCharacter { character: '$', .. })
    ));
}

#[test]
fn test_simple_statements() {
    parse_tree_matches("let x = 1", "Let(Name(\"x\"), Number(Integer(1)))");
    parse_tree_matches("print(\"hi\")", "Print(String(\"hi\"))");
    parse_tree_matches("print(2.5)", "Print(Number(Float(2.5)))");
    parse_tree_matches(
        "x = y",
        "Expression(Assign(Name(\"x\"), Name(Name(\"y\"))))",
    );
    parse_tree_matches("f()", "Expression(Call(Name(\"f\"), []))");
    parse_tree_matches("return", "Return(None)");
}

#[test]
fn test_statement_terminators() {
    parse_tree_matches(
        "let a = 1; let b = 2",
        "Block([Let(Name(\"a\"), Number(Integer(1))), Let(Name(\"b\"), Number(Integer(2)))])",
    );
    parse_tree_matches("let a = 1;\nprint(a);", "Print(Name(Name(\"a\")))");
    assert_raises_error(
        "print(1) print(2)",
        "ParseError: expected ';' or end of line but found keyword 'print' at line 1, column 9",
    );
}

#[test]
fn test_expressions() {
    parse_tree_matches(
        "1 + 2 * 3",
        "BinaryOperation(Plus, (Number(Integer(1)), BinaryOperation(Times, (Number(Integer(2)), Number(Integer(3))))))",
    );
    parse_tree_matches(
        "1 - 2 - 3",
        "BinaryOperation(Minus, (BinaryOperation(Minus, (Number(Integer(1)), Number(Integer(2)))), Number(Integer(3))))",
    );
    parse_tree_matches(
        "(1 + 2) * 3",
        "BinaryOperation(Times, (BinaryOperation(Plus, (Number(Integer(1)), Number(Integer(2)))), Number(Integer(3))))",
    );
    parse_tree_matches(
        "a || b && c",
        "BinaryOperation(Or, (Name(Name(\"a\")), BinaryOperation(And, (Name(Name(\"b\")), Name(Name(\"c\"))))))",
    );
    parse_tree_matches(
        "a == b < c",
        "BinaryOperation(Equal, (Name(Name(\"a\")), BinaryOperation(LessThan, (Name(Name(\"b\")), Name(Name(\"c\"))))))",
    );
    parse_tree_matches(
        "!-x",
        "UnaryOperation(Not, UnaryOperation(Minus, Name(Name(\"x\"))))",
    );
    parse_tree_matches(
        "-a * b",
        "BinaryOperation(Times, (UnaryOperation(Minus, Name(Name(\"a\"))), Name(Name(\"b\"))))",
    );
    parse_tree_matches(
        "f(1, g(x))",
        "Call(Name(\"f\"), [Number(Integer(1)), Call(Name(\"g\"), [Name(Name(\"x\"))])])",
    );
}

#[test]
fn test_assignment_is_right_associative() {
    parse_tree_matches(
        "a = b = 1",
        "Assign(Name(\"a\"), Assign(Name(\"b\"), Number(Integer(1))))",
    );
    parse_tree_matches(
        "print(a = 2)",
        "Print(Assign(Name(\"a\"), Number(Integer(2))))",
    );
}

#[test]
fn test_if_statements() {
    parse_tree_matches(
        "if (x):\n    print(1)\nelse:\n    print(2)",
        "If(Name(Name(\"x\")), Block([Print(Number(Integer(1)))]), Some(Block([Print(Number(Integer(2)))])))",
    );
    parse_tree_matches(
        "if (x): print(1) else: print(2)",
        "If(Name(Name(\"x\")), Block([Print(Number(Integer(1)))]), Some(Block([Print(Number(Integer(2)))])))",
    );
    parse_tree_matches(
        "if (x): print(1)",
        "If(Name(Name(\"x\")), Block([Print(Number(Integer(1)))]), None)",
    );
    // `else` binds to the nearest `if`.
    parse_tree_matches(
        "if (a): if (b): print(1) else: print(2)",
        "If(Name(Name(\"a\")), Block([If(Name(Name(\"b\")), Block([Print(Number(Integer(1)))]), Some(Block([Print(Number(Integer(2)))])))]), None)",
    );
}

#[test]
fn test_loops() {
    parse_tree_matches(
        "while (x): x = x - 1; print(x)",
        "While(Name(Name(\"x\")), Block([Expression(Assign(Name(\"x\"), BinaryOperation(Minus, (Name(Name(\"x\")), Number(Integer(1)))))), Print(Name(Name(\"x\")))]))",
    );
    parse_tree_matches(
        "for (let i = 0; i < 3; i = i + 1):\n    print(i)",
        "For(Some(Let(Name(\"i\"), Number(Integer(0)))), Some(BinaryOperation(LessThan, (Name(Name(\"i\")), Number(Integer(3))))), Some(Assign(Name(\"i\"), BinaryOperation(Plus, (Name(Name(\"i\")), Number(Integer(1)))))), Block([Print(Name(Name(\"i\")))]))",
    );
    parse_tree_matches(
        "for (;;): return",
        "For(None, None, None, Block([Return(None)]))",
    );
}

#[test]
fn test_function_defs() {
    parse_tree_matches(
        "function add(a, b): return a + b",
        "FunctionDef(FunctionDeclaration { name: Name(\"add\"), parameters: [Name(\"a\"), Name(\"b\")], body: Block([Return(Some(BinaryOperation(Plus, (Name(Name(\"a\")), Name(Name(\"b\"))))))]) })",
    );
    parse_tree_matches(
        "function nothing():\n    return\n",
        "parameters: [], body: Block([Return(None)])",
    );
    parse_tree_matches(
        "function fact(n): if (n <= 1): return 1 else: return n * fact(n - 1)\nprint(fact(5))",
        "Print(Call(Name(\"fact\"), [Number(Integer(5))]))",
    );
    parse_tree_matches(
        "function outer():\n    function inner():\n        return 1\n    return inner()",
        "body: Block([FunctionDef(FunctionDeclaration { name: Name(\"inner\")",
    );
}

#[test]
fn test_parse_errors() {
    assert_raises_error(
        "let = 5",
        "ParseError: expected identifier but found '=' at line 1, column 4",
    );
    assert_raises_error(
        "print(1",
        "ParseError: expected ')' but found end of input at line 2, column 0",
    );
    assert_raises_error(
        "5 = x",
        "ParseError: invalid assignment target at line 1, column 0",
    );
    assert_raises_error(
        "if (1) { print(1) }",
        "ParseError: expected ':' but found '{' at line 1, column 7",
    );
    assert_raises_error(
        "if (1):\nprint(1)",
        "ParseError: expected indented block but found keyword 'print' at line 2, column 0",
    );
    assert_raises_error(
        "x = 99999999999999999999",
        "ParseError: integer literal '99999999999999999999' is too large at line 1, column 4",
    );
    assert_raises_error(
        "function f(1): return",
        "ParseError: expected identifier but found number '1' at line 1, column 11",
    );
    assert_raises_error(
        "let x = ",
        "ParseError: expected expression but found end of line at line 1, column 8",
    );
}
