// # ========================= START OF THE GRAMMAR =========================
//
// # * Strings in single quotes denote keywords and punctuation
// # * Upper case names (NAME, NEWLINE, INDENT, ...) denote token types
// # * [e] is optional, e* repeats, e1 | e2 is ordered choice
//
// Every alternative is selected by the current token alone; the cursor only
// ever moves forward.

use tracing::debug;

use super::ast::*;
use super::error::ParseError;
use super::locations::{Locatable, Span};
use super::tokenizer::{Token, TokenType as TT};
use crate::stack::ensure_sufficient_stack;

pub type ParseResult<T> = Result<T, ParseError>;

/// How a statement ended. Only `;` lets an inline block continue on the
/// same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    EndOfLine,
}

pub fn parse(input: &[Token]) -> ParseResult<Block> {
    let program = Parser::new(input).file_()?;
    debug!(statements = program.0.len(), "parsed program");
    Ok(program)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: Token,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let span = tokens.last().map(|t| t.span).unwrap_or_default();
        Self {
            tokens,
            pos: 0,
            end: Token {
                typ: TT::ENDMARKER,
                lexeme: String::new(),
                span,
            },
        }
    }

    // # STARTING RULES
    // # ==============

    // file: statement* ENDMARKER
    fn file_(&mut self) -> ParseResult<Block> {
        let mut statements = vec![];
        while !self.check(TT::ENDMARKER) {
            let (statement, _) = self.statement()?;
            statements.push(statement);
        }
        Ok(Block(statements))
    }

    // # GENERAL STATEMENTS
    // # ==================

    // statement: compound_stmt | simple_stmt
    // compound_stmt: if_stmt | while_stmt | for_stmt | function_def
    fn statement(&mut self) -> ParseResult<(Statement, Terminator)> {
        if self.check(TT::KEYWORD) {
            let keyword = self.current().lexeme.clone();
            match keyword.as_str() {
                "if" => return self.if_stmt(),
                "while" => return self.while_stmt(),
                "for" => return self.for_stmt(),
                "function" => return self.function_def(),
                _ => {}
            }
        }
        self.simple_stmt()
    }

    // simple_stmt: (let_stmt | print_stmt | return_stmt | assignment_stmt | expression) terminator
    fn simple_stmt(&mut self) -> ParseResult<(Statement, Terminator)> {
        let statement = if self.check_keyword("let") {
            self.let_stmt()?
        } else if self.check_keyword("print") {
            self.print_stmt()?
        } else if self.check_keyword("return") {
            self.return_stmt()?
        } else if self.check(TT::NAME) && self.peek(1).typ == TT::EQUAL {
            self.assignment_stmt()?
        } else {
            let expr = self.expression()?;
            let span = expr.span();
            Statement::Expression(expr, span)
        };
        let terminator = self.terminator()?;
        Ok((statement, terminator))
    }

    // terminator: ';' [NEWLINE] | NEWLINE | &(DEDENT | ENDMARKER | 'else')
    fn terminator(&mut self) -> ParseResult<Terminator> {
        if self.eat(TT::SEMI) {
            if self.eat(TT::NEWLINE) {
                return Ok(Terminator::EndOfLine);
            }
            return Ok(Terminator::Semicolon);
        }
        if self.eat(TT::NEWLINE)
            || self.check(TT::DEDENT)
            || self.check(TT::ENDMARKER)
            || self.check_keyword("else")
        {
            return Ok(Terminator::EndOfLine);
        }
        Err(self.error("';' or end of line"))
    }

    // block:
    //     | ':' NEWLINE INDENT statement+ DEDENT
    //     | ':' statement (';' statement)*
    fn block(&mut self) -> ParseResult<(Block, Terminator)> {
        self.expect(TT::COLON)?;
        let mut statements = vec![];
        if self.eat(TT::NEWLINE) {
            self.expect(TT::INDENT)?;
            while !self.eat(TT::DEDENT) {
                if self.check(TT::ENDMARKER) {
                    return Err(self.error(TT::DEDENT.describe()));
                }
                let (statement, _) = self.statement()?;
                statements.push(statement);
            }
            return Ok((Block(statements), Terminator::EndOfLine));
        }
        loop {
            let (statement, terminator) = self.statement()?;
            statements.push(statement);
            if terminator == Terminator::EndOfLine || self.at_block_end() {
                return Ok((Block(statements), terminator));
            }
        }
    }

    // let_stmt: 'let' NAME '=' expression
    fn let_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.expect_keyword("let")?.span;
        let name: Name = self.expect(TT::NAME)?.into();
        self.expect(TT::EQUAL)?;
        let value = self.expression()?;
        let span = start.till(&value);
        Ok(Statement::Let(name, value, span))
    }

    // print_stmt: 'print' '(' expression ')'
    fn print_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.expect_keyword("print")?.span;
        self.expect(TT::LPAR)?;
        let value = self.expression()?;
        let end = self.expect(TT::RPAR)?;
        Ok(Statement::Print(value, start.till(&end)))
    }

    // return_stmt: 'return' [expression]
    fn return_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.expect_keyword("return")?.span;
        if self.check(TT::SEMI) || self.check(TT::NEWLINE) || self.at_block_end() {
            return Ok(Statement::Return(None, start));
        }
        let value = self.expression()?;
        let span = start.till(&value);
        Ok(Statement::Return(Some(value), span))
    }

    // assignment_stmt: NAME '=' expression
    fn assignment_stmt(&mut self) -> ParseResult<Statement> {
        let name: Name = self.expect(TT::NAME)?.into();
        self.expect(TT::EQUAL)?;
        let value = self.expression()?;
        let span = name.span.till(&value);
        Ok(Statement::Expression(
            Expression::Assign(name, Box::new(value), span),
            span,
        ))
    }

    // # COMPOUND STATEMENTS
    // # ===================

    // if_stmt: 'if' '(' expression ')' block ['else' block]
    fn if_stmt(&mut self) -> ParseResult<(Statement, Terminator)> {
        let start = self.expect_keyword("if")?.span;
        let condition = self.condition()?;
        let (then_block, mut terminator) = self.block()?;
        let else_block = if self.eat_keyword("else") {
            let (block, t) = self.block()?;
            terminator = t;
            Some(block)
        } else {
            None
        };
        let span = self.span_from(start);
        Ok((
            Statement::If(condition, then_block, else_block, span),
            terminator,
        ))
    }

    // while_stmt: 'while' '(' expression ')' block
    fn while_stmt(&mut self) -> ParseResult<(Statement, Terminator)> {
        let start = self.expect_keyword("while")?.span;
        let condition = self.condition()?;
        let (body, terminator) = self.block()?;
        let span = self.span_from(start);
        Ok((Statement::While(condition, body, span), terminator))
    }

    // for_stmt: 'for' '(' [let_stmt | expression] ';' [expression] ';' [expression] ')' block
    fn for_stmt(&mut self) -> ParseResult<(Statement, Terminator)> {
        let start = self.expect_keyword("for")?.span;
        self.expect(TT::LPAR)?;
        let init = if self.check(TT::SEMI) {
            None
        } else if self.check_keyword("let") {
            Some(Box::new(self.let_stmt()?))
        } else {
            let expr = self.expression()?;
            let span = expr.span();
            Some(Box::new(Statement::Expression(expr, span)))
        };
        self.expect(TT::SEMI)?;
        let condition = if self.check(TT::SEMI) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TT::SEMI)?;
        let update = if self.check(TT::RPAR) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TT::RPAR)?;
        let (body, terminator) = self.block()?;
        let span = self.span_from(start);
        Ok((
            Statement::For(init, condition, update, body, span),
            terminator,
        ))
    }

    // function_def: 'function' NAME '(' [NAME (',' NAME)*] ')' block
    fn function_def(&mut self) -> ParseResult<(Statement, Terminator)> {
        let start = self.expect_keyword("function")?.span;
        let name: Name = self.expect(TT::NAME)?.into();
        self.expect(TT::LPAR)?;
        let mut parameters: Vec<Name> = vec![];
        if !self.check(TT::RPAR) {
            parameters.push(self.expect(TT::NAME)?.into());
            while self.eat(TT::COMMA) {
                parameters.push(self.expect(TT::NAME)?.into());
            }
        }
        self.expect(TT::RPAR)?;
        let (body, terminator) = self.block()?;
        let span = self.span_from(start);
        let declaration = FunctionDeclaration {
            name,
            parameters,
            body,
        };
        Ok((
            Statement::FunctionDef(declaration.into(), span),
            terminator,
        ))
    }

    // condition: '(' expression ')'
    fn condition(&mut self) -> ParseResult<Expression> {
        self.expect(TT::LPAR)?;
        let expr = self.expression()?;
        self.expect(TT::RPAR)?;
        Ok(expr)
    }

    // # EXPRESSIONS
    // # ===========

    // expression: assignment
    fn expression(&mut self) -> ParseResult<Expression> {
        ensure_sufficient_stack(|| self.assignment())
    }

    // assignment: disjunction ['=' assignment]
    fn assignment(&mut self) -> ParseResult<Expression> {
        let target = self.disjunction()?;
        if !self.eat(TT::EQUAL) {
            return Ok(target);
        }
        let value = self.assignment()?;
        match target {
            Expression::Name(name) => {
                let span = name.span.till(&value);
                Ok(Expression::Assign(name, Box::new(value), span))
            }
            other => Err(ParseError::InvalidAssignmentTarget {
                location: other.span().start,
            }),
        }
    }

    // disjunction: conjunction ('||' conjunction)*
    fn disjunction(&mut self) -> ParseResult<Expression> {
        self.binary_operation(&DISJUNCTION, Self::conjunction)
    }

    // conjunction: equality ('&&' equality)*
    fn conjunction(&mut self) -> ParseResult<Expression> {
        self.binary_operation(&CONJUNCTION, Self::equality)
    }

    // equality: comparison (('==' | '!=') comparison)*
    fn equality(&mut self) -> ParseResult<Expression> {
        self.binary_operation(&EQUALITY, Self::comparison)
    }

    // comparison: sum (('<' | '<=' | '>' | '>=') sum)*
    fn comparison(&mut self) -> ParseResult<Expression> {
        self.binary_operation(&COMPARISON, Self::sum)
    }

    // sum: term (('+' | '-') term)*
    fn sum(&mut self) -> ParseResult<Expression> {
        self.binary_operation(&SUM, Self::term)
    }

    // term: factor (('*' | '/') factor)*
    fn term(&mut self) -> ParseResult<Expression> {
        self.binary_operation(&TERM, Self::factor)
    }

    // factor: ('!' | '-') factor | primary
    fn factor(&mut self) -> ParseResult<Expression> {
        let start = self.current().span;
        if let Some(op) = self.eat_operator(&UNARY) {
            let operand = ensure_sufficient_stack(|| self.factor())?;
            let span = start.till(&operand);
            return Ok(Expression::UnaryOperation(op, Box::new(operand), span));
        }
        self.primary()
    }

    // primary:
    //     | NUMBER
    //     | STRING
    //     | '(' expression ')'
    //     | NAME '(' [expression (',' expression)*] ')'
    //     | NAME
    fn primary(&mut self) -> ParseResult<Expression> {
        let token = self.current().clone();
        match token.typ {
            TT::NUMBER => {
                self.advance();
                Ok(Expression::Number(number(&token)?, token.span))
            }
            TT::STRING => {
                self.advance();
                Ok(Expression::String(token.lexeme, token.span))
            }
            TT::LPAR => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TT::RPAR)?;
                Ok(expr)
            }
            TT::NAME => {
                self.advance();
                let name = Name::from(token);
                if !self.eat(TT::LPAR) {
                    return Ok(Expression::Name(name));
                }
                let mut arguments = vec![];
                if !self.check(TT::RPAR) {
                    arguments.push(self.expression()?);
                    while self.eat(TT::COMMA) {
                        arguments.push(self.expression()?);
                    }
                }
                let end = self.expect(TT::RPAR)?;
                let span = name.span.till(&end);
                Ok(Expression::Call(name, arguments, span))
            }
            _ => Err(self.error("expression")),
        }
    }

    fn binary_operation(
        &mut self,
        operators: &[(TT, Operator)],
        operand: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.eat_operator(operators) {
            let rhs = operand(self)?;
            let span = lhs.span().till(&rhs);
            lhs = Expression::BinaryOperation(op, Box::new((lhs, rhs)), span);
        }
        Ok(lhs)
    }

    // # TOKEN HELPERS
    // # =============

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&self.end)
    }

    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn span_from(&self, start: Span) -> Span {
        start.till(&self.previous_span())
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, typ: TT) -> bool {
        self.current().typ == typ
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        let token = self.current();
        token.typ == TT::KEYWORD && token.lexeme == keyword
    }

    fn at_block_end(&self) -> bool {
        self.check(TT::NEWLINE)
            || self.check(TT::DEDENT)
            || self.check(TT::ENDMARKER)
            || self.check_keyword("else")
    }

    fn eat(&mut self, typ: TT) -> bool {
        if self.check(typ) {
            self.advance();
            return true;
        }
        false
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            return true;
        }
        false
    }

    fn eat_operator(&mut self, operators: &[(TT, Operator)]) -> Option<Operator> {
        let typ = self.current().typ;
        let op = operators.iter().find(|(t, _)| *t == typ).map(|(_, op)| *op)?;
        self.advance();
        Some(op)
    }

    fn expect(&mut self, typ: TT) -> ParseResult<Token> {
        if self.check(typ) {
            return Ok(self.advance());
        }
        Err(self.error(typ.describe()))
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> ParseResult<Token> {
        if self.check_keyword(keyword) {
            return Ok(self.advance());
        }
        Err(self.error(format!("'{keyword}'")))
    }

    fn error(&self, expected: impl Into<String>) -> ParseError {
        let token = self.current();
        let found = match token.typ {
            TT::NAME | TT::NUMBER | TT::KEYWORD => {
                format!("{} '{}'", token.typ.describe(), token.lexeme)
            }
            TT::STRING => format!("string \"{}\"", token.lexeme),
            other => other.describe().to_string(),
        };
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found,
            location: token.span.start,
        }
    }
}

fn number(token: &Token) -> ParseResult<Number> {
    if token.lexeme.contains('.') {
        return token
            .lexeme
            .parse()
            .map(Number::Float)
            .map_err(|_| ParseError::UnexpectedToken {
                expected: "number".to_string(),
                found: format!("'{}'", token.lexeme),
                location: token.span.start,
            });
    }
    token
        .lexeme
        .parse()
        .map(Number::Integer)
        .map_err(|_| ParseError::IntegerTooLarge {
            lexeme: token.lexeme.clone(),
            location: token.span.start,
        })
}
