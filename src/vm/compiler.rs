//! Single-pass compiler from source text to a [`Chunk`].
//!
//! Tokens are pulled from the scanner one at a time and bytecode is emitted
//! as soon as each construct is recognized; there is no syntax tree.
//! Expressions are parsed by precedence climbing over a per-token rule table.

use super::bytecode::{Chunk, OpCode};
use super::heap::Heap;
use super::value::Value;
use crate::lexer::{Literal, Scanner, Token, TokenKind};
use ariadne::{Color, Label, Report, ReportKind, Source};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Local slots are addressed by a single byte.
pub const MAX_LOCALS: usize = u8::MAX as usize + 1;

/// Deepest nesting of expressions and blocks the compiler descends into.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    AtEnd,
    At(String),
    /// Reported by the scanner; the message already describes the problem.
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub line: usize,
    pub location: ErrorLocation,
    pub message: String,
    pub span: Range<usize>,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error", self.line)?;
        match &self.location {
            ErrorLocation::AtEnd => write!(f, " at end")?,
            ErrorLocation::At(lexeme) => write!(f, " at '{}'", lexeme)?,
            ErrorLocation::Lexical => {}
        }
        write!(f, ": {}", self.message)
    }
}

impl CompileError {
    /// Source-annotated rendering of this error.
    pub fn report(&self, path: &str, src: &str) -> String {
        let mut buffer = Vec::new();
        Report::build(ReportKind::Error, (path, self.span.clone()))
            .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
            .with_message(format!("compile error on line {}", self.line))
            .with_label(
                Label::new((path, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((path, Source::from(src)), &mut buffer)
            .ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment, // =
    Or,         // or
    And,        // and
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Call,       // . ()
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

type ParseFn<'src, 'h> = fn(&mut Compiler<'src, 'h>, bool);

struct ParseRule<'src, 'h> {
    prefix: Option<ParseFn<'src, 'h>>,
    infix: Option<ParseFn<'src, 'h>>,
    precedence: Precedence,
}

#[derive(Debug, Clone)]
struct Local<'src> {
    name: &'src str,
    /// `None` between declaration and the end of the initializer.
    depth: Option<usize>,
}

pub struct Compiler<'src, 'h> {
    scanner: Scanner<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    panic_mode: bool,
    errors: Vec<CompileError>,

    locals: Vec<Local<'src>>,
    scope_depth: usize,

    chunk: Chunk,
    heap: &'h mut Heap,
    /// Global names already in the constant pool.
    identifiers: HashMap<&'src str, u8>,

    depth: usize,
    /// Set once `MAX_NESTING` is hit; no further errors are reported.
    nesting_exceeded: bool,
}

/// Compile `source` into a fresh chunk, interning string constants in `heap`.
pub fn compile(source: &str, heap: &mut Heap) -> Result<Chunk, Vec<CompileError>> {
    Compiler::new(source, heap).compile()
}

impl<'src, 'h> Compiler<'src, 'h> {
    pub fn new(source: &'src str, heap: &'h mut Heap) -> Self {
        Self {
            scanner: Scanner::new(source),
            current: Token::synthetic(TokenKind::Eof),
            previous: Token::synthetic(TokenKind::Eof),
            panic_mode: false,
            errors: Vec::new(),
            locals: Vec::new(),
            scope_depth: 0,
            chunk: Chunk::new(),
            heap,
            identifiers: HashMap::new(),
            depth: 0,
            nesting_exceeded: false,
        }
    }

    pub fn compile(mut self) -> Result<Chunk, Vec<CompileError>> {
        self.advance();
        while !self.matches(TokenKind::Eof) {
            self.declaration();
        }
        self.emit_op(OpCode::Return);

        if self.errors.is_empty() {
            debug!(
                "compiled chunk: {} bytes, {} constants",
                self.chunk.len(),
                self.chunk.constants.len()
            );
            Ok(self.chunk)
        } else {
            debug!("compilation failed with {} error(s)", self.errors.len());
            Err(self.errors)
        }
    }

    // ========== token stream ==========

    fn advance(&mut self) {
        loop {
            let token = self.scanner.scan_token();
            if token.kind != TokenKind::Error {
                self.previous = std::mem::replace(&mut self.current, token);
                return;
            }
            // error tokens never become `previous`
            self.error_at(&token, token.lexeme);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    // ========== statements ==========

    fn declaration(&mut self) {
        if self.matches(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn statement(&mut self) {
        if self.matches(TokenKind::Print) {
            self.print_statement();
        } else if self.matches(TokenKind::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");

        if self.matches(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        );

        self.define_variable(global);
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value.");
        self.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        self.emit_op(OpCode::Pop);
    }

    fn block(&mut self) {
        if !self.enter_nesting() {
            return;
        }
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.declaration();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.");
        self.leave_nesting();
    }

    fn enter_nesting(&mut self) -> bool {
        if self.depth >= MAX_NESTING {
            self.error_at_current("Too much nesting.");
            self.nesting_exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave_nesting(&mut self) {
        self.depth -= 1;
    }

    /// Skip ahead to a statement boundary so one mistake is reported once.
    fn synchronize(&mut self) {
        self.panic_mode = false;

        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    // ========== scopes and variables ==========

    fn begin_scope(&mut self) {
        self.scope_depth += 1;
    }

    fn end_scope(&mut self) {
        self.scope_depth -= 1;

        while let Some(local) = self.locals.last() {
            if local.depth.is_some_and(|d| d <= self.scope_depth) {
                break;
            }
            self.emit_op(OpCode::Pop);
            self.locals.pop();
        }
    }

    fn parse_variable(&mut self, message: &str) -> u8 {
        self.consume(TokenKind::Identifier, message);

        self.declare_variable();
        if self.scope_depth > 0 {
            return 0;
        }

        let name = self.previous.lexeme;
        self.identifier_constant(name)
    }

    fn declare_variable(&mut self) {
        if self.scope_depth == 0 {
            return;
        }

        let name = self.previous.lexeme;
        let duplicate = self
            .locals
            .iter()
            .rev()
            .take_while(|local| local.depth.is_none_or(|d| d >= self.scope_depth))
            .any(|local| local.name == name);
        if duplicate {
            self.error("Already a variable with this name in this scope.");
        }

        self.add_local(name);
    }

    fn add_local(&mut self, name: &'src str) {
        if self.locals.len() == MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.locals.push(Local { name, depth: None });
    }

    fn define_variable(&mut self, global: u8) {
        if self.scope_depth > 0 {
            self.mark_initialized();
            return;
        }
        self.emit_op_with(OpCode::DefineGlobal, global);
    }

    fn mark_initialized(&mut self) {
        let depth = self.scope_depth;
        if let Some(local) = self.locals.last_mut() {
            local.depth = Some(depth);
        }
    }

    fn resolve_local(&mut self, name: &str) -> Option<u8> {
        let (slot, initialized) = self
            .locals
            .iter()
            .enumerate()
            .rev()
            .find(|(_, local)| local.name == name)
            .map(|(slot, local)| (slot, local.depth.is_some()))?;
        if !initialized {
            self.error("Can't read local variable in its own initializer.");
        }
        u8::try_from(slot).ok()
    }

    fn identifier_constant(&mut self, name: &'src str) -> u8 {
        if let Some(&index) = self.identifiers.get(name) {
            return index;
        }
        let string = self.heap.intern(name);
        let index = self.make_constant(Value::Str(string));
        if !self.panic_mode {
            self.identifiers.insert(name, index);
        }
        index
    }

    fn named_variable(&mut self, name: &'src str, can_assign: bool) {
        let (get_op, set_op, arg) = match self.resolve_local(name) {
            Some(slot) => (OpCode::GetLocal, OpCode::SetLocal, slot),
            None => {
                let arg = self.identifier_constant(name);
                (OpCode::GetGlobal, OpCode::SetGlobal, arg)
            }
        };

        if can_assign && self.matches(TokenKind::Equal) {
            self.expression();
            self.emit_op_with(set_op, arg);
        } else {
            self.emit_op_with(get_op, arg);
        }
    }

    // ========== expressions ==========

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        if !self.enter_nesting() {
            return;
        }
        self.parse_with_rules(precedence);
        self.leave_nesting();
    }

    fn parse_with_rules(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix) = Self::rule(self.previous.kind).prefix else {
            self.error("Expect expression.");
            return;
        };

        let can_assign = precedence <= Precedence::Assignment;
        prefix(self, can_assign);

        while precedence <= Self::rule(self.current.kind).precedence {
            self.advance();
            if let Some(infix) = Self::rule(self.previous.kind).infix {
                infix(self, can_assign);
            }
        }

        if can_assign && self.matches(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    fn rule(kind: TokenKind) -> ParseRule<'src, 'h> {
        use TokenKind as T;
        let (prefix, infix, precedence): (Option<ParseFn<'src, 'h>>, Option<ParseFn<'src, 'h>>, _) =
            match kind {
                T::LeftParen => (Some(Self::grouping), None, Precedence::None),
                T::Minus => (Some(Self::unary), Some(Self::binary), Precedence::Term),
                T::Plus => (None, Some(Self::binary), Precedence::Term),
                T::Slash | T::Star => (None, Some(Self::binary), Precedence::Factor),
                T::Bang => (Some(Self::unary), None, Precedence::None),
                T::BangEqual | T::EqualEqual => (None, Some(Self::binary), Precedence::Equality),
                T::Greater | T::GreaterEqual | T::Less | T::LessEqual => {
                    (None, Some(Self::binary), Precedence::Comparison)
                }
                T::Identifier => (Some(Self::variable), None, Precedence::None),
                T::String => (Some(Self::string), None, Precedence::None),
                T::Number => (Some(Self::number), None, Precedence::None),
                T::False | T::True | T::Nil => (Some(Self::literal), None, Precedence::None),
                _ => (None, None, Precedence::None),
            };
        ParseRule {
            prefix,
            infix,
            precedence,
        }
    }

    fn grouping(&mut self, _can_assign: bool) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn number(&mut self, _can_assign: bool) {
        let Some(Literal::Number(value)) = self.previous.literal else {
            unreachable!("number token without a numeric literal")
        };
        self.emit_constant(Value::Number(value));
    }

    fn string(&mut self, _can_assign: bool) {
        let Some(Literal::Str(text)) = self.previous.literal else {
            unreachable!("string token without a string literal")
        };
        let string = self.heap.intern(text);
        self.emit_constant(Value::Str(string));
    }

    fn literal(&mut self, _can_assign: bool) {
        match self.previous.kind {
            TokenKind::False => self.emit_op(OpCode::False),
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            TokenKind::True => self.emit_op(OpCode::True),
            _ => {}
        }
    }

    fn variable(&mut self, can_assign: bool) {
        let name = self.previous.lexeme;
        self.named_variable(name, can_assign);
    }

    fn unary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;

        self.parse_precedence(Precedence::Unary);

        match operator {
            TokenKind::Bang => self.emit_op(OpCode::Not),
            TokenKind::Minus => self.emit_op(OpCode::Negate),
            _ => {}
        }
    }

    fn binary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;
        let rule = Self::rule(operator);
        self.parse_precedence(rule.precedence.next());

        match operator {
            TokenKind::BangEqual => self.emit_ops(OpCode::Equal, OpCode::Not),
            TokenKind::EqualEqual => self.emit_op(OpCode::Equal),
            TokenKind::Greater => self.emit_op(OpCode::Greater),
            TokenKind::GreaterEqual => self.emit_ops(OpCode::Less, OpCode::Not),
            TokenKind::Less => self.emit_op(OpCode::Less),
            TokenKind::LessEqual => self.emit_ops(OpCode::Greater, OpCode::Not),
            TokenKind::Plus => self.emit_op(OpCode::Add),
            TokenKind::Minus => self.emit_op(OpCode::Subtract),
            TokenKind::Star => self.emit_op(OpCode::Multiply),
            TokenKind::Slash => self.emit_op(OpCode::Divide),
            _ => {}
        }
    }

    // ========== emission ==========

    fn emit_byte(&mut self, byte: u8) {
        self.chunk.write(byte, self.previous.line);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op.into());
    }

    fn emit_ops(&mut self, first: OpCode, second: OpCode) {
        self.emit_op(first);
        self.emit_op(second);
    }

    fn emit_op_with(&mut self, op: OpCode, operand: u8) {
        self.emit_op(op);
        self.emit_byte(operand);
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_op_with(OpCode::Constant, index);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        match self.chunk.add_constant(value) {
            Some(index) => index,
            None => {
                self.error("Too many constants in one chunk.");
                0
            }
        }
    }

    // ========== errors ==========

    fn error(&mut self, message: &str) {
        let token = self.previous.clone();
        self.error_at(&token, message);
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current.clone();
        self.error_at(&token, message);
    }

    fn error_at(&mut self, token: &Token<'src>, message: &str) {
        if self.panic_mode || self.nesting_exceeded {
            return;
        }
        self.panic_mode = true;

        let location = match token.kind {
            TokenKind::Eof => ErrorLocation::AtEnd,
            TokenKind::Error => ErrorLocation::Lexical,
            _ => ErrorLocation::At(token.lexeme.to_string()),
        };
        self.errors.push(CompileError {
            line: token.line,
            location,
            message: message.to_string(),
            span: token.span.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_ok(source: &str) -> Chunk {
        let mut heap = Heap::new();
        match compile(source, &mut heap) {
            Ok(chunk) => chunk,
            Err(errors) => panic!("unexpected compile errors: {:?}", errors),
        }
    }

    fn compile_err(source: &str) -> Vec<String> {
        let mut heap = Heap::new();
        match compile(source, &mut heap) {
            Ok(_) => panic!("expected {:?} to fail", source),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn op(op: OpCode) -> u8 {
        op.into()
    }

    #[test]
    fn test_empty_source_is_just_return() {
        let chunk = compile_ok("");
        assert_eq!(chunk.code, vec![op(OpCode::Return)]);
    }

    #[test]
    fn test_precedence_and_left_associativity() {
        // 1 - 2 - 3 * 4  =>  ((1 - 2) - (3 * 4))
        let chunk = compile_ok("1 - 2 - 3 * 4;");
        assert_eq!(
            chunk.code,
            vec![
                op(OpCode::Constant), 0,
                op(OpCode::Constant), 1,
                op(OpCode::Subtract),
                op(OpCode::Constant), 2,
                op(OpCode::Constant), 3,
                op(OpCode::Multiply),
                op(OpCode::Subtract),
                op(OpCode::Pop),
                op(OpCode::Return),
            ]
        );
    }

    #[test]
    fn test_synthesized_comparisons() {
        let chunk = compile_ok("print 1 <= 2;");
        assert_eq!(
            &chunk.code[4..7],
            &[op(OpCode::Greater), op(OpCode::Not), op(OpCode::Print)]
        );
        let chunk = compile_ok("print 1 >= 2;");
        assert_eq!(&chunk.code[4..6], &[op(OpCode::Less), op(OpCode::Not)]);
        let chunk = compile_ok("print 1 != 2;");
        assert_eq!(&chunk.code[4..6], &[op(OpCode::Equal), op(OpCode::Not)]);
    }

    #[test]
    fn test_literals_use_dedicated_opcodes() {
        let chunk = compile_ok("print !true == false; print nil;");
        assert!(chunk.constants.is_empty());
        assert_eq!(
            chunk.code,
            vec![
                op(OpCode::True),
                op(OpCode::Not),
                op(OpCode::False),
                op(OpCode::Equal),
                op(OpCode::Print),
                op(OpCode::Nil),
                op(OpCode::Print),
                op(OpCode::Return),
            ]
        );
    }

    #[test]
    fn test_global_declaration_defaults_to_nil() {
        let chunk = compile_ok("var x;");
        assert_eq!(
            chunk.code,
            vec![op(OpCode::Nil), op(OpCode::DefineGlobal), 0, op(OpCode::Return)]
        );
        assert_eq!(chunk.constants[0].to_string(), "x");
    }

    #[test]
    fn test_global_names_share_a_constant() {
        let chunk = compile_ok("var a = 1; a = a;");
        // "a" and 1
        assert_eq!(chunk.constants.len(), 2);
    }

    #[test]
    fn test_locals_resolve_to_slots_and_are_popped() {
        let chunk = compile_ok("{ var a = 1; var b = a; b = 2; }");
        assert_eq!(
            chunk.code,
            vec![
                op(OpCode::Constant), 0,
                op(OpCode::GetLocal), 0,
                op(OpCode::Constant), 1,
                op(OpCode::SetLocal), 1,
                op(OpCode::Pop),
                op(OpCode::Pop),
                op(OpCode::Pop),
                op(OpCode::Return),
            ]
        );
    }

    #[test]
    fn test_shadowing_in_nested_block() {
        let chunk = compile_ok("{ var x = 1; { var x = 2; print x; } print x; }");
        let code = &chunk.code;
        // inner print reads slot 1, outer print reads slot 0
        let reads: Vec<u8> = code
            .windows(2)
            .filter(|w| w[0] == op(OpCode::GetLocal))
            .map(|w| w[1])
            .collect();
        assert_eq!(reads, vec![1, 0]);
    }

    #[test]
    fn test_line_table_follows_source() {
        let chunk = compile_ok("print 1;\n\nprint 2;");
        assert_eq!(chunk.lines, vec![1, 1, 1, 3, 3, 3, 3]);
    }

    #[test]
    fn test_duplicate_local_is_an_error() {
        let errors = compile_err("{ var a = 1; var a = 2; }");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_own_initializer_is_an_error() {
        let errors = compile_err("{ var a = a; }");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_missing_expression() {
        let errors = compile_err("print;");
        assert_eq!(errors, vec!["[line 1] Error at ';': Expect expression."]);
    }

    #[test]
    fn test_error_at_end() {
        let errors = compile_err("print 1");
        assert_eq!(errors, vec!["[line 1] Error at end: Expect ';' after value."]);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let errors = compile_err("var a; var b; a + b = 3;");
        assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target."]);
    }

    #[test]
    fn test_lexical_errors_have_no_location() {
        let errors = compile_err("print \"open");
        assert_eq!(errors, vec!["[line 1] Error: Unterminated string."]);
    }

    #[test]
    fn test_unterminated_string_reports_start_line() {
        let errors = compile_err("print 1;\nprint \"never\nclosed");
        assert_eq!(errors, vec!["[line 2] Error: Unterminated string."]);
    }

    #[test]
    fn test_panic_mode_reports_independent_errors_once() {
        let errors = compile_err("print ;\nprint );");
        assert_eq!(
            errors,
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 2] Error at ')': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_synchronizes_on_statement_keyword() {
        let errors = compile_err("1 + ) var x = 1; print x print 2;");
        assert_eq!(
            errors,
            vec![
                "[line 1] Error at ')': Expect expression.",
                "[line 1] Error at 'print': Expect ';' after value.",
            ]
        );
    }

    #[test]
    fn test_too_many_constants() {
        let source: String = (0..257).map(|i| format!("{}.5;", i)).collect();
        let errors = compile_err(&source);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Too many constants in one chunk."));
    }

    #[test]
    fn test_too_many_locals() {
        let mut source = String::from("{");
        for i in 0..=MAX_LOCALS {
            source.push_str(&format!("var v{};", i));
        }
        source.push('}');
        let errors = compile_err(&source);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Too many local variables in function."));
    }

    #[test]
    fn test_deeply_nested_grouping_is_one_error() {
        let n = 100_000;
        let source = format!("print {}1{};", "(".repeat(n), ")".repeat(n));
        let errors = compile_err(&source);
        assert_eq!(errors, vec!["[line 1] Error at '(': Too much nesting."]);
    }

    #[test]
    fn test_deeply_nested_blocks_are_one_error() {
        let n = 100_000;
        let source = format!("{}print 1;{}", "{".repeat(n), "}".repeat(n));
        let errors = compile_err(&source);
        assert_eq!(errors, vec!["[line 1] Error at '{': Too much nesting."]);
    }

    #[test]
    fn test_deep_unary_chain_is_an_error() {
        let source = format!("print {}1;", "-".repeat(10_000));
        let errors = compile_err(&source);
        assert_eq!(errors, vec!["[line 1] Error at '-': Too much nesting."]);
    }

    #[test]
    fn test_nesting_below_the_limit_compiles() {
        let source = format!("{{{{ print {}1{}; }}}}", "(".repeat(200), ")".repeat(200));
        compile_ok(&source);
    }

    #[test]
    fn test_string_literals_are_interned() {
        let mut heap = Heap::new();
        let chunk = compile("print \"hi\"; print \"hi\";", &mut heap).unwrap();
        assert_eq!(heap.object_count(), 1);
        assert_eq!(chunk.constants[0], chunk.constants[1]);
    }

    #[test]
    fn test_report_mentions_message() {
        let source = "print ;";
        let mut heap = Heap::new();
        let errors = compile(source, &mut heap).unwrap_err();
        let report = errors[0].report("<test>", source);
        assert!(report.contains("Expect expression."));
    }
}
