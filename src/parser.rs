// ABOUTME: Recursive-descent statement parser with a Pratt expression parser

use crate::ast::*;
use crate::error::CompileError;
use crate::keywords::{FLAG_ANNOTATIONS, SKIPPABLE_ANNOTATIONS};
use crate::position::Position;
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    filename: Option<String>,
}

type PResult<T> = Result<T, CompileError>;

impl Parser {
    pub fn new(tokens: Vec<Token>, filename: Option<&str>) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.map(|s| s.to_string()),
        }
    }

    // ===== token cursor helpers =====

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn is_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, lexeme: &str) -> bool {
        self.current().is(lexeme)
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn match_tok(&mut self, lexeme: &str) -> bool {
        if self.check(lexeme) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, lexeme: &str) -> PResult<Token> {
        if self.check(lexeme) {
            Ok(self.advance())
        } else {
            Err(self.err_expected(lexeme))
        }
    }

    fn expect_identifier_like(&mut self) -> PResult<String> {
        if matches!(self.current().kind, TokenKind::Identifier | TokenKind::Keyword) {
            Ok(self.advance().lexeme)
        } else {
            Err(self.err_expected("identifier"))
        }
    }

    fn err_expected(&self, expected: &str) -> CompileError {
        CompileError::Syntactic {
            expected: expected.to_string(),
            got: self.current().lexeme.clone(),
            position: self.current().position,
            filename: self.filename.clone(),
        }
    }

    fn position(&self) -> Position {
        self.current().position
    }

    // ===== module =====

    pub fn parse_module(mut self) -> PResult<Module> {
        let start = self.position();
        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_top_level()?);
        }
        Ok(Module {
            filename: self.filename.clone(),
            start,
            statements,
        })
    }

    fn parse_top_level(&mut self) -> PResult<Statement> {
        let flags = self.parse_annotations()?;
        if self.check("§") {
            return self.parse_import();
        }
        self.parse_statement_with_flags(flags)
    }

    /// Consume leading `@name [args...]` annotations, folding flag
    /// annotations (publica/privata/futura/externa/...) into `DeclFlags`
    /// and skipping unknown-but-closed-set annotations wholesale.
    fn parse_annotations(&mut self) -> PResult<DeclFlags> {
        let mut flags = DeclFlags::default();
        while self.check("@") {
            self.advance();
            let name = self.expect_identifier_like()?;
            if FLAG_ANNOTATIONS.contains(&name.as_str()) {
                match name.as_str() {
                    "publica" => flags.public = true,
                    "privata" => flags.private = true,
                    "protecta" => flags.protected = true,
                    "futura" => flags.async_ = true,
                    "externa" => flags.extern_ = true,
                    "abstractus" => flags.abstract_ = true,
                    _ => {}
                }
            } else if SKIPPABLE_ANNOTATIONS.contains(&name.as_str()) {
                self.skip_annotation_args();
            } else {
                return Err(CompileError::UnknownAnnotation {
                    name,
                    position: self.position(),
                    filename: self.filename.clone(),
                });
            }
        }
        Ok(flags)
    }

    /// Consume tokens until the next `@`, `§`, or declaration keyword.
    fn skip_annotation_args(&mut self) {
        while !self.is_eof() && !self.check("@") && !self.check("§") && !self.starts_declaration() {
            self.advance();
        }
    }

    fn starts_declaration(&self) -> bool {
        self.current().kind == TokenKind::Keyword
            && matches!(
                self.current().lexeme.as_str(),
                "varia" | "fixum" | "figendum" | "variandum" | "functio" | "genus" | "pactum"
                    | "ordo" | "discretio"
            )
    }

    fn parse_import(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("§")?;
        // Accept both `importa ex "path" specs…` and legacy `ex "path" importa specs…`.
        if self.check("importa") {
            self.advance();
            self.expect("ex")?;
        } else {
            self.expect("ex")?;
            self.expect("importa")?;
        }
        let path_tok = if self.check_kind(TokenKind::String) {
            self.advance()
        } else {
            return Err(self.err_expected("string literal"));
        };
        let mut specifiers = Vec::new();
        loop {
            if self.match_tok("*") {
                let local = if self.match_tok("ut") {
                    Some(self.expect_identifier_like()?)
                } else {
                    None
                };
                specifiers.push(ImportSpecifier {
                    imported: "*".to_string(),
                    local,
                    wildcard: true,
                });
            } else if matches!(self.current().kind, TokenKind::Identifier | TokenKind::Keyword) {
                let imported = self.expect_identifier_like()?;
                let local = if self.match_tok("ut") {
                    Some(self.expect_identifier_like()?)
                } else {
                    None
                };
                specifiers.push(ImportSpecifier {
                    imported,
                    local,
                    wildcard: false,
                });
            } else {
                break;
            }
            if !self.match_tok(",") {
                break;
            }
        }
        Ok(Statement::Import {
            path: path_tok.lexeme,
            specifiers,
            position,
        })
    }

    // ===== statements =====

    fn parse_statement(&mut self) -> PResult<Statement> {
        let flags = self.parse_annotations()?;
        self.parse_statement_with_flags(flags)
    }

    fn parse_statement_with_flags(&mut self, flags: DeclFlags) -> PResult<Statement> {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Keyword {
            return self.parse_var_decl_or_expression(flags);
        }
        match tok.lexeme.as_str() {
            "varia" | "fixum" | "figendum" | "variandum" => self.parse_var_decl(flags),
            "functio" => self.parse_function_decl(flags),
            "genus" => self.parse_class_decl(flags),
            "pactum" => self.parse_protocol_decl(),
            "ordo" => self.parse_enum_decl(),
            "discretio" => self.parse_union_decl(),
            "si" => self.parse_if(),
            "dum" => self.parse_while(),
            "fac" => self.parse_do_while(),
            "ex" => self.parse_for_each(),
            "de" => self.parse_for_each_key(),
            "elige" => self.parse_switch(),
            "discerne" => self.parse_match(),
            "custodi" => self.parse_guard_chain(),
            "tempta" => self.parse_try(),
            "redde" => self.parse_return(),
            "iace" => self.parse_throw(),
            "mori" => self.parse_panic(),
            "scribe" => self.parse_print(PrintSeverity::Info),
            "vide" => self.parse_print(PrintSeverity::Debug),
            "mone" => self.parse_print(PrintSeverity::Warn),
            "probatio" => self.parse_assert(),
            "frange" => {
                let position = self.position();
                self.advance();
                Ok(Statement::Break { position })
            }
            "perge" => {
                let position = self.position();
                self.advance();
                Ok(Statement::Continue { position })
            }
            "incipit" => self.parse_entry(false),
            "incipiet" => self.parse_entry(true),
            "exemplaria" => self.parse_test_suite(),
            "exemplum" => self.parse_test_case(),
            _ => self.parse_var_decl_or_expression(flags),
        }
    }

    fn parse_block(&mut self) -> PResult<Vec<Statement>> {
        self.expect("{")?;
        let mut body = Vec::new();
        while !self.check("}") && !self.is_eof() {
            body.push(self.parse_statement()?);
        }
        self.expect("}")?;
        Ok(body)
    }

    /// Block bodies after control-flow keywords accept a full `{ … }`
    /// block or one of the single-statement shorthands.
    fn parse_body(&mut self) -> PResult<Vec<Statement>> {
        if self.check("{") {
            return self.parse_block();
        }
        let position = self.position();
        if self.match_tok("tacet") {
            return Ok(Vec::new());
        }
        if self.match_tok("ergo") {
            let stmt = self.parse_statement()?;
            return Ok(vec![stmt]);
        }
        if self.match_tok("reddit") {
            let value = self.parse_expression(1)?;
            return Ok(vec![Statement::Return {
                value: Some(value),
                position,
            }]);
        }
        if self.match_tok("iacit") {
            let value = self.parse_expression(1)?;
            return Ok(vec![Statement::Throw { value, position }]);
        }
        if self.match_tok("moritor") {
            let value = self.parse_expression(1)?;
            return Ok(vec![Statement::Panic { value, position }]);
        }
        Err(self.err_expected("block or shorthand body"))
    }

    fn parse_var_decl(&mut self, flags: DeclFlags) -> PResult<Statement> {
        let position = self.position();
        let kind = match self.advance().lexeme.as_str() {
            "varia" => VarKind::Varia,
            "fixum" => VarKind::Fixum,
            "figendum" => VarKind::Figendum,
            "variandum" => VarKind::Variandum,
            _ => VarKind::Fixum,
        };
        let (type_, name) = self.parse_type_first_name()?;
        let value = if self.match_tok("=") {
            Some(self.parse_expression(1)?)
        } else {
            None
        };
        Ok(Statement::VarDecl {
            kind,
            name,
            type_,
            value,
            flags,
            position,
        })
    }

    /// The key disambiguation in spec.md §4.2: with one token of
    /// lookahead after the first identifier, decide whether a type
    /// precedes the name or the first identifier *is* the name.
    fn parse_type_first_name(&mut self) -> PResult<(Option<Type>, String)> {
        if self.check("si") {
            // `si Type name` -> Nullable(Type) name
            self.advance();
            let inner = self.parse_type()?;
            let name = self.expect_identifier_like()?;
            return Ok((Some(Type::Nullable(Box::new(inner))), name));
        }

        if !matches!(self.current().kind, TokenKind::Identifier | TokenKind::Keyword) {
            return Err(self.err_expected("identifier"));
        }

        let first = self.advance().lexeme;

        if self.check("<") {
            let args = self.parse_generic_args()?;
            let name = self.expect_identifier_like()?;
            return Ok((Some(Type::Generic(first, args)), name));
        }

        if matches!(self.current().kind, TokenKind::Identifier | TokenKind::Keyword)
            && !self.starts_expression_boundary()
        {
            let name = self.advance().lexeme;
            return Ok((Some(Type::Named(first)), name));
        }

        Ok((None, first))
    }

    fn starts_expression_boundary(&self) -> bool {
        matches!(self.current().lexeme.as_str(), "=" | ";" | "(" | ",")
    }

    fn parse_generic_args(&mut self) -> PResult<Vec<Type>> {
        self.expect("<")?;
        let mut args = Vec::new();
        if !self.check(">") {
            loop {
                args.push(self.parse_type()?);
                if !self.match_tok(",") {
                    break;
                }
            }
        }
        self.expect(">")?;
        Ok(args)
    }

    fn parse_type(&mut self) -> PResult<Type> {
        if self.match_tok("si") {
            return Ok(Type::Nullable(Box::new(self.parse_type()?)));
        }
        let mut ty = self.parse_type_atom()?;
        if self.match_tok("->") {
            let ret = self.parse_type()?;
            ty = Type::Function(vec![ty], Box::new(ret));
        }
        if self.check("|") {
            let mut members = vec![ty];
            while self.match_tok("|") {
                members.push(self.parse_type_atom()?);
            }
            ty = Type::Union(members);
        }
        Ok(ty)
    }

    fn parse_type_atom(&mut self) -> PResult<Type> {
        if self.check_kind(TokenKind::String) {
            let lit = self.advance().lexeme;
            return Ok(Type::Literal(lit));
        }
        let name = self.expect_identifier_like()?;
        if self.check("<") {
            let args = self.parse_generic_args()?;
            return Ok(Type::Generic(name, args));
        }
        Ok(Type::Named(name))
    }

    fn parse_parameter_list(&mut self) -> PResult<Vec<Parameter>> {
        self.expect("(")?;
        let mut params = Vec::new();
        while !self.check(")") {
            params.push(self.parse_parameter()?);
            if !self.match_tok(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    fn parse_parameter(&mut self) -> PResult<Parameter> {
        let ownership = if self.check("ex") || self.check("de") || self.check("in") {
            let tok = self.advance().lexeme;
            Some(match tok.as_str() {
                "ex" => Ownership::Ex,
                "de" => Ownership::De,
                _ => Ownership::In,
            })
        } else {
            None
        };
        let rest = self.match_tok("..");
        let (type_, name) = self.parse_type_first_name()?;
        let optional = self.match_tok("?");
        let default = if self.match_tok("=") {
            Some(self.parse_expression(1)?)
        } else {
            None
        };
        Ok(Parameter {
            name,
            type_,
            default,
            rest,
            optional,
            ownership,
        })
    }

    fn parse_function_decl(&mut self, flags: DeclFlags) -> PResult<Statement> {
        let decl = self.parse_function_decl_inner(flags)?;
        Ok(Statement::FunctionDecl(decl))
    }

    fn parse_function_decl_inner(&mut self, flags: DeclFlags) -> PResult<FunctionDecl> {
        let position = self.position();
        self.expect("functio")?;
        let name = self.expect_identifier_like()?;
        let generics = self.parse_optional_generics_decl()?;
        let params = self.parse_parameter_list()?;
        let return_type = if self.match_tok("->") {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = if flags.extern_ {
            self.match_tok(";");
            None
        } else {
            Some(self.parse_block()?)
        };
        Ok(FunctionDecl {
            name,
            generics,
            params,
            return_type,
            body,
            flags,
            position,
        })
    }

    fn parse_optional_generics_decl(&mut self) -> PResult<Vec<String>> {
        if !self.check("<") {
            return Ok(Vec::new());
        }
        self.advance();
        let mut names = Vec::new();
        while !self.check(">") {
            names.push(self.expect_identifier_like()?);
            if !self.match_tok(",") {
                break;
            }
        }
        self.expect(">")?;
        Ok(names)
    }

    fn parse_class_decl(&mut self, flags: DeclFlags) -> PResult<Statement> {
        let position = self.position();
        self.expect("genus")?;
        let name = self.expect_identifier_like()?;
        let generics = self.parse_optional_generics_decl()?;
        let mut protocols = Vec::new();
        if self.match_tok(":") {
            loop {
                protocols.push(self.expect_identifier_like()?);
                if !self.match_tok(",") {
                    break;
                }
            }
        }
        self.expect("{")?;
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check("}") && !self.is_eof() {
            let member_flags = self.parse_annotations()?;
            if self.check("functio") {
                methods.push(self.parse_function_decl_inner(member_flags)?);
            } else {
                fields.push(self.parse_field(member_flags)?);
            }
        }
        self.expect("}")?;
        Ok(Statement::ClassDecl(ClassDecl {
            name,
            generics,
            protocols,
            fields,
            methods,
            flags,
            position,
        }))
    }

    fn parse_field(&mut self, flags: DeclFlags) -> PResult<Field> {
        let visibility = if flags.private {
            Visibility::Private
        } else if flags.protected {
            Visibility::Protected
        } else {
            Visibility::Public
        };
        let (type_, name) = self.parse_type_first_name()?;
        let default = if self.match_tok("=") {
            Some(self.parse_expression(1)?)
        } else {
            None
        };
        self.match_tok(";");
        Ok(Field {
            name,
            type_: type_.unwrap_or(Type::Named("ignotum".to_string())),
            default,
            visibility,
        })
    }

    fn parse_protocol_decl(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("pactum")?;
        let name = self.expect_identifier_like()?;
        self.expect("{")?;
        let mut methods = Vec::new();
        while !self.check("}") && !self.is_eof() {
            self.expect("functio")?;
            let mname = self.expect_identifier_like()?;
            let params = self.parse_parameter_list()?;
            let return_type = if self.match_tok("->") {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.match_tok(";");
            methods.push(ProtocolMethod {
                name: mname,
                params,
                return_type,
            });
        }
        self.expect("}")?;
        Ok(Statement::ProtocolDecl(ProtocolDecl {
            name,
            methods,
            position,
        }))
    }

    fn parse_enum_decl(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("ordo")?;
        let name = self.expect_identifier_like()?;
        self.expect("{")?;
        let mut members = Vec::new();
        while !self.check("}") && !self.is_eof() {
            let mname = self.expect_identifier_like()?;
            let value = if self.match_tok("=") {
                Some(self.parse_expression(1)?)
            } else {
                None
            };
            members.push(EnumMember { name: mname, value });
            if !self.match_tok(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(Statement::EnumDecl {
            name,
            members,
            position,
        })
    }

    fn parse_union_decl(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("discretio")?;
        let name = self.expect_identifier_like()?;
        self.expect("{")?;
        let mut variants = Vec::new();
        while !self.check("}") && !self.is_eof() {
            let vname = self.expect_identifier_like()?;
            let mut fields = Vec::new();
            if self.match_tok("{") {
                while !self.check("}") && !self.is_eof() {
                    let (ty, fname) = self.parse_type_first_name()?;
                    fields.push(VariantField {
                        name: fname,
                        type_: ty.unwrap_or(Type::Named("ignotum".to_string())),
                    });
                    self.match_tok(";");
                }
                self.expect("}")?;
            }
            variants.push(VariantDecl {
                name: vname,
                fields,
            });
        }
        self.expect("}")?;
        Ok(Statement::UnionDecl {
            name,
            variants,
            position,
        })
    }

    fn parse_if(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("si")?;
        let condition = self.parse_expression(1)?;
        let then_branch = self.parse_body()?;
        let else_branch = if self.match_tok("sin") {
            // `sin` = inline else-if shorthand for `secus si …`
            Some(vec![self.parse_if()?])
        } else if self.match_tok("secus") {
            if self.check("si") {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_body()?)
            }
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            position,
        })
    }

    fn parse_while(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("dum")?;
        let condition = self.parse_expression(1)?;
        let body = self.parse_body()?;
        Ok(Statement::While {
            condition,
            body,
            position,
        })
    }

    fn parse_do_while(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("fac")?;
        let body = self.parse_body()?;
        self.expect("dum")?;
        let condition = self.parse_expression(1)?;
        Ok(Statement::DoWhile {
            body,
            condition,
            position,
        })
    }

    fn parse_for_each(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("ex")?;
        let iterable = self.parse_expression(1)?;
        let kind = match self.advance().lexeme.as_str() {
            "fixum" => VarKind::Fixum,
            "varia" => VarKind::Varia,
            _ => VarKind::Fixum,
        };
        let binding = self.expect_identifier_like()?;
        let body = self.parse_body()?;
        Ok(Statement::ForEach {
            binding,
            kind,
            iterable,
            by_key: false,
            body,
            position,
        })
    }

    fn parse_for_each_key(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("de")?;
        let iterable = self.parse_expression(1)?;
        let kind = match self.advance().lexeme.as_str() {
            "fixum" => VarKind::Fixum,
            "varia" => VarKind::Varia,
            _ => VarKind::Fixum,
        };
        let binding = self.expect_identifier_like()?;
        let body = self.parse_body()?;
        Ok(Statement::ForEach {
            binding,
            kind,
            iterable,
            by_key: true,
            body,
            position,
        })
    }

    fn parse_switch(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("elige")?;
        let discriminant = self.parse_expression(1)?;
        self.expect("{")?;
        let mut cases = Vec::new();
        let mut default = None;
        while !self.check("}") && !self.is_eof() {
            if self.match_tok("ceterum") {
                default = Some(self.parse_body()?);
                continue;
            }
            self.expect("casu")?;
            let value = self.parse_expression(1)?;
            let body = self.parse_body()?;
            cases.push(SwitchCase { value, body });
        }
        self.expect("}")?;
        Ok(Statement::Switch {
            discriminant,
            cases,
            default,
            position,
        })
    }

    fn parse_match(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("discerne")?;
        let mut discriminants = vec![self.parse_expression(1)?];
        while self.match_tok(",") {
            discriminants.push(self.parse_expression(1)?);
        }
        self.expect("{")?;
        let mut cases = Vec::new();
        while !self.check("}") && !self.is_eof() {
            cases.push(self.parse_match_case()?);
        }
        self.expect("}")?;
        Ok(Statement::Match {
            discriminants,
            cases,
            position,
        })
    }

    fn parse_match_case(&mut self) -> PResult<MatchCase> {
        let position = self.position();
        self.expect("casu")?;
        let mut patterns = vec![self.parse_case_pattern()?];
        while self.match_tok(",") {
            patterns.push(self.parse_case_pattern()?);
        }
        let body = self.parse_body()?;
        Ok(MatchCase {
            patterns,
            body,
            position,
        })
    }

    fn parse_case_pattern(&mut self) -> PResult<CasePattern> {
        if self.match_tok("_") {
            return Ok(CasePattern::Wildcard);
        }
        let name = self.expect_identifier_like()?;
        let binding = if self.match_tok("pro") || self.match_tok("fixum") {
            let mut names = vec![self.expect_identifier_like()?];
            while self.match_tok(",") {
                names.push(self.expect_identifier_like()?);
            }
            PatternBinding::Fields(names)
        } else if self.match_tok("ut") {
            PatternBinding::Alias(self.expect_identifier_like()?)
        } else {
            PatternBinding::None
        };
        Ok(CasePattern::Variant { name, binding })
    }

    fn parse_guard_chain(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("custodi")?;
        self.expect("{")?;
        let mut guards = Vec::new();
        let mut else_branch = None;
        while !self.check("}") && !self.is_eof() {
            if self.match_tok("ceterum") {
                else_branch = Some(self.parse_body()?);
                continue;
            }
            let condition = self.parse_expression(1)?;
            let body = self.parse_body()?;
            guards.push(GuardClause { condition, body });
        }
        self.expect("}")?;
        Ok(Statement::GuardChain {
            guards,
            else_branch,
            position,
        })
    }

    fn parse_try(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("tempta")?;
        let body = self.parse_block()?;
        let catch = if self.match_tok("cape") {
            let binding = self.expect_identifier_like()?;
            let cbody = self.parse_block()?;
            Some(CatchClause {
                binding,
                body: cbody,
            })
        } else {
            None
        };
        let finally = if self.match_tok("demum") {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Statement::Try {
            body,
            catch,
            finally,
            position,
        })
    }

    fn parse_return(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("redde")?;
        let value = if self.starts_expression_tok() {
            Some(self.parse_expression(1)?)
        } else {
            None
        };
        Ok(Statement::Return { value, position })
    }

    fn parse_throw(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("iace")?;
        let value = self.parse_expression(1)?;
        Ok(Statement::Throw { value, position })
    }

    fn parse_panic(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("mori")?;
        let value = self.parse_expression(1)?;
        Ok(Statement::Panic { value, position })
    }

    fn parse_print(&mut self, severity: PrintSeverity) -> PResult<Statement> {
        let position = self.position();
        self.advance();
        let value = self.parse_expression(1)?;
        Ok(Statement::Print {
            severity,
            value,
            position,
        })
    }

    fn parse_assert(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("probatio")?;
        let condition = self.parse_expression(1)?;
        let message = if self.match_tok(",") {
            Some(self.parse_expression(1)?)
        } else {
            None
        };
        Ok(Statement::Assert {
            condition,
            message,
            position,
        })
    }

    fn parse_entry(&mut self, is_async: bool) -> PResult<Statement> {
        let position = self.position();
        self.advance();
        let body = self.parse_block()?;
        Ok(Statement::Entry {
            body,
            is_async,
            position,
        })
    }

    fn parse_test_suite(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("exemplaria")?;
        let name = if self.check_kind(TokenKind::String) {
            self.advance().lexeme
        } else {
            self.expect_identifier_like()?
        };
        let body = self.parse_block()?;
        Ok(Statement::TestSuite {
            name,
            body,
            position,
        })
    }

    fn parse_test_case(&mut self) -> PResult<Statement> {
        let position = self.position();
        self.expect("exemplum")?;
        let name = if self.check_kind(TokenKind::String) {
            self.advance().lexeme
        } else {
            self.expect_identifier_like()?
        };
        let body = self.parse_block()?;
        Ok(Statement::TestCase {
            name,
            body,
            position,
        })
    }

    fn starts_expression_tok(&self) -> bool {
        !matches!(self.current().lexeme.as_str(), "}" | ";") && !self.is_eof()
    }

    fn parse_var_decl_or_expression(&mut self, _flags: DeclFlags) -> PResult<Statement> {
        let position = self.position();
        let expr = self.parse_expression(1)?;
        self.match_tok(";");
        Ok(Statement::Expression { expr, position })
    }

    // ===== expressions: Pratt parser =====

    fn binary_precedence(lexeme: &str) -> Option<u8> {
        Some(match lexeme {
            "=" | "+=" | "-=" | "*=" | "/=" => 1,
            "vel" | "??" => 2,
            "aut" | "||" => 3,
            "et" | "&&" => 4,
            "==" | "!=" | "===" | "!==" => 5,
            "<" | ">" | "<=" | ">=" | "inter" | "intra" => 6,
            "+" | "-" => 7,
            "*" | "/" | "%" => 8,
            "qua" | "innatum" | "novum" | "numeratum" | "fractatum" | "textatum" | "bivalentum" => 9,
            _ => return None,
        })
    }

    fn is_assignment_op(lexeme: &str) -> bool {
        matches!(lexeme, "=" | "+=" | "-=" | "*=" | "/=")
    }

    fn is_right_associative(lexeme: &str) -> bool {
        Self::is_assignment_op(lexeme)
    }

    pub fn parse_expression(&mut self, min_prec: u8) -> PResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            if min_prec <= 1 && self.check("sic") {
                // Outermost-only ternary: `cond sic cons secus alt`.
                self.advance();
                let consequent = self.parse_expression(2)?;
                self.expect("secus")?;
                let alternate = self.parse_expression(1)?;
                let position = left.position();
                left = Expression::Ternary {
                    condition: Box::new(left),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                    position,
                };
                continue;
            }

            let lexeme = self.current().lexeme.clone();
            let Some(prec) = Self::binary_precedence(&lexeme) else {
                break;
            };
            if prec < min_prec {
                break;
            }

            if prec == 9 {
                left = self.parse_type_postfix(left, &lexeme)?;
                continue;
            }

            self.advance();
            let next_min = if Self::is_right_associative(&lexeme) {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_expression(next_min)?;
            let position = left.position();

            left = if Self::is_assignment_op(&lexeme) {
                Expression::Assignment {
                    operator: lexeme,
                    target: Box::new(left),
                    value: Box::new(right),
                    position,
                }
            } else {
                Expression::Binary {
                    operator: lexeme,
                    left: Box::new(left),
                    right: Box::new(right),
                    position,
                }
            };
        }

        Ok(left)
    }

    fn parse_type_postfix(&mut self, operand: Expression, op: &str) -> PResult<Expression> {
        self.advance();
        let position = operand.position();
        match op {
            "qua" => {
                let type_ = self.parse_type()?;
                Ok(Expression::Cast {
                    operand: Box::new(operand),
                    type_,
                    position,
                })
            }
            "innatum" => {
                let type_ = self.parse_type()?;
                Ok(Expression::Reinterpret {
                    operand: Box::new(operand),
                    type_,
                    position,
                })
            }
            "novum" => {
                let type_ = self.parse_type()?;
                Ok(Expression::PostfixNew {
                    operand: Box::new(operand),
                    type_,
                    position,
                })
            }
            "numeratum" | "fractatum" | "textatum" | "bivalentum" => {
                let kind = match op {
                    "numeratum" => ConversionKind::Numeratum,
                    "fractatum" => ConversionKind::Fractatum,
                    "textatum" => ConversionKind::Textatum,
                    _ => ConversionKind::Bivalentum,
                };
                let fallback = if self.match_tok("vel") {
                    Some(Box::new(self.parse_expression(2)?))
                } else {
                    None
                };
                Ok(Expression::Conversion {
                    operand: Box::new(operand),
                    kind,
                    fallback,
                    position,
                })
            }
            _ => unreachable!(),
        }
    }

    fn is_unary_word_op(lexeme: &str) -> bool {
        matches!(
            lexeme,
            "non" | "nihil" | "nonnihil" | "positivum" | "negativum" | "nulla" | "nonnulla"
        )
    }

    /// Whether the token *after* the current one can open an expression —
    /// used to decide whether a word-operator like `non` is being used as
    /// a unary prefix here, rather than as a bare identifier/keyword atom.
    fn next_can_start_expression(&self) -> bool {
        let tok = self.peek_at(1);
        match tok.kind {
            TokenKind::Eof => false,
            TokenKind::Punctuator => matches!(tok.lexeme.as_str(), "(" | "["),
            TokenKind::Operator => matches!(tok.lexeme.as_str(), "-" | "!" | "~"),
            TokenKind::Keyword => matches!(
                tok.lexeme.as_str(),
                "nihil" | "verum" | "falsum" | "ego" | "novum" | "cede" | "finge" | "scriptum"
                    | "non" | "nulla" | "nonnulla" | "nonnihil" | "positivum" | "negativum"
            ),
            TokenKind::Identifier | TokenKind::Number | TokenKind::String => true,
            _ => false,
        }
    }

    fn parse_unary(&mut self) -> PResult<Expression> {
        let position = self.position();
        let lexeme = self.current().lexeme.clone();

        if matches!(lexeme.as_str(), "-" | "!" | "~") {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary {
                operator: lexeme,
                operand: Box::new(operand),
                position,
            });
        }

        if Self::is_unary_word_op(&lexeme) && self.next_can_start_expression() {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary {
                operator: lexeme,
                operand: Box::new(operand),
                position,
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            let position = expr.position();
            if self.match_tok("(") {
                let args = self.parse_call_args()?;
                expr = Expression::Call {
                    callee: Box::new(expr),
                    args,
                    position,
                };
            } else if self.check("!") && self.peek_at(1).is(".") {
                self.advance();
                self.advance();
                let property = self.expect_identifier_like()?;
                expr = Expression::Member {
                    object: Box::new(expr),
                    property,
                    computed: false,
                    computed_expr: None,
                    non_null: true,
                    position,
                };
            } else if self.check("!") && self.peek_at(1).is("[") {
                self.advance();
                self.advance();
                let index = self.parse_expression(1)?;
                self.expect("]")?;
                expr = Expression::Member {
                    object: Box::new(expr),
                    property: String::new(),
                    computed: true,
                    computed_expr: Some(Box::new(index)),
                    non_null: true,
                    position,
                };
            } else if self.match_tok(".") {
                let property = self.expect_identifier_like()?;
                expr = Expression::Member {
                    object: Box::new(expr),
                    property,
                    computed: false,
                    computed_expr: None,
                    non_null: false,
                    position,
                };
            } else if self.match_tok("[") {
                let index = self.parse_expression(1)?;
                self.expect("]")?;
                expr = Expression::Member {
                    object: Box::new(expr),
                    property: String::new(),
                    computed: true,
                    computed_expr: Some(Box::new(index)),
                    non_null: false,
                    position,
                };
            } else if self.check("usque") || self.check("ante") {
                let kind = if self.advance().lexeme == "usque" {
                    RangeKind::Inclusive
                } else {
                    RangeKind::Exclusive
                };
                let end = self.parse_expression(7)?;
                expr = Expression::Range {
                    start: Box::new(expr),
                    end: Box::new(end),
                    kind,
                    position,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expression>> {
        let mut args = Vec::new();
        while !self.check(")") {
            args.push(self.parse_expression(1)?);
            if !self.match_tok(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expression> {
        let position = self.position();
        let tok = self.current().clone();

        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let kind = if tok.lexeme.contains('.') {
                    LiteralKind::Fractional(tok.lexeme)
                } else {
                    LiteralKind::Integer(tok.lexeme)
                };
                return Ok(Expression::Literal { kind, position });
            }
            TokenKind::String => {
                self.advance();
                return Ok(Expression::Literal {
                    kind: LiteralKind::String(tok.lexeme),
                    position,
                });
            }
            _ => {}
        }

        match tok.lexeme.as_str() {
            "(" => {
                self.advance();
                let expr = self.parse_expression(1)?;
                self.expect(")")?;
                Ok(expr)
            }
            "[" => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check("]") {
                    elements.push(self.parse_expression(1)?);
                    if !self.match_tok(",") {
                        break;
                    }
                }
                self.expect("]")?;
                Ok(Expression::ArrayLiteral { elements, position })
            }
            "{" => self.parse_object_literal(),
            "ego" => {
                self.advance();
                Ok(Expression::SelfRef { position })
            }
            "nihil" => {
                self.advance();
                Ok(Expression::Literal {
                    kind: LiteralKind::Null,
                    position,
                })
            }
            "verum" => {
                self.advance();
                Ok(Expression::Literal {
                    kind: LiteralKind::True,
                    position,
                })
            }
            "falsum" => {
                self.advance();
                Ok(Expression::Literal {
                    kind: LiteralKind::False,
                    position,
                })
            }
            "cede" => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expression::Suspend {
                    operand: Box::new(operand),
                    position,
                })
            }
            "novum" => self.parse_new(),
            "finge" => self.parse_variant_construct(),
            "scriptum" => self.parse_template_string(),
            _ if matches!(tok.kind, TokenKind::Identifier | TokenKind::Keyword) => {
                if self.peek_lambda_params() {
                    return self.parse_lambda();
                }
                self.advance();
                Ok(Expression::Identifier {
                    name: tok.lexeme,
                    position,
                })
            }
            _ => Err(self.err_expected("expression")),
        }
    }

    /// A single-parameter lambda is `name -> body`; look ahead for the
    /// `->` that would otherwise be ambiguous with a bare identifier.
    fn peek_lambda_params(&self) -> bool {
        self.peek_at(1).is("->")
    }

    fn parse_lambda(&mut self) -> PResult<Expression> {
        let position = self.position();
        let name = self.expect_identifier_like()?;
        self.expect("->")?;
        let params = vec![Parameter {
            name,
            type_: None,
            default: None,
            rest: false,
            optional: false,
            ownership: None,
        }];
        let body = self.parse_lambda_body()?;
        Ok(Expression::Lambda {
            params,
            body,
            position,
        })
    }

    fn parse_lambda_body(&mut self) -> PResult<LambdaBody> {
        if self.check("{") {
            Ok(LambdaBody::Block(self.parse_block()?))
        } else {
            Ok(LambdaBody::Expression(Box::new(self.parse_expression(2)?)))
        }
    }

    fn parse_object_literal(&mut self) -> PResult<Expression> {
        let position = self.position();
        self.expect("{")?;
        let mut properties = Vec::new();
        while !self.check("}") {
            if self.match_tok("[") {
                let key = self.parse_expression(1)?;
                self.expect("]")?;
                self.expect(":")?;
                let value = self.parse_expression(1)?;
                properties.push(ObjectProperty::Computed { key, value });
            } else {
                let name = self.expect_identifier_like()?;
                if self.match_tok(":") {
                    let value = self.parse_expression(1)?;
                    properties.push(ObjectProperty::KeyValue { key: name, value });
                } else {
                    properties.push(ObjectProperty::Shorthand { name });
                }
            }
            if !self.match_tok(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(Expression::ObjectLiteral {
            properties,
            position,
        })
    }

    fn parse_new(&mut self) -> PResult<Expression> {
        let position = self.position();
        self.expect("novum")?;
        let type_ = self.parse_type()?;
        self.expect("(")?;
        let args = self.parse_call_args()?;
        let initializer = if self.check("{") {
            let obj = self.parse_object_literal()?;
            match obj {
                Expression::ObjectLiteral { properties, .. } => {
                    Some(ObjectInitializer { properties })
                }
                _ => None,
            }
        } else {
            None
        };
        Ok(Expression::New {
            type_,
            args,
            initializer,
            position,
        })
    }

    fn parse_variant_construct(&mut self) -> PResult<Expression> {
        let position = self.position();
        self.expect("finge")?;
        let first = self.expect_identifier_like()?;
        let (enclosing_type, variant) = if self.match_tok(".") {
            (Some(first), self.expect_identifier_like()?)
        } else {
            (None, first)
        };
        self.expect("{")?;
        let mut fields = Vec::new();
        while !self.check("}") {
            let name = self.expect_identifier_like()?;
            self.expect(":")?;
            let value = self.parse_expression(1)?;
            fields.push((name, value));
            if !self.match_tok(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(Expression::VariantConstruct {
            enclosing_type,
            variant,
            fields,
            position,
        })
    }

    fn parse_template_string(&mut self) -> PResult<Expression> {
        let position = self.position();
        self.expect("scriptum")?;
        self.expect("(")?;
        let template_tok = if self.check_kind(TokenKind::String) {
            self.advance()
        } else {
            return Err(self.err_expected("string literal"));
        };
        let mut args = Vec::new();
        while self.match_tok(",") {
            args.push(self.parse_expression(1)?);
        }
        self.expect(")")?;

        let parts = Self::split_template_parts(&template_tok.lexeme);
        Ok(Expression::Template {
            parts,
            args,
            position,
        })
    }

    fn split_template_parts(text: &str) -> Vec<TemplatePart> {
        let mut parts = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let mut buf = String::new();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '§' {
                if !buf.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut buf)));
                }
                let mut digits = String::new();
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_ascii_digit() {
                    digits.push(chars[j]);
                    j += 1;
                }
                if digits.is_empty() {
                    parts.push(TemplatePart::Positional);
                    i += 1;
                } else {
                    let idx: usize = digits.parse().unwrap_or(0);
                    parts.push(TemplatePart::Indexed(idx));
                    i = j;
                }
            } else {
                buf.push(chars[i]);
                i += 1;
            }
        }
        if !buf.is_empty() {
            parts.push(TemplatePart::Text(buf));
        }
        parts
    }
}

pub fn parse(tokens: Vec<Token>, filename: Option<&str>) -> PResult<Module> {
    Parser::new(tokens, filename).parse_module()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{lex, prepare};

    fn parse_src(src: &str) -> Module {
        let tokens = prepare(lex(src, None).unwrap());
        parse(tokens, None).unwrap()
    }

    #[test]
    fn parses_type_first_declaration() {
        let module = parse_src("fixum numerus count = 0");
        match &module.statements[0] {
            Statement::VarDecl {
                kind, name, type_, ..
            } => {
                assert_eq!(*kind, VarKind::Fixum);
                assert_eq!(name, "count");
                assert_eq!(*type_, Some(Type::Named("numerus".to_string())));
            }
            other => panic!("expected VarDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_name_only_declaration() {
        let module = parse_src("fixum count = 0");
        match &module.statements[0] {
            Statement::VarDecl { name, type_, .. } => {
                assert_eq!(name, "count");
                assert_eq!(*type_, None);
            }
            other => panic!("expected VarDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_nullable_prefix_type() {
        let module = parse_src("varia si numerus x = nihil");
        match &module.statements[0] {
            Statement::VarDecl { type_, value, .. } => {
                assert_eq!(
                    *type_,
                    Some(Type::Nullable(Box::new(Type::Named("numerus".to_string()))))
                );
                assert!(matches!(
                    value,
                    Some(Expression::Literal {
                        kind: LiteralKind::Null,
                        ..
                    })
                ));
            }
            other => panic!("expected VarDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_generic_declaration() {
        let module = parse_src("fixum lista<textus> names = []");
        match &module.statements[0] {
            Statement::VarDecl { type_, .. } => {
                assert_eq!(
                    *type_,
                    Some(Type::Generic("lista".to_string(), vec![Type::Named("textus".to_string())]))
                );
            }
            other => panic!("expected VarDecl, got {other:?}"),
        }
    }

    #[test]
    fn ternary_binds_at_outermost_level_only() {
        let module = parse_src("fixum x = a sic b secus c");
        match &module.statements[0] {
            Statement::VarDecl {
                value: Some(Expression::Ternary { .. }),
                ..
            } => {}
            other => panic!("expected ternary, got {other:?}"),
        }
    }

    #[test]
    fn parses_discriminated_union_and_match() {
        let src = r#"
            discretio Forma { Circulus { fractus radius } Quadratus { fractus latus } }
            functio area(Forma f) -> fractus {
                discerne f { casu Circulus fixum radius { redde radius * radius * 3.14 }
                             casu Quadratus fixum latus { redde latus * latus } }
            }
        "#;
        let module = parse_src(src);
        assert!(matches!(module.statements[0], Statement::UnionDecl { .. }));
        match &module.statements[1] {
            Statement::FunctionDecl(f) => {
                let body = f.body.as_ref().unwrap();
                assert!(matches!(body[0], Statement::Match { .. }));
            }
            other => panic!("expected FunctionDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_test_suite_containing_test_cases() {
        let src = r#"
            exemplaria "addition" {
                exemplum "adds two numbers" { probatio 1 + 1 == 2 }
            }
        "#;
        let module = parse_src(src);
        match &module.statements[0] {
            Statement::TestSuite { name, body, .. } => {
                assert_eq!(name, "addition");
                assert!(matches!(body[0], Statement::TestCase { .. }));
            }
            other => panic!("expected TestSuite, got {other:?}"),
        }
    }

    #[test]
    fn parses_try_catch_finally_and_panic() {
        let src = r#"
            tempta { iace "bad" } cape e { scribe e } demum { scribe "done" }
            mori "fatal"
        "#;
        let module = parse_src(src);
        assert!(matches!(module.statements[0], Statement::Try { .. }));
        assert!(matches!(module.statements[1], Statement::Panic { .. }));
    }

    #[test]
    fn parses_template_interpolation() {
        let module = parse_src(r#"scribe scriptum("hi §, you are §", name, age)"#);
        match &module.statements[0] {
            Statement::Print {
                value: Expression::Template { parts, args, .. },
                ..
            } => {
                assert_eq!(args.len(), 2);
                assert_eq!(
                    *parts,
                    vec![
                        TemplatePart::Text("hi ".to_string()),
                        TemplatePart::Positional,
                        TemplatePart::Text(", you are ".to_string()),
                        TemplatePart::Positional,
                    ]
                );
            }
            other => panic!("expected templated print, got {other:?}"),
        }
    }

    #[test]
    fn parses_null_coalesce() {
        let module = parse_src("scribe x vel 0");
        match &module.statements[0] {
            Statement::Print {
                value: Expression::Binary { operator, .. },
                ..
            } => assert_eq!(operator, "vel"),
            other => panic!("expected binary vel, got {other:?}"),
        }
    }

    #[test]
    fn unexpected_token_is_fatal_with_position() {
        let tokens = prepare(lex("fixum = 1", None).unwrap());
        let err = parse(tokens, None).unwrap_err();
        assert!(matches!(err, CompileError::Syntactic { .. }));
    }
}
