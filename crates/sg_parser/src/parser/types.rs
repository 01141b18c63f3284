//! Type specifiers and declarators.

use sg_ast::{BaseType, Expr, ExprKind, Ident, Initializer, TypeName, VarDecl};
use sg_lexer::Token;

use super::{join, PResult, Parser};
use crate::parse::ParseError;

const TYPE_WORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
];

const QUALIFIERS: &[&str] = &[
    "const", "volatile", "static", "extern", "inline", "register", "restrict", "auto",
];

impl Parser<'_> {
    /// Whether the token `n` ahead can begin a type name.
    pub(super) fn starts_type_at(&self, n: usize) -> bool {
        match self.peek_at(n) {
            Some(Token::Struct | Token::Union | Token::Enum) => true,
            Some(Token::Ident(name)) => {
                TYPE_WORDS.contains(&name.as_str())
                    || QUALIFIERS.contains(&name.as_str())
                    || self.typedefs.contains(name)
            }
            _ => false,
        }
    }

    pub(super) fn starts_type(&self) -> bool {
        self.starts_type_at(0)
    }

    /// Qualifiers plus base type, without any declarator parts.
    pub(super) fn parse_type_specifier(&mut self) -> PResult<TypeName> {
        let start = self.span();
        let mut qualifiers = Vec::new();
        let mut words: Vec<String> = Vec::new();
        let mut base = None;

        loop {
            match self.peek() {
                Some(Token::Ident(name)) if QUALIFIERS.contains(&name.as_str()) => {
                    qualifiers.push(name.clone());
                    self.pos += 1;
                }
                Some(Token::Ident(name))
                    if base.is_none() && TYPE_WORDS.contains(&name.as_str()) =>
                {
                    words.push(name.clone());
                    self.pos += 1;
                }
                Some(Token::Ident(name))
                    if base.is_none() && words.is_empty() && self.typedefs.contains(name) =>
                {
                    base = Some(BaseType::Named(name.clone()));
                    self.pos += 1;
                }
                Some(tok @ (Token::Struct | Token::Union | Token::Enum))
                    if base.is_none() && words.is_empty() =>
                {
                    let tag = tok.clone();
                    self.pos += 1;
                    let name = self.expect_ident()?.name;
                    base = Some(match tag {
                        Token::Struct => BaseType::Struct(name),
                        Token::Union => BaseType::Union(name),
                        _ => BaseType::Enum(name),
                    });
                }
                _ => break,
            }
        }

        let base = match base {
            Some(base) => base,
            None if !words.is_empty() => BaseType::Builtin(words.join(" ")),
            None => {
                return Err(ParseError::new(
                    "expected a type",
                    join(start, self.span()),
                ))
            }
        };

        Ok(TypeName {
            qualifiers,
            base,
            pointers: 0,
            array: Vec::new(),
        })
    }

    pub(super) fn parse_pointers(&mut self) -> PResult<u8> {
        let mut pointers = 0u8;
        while self.eat(&Token::Star) {
            if self
                .peek()
                .is_some_and(|t| matches!(t, Token::Ident(q) if QUALIFIERS.contains(&q.as_str())))
            {
                return Err(ParseError::new(
                    "qualifiers after `*` are not supported",
                    self.span(),
                ));
            }
            pointers += 1;
        }
        Ok(pointers)
    }

    pub(super) fn parse_array_dims(&mut self) -> PResult<Vec<Option<String>>> {
        let mut dims = Vec::new();
        while self.eat(&Token::LBracket) {
            if self.eat(&Token::RBracket) {
                dims.push(None);
                continue;
            }
            let dim = match self.peek() {
                Some(Token::Int(s) | Token::Ident(s)) => s.clone(),
                _ => return Err(self.unexpected("an array length literal or name")),
            };
            self.pos += 1;
            self.expect(&Token::RBracket)?;
            dims.push(Some(dim));
        }
        Ok(dims)
    }

    /// A type with no declared name: casts, `sizeof`, variant payloads.
    pub(super) fn parse_type_name(&mut self) -> PResult<TypeName> {
        let mut ty = self.parse_type_specifier()?;
        ty.pointers = self.parse_pointers()?;
        ty.array = self.parse_array_dims()?;
        Ok(ty)
    }

    /// `*name[dims]` after a specifier, yielding the full type and the name.
    pub(super) fn parse_declarator(&mut self, base: &TypeName) -> PResult<(TypeName, Ident)> {
        let mut ty = base.clone();
        ty.pointers = self.parse_pointers()?;
        if self.check(&Token::LParen) {
            return Err(ParseError::new(
                "function pointer declarators are not supported",
                self.span(),
            ));
        }
        let name = self.expect_ident()?;
        ty.array = self.parse_array_dims()?;
        Ok((ty, name))
    }

    /// The remainder of a declaration once the first declarator is known:
    /// optional initializer, further `, declarator = init` pairs, and `;`.
    pub(super) fn parse_declaration_rest(
        &mut self,
        base: &TypeName,
        first: (TypeName, Ident),
    ) -> PResult<Vec<VarDecl>> {
        let mut decls = Vec::new();
        let (ty, name) = first;
        let init = self.parse_optional_init()?;
        decls.push(VarDecl { ty, name, init });

        while self.eat(&Token::Comma) {
            let (ty, name) = self.parse_declarator(base)?;
            let init = self.parse_optional_init()?;
            decls.push(VarDecl { ty, name, init });
        }
        self.expect(&Token::Semi)?;
        Ok(decls)
    }

    /// A full declaration statement: specifier, declarators, `;`.
    pub(super) fn parse_declaration(&mut self) -> PResult<Vec<VarDecl>> {
        let base = self.parse_type_specifier()?;
        let first = self.parse_declarator(&base)?;
        self.parse_declaration_rest(&base, first)
    }

    fn parse_optional_init(&mut self) -> PResult<Option<Expr>> {
        if self.eat(&Token::Eq) {
            Ok(Some(self.parse_initializer()?))
        } else {
            Ok(None)
        }
    }

    /// An assignment expression or a brace initializer list.
    pub(super) fn parse_initializer(&mut self) -> PResult<Expr> {
        if self.check(&Token::LBrace) {
            let start = self.span();
            let inits = self.parse_init_list()?;
            Ok(Expr::new(
                ExprKind::InitList(inits),
                join(start, self.prev_span()),
            ))
        } else {
            self.parse_assign()
        }
    }

    /// `{ .field = value, value, ... }`
    pub(super) fn parse_init_list(&mut self) -> PResult<Vec<Initializer>> {
        self.expect(&Token::LBrace)?;
        let mut inits = Vec::new();
        while !self.check(&Token::RBrace) {
            let field = if self.eat(&Token::Dot) {
                let name = self.expect_ident()?.name;
                self.expect(&Token::Eq)?;
                Some(name)
            } else {
                None
            };
            let value = self.parse_initializer()?;
            inits.push(Initializer { field, value });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        Ok(inits)
    }
}
