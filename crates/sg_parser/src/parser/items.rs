//! Top-level items.

use sg_ast::{
    EnumDecl, EnumVariant, Field, FnDecl, Item, ItemKind, Param, RecordDecl, TypeName, Typedef,
};
use sg_lexer::Token;

use super::{join, PResult, Parser};

impl Parser<'_> {
    pub(super) fn parse_item(&mut self) -> PResult<Item> {
        let start = self.span();
        let kind = match self.peek() {
            Some(Token::Directive(text)) => {
                let text = text.clone();
                self.pos += 1;
                ItemKind::Directive(text)
            }
            Some(Token::Typedef) => ItemKind::Typedef(self.parse_typedef()?),
            Some(Token::Enum)
                if matches!(self.peek_at(1), Some(Token::Ident(_)))
                    && self.peek_at(2) == Some(&Token::LBrace) =>
            {
                ItemKind::Enum(self.parse_enum()?)
            }
            Some(Token::Struct | Token::Union)
                if matches!(self.peek_at(1), Some(Token::Ident(_)))
                    && matches!(self.peek_at(2), Some(Token::LBrace | Token::Semi)) =>
            {
                let is_union = self.check(&Token::Union);
                let record = self.parse_record()?;
                if is_union {
                    ItemKind::Union(record)
                } else {
                    ItemKind::Struct(record)
                }
            }
            _ => self.parse_function_or_global()?,
        };
        Ok(Item {
            kind,
            span: join(start, self.prev_span()),
        })
    }

    fn parse_typedef(&mut self) -> PResult<Typedef> {
        self.expect(&Token::Typedef)?;
        let base = self.parse_type_specifier()?;
        let (ty, name) = self.parse_declarator(&base)?;
        self.expect(&Token::Semi)?;
        self.typedefs.insert(name.name.clone());
        Ok(Typedef { ty, name })
    }

    /// `enum Name { A, B = 2 };` or, with tagged enums enabled,
    /// `enum Name { Ok(int), Err(char *), Empty };`
    fn parse_enum(&mut self) -> PResult<EnumDecl> {
        self.expect(&Token::Enum)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;

        let mut variants = Vec::new();
        while !self.check(&Token::RBrace) {
            let vname = self.expect_ident()?;
            let payload = if self.syntax.adt && self.eat(&Token::LParen) {
                let ty = self.parse_type_name()?;
                self.expect(&Token::RParen)?;
                Some(ty)
            } else {
                None
            };
            let value = if self.eat(&Token::Eq) {
                Some(self.parse_ternary()?)
            } else {
                None
            };
            variants.push(EnumVariant {
                name: vname,
                payload,
                value,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        self.expect(&Token::Semi)?;
        Ok(EnumDecl { name, variants })
    }

    fn parse_record(&mut self) -> PResult<RecordDecl> {
        self.advance();
        let name = self.expect_ident()?;
        if self.eat(&Token::Semi) {
            return Ok(RecordDecl { name, fields: None });
        }

        self.expect(&Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) {
            let base = self.parse_type_specifier()?;
            loop {
                let (ty, fname) = self.parse_declarator(&base)?;
                fields.push(Field { ty, name: fname });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::Semi)?;
        }
        self.expect(&Token::RBrace)?;
        self.expect(&Token::Semi)?;
        Ok(RecordDecl {
            name,
            fields: Some(fields),
        })
    }

    fn parse_function_or_global(&mut self) -> PResult<ItemKind> {
        let base = self.parse_type_specifier()?;
        let (ty, name) = self.parse_declarator(&base)?;

        if !self.check(&Token::LParen) {
            let decls = self.parse_declaration_rest(&base, (ty, name))?;
            return Ok(ItemKind::Global(decls));
        }

        let (params, variadic) = self.parse_params()?;
        let body = if self.eat(&Token::Semi) {
            None
        } else {
            Some(self.parse_block()?)
        };
        Ok(ItemKind::Function(FnDecl {
            ret: ty,
            name,
            params,
            variadic,
            body,
        }))
    }

    fn parse_params(&mut self) -> PResult<(Vec<Param>, bool)> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        let mut variadic = false;

        while !self.check(&Token::RParen) {
            if self.eat(&Token::Ellipsis) {
                variadic = true;
                break;
            }
            let mut ty: TypeName = self.parse_type_specifier()?;
            ty.pointers = self.parse_pointers()?;
            let name = match self.peek() {
                Some(Token::Ident(_)) => Some(self.expect_ident()?),
                _ => None,
            };
            ty.array = self.parse_array_dims()?;
            params.push(Param { ty, name });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok((params, variadic))
    }
}
