//! Variant registry: the single source of truth for tagged-enum layout.
//!
//! Every algebraic `enum` in the program is resolved into a [`VariantType`]:
//! ordered variants with discriminants `0..N`, payload slots shared between
//! variants whose payload types are identical, and a tag wide enough for the
//! variant count.

use std::collections::{HashMap, HashSet};

use sg_ast::{
    BaseType, EnumDecl, Field, Ident, Item, ItemKind, Program, RecordDecl, TypeName,
};
use swc_common::Span;

use crate::error::{LowerError, LowerErrorKind, LowerResult};

/// Discriminant field of every lowered tagged enum.
pub const TAG_FIELD: &str = "tag";
/// Union field holding the payload slots.
pub const PAYLOAD_FIELD: &str = "payload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagWidth {
    U8,
    U16,
    U32,
}

impl TagWidth {
    pub fn for_count(count: usize) -> Self {
        if count <= 1 << 8 {
            TagWidth::U8
        } else if count <= 1 << 16 {
            TagWidth::U16
        } else {
            TagWidth::U32
        }
    }

    pub fn c_type(self) -> &'static str {
        match self {
            TagWidth::U8 => "unsigned char",
            TagWidth::U16 => "unsigned short",
            TagWidth::U32 => "unsigned int",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub discriminant: u32,
    pub payload: Option<TypeName>,
    /// Index into [`VariantType::slots`]; `None` for unit variants.
    pub slot: Option<usize>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadSlot {
    pub field: String,
    pub ty: TypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantType {
    pub name: String,
    pub variants: Vec<Variant>,
    pub slots: Vec<PayloadSlot>,
    pub tag: TagWidth,
    pub span: Span,
}

impl VariantType {
    fn from_decl(decl: &EnumDecl) -> LowerResult<Self> {
        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(decl.variants.len());
        let mut slots: Vec<PayloadSlot> = Vec::new();

        for (discriminant, v) in decl.variants.iter().enumerate() {
            if !seen.insert(v.name.name.as_str()) {
                return Err(LowerError::new(
                    LowerErrorKind::DuplicateVariant,
                    v.name.span,
                    format!(
                        "variant `{}` is declared twice in `{}`",
                        v.name.name, decl.name.name
                    ),
                ));
            }
            if v.value.is_some() {
                tracing::warn!(
                    variant = %v.name.name,
                    "explicit value on a tagged enum variant is ignored"
                );
            }

            // Reuse a slot only on an exact type match; otherwise open a new
            // one in first-seen order.
            let slot = v.payload.as_ref().map(|ty| {
                slots.iter().position(|s| s.ty == *ty).unwrap_or_else(|| {
                    slots.push(PayloadSlot {
                        field: format!("s{}", slots.len()),
                        ty: ty.clone(),
                    });
                    slots.len() - 1
                })
            });

            variants.push(Variant {
                name: v.name.name.clone(),
                discriminant: discriminant as u32,
                payload: v.payload.clone(),
                slot,
                span: v.name.span,
            });
        }

        Ok(Self {
            name: decl.name.name.clone(),
            tag: TagWidth::for_count(variants.len()),
            variants,
            slots,
            span: decl.name.span,
        })
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn slot(&self, variant: &Variant) -> Option<&PayloadSlot> {
        variant.slot.and_then(|i| self.slots.get(i))
    }

    /// `struct Name`, the type a value of this enum has after lowering.
    pub fn struct_type(&self) -> TypeName {
        TypeName::record(&self.name)
    }

    pub fn union_name(&self) -> String {
        format!("{}_payload", self.name)
    }

    /// The two declarations replacing the enum:
    ///
    /// ```c
    /// union Name_payload { int s0; char *s1; };
    /// struct Name { unsigned char tag; union Name_payload payload; };
    /// ```
    pub fn layout(&self, span: Span) -> Vec<Item> {
        let union_name = self.union_name();
        let slots = self
            .slots
            .iter()
            .map(|slot| Field {
                ty: slot.ty.clone(),
                name: Ident::new(slot.field.clone(), span),
            })
            .collect();

        let fields = vec![
            Field {
                ty: TypeName::builtin(self.tag.c_type()),
                name: Ident::new(TAG_FIELD, span),
            },
            Field {
                ty: TypeName::new(BaseType::Union(union_name.clone())),
                name: Ident::new(PAYLOAD_FIELD, span),
            },
        ];

        vec![
            Item {
                kind: ItemKind::Union(RecordDecl {
                    name: Ident::new(union_name, span),
                    fields: Some(slots),
                }),
                span,
            },
            Item {
                kind: ItemKind::Struct(RecordDecl {
                    name: Ident::new(self.name.clone(), span),
                    fields: Some(fields),
                }),
                span,
            },
        ]
    }
}

#[derive(Debug, Default)]
pub struct VariantRegistry {
    types: HashMap<String, VariantType>,
}

impl VariantRegistry {
    /// Register every algebraic enum of the program. Classic enums stay
    /// plain C and are not registered.
    pub fn build(program: &Program) -> LowerResult<Self> {
        let mut registry = Self::default();
        for item in &program.items {
            let ItemKind::Enum(decl) = &item.kind else {
                continue;
            };
            if !decl.is_algebraic() {
                continue;
            }
            if registry.types.contains_key(&decl.name.name) {
                return Err(LowerError::new(
                    LowerErrorKind::DuplicateVariant,
                    decl.name.span,
                    format!("tagged enum `{}` is declared twice", decl.name.name),
                ));
            }
            let vt = VariantType::from_decl(decl)?;
            tracing::debug!(
                name = %vt.name,
                variants = vt.variants.len(),
                slots = vt.slots.len(),
                "registered tagged enum"
            );
            registry.types.insert(vt.name.clone(), vt);
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&VariantType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look up `ty::variant`, failing with `UnknownVariant` when either half
    /// is undeclared.
    pub fn resolve(&self, ty: &Ident, variant: &Ident) -> LowerResult<(&VariantType, &Variant)> {
        let span = Span::new(ty.span.lo, variant.span.hi);
        let vt = self
            .get(&ty.name)
            .ok_or_else(|| LowerError::unknown_variant(&ty.name, &variant.name, span))?;
        let v = vt
            .variant(&variant.name)
            .ok_or_else(|| LowerError::unknown_variant(&ty.name, &variant.name, span))?;
        Ok((vt, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sg_ast::SyntaxFlags;
    use swc_common::DUMMY_SP;

    fn registry(src: &str) -> LowerResult<VariantRegistry> {
        let parsed = sg_parser::parse_program(src, "test.c", &SyntaxFlags::default()).unwrap();
        VariantRegistry::build(&parsed.program)
    }

    #[test]
    fn discriminants_follow_declaration_order() {
        let reg = registry("enum Shape { Circle(int), Square(int), Empty };").unwrap();
        let vt = reg.get("Shape").unwrap();
        let tags: Vec<_> = vt
            .variants
            .iter()
            .map(|v| (v.name.as_str(), v.discriminant))
            .collect();
        assert_eq!(tags, vec![("Circle", 0), ("Square", 1), ("Empty", 2)]);
        assert_eq!(vt.tag, TagWidth::U8);
    }

    #[test]
    fn identical_payloads_share_a_slot() {
        let reg = registry("enum R { A(int), B(char *), C(int), D(const int), E };").unwrap();
        let vt = reg.get("R").unwrap();
        let slots: Vec<_> = vt.variants.iter().map(|v| v.slot).collect();
        assert_eq!(slots, vec![Some(0), Some(1), Some(0), Some(2), None]);
        assert_eq!(vt.slots.len(), 3);
        assert_eq!(vt.slots[1].field, "s1");
    }

    #[test]
    fn classic_enums_are_not_registered() {
        let reg = registry("enum Color { Red, Green };").unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn duplicate_variant_is_rejected() {
        let err = registry("enum R { Ok(int), Ok(char) };").unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::DuplicateVariant);
    }

    #[test]
    fn redeclared_type_is_rejected() {
        let err = registry("enum R { Ok(int) }; enum R { Err(int) };").unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::DuplicateVariant);
    }

    #[test]
    fn resolve_reports_unknown_pairs() {
        let reg = registry("enum R { Ok(int) };").unwrap();
        let ty = Ident::new("R", DUMMY_SP);
        assert!(reg.resolve(&ty, &Ident::new("Ok", DUMMY_SP)).is_ok());
        let err = reg.resolve(&ty, &Ident::new("Err", DUMMY_SP)).unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::UnknownVariant);
        let err = reg
            .resolve(&Ident::new("Q", DUMMY_SP), &Ident::new("Ok", DUMMY_SP))
            .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::UnknownVariant);
    }

    #[test]
    fn tag_width_grows_with_variant_count() {
        assert_eq!(TagWidth::for_count(2), TagWidth::U8);
        assert_eq!(TagWidth::for_count(256), TagWidth::U8);
        assert_eq!(TagWidth::for_count(257), TagWidth::U16);
        assert_eq!(TagWidth::for_count(70_000), TagWidth::U32);
    }

    #[test]
    fn layout_emits_union_then_struct() {
        let reg = registry("enum R { Ok(int), Err(char *) };").unwrap();
        let items = reg.get("R").unwrap().layout(DUMMY_SP);
        assert!(matches!(&items[0].kind, ItemKind::Union(u) if u.name.name == "R_payload"));
        let ItemKind::Struct(s) = &items[1].kind else {
            panic!("expected struct");
        };
        let names: Vec<_> = s
            .fields
            .as_ref()
            .unwrap()
            .iter()
            .map(|f| f.name.name.as_str())
            .collect();
        assert_eq!(names, vec!["tag", "payload"]);
    }
}
