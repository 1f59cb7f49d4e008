//! Concrete SSA value types.
//!
//! Every SSA value has a type described by a [`ValueType`]: either a scalar
//! (integer, float or boolean) or a SIMD vector of scalar lanes. Types are
//! registered by name in a [`TypeRegistry`] owned by the catalog.
//!
//! # Numbering
//!
//! Scalars are numbered from 1 in declaration order (0 is reserved for
//! `VOID`), and the number must fit in a 4-bit nibble. A vector type with
//! `2^k` lanes gets `16 * k + base.number`, so the lane count occupies the
//! high nibble of the type ID.

use crate::core::{MetaError, MetaResult};
use hashbrown::HashMap;
use std::fmt;
use std::rc::Rc;

/// Largest scalar type number; the type-ID low nibble must hold it.
pub const MAX_SCALAR_NUMBER: usize = 15;

/// Largest `log2(lanes)` that still fits the type-ID high nibble.
pub const MAX_LANES_LOG2: u32 = 15;

/// Scalar type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Float,
    Bool,
}

impl ScalarKind {
    fn prefix(self) -> char {
        match self {
            ScalarKind::Int => 'i',
            ScalarKind::Float => 'f',
            ScalarKind::Bool => 'b',
        }
    }
}

/// A concrete scalar (not vector) type.
#[derive(Debug)]
pub struct ScalarType {
    name: String,
    kind: ScalarKind,
    bits: u32,
    membytes: u32,
    doc: String,
    number: u8,
}

impl ScalarType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn membytes(&self) -> u32 {
        self.membytes
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Sequential number in `1..=15`.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Path of the generated constant, e.g. `types::I32`.
    pub fn rust_name(&self) -> String {
        format!("types::{}", self.name.to_uppercase())
    }
}

/// A concrete SIMD vector type.
#[derive(Debug)]
pub struct VectorType {
    name: String,
    base: Rc<ScalarType>,
    lanes: u32,
    membytes: u32,
    doc: String,
    number: u8,
}

impl VectorType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lane type.
    pub fn base(&self) -> &Rc<ScalarType> {
        &self.base
    }

    pub fn lanes(&self) -> u32 {
        self.lanes
    }

    pub fn membytes(&self) -> u32 {
        self.membytes
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn number(&self) -> u8 {
        self.number
    }
}

/// A concrete SSA value type handle.
///
/// Handles compare by identity: two handles are equal only if they refer to
/// the same registered type.
#[derive(Debug, Clone)]
pub enum ValueType {
    Scalar(Rc<ScalarType>),
    Vector(Rc<VectorType>),
}

impl ValueType {
    pub fn name(&self) -> &str {
        match self {
            ValueType::Scalar(s) => s.name(),
            ValueType::Vector(v) => v.name(),
        }
    }

    pub fn membytes(&self) -> u32 {
        match self {
            ValueType::Scalar(s) => s.membytes(),
            ValueType::Vector(v) => v.membytes(),
        }
    }

    pub fn doc(&self) -> &str {
        match self {
            ValueType::Scalar(s) => s.doc(),
            ValueType::Vector(v) => v.doc(),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            ValueType::Scalar(s) => s.number(),
            ValueType::Vector(v) => v.number(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Rc<ScalarType>> {
        match self {
            ValueType::Scalar(s) => Some(s),
            ValueType::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Rc<VectorType>> {
        match self {
            ValueType::Scalar(_) => None,
            ValueType::Vector(v) => Some(v),
        }
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueType::Scalar(a), ValueType::Scalar(b)) => Rc::ptr_eq(a, b),
            (ValueType::Vector(a), ValueType::Vector(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for ValueType {}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name registry for all value types of a catalog.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_name: HashMap<String, ValueType>,
    scalars: Vec<Rc<ScalarType>>,
    vectors: HashMap<(u8, u32), Rc<VectorType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an integer type `i{bits}`.
    pub fn int(&mut self, bits: u32) -> MetaResult<ValueType> {
        let doc = format!("An integer type with {} bits.", bits);
        self.scalar(ScalarKind::Int, bits, doc)
    }

    /// Declare a floating point type `f{bits}`.
    pub fn float(&mut self, bits: u32, doc: &str) -> MetaResult<ValueType> {
        self.scalar(ScalarKind::Float, bits, doc.to_string())
    }

    /// Declare a boolean type `b{bits}`.
    pub fn bool(&mut self, bits: u32) -> MetaResult<ValueType> {
        let doc = format!("A boolean type with {} bits.", bits);
        self.scalar(ScalarKind::Bool, bits, doc)
    }

    fn scalar(&mut self, kind: ScalarKind, bits: u32, doc: String) -> MetaResult<ValueType> {
        let name = format!("{}{}", kind.prefix(), bits);
        if bits == 0 {
            return Err(MetaError::InvalidType {
                reason: format!("{} must have a positive number of bits", name),
            });
        }
        if self.by_name.contains_key(&name) {
            return Err(MetaError::DuplicateTypeName { name });
        }

        let number = self.scalars.len() + 1;
        if number > MAX_SCALAR_NUMBER {
            return Err(MetaError::TooManyScalarTypes { name, number });
        }

        let scalar = Rc::new(ScalarType {
            name: name.clone(),
            kind,
            bits,
            membytes: bits / 8,
            doc,
            number: number as u8,
        });
        log::debug!("scalar type {} = #{}", name, number);
        self.scalars.push(scalar.clone());
        let ty = ValueType::Scalar(scalar);
        self.by_name.insert(name, ty.clone());
        Ok(ty)
    }

    /// Get the vector type with `lanes` lanes of `base`.
    ///
    /// Repeated requests for the same `(base, lanes)` return the same type.
    pub fn vector(&mut self, base: &ValueType, lanes: u32) -> MetaResult<ValueType> {
        let base = match base {
            ValueType::Scalar(s) => s.clone(),
            ValueType::Vector(v) => {
                return Err(MetaError::InvalidType {
                    reason: format!("SIMD lanes must be scalar types, got {}", v.name()),
                })
            }
        };

        if let Some(existing) = self.vectors.get(&(base.number(), lanes)) {
            return Ok(ValueType::Vector(existing.clone()));
        }

        if lanes < 2 || !lanes.is_power_of_two() {
            return Err(MetaError::InvalidLaneCount {
                base: base.name().to_string(),
                lanes,
                reason: "lane count must be a power of two greater than one",
            });
        }
        let log2 = lanes.trailing_zeros();
        if log2 > MAX_LANES_LOG2 {
            return Err(MetaError::InvalidLaneCount {
                base: base.name().to_string(),
                lanes,
                reason: "lane count does not fit the type number",
            });
        }

        let name = format!("{}x{}", base.name(), lanes);
        if self.by_name.contains_key(&name) {
            return Err(MetaError::DuplicateTypeName { name });
        }

        let number = 16 * log2 as u8 + base.number();
        let vector = Rc::new(VectorType {
            name: name.clone(),
            doc: format!(
                "A SIMD vector with {} lanes containing a `{}` each.",
                lanes,
                base.name()
            ),
            membytes: lanes * base.membytes(),
            lanes,
            number,
            base: base.clone(),
        });
        log::debug!("vector type {} = #{}", name, number);
        self.vectors.insert((base.number(), lanes), vector.clone());
        let ty = ValueType::Vector(vector);
        self.by_name.insert(name, ty.clone());
        Ok(ty)
    }

    /// Look up a registered type by name.
    pub fn by_name(&self, name: &str) -> MetaResult<ValueType> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| MetaError::UnknownTypeName {
                name: name.to_string(),
            })
    }

    /// All scalar types in number order.
    pub fn all_scalars(&self) -> &[Rc<ScalarType>] {
        &self.scalars
    }

    /// Number of registered types, scalars and vectors.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
