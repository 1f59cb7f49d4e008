// This module defines the error taxonomy for the meta-description layer using the
// thiserror crate. MetaError is the single error enum returned by every construction
// and finalization step: registry conflicts (duplicate type, kind, format signature or
// instruction names), instruction polymorphism violations, settings group state machine
// misuse, ISA encoding mismatches and RTL/legalization pattern errors. Every variant
// carries a human-readable message naming the offending entity. All of these are
// configuration errors; the description-building run is expected to stop at the first
// one and report `category()` plus the message.

//! Error types for the meta-description layer.

use thiserror::Error;

/// Fatal configuration error raised while declaring or finalizing the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaError {
    #[error("Duplicate type name: {name}")]
    DuplicateTypeName { name: String },

    #[error("No type named '{name}'")]
    UnknownTypeName { name: String },

    #[error("Too many scalar types: '{name}' would be number {number}")]
    TooManyScalarTypes { name: String, number: usize },

    #[error("Invalid vector type {base}x{lanes}: {reason}")]
    InvalidLaneCount {
        base: String,
        lanes: u32,
        reason: &'static str,
    },

    #[error("Invalid type: {reason}")]
    InvalidType { reason: String },

    #[error("Duplicate operand kind name: {name}")]
    DuplicateKindName { name: String },

    #[error("Format '{format}' has the same signature as existing format '{existing}'")]
    DuplicateFormatSignature { format: String, existing: String },

    #[error("No instruction format matches {signature}")]
    NoMatchingFormat { signature: String },

    #[error("{field} is not a member of format {format}")]
    UnknownFormatField { format: String, field: String },

    #[error("Format {format}: typevar_operand {index} must indicate a 'value' operand")]
    InvalidTypevarOperand { format: String, index: usize },

    #[error("{inst}: {reason}")]
    AmbiguousControllingTypevar { inst: String, reason: String },

    #[error("{inst}: type variable {typevar} can't be used more than once")]
    TypevarReuseViolation { inst: String, typevar: String },

    #[error("{inst}: {operand}: type variable {typevar} must be derived from {ctrl}")]
    UnderivedTypevar {
        inst: String,
        operand: String,
        typevar: String,
        ctrl: String,
    },

    #[error("{inst}: type variable in output {operand} not derived from {ctrl}")]
    OutputTypevarMismatch {
        inst: String,
        operand: String,
        ctrl: String,
    },

    #[error("Unbound typevar {missing} in {inst}")]
    UnboundTypevar { inst: String, missing: String },

    #[error("{inst} is not polymorphic and can't be bound")]
    NotPolymorphic { inst: String },

    #[error("Too many type arguments for {inst}: {given} given, {expected} expected")]
    TooManyTypeArguments {
        inst: String,
        given: usize,
        expected: usize,
    },

    #[error("Duplicate instruction: {name}")]
    DuplicateInstruction { name: String },

    #[error("{inst} takes {expected} arguments, {given} given")]
    ApplyArity {
        inst: String,
        expected: usize,
        given: usize,
    },

    #[error("{inst}: value argument {operand} must be a variable or an instruction")]
    InvalidApplyArgument { inst: String, operand: String },

    #[error("Format {inst_format} must match recipe {recipe}: {recipe_format}")]
    FormatRecipeMismatch {
        inst_format: String,
        recipe: String,
        recipe_format: String,
    },

    #[error("Predicate {predicate} is not evaluable in {expected}")]
    PredicateContextMismatch { predicate: String, expected: String },

    #[error("Can't combine predicates {left} and {right}: incompatible contexts")]
    IncompatiblePredicates { left: String, right: String },

    #[error("Predicate {predicate} does not belong to settings group {group}")]
    ForeignPredicate { predicate: String, group: String },

    #[error("Can't open {group} since {open} is already open")]
    GroupAlreadyOpen { group: String, open: String },

    #[error("{group} is not the open group, the open group is {open}")]
    GroupNotOpen { group: String, open: String },

    #[error("Duplicate setting {group}.{name}")]
    DuplicateSettingName { group: String, name: String },

    #[error("Enum setting {group}.{name} must have at least one value")]
    EmptyEnumSetting { group: String, name: String },

    #[error("Settings group {group} has already been laid out")]
    LayoutAlreadyPerformed { group: String },

    #[error("Target ISA {isa} has already been finished")]
    IsaAlreadyFinished { isa: String },

    #[error("'{name}' used as both input and def")]
    VariableRoleConflict { name: String },

    #[error("'{name}' multiply defined")]
    MultiplyDefinedVariable { name: String },

    #[error("extra inputs in dst RTL: {names}")]
    ExtraDestinationInput { names: String },

    #[error("Legalize needs single instruction, source pattern has {count}")]
    LegalizationArityViolation { count: usize },

    #[error("{name} not defined in dest pattern")]
    UndefinedLegalizationOutput { name: String },
}

impl MetaError {
    /// Category name used when reporting an aborted description run.
    pub fn category(&self) -> &'static str {
        match self {
            MetaError::DuplicateTypeName { .. } => "DuplicateTypeName",
            MetaError::UnknownTypeName { .. } => "UnknownTypeName",
            MetaError::TooManyScalarTypes { .. } => "TooManyScalarTypes",
            MetaError::InvalidLaneCount { .. } => "InvalidLaneCount",
            MetaError::InvalidType { .. } => "InvalidType",
            MetaError::DuplicateKindName { .. } => "DuplicateKindName",
            MetaError::DuplicateFormatSignature { .. } => "DuplicateFormatSignature",
            MetaError::NoMatchingFormat { .. } => "NoMatchingFormat",
            MetaError::UnknownFormatField { .. } => "UnknownFormatField",
            MetaError::InvalidTypevarOperand { .. } => "InvalidTypevarOperand",
            MetaError::AmbiguousControllingTypevar { .. } => "AmbiguousControllingTypevar",
            MetaError::TypevarReuseViolation { .. } => "TypevarReuseViolation",
            MetaError::UnderivedTypevar { .. } => "UnderivedTypevar",
            MetaError::OutputTypevarMismatch { .. } => "OutputTypevarMismatch",
            MetaError::UnboundTypevar { .. } => "UnboundTypevar",
            MetaError::NotPolymorphic { .. } => "NotPolymorphic",
            MetaError::TooManyTypeArguments { .. } => "TooManyTypeArguments",
            MetaError::DuplicateInstruction { .. } => "DuplicateInstruction",
            MetaError::ApplyArity { .. } => "ApplyArity",
            MetaError::InvalidApplyArgument { .. } => "InvalidApplyArgument",
            MetaError::FormatRecipeMismatch { .. } => "FormatRecipeMismatch",
            MetaError::PredicateContextMismatch { .. } => "PredicateContextMismatch",
            MetaError::IncompatiblePredicates { .. } => "IncompatiblePredicates",
            MetaError::ForeignPredicate { .. } => "ForeignPredicate",
            MetaError::GroupAlreadyOpen { .. } => "GroupAlreadyOpen",
            MetaError::GroupNotOpen { .. } => "GroupNotOpen",
            MetaError::DuplicateSettingName { .. } => "DuplicateSettingName",
            MetaError::EmptyEnumSetting { .. } => "EmptyEnumSetting",
            MetaError::LayoutAlreadyPerformed { .. } => "LayoutAlreadyPerformed",
            MetaError::IsaAlreadyFinished { .. } => "IsaAlreadyFinished",
            MetaError::VariableRoleConflict { .. } => "VariableRoleConflict",
            MetaError::MultiplyDefinedVariable { .. } => "MultiplyDefinedVariable",
            MetaError::ExtraDestinationInput { .. } => "ExtraDestinationInput",
            MetaError::LegalizationArityViolation { .. } => "LegalizationArityViolation",
            MetaError::UndefinedLegalizationOutput { .. } => "UndefinedLegalizationOutput",
        }
    }
}

/// Result type alias for construction and finalization steps.
pub type MetaResult<T> = Result<T, MetaError>;
