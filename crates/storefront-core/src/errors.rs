use thiserror::Error;

use crate::model::EntityKind;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by a repository operation carries exactly one of
/// these kinds. Each kind maps to a stable error code for programmatic
/// handling and for assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// A point lookup by id, or by a unique natural key, matched zero rows
    NotFound,
    /// A create/add would duplicate an application-level uniqueness rule
    AlreadyExists,
    /// A write affected a row count other than the one expected, or the
    /// store rejected it on a uniqueness/foreign-key constraint
    ConstraintViolation,
    /// Unrecoverable failure from the store (connectivity, malformed statement)
    DataAccess,
    /// A caller-supplied value failed a precondition
    InvalidArgument,
    /// Broken internal invariant (should never surface)
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::DataAccess => "ERR_DATA_ACCESS",
            ExErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification (`kind`) plus optional context about the
/// operation and entity involved. Built fluently:
///
/// ```
/// use storefront_core::{ExError, ExErrorKind};
///
/// let err = ExError::new(ExErrorKind::NotFound)
///     .with_op("order_from_id")
///     .with_entity("order", 7)
///     .with_message("no row");
/// assert_eq!(err.code(), "ERR_NOT_FOUND");
/// assert_eq!(err.entity_id(), Some("7"));
/// ```
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_kind: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_kind: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (kind name and id)
    pub fn with_entity(mut self, kind: impl Into<String>, id: impl ToString) -> Self {
        self.entity_kind = Some(kind.into());
        self.entity_id = Some(id.to_string());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity kind context, if any
    pub fn entity_kind(&self) -> Option<&str> {
        self.entity_kind.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// True if this error is of the given kind
    pub fn is(&self, kind: ExErrorKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let (Some(kind), Some(id)) = (&self.entity_kind, &self.entity_id) {
            write!(f, " ({} {})", kind, id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain-level failures raised by validation rules and repository logic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorefrontError {
    /// Point lookup by id matched nothing
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    /// Lookup by a unique natural key matched nothing
    #[error("{kind} named '{name}' not found")]
    NameNotFound { kind: EntityKind, name: String },

    /// A child was not a member of the owner's collection
    #[error("{child_kind} {child_id} is not held by {owner_kind} {owner_id}")]
    NotInCollection {
        owner_kind: EntityKind,
        owner_id: i64,
        child_kind: EntityKind,
        child_id: i64,
    },

    /// Application-level uniqueness rule would be violated
    #[error("{kind} {owner_id} already has {what}")]
    AlreadyExists {
        kind: EntityKind,
        owner_id: i64,
        what: String,
    },

    /// A natural key is already taken
    #[error("{kind} named '{name}' already exists")]
    NameTaken { kind: EntityKind, name: String },

    /// Single-row write touched the wrong number of rows
    #[error("expected {expected} row(s) affected in {table}, got {actual}")]
    RowCountMismatch {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Rows of one cursor belonged to more than one parent
    #[error("cursor on {column} spans more than one parent (expected {expected}, found {found})")]
    CursorSpansParents {
        column: String,
        expected: i64,
        found: i64,
    },

    /// Address type list was empty
    #[error("address types cannot be empty")]
    EmptyTypeSet,

    /// Product has nothing left to order or wish for
    #[error("product {product_id} is out of stock")]
    OutOfStock { product_id: i64 },

    /// Requested quantity outside `[0, available]`
    #[error("quantity {requested} outside allowed range [0, {available}]")]
    QuantityOutOfRange { requested: i64, available: i64 },

    /// Generic precondition failure on a field
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<StorefrontError> for ExError {
    fn from(err: StorefrontError) -> Self {
        let message = err.to_string();
        match err {
            StorefrontError::NotFound { kind, id } => ExError::new(ExErrorKind::NotFound)
                .with_entity(kind.as_str(), id)
                .with_message(message),

            StorefrontError::NameNotFound { kind, .. } => ExError::new(ExErrorKind::NotFound)
                .with_op(format!("{}_from_name", kind.as_str()))
                .with_message(message),

            StorefrontError::NotInCollection {
                child_kind,
                child_id,
                ..
            } => ExError::new(ExErrorKind::NotFound)
                .with_entity(child_kind.as_str(), child_id)
                .with_message(message),

            StorefrontError::AlreadyExists { kind, owner_id, .. } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_entity(kind.as_str(), owner_id)
                    .with_message(message)
            }

            StorefrontError::NameTaken { .. } => {
                ExError::new(ExErrorKind::AlreadyExists).with_message(message)
            }

            StorefrontError::RowCountMismatch { .. } => {
                ExError::new(ExErrorKind::ConstraintViolation).with_message(message)
            }

            StorefrontError::CursorSpansParents { .. } => ExError::new(ExErrorKind::DataAccess)
                .with_op("hydrate")
                .with_message(message),

            StorefrontError::OutOfStock { product_id } => {
                ExError::new(ExErrorKind::InvalidArgument)
                    .with_entity(EntityKind::Product.as_str(), product_id)
                    .with_message(message)
            }

            StorefrontError::EmptyTypeSet
            | StorefrontError::QuantityOutOfRange { .. }
            | StorefrontError::InvalidValue { .. } => {
                ExError::new(ExErrorKind::InvalidArgument).with_message(message)
            }
        }
    }
}
