//! Environment registry: overload families and the builtin operator table.
//!
//! The registry is populated once, single-threaded, during environment
//! bootstrap, and is read-only while a construction session runs. Operator
//! dispatch never decodes names at a call site: scanning a type's methods
//! for `Op_*` declarations happens here, when the type is installed, and
//! fills an explicit (operator, operand type) table.

use rustc_hash::FxHashMap;

use quill_core::{BinaryOp, RegistrationError, Routine, Type, UnaryOp};

use crate::overload::OverloadSet;

/// The operator-method prefix used when none is configured.
pub const DEFAULT_OP_PREFIX: &str = "Op_";

/// Unified overload and operator registry for one environment.
#[derive(Debug)]
pub struct Registry {
    /// Overload families by base name.
    overloads: FxHashMap<String, OverloadSet>,

    /// Binary operator table: (operator, operand type name) -> routine.
    binary_ops: FxHashMap<(BinaryOp, String), Routine>,

    /// Unary operator table: (operator, operand type name) -> routine.
    unary_ops: FxHashMap<(UnaryOp, String), Routine>,

    /// Method-name prefix marking operator declarations, e.g. `Op_`.
    prefix: String,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry with the default `Op_` prefix.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_OP_PREFIX)
    }

    /// An empty registry with a custom operator-method prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        Registry {
            overloads: FxHashMap::default(),
            binary_ops: FxHashMap::default(),
            unary_ops: FxHashMap::default(),
            prefix: prefix.to_string(),
        }
    }

    /// The configured operator-method prefix.
    pub fn op_prefix(&self) -> &str {
        &self.prefix
    }

    // ==========================================================================
    // Overload Families
    // ==========================================================================

    /// Register one overload family. Suffix decoding and index validation
    /// happen here; see [`OverloadSet::register`].
    pub fn register_overloads(
        &mut self,
        name: &str,
        members: Vec<Routine>,
    ) -> Result<(), RegistrationError> {
        let set = OverloadSet::register(name, members)?;
        self.overloads.insert(name.to_string(), set);
        Ok(())
    }

    /// Look up a family by base name.
    pub fn overload(&self, name: &str) -> Result<&OverloadSet, RegistrationError> {
        self.overloads
            .get(name)
            .ok_or_else(|| RegistrationError::UnknownFamily {
                name: name.to_string(),
            })
    }

    // ==========================================================================
    // Operator Table
    // ==========================================================================

    /// Install a type's operator methods into the table.
    ///
    /// Scans the named type's declared methods for names of the form
    /// `<prefix><suffix>` where the suffix names an operator, and whose
    /// arity fits the operator (one parameter for binary, none for unary).
    /// Non-named types declare no methods and install nothing.
    pub fn install_operators(&mut self, ty: &Type) -> Result<(), RegistrationError> {
        let Type::Named(named) = ty else {
            return Ok(());
        };
        let key = named.qualified_name();
        for method in &named.methods {
            let Some(suffix) = method.name.strip_prefix(&self.prefix) else {
                continue;
            };
            if method.sig.params.len() == 1 {
                if let Some(op) = BinaryOp::from_method_suffix(suffix) {
                    let routine =
                        Routine::method(ty.clone(), &method.name, method.sig.clone());
                    if self
                        .binary_ops
                        .insert((op, key.clone()), routine)
                        .is_some()
                    {
                        return Err(RegistrationError::DuplicateOperator {
                            op: op.to_string(),
                            ty: key,
                        });
                    }
                }
            } else if method.sig.params.is_empty() {
                if let Some(op) = UnaryOp::from_method_suffix(suffix) {
                    let routine =
                        Routine::method(ty.clone(), &method.name, method.sig.clone());
                    if self.unary_ops.insert((op, key.clone()), routine).is_some() {
                        return Err(RegistrationError::DuplicateOperator {
                            op: op.to_string(),
                            ty: key,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Register a free-function binary operator for an operand type.
    pub fn register_binary_operator(
        &mut self,
        op: BinaryOp,
        operand: &Type,
        routine: Routine,
    ) -> Result<(), RegistrationError> {
        let key = operand.to_string();
        if self.binary_ops.insert((op, key.clone()), routine).is_some() {
            return Err(RegistrationError::DuplicateOperator {
                op: op.to_string(),
                ty: key,
            });
        }
        Ok(())
    }

    /// Register a free-function unary operator for an operand type.
    pub fn register_unary_operator(
        &mut self,
        op: UnaryOp,
        operand: &Type,
        routine: Routine,
    ) -> Result<(), RegistrationError> {
        let key = operand.to_string();
        if self.unary_ops.insert((op, key.clone()), routine).is_some() {
            return Err(RegistrationError::DuplicateOperator {
                op: op.to_string(),
                ty: key,
            });
        }
        Ok(())
    }

    /// The routine overloading `op` for left operands of `ty`, if any.
    pub fn binary_operator(&self, op: BinaryOp, ty: &Type) -> Option<&Routine> {
        self.binary_ops.get(&(op, ty.to_string()))
    }

    /// The routine overloading unary `op` for operands of `ty`, if any.
    pub fn unary_operator(&self, op: UnaryOp, ty: &Type) -> Option<&Routine> {
        self.unary_ops.get(&(op, ty.to_string()))
    }
}
