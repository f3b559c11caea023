//! Relational, instanceof and in opcode handlers (ECMA-262 v5, 11.8).

use super::Interpreter;
use crate::bytecode::Idx;
use crate::completion::{Completion, Flow};
use crate::conversion;
use crate::object_ops::{self, StandardError};
use crate::value::Value;

impl Interpreter {
    fn store_bool(&mut self, dst: Idx, lit_pos: u16, value: bool) -> Completion<Flow> {
        self.set_variable(dst, lit_pos, Value::Bool(value))?;
        self.advance();
        Ok(Flow::Next)
    }

    /// `<` (11.8.1): leftFirst comparison, undefined becomes false.
    pub(super) fn op_less_than(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let lv = self.get_variable(left, lit_pos)?;
        let rv = self.get_variable(right, lit_pos)?;
        let result = conversion::abstract_relational_compare(self, &lv, &rv, true)?;
        self.store_bool(dst, lit_pos, result == Some(true))
    }

    /// `>` (11.8.2): swapped operands, leftFirst false.
    pub(super) fn op_greater_than(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let lv = self.get_variable(left, lit_pos)?;
        let rv = self.get_variable(right, lit_pos)?;
        let result = conversion::abstract_relational_compare(self, &rv, &lv, false)?;
        self.store_bool(dst, lit_pos, result == Some(true))
    }

    /// `<=` (11.8.3): swapped operands, true and undefined negate to false.
    pub(super) fn op_less_or_equal_than(
        &mut self,
        dst: Idx,
        left: Idx,
        right: Idx,
    ) -> Completion<Flow> {
        let lit_pos = self.pos();
        let lv = self.get_variable(left, lit_pos)?;
        let rv = self.get_variable(right, lit_pos)?;
        let result = conversion::abstract_relational_compare(self, &rv, &lv, false)?;
        self.store_bool(dst, lit_pos, result == Some(false))
    }

    /// `>=` (11.8.4): leftFirst comparison, true and undefined negate to
    /// false.
    pub(super) fn op_greater_or_equal_than(
        &mut self,
        dst: Idx,
        left: Idx,
        right: Idx,
    ) -> Completion<Flow> {
        let lit_pos = self.pos();
        let lv = self.get_variable(left, lit_pos)?;
        let rv = self.get_variable(right, lit_pos)?;
        let result = conversion::abstract_relational_compare(self, &lv, &rv, true)?;
        self.store_bool(dst, lit_pos, result == Some(false))
    }

    /// `instanceof` (11.8.6).
    pub(super) fn op_instanceof(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let lv = self.get_variable(left, lit_pos)?;
        let rv = self.get_variable(right, lit_pos)?;
        let func = match rv.as_object() {
            Some(obj) if self.heap.get(obj).is_callable() => obj,
            _ => {
                return object_ops::throw_standard_error(
                    self,
                    StandardError::Type,
                    "right-hand side of instanceof is not callable",
                )
            }
        };
        let result = object_ops::has_instance(self, func, &lv)?;
        self.store_bool(dst, lit_pos, result)
    }

    /// `in` (11.8.7).
    pub(super) fn op_in(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let lv = self.get_variable(left, lit_pos)?;
        let rv = self.get_variable(right, lit_pos)?;
        let Some(obj) = rv.as_object() else {
            return object_ops::throw_standard_error(
                self,
                StandardError::Type,
                "right-hand side of in is not an object",
            );
        };
        let mark = self.pin(rv.clone());
        let name = conversion::to_string(self, &lv);
        self.unpin_to(mark);
        let name = name?;
        let found = object_ops::get_property(&self.heap, obj, &name).is_some();
        self.store_bool(dst, lit_pos, found)
    }
}
