//! Arithmetic, equality and bitwise opcode handlers
//! (ECMA-262 v5, 11.5 - 11.9).

use super::Interpreter;
use crate::bytecode::Idx;
use crate::completion::{Completion, Flow};
use crate::conversion::{self, PreferredType};
use crate::numbers::{to_int32, to_uint32};
use crate::strings::JsString;
use crate::value::Value;

impl Interpreter {
    /// Read both operands of a binary opcode.
    fn binary_operands(&mut self, left: Idx, right: Idx) -> Completion<(u16, Value, Value)> {
        let lit_pos = self.pos();
        let left_value = self.get_variable(left, lit_pos)?;
        let right_value = self.get_variable(right, lit_pos)?;
        Ok((lit_pos, left_value, right_value))
    }

    fn store_number(&mut self, dst: Idx, lit_pos: u16, n: f64) -> Completion<Flow> {
        self.set_variable(dst, lit_pos, Value::Number(n))?;
        self.advance();
        Ok(Flow::Next)
    }

    /// Addition (11.6.1): string concatenation when either primitive is a
    /// string, numeric addition otherwise.
    pub(super) fn op_addition(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (lp, rp) =
            conversion::to_primitive_pair(self, &lv, &rv, PreferredType::Default, true)?;
        let result = if lp.is_string() || rp.is_string() {
            let ls = conversion::to_string(self, &lp)?;
            let rs = conversion::to_string(self, &rp)?;
            Value::String(JsString::new(&format!("{}{}", ls, rs)))
        } else {
            let ln = conversion::to_number(self, &lp)?;
            let rn = conversion::to_number(self, &rp)?;
            Value::Number(ln + rn)
        };
        self.set_variable(dst, lit_pos, result)?;
        self.advance();
        Ok(Flow::Next)
    }

    pub(super) fn op_subtraction(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        self.store_number(dst, lit_pos, ln - rn)
    }

    pub(super) fn op_multiplication(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        self.store_number(dst, lit_pos, ln * rn)
    }

    pub(super) fn op_division(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        self.store_number(dst, lit_pos, ln / rn)
    }

    pub(super) fn op_remainder(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        self.store_number(dst, lit_pos, ln % rn)
    }

    pub(super) fn op_unary_minus(&mut self, dst: Idx, var: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = self.get_variable(var, lit_pos)?;
        let n = conversion::to_number(self, &value)?;
        self.store_number(dst, lit_pos, -n)
    }

    pub(super) fn op_unary_plus(&mut self, dst: Idx, var: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = self.get_variable(var, lit_pos)?;
        let n = conversion::to_number(self, &value)?;
        self.store_number(dst, lit_pos, n)
    }

    /// Loose equality and its negation (11.9.1, 11.9.2).
    pub(super) fn op_equal_value(
        &mut self,
        dst: Idx,
        left: Idx,
        right: Idx,
        negate: bool,
    ) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let equal = conversion::abstract_equality(self, &lv, &rv)?;
        self.set_variable(dst, lit_pos, Value::Bool(equal != negate))?;
        self.advance();
        Ok(Flow::Next)
    }

    /// Strict equality and its negation (11.9.4, 11.9.5).
    pub(super) fn op_equal_value_type(
        &mut self,
        dst: Idx,
        left: Idx,
        right: Idx,
        negate: bool,
    ) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let equal = conversion::strict_equals(&lv, &rv);
        self.set_variable(dst, lit_pos, Value::Bool(equal != negate))?;
        self.advance();
        Ok(Flow::Next)
    }

    pub(super) fn op_bit_and(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        self.store_number(dst, lit_pos, (to_int32(ln) & to_int32(rn)) as f64)
    }

    pub(super) fn op_bit_or(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        self.store_number(dst, lit_pos, (to_int32(ln) | to_int32(rn)) as f64)
    }

    pub(super) fn op_bit_xor(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        self.store_number(dst, lit_pos, (to_int32(ln) ^ to_int32(rn)) as f64)
    }

    pub(super) fn op_bit_not(&mut self, dst: Idx, var: Idx) -> Completion<Flow> {
        let lit_pos = self.pos();
        let value = self.get_variable(var, lit_pos)?;
        let n = conversion::to_number(self, &value)?;
        self.store_number(dst, lit_pos, (!to_int32(n)) as f64)
    }

    pub(super) fn op_shift_left(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        let shift = to_uint32(rn) & 31;
        self.store_number(dst, lit_pos, (to_int32(ln) << shift) as f64)
    }

    pub(super) fn op_shift_right(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        let shift = to_uint32(rn) & 31;
        self.store_number(dst, lit_pos, (to_int32(ln) >> shift) as f64)
    }

    pub(super) fn op_shift_uright(&mut self, dst: Idx, left: Idx, right: Idx) -> Completion<Flow> {
        let (lit_pos, lv, rv) = self.binary_operands(left, right)?;
        let (ln, rn) = conversion::to_number_pair(self, &lv, &rv)?;
        let shift = to_uint32(rn) & 31;
        self.store_number(dst, lit_pos, (to_uint32(ln) >> shift) as f64)
    }
}
