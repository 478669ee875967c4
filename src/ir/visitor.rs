//! Symbolic semantics of [`Op`].

use log::trace;

use crate::{
    engine::{InstructionContext, InstructionVisitor},
    ir::{ComparisonOp, Op},
    state::ProgramState,
    symbolic::{ComparisonKind, SymbolicConstraint, SymbolicValue},
    Result,
};

/// Evaluates [`Op`] instructions.
///
/// - reading an untracked symbol binds it to a fresh value
/// - comparisons and negations push derived values, so branching on them refines
///   their operands
/// - member accesses and instance calls prove their receiver non-null; a path where
///   the receiver is known null is dropped
/// - calls on `this` or `base` forget what was known about fields
/// - object creation runs the checks' creation hooks; each state they return gets
///   the new object
#[derive(Debug, Clone, Copy, Default)]
pub struct StackMachineVisitor;

impl StackMachineVisitor {
    /// Creates the visitor.
    #[must_use]
    pub const fn new() -> Self {
        StackMachineVisitor
    }

    /// Proves `receiver` non-null.
    fn dereference(
        state: &ProgramState,
        receiver: &SymbolicValue,
    ) -> Result<Option<ProgramState>> {
        let next = state.try_set_constraint(receiver, SymbolicConstraint::NOT_NULL)?;
        if next.is_none() {
            trace!("dereference of null value {receiver}");
        }
        Ok(next)
    }
}

impl InstructionVisitor<Op> for StackMachineVisitor {
    fn visit(
        &mut self,
        instruction: &Op,
        state: &ProgramState,
        ctx: &mut InstructionContext<'_, Op>,
    ) -> Result<Vec<ProgramState>> {
        let next = match instruction {
            Op::Load(symbol) => match state.get_symbol_value(*symbol) {
                Some(value) => state.push_value(value.clone()),
                None => {
                    let value = ctx.create_value();
                    state
                        .store_symbolic_value(*symbol, value.clone())
                        .push_value(value)
                }
            },
            Op::Store(symbol) => {
                let (state, value) = state.pop_value()?;
                state.store_symbolic_value(*symbol, value)
            }
            Op::LoadNull => state.push_value(SymbolicValue::null()),
            Op::LoadTrue => state.push_value(SymbolicValue::true_value()),
            Op::LoadFalse => state.push_value(SymbolicValue::false_value()),
            Op::LoadThis => state.push_value(SymbolicValue::this()),
            Op::LoadBase => state.push_value(SymbolicValue::base()),
            Op::LoadConstant => {
                let value = ctx.create_value();
                state
                    .set_constraint(&value, SymbolicConstraint::NOT_NULL)
                    .push_value(value)
            }
            Op::Compare(op) => {
                let (state, operands) = state.pop_values(2)?;
                let [right, left]: [SymbolicValue; 2] = operands
                    .try_into()
                    .map_err(|_| malformed_error!("comparison needs two operands"))?;
                let factory = ctx.factory();
                let result = match op {
                    ComparisonOp::Eq => factory.equals(left, right),
                    ComparisonOp::Ne => factory.not_equals(left, right),
                    ComparisonOp::Lt => factory.comparison(ComparisonKind::Less, left, right),
                    ComparisonOp::Le => {
                        factory.comparison(ComparisonKind::LessOrEqual, left, right)
                    }
                    ComparisonOp::Gt => factory.comparison(ComparisonKind::Less, right, left),
                    ComparisonOp::Ge => {
                        factory.comparison(ComparisonKind::LessOrEqual, right, left)
                    }
                };
                state.push_value(result)
            }
            Op::Not => {
                let (state, operand) = state.pop_value()?;
                let negated = if operand == SymbolicValue::true_value() {
                    SymbolicValue::false_value()
                } else if operand == SymbolicValue::false_value() {
                    SymbolicValue::true_value()
                } else {
                    ctx.factory().not(operand)
                };
                state.push_value(negated)
            }
            Op::MemberAccess => {
                let (state, receiver) = state.pop_value()?;
                let Some(state) = Self::dereference(&state, &receiver)? else {
                    return Ok(Vec::new());
                };
                state.push_value(ctx.create_value())
            }
            Op::Invoke {
                arguments,
                has_receiver,
                returns_value,
            } => {
                let (mut state, _) = state.pop_values(*arguments)?;
                if *has_receiver {
                    let (popped, receiver) = state.pop_value()?;
                    let Some(dereferenced) = Self::dereference(&popped, &receiver)? else {
                        return Ok(Vec::new());
                    };
                    let on_self =
                        receiver == SymbolicValue::this() || receiver == SymbolicValue::base();
                    state = if on_self {
                        dereferenced.reset_field_constraints()
                    } else {
                        dereferenced
                    };
                }
                if *returns_value {
                    state.push_value(ctx.create_value())
                } else {
                    state
                }
            }
            Op::New { arguments } => {
                let (state, _) = state.pop_values(*arguments)?;
                let creating = ctx.object_creating(instruction, state)?;
                if creating.is_empty() {
                    return Ok(creating);
                }

                let object = ctx.create_value();
                let mut created = Vec::with_capacity(creating.len());
                for state in creating {
                    let state = state
                        .set_constraint(&object, SymbolicConstraint::NOT_NULL)
                        .push_value(object.clone());
                    created.extend(ctx.object_created(instruction, &object, state)?);
                }
                return Ok(created);
            }
            Op::Pop => state.pop_value()?.0,
            Op::Dup => {
                let top = state.peek_value()?.clone();
                state.push_value(top)
            }
            Op::Nop => state.clone(),
        };
        Ok(vec![next])
    }
}
