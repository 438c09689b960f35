use crate::emulator::engine::Engine;
use crate::emulator::ExecError;

use super::compare::compare_with;
use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct CompareiOp;

impl Op for CompareiOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let value = ctx.next_byte()?;
        compare_with(ctx, value);
        Ok(Control::Continue)
    }
}
