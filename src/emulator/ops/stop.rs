use crate::emulator::engine::Engine;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

#[derive(Debug, Clone, Copy)]
pub struct StopOp;

impl Op for StopOp {
    fn execute(&self, _ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        Ok(Control::Halt)
    }
}
