use crate::emulator::engine::Engine;
use crate::emulator::io::OUTPUT_PORT;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `OUT port`. Only port 1 is wired to the output latch.
#[derive(Debug, Clone, Copy)]
pub struct OutOp;

impl Op for OutOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let port = ctx.next_byte()?;
        if port == OUTPUT_PORT {
            let ra = ctx.registers.get(Register::Ra);
            ctx.io.set_output(ra);
        } else {
            tracing::debug!(port, "OUT to unconnected port ignored");
        }
        Ok(Control::Continue)
    }
}
