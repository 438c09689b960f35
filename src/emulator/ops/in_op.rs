use crate::emulator::engine::Engine;
use crate::emulator::io::INPUT_PORT;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `IN port`. Port 0 blocks the engine until the front end delivers a value.
#[derive(Debug, Clone, Copy)]
pub struct InOp;

impl Op for InOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, engine: &mut Engine) -> Result<Control, ExecError> {
        let port = ctx.next_byte()?;
        if port == INPUT_PORT {
            engine.sleep(None);
            let request = engine.await_input();
            ctx.io.request_input(request);
        } else {
            tracing::debug!(port, "IN from unconnected port ignored");
        }
        Ok(Control::Continue)
    }
}
