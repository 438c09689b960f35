use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// Does nothing once SP is back at the top of memory; an empty stack is not
/// an error.
#[derive(Debug, Clone, Copy)]
pub struct PopOp;

impl Op for PopOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let sp = ctx.registers.get(Register::Sp);
        if (sp as usize) < ctx.memory.size() - 1 {
            ctx.registers.increment(Register::Sp, 1);
            let sp = ctx.registers.get(Register::Sp);
            ctx.memory.write_address(sp, 0)?;
        } else {
            tracing::debug!(sp, "POP on empty stack ignored");
        }
        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ops::test_rig::Rig;
    use tracing_test::traced_test;

    use crate::emulator::ops::PushOp;

    #[traced_test]
    #[test]
    fn test_push_then_pop_restores_sp() {
        let mut rig = Rig::new(&[15, 16]);
        rig.registers.set(Register::Ra, 0x2A);
        rig.run(&PushOp).unwrap();
        rig.run(&PopOp).unwrap();

        assert_eq!(rig.reg(Register::Sp), 0xFF);
        // POP zeroes the cell it moves back onto
        assert_eq!(rig.memory.read_address(0xFF), Ok(0));
        // POP does not load RA
        assert_eq!(rig.reg(Register::Ra), 0x2A);
    }

    #[traced_test]
    #[test]
    fn test_pop_on_empty_stack_is_a_no_op() {
        let mut rig = Rig::new(&[16]);
        rig.memory.write_address(0xFF, 9).unwrap();
        rig.run(&PopOp).unwrap();

        assert_eq!(rig.reg(Register::Sp), 0xFF);
        assert_eq!(rig.memory.read_address(0xFF), Ok(9));
        assert!(logs_contain("POP on empty stack ignored"));
    }
}
