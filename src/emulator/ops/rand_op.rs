use rand::Rng;

use crate::emulator::engine::Engine;
use crate::emulator::registers::Register;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// RA gets a value in 1..=255, never zero.
#[derive(Debug, Clone, Copy)]
pub struct RandOp;

impl Op for RandOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, _engine: &mut Engine) -> Result<Control, ExecError> {
        let value: u8 = ctx.rng.random_range(1..=255);
        ctx.registers.set(Register::Ra, value);
        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ops::test_rig::Rig;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_rand_never_zero() {
        let mut rig = Rig::new(&[23]);
        for _ in 0..1000 {
            rig.run(&RandOp).unwrap();
            assert_ne!(rig.reg(Register::Ra), 0);
        }
        assert_eq!(rig.reg(Register::Pc), 0);
    }
}
