use crate::emulator::engine::Engine;
use crate::emulator::ExecError;

use super::{Control, ExecContext, Op};

/// `SLEEP n` suspends for `n` sleep units.
#[derive(Debug, Clone, Copy)]
pub struct SleepOp;

impl Op for SleepOp {
    fn execute(&self, ctx: &mut ExecContext<'_>, engine: &mut Engine) -> Result<Control, ExecError> {
        let units = ctx.next_byte()?;
        let timeout = engine.sleep_unit() * u32::from(units);
        engine.sleep(Some(timeout));
        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ops::test_rig::Rig;
    use crate::emulator::registers::Register;
    use tracing_test::traced_test;

    use std::time::Duration;

    use crate::emulator::engine::EngineState;

    #[traced_test]
    #[test]
    fn test_sleep_sets_timed_wake() {
        let mut rig = Rig::new(&[22, 0x02]);
        rig.run(&SleepOp).unwrap();
        assert_eq!(rig.engine.state(), EngineState::Sleeping);
        assert_eq!(rig.reg(Register::Pc), 1);

        rig.engine.advance(Duration::from_millis(1999));
        assert_eq!(rig.engine.state(), EngineState::Sleeping);
        rig.engine.advance(Duration::from_millis(1));
        assert_eq!(rig.engine.state(), EngineState::Running);
    }
}
