mod alu;
mod engine;
mod io;
mod memory;
mod observer;
mod ops;
pub mod parse;
mod registers;

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, EmulatorConfig};

pub use alu::{add_with_carry, decode_signed, Sum};
pub use engine::{EngineState, InputError};
pub use io::{parse_hex_input, InputRequest, INPUT_PORT, OUTPUT_PORT};
pub use memory::{Memory, MemoryError, DEFAULT_MEMORY_SIZE, MAX_MEMORY_SIZE};
pub use observer::Observer;
pub use ops::{OpCode, Shape, INSTRUCTION_SET};
pub use parse::{AssemblyError, CompilationArtifacts};
pub use registers::{Register, Registers};

use engine::Engine;
use io::IoPort;
use observer::ObserverHandle;
use ops::{Control, ExecContext};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("unknown opcode {byte:02X} at {address:02X}")]
    UnknownOpcode { address: u8, byte: u8 },
    #[error("{mnemonic} at {address:02X} cannot be executed")]
    NoExecutor { address: u8, mnemonic: &'static str },
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Point-in-time view of the machine for debugging front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: EngineState,
    pub registers: Vec<(Register, u8)>,
    pub memory: Vec<u8>,
    pub output: i8,
}

#[derive(Debug)]
pub struct Emulator {
    memory: Memory,
    registers: Registers,
    io: IoPort,
    engine: Engine,
    rng: StdRng,
    config: EmulatorConfig,
    // present only after a successful assembly
    artifacts: Option<CompilationArtifacts>,
    observer: ObserverHandle,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    pub fn new() -> Emulator {
        let config = EmulatorConfig::default();
        Self {
            memory: Memory::default(),
            registers: Registers::new(),
            io: IoPort::new(),
            engine: Engine::new(config.sleep_unit()),
            rng: Self::seeded_rng(config.rng_seed),
            config,
            artifacts: None,
            observer: ObserverHandle::default(),
        }
    }

    pub fn with_config(config: EmulatorConfig) -> Result<Emulator, ConfigError> {
        config.validate()?;
        let memory = Memory::new(config.memory_size)
            .map_err(|_| ConfigError::InvalidMemorySize(config.memory_size))?;
        tracing::debug!(?config, "emulator configured");
        Ok(Self {
            memory,
            registers: Registers::new(),
            io: IoPort::new(),
            engine: Engine::new(config.sleep_unit()),
            rng: Self::seeded_rng(config.rng_seed),
            config,
            artifacts: None,
            observer: ObserverHandle::default(),
        })
    }

    fn seeded_rng(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Installs `observer` on every component. Replaces any earlier one.
    pub fn set_observer(&mut self, observer: Arc<dyn Observer>) {
        let handle = ObserverHandle::new(observer);
        self.memory.set_observer(handle.clone());
        self.registers.set_observer(handle.clone());
        self.io.set_observer(handle.clone());
        self.observer = handle;
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn output(&self) -> i8 {
        self.io.output()
    }

    pub fn artifacts(&self) -> Option<&CompilationArtifacts> {
        self.artifacts.as_ref()
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.engine.is_awaiting_input()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.engine.state(),
            registers: self.registers.snapshot().to_vec(),
            memory: self.memory.bytes().to_vec(),
            output: self.io.output(),
        }
    }
}

// execution engine
impl Emulator {
    /// Starts the assembled program from address 0.
    ///
    /// Anything still pending from a previous run (a sleep timer or an input
    /// request) is dropped.
    pub fn run(&mut self) {
        let span = tracing::info_span!("run", memory_size = self.memory.size());
        let _guard = span.enter();

        self.registers.reset();
        // size is at most 256 so the top address fits a register
        let top = (self.memory.size() - 1) as u8;
        self.registers.set(Register::Sp, top);
        self.observer.notify(|o| {
            for (register, value) in self.registers.snapshot() {
                o.register_updated(register, value);
            }
        });

        self.engine.start();
        tracing::info!("program started");
    }

    pub fn stop(&mut self) {
        let span = tracing::info_span!("stop", state = ?self.engine.state());
        let _guard = span.enter();

        self.engine.stop();
    }

    /// Suspends stepping; see [`EngineState::Sleeping`].
    pub fn sleep(&mut self, timeout: Option<Duration>) {
        let span = tracing::debug_span!("sleep", ?timeout);
        let _guard = span.enter();

        self.engine.sleep(timeout);
    }

    pub fn wake_up(&mut self) {
        let span = tracing::debug_span!("wake_up", state = ?self.engine.state());
        let _guard = span.enter();

        self.engine.wake_up();
    }

    /// Executes the instruction under PC. Does nothing unless running.
    ///
    /// Any error stops the engine and is returned for reporting; the
    /// machine is left as the failing instruction found it.
    pub fn step(&mut self) -> Result<(), ExecError> {
        if self.engine.state() != EngineState::Running {
            return Ok(());
        }

        let pc = self.registers.get(Register::Pc);
        let span = tracing::debug_span!("step", pc = format!("{pc:02X}"));
        let _guard = span.enter();

        match self.execute_current() {
            Ok(Control::Continue) => {
                self.registers.increment(Register::Pc, 1);
                tracing::trace!("PC -> {:02X}", self.registers.get(Register::Pc));
                Ok(())
            }
            Ok(Control::Halt) => {
                tracing::info!("program stopped at {:02X}", pc);
                self.engine.stop();
                Ok(())
            }
            Err(err) => {
                tracing::error!("execution failed: {}", err);
                self.engine.stop();
                Err(err)
            }
        }
    }

    fn execute_current(&mut self) -> Result<Control, ExecError> {
        let address = self.registers.get(Register::Pc);
        let byte = self.memory.read_byte(&self.registers)?;
        let op = OpCode::from_value(byte).ok_or(ExecError::UnknownOpcode { address, byte })?;
        tracing::debug!("decoded {} at {:02X}", op, address);

        let mut ctx = ExecContext {
            memory: &mut self.memory,
            registers: &mut self.registers,
            io: &mut self.io,
            rng: &mut self.rng,
        };
        op.execute(&mut ctx, &mut self.engine)
    }

    /// Driver entry point: moves the clock on by `elapsed`, fires a due
    /// wake-up, then steps once if running. Returns whether a step ran.
    ///
    /// A failing step has already stopped the engine when its error comes
    /// back here.
    pub fn update(&mut self, elapsed: Duration) -> Result<bool, ExecError> {
        self.engine.advance(elapsed);
        if self.engine.state() != EngineState::Running {
            return Ok(false);
        }
        self.step()?;
        Ok(true)
    }

    /// Remaining time of a timed sleep, for drivers that want to idle.
    pub fn time_to_wake(&self) -> Option<Duration> {
        self.engine.time_to_wake()
    }

    /// Answers an outstanding `IN 00`. The value lands in RA without touching
    /// the flags and the engine resumes.
    pub fn deliver_input(&mut self, request: InputRequest, hex: &str) -> Result<(), InputError> {
        let span = tracing::info_span!("deliver_input", input = hex);
        let _guard = span.enter();

        if let Err(err) = self.engine.check_input(request) {
            tracing::warn!("input rejected: {}", err);
            return Err(err);
        }
        let value = parse_hex_input(hex).ok_or_else(|| InputError::InvalidHex(hex.to_string()))?;
        self.engine.accept_input(request)?;

        self.registers.set(Register::Ra, value);
        tracing::debug!("RA <- {:02X} from input", value);
        self.engine.wake_up();
        Ok(())
    }
}
