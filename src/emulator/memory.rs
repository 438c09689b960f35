use thiserror::Error;

use super::observer::ObserverHandle;
use super::registers::{Register, Registers};

pub const DEFAULT_MEMORY_SIZE: usize = 256;
/// Registers are 8 bits wide so nothing above this is addressable.
pub const MAX_MEMORY_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("address {address:#04X} is outside memory of {size} bytes")]
    OutOfBounds { address: usize, size: usize },
    #[error("memory of {size} bytes is full")]
    Full { size: usize },
    #[error("memory size must be between 1 and {MAX_MEMORY_SIZE}, got {0}")]
    InvalidSize(usize),
}

/// Flat byte store.
///
/// During assembly bytes are appended at the assembly pointer; during
/// execution they are read and written at arbitrary addresses, usually
/// relative to the program counter.
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
    assembly_pointer: usize,
    observer: ObserverHandle,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            bytes: vec![0; DEFAULT_MEMORY_SIZE],
            assembly_pointer: 0,
            observer: ObserverHandle::default(),
        }
    }
}

impl Memory {
    pub fn new(size: usize) -> Result<Self, MemoryError> {
        if !(1..=MAX_MEMORY_SIZE).contains(&size) {
            return Err(MemoryError::InvalidSize(size));
        }
        Ok(Self {
            bytes: vec![0; size],
            ..Self::default()
        })
    }

    pub(crate) fn set_observer(&mut self, observer: ObserverHandle) {
        self.observer = observer;
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn assembly_pointer(&self) -> usize {
        self.assembly_pointer
    }

    /// Zero fills and rewinds the assembly pointer.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.assembly_pointer = 0;
        tracing::trace!(size = self.size(), "memory cleared");
    }

    /// Appends at the assembly pointer. Assembly only, no notification.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), MemoryError> {
        let size = self.bytes.len();
        let slot = self
            .bytes
            .get_mut(self.assembly_pointer)
            .ok_or(MemoryError::Full { size })?;
        *slot = byte;
        tracing::trace!(
            "assembled memory[{:02X}] = {:02X}",
            self.assembly_pointer,
            byte
        );
        self.assembly_pointer += 1;
        Ok(())
    }

    /// Rewrites a byte below the assembly pointer. Assembly only, no notification.
    pub(crate) fn patch_byte(&mut self, address: usize, value: u8) -> Result<(), MemoryError> {
        if address >= self.assembly_pointer {
            return Err(MemoryError::OutOfBounds {
                address,
                size: self.size(),
            });
        }
        self.bytes[address] = value;
        tracing::trace!("patched memory[{:02X}] = {:02X}", address, value);
        Ok(())
    }

    pub fn write_address(&mut self, address: u8, value: u8) -> Result<(), MemoryError> {
        let size = self.size();
        let slot = self
            .bytes
            .get_mut(address as usize)
            .ok_or(MemoryError::OutOfBounds {
                address: address as usize,
                size,
            })?;
        *slot = value;
        tracing::trace!("memory[{:02X}] <- {:02X}", address, value);
        self.observer.notify(|o| o.memory_updated(self));
        Ok(())
    }

    pub fn read_address(&self, address: u8) -> Result<u8, MemoryError> {
        self.bytes
            .get(address as usize)
            .copied()
            .ok_or(MemoryError::OutOfBounds {
                address: address as usize,
                size: self.size(),
            })
    }

    /// The byte under the program counter.
    pub fn read_byte(&self, registers: &Registers) -> Result<u8, MemoryError> {
        self.read_address(registers.get(Register::Pc))
    }

    /// Advances PC by one and returns the byte it now points at. This is how
    /// executors consume their operand byte.
    pub fn next_byte(&self, registers: &mut Registers) -> Result<u8, MemoryError> {
        registers.increment(Register::Pc, 1);
        self.read_byte(registers)
    }
}
