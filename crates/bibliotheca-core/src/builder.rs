//! Step-by-step computer configuration with ready-made presets.
use std::fmt;

use serde::Serialize;

use crate::error::{BibliothecaError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Computer {
    pub cpu: String,
    pub ram_gb: u32,
    pub storage_gb: u32,
    pub gpu: String,
    pub operating_system: String,
    pub peripherals: Vec<String>,
}

impl fmt::Display for Computer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peripherals = if self.peripherals.is_empty() {
            "None".to_string()
        } else {
            self.peripherals.join(", ")
        };
        writeln!(f, "Computer:")?;
        writeln!(f, "  CPU: {}", self.cpu)?;
        writeln!(f, "  RAM: {}GB", self.ram_gb)?;
        writeln!(f, "  Storage: {}GB", self.storage_gb)?;
        writeln!(f, "  GPU: {}", self.gpu)?;
        writeln!(f, "  OS: {}", self.operating_system)?;
        write!(f, "  Peripherals: {peripherals}")
    }
}

/// Chained setters; validation happens in [`ComputerBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ComputerBuilder {
    computer: Computer,
    ram_set: bool,
    storage_set: bool,
}

impl ComputerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cpu(&mut self, cpu: impl Into<String>) -> &mut Self {
        self.computer.cpu = cpu.into();
        self
    }

    pub fn ram(&mut self, gb: u32) -> &mut Self {
        self.computer.ram_gb = gb;
        self.ram_set = true;
        self
    }

    pub fn storage(&mut self, gb: u32) -> &mut Self {
        self.computer.storage_gb = gb;
        self.storage_set = true;
        self
    }

    pub fn gpu(&mut self, gpu: impl Into<String>) -> &mut Self {
        self.computer.gpu = gpu.into();
        self
    }

    pub fn operating_system(&mut self, os: impl Into<String>) -> &mut Self {
        self.computer.operating_system = os.into();
        self
    }

    pub fn peripheral(&mut self, peripheral: impl Into<String>) -> &mut Self {
        self.computer.peripherals.push(peripheral.into());
        self
    }

    /// Finish the configuration and reset the builder for reuse.
    ///
    /// A CPU and a positive amount of RAM are required; storage, when set,
    /// must be positive.
    pub fn build(&mut self) -> Result<Computer> {
        if self.computer.cpu.is_empty() {
            return Err(BibliothecaError::Validation("CPU is required".to_string()));
        }
        if !self.ram_set {
            return Err(BibliothecaError::Validation("RAM is required".to_string()));
        }
        if self.computer.ram_gb == 0 {
            return Err(BibliothecaError::Validation("RAM must be positive".to_string()));
        }
        if self.storage_set && self.computer.storage_gb == 0 {
            return Err(BibliothecaError::Validation("Storage must be positive".to_string()));
        }
        Ok(std::mem::take(self).computer)
    }
}

/// Standard configurations composed from ordinary builder steps.
pub mod presets {
    use super::{Computer, ComputerBuilder};
    use crate::error::{BibliothecaError, Result};

    pub const NAMES: [&str; 3] = ["gaming", "office", "budget"];

    pub fn gaming() -> Result<Computer> {
        ComputerBuilder::new()
            .cpu("Intel i7-12700K")
            .ram(32)
            .storage(1000)
            .gpu("Gaming NVIDIA RTX 4070")
            .operating_system("Windows 11")
            .peripheral("Gaming Mouse")
            .peripheral("Mechanical Keyboard")
            .peripheral("Gaming Headset")
            .build()
    }

    pub fn office() -> Result<Computer> {
        ComputerBuilder::new()
            .cpu("Office Intel i5-12400")
            .ram(16)
            .storage(512)
            .gpu("Integrated Graphics")
            .operating_system("Windows 10")
            .peripheral("Office Mouse")
            .peripheral("Standard Keyboard")
            .peripheral("Printer")
            .build()
    }

    pub fn budget() -> Result<Computer> {
        ComputerBuilder::new()
            .cpu("AMD Ryzen 5 5600G")
            .ram(8)
            .storage(256)
            .gpu("Integrated Radeon Graphics")
            .operating_system("Linux Ubuntu")
            .build()
    }

    pub fn by_name(name: &str) -> Result<Computer> {
        match name {
            "gaming" => gaming(),
            "office" => office(),
            "budget" => budget(),
            _ => Err(BibliothecaError::Validation(format!(
                "unknown preset '{name}', expected one of {}",
                NAMES.join(", ")
            ))),
        }
    }
}
