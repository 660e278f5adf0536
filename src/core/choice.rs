//! Closed option sets: optimization strategy, build task and device kind.
//!
//! Each set parses from its lowercase name and rejects anything else with
//! [`BuildError::InvalidChoice`], so validation happens at the boundary
//! where user text enters the system.

use serde::Serialize;

use crate::core::errors::BuildError;

/// Optimization goal passed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Tool defaults
    #[default]
    None,
    /// Minimize resource usage
    Area,
    /// Maximize clock frequency
    Speed,
    /// Minimize power
    Power,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: &'static [Strategy] = &[
        Strategy::None,
        Strategy::Area,
        Strategy::Speed,
        Strategy::Power,
    ];

    /// Get the strategy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::None => "none",
            Strategy::Area => "area",
            Strategy::Speed => "speed",
            Strategy::Power => "power",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.to_lowercase())
            .ok_or_else(|| BuildError::invalid_choice("strategy", s, Strategy::ALL))
    }
}

/// How far the build should go.
///
/// Tasks are ordered: a later task implies every earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Create the project only
    Prj,
    /// Run synthesis
    Syn,
    /// Run implementation (place and route)
    Imp,
    /// Generate the bitstream
    #[default]
    Bit,
}

impl Task {
    /// All tasks, in pipeline order.
    pub const ALL: &'static [Task] = &[Task::Prj, Task::Syn, Task::Imp, Task::Bit];

    /// Get the task name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Prj => "prj",
            Task::Syn => "syn",
            Task::Imp => "imp",
            Task::Bit => "bit",
        }
    }

    /// Check if running this task includes the given step.
    pub fn includes(&self, step: Task) -> bool {
        *self >= step
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Task {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.to_lowercase())
            .ok_or_else(|| BuildError::invalid_choice("task", s, Task::ALL))
    }
}

/// Kind of device a bitstream is transferred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DevType {
    /// Volatile FPGA configuration over JTAG
    Fpga,
    /// SPI configuration flash
    Spi,
    /// BPI parallel configuration flash
    Bpi,
    /// Xilinx platform flash PROM
    Xcf,
}

impl DevType {
    /// All device kinds.
    pub const ALL: &'static [DevType] = &[DevType::Fpga, DevType::Spi, DevType::Bpi, DevType::Xcf];

    /// Get the device kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DevType::Fpga => "fpga",
            DevType::Spi => "spi",
            DevType::Bpi => "bpi",
            DevType::Xcf => "xcf",
        }
    }

    /// Whether this kind is a configuration memory that needs a memory part.
    pub fn is_memory(&self) -> bool {
        matches!(self, DevType::Spi | DevType::Bpi)
    }
}

impl std::fmt::Display for DevType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DevType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DevType::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.to_lowercase())
            .ok_or_else(|| BuildError::invalid_choice("device type", s, DevType::ALL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("area".parse::<Strategy>().unwrap(), Strategy::Area);
        assert_eq!("SPEED".parse::<Strategy>().unwrap(), Strategy::Speed);
        assert_eq!(Strategy::default(), Strategy::None);
    }

    #[test]
    fn test_strategy_rejects_unknown() {
        let err = "fast".parse::<Strategy>().unwrap_err();
        match err {
            BuildError::InvalidChoice {
                what,
                value,
                expected,
            } => {
                assert_eq!(what, "strategy");
                assert_eq!(value, "fast");
                assert_eq!(expected, vec!["none", "area", "speed", "power"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_task_order() {
        assert_eq!(Task::default(), Task::Bit);
        assert!(Task::Bit.includes(Task::Syn));
        assert!(Task::Imp.includes(Task::Imp));
        assert!(!Task::Syn.includes(Task::Imp));
        assert!(!Task::Prj.includes(Task::Syn));
    }

    #[test]
    fn test_task_rejects_unknown() {
        assert!(matches!(
            "par".parse::<Task>(),
            Err(BuildError::InvalidChoice { what: "task", .. })
        ));
    }

    #[test]
    fn test_devtype_parse() {
        assert_eq!("xcf".parse::<DevType>().unwrap(), DevType::Xcf);
        assert!(DevType::Spi.is_memory());
        assert!(!DevType::Fpga.is_memory());
        assert!("jtag".parse::<DevType>().is_err());
    }
}
