use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Ewasm,
    Evm,
}

/// Where the compiled contract will be deployed. Chain deployments on EWASM
/// hash with sha-256 instead of keccak-256, and are what a default build
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployPlatform {
    Normal,
    #[default]
    Chain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptLevel {
    #[default]
    O0,
    O1,
    O2,
    O3,
    Os,
    Oz,
}

impl OptLevel {
    /// Every level above `-O0` drops blocks that cannot be reached.
    pub fn prunes_unreachable(self) -> bool {
        self != OptLevel::O0
    }
}

impl FromStr for OptLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('O') {
            "0" => Ok(OptLevel::O0),
            "1" => Ok(OptLevel::O1),
            "2" => Ok(OptLevel::O2),
            "3" => Ok(OptLevel::O3),
            "s" => Ok(OptLevel::Os),
            "z" => Ok(OptLevel::Oz),
            other => Err(format!("unknown optimisation level `{}`", other)),
        }
    }
}

impl fmt::Display for OptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptLevel::O0 => "O0",
            OptLevel::O1 => "O1",
            OptLevel::O2 => "O2",
            OptLevel::O3 => "O3",
            OptLevel::Os => "Os",
            OptLevel::Oz => "Oz",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodegenOptions {
    pub target: Target,
    pub deploy: DeployPlatform,
    pub opt_level: OptLevel,
    /// Lower only the runtime part of the contract.
    pub runtime: bool,
}

impl CodegenOptions {
    pub fn uses_sha256(&self) -> bool {
        self.target == Target::Ewasm && self.deploy == DeployPlatform::Chain
    }
}
