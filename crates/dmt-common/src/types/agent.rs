//! Agent classes that carry distinct minting costs

use serde::{Deserialize, Serialize};

/// Agent class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Top-level agent that can spawn sub-agents
    Master,
    /// Specialised agent owned by a master
    Sub,
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentType::Master => write!(f, "master"),
            AgentType::Sub => write!(f, "sub"),
        }
    }
}

impl std::str::FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "master" => Ok(AgentType::Master),
            "sub" => Ok(AgentType::Sub),
            other => Err(format!("unknown agent type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_type() {
        assert_eq!("master".parse::<AgentType>().unwrap(), AgentType::Master);
        assert_eq!("SUB".parse::<AgentType>().unwrap(), AgentType::Sub);
        assert!("worker".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_serde_repr() {
        let json = serde_json::to_string(&AgentType::Sub).unwrap();
        assert_eq!(json, "\"sub\"");
    }
}
